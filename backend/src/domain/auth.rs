//! Login credentials accepted by the sign-in form.
//!
//! The form takes a single identifier, which may be an email address or a
//! `GV - <CODE> - <N>` username. Role is never chosen by the caller: it is
//! derived from the username the care API returns after authentication.

use std::fmt;

use zeroize::Zeroizing;

/// Raised when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Identifier was missing or blank once trimmed.
    #[error("email or username must not be empty")]
    EmptyIdentifier,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated sign-in credentials.
///
/// The identifier is trimmed; the password keeps caller-provided whitespace
/// and is zeroised on drop.
///
/// # Examples
/// ```
/// use guardian_vision::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ana@example.com ", "secret1").unwrap();
/// assert_eq!(creds.identifier(), "ana@example.com");
/// assert!(creds.is_email());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw form inputs.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = identifier.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyIdentifier);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            identifier: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email address or username as typed.
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Whether the identifier looks like an email address.
    pub fn is_email(&self) -> bool {
        self.identifier.contains('@')
    }
}

/// Opaque credential issued by the care API at login.
///
/// Held only inside the encrypted session cookie and replayed on upstream
/// calls made for the same account. Zeroised on drop and redacted from debug
/// output.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamSession(Zeroizing<String>);

impl UpstreamSession {
    /// Wrap a raw credential value.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Placeholder for care API calls made before anyone signs in.
    pub fn anonymous() -> Self {
        Self::new(String::new())
    }

    /// Raw credential, for adapters building upstream requests.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the care API ever issued this credential.
    ///
    /// Identities upgraded from legacy cookies carry an empty one.
    pub fn is_issued(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Debug for UpstreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpstreamSession(<redacted>)")
    }
}
