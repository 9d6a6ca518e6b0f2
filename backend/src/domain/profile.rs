//! Self-service profile edits: field changes, password changes and image
//! uploads.

use std::collections::BTreeMap;

use zeroize::Zeroizing;

use super::{FieldError, FormErrors, FormField, Role, validate_field, validate_password};

/// Validated set of field changes for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    role: Role,
    changes: BTreeMap<FormField, String>,
}

impl ProfileUpdate {
    /// Validate `changes` for an account of `role`.
    ///
    /// Only fields the role can edit are accepted; each carried value must
    /// pass the same rule the registration form applies. Values are trimmed.
    pub fn try_new(role: Role, changes: BTreeMap<FormField, String>) -> Result<Self, FormErrors> {
        let mut errors = FormErrors::default();
        for (field, value) in &changes {
            if !field.editable_for(role) {
                errors.push(FieldError {
                    field: *field,
                    message: "Field cannot be edited here",
                });
            } else if let Some(error) = validate_field(*field, value, role) {
                errors.push(error);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        let changes = changes
            .into_iter()
            .map(|(field, value)| (field, value.trim().to_owned()))
            .collect();
        Ok(Self { role, changes })
    }

    /// Point a patient's profile image at an uploaded object.
    ///
    /// Images reach storage through the upload flow, never through the
    /// editor, so this bypasses the editable-field check.
    pub fn image_url(role: Role, file_url: impl Into<String>) -> Self {
        let changes = BTreeMap::from([(FormField::ProfileImage, file_url.into())]);
        Self { role, changes }
    }

    /// Role of the account being edited.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Changed fields with their new values.
    pub fn changes(&self) -> &BTreeMap<FormField, String> {
        &self.changes
    }

    /// Whether nothing would change.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Validated replacement password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    new_password: Zeroizing<String>,
}

impl PasswordChange {
    /// Check the new password against the length rule.
    pub fn try_new(new_password: &str) -> Result<Self, FieldError> {
        validate_password(new_password)?;
        Ok(Self {
            new_password: Zeroizing::new(new_password.to_owned()),
        })
    }

    /// The new password.
    pub fn new_password(&self) -> &str {
        self.new_password.as_str()
    }
}

/// Reasons an image upload is refused before contacting storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageUploadError {
    #[error("file name must not be empty")]
    EmptyFileName,
    #[error("content type '{0}' is not an image")]
    NotAnImage(String),
    #[error("image is empty")]
    Empty,
    #[error("image exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

/// Profile image awaiting upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Accept an `image/*` payload no larger than `max_bytes`.
    ///
    /// # Examples
    /// ```
    /// use guardian_vision::domain::{ImageUpload, ImageUploadError};
    ///
    /// let ok = ImageUpload::try_new("me.png", "image/png", vec![1, 2, 3], 1024);
    /// assert!(ok.is_ok());
    /// let err = ImageUpload::try_new("me.txt", "text/plain", vec![1], 1024).unwrap_err();
    /// assert_eq!(err, ImageUploadError::NotAnImage("text/plain".into()));
    /// ```
    pub fn try_new(
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, ImageUploadError> {
        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(ImageUploadError::EmptyFileName);
        }
        let content_type = content_type.trim().to_ascii_lowercase();
        if !content_type.starts_with("image/") {
            return Err(ImageUploadError::NotAnImage(content_type));
        }
        if bytes.is_empty() {
            return Err(ImageUploadError::Empty);
        }
        if bytes.len() > max_bytes {
            return Err(ImageUploadError::TooLarge { limit: max_bytes });
        }
        Ok(Self {
            file_name: file_name.to_owned(),
            content_type,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Presigned storage target returned by the care API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUpload {
    /// Where to `PUT` the bytes.
    pub upload_url: String,
    /// Public URL of the stored object.
    pub file_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn changes(pairs: &[(FormField, &str)]) -> BTreeMap<FormField, String> {
        pairs
            .iter()
            .map(|(field, value)| (*field, (*value).to_owned()))
            .collect()
    }

    #[rstest]
    fn accepts_and_trims_valid_changes() {
        let update = ProfileUpdate::try_new(
            Role::Patient,
            changes(&[(FormField::Address, " 3 Rizal Ave "), (FormField::Weight, "61.2")]),
        )
        .expect("valid update");
        assert_eq!(
            update.changes().get(&FormField::Address).map(String::as_str),
            Some("3 Rizal Ave")
        );
    }

    #[rstest]
    #[case(Role::Admin, FormField::Age)]
    #[case(Role::Patient, FormField::Password)]
    #[case(Role::Patient, FormField::CaregiverId)]
    fn rejects_fields_outside_the_editor(#[case] role: Role, #[case] field: FormField) {
        let errors = ProfileUpdate::try_new(role, changes(&[(field, "42")])).expect_err("rejected");
        assert_eq!(errors.get(field), Some("Field cannot be edited here"));
    }

    #[rstest]
    fn image_url_update_carries_only_the_image() {
        let update = ProfileUpdate::image_url(Role::Patient, "https://cdn.example/me.png");
        assert_eq!(update.changes().len(), 1);
        assert_eq!(
            update.changes().get(&FormField::ProfileImage).map(String::as_str),
            Some("https://cdn.example/me.png")
        );
    }

    #[rstest]
    fn applies_field_rules() {
        let errors = ProfileUpdate::try_new(Role::Caregiver, changes(&[(FormField::Email, "x")]))
            .expect_err("invalid email");
        assert_eq!(errors.get(FormField::Email), Some("Valid email is required"));
    }

    #[rstest]
    fn password_change_uses_length_rule() {
        assert!(PasswordChange::try_new("short").is_err());
        assert_eq!(
            PasswordChange::try_new("longer!")
                .expect("valid")
                .new_password(),
            "longer!"
        );
    }

    #[rstest]
    #[case("", "image/png", vec![1], ImageUploadError::EmptyFileName)]
    #[case("a.png", "image/png", vec![], ImageUploadError::Empty)]
    #[case("a.png", "image/png", vec![0; 9], ImageUploadError::TooLarge { limit: 8 })]
    fn image_upload_limits(
        #[case] name: &str,
        #[case] content_type: &str,
        #[case] bytes: Vec<u8>,
        #[case] expected: ImageUploadError,
    ) {
        assert_eq!(
            ImageUpload::try_new(name, content_type, bytes, 8).expect_err("rejected"),
            expected
        );
    }

    #[rstest]
    fn image_content_type_is_normalised() {
        let upload = ImageUpload::try_new("a.JPG", " Image/JPEG ", vec![1], 8).expect("valid");
        assert_eq!(upload.content_type(), "image/jpeg");
    }
}
