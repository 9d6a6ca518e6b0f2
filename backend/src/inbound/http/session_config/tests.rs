//! Unit tests for environment-driven session settings.

use std::collections::HashMap;
use std::io::Write;

use super::*;
use mockable::MockEnv;
use rstest::{fixture, rstest};
use tempfile::NamedTempFile;

fn key_file(len: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temporary key file");
    file.write_all(&vec![b'k'; len]).expect("write key bytes");
    file
}

fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |name| vars.get(name).cloned());
    env
}

/// A complete, valid release configuration plus the key file it points at.
#[fixture]
fn release_vars() -> (HashMap<&'static str, String>, NamedTempFile) {
    let file = key_file(SESSION_KEY_MIN_LEN);
    let vars = HashMap::from([
        (KEY_FILE_ENV, file.path().to_string_lossy().into_owned()),
        (COOKIE_SECURE_ENV, "1".to_owned()),
        (SAMESITE_ENV, "Strict".to_owned()),
        (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
    ]);
    (vars, file)
}

fn release_error(vars: HashMap<&'static str, String>) -> SessionConfigError {
    match session_settings_from_env(&mock_env(vars), BuildMode::Release) {
        Ok(_) => panic!("release settings unexpectedly accepted"),
        Err(error) => error,
    }
}

#[rstest]
fn release_accepts_complete_settings(release_vars: (HashMap<&'static str, String>, NamedTempFile)) {
    let (vars, _file) = release_vars;
    let settings = session_settings_from_env(&mock_env(vars), BuildMode::Release)
        .expect("valid release settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Strict);
}

#[rstest]
#[case(COOKIE_SECURE_ENV)]
#[case(SAMESITE_ENV)]
#[case(ALLOW_EPHEMERAL_ENV)]
fn release_requires_every_toggle(
    release_vars: (HashMap<&'static str, String>, NamedTempFile),
    #[case] missing: &'static str,
) {
    let (mut vars, _file) = release_vars;
    vars.remove(missing);
    let err = release_error(vars);
    assert!(
        matches!(err, SessionConfigError::MissingEnv { name } if name == missing),
        "unexpected error: {err}"
    );
}

#[rstest]
#[case(COOKIE_SECURE_ENV, "maybe")]
#[case(COOKIE_SECURE_ENV, "")]
#[case(SAMESITE_ENV, "sideways")]
#[case(ALLOW_EPHEMERAL_ENV, "perhaps")]
fn release_rejects_malformed_toggles(
    release_vars: (HashMap<&'static str, String>, NamedTempFile),
    #[case] name: &'static str,
    #[case] value: &str,
) {
    let (mut vars, _file) = release_vars;
    vars.insert(name, value.to_owned());
    let err = release_error(vars);
    assert!(
        matches!(&err, SessionConfigError::InvalidEnv { name: found, .. } if *found == name),
        "unexpected error: {err}"
    );
}

#[rstest]
fn release_refuses_ephemeral_keys(release_vars: (HashMap<&'static str, String>, NamedTempFile)) {
    let (mut vars, _file) = release_vars;
    vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::EphemeralNotAllowed
    ));
}

#[rstest]
fn release_refuses_insecure_same_site_none(
    release_vars: (HashMap<&'static str, String>, NamedTempFile),
) {
    let (mut vars, _file) = release_vars;
    vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
    vars.insert(SAMESITE_ENV, "None".to_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::InsecureSameSiteNone
    ));
}

#[rstest]
fn release_refuses_short_keys(release_vars: (HashMap<&'static str, String>, NamedTempFile)) {
    let (mut vars, _file) = release_vars;
    let short = key_file(SESSION_KEY_DEBUG_MIN_LEN);
    vars.insert(KEY_FILE_ENV, short.path().to_string_lossy().into_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::KeyTooShort { length: 32, min_len: 64, .. }
    ));
}

#[rstest]
fn release_refuses_unreadable_key_file(
    release_vars: (HashMap<&'static str, String>, NamedTempFile),
) {
    let (mut vars, file) = release_vars;
    let missing = file.path().with_extension("absent");
    vars.insert(KEY_FILE_ENV, missing.to_string_lossy().into_owned());
    assert!(matches!(
        release_error(vars),
        SessionConfigError::KeyRead { .. }
    ));
}

#[rstest]
fn debug_falls_back_to_defaults_and_a_temporary_key() {
    let missing = std::env::temp_dir().join("guardian-vision-no-such-key");
    let env = mock_env(HashMap::from([(
        KEY_FILE_ENV,
        missing.to_string_lossy().into_owned(),
    )]));
    let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_tolerates_malformed_same_site(
    release_vars: (HashMap<&'static str, String>, NamedTempFile),
) {
    let (mut vars, _file) = release_vars;
    vars.insert(SAMESITE_ENV, "unexpected".to_owned());
    let settings =
        session_settings_from_env(&mock_env(vars), BuildMode::Debug).expect("debug fallback");
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_still_refuses_keys_too_short_to_derive() {
    let short = key_file(8);
    let env = mock_env(HashMap::from([(
        KEY_FILE_ENV,
        short.path().to_string_lossy().into_owned(),
    )]));
    let err = session_settings_from_env(&env, BuildMode::Debug)
        .err()
        .expect("short key rejected");
    assert!(matches!(err, SessionConfigError::KeyTooShort { min_len: 32, .. }));
}

#[rstest]
fn the_same_key_file_yields_the_same_fingerprint(
    release_vars: (HashMap<&'static str, String>, NamedTempFile),
) {
    let (vars, _file) = release_vars;
    let first = session_settings_from_env(&mock_env(vars.clone()), BuildMode::Release)
        .expect("settings");
    let second =
        session_settings_from_env(&mock_env(vars), BuildMode::Release).expect("settings");
    assert_eq!(first.fingerprint(), second.fingerprint());
}
