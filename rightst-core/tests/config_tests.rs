//! Config loading error-message and selection tests.

use assert_fs::prelude::*;
use rightst_core::{config, ConfigError};

const VALID: &str = "\
login:
  default_environment: production
  environments:
    production:
      account: 12345
      host: us-3.rightscale.com
      refresh_token: abc123
    staging:
      account: 999
      host: us-4.rightscale.com
      refresh_token: def456
";

#[test]
fn load_valid_config() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child(".right_st.yml");
    file.write_str(VALID).expect("write");

    let cfg = config::load_at(file.path()).expect("load");
    let (name, env) = cfg.environment(None).expect("environment");
    assert_eq!(name, "production");
    assert_eq!(env.account, 12345);
    assert_eq!(env.host, "us-3.rightscale.com");

    let (_, staging) = cfg.environment(Some("staging")).expect("staging");
    assert_eq!(staging.refresh_token, "def456");
}

#[test]
fn load_missing_config_returns_not_found() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let err = config::load_at(&dir.path().join("nope.yml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("nope.yml"));
}

#[test]
fn load_corrupt_config_returns_parse_error_with_path() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("bad.yml");
    file.write_str("login: [unclosed").expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("bad.yml"));
}

#[test]
fn load_config_missing_required_fields_is_parse_error() {
    let dir = assert_fs::TempDir::new().expect("tempdir");
    let file = dir.child("partial.yml");
    file.write_str("login:\n  environments:\n    prod:\n      host: h\n")
        .expect("write");

    let err = config::load_at(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}
