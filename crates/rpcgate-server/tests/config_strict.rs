#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use rpcgate_core::Role;
use rpcgate_server::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "127.0.0.1:5000"
policy:
  protected:
    - operation: get_user
      role: admin
      requires_token: true # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "127.0.0.1:5000");
    assert!(cfg.server.http_listen.is_none());
    assert_eq!(cfg.auth.token_ttl_secs, 86400);

    // get_user is protected unless the config says otherwise
    assert_eq!(cfg.policy.protected.len(), 1);
    assert_eq!(cfg.policy.protected[0].operation, "get_user");
    assert_eq!(cfg.policy.protected[0].role, Role::Admin);
    assert!(cfg.policy.protected[0].require_token);
}

#[test]
fn wrong_version_is_unsupported() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn frame_limit_out_of_range() {
    let bad = "version: 1\nserver:\n  max_frame_bytes: 10\n";
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("max_frame_bytes"));
}

#[test]
fn ttl_out_of_range() {
    let bad = "version: 1\nauth:\n  token_ttl_secs: 0\n";
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn empty_protected_operation() {
    let bad = r#"
version: 1
policy:
  protected:
    - operation: " "
      role: admin
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn duplicate_protected_operation() {
    let bad = r#"
version: 1
policy:
  protected:
    - { operation: get_user, role: admin }
    - { operation: " get_user", role: user, require_token: false }
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    assert!(err.to_string().contains("lists operation twice: get_user"), "{err}");
}

#[test]
fn duplicate_seed_users() {
    let bad = r#"
version: 1
users:
  - { username: a, full_name: A, role: user, password: x }
  - { username: a, full_name: B, role: admin, password: y }
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("duplicate username"));
}

#[test]
fn require_token_defaults_to_true_and_can_be_disabled() {
    let ok = r#"
version: 1
policy:
  protected:
    - operation: get_user
      role: admin
    - operation: check_password
      role: user
      require_token: false
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert!(cfg.policy.protected[0].require_token);
    assert!(!cfg.policy.protected[1].require_token);
    assert_eq!(cfg.policy.protected[1].role, Role::User);
}
