//! Tests for node identity resolution.

use yurt::hostname::{resolve_with, NormalizedHostname};
use yurt::BootstrapError;

fn test_host() -> Result<String, BootstrapError> {
    Ok("test_host".to_string())
}

fn resolve(override_name: &str) -> Result<NormalizedHostname, BootstrapError> {
    resolve_with(override_name, test_host)
}

#[test]
fn test_override_with_upper_case_is_folded() {
    assert_eq!(resolve("TEST_HOST").unwrap().as_str(), "test_host");
}

#[test]
fn test_override_with_leading_space_is_trimmed() {
    assert_eq!(resolve("    test_host").unwrap().as_str(), "test_host");
    assert_eq!(resolve("  Test_Host").unwrap().as_str(), "test_host");
    assert_eq!(resolve("test_host \t\n").unwrap().as_str(), "test_host");
}

#[test]
fn test_valid_override_is_unchanged() {
    assert_eq!(resolve("test_host").unwrap().as_str(), "test_host");
}

#[test]
fn test_whitespace_override_is_invalid() {
    let err = resolve("    ").unwrap_err();
    assert!(matches!(err, BootstrapError::InvalidHostname(_)), "got {:?}", err);
}

#[test]
fn test_whitespace_override_never_asks_the_system() {
    let err = resolve_with("   ", || panic!("system hostname must not be consulted")).unwrap_err();
    assert!(matches!(err, BootstrapError::InvalidHostname(_)));
}

#[test]
fn test_empty_override_uses_system_hostname() {
    assert_eq!(resolve("").unwrap().as_str(), "test_host");
}

#[test]
fn test_system_hostname_is_normalized() {
    let name = resolve_with("", || Ok("  Edge-Node-7\n".to_string())).unwrap();
    assert_eq!(name.as_str(), "edge-node-7");
    assert_eq!(name.to_string(), "edge-node-7");
}

#[test]
fn test_system_lookup_failure_propagates() {
    let err = resolve_with("", || {
        Err(BootstrapError::HostnameLookupFailed("EPERM".to_string()))
    })
    .unwrap_err();
    assert!(matches!(err, BootstrapError::HostnameLookupFailed(_)));
}

#[test]
fn test_real_system_hostname_resolves() {
    // The kernel always reports something; only the transform is checked.
    if let Ok(name) = yurt::hostname::resolve("") {
        assert_eq!(name.as_str(), name.as_str().trim().to_lowercase());
    }
}
