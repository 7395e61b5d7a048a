use std::io::Write;

use tempfile::NamedTempFile;

use super::ReadPolicy;
use super::SimConfig;

// Case 1: defaults
#[test]
fn test_defaults_case1() {
    let config = SimConfig::default();
    assert_eq!(config.wait_timeout_ms, 10_000);
    assert!(!config.disable_emittance);
    assert_eq!(config.read_policy, ReadPolicy::Strict);
    config.validate().unwrap();
}

// Case 2: zero timeout is rejected at validation time
#[test]
fn test_validate_case2() {
    let config = SimConfig {
        wait_timeout_ms: 0,
        ..SimConfig::default()
    };
    assert!(config.validate().is_err());
}

// Case 3: loading from a TOML file, missing keys fall back to defaults
#[test]
fn test_load_case3() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "wait_timeout_ms = 2500").unwrap();
    writeln!(file, "read_policy = \"best_effort\"").unwrap();
    file.flush().unwrap();

    let config = SimConfig::load(file.path().to_str()).unwrap();
    assert_eq!(config.wait_timeout_ms, 2500);
    assert_eq!(config.read_policy, ReadPolicy::BestEffort);
    assert!(!config.disable_emittance);
}

// Case 4: an invalid file value fails the load
#[test]
fn test_load_case4() {
    let mut file = NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(file, "wait_timeout_ms = 0").unwrap();
    file.flush().unwrap();

    assert!(SimConfig::load(file.path().to_str()).is_err());
}

#[test]
fn test_wait_timeout_duration() {
    let config = SimConfig {
        wait_timeout_ms: 1500,
        ..SimConfig::default()
    };
    assert_eq!(config.wait_timeout(), std::time::Duration::from_millis(1500));
}
