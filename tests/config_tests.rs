// tests/config_tests.rs

use drroute::config::{load_config, AppConfig, ConfigValidator, PollerConfig};
use drroute::{setup_configuration, AppError};
use serial_test::serial;
use std::path::PathBuf;
use tempfile::tempdir;

fn clear_env() {
    for var in ["DRROUTE_HOST", "PORT", "PIDFILE", "DRROUTE_POLL_INTERVAL_MS", "DRROUTE_CONFIG"] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_load_full_config_file() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        r#"
server:
  host: "127.0.0.1"
  port: 9001
  max_body_bytes: 1024
pid_file: "/var/vcap/sys/run/drroute/drroute.pid"
poller:
  interval_ms: 250
  tcp_connect_timeout_secs: 2
  tcp_read_buffer_bytes: 2048
  http_timeout_secs: 3
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9001);
    assert_eq!(config.server.max_body_bytes, 1024);
    assert_eq!(
        config.pid_file,
        Some(PathBuf::from("/var/vcap/sys/run/drroute/drroute.pid"))
    );
    assert_eq!(
        config.poller,
        PollerConfig {
            interval_ms: 250,
            tcp_connect_timeout_secs: 2,
            tcp_read_buffer_bytes: 2048,
            http_timeout_secs: Some(3),
        }
    );
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    clear_env();
    let dir = tempdir().unwrap();
    let config = load_config(&dir.path().join("absent.yaml")).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
#[serial]
fn test_invalid_yaml_is_parse_error() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "server:\n  port: \"not-a-number\"\n").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, AppError::ConfigParse { .. }), "got {err:?}");
}

#[test]
#[serial]
fn test_invalid_values_fail_validation() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "poller:\n  interval_ms: 0\n").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, AppError::ConfigValidation { .. }), "got {err:?}");
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "server:\n  port: 9001\n").unwrap();

    std::env::set_var("PORT", "9555");
    std::env::set_var("PIDFILE", "/tmp/drroute-test.pid");
    let config = load_config(&path);
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.server.port, 9555);
    assert_eq!(config.pid_file, Some(PathBuf::from("/tmp/drroute-test.pid")));
}

#[test]
#[serial]
fn test_env_overrides_without_config_file() {
    clear_env();
    let dir = tempdir().unwrap();

    std::env::set_var("DRROUTE_HOST", "127.0.0.1");
    std::env::set_var("DRROUTE_POLL_INTERVAL_MS", "125");
    let config = load_config(&dir.path().join("absent.yaml"));
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.poller.interval_ms, 125);
    assert_eq!(config.server.port, AppConfig::default().server.port);
}

#[test]
#[serial]
fn test_setup_configuration_reads_env_path() {
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.yaml");
    std::fs::write(&path, "poller:\n  interval_ms: 750\n").unwrap();

    std::env::set_var("DRROUTE_CONFIG", &path);
    let config = setup_configuration(None);
    clear_env();

    assert_eq!(config.unwrap().poller.interval_ms, 750);
}

#[test]
fn test_validator_accepts_defaults() {
    assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
}
