//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use std::time::Duration;
use tracing::Level;
use ttd_admin::config::{AdminConfig, ClientConfig, LoggingConfig, ScheduleConfig};
use ttd_admin::protocol::scheduler::Period;

fn valid_config() -> AdminConfig {
    let mut config = AdminConfig::default();
    config.client.password = "secret".to_string();
    config
}

#[test]
fn test_default_config_requires_password() {
    let errors = AdminConfig::default().validate();
    assert!(errors.iter().any(|e| e.contains("password")));
    assert!(valid_config().validate().is_empty());
}

#[test]
fn test_client_defaults() {
    let client = ClientConfig::default();
    assert_eq!(client.host, "localhost");
    assert_eq!(client.port, 3977);
    assert_eq!(client.bot_name, "openttd-multitool");
    assert_eq!(client.reconnect_delay, Duration::from_secs(2));
    assert_eq!(client.address(), "localhost:3977");
}

#[test]
fn test_empty_host_and_zero_port() {
    let mut config = valid_config();
    config.client.host = String::new();
    config.client.port = 0;

    let errors = config.validate();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| e.contains("Hostname")));
    assert!(errors.iter().any(|e| e.contains("Port")));
}

#[test]
fn test_nul_in_identity_rejected() {
    let mut config = valid_config();
    config.client.bot_name = "bad\0name".to_string();
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("bot_name")));
}

#[test]
fn test_reconnect_delay_bounds() {
    let mut config = valid_config();
    config.client.reconnect_delay = Duration::from_millis(1);
    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Reconnect delay too short")));

    config.client.reconnect_delay = Duration::from_secs(3600);
    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Reconnect delay too long")));
}

#[test]
fn test_empty_schedule_command_rejected() {
    let schedule = ScheduleConfig {
        monthly: vec!["   ".to_string()],
        ..ScheduleConfig::default()
    };
    let errors = schedule.validate();
    assert_eq!(errors, vec!["Empty monthly command".to_string()]);
}

#[test]
fn test_logging_app_name() {
    let logging = LoggingConfig {
        app_name: String::new(),
        ..LoggingConfig::default()
    };
    assert!(!logging.validate().is_empty());
}

#[test]
fn test_validate_strict_joins_errors() {
    let mut config = AdminConfig::default();
    config.client.host = String::new();
    let err = config.validate_strict().expect_err("should fail");
    let text = err.to_string();
    assert!(text.contains("Hostname cannot be empty"));
    assert!(text.contains("You must supply a password"));
}

#[test]
fn test_from_toml() {
    let config = AdminConfig::from_toml(
        r#"
        [client]
        host = "ttd.example.org"
        password = "hunter2"
        reconnect_delay = 500

        [schedule]
        daily = ["say \"%Y-%M-%D\""]
        yearly = [" save year-%Y ", "say \"happy new year\""]

        [logging]
        log_level = "debug"
        json_format = true
        "#,
    )
    .expect("valid toml");

    assert_eq!(config.client.host, "ttd.example.org");
    assert_eq!(config.client.port, 3977);
    assert_eq!(config.client.reconnect_delay, Duration::from_millis(500));
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.logging.json_format);
    assert!(config.validate().is_empty());

    let scheduler = config.schedule.to_scheduler();
    assert_eq!(scheduler.commands(Period::Daily).len(), 1);
    assert!(scheduler.commands(Period::Monthly).is_empty());
    assert_eq!(
        scheduler.commands(Period::Yearly),
        ["save year-%Y".to_string(), "say \"happy new year\"".to_string()]
    );
}

#[test]
fn test_invalid_toml_and_level() {
    assert!(AdminConfig::from_toml("client = 3").is_err());
    assert!(AdminConfig::from_toml("[logging]\nlog_level = \"loud\"").is_err());
}

#[test]
fn test_example_config_parses_back() {
    let example = AdminConfig::example_config();
    let parsed = AdminConfig::from_toml(&example).expect("example config should parse");
    assert_eq!(parsed.client.port, 3977);
    assert_eq!(parsed.client.reconnect_delay, Duration::from_secs(2));
}

#[test]
fn test_missing_file() {
    let err = AdminConfig::from_file("/nonexistent/ttd-admin.toml").expect_err("no such file");
    assert!(err.to_string().contains("Cannot read"));
}

#[test]
fn test_env_overrides_file_values() {
    let mut config = AdminConfig::from_toml(
        r#"
        [client]
        host = "from-file"
        port = 4000
        password = "file-pw"
        reconnect_delay = 500
        "#,
    )
    .expect("valid toml");

    // the only test in this binary that touches TTD_ADMIN_* variables
    std::env::remove_var("TTD_ADMIN_PASSWORD");
    std::env::set_var("TTD_ADMIN_HOST", "from-env");
    std::env::set_var("TTD_ADMIN_PORT", "4100");
    std::env::set_var("TTD_ADMIN_RECONNECT_DELAY_MS", "not-a-number");
    config.apply_env();
    std::env::remove_var("TTD_ADMIN_HOST");
    std::env::remove_var("TTD_ADMIN_PORT");
    std::env::remove_var("TTD_ADMIN_RECONNECT_DELAY_MS");

    assert_eq!(config.client.host, "from-env");
    assert_eq!(config.client.port, 4100);
    // unset and unparsable variables leave the file values alone
    assert_eq!(config.client.password, "file-pw");
    assert_eq!(config.client.reconnect_delay, Duration::from_millis(500));
}
