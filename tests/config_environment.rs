//! Configuration loading from a real file and the process environment
//!
//! These tests mutate process-wide environment variables and therefore run
//! serially.

use serial_test::serial;
use spot_saver::config::Config;
use spot_saver::models::Airport;
use std::path::PathBuf;

const VARS: [&str; 4] = [
    "SPOT_SAVER_API__USER",
    "SPOT_SAVER_SCHEDULE__TIMEZONE",
    "BetterAirportsApiKey",
    "airportList",
];

fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("spot-saver-{}-{name}.toml", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

fn clear_vars() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

const FILE: &str = r#"
    [api]
    user = "file-user"
    key = "file-key"

    [email]
    sendgrid_api_key = "SG.file"
    from_address = "spotsaver@example.com"
    to_addresses = "ops@example.com"

    [schedule]
    timezone = "UTC"
"#;

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_vars();
    let path = write_config("override", FILE);
    std::env::set_var("SPOT_SAVER_API__USER", "env-user");
    std::env::set_var("SPOT_SAVER_SCHEDULE__TIMEZONE", "America/Los_Angeles");

    let config = Config::load(Some(&path)).unwrap();
    clear_vars();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.api.user, "env-user");
    assert_eq!(config.api.key, "file-key");
    assert_eq!(config.schedule.timezone, "America/Los_Angeles");
}

#[test]
#[serial]
fn test_legacy_names_from_process_environment() {
    clear_vars();
    let path = write_config("legacy", FILE);
    std::env::set_var("BetterAirportsApiKey", "legacy-key");
    std::env::set_var(
        "airportList",
        r#"{"Code":"SEA","MinHour":4,"MaxHour":12}-{"Code":"PDX","MinHour":0,"MaxHour":23}"#,
    );

    let config = Config::load(Some(&path)).unwrap();
    clear_vars();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.api.key, "legacy-key");
    assert_eq!(
        config.airports,
        vec![Airport::new("SEA", 4, 12), Airport::new("PDX", 0, 23)]
    );
}

#[test]
#[serial]
fn test_missing_file_without_environment_fails_validation() {
    clear_vars();
    let err = Config::load(Some(std::path::Path::new("/nonexistent/spot-saver.toml")))
        .unwrap_err()
        .to_string();
    assert!(err.contains("api.user must be set"), "{err}");
}
