//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests run without a global config (temp directories only),
//! so they effectively test local config merging with defaults.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use fortnum::config::{local_config_path, Settings};

#[test]
fn given_no_local_config_when_load_then_uses_defaults() {
    let dir = TempDir::new().unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.catalog, PathBuf::from("fortnum.toml"));
    assert!(settings.mark_abstract);
}

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
catalog = "colors.toml"
default_related_name = "colors"
mark_abstract = false
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.catalog, PathBuf::from("colors.toml"));
    assert_eq!(settings.default_related_name.as_deref(), Some("colors"));
    assert!(!settings.mark_abstract);
}

#[test]
fn given_partial_local_config_when_load_then_keeps_unspecified_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "mark_abstract = false\n").unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.catalog, PathBuf::from("fortnum.toml"));
    assert!(!settings.mark_abstract);
}

#[test]
fn given_malformed_local_config_when_load_then_errors() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "mark_abstract = [").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(result.is_err());
}

#[test]
fn given_settings_when_rendered_then_round_trips_through_toml() {
    let settings = Settings {
        default_related_name: Some("colors".into()),
        ..Settings::default()
    };

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed, settings);
}
