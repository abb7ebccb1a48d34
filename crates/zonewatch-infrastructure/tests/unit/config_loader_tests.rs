//! Tests for layered configuration loading

use std::io::Write;

use tempfile::TempDir;
use zonewatch_infrastructure::config::{
    AppConfig, ConfigLoader, EventBusKind, FrameSourceKind, loader::render_toml,
};

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("zonewatch.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn loader_for(path: &std::path::Path, prefix: &str) -> ConfigLoader {
    ConfigLoader::new()
        .with_config_path(path)
        .with_env_prefix(prefix)
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = loader_for(&dir.path().join("absent.toml"), "ZWTEST_MISSING")
        .load()
        .unwrap();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.resilience.failure_threshold, 3);
    assert_eq!(config.frames.source, FrameSourceKind::Http);
    assert!(config.options.as_object().unwrap().is_empty());
}

#[test]
fn test_file_values_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[logging]
level = "debug"

[resilience]
failure_threshold = 5

[event_bus]
provider = "tokio"
topic_prefix = "house"

[[options.zones]]
name = "kitchen"
camera_entity = "camera.kitchen"
ignore_rules = ["trash"]
"#,
    );

    let config = loader_for(&path, "ZWTEST_FILE").load().unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.resilience.failure_threshold, 5);
    assert_eq!(config.resilience.base_cooldown_secs, 30);
    assert_eq!(config.event_bus.provider, EventBusKind::Tokio);
    assert_eq!(config.event_bus.topic_prefix, "house");
    assert_eq!(config.options["zones"][0]["name"], "kitchen");
}

#[test]
fn test_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[logging]\nlevel = \"debug\"\n");

    // SAFETY: the variable name is unique to this test
    unsafe {
        std::env::set_var("ZWTEST_ENV_LOGGING__LEVEL", "warn");
    }
    let result = loader_for(&path, "ZWTEST_ENV").load();
    // SAFETY: see above
    unsafe {
        std::env::remove_var("ZWTEST_ENV_LOGGING__LEVEL");
    }

    assert_eq!(result.unwrap().logging.level, "warn");
}

#[test]
fn test_invalid_log_level_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[logging]\nlevel = \"chatty\"\n");

    let err = loader_for(&path, "ZWTEST_LEVEL").load().unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_invalid_resilience_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[resilience]\nbase_cooldown_secs = 60\nmax_cooldown_secs = 30\n",
    );

    let err = loader_for(&path, "ZWTEST_RES").load().unwrap_err();
    assert!(err.to_string().contains("max_cooldown_secs"));
}

#[test]
fn test_file_source_requires_directory() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[frames]\nsource = \"file\"\n");

    let err = loader_for(&path, "ZWTEST_FRAMES").load().unwrap_err();
    assert!(err.to_string().contains("frames.directory"));
}

#[test]
fn test_malformed_toml_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[logging\nlevel = ");

    assert!(loader_for(&path, "ZWTEST_BROKEN").load().is_err());
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.toml");
    let loader = loader_for(&path, "ZWTEST_SAVE");

    let mut config = AppConfig::default();
    config.logging.level = "trace".to_string();
    config.scheduler.enabled = false;
    config.options = serde_json::json!({
        "zone_defaults": {"interval_minutes": 10}
    });
    loader.save_to_file(&config, &path).unwrap();

    let reloaded = loader.reload().unwrap();
    assert_eq!(reloaded.logging.level, "trace");
    assert!(!reloaded.scheduler.enabled);
    assert_eq!(reloaded.options["zone_defaults"]["interval_minutes"], 10);
}

#[test]
fn test_render_toml_contains_sections() {
    let rendered = render_toml(&AppConfig::default()).unwrap();
    assert!(rendered.contains("[logging]"));
    assert!(rendered.contains("[event_bus]"));
}

#[test]
fn test_explicit_path_is_resolved() {
    let loader = ConfigLoader::new().with_config_path("/tmp/zonewatch-explicit.toml");
    assert_eq!(
        loader.resolved_path().as_deref(),
        Some(std::path::Path::new("/tmp/zonewatch-explicit.toml"))
    );
}
