use postwatch_config::PostwatchConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn test_config_load() {
    let tmp = TempDir::new().unwrap();

    let file_yaml = r#"
version: "0.1"
tracker:
  handle: realdonaldtrump
  sources:
    - "https://rsshub.app/truthsocial/user/realdonaldtrump"
    - "https://trumpstruth.org/feed"
  fetch_limit: 25
  db_path: "/tmp/postwatch-test.db"
  interval_secs: 300
  "#;
    let p = write_yaml(&tmp, "postwatch.yaml", file_yaml);

    let config = PostwatchConfigLoader::new()
        .with_file(p)
        .load()
        .expect("load tracker config");

    assert_eq!(config.tracker.handle, "realdonaldtrump");
    assert_eq!(config.tracker.sources.len(), 2);
    assert_eq!(config.tracker.fetch_limit, 25);
    assert_eq!(config.tracker.interval_secs, 300);
    // Unset fields fall back to defaults.
    assert_eq!(config.tracker.http_timeout_secs, 30);
    assert_eq!(config.tracker.report_hours, 24);
}

#[test]
#[serial]
fn test_missing_optional_file_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = PostwatchConfigLoader::new()
        .with_optional_file(tmp.path().join("does-not-exist.yaml"))
        .load()
        .expect("defaults apply without a file");

    assert_eq!(config.tracker.handle, "realdonaldtrump");
    assert!(config.tracker.sources.is_empty());
    assert_eq!(config.tracker.interval_secs, 900);
}

#[test]
#[serial]
fn test_env_var_expansion_in_file_values() {
    let tmp = TempDir::new().unwrap();
    temp_env::with_var("POSTWATCH_TEST_DB", Some("/tmp/expanded.db"), || {
        let p = write_yaml(
            &tmp,
            "postwatch.yaml",
            r#"
tracker:
  db_path: "${POSTWATCH_TEST_DB}"
"#,
        );

        let config = PostwatchConfigLoader::new()
            .with_file(p)
            .load()
            .expect("load with env expansion");

        assert_eq!(config.tracker.db_path, "/tmp/expanded.db");
    });
}
