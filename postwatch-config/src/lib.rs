//! Loader for workspace configuration with YAML + environment overlays.
//!
//! The schema is the `postwatch.yaml` file the binary reads at startup: a
//! `tracker` block describing the tracked handle, feed sources, store path,
//! and daemon cadence. Values may reference environment variables with
//! `${VAR}` syntax; `POSTWATCH_`-prefixed environment variables override
//! file contents.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct PostwatchConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub tracker: TrackerSpec,
}

/// Everything the pipeline needs, passed explicitly to each component at
/// construction. There is deliberately no process-global fallback.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerSpec {
    /// Account whose posts are tracked.
    #[serde(default = "default_handle")]
    pub handle: String,
    /// Explicit candidate feed URLs, priority order. Empty means "derive
    /// the default candidates from `handle`".
    #[serde(default)]
    pub sources: Vec<String>,
    /// Maximum number of items taken from a feed document.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    /// SQLite database file location.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Daemon polling interval.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Per-request HTTP timeout.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Default report window.
    #[serde(default = "default_report_hours")]
    pub report_hours: i64,
}

impl Default for TrackerSpec {
    fn default() -> Self {
        Self {
            handle: default_handle(),
            sources: Vec::new(),
            fetch_limit: default_fetch_limit(),
            db_path: default_db_path(),
            interval_secs: default_interval_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            report_hours: default_report_hours(),
        }
    }
}

fn default_handle() -> String {
    "realdonaldtrump".into()
}
fn default_fetch_limit() -> usize {
    40
}
fn default_db_path() -> String {
    "data/postwatch.db".into()
}
fn default_interval_secs() -> u64 {
    900
}
fn default_http_timeout_secs() -> u64 {
    30
}
fn default_report_hours() -> i64 {
    24
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct PostwatchConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PostwatchConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PostwatchConfigLoader {
    /// Start with sensible defaults: YAML file + `POSTWATCH_` env overrides.
    ///
    /// ```
    /// use postwatch_config::PostwatchConfigLoader;
    ///
    /// let config = PostwatchConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.tracker.fetch_limit, 40);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("POSTWATCH").separator("__"));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self.builder.add_source(File::from(path.as_ref()));
        self
    }

    /// Attach a file that may be absent; headless deployments can then rely
    /// purely on environment variables and defaults.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use postwatch_config::PostwatchConfigLoader;
    ///
    /// let cfg = PostwatchConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// version: "test"
    /// tracker:
    ///   handle: "someaccount"
    ///   interval_secs: 60
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.tracker.handle, "someaccount");
    /// assert_eq!(cfg.tracker.interval_secs, 60);
    /// assert_eq!(cfg.tracker.report_hours, 24);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// The loader combines YAML sources with `POSTWATCH_`-prefixed
    /// environment variables and expands `${VAR}` placeholders before
    /// materialising the strongly typed config.
    pub fn load(self) -> Result<PostwatchConfig, ConfigError> {
        let cfg = self.builder.build()?;

        // Round-trip through serde_json::Value so ${VAR} references can be
        // expanded recursively before typed deserialization.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: PostwatchConfig =
            serde_json::from_value(v).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temp_env;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Winston")), ("STATE", Some("NC"))], || {
            let mut v = json!([
                "hello-$CITY",
                { "loc": "${CITY}-${STATE}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Winston", { "loc": "Winston-NC" }, 42, true, null])
            );
        });
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                // BAR references BAZ; FOO references BAR — two hops.
                ("BAZ", Some("qux")),
                ("BAR", Some("mid-${BAZ}")),
                ("FOO", Some("start-${BAR}-end")),
            ],
            || {
                let mut v = json!("X=${FOO}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles_and_leaves_value_reasonable() {
        temp_env::with_vars([("A", Some("${B}")), ("B", Some("${A}"))], || {
            let mut v = json!("x=${A}-y");
            // We only care that the depth cap terminates the loop.
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${DOES_NOT_EXIST}"));
    }
}
