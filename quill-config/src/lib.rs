//! Loader for workspace configuration with TOML + environment overlays.
//!
//! Settings come from an optional `quill.toml` file merged with
//! `QUILL_`-prefixed environment variables; `${VAR}` placeholders inside
//! string values are expanded before the typed config is materialised, so
//! secrets like the Anthropic key can stay out of the file.
use config::{Config, ConfigError, Environment, File};
use quill_common::LlmConfig;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct QuillSettings {
    pub version: Option<String>,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub llm: Option<LlmSettings>,
    #[serde(default)]
    pub extractor: ExtractorSettings,
}

#[derive(Debug, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// The tag is `provider`; only Anthropic is implemented today.
#[derive(Debug, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum LlmSettings {
    Anthropic {
        auth_token: String,
        #[serde(default = "default_anthropic_model")]
        model: String,
        #[serde(default)]
        endpoint: Option<String>,
    },
}

impl LlmSettings {
    /// Convert the file/env representation into the runtime provider config.
    pub fn to_llm_config(&self) -> LlmConfig {
        match self {
            Self::Anthropic {
                auth_token,
                model,
                endpoint,
            } => LlmConfig::Anthropic {
                api_key: auth_token.clone(),
                model: model.clone(),
                base_url: endpoint.clone(),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExtractorSettings {
    /// Override for the desktop-browser `User-Agent` the page fetcher sends.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8700".into()
}
fn default_database_url() -> String {
    "sqlite://quill.db?mode=rwc".into()
}
fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-latest".into()
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

/// Builder hiding the `config` crate wiring (TOML + env overrides).
pub struct QuillSettingsLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for QuillSettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl QuillSettingsLoader {
    /// Start with sensible defaults: TOML file + `QUILL_` env overrides.
    ///
    /// ```
    /// use quill_config::QuillSettingsLoader;
    ///
    /// let settings = QuillSettingsLoader::new()
    ///     .with_toml_str("version = '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(settings.version.as_deref(), Some("1"));
    /// assert_eq!(settings.server.bind_addr, "127.0.0.1:8700");
    /// assert!(settings.llm.is_none());
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(Environment::with_prefix("QUILL").separator("__"));
        Self { builder }
    }

    /// Attach a config file. Missing files are tolerated so headless
    /// deployments can rely purely on environment variables.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline TOML snippets.
    pub fn with_toml_str(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, config::FileFormat::Toml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use quill_config::{LlmSettings, QuillSettingsLoader};
    ///
    /// let settings = QuillSettingsLoader::new()
    ///     .with_toml_str(
    ///         r#"
    /// [llm]
    /// provider = "anthropic"
    /// auth_token = "sk-test"
    /// "#,
    ///     )
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// match settings.llm.expect("llm section") {
    ///     LlmSettings::Anthropic { model, endpoint, .. } => {
    ///         assert_eq!(model, "claude-3-5-sonnet-latest");
    ///         assert!(endpoint.is_none());
    ///     }
    /// }
    /// ```
    pub fn load(self) -> Result<QuillSettings, ConfigError> {
        let cfg = self.builder.build()?;

        // Round-trip through serde_json so `${VAR}` expansion can walk every
        // string before the strongly typed structs are built.
        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: QuillSettings =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}
