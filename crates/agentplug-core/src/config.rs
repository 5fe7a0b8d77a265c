//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_CHAT__API_KEY`). The merged figment
//! is extracted into [`AppConfig`]; every section has defaults so an empty
//! configuration still yields a usable value in development.
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Load `config.toml` and the environment overlay from `base`.
    pub fn load_from(base: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(base.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Self::from_figment(figment, env_name)
    }

    pub fn from_figment(figment: Figment, env_name: &str) -> anyhow::Result<Self> {
        let config = Self { figment, env_name: env_name.to_string() };
        config.validate_for_env()?;
        Ok(config)
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn app(&self) -> anyhow::Result<AppConfig> {
        self.figment
            .extract()
            .map_err(|e| ConfigError::Invalid(e.to_string()).into())
    }

    fn validate_for_env(&self) -> anyhow::Result<()> {
        let app = self.app()?;
        match self.env_name.as_str() {
            "prod" | "production" => {
                let required = [
                    ("chat.endpoint", &app.chat.endpoint),
                    ("chat.deployment", &app.chat.deployment),
                    ("chat.api_key", &app.chat.api_key),
                    ("embedding.endpoint", &app.embedding.endpoint),
                    ("embedding.deployment", &app.embedding.deployment),
                    ("embedding.api_key", &app.embedding.api_key),
                    ("search.endpoint", &app.search.endpoint),
                    ("search.api_key", &app.search.api_key),
                ];
                for (key, value) in required {
                    if value.trim().is_empty() {
                        return Err(ConfigError::Missing { key: key.to_string(), env: self.env_name.clone() }.into());
                    }
                }
                if app.embedding.use_fake {
                    return Err(ConfigError::Invalid("embedding.use_fake is not allowed in production".into()).into());
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        if !(0.0..=2.0).contains(&app.chat.temperature) {
            return Err(ConfigError::Invalid(format!("chat.temperature must be within [0, 2], got {}", app.chat.temperature)).into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub chat: ChatConfig,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
    pub weather: WeatherConfig,
    pub geo: GeoConfig,
    pub display_zone: DisplayZone,
    pub tool_servers: Vec<ToolServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub endpoint: String,
    pub deployment: String,
    pub api_key: String,
    pub api_version: String,
    pub temperature: f32,
    pub max_tool_rounds: usize,
    pub system_prompt: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: String::new(),
            api_key: String::new(),
            api_version: "2024-06-01".to_string(),
            temperature: 0.75,
            max_tool_rounds: 8,
            system_prompt: None,
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub deployment: String,
    pub api_key: String,
    pub api_version: String,
    pub dimension: usize,
    pub timeout_secs: u64,
    pub use_fake: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: String::new(),
            api_key: String::new(),
            api_version: "2024-06-01".to_string(),
            dimension: 1536,
            timeout_secs: 30,
            use_fake: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { endpoint: String::new(), api_key: String::new(), api_version: "2023-11-01".to_string(), timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com".to_string(),
            user_agent: concat!("agentplug/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self { base_url: "https://geocoding-api.open-meteo.com".to_string(), timeout_secs: 15 }
    }
}

/// Fixed-offset zone used when presenting times to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayZone {
    pub label: String,
    pub utc_offset_minutes: i32,
}

impl Default for DisplayZone {
    fn default() -> Self {
        Self { label: "IST".to_string(), utc_offset_minutes: 330 }
    }
}

/// An external tool server mounted under `prefix`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolServerConfig {
    pub name: String,
    pub prefix: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub transport: ToolTransport,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "transport", rename_all = "lowercase")]
pub enum ToolTransport {
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: BTreeMap<String, String>,
        /// Host directory that must exist before the server is started.
        #[serde(default)]
        require_dir: Option<String>,
        #[serde(default = "default_tool_timeout")]
        timeout_secs: u64,
    },
    Http {
        endpoint: String,
        #[serde(default)]
        bearer_token: Option<String>,
        #[serde(default)]
        headers: BTreeMap<String, String>,
        #[serde(default = "default_tool_timeout")]
        timeout_secs: u64,
    },
}

fn default_tool_timeout() -> u64 {
    60
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
///
/// A reference to an unset variable is an error rather than left verbatim.
pub fn expand_path<S: AsRef<str>>(input: S) -> Result<PathBuf, ConfigError> {
    expand_str(input).map(PathBuf::from)
}

/// Same expansion as [`expand_path`], kept as a string for command arguments
/// and header values.
pub fn expand_str<S: AsRef<str>>(input: S) -> Result<String, ConfigError> {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s)
        .map_err(|e| ConfigError::Invalid(format!("environment variable '{}' is not set (in '{s}')", e.var_name)))?;
    Ok(shellexpand::tilde(&expanded_env).into_owned())
}
