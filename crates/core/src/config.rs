use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TAVILY_DEFAULT_BASE_URL: &str = "https://api.tavily.com";
pub const SERPER_DEFAULT_BASE_URL: &str = "https://google.serper.dev";
pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub provider: SearchProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_results: u32,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchProvider {
    Tavily,
    Serper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Gemini,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub search_provider: Option<SearchProvider>,
    pub search_api_key: Option<String>,
    pub search_base_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig {
                provider: SearchProvider::Tavily,
                api_key: None,
                base_url: None,
                timeout_secs: 30,
                max_results: 5,
            },
            llm: LlmConfig {
                provider: LlmProvider::Gemini,
                api_key: None,
                base_url: None,
                model: "gemini-1.5-flash".to_string(),
                timeout_secs: 60,
            },
            logging: LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact },
        }
    }
}

impl SearchProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Tavily => TAVILY_DEFAULT_BASE_URL,
            Self::Serper => SERPER_DEFAULT_BASE_URL,
        }
    }

    /// Conventional vendor variable consulted when `BRICKWISE_SEARCH_API_KEY`
    /// is unset.
    pub fn vendor_key_var(&self) -> &'static str {
        match self {
            Self::Tavily => "TAVILY_API_KEY",
            Self::Serper => "SERPER_API_KEY",
        }
    }
}

impl LlmProvider {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => GEMINI_DEFAULT_BASE_URL,
        }
    }

    pub fn vendor_key_var(&self) -> &'static str {
        match self {
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl SearchConfig {
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(self.provider.default_base_url())
    }
}

impl LlmConfig {
    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(self.provider.default_base_url())
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for SearchProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tavily" => Ok(Self::Tavily),
            "serper" => Ok(Self::Serper),
            other => Err(ConfigError::Validation(format!(
                "unsupported search provider `{other}` (expected tavily|serper)"
            ))),
        }
    }
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected gemini)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("brickwise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(search) = patch.search {
            if let Some(provider) = search.provider {
                self.search.provider = provider;
            }
            if let Some(search_api_key_value) = search.api_key {
                self.search.api_key = Some(secret_value(search_api_key_value));
            }
            if let Some(base_url) = search.base_url {
                self.search.base_url = Some(base_url);
            }
            if let Some(timeout_secs) = search.timeout_secs {
                self.search.timeout_secs = timeout_secs;
            }
            if let Some(max_results) = search.max_results {
                self.search.max_results = max_results;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BRICKWISE_SEARCH_PROVIDER") {
            self.search.provider = value.parse()?;
        }
        let search_key = read_env("BRICKWISE_SEARCH_API_KEY")
            .or_else(|| read_env(self.search.provider.vendor_key_var()));
        if let Some(value) = search_key {
            self.search.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("BRICKWISE_SEARCH_BASE_URL") {
            self.search.base_url = Some(value);
        }
        if let Some(value) = read_env("BRICKWISE_SEARCH_TIMEOUT_SECS") {
            self.search.timeout_secs = parse_u64("BRICKWISE_SEARCH_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("BRICKWISE_SEARCH_MAX_RESULTS") {
            self.search.max_results = parse_u32("BRICKWISE_SEARCH_MAX_RESULTS", &value)?;
        }

        if let Some(value) = read_env("BRICKWISE_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        let llm_key = read_env("BRICKWISE_LLM_API_KEY")
            .or_else(|| read_env(self.llm.provider.vendor_key_var()));
        if let Some(value) = llm_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("BRICKWISE_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("BRICKWISE_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("BRICKWISE_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("BRICKWISE_LLM_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("BRICKWISE_LOGGING_LEVEL").or_else(|| read_env("BRICKWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BRICKWISE_LOGGING_FORMAT").or_else(|| read_env("BRICKWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(provider) = overrides.search_provider {
            self.search.provider = provider;
        }
        if let Some(search_api_key) = overrides.search_api_key {
            self.search.api_key = Some(secret_value(search_api_key));
        }
        if let Some(base_url) = overrides.search_base_url {
            self.search.base_url = Some(base_url);
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(base_url) = overrides.llm_base_url {
            self.llm.base_url = Some(base_url);
        }
        if let Some(model) = overrides.llm_model {
            self.llm.model = model;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_search(&self.search)?;
        validate_llm(&self.llm)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Trimmed API key, if one is configured and non-blank.
pub fn exposed_key(key: Option<&SecretString>) -> Option<&str> {
    key.map(|value| value.expose_secret().trim()).filter(|value| !value.is_empty())
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("brickwise.toml"), PathBuf::from("config/brickwise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    if search.timeout_secs == 0 || search.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "search.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if search.max_results == 0 || search.max_results > 20 {
        return Err(ConfigError::Validation(
            "search.max_results must be in range 1..=20".to_string(),
        ));
    }

    validate_base_url("search.base_url", search.base_url.as_deref())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    validate_base_url("llm.base_url", llm.base_url.as_deref())
}

fn validate_base_url(key: &str, base_url: Option<&str>) -> Result<(), ConfigError> {
    if let Some(base_url) = base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "{key} must start with http:// or https://"
            )));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    search: Option<SearchPatch>,
    llm: Option<LlmPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    provider: Option<SearchProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    max_results: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

/// Every environment variable the loader reads. Tests clear these to start
/// from a known baseline.
pub const ENV_VARS: &[&str] = &[
    "BRICKWISE_SEARCH_PROVIDER",
    "BRICKWISE_SEARCH_API_KEY",
    "BRICKWISE_SEARCH_BASE_URL",
    "BRICKWISE_SEARCH_TIMEOUT_SECS",
    "BRICKWISE_SEARCH_MAX_RESULTS",
    "BRICKWISE_LLM_PROVIDER",
    "BRICKWISE_LLM_API_KEY",
    "BRICKWISE_LLM_BASE_URL",
    "BRICKWISE_LLM_MODEL",
    "BRICKWISE_LLM_TIMEOUT_SECS",
    "BRICKWISE_LOGGING_LEVEL",
    "BRICKWISE_LOGGING_FORMAT",
    "BRICKWISE_LOG_LEVEL",
    "BRICKWISE_LOG_FORMAT",
    "TAVILY_API_KEY",
    "SERPER_API_KEY",
    "GEMINI_API_KEY",
];
