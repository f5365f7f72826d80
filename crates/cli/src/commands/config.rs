use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use brickwise_core::config::{exposed_key, AppConfig, LoadOptions};
use secrecy::SecretString;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let search = &config.search;
    lines.push(render_line(
        "search.provider",
        &format!("{:?}", search.provider),
        source("search.provider", &["BRICKWISE_SEARCH_PROVIDER"]),
    ));
    lines.push(render_line(
        "search.api_key",
        &redact_key(search.api_key.as_ref()),
        source("search.api_key", &["BRICKWISE_SEARCH_API_KEY", search.provider.vendor_key_var()]),
    ));
    lines.push(render_line(
        "search.base_url",
        search.effective_base_url(),
        source("search.base_url", &["BRICKWISE_SEARCH_BASE_URL"]),
    ));
    lines.push(render_line(
        "search.timeout_secs",
        &search.timeout_secs.to_string(),
        source("search.timeout_secs", &["BRICKWISE_SEARCH_TIMEOUT_SECS"]),
    ));
    lines.push(render_line(
        "search.max_results",
        &search.max_results.to_string(),
        source("search.max_results", &["BRICKWISE_SEARCH_MAX_RESULTS"]),
    ));

    let llm = &config.llm;
    lines.push(render_line(
        "llm.provider",
        &format!("{:?}", llm.provider),
        source("llm.provider", &["BRICKWISE_LLM_PROVIDER"]),
    ));
    lines.push(render_line("llm.model", &llm.model, source("llm.model", &["BRICKWISE_LLM_MODEL"])));
    lines.push(render_line(
        "llm.base_url",
        llm.effective_base_url(),
        source("llm.base_url", &["BRICKWISE_LLM_BASE_URL"]),
    ));
    lines.push(render_line(
        "llm.api_key",
        &redact_key(llm.api_key.as_ref()),
        source("llm.api_key", &["BRICKWISE_LLM_API_KEY", llm.provider.vendor_key_var()]),
    ));
    lines.push(render_line(
        "llm.timeout_secs",
        &llm.timeout_secs.to_string(),
        source("llm.timeout_secs", &["BRICKWISE_LLM_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["BRICKWISE_LOGGING_LEVEL", "BRICKWISE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", &["BRICKWISE_LOGGING_FORMAT", "BRICKWISE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("brickwise.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/brickwise.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps a short vendor prefix (`tvly-`) when present; never more.
fn redact_key(key: Option<&SecretString>) -> String {
    let Some(key) = exposed_key(key) else {
        return "<unset>".to_string();
    };

    if let Some((prefix, _)) = key.split_once('-') {
        if prefix.len() <= 6 {
            return format!("{prefix}-***");
        }
    }

    "<redacted>".to_string()
}
