//! Configuration parsing and validation for the Cortex memory plugin.
//!
//! The host hands over a plugin config object (camelCase keys). Credentials
//! may be given inline, as `${VAR}` references, or left out in favour of
//! the `CORTEX_OPENCLAW_API_KEY` / `CORTEX_OPENCLAW_TENANT_ID` environment
//! variables. Everything else has a default. Validation runs once, here.

use std::sync::LazyLock;

use cortexclaw_core::api::{RecallMode, RecallOptions};
pub use cortexclaw_core::api::DEFAULT_BASE_URL;
use cortexclaw_core::context::{ContextOptions, DEFAULT_MIN_EVIDENCE_SCORE};
use cortexclaw_core::log::Logger;
use regex_lite::Regex;
use serde::Deserialize;
use serde_json::Value;

pub const API_KEY_ENV: &str = "CORTEX_OPENCLAW_API_KEY";
pub const TENANT_ID_ENV: &str = "CORTEX_OPENCLAW_TENANT_ID";

pub const DEFAULT_SUB_TENANT: &str = "cortex-openclaw-plugin";
pub const DEFAULT_IGNORE_TERM: &str = "cortex-ignore";
pub const DEFAULT_MAX_RECALL_RESULTS: usize = 10;
pub const MAX_RECALL_RESULTS_LIMIT: usize = 100;

const KNOWN_KEYS: &[&str] = &[
    "apiKey",
    "tenantId",
    "subTenantId",
    "autoRecall",
    "autoCapture",
    "maxRecallResults",
    "recallMode",
    "graphContext",
    "ignoreTerm",
    "minEvidenceScore",
    "baseUrl",
    "debug",
];

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// The fully resolved plugin configuration.
#[derive(Clone, PartialEq)]
pub struct PluginConfig {
    pub api_key: String,
    pub tenant_id: String,
    pub sub_tenant_id: String,

    /// Inject recalled memories before each agent run
    pub auto_recall: bool,

    /// Store the conversation after each successful agent run
    pub auto_capture: bool,

    pub max_recall_results: usize,
    pub recall_mode: RecallMode,
    pub graph_context: bool,

    /// Prompts containing this term (case-insensitive) skip recall
    pub ignore_term: String,

    /// Graph relations scoring below this are left out of assembled context
    pub min_evidence_score: f64,

    pub base_url: String,
    pub debug: bool,
}

/// The host's view before defaults and env resolution.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    api_key: Option<String>,
    tenant_id: Option<String>,
    sub_tenant_id: Option<String>,
    auto_recall: Option<bool>,
    auto_capture: Option<bool>,
    max_recall_results: Option<usize>,
    /// Anything other than `"thinking"` means fast, including non-strings.
    recall_mode: Option<Value>,
    graph_context: Option<bool>,
    ignore_term: Option<String>,
    min_evidence_score: Option<f64>,
    base_url: Option<String>,
    debug: Option<bool>,
}

fn redact(s: &str) -> &'static str {
    if s.is_empty() { "None" } else { "[REDACTED]" }
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("api_key", &redact(&self.api_key))
            .field("tenant_id", &self.tenant_id)
            .field("sub_tenant_id", &self.sub_tenant_id)
            .field("auto_recall", &self.auto_recall)
            .field("auto_capture", &self.auto_capture)
            .field("max_recall_results", &self.max_recall_results)
            .field("recall_mode", &self.recall_mode)
            .field("graph_context", &self.graph_context)
            .field("ignore_term", &self.ignore_term)
            .field("min_evidence_score", &self.min_evidence_score)
            .field("base_url", &self.base_url)
            .field("debug", &self.debug)
            .finish()
    }
}

impl PluginConfig {
    /// Config with the given credentials and every other field defaulted.
    pub fn new(api_key: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            tenant_id: tenant_id.into(),
            sub_tenant_id: DEFAULT_SUB_TENANT.into(),
            auto_recall: true,
            auto_capture: true,
            max_recall_results: DEFAULT_MAX_RECALL_RESULTS,
            recall_mode: RecallMode::Fast,
            graph_context: true,
            ignore_term: DEFAULT_IGNORE_TERM.into(),
            min_evidence_score: DEFAULT_MIN_EVIDENCE_SCORE,
            base_url: DEFAULT_BASE_URL.into(),
            debug: false,
        }
    }

    /// Parse the host's config value, reading the process environment.
    pub fn parse(raw: &Value) -> Result<Self, ConfigError> {
        Self::parse_with_env(raw, |name| std::env::var(name).ok())
    }

    /// Parse with an explicit environment lookup.
    ///
    /// Anything other than a JSON object is treated as an empty config.
    pub fn parse_with_env<F>(raw: &Value, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let empty = serde_json::Map::new();
        let map = raw.as_object().unwrap_or(&empty);

        let unknown: Vec<String> = map
            .keys()
            .filter(|k| !KNOWN_KEYS.contains(&k.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownKeys(unknown));
        }

        let raw: RawConfig =
            serde_json::from_value(Value::Object(map.clone())).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let api_key = resolve_credential(raw.api_key, "apiKey", API_KEY_ENV, &env)?;
        let tenant_id = resolve_credential(raw.tenant_id, "tenantId", TENANT_ID_ENV, &env)?;

        let defaults = Self::new(api_key, tenant_id);
        let config = Self {
            sub_tenant_id: raw
                .sub_tenant_id
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.sub_tenant_id.clone()),
            auto_recall: raw.auto_recall.unwrap_or(defaults.auto_recall),
            auto_capture: raw.auto_capture.unwrap_or(defaults.auto_capture),
            max_recall_results: raw.max_recall_results.unwrap_or(defaults.max_recall_results),
            recall_mode: match raw.recall_mode.as_ref().and_then(Value::as_str) {
                Some("thinking") => RecallMode::Thinking,
                _ => RecallMode::Fast,
            },
            graph_context: raw.graph_context.unwrap_or(defaults.graph_context),
            ignore_term: raw.ignore_term.unwrap_or(defaults.ignore_term.clone()),
            min_evidence_score: raw.min_evidence_score.unwrap_or(defaults.min_evidence_score),
            base_url: raw
                .base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url.clone()),
            debug: raw.debug.unwrap_or(defaults.debug),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document with the same keys as the host object.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let value: toml::Value = toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let json = serde_json::to_value(value).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::parse(&json)
    }

    /// Like [`PluginConfig::parse`], but logs the failure and returns `None`.
    /// Hosts use this to fall back to the "not configured" registration.
    pub fn try_parse(raw: &Value, logger: &dyn Logger) -> Option<Self> {
        match Self::parse(raw) {
            Ok(config) => Some(config),
            Err(e) => {
                logger.warn(&format!("config not loaded: {e}"));
                None
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_RECALL_RESULTS_LIMIT).contains(&self.max_recall_results) {
            return Err(ConfigError::Validation(format!(
                "maxRecallResults must be between 1 and {MAX_RECALL_RESULTS_LIMIT}"
            )));
        }

        if !(0.0..=1.0).contains(&self.min_evidence_score) {
            return Err(ConfigError::Validation(
                "minEvidenceScore must be between 0.0 and 1.0".into(),
            ));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "baseUrl must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        Ok(())
    }

    /// Recall knobs derived from this config.
    pub fn recall_options(&self) -> RecallOptions {
        RecallOptions {
            max_results: self.max_recall_results,
            mode: self.recall_mode,
            graph_context: self.graph_context,
            ..RecallOptions::default()
        }
    }

    pub fn context_options(&self) -> ContextOptions {
        ContextOptions {
            min_evidence_score: self.min_evidence_score,
        }
    }
}

/// Inline value (with `${VAR}` expansion) if non-empty, else the fallback
/// environment variable.
fn resolve_credential<F>(inline: Option<String>, field: &'static str, env_var: &'static str, env: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match inline.filter(|v| !v.is_empty()) {
        Some(v) => Some(expand_env_vars(&v, env)?),
        None => env(env_var),
    };
    value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingField { field, env_var })
}

/// Replace every `${NAME}` with the variable's value. An unset or empty
/// variable is an error.
pub fn expand_env_vars<F>(value: &str, env: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(value.len());
    let mut last = 0;
    for caps in ENV_REF.captures_iter(value) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let resolved = env(name.as_str())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(name.as_str().to_string()))?;
        out.push_str(&value[last..whole.start()]);
        out.push_str(&resolved);
        last = whole.end();
    }
    out.push_str(&value[last..]);
    Ok(out)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unrecognized config keys: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    #[error("{field} is required: set it in plugin config or via {env_var} env var")]
    MissingField {
        field: &'static str,
        env_var: &'static str,
    },

    #[error("Environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

impl From<ConfigError> for cortexclaw_core::Error {
    fn from(e: ConfigError) -> Self {
        cortexclaw_core::Error::Config { message: e.to_string() }
    }
}
