//! Runtime settings for the model endpoint and local command execution.
//!
//! Values come from defaults, then `COMMIT_ASSIST_*` environment variables,
//! then command-line overrides applied by the binary.

use std::env;
use std::time::Duration;

use tracing::warn;

/// Default chat-completion base URL (an OpenAI-compatible local server).
pub const DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";

/// Model name sent when none is configured.
pub const FALLBACK_MODEL: &str = "local-model";

/// Sampling temperature for commit message generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// Default deadline for the model call (3 minutes).
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 180;

/// Default deadline for a single local git command.
const DEFAULT_GIT_TIMEOUT_SECS: u64 = 120;

/// Number of re-stage-and-retry cycles when the staged diff comes back blank.
pub const DEFAULT_EMPTY_DIFF_RETRIES: u32 = 1;

pub const BASE_URL_ENV_VAR: &str = "COMMIT_ASSIST_BASE_URL";
pub const MODEL_ENV_VAR: &str = "COMMIT_ASSIST_MODEL";
pub const LLM_TIMEOUT_ENV_VAR: &str = "COMMIT_ASSIST_LLM_TIMEOUT";
pub const GIT_TIMEOUT_ENV_VAR: &str = "COMMIT_ASSIST_GIT_TIMEOUT";
pub const EMPTY_DIFF_RETRIES_ENV_VAR: &str = "COMMIT_ASSIST_EMPTY_DIFF_RETRIES";

/// Settings shared by the gateway, the process runner and the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    /// Model identifier; may be blank, see [`Settings::effective_model`].
    pub model: String,
    pub temperature: f32,
    pub llm_timeout: Duration,
    pub git_timeout: Duration,
    pub empty_diff_retries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            llm_timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
            git_timeout: Duration::from_secs(DEFAULT_GIT_TIMEOUT_SECS),
            empty_diff_retries: DEFAULT_EMPTY_DIFF_RETRIES,
        }
    }
}

impl Settings {
    /// Build settings from defaults overlaid with `COMMIT_ASSIST_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            base_url: string_from_env(BASE_URL_ENV_VAR).unwrap_or(defaults.base_url),
            model: string_from_env(MODEL_ENV_VAR).unwrap_or(defaults.model),
            temperature: defaults.temperature,
            llm_timeout: timeout_from_env(LLM_TIMEOUT_ENV_VAR, DEFAULT_LLM_TIMEOUT_SECS),
            git_timeout: timeout_from_env(GIT_TIMEOUT_ENV_VAR, DEFAULT_GIT_TIMEOUT_SECS),
            empty_diff_retries: number_from_env(
                EMPTY_DIFF_RETRIES_ENV_VAR,
                u64::from(DEFAULT_EMPTY_DIFF_RETRIES),
            )
            .try_into()
            .unwrap_or(DEFAULT_EMPTY_DIFF_RETRIES),
        }
    }

    /// Apply command-line overrides. Blank overrides are ignored.
    pub fn with_overrides(mut self, base_url: Option<String>, model: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(model) = model {
            self.model = model.trim().to_string();
        }
        self
    }

    /// The model name actually sent to the endpoint.
    pub fn effective_model(&self) -> &str {
        let model = self.model.trim();
        if model.is_empty() { FALLBACK_MODEL } else { model }
    }
}

fn string_from_env(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a non-negative integer from the environment.
///
/// Logs a warning if the variable is set but is not a valid number.
fn number_from_env(var: &str, default: u64) -> u64 {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => match v.trim().parse::<u64>() {
            Ok(n) => n,
            Err(_) => {
                warn!("Invalid {} value '{}', using default {}", var, v, default);
                default
            }
        },
        _ => default,
    }
}

/// Read a timeout in seconds. Zero would expire every call at once, so it
/// falls back to the default with a warning.
fn timeout_from_env(var: &str, default_secs: u64) -> Duration {
    match number_from_env(var, default_secs) {
        0 => {
            warn!("{} must be greater than zero, using default {}", var, default_secs);
            Duration::from_secs(default_secs)
        }
        secs => Duration::from_secs(secs),
    }
}
