//! Pilot configuration loader.

use crate::interfaces::RuntimeError;
use crate::llm_client::{DEFAULT_API_BASE, DEFAULT_MAX_TOKENS};
use crate::retry::RetryPolicy;
use crate::usage::DEFAULT_MODEL;
use deskpilot_tools::Display;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const MODEL_ENV: &str = "DESKPILOT_MODEL";
pub const API_BASE_ENV: &str = "DESKPILOT_API_BASE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Auto,
    Wayland,
    Macos,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            backoff: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
            self.backoff,
        )
    }
}

/// Everything needed to wire a run together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub model: String,
    pub display: DisplayConfig,
    pub max_iterations: usize,
    pub max_tokens: u32,
    pub api_base_url: String,
    pub gateway_timeout_secs: u64,
    pub device_timeout_ms: u64,
    /// Budget for one dispatch stage, which may issue several device commands.
    pub dispatch_timeout_ms: u64,
    pub backend: BackendKind,
    pub retry: RetryConfig,
    pub confirm_sensitive: bool,
    pub system_prompt: Option<String>,
    /// Only ever taken from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            display: DisplayConfig::default(),
            max_iterations: 25,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_base_url: DEFAULT_API_BASE.to_string(),
            gateway_timeout_secs: 120,
            device_timeout_ms: 10_000,
            dispatch_timeout_ms: 30_000,
            backend: BackendKind::Auto,
            retry: RetryConfig::default(),
            confirm_sensitive: false,
            system_prompt: None,
            api_key: None,
        }
    }
}

impl PilotConfig {
    /// Parse YAML; missing fields take their defaults.
    pub fn from_yaml(content: &str) -> Result<Self, RuntimeError> {
        if content.trim().is_empty() {
            return Err(RuntimeError::ConfigError("Config file is empty".to_string()));
        }
        serde_yaml::from_str(content)
            .map_err(|e| RuntimeError::ConfigError(format!("Invalid YAML: {}", e)))
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(model) = non_empty(MODEL_ENV) {
            self.model = model;
        }
        if let Some(base) = non_empty(API_BASE_ENV) {
            self.api_base_url = base;
        }
    }

    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(RuntimeError::ConfigError(format!(
                "display must be non-empty, got {}x{}",
                self.display.width, self.display.height
            )));
        }
        if self.model.trim().is_empty() {
            return Err(RuntimeError::ConfigError("model cannot be empty".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(RuntimeError::ConfigError(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(RuntimeError::ConfigError(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.dispatch_timeout_ms < self.device_timeout_ms {
            return Err(RuntimeError::ConfigError(format!(
                "dispatch_timeout_ms ({}) must be at least device_timeout_ms ({})",
                self.dispatch_timeout_ms, self.device_timeout_ms
            )));
        }
        if !self.retry.backoff.is_finite() || self.retry.backoff <= 0.0 {
            return Err(RuntimeError::ConfigError(format!(
                "retry.backoff must be a positive finite number, got {}",
                self.retry.backoff
            )));
        }
        Ok(())
    }

    pub fn require_api_key(&self) -> Result<&str, RuntimeError> {
        self.api_key.as_deref().ok_or_else(|| {
            RuntimeError::ConfigError(format!("{} is not set", API_KEY_ENV))
        })
    }

    pub fn logical_display(&self) -> Display {
        Display::new(self.display.width, self.display.height)
    }

    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }
}

/// Load configuration from `path` (defaults when `None`), then apply the
/// process environment and validate.
pub fn load_config(path: Option<&Path>) -> Result<PilotConfig, RuntimeError> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(RuntimeError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            let content = std::fs::read_to_string(path)?;
            PilotConfig::from_yaml(&content)?
        }
        None => PilotConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
