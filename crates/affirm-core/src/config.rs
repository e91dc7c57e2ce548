use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AffirmError, Result};
use crate::options::{DialogOptions, DEFAULT_CANCEL_TEXT, DEFAULT_CONFIRM_TEXT};
use crate::types::{BusyPolicy, Icon, Variant};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Operation completed successfully";
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Top-level configuration for Affirm.
///
/// Loaded from `~/.affirm/config.toml` by default. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffirmConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub dialog: DialogDefaults,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl AffirmConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AffirmConfig = toml::from_str(&content)?;
        config.engine.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file if it exists.
    ///
    /// A missing file is `Ok(None)`. A file that exists but cannot be read,
    /// parsed or validated is an error, so the caller decides how to report it.
    pub fn load_optional(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Base record that call-site patches are merged onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogDefaults {
    pub title: String,
    pub description: String,
    pub confirm_text: String,
    pub cancel_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    pub variant: Variant,
}

impl Default for DialogDefaults {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            confirm_text: DEFAULT_CONFIRM_TEXT.to_string(),
            cancel_text: DEFAULT_CANCEL_TEXT.to_string(),
            icon: None,
            variant: Variant::Default,
        }
    }
}

impl DialogDefaults {
    pub fn to_options(&self) -> DialogOptions {
        DialogOptions {
            title: self.title.clone(),
            description: self.description.clone(),
            confirm_text: self.confirm_text.clone(),
            cancel_text: self.cancel_text.clone(),
            icon: self.icon.clone(),
            variant: self.variant,
        }
    }
}

/// Orchestrator behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How long the success state stays visible before the dialog closes.
    pub success_close_delay_ms: u64,
    /// Status message shown after the confirm action succeeds.
    pub success_message: String,
    /// Status message used when a failed action carries no message.
    pub error_fallback_message: String,
    /// What `confirm` does while another dialog is open.
    pub busy_policy: BusyPolicy,
    /// Maximum number of waiting requests under `BusyPolicy::Queue`.
    pub max_queue: usize,
    /// Buffer size of the domain event broadcast channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            success_close_delay_ms: 1500,
            success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            error_fallback_message: DEFAULT_ERROR_MESSAGE.to_string(),
            busy_policy: BusyPolicy::Reject,
            max_queue: 16,
            event_capacity: 64,
        }
    }
}

impl EngineConfig {
    pub fn success_close_delay(&self) -> Duration {
        Duration::from_millis(self.success_close_delay_ms)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(AffirmError::Config(
                "engine.event_capacity must be greater than zero".to_string(),
            ));
        }
        if self.busy_policy == BusyPolicy::Queue && self.max_queue == 0 {
            return Err(AffirmError::Config(
                "engine.max_queue must be greater than zero when busy_policy = \"queue\""
                    .to_string(),
            ));
        }
        Ok(())
    }
}
