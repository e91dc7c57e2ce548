//! CLI argument definitions for the `affirm` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use affirm_core::options::DialogPatch;
use affirm_core::types::Variant;

/// Affirm: ask a yes/no question in the terminal and run an action on yes.
#[derive(Parser, Debug)]
#[command(name = "affirm", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Dialog title.
    #[arg(short = 't', long = "title")]
    pub title: Option<String>,

    /// Dialog description.
    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,

    /// Label of the confirm button.
    #[arg(long = "confirm-text")]
    pub confirm_text: Option<String>,

    /// Label of the cancel button.
    #[arg(long = "cancel-text")]
    pub cancel_text: Option<String>,

    /// Style the confirm button as destructive.
    #[arg(long = "destructive")]
    pub destructive: bool,

    /// Number of times the simulated action fails before it succeeds.
    #[arg(long = "fail-times", default_value_t = 0)]
    pub fail_times: u32,

    /// Simulated action latency in milliseconds.
    #[arg(long = "action-ms", default_value_t = 0)]
    pub action_ms: u64,

    /// Print every lifecycle event as a JSON line on stderr.
    #[arg(long = "events")]
    pub events: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long = "init-config")]
    pub init_config: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > AFFIRM_CONFIG env var > ~/.affirm/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("AFFIRM_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Dialog overrides given on the command line.
    pub fn dialog_patch(&self) -> DialogPatch {
        let mut patch = DialogPatch::new();
        if let Some(ref title) = self.title {
            patch = patch.title(title.clone());
        }
        if let Some(ref description) = self.description {
            patch = patch.description(description.clone());
        }
        if let Some(ref text) = self.confirm_text {
            patch = patch.confirm_text(text.clone());
        }
        if let Some(ref text) = self.cancel_text {
            patch = patch.cancel_text(text.clone());
        }
        if self.destructive {
            patch = patch.variant(Variant::Destructive);
        }
        patch
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".affirm").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".affirm").join("config.toml");
    }
    PathBuf::from("config.toml")
}
