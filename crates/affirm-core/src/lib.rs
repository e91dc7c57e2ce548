pub mod config;
pub mod error;
pub mod events;
pub mod options;
pub mod types;

pub use config::AffirmConfig;
pub use error::{AffirmError, Result};
pub use events::ConfirmEvent;
pub use options::{merge_options, DialogOptions, DialogPatch};
pub use types::*;
