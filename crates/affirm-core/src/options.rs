//! Dialog options and their field-wise merge.
//!
//! `DialogOptions` is the complete record a presenter renders. `DialogPatch`
//! is the partial form supplied at call sites and by `update_dialog`; any
//! field left as `None` keeps the base value.

use serde::{Deserialize, Serialize};

use crate::types::{Icon, Variant};

pub const DEFAULT_CONFIRM_TEXT: &str = "Confirm";
pub const DEFAULT_CANCEL_TEXT: &str = "Cancel";

/// Fully resolved dialog configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogOptions {
    /// Heading of the dialog.
    pub title: String,
    /// Body text shown while no status message is present.
    pub description: String,
    /// Label of the confirm button.
    pub confirm_text: String,
    /// Label of the cancel button.
    pub cancel_text: String,
    /// Optional icon replacing the presenter's default warning glyph.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    /// Emphasis of the confirm button.
    pub variant: Variant,
}

impl Default for DialogOptions {
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

impl DialogOptions {
    /// Return a copy of `self` with every field present in `patch` replaced.
    pub fn merged(&self, patch: &DialogPatch) -> DialogOptions {
        let mut out = self.clone();
        out.apply(patch);
        out
    }

    /// Apply `patch` in place.
    pub fn apply(&mut self, patch: &DialogPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(ref confirm_text) = patch.confirm_text {
            self.confirm_text = confirm_text.clone();
        }
        if let Some(ref cancel_text) = patch.cancel_text {
            self.cancel_text = cancel_text.clone();
        }
        if let Some(ref icon) = patch.icon {
            self.icon = Some(icon.clone());
        }
        if let Some(variant) = patch.variant {
            self.variant = variant;
        }
    }
}

/// Partial dialog options. Unknown fields are rejected when deserializing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialogPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}

impl DialogPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn confirm_text(mut self, text: impl Into<String>) -> Self {
        self.confirm_text = Some(text.into());
        self
    }

    pub fn cancel_text(mut self, text: impl Into<String>) -> Self {
        self.cancel_text = Some(text.into());
        self
    }

    pub fn icon(mut self, icon: Icon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Returns `true` if the patch would leave any base unchanged.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.confirm_text.is_none()
            && self.cancel_text.is_none()
            && self.icon.is_none()
            && self.variant.is_none()
    }
}

/// Field-wise merge of `overrides` onto `base`.
pub fn merge_options(base: &DialogOptions, overrides: &DialogPatch) -> DialogOptions {
    base.merged(overrides)
}
