use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Stroke width of the focus outline; dimming panels overlap by it.
    pub outline_width: f64,
    /// Minimum room above the target before the toolbar flips below it.
    pub top_edge_buffer: f64,
    /// Minimum room to the right edge before the toolbar right aligns.
    pub right_edge_buffer: f64,
    /// Least gap between a left aligned toolbar and the page edge.
    pub toolbar_edge_buffer: f64,
    #[serde(rename = "inlineRepositionThrottleMs", with = "millis")]
    pub inline_reposition_throttle: Duration,
    #[serde(rename = "pasteDebounceMs", with = "millis")]
    pub paste_debounce: Duration,
    pub outline_color: String,
    pub disabled_outline_color: String,
    pub parent_breadcrumb_depth: usize,
    pub master_locale: String,
    pub hover_outline: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            outline_width: 4.0,
            top_edge_buffer: 42.0,
            right_edge_buffer: 180.0,
            toolbar_edge_buffer: 8.0,
            inline_reposition_throttle: Duration::from_millis(200),
            paste_debounce: Duration::from_millis(100),
            outline_color: "#715cdd".to_string(),
            disabled_outline_color: "#909090".to_string(),
            parent_breadcrumb_depth: 2,
            master_locale: "en-us".to_string(),
            hover_outline: true,
        }
    }
}

impl EditorOptions {
    /// Reads options from the embedder's configuration object; missing keys
    /// keep their defaults.
    pub fn from_json(value: &Value) -> Result<Self> {
        EditorOptions::deserialize(value).context("invalid editor options")
    }

    pub fn with_outline_width(mut self, width: f64) -> Self {
        self.outline_width = width;
        self
    }

    pub fn with_edge_buffers(mut self, top: f64, right: f64) -> Self {
        self.top_edge_buffer = top;
        self.right_edge_buffer = right;
        self
    }

    pub fn with_inline_reposition_throttle(mut self, interval: Duration) -> Self {
        self.inline_reposition_throttle = interval;
        self
    }

    pub fn with_paste_debounce(mut self, interval: Duration) -> Self {
        self.paste_debounce = interval;
        self
    }

    pub fn with_outline_colors(
        mut self,
        outline: impl Into<String>,
        disabled: impl Into<String>,
    ) -> Self {
        self.outline_color = outline.into();
        self.disabled_outline_color = disabled.into();
        self
    }

    pub fn with_parent_breadcrumb_depth(mut self, depth: usize) -> Self {
        self.parent_breadcrumb_depth = depth;
        self
    }

    pub fn with_master_locale(mut self, locale: impl Into<String>) -> Self {
        self.master_locale = locale.into();
        self
    }

    pub fn with_hover_outline(mut self, enabled: bool) -> Self {
        self.hover_outline = enabled;
        self
    }

    pub(crate) fn outline_tone(&self, disabled: bool) -> &str {
        if disabled {
            &self.disabled_outline_color
        } else {
            &self.outline_color
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
