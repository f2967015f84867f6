//! Configuration for SVG normalization

use serde::Deserialize;

/// Options controlling which normalization steps run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeOptions {
    /// Prefix element ids with the file name and rewrite references
    pub prefix_ids: bool,

    /// Remove `<metadata>` children of the root
    pub strip_metadata: bool,

    /// Add `role`, `focusable` and `preserveAspectRatio` when missing
    pub accessibility: bool,

    /// Value used for `preserveAspectRatio`
    pub preserve_aspect_ratio: String,

    /// Let a bounding-box hint replace an existing `viewBox`
    pub bbox_overrides_viewbox: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            prefix_ids: true,
            strip_metadata: true,
            accessibility: true,
            preserve_aspect_ratio: "xMidYMid meet".to_string(),
            bbox_overrides_viewbox: false,
        }
    }
}

impl NormalizeOptions {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix_ids(mut self, prefix_ids: bool) -> Self {
        self.prefix_ids = prefix_ids;
        self
    }

    pub fn with_strip_metadata(mut self, strip: bool) -> Self {
        self.strip_metadata = strip;
        self
    }

    pub fn with_accessibility(mut self, accessibility: bool) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn with_preserve_aspect_ratio(mut self, value: impl Into<String>) -> Self {
        self.preserve_aspect_ratio = value.into();
        self
    }

    pub fn with_bbox_overrides_viewbox(mut self, overrides: bool) -> Self {
        self.bbox_overrides_viewbox = overrides;
        self
    }
}
