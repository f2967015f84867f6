//! SVG normalization
//!
//! Rewrites the root attributes of an SVG document and namespaces its
//! identifiers so the image:
//!
//! - scales to its container (a `viewBox` and no fixed `width`/`height`)
//! - can be inlined next to other icons without id collisions
//! - carries accessible defaults (`role="img"`, `focusable="false"`)
//!
//! Every step only adds what is missing or removes what is present, so
//! running [`normalize`] over its own output changes nothing.

mod config;
mod ids;
mod viewbox;

use std::fmt;

use tracing::debug;

use crate::document::{Document, Element, Node};

pub use config::NormalizeOptions;
pub use ids::{collect_id_map, rewrite_ids, rewrite_reference, IdMap, IdPrefix};
pub use viewbox::{viewbox_from_dimensions, BoundingBox, BoundingBoxParseError};

/// Namespace added to an unprefixed root that declares none
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Root attributes that are layout artifacts of the exporting tool
const PRESENTATION_ARTIFACTS: &[&str] = &["overflow", "xml:space"];

/// Where the root `viewBox` came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewBoxSource {
    /// Already present and left alone
    Existing,
    /// Derived from a glyph bounding box
    BoundingBox,
    /// Derived from the root `width`/`height`
    Dimensions,
    /// Could not be derived; the image will not scale
    Missing,
}

impl fmt::Display for ViewBoxSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewBoxSource::Existing => write!(f, "existing"),
            ViewBoxSource::BoundingBox => write!(f, "bounding box"),
            ViewBoxSource::Dimensions => write!(f, "width/height"),
            ViewBoxSource::Missing => write!(f, "missing"),
        }
    }
}

/// A non-fatal problem found while normalizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeWarning {
    /// No viewBox and nothing to derive one from
    MissingViewBox,
    /// Root element is not `<svg>`
    UnexpectedRoot { name: String },
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeWarning::MissingViewBox => {
                write!(f, "no viewBox and no width/height to derive one from")
            }
            NormalizeWarning::UnexpectedRoot { name } => {
                write!(f, "root element is <{}>, not <svg>", name)
            }
        }
    }
}

/// What a normalization pass did to one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    pub viewbox: ViewBoxSource,
    /// Number of `id` declarations that received the prefix
    pub renamed_ids: usize,
    /// Number of `<metadata>` children removed from the root
    pub stripped_metadata: usize,
    pub warnings: Vec<NormalizeWarning>,
}

impl NormalizeReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Normalize a document in place
///
/// `prefix` namespaces the document's ids; `bbox` is an optional glyph
/// bounding box used to derive a square viewBox.
pub fn normalize(
    doc: &mut Document,
    prefix: &IdPrefix,
    bbox: Option<&BoundingBox>,
    options: &NormalizeOptions,
) -> NormalizeReport {
    let root = &mut doc.root;
    let mut warnings = Vec::new();

    if root.local_name() != "svg" {
        warnings.push(NormalizeWarning::UnexpectedRoot {
            name: root.name.clone(),
        });
    }

    let viewbox = ensure_viewbox(root, bbox, options);
    if viewbox == ViewBoxSource::Missing {
        warnings.push(NormalizeWarning::MissingViewBox);
    }

    root.remove_attr("width");
    root.remove_attr("height");
    for name in PRESENTATION_ARTIFACTS {
        root.remove_attr(name);
    }

    if options.accessibility {
        root.set_attr_if_absent("role", "img");
        root.set_attr_if_absent("focusable", "false");
        root.set_attr_if_absent("preserveAspectRatio", options.preserve_aspect_ratio.as_str());
    }

    if root.prefix().is_none() && !root.has_attr("xmlns") {
        root.set_attr("xmlns", SVG_NAMESPACE);
    }

    let mut renamed_ids = 0;
    if options.prefix_ids {
        let map = collect_id_map(root, prefix);
        renamed_ids = rewrite_ids(root, &map);
        debug!(prefix = %prefix, renamed = renamed_ids, "prefixed identifiers");
    }

    let stripped_metadata = if options.strip_metadata {
        strip_metadata(root)
    } else {
        0
    };

    NormalizeReport {
        viewbox,
        renamed_ids,
        stripped_metadata,
        warnings,
    }
}

fn ensure_viewbox(
    root: &mut Element,
    bbox: Option<&BoundingBox>,
    options: &NormalizeOptions,
) -> ViewBoxSource {
    let has_viewbox = root.has_attr("viewBox");
    if has_viewbox && !(options.bbox_overrides_viewbox && bbox.is_some()) {
        return ViewBoxSource::Existing;
    }

    if let Some(viewbox) = bbox.and_then(BoundingBox::square_viewbox) {
        debug!(%viewbox, "viewBox from bounding box");
        root.set_attr("viewBox", viewbox);
        return ViewBoxSource::BoundingBox;
    }

    if has_viewbox {
        // Degenerate bbox: keep what the exporter wrote
        return ViewBoxSource::Existing;
    }

    let derived = match (root.attr("width"), root.attr("height")) {
        (Some(w), Some(h)) => viewbox_from_dimensions(w, h),
        _ => None,
    };
    match derived {
        Some(viewbox) => {
            debug!(%viewbox, "viewBox from width/height");
            root.set_attr("viewBox", viewbox);
            ViewBoxSource::Dimensions
        }
        None => ViewBoxSource::Missing,
    }
}

/// Remove direct `<metadata>` children; nested ones stay
///
/// Whitespace right after a removed element goes with it, so no blank
/// indentation line is left behind.
fn strip_metadata(root: &mut Element) -> usize {
    let mut stripped = 0;
    let mut drop_whitespace = false;
    root.children.retain(|node| {
        if matches!(node, Node::Element(e) if e.local_name() == "metadata") {
            stripped += 1;
            drop_whitespace = true;
            return false;
        }
        let keep = !(drop_whitespace && node.is_whitespace());
        drop_whitespace = false;
        keep
    });
    if stripped > 0 {
        debug!(count = stripped, "stripped metadata");
    }
    stripped
}
