//! svgnorm - normalize SVG icons for inlining and scaling
//!
//! This library rewrites SVG documents so they scale to their container,
//! can be combined into one page or sprite without id collisions, and carry
//! accessible defaults. It also drives glyph export from a font-editing
//! toolkit, normalizing each exported glyph as it goes.
//!
//! # Example
//!
//! ```rust
//! use svgnorm::{normalize_str, IdPrefix, NormalizeOptions};
//!
//! let (svg, report) = normalize_str(
//!     r#"<svg width="24px" height="24px"><path id="p"/></svg>"#,
//!     &IdPrefix::from_file_stem("home"),
//!     None,
//!     &NormalizeOptions::default(),
//! )
//! .unwrap();
//!
//! assert!(svg.contains(r#"viewBox="0 0 24 24""#));
//! assert!(svg.contains(r#"id="home_p""#));
//! assert_eq!(report.renamed_ids, 1);
//! ```

pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod glyph;
pub mod normalize;

pub use batch::{
    collect_svg_files, normalize_dir, normalize_file, normalize_str, run_batch, BatchOptions,
    BatchReport, FileOutcome,
};
pub use config::{Config, ConfigError};
pub use document::{Document, Element, Node};
pub use error::NormalizeError;
pub use glyph::{export_glyphs, Glyph, GlyphError, GlyphExportReport, GlyphOutcome};
pub use normalize::{
    normalize, BoundingBox, IdPrefix, NormalizeOptions, NormalizeReport, NormalizeWarning,
    ViewBoxSource,
};
