//! Export font glyphs as individual, normalized SVG files
//!
//! Reading fonts and drawing outlines belongs to a font-editing toolkit; this
//! module only sees glyphs through the [`Glyph`] trait. For every glyph with
//! an outline the driver exports `<out_dir>/<name>.svg`, then normalizes the
//! file using the glyph's bounding box for a square, centered viewBox.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::batch::normalize_file;
use crate::error::NormalizeError;
use crate::normalize::{BoundingBox, NormalizeOptions};

/// Errors from exporting glyphs
#[derive(Debug, Error)]
pub enum GlyphError {
    /// The glyph source could not write the SVG
    #[error("failed to export glyph '{glyph}': {message}")]
    Export { glyph: String, message: String },

    /// The output directory could not be created
    #[error("cannot create output directory '{}': {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The exported file could not be normalized
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl GlyphError {
    pub fn export(glyph: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Export {
            glyph: glyph.into(),
            message: message.into(),
        }
    }
}

/// A glyph as exposed by a font-editing toolkit
pub trait Glyph {
    /// Glyph name as stored in the font (`A`, `uni2192`, `arrow/left`)
    fn name(&self) -> &str;

    /// True when the glyph has no outline to export
    fn is_empty(&self) -> bool;

    /// Outline extent in font units, if the toolkit can compute it
    fn bounding_box(&self) -> Option<BoundingBox>;

    /// Write the glyph outline as an SVG file at `path`
    fn export_svg(&self, path: &Path) -> Result<(), GlyphError>;
}

/// File name for a glyph: path separators and `:` become `_`
pub fn glyph_file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect();
    format!("{}.svg", safe)
}

/// What happened to one glyph
#[derive(Debug)]
pub enum GlyphOutcome {
    /// Exported and normalized
    Exported(PathBuf),
    /// Exported, but normalization failed; the raw export is kept
    ExportedUnnormalized(PathBuf, NormalizeError),
    /// No outline
    Skipped,
    Failed(GlyphError),
}

#[derive(Debug, Default)]
pub struct GlyphExportReport {
    pub glyphs: Vec<(String, GlyphOutcome)>,
}

impl GlyphExportReport {
    /// Glyphs written to disk, normalized or not
    pub fn exported(&self) -> usize {
        self.glyphs
            .iter()
            .filter(|(_, o)| {
                matches!(
                    o,
                    GlyphOutcome::Exported(_) | GlyphOutcome::ExportedUnnormalized(..)
                )
            })
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.glyphs
            .iter()
            .filter(|(_, o)| matches!(o, GlyphOutcome::Skipped))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.glyphs
            .iter()
            .filter(|(_, o)| matches!(o, GlyphOutcome::Failed(_)))
            .count()
    }

    pub fn summary(&self, out_dir: &Path) -> String {
        format!(
            "Exported {} glyphs to {} ({} skipped without outlines, {} failed).",
            self.exported(),
            out_dir.display(),
            self.skipped(),
            self.failed()
        )
    }
}

/// Export and normalize every glyph with an outline
///
/// The only fatal error is failing to create `out_dir`. The bounding box of
/// each glyph replaces the exporter's own viewBox, so `options` is used with
/// `bbox_overrides_viewbox` switched on.
pub fn export_glyphs<'a, G, I>(
    glyphs: I,
    out_dir: &Path,
    options: &NormalizeOptions,
) -> Result<GlyphExportReport, GlyphError>
where
    G: Glyph + 'a,
    I: IntoIterator<Item = &'a G>,
{
    if !out_dir.exists() {
        fs::create_dir_all(out_dir).map_err(|source| GlyphError::OutputDir {
            path: out_dir.to_path_buf(),
            source,
        })?;
        info!(dir = %out_dir.display(), "created output directory");
    }

    let options = options.clone().with_bbox_overrides_viewbox(true);
    let mut report = GlyphExportReport::default();

    for glyph in glyphs {
        let name = glyph.name().to_string();
        let outcome = if glyph.is_empty() {
            GlyphOutcome::Skipped
        } else {
            export_one(glyph, out_dir, &options)
        };
        report.glyphs.push((name, outcome));
    }

    Ok(report)
}

fn export_one<G: Glyph>(glyph: &G, out_dir: &Path, options: &NormalizeOptions) -> GlyphOutcome {
    let path = out_dir.join(glyph_file_name(glyph.name()));
    // Computed before export; toolkits may fail on either independently
    let bbox = glyph.bounding_box();

    if let Err(e) = glyph.export_svg(&path) {
        error!(glyph = glyph.name(), "{}", e);
        return GlyphOutcome::Failed(e);
    }

    match normalize_file(&path, bbox.as_ref(), options, false) {
        Ok(_) => {
            info!(glyph = glyph.name(), file = %path.display(), "exported");
            GlyphOutcome::Exported(path)
        }
        Err(e) => {
            warn!(glyph = glyph.name(), "normalization failed: {}", e);
            GlyphOutcome::ExportedUnnormalized(path, e)
        }
    }
}
