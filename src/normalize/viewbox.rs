//! viewBox derivation from a glyph bounding box or from fixed dimensions

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Anything that is not part of a plain decimal number (units, signs, `%`)
static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.]").unwrap());

/// Glyph extent in font units: (xmin, ymin, xmax, ymax)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Square viewBox centered on the box, side = the larger extent
    ///
    /// Non-square glyphs end up centered instead of stretched. Returns
    /// `None` for a degenerate box (side not positive).
    pub fn square_viewbox(&self) -> Option<String> {
        let size = self.width().max(self.height());
        if !size.is_finite() || size <= 0.0 {
            return None;
        }
        let cx = (self.x_min + self.x_max) / 2.0;
        let cy = (self.y_min + self.y_max) / 2.0;
        Some(format!(
            "{} {} {} {}",
            format_offset(cx - size / 2.0),
            format_offset(cy - size / 2.0),
            size,
            size
        ))
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x_min, self.y_min, self.x_max, self.y_max)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid bounding box '{input}': expected XMIN,YMIN,XMAX,YMAX")]
pub struct BoundingBoxParseError {
    pub input: String,
}

impl FromStr for BoundingBox {
    type Err = BoundingBoxParseError;

    /// Parse `xmin,ymin,xmax,ymax`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || BoundingBoxParseError {
            input: s.to_string(),
        };
        let values: Vec<f64> = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| err())?;
        match values.as_slice() {
            [x_min, y_min, x_max, y_max] => Ok(Self::new(*x_min, *y_min, *x_max, *y_max)),
            _ => Err(err()),
        }
    }
}

/// `"0 0 <w> <h>"` from `width`/`height` values with their units stripped
///
/// Both values must still contain a digit once everything except digits and
/// `.` is removed.
pub fn viewbox_from_dimensions(width: &str, height: &str) -> Option<String> {
    let w = strip_units(width)?;
    let h = strip_units(height)?;
    Some(format!("0 0 {} {}", w, h))
}

fn strip_units(value: &str) -> Option<String> {
    let numeric = NON_NUMERIC.replace_all(value, "");
    if numeric.chars().any(|c| c.is_ascii_digit()) {
        Some(numeric.into_owned())
    } else {
        None
    }
}

/// Offsets always carry a fractional part (`-5.0`, `12.5`)
fn format_offset(value: f64) -> String {
    // -0.0 + 0.0 == +0.0
    let value = value + 0.0;
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
