use crate::foundation::error::{BadgeError, BadgeResult};

/// Pixel dimensions of a raster image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Build a canvas, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> BadgeResult<Self> {
        if width == 0 || height == 0 {
            return Err(BadgeError::validation("image dimensions must be non-zero"));
        }
        Ok(Self { width, height })
    }

    /// Canvas of an `image` buffer.
    pub fn of(img: &image::RgbImage) -> BadgeResult<Self> {
        let (w, h) = img.dimensions();
        Self::new(w, h)
    }

    /// `width / reference_width`, the factor applied to reference point sizes.
    pub fn scale_from(self, reference_width: u32) -> f64 {
        f64::from(self.width) / f64::from(reference_width.max(1))
    }
}

/// Font boldness category used to pick a face.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Heavy face used for course and unit names.
    ExtraBold,
    /// Lighter face used for secondary text.
    Medium,
}

impl FontWeight {
    /// All weights, in resolution order.
    pub const ALL: [FontWeight; 2] = [FontWeight::ExtraBold, FontWeight::Medium];

    /// CSS-style numeric weight.
    pub fn numeric(self) -> u16 {
        match self {
            FontWeight::ExtraBold => 800,
            FontWeight::Medium => 500,
        }
    }

    /// Lowercase name, as used in config files and logs.
    pub fn name(self) -> &'static str {
        match self {
            FontWeight::ExtraBold => "extrabold",
            FontWeight::Medium => "medium",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            FontWeight::ExtraBold => 0,
            FontWeight::Medium => 1,
        }
    }
}

impl std::fmt::Display for FontWeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Vertical band of the template where text may be drawn.
///
/// Invariants: `top < bottom <= canvas.height` and `0 < width <= canvas.width`. Lines drawn in the
/// zone are centered on `center_x` and never wider than `width`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SafeZone {
    /// First usable row.
    pub top: u32,
    /// Row past the last usable one.
    pub bottom: u32,
    /// Horizontal center lines are aligned on.
    pub center_x: u32,
    /// Maximum line width in pixels.
    pub width: u32,
}

impl SafeZone {
    /// Build a zone and check it against the canvas it was detected on.
    pub fn new(top: u32, bottom: u32, center_x: u32, width: u32, canvas: Canvas) -> BadgeResult<Self> {
        if top >= bottom {
            return Err(BadgeError::validation(format!(
                "safe zone top ({top}) must be above bottom ({bottom})"
            )));
        }
        if bottom > canvas.height {
            return Err(BadgeError::validation(format!(
                "safe zone bottom ({bottom}) exceeds image height ({})",
                canvas.height
            )));
        }
        if width == 0 || width > canvas.width {
            return Err(BadgeError::validation(format!(
                "safe zone width ({width}) must be in 1..={}",
                canvas.width
            )));
        }
        Ok(Self {
            top,
            bottom,
            center_x,
            width,
        })
    }

    /// Usable height in pixels.
    pub fn height(self) -> u32 {
        self.bottom - self.top
    }
}

/// `floor(value * fraction)` for non-negative inputs; matches integer truncation of a scaled
/// pixel count.
pub fn scaled_px(value: u32, fraction: f64) -> u32 {
    let v = f64::from(value) * fraction;
    if v.is_finite() && v > 0.0 {
        v as u32
    } else {
        0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
