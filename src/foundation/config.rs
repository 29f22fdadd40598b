//! Tunable constants and font search lists.
//!
//! Every threshold and percentage below was tuned against the current episode template artwork.
//! They have no derivation beyond that; recalibrate them here if the template changes.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::FontWeight;
use crate::foundation::error::{BadgeError, BadgeResult};

/// Color channel sampled by the zone detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Red channel.
    Red,
    /// Green channel.
    Green,
    /// Blue channel.
    Blue,
}

impl Channel {
    /// Offset of the channel within an RGB pixel.
    pub fn offset(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Safe-zone detection constants.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoneConfig {
    /// Channel separating the light badge from the artwork.
    pub channel: Channel,
    /// A pixel is light when its channel value is strictly above this.
    pub light_threshold: u8,
    /// Minimum share of a row's pixels that must be light.
    pub min_light_fraction: f64,
    /// Maximum distance of a row's light centroid from the image center, as a share of width.
    pub center_tolerance: f64,
    /// Minimum light span of an accepted row, as a share of width.
    pub min_span_fraction: f64,
    /// Inward margin added below the first accepted row, as a share of height.
    pub top_margin: f64,
    /// Inward margin removed above the last accepted row, as a share of height.
    pub bottom_margin: f64,
    /// Share of the narrowest accepted span usable for text.
    pub width_factor: f64,
    /// Fallback zone top, as a share of height.
    pub fallback_top: f64,
    /// Fallback zone bottom, as a share of height.
    pub fallback_bottom: f64,
    /// Fallback zone width, as a share of width.
    pub fallback_width: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            channel: Channel::Green,
            light_threshold: 120,
            min_light_fraction: 0.30,
            center_tolerance: 0.15,
            min_span_fraction: 0.55,
            top_margin: 0.04,
            bottom_margin: 0.02,
            width_factor: 0.82,
            fallback_top: 0.06,
            fallback_bottom: 0.46,
            fallback_width: 0.72,
        }
    }
}

/// Point-size search constants. Point sizes are given at `reference_width` and scaled linearly.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// Template width the reference sizes were tuned at.
    pub reference_width: u32,
    /// Hard floor of every size search.
    pub min_size_pt: u32,
    /// Two-tier: course name starting size.
    pub course_ceiling_pt: u32,
    /// Two-tier: max share of zone height the course block may take.
    pub course_height_budget: f64,
    /// Two-tier: unit name size relative to the course size.
    pub unit_size_ratio: f64,
    /// Two-tier: unit name wrap width relative to the safe width.
    pub unit_width_factor: f64,
    /// Three-tier: shared course/unit name starting size.
    pub shared_ceiling_pt: u32,
    /// Three-tier: fixed unit number size.
    pub unit_number_pt: u32,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            reference_width: 800,
            min_size_pt: 14,
            course_ceiling_pt: 28,
            course_height_budget: 0.45,
            unit_size_ratio: 0.55,
            unit_width_factor: 0.85,
            shared_ceiling_pt: 50,
            unit_number_pt: 36,
        }
    }
}

/// Vertical spacing and paint.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposeConfig {
    /// Minimum gap between stacked tiers.
    pub inter_gap_min_px: u32,
    /// Gap between stacked tiers as a share of image height, when above the minimum.
    pub inter_gap_fraction: f64,
    /// Gap between lines of the course name.
    pub course_line_gap_px: u32,
    /// Gap between lines of the unit name.
    pub unit_line_gap_px: u32,
    /// Gap between lines of the unit number.
    pub number_line_gap_px: u32,
    /// Straight RGBA text color.
    pub text_rgba: [u8; 4],
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            inter_gap_min_px: 28,
            inter_gap_fraction: 0.06,
            course_line_gap_px: 8,
            unit_line_gap_px: 6,
            number_line_gap_px: 6,
            text_rgba: [255, 255, 255, 255],
        }
    }
}

/// All layout constants.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Zone detection.
    pub zone: ZoneConfig,
    /// Size search.
    pub fit: FitConfig,
    /// Composition.
    pub compose: ComposeConfig,
}

impl LayoutConfig {
    /// Reject values the algorithms cannot work with.
    pub fn validate(&self) -> BadgeResult<()> {
        let z = &self.zone;
        let unit_fractions = [
            ("zone.min_light_fraction", z.min_light_fraction),
            ("zone.center_tolerance", z.center_tolerance),
            ("zone.min_span_fraction", z.min_span_fraction),
            ("zone.top_margin", z.top_margin),
            ("zone.bottom_margin", z.bottom_margin),
            ("zone.width_factor", z.width_factor),
            ("zone.fallback_top", z.fallback_top),
            ("zone.fallback_bottom", z.fallback_bottom),
            ("zone.fallback_width", z.fallback_width),
            ("fit.course_height_budget", self.fit.course_height_budget),
            ("fit.unit_size_ratio", self.fit.unit_size_ratio),
            ("fit.unit_width_factor", self.fit.unit_width_factor),
            ("compose.inter_gap_fraction", self.compose.inter_gap_fraction),
        ];
        for (name, v) in unit_fractions {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(BadgeError::validation(format!(
                    "{name} must be a finite fraction in [0, 1], got {v}"
                )));
            }
        }
        if z.fallback_top >= z.fallback_bottom {
            return Err(BadgeError::validation(
                "zone.fallback_top must be below zone.fallback_bottom",
            ));
        }
        if self.fit.reference_width == 0 {
            return Err(BadgeError::validation("fit.reference_width must be > 0"));
        }
        if self.fit.min_size_pt == 0 {
            return Err(BadgeError::validation("fit.min_size_pt must be > 0"));
        }
        Ok(())
    }
}

/// Where fonts are looked up, in priority order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontSearchConfig {
    /// Directories scanned for the preferred faces, bundled directory first.
    pub dirs: Vec<PathBuf>,
    /// File stems of the preferred extra-bold face.
    pub extrabold_stems: Vec<String>,
    /// File stems of the preferred medium face.
    pub medium_stems: Vec<String>,
    /// Generic font files tried when no preferred extra-bold face exists.
    pub extrabold_fallbacks: Vec<PathBuf>,
    /// Generic font files tried when no preferred medium face exists.
    pub medium_fallbacks: Vec<PathBuf>,
    /// Query the system font database before giving up on outline fonts.
    pub system_fonts: bool,
}

impl Default for FontSearchConfig {
    fn default() -> Self {
        Self::platform_default(Path::new("fonts"))
    }
}

impl FontSearchConfig {
    /// Bundled `bundled_dir` first, then the usual Windows, macOS and Linux font directories.
    pub fn platform_default(bundled_dir: &Path) -> Self {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let user_profile = std::env::var_os("USERPROFILE")
            .map(PathBuf::from)
            .or_else(|| home.clone());

        let mut dirs = vec![bundled_dir.to_path_buf(), PathBuf::from("C:/Windows/Fonts")];
        if let Some(local) = std::env::var_os("LOCALAPPDATA").filter(|v| !v.is_empty()) {
            dirs.push(PathBuf::from(local).join("Microsoft/Windows/Fonts"));
        }
        if let Some(profile) = &user_profile {
            dirs.push(profile.join("AppData/Local/Microsoft/Windows/Fonts"));
        }
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Some(home) = &home {
            dirs.push(home.join("Library/Fonts"));
            dirs.push(home.join(".local/share/fonts"));
        }
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));

        let strings = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let paths = |xs: &[&str]| xs.iter().map(PathBuf::from).collect::<Vec<_>>();

        Self {
            dirs,
            extrabold_stems: strings(&[
                "Montserrat-ExtraBold",
                "Montserrat-Heavy",
                "montserrat-extrabold",
                "Montserrat ExtraBold",
                "MontserratExtraBold",
            ]),
            medium_stems: strings(&[
                "Montserrat-Medium",
                "montserrat-medium",
                "Montserrat Medium",
                "MontserratMedium",
                "Montserrat-Regular",
            ]),
            extrabold_fallbacks: paths(&[
                "C:/Windows/Fonts/arialbd.ttf",
                "C:/Windows/Fonts/calibrib.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            ]),
            medium_fallbacks: paths(&[
                "C:/Windows/Fonts/arial.ttf",
                "C:/Windows/Fonts/calibri.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
                "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            ]),
            system_fonts: true,
        }
    }

    /// No directories, no fallbacks, no system lookup: always resolves to the built-in font.
    pub fn builtin_only() -> Self {
        Self {
            dirs: vec![],
            extrabold_stems: vec![],
            medium_stems: vec![],
            extrabold_fallbacks: vec![],
            medium_fallbacks: vec![],
            system_fonts: false,
        }
    }

    /// Preferred file stems for `weight`.
    pub fn stems(&self, weight: FontWeight) -> &[String] {
        match weight {
            FontWeight::ExtraBold => &self.extrabold_stems,
            FontWeight::Medium => &self.medium_stems,
        }
    }

    /// Generic fallback files for `weight`.
    pub fn fallbacks(&self, weight: FontWeight) -> &[PathBuf] {
        match weight {
            FontWeight::ExtraBold => &self.extrabold_fallbacks,
            FontWeight::Medium => &self.medium_fallbacks,
        }
    }
}

/// Complete engine configuration, as loaded from a JSON file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Layout constants.
    pub layout: LayoutConfig,
    /// Font lookup.
    pub fonts: FontSearchConfig,
}

impl Config {
    /// Parse a JSON config.
    pub fn from_json_str(s: &str) -> BadgeResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| BadgeError::serde(e.to_string()))?;
        cfg.layout.validate()?;
        Ok(cfg)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: &Path) -> BadgeResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
