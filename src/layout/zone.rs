//! Safe-zone detection.
//!
//! The template carries a light, horizontally symmetric badge behind the title area. Rows that
//! belong to it are light over a wide span centered on the image; decorative artwork is either
//! off-center or narrow. Detection is two explicit passes over the pixels, O(width * height):
//!
//! 1. [`scan_rows`] collects per-row light-pixel statistics.
//! 2. [`accepted_rows`] keeps rows whose centroid and span match the badge.

use crate::foundation::{
    config::ZoneConfig,
    core::{Canvas, SafeZone, scaled_px},
    error::BadgeResult,
};

/// Light-pixel statistics for one row with enough light pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowStats {
    /// Number of light pixels.
    pub count: u32,
    /// Mean x of the light pixels.
    pub centroid_x: f64,
    /// Leftmost light pixel.
    pub min_x: u32,
    /// Rightmost light pixel.
    pub max_x: u32,
}

impl RowStats {
    /// Horizontal extent, `max_x - min_x`.
    pub fn span(&self) -> u32 {
        self.max_x - self.min_x
    }
}

/// How the zone was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ZoneSource {
    /// Derived from `rows` accepted badge rows.
    Detected {
        /// Number of accepted rows.
        rows: u32,
    },
    /// No usable badge rows; the fixed fallback band was used.
    Fallback,
}

/// Result of zone detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ZoneAnalysis {
    /// The zone text is laid out in.
    pub zone: SafeZone,
    /// Whether it was detected or substituted.
    pub source: ZoneSource,
}

/// Pass 1: statistics for every row, `None` where fewer than `min_light_fraction` of the pixels
/// are light.
pub fn scan_rows(img: &image::RgbImage, cfg: &ZoneConfig) -> Vec<Option<RowStats>> {
    let (w, _) = img.dimensions();
    let channel = cfg.channel.offset();
    let min_count = f64::from(w) * cfg.min_light_fraction;

    img.rows()
        .map(|row| {
            let mut count = 0u32;
            let mut sum_x = 0u64;
            let mut min_x = u32::MAX;
            let mut max_x = 0u32;
            for (x, px) in row.enumerate() {
                if px.0[channel] > cfg.light_threshold {
                    let x = x as u32;
                    count += 1;
                    sum_x += u64::from(x);
                    min_x = min_x.min(x);
                    max_x = max_x.max(x);
                }
            }
            if count == 0 || f64::from(count) < min_count {
                return None;
            }
            Some(RowStats {
                count,
                centroid_x: sum_x as f64 / f64::from(count),
                min_x,
                max_x,
            })
        })
        .collect()
}

/// Pass 2: indices of rows centered within `center_tolerance` of the image center and spanning
/// more than `min_span_fraction` of the width.
pub fn accepted_rows(stats: &[Option<RowStats>], width: u32, cfg: &ZoneConfig) -> Vec<u32> {
    let w = f64::from(width);
    let center = w / 2.0;
    stats
        .iter()
        .enumerate()
        .filter_map(|(row, s)| {
            let s = s.as_ref()?;
            let centered = (s.centroid_x - center).abs() < w * cfg.center_tolerance;
            let wide = f64::from(s.span()) > w * cfg.min_span_fraction;
            (centered && wide).then_some(row as u32)
        })
        .collect()
}

/// Detect the safe zone of `img`.
pub fn detect_zone(img: &image::RgbImage, cfg: &ZoneConfig) -> BadgeResult<SafeZone> {
    Ok(analyze_zone(img, cfg)?.zone)
}

/// Detect the safe zone of `img` and report whether the fallback band was used.
///
/// Never fails on image content: no accepted rows, or margins that collapse the band, produce the
/// fallback zone. Only a zero-sized image is rejected.
#[tracing::instrument(skip(img, cfg), fields(width = img.width(), height = img.height()))]
pub fn analyze_zone(img: &image::RgbImage, cfg: &ZoneConfig) -> BadgeResult<ZoneAnalysis> {
    let canvas = Canvas::of(img)?;
    let stats = scan_rows(img, cfg);
    let rows = accepted_rows(&stats, canvas.width, cfg);

    let (Some(&first), Some(&last)) = (rows.first(), rows.last()) else {
        tracing::warn!("no badge rows detected, using fallback zone");
        return fallback(canvas, cfg);
    };

    let top = first.saturating_add(scaled_px(canvas.height, cfg.top_margin));
    let bottom = last.saturating_sub(scaled_px(canvas.height, cfg.bottom_margin));
    if top >= bottom {
        tracing::warn!(
            first,
            last,
            "badge band too thin after margins, using fallback zone"
        );
        return fallback(canvas, cfg);
    }

    let min_span = rows
        .iter()
        .filter_map(|&r| stats[r as usize].map(|s| s.span()))
        .min()
        .unwrap_or(canvas.width);
    let width = scaled_px(min_span, cfg.width_factor).clamp(1, canvas.width);

    let zone = SafeZone::new(top, bottom, canvas.width / 2, width, canvas)?;
    tracing::debug!(?zone, rows = rows.len(), "detected safe zone");
    Ok(ZoneAnalysis {
        zone,
        source: ZoneSource::Detected {
            rows: rows.len() as u32,
        },
    })
}

/// Fixed band used when the badge cannot be found.
pub fn fallback_zone(canvas: Canvas, cfg: &ZoneConfig) -> BadgeResult<SafeZone> {
    let h = canvas.height;
    let bottom = scaled_px(h, cfg.fallback_bottom).min(h);
    let top = scaled_px(h, cfg.fallback_top).min(bottom.saturating_sub(1));
    let bottom = bottom.max(top + 1).min(h);
    let width = scaled_px(canvas.width, cfg.fallback_width).clamp(1, canvas.width);
    SafeZone::new(top, bottom, canvas.width / 2, width, canvas)
}

fn fallback(canvas: Canvas, cfg: &ZoneConfig) -> BadgeResult<ZoneAnalysis> {
    Ok(ZoneAnalysis {
        zone: fallback_zone(canvas, cfg)?,
        source: ZoneSource::Fallback,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/zone.rs"]
mod tests;
