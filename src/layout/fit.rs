//! Point-size search.
//!
//! Sizes are tried from a width-scaled ceiling down to a hard floor, one point at a time. Fit is
//! not monotonic across line-count changes, so the descent is linear rather than a bisection; it
//! always terminates and returns the largest size that fits, or the floor when nothing does.

use crate::{
    assets::{
        fonts::{FontHandle, FontProvider},
        text::TextLayoutEngine,
    },
    foundation::{
        config::LayoutConfig,
        core::{Canvas, FontWeight, SafeZone, scaled_px},
        error::{BadgeError, BadgeResult},
    },
    layout::wrap::{WrappedBlock, wrap_to_fit},
};

/// Text fields of one episode.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EpisodeText {
    /// Course title.
    pub course_name: String,
    /// Unit title.
    pub unit_name: String,
    /// Unit label such as "Unit 3"; selects the three-tier layout when non-blank.
    #[serde(default)]
    pub unit_number: Option<String>,
}

impl EpisodeText {
    /// Two-tier text.
    pub fn new(course_name: impl Into<String>, unit_name: impl Into<String>) -> Self {
        Self {
            course_name: course_name.into(),
            unit_name: unit_name.into(),
            unit_number: None,
        }
    }

    /// Add a unit number, switching to the three-tier layout.
    pub fn with_unit_number(mut self, unit_number: impl Into<String>) -> Self {
        self.unit_number = Some(unit_number.into());
        self
    }

    fn unit_number_text(&self) -> Option<&str> {
        self.unit_number
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }
}

/// Role of a tier in the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierRole {
    /// Course title.
    CourseName,
    /// Unit title.
    UnitName,
    /// Unit label.
    UnitNumber,
}

/// Which stacking scheme was used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutVariant {
    /// Course name and unit name.
    TwoTier,
    /// Course name, unit name and unit number.
    ThreeTier,
}

/// One laid-out text field.
#[derive(Clone, Debug)]
pub struct TextTier {
    /// Field role.
    pub role: TierRole,
    /// Source text.
    pub text: String,
    /// Font at the chosen size.
    pub font: FontHandle,
    /// Wrapped lines.
    pub block: WrappedBlock,
    /// Gap between lines of this tier.
    pub line_gap: u32,
}

impl TextTier {
    /// Assigned weight.
    pub fn weight(&self) -> FontWeight {
        self.font.weight()
    }

    /// Chosen point size.
    pub fn size_pt(&self) -> u32 {
        self.font.size_pt()
    }

    /// Height of the wrapped block including line gaps.
    pub fn block_height(&self) -> u32 {
        self.block.block_height(self.line_gap)
    }
}

/// Tiers in drawing order plus the gap between them.
#[derive(Clone, Debug)]
pub struct TierStack {
    /// Scheme used.
    pub variant: LayoutVariant,
    /// Tiers, top to bottom.
    pub tiers: Vec<TextTier>,
    /// Gap between consecutive tiers.
    pub inter_gap: u32,
    /// The searched size hit the floor without fitting.
    pub overflowed: bool,
}

impl TierStack {
    /// Stack height: all blocks plus the gaps between them.
    pub fn total_height(&self) -> u32 {
        let blocks = self.tiers.iter().map(TextTier::block_height).sum::<u32>();
        blocks + self.inter_gap * (self.tiers.len().saturating_sub(1) as u32)
    }
}

/// Gap between stacked tiers: a share of image height, never below the configured minimum.
pub fn inter_gap(canvas: Canvas, cfg: &LayoutConfig) -> u32 {
    cfg.compose
        .inter_gap_min_px
        .max(scaled_px(canvas.height, cfg.compose.inter_gap_fraction))
}

/// Fixed unit-number size: the reference size scaled by image width.
pub fn unit_number_size(canvas: Canvas, cfg: &LayoutConfig) -> u32 {
    let scale = canvas.scale_from(cfg.fit.reference_width);
    scaled_px(cfg.fit.unit_number_pt, scale).max(1)
}

/// Candidate sizes from `ceiling` down to `floor`, inclusive. Only `floor` when the ceiling is
/// below it.
pub fn size_candidates(ceiling: u32, floor: u32) -> impl Iterator<Item = u32> {
    (floor..=ceiling.max(floor)).rev()
}

/// Runs the size search for one zone.
pub struct SizeSearch<'a> {
    provider: &'a FontProvider,
    engine: &'a mut TextLayoutEngine,
    cfg: &'a LayoutConfig,
    canvas: Canvas,
    zone: SafeZone,
}

impl<'a> SizeSearch<'a> {
    /// Search within `zone` of an image of size `canvas`.
    pub fn new(
        provider: &'a FontProvider,
        engine: &'a mut TextLayoutEngine,
        cfg: &'a LayoutConfig,
        canvas: Canvas,
        zone: SafeZone,
    ) -> Self {
        Self {
            provider,
            engine,
            cfg,
            canvas,
            zone,
        }
    }

    /// Lay out `text`, three-tier when it carries a unit number.
    pub fn plan(&mut self, text: &EpisodeText) -> BadgeResult<TierStack> {
        match text.unit_number_text() {
            Some(number) => self.three_tier(&text.course_name, &text.unit_name, number),
            None => self.two_tier(&text.course_name, &text.unit_name),
        }
    }

    /// Course name searched against a share of the zone height; unit name follows at a fixed
    /// ratio in the lighter weight.
    #[tracing::instrument(skip(self))]
    pub fn two_tier(&mut self, course: &str, unit: &str) -> BadgeResult<TierStack> {
        let fit = &self.cfg.fit;
        let compose = &self.cfg.compose;
        let scale = self.canvas.scale_from(fit.reference_width);
        let budget = f64::from(self.zone.height()) * fit.course_height_budget;
        let ceiling = scaled_px(fit.course_ceiling_pt, scale);

        let mut chosen = None;
        let mut overflowed = true;
        for size in size_candidates(ceiling, fit.min_size_pt) {
            let font = self.provider.resolve(FontWeight::ExtraBold, size);
            let block = wrap_to_fit(self.engine, &font, course, self.zone.width)?;
            let fits = f64::from(block.block_height(compose.course_line_gap_px)) <= budget;
            chosen = Some((font, block));
            if fits {
                overflowed = false;
                break;
            }
        }
        let (course_font, course_block) = chosen.ok_or_else(empty_size_range)?;
        if overflowed {
            tracing::warn!(
                size_pt = course_font.size_pt(),
                "course name does not fit its height budget even at the floor size"
            );
        }

        let unit_size = fit
            .min_size_pt
            .max(scaled_px(course_font.size_pt(), fit.unit_size_ratio));
        let unit_font = self.provider.resolve(FontWeight::Medium, unit_size);
        let unit_width = scaled_px(self.zone.width, fit.unit_width_factor).max(1);
        let unit_block = wrap_to_fit(self.engine, &unit_font, unit, unit_width)?;

        tracing::debug!(
            course_pt = course_font.size_pt(),
            unit_pt = unit_size,
            "two-tier sizes chosen"
        );

        Ok(TierStack {
            variant: LayoutVariant::TwoTier,
            tiers: vec![
                TextTier {
                    role: TierRole::CourseName,
                    text: course.to_string(),
                    font: course_font,
                    block: course_block,
                    line_gap: compose.course_line_gap_px,
                },
                TextTier {
                    role: TierRole::UnitName,
                    text: unit.to_string(),
                    font: unit_font,
                    block: unit_block,
                    line_gap: compose.unit_line_gap_px,
                },
            ],
            inter_gap: inter_gap(self.canvas, self.cfg),
            overflowed,
        })
    }

    /// Unit number at a fixed scaled size; course and unit name share one searched size that
    /// fits the remaining height.
    #[tracing::instrument(skip(self))]
    pub fn three_tier(&mut self, course: &str, unit: &str, number: &str) -> BadgeResult<TierStack> {
        let fit = &self.cfg.fit;
        let compose = &self.cfg.compose;
        let scale = self.canvas.scale_from(fit.reference_width);
        let gap = inter_gap(self.canvas, self.cfg);

        let number_font = self
            .provider
            .resolve(FontWeight::Medium, unit_number_size(self.canvas, self.cfg));
        let number_block = wrap_to_fit(self.engine, &number_font, number, self.zone.width)?;
        let number_height = number_block.block_height(compose.number_line_gap_px);

        let remaining =
            i64::from(self.zone.height()) - i64::from(number_height) - 2 * i64::from(gap);
        let ceiling = scaled_px(fit.shared_ceiling_pt, scale);

        let mut chosen = None;
        let mut overflowed = true;
        for size in size_candidates(ceiling, fit.min_size_pt) {
            let font = self.provider.resolve(FontWeight::ExtraBold, size);
            let course_block = wrap_to_fit(self.engine, &font, course, self.zone.width)?;
            let unit_block = wrap_to_fit(self.engine, &font, unit, self.zone.width)?;
            let needed = i64::from(course_block.block_height(compose.course_line_gap_px))
                + i64::from(unit_block.block_height(compose.unit_line_gap_px))
                + i64::from(gap);
            chosen = Some((font, course_block, unit_block));
            if needed <= remaining {
                overflowed = false;
                break;
            }
        }
        let (shared_font, course_block, unit_block) = chosen.ok_or_else(empty_size_range)?;
        if overflowed {
            tracing::warn!(
                size_pt = shared_font.size_pt(),
                remaining,
                "course and unit name do not fit even at the floor size"
            );
        }

        tracing::debug!(
            shared_pt = shared_font.size_pt(),
            number_pt = number_font.size_pt(),
            "three-tier sizes chosen"
        );

        Ok(TierStack {
            variant: LayoutVariant::ThreeTier,
            tiers: vec![
                TextTier {
                    role: TierRole::CourseName,
                    text: course.to_string(),
                    font: shared_font.clone(),
                    block: course_block,
                    line_gap: compose.course_line_gap_px,
                },
                TextTier {
                    role: TierRole::UnitName,
                    text: unit.to_string(),
                    font: shared_font,
                    block: unit_block,
                    line_gap: compose.unit_line_gap_px,
                },
                TextTier {
                    role: TierRole::UnitNumber,
                    text: number.to_string(),
                    font: number_font,
                    block: number_block,
                    line_gap: compose.number_line_gap_px,
                },
            ],
            inter_gap: gap,
            overflowed,
        })
    }
}

fn empty_size_range() -> BadgeError {
    BadgeError::validation("size search range is empty")
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
