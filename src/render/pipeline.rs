use std::path::{Path, PathBuf};

use anyhow::Context;
use rayon::prelude::*;

use crate::{
    assets::{
        decode::{load_template, save_image},
        fonts::FontProvider,
        text::TextLayoutEngine,
    },
    foundation::{
        config::{Config, LayoutConfig},
        core::{Canvas, FontWeight},
        error::{BadgeError, BadgeResult},
    },
    layout::{
        fit::{EpisodeText, LayoutVariant, SizeSearch, TierRole, TierStack},
        zone::{ZoneAnalysis, analyze_zone},
    },
    render::composite::compose,
};

/// What was drawn for one tier.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TierSummary {
    /// Field role.
    pub role: TierRole,
    /// Font weight used.
    pub weight: FontWeight,
    /// Chosen point size.
    pub size_pt: u32,
    /// Wrapped lines.
    pub lines: Vec<String>,
    /// Block height including line gaps.
    pub block_height: u32,
}

/// Outcome of rendering one thumbnail.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RenderReport {
    /// Zone used and how it was found.
    pub zone: ZoneAnalysis,
    /// Stacking scheme.
    pub variant: LayoutVariant,
    /// Tiers, top to bottom.
    pub tiers: Vec<TierSummary>,
    /// Gap between tiers.
    pub inter_gap: u32,
    /// Total stack height.
    pub total_height: u32,
    /// The size search hit the floor without fitting.
    pub overflowed: bool,
}

impl RenderReport {
    fn new(zone: ZoneAnalysis, stack: &TierStack) -> Self {
        Self {
            zone,
            variant: stack.variant,
            tiers: stack
                .tiers
                .iter()
                .map(|t| TierSummary {
                    role: t.role,
                    weight: t.weight(),
                    size_pt: t.size_pt(),
                    lines: t.block.lines.clone(),
                    block_height: t.block_height(),
                })
                .collect(),
            inter_gap: stack.inter_gap,
            total_height: stack.total_height(),
            overflowed: stack.overflowed,
        }
    }
}

/// One entry of a batch manifest.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchJob {
    /// Template image path.
    pub template: PathBuf,
    /// Text to draw.
    #[serde(flatten)]
    pub text: EpisodeText,
    /// Output path; the extension selects the encoding.
    pub output: PathBuf,
}

/// Per-job batch result, in manifest order.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Output path of the job.
    pub output: PathBuf,
    /// Report, or why the job failed.
    pub result: BadgeResult<RenderReport>,
}

/// Parse a JSON array of [`BatchJob`].
pub fn parse_manifest(json: &str) -> BadgeResult<Vec<BatchJob>> {
    serde_json::from_str(json).map_err(|e| BadgeError::serde(format!("manifest: {e}")))
}

/// Read and parse a batch manifest. Relative template and output paths are resolved against the
/// manifest's directory.
pub fn load_manifest(path: &Path) -> BadgeResult<Vec<BatchJob>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read manifest '{}'", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(parse_manifest(&json)?
        .into_iter()
        .map(|mut job| {
            job.template = base.join(&job.template);
            job.output = base.join(&job.output);
            job
        })
        .collect())
}

/// Detect, plan and compose with a shared font provider.
///
/// The renderer is `Sync`; each call (or each batch worker) uses its own [`TextLayoutEngine`].
#[derive(Debug)]
pub struct ThumbnailRenderer {
    layout: LayoutConfig,
    provider: FontProvider,
}

impl ThumbnailRenderer {
    /// Renderer for `config`.
    pub fn new(config: Config) -> BadgeResult<Self> {
        config.layout.validate()?;
        Ok(Self {
            layout: config.layout,
            provider: FontProvider::new(config.fonts),
        })
    }

    /// Renderer with an existing provider.
    pub fn with_provider(layout: LayoutConfig, provider: FontProvider) -> BadgeResult<Self> {
        layout.validate()?;
        Ok(Self { layout, provider })
    }

    /// Layout constants in use.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Font provider in use.
    pub fn provider(&self) -> &FontProvider {
        &self.provider
    }

    /// Draw `text` onto `img` in place.
    pub fn render(&self, img: &mut image::RgbImage, text: &EpisodeText) -> BadgeResult<RenderReport> {
        let mut engine = TextLayoutEngine::new();
        self.render_with(&mut engine, img, text)
    }

    /// [`render`](Self::render) reusing `engine` and its measurement cache.
    #[tracing::instrument(skip(self, engine, img), fields(width = img.width(), height = img.height()))]
    pub fn render_with(
        &self,
        engine: &mut TextLayoutEngine,
        img: &mut image::RgbImage,
        text: &EpisodeText,
    ) -> BadgeResult<RenderReport> {
        let canvas = Canvas::of(img)?;
        if canvas.width > u32::from(u16::MAX) || canvas.height > u32::from(u16::MAX) {
            return Err(BadgeError::validation(format!(
                "image {}x{} exceeds the {} px render limit",
                canvas.width,
                canvas.height,
                u16::MAX
            )));
        }

        let analysis = analyze_zone(img, &self.layout.zone)?;
        let stack = SizeSearch::new(&self.provider, engine, &self.layout, canvas, analysis.zone)
            .plan(text)?;
        compose(
            img,
            analysis.zone,
            &stack,
            engine,
            self.layout.compose.text_rgba,
        )?;
        Ok(RenderReport::new(analysis, &stack))
    }

    /// Load `template`, render `text` and write the result to `out`.
    pub fn render_file(
        &self,
        template: &Path,
        text: &EpisodeText,
        out: &Path,
    ) -> BadgeResult<RenderReport> {
        let mut engine = TextLayoutEngine::new();
        self.render_file_with(&mut engine, template, text, out)
    }

    fn render_file_with(
        &self,
        engine: &mut TextLayoutEngine,
        template: &Path,
        text: &EpisodeText,
        out: &Path,
    ) -> BadgeResult<RenderReport> {
        let mut img = load_template(template)?;
        let report = self.render_with(engine, &mut img, text)?;
        save_image(&img, out)?;
        tracing::info!(out = %out.display(), variant = ?report.variant, "thumbnail written");
        Ok(report)
    }

    /// Render independent jobs in parallel. `threads` of `None` uses rayon's default.
    ///
    /// A failing job does not stop the others; outcomes are returned in job order.
    pub fn render_batch(
        &self,
        jobs: &[BatchJob],
        threads: Option<usize>,
    ) -> BadgeResult<Vec<BatchOutcome>> {
        let pool = build_thread_pool(threads)?;
        let outcomes = pool.install(|| {
            jobs.par_iter()
                .map_init(TextLayoutEngine::new, |engine, job| BatchOutcome {
                    output: job.output.clone(),
                    result: self.render_file_with(engine, &job.template, &job.text, &job.output),
                })
                .collect::<Vec<_>>()
        });

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        if failed > 0 {
            tracing::warn!(failed, total = jobs.len(), "batch finished with failures");
        }
        Ok(outcomes)
    }
}

fn build_thread_pool(threads: Option<usize>) -> BadgeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BadgeError::validation("batch 'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BadgeError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
