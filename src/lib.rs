//! badgetext draws course and unit titles onto podcast thumbnail templates.
//!
//! Given a template with a light title badge, the engine:
//!
//! - detects the badge's safe zone from pixel statistics ([`analyze_zone`])
//! - resolves the two title weights through a fallback chain ending in a built-in bitmap face
//!   ([`FontProvider`])
//! - searches the largest point sizes whose wrapped text fits the zone ([`SizeSearch`])
//! - stacks the tiers, centered, onto the image ([`compose`])
//!
//! [`ThumbnailRenderer`] runs the whole pipeline for one image, one file, or a parallel batch.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Template decoding, fonts and text measurement.
pub mod assets {
    pub(crate) mod builtin_font;
    /// Template decoding and thumbnail encoding.
    pub mod decode;
    /// Font resolution.
    pub mod fonts;
    /// Text shaping and measurement.
    pub mod text;
}

/// Errors, geometry and configuration.
pub mod foundation {
    pub mod config;
    /// Shared geometry and font weight types.
    pub mod core;
    /// Error type.
    pub mod error;
}

/// Zone detection, wrapping and size search.
pub mod layout {
    pub mod fit;
    /// Width-constrained word wrapping.
    pub mod wrap;
    pub mod zone;
}

/// Drawing and the end-to-end pipeline.
pub mod render {
    /// Tier stacking and glyph compositing.
    pub mod composite;
    /// Single, file and batch rendering.
    pub mod pipeline;
}

pub use crate::assets::decode::{OutputFormat, decode_template, encode_image, load_template, save_image};
pub use crate::assets::fonts::{FontFace, FontHandle, FontProvider, FontSource};
pub use crate::assets::text::{TextExtent, TextLayoutEngine};
pub use crate::foundation::config::{
    Channel, ComposeConfig, Config, FitConfig, FontSearchConfig, LayoutConfig, ZoneConfig,
};
pub use crate::foundation::core::{Canvas, FontWeight, SafeZone};
pub use crate::foundation::error::{BadgeError, BadgeResult};
pub use crate::layout::fit::{EpisodeText, LayoutVariant, SizeSearch, TextTier, TierRole, TierStack};
pub use crate::layout::wrap::{WrappedBlock, wrap_to_fit};
pub use crate::layout::zone::{ZoneAnalysis, ZoneSource, analyze_zone, detect_zone};
pub use crate::render::composite::{LinePlacement, compose, place_lines};
pub use crate::render::pipeline::{
    BatchJob, BatchOutcome, RenderReport, ThumbnailRenderer, TierSummary, load_manifest,
    parse_manifest,
};
