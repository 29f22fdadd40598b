use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::{
        builtin_font,
        fonts::{FontFace, FontHandle},
    },
    foundation::error::{BadgeError, BadgeResult},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl TextBrushRgba8 {
    /// Brush from a straight RGBA array.
    pub fn from_rgba(rgba: [u8; 4]) -> Self {
        let [r, g, b, a] = rgba;
        Self { r, g, b, a }
    }
}

/// Integer pixel extent of one rendered line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextExtent {
    /// Advance width.
    pub width: u32,
    /// Line height.
    pub height: u32,
}

struct RegisteredFace {
    // Keeps the face alive so its pointer key stays unique.
    _face: Arc<FontFace>,
    family: String,
    weight: parley::style::FontWeight,
}

/// Shapes and measures single lines of text.
///
/// Owns the Parley contexts, so one engine is used per thread. Outline faces are registered once
/// and every measured line is cached, which keeps repeated wrapping attempts cheap.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<usize, RegisteredFace>,
    extents: HashMap<(usize, u32, String), TextExtent>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
            extents: HashMap::new(),
        }
    }

    /// Measure `text` as a single unwrapped line.
    ///
    /// Width is the advance width; height is the ink height of the glyph outlines, so lines without
    /// descenders measure shorter. Empty text measures as zero width with the height of a blank
    /// glyph, so spacing stays stable when a field is missing.
    pub fn measure(&mut self, font: &FontHandle, text: &str) -> BadgeResult<TextExtent> {
        let key = (font.face_key(), font.size_pt(), text.to_string());
        if let Some(ext) = self.extents.get(&key) {
            return Ok(*ext);
        }

        let ext = if font.face().is_builtin() {
            let scale = builtin_font::scale_for(font.size_pt());
            TextExtent {
                width: builtin_font::text_width(text, scale),
                height: builtin_font::line_height(scale),
            }
        } else if text.is_empty() {
            let blank = self.layout_line(font, " ", TextBrushRgba8::default())?;
            TextExtent {
                width: 0,
                height: px_ceil(blank.height()),
            }
        } else {
            let layout = self.layout_line(font, text, TextBrushRgba8::default())?;
            TextExtent {
                width: px_ceil(layout.width()),
                height: ink_height(&layout).unwrap_or_else(|| px_ceil(layout.height())),
            }
        };

        self.extents.insert(key, ext);
        Ok(ext)
    }

    /// Shape `text` as one line with an outline face. Glyph positions are relative to the line's
    /// top-left corner.
    pub fn layout_line(
        &mut self,
        font: &FontHandle,
        text: &str,
        brush: TextBrushRgba8,
    ) -> BadgeResult<parley::Layout<TextBrushRgba8>> {
        let (family, weight) = self.register(font.face())?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        builder.push_default(parley::style::StyleProperty::FontSize(
            font.size_pt() as f32,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }

    fn register(
        &mut self,
        face: &Arc<FontFace>,
    ) -> BadgeResult<(String, parley::style::FontWeight)> {
        let key = Arc::as_ptr(face) as usize;
        if let Some(r) = self.registered.get(&key) {
            return Ok((r.family.clone(), r.weight));
        }

        let outline = face
            .outline
            .as_ref()
            .ok_or_else(|| BadgeError::font("built-in face has no outline data"))?;

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(outline.bytes.as_ref().clone()),
            None,
        );
        let (family_id, infos) = families
            .first()
            .ok_or_else(|| BadgeError::font("no font families registered from font bytes"))?;
        let weight = infos
            .iter()
            .find(|i| i.index() == outline.index)
            .or_else(|| infos.first())
            .map(|i| i.weight())
            .unwrap_or(parley::style::FontWeight::NORMAL);
        let family = self
            .font_ctx
            .collection
            .family_name(*family_id)
            .ok_or_else(|| BadgeError::font("registered font family has no name"))?
            .to_string();

        self.registered.insert(
            key,
            RegisteredFace {
                _face: face.clone(),
                family: family.clone(),
                weight,
            },
        );
        Ok((family, weight))
    }
}

/// Height of the glyph outlines' union, from the highest ink to the lowest. `None` when no glyph
/// has an outline (whitespace only).
fn ink_height(layout: &parley::Layout<TextBrushRgba8>) -> Option<u32> {
    let mut top = f32::INFINITY;
    let mut bottom = f32::NEG_INFINITY;
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let font = run.run().font();
            let Ok(face) = ttf_parser::Face::parse(font.data.data(), font.index) else {
                continue;
            };
            let scale = run.run().font_size() / f32::from(face.units_per_em().max(1));
            for g in run.positioned_glyphs() {
                let Ok(id) = u16::try_from(g.id) else {
                    continue;
                };
                let Some(bb) = face.glyph_bounding_box(ttf_parser::GlyphId(id)) else {
                    continue;
                };
                top = top.min(g.y - f32::from(bb.y_max) * scale);
                bottom = bottom.max(g.y - f32::from(bb.y_min) * scale);
            }
        }
    }
    (bottom > top).then(|| (bottom.ceil() - top.floor()) as u32)
}

fn px_ceil(v: f32) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.ceil() as u32
    } else {
        0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
