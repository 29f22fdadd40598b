use std::collections::HashMap;

use crate::{
    assets::{
        builtin_font,
        fonts::FontHandle,
        text::{TextBrushRgba8, TextLayoutEngine},
    },
    foundation::{
        core::SafeZone,
        error::{BadgeError, BadgeResult},
    },
    layout::fit::TierStack,
};

/// Where one line of one tier is drawn. Coordinates may fall outside the image when text
/// overflows; drawing clips them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinePlacement {
    /// Index of the tier in the stack.
    pub tier: usize,
    /// Line text.
    pub text: String,
    /// Left edge.
    pub x: i64,
    /// Top edge.
    pub y: i64,
    /// Measured width.
    pub width: u32,
    /// Measured height.
    pub height: u32,
}

/// Lay out every line of `stack` inside `zone`.
///
/// The start row centers [`TierStack::total_height`] in the zone and each line is centered on
/// `zone.center_x`. Every line, the last of a tier included, advances the cursor by its height
/// plus the tier's line gap; the inter-tier gap is added between tiers.
pub fn place_lines(zone: SafeZone, stack: &TierStack) -> Vec<LinePlacement> {
    let total = i64::from(stack.total_height());
    let mut y = i64::from(zone.top) + (i64::from(zone.height()) - total).div_euclid(2);
    let cx = i64::from(zone.center_x);

    let mut out = Vec::new();
    for (tier_idx, tier) in stack.tiers.iter().enumerate() {
        if tier_idx > 0 {
            y += i64::from(stack.inter_gap);
        }
        let block = &tier.block;
        for (i, line) in block.lines.iter().enumerate() {
            let width = block.line_widths[i];
            let height = block.line_heights[i];
            out.push(LinePlacement {
                tier: tier_idx,
                text: line.clone(),
                x: cx - i64::from(width).div_euclid(2),
                y,
                width,
                height,
            });
            y += i64::from(height) + i64::from(tier.line_gap);
        }
    }
    out
}

/// Draw `stack` into `img` in place with `rgba` (straight alpha).
///
/// Glyphs are rasterized into a transparent premultiplied surface the size of the image and
/// composited source-over, so nothing is drawn outside the image.
#[tracing::instrument(skip(img, stack, engine), fields(tiers = stack.tiers.len()))]
pub fn compose(
    img: &mut image::RgbImage,
    zone: SafeZone,
    stack: &TierStack,
    engine: &mut TextLayoutEngine,
    rgba: [u8; 4],
) -> BadgeResult<()> {
    let (width, height) = img.dimensions();
    let w: u16 = width
        .try_into()
        .map_err(|_| BadgeError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| BadgeError::render("image height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(BadgeError::validation("image dimensions must be non-zero"));
    }

    let placements = place_lines(zone, stack);
    let brush = TextBrushRgba8::from_rgba(rgba);
    let mut fonts = HashMap::<(u64, u32), vello_cpu::peniko::FontData>::new();

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        rgba[0], rgba[1], rgba[2], rgba[3],
    ));

    for p in placements.iter().filter(|p| !p.text.is_empty()) {
        let font = &stack.tiers[p.tier].font;
        if font.face().is_builtin() {
            draw_builtin_line(&mut ctx, font, p);
            continue;
        }

        let layout = engine.layout_line(font, &p.text, brush)?;
        for line in layout.lines() {
            // The line's ascender sits on `p.y`.
            let m = line.metrics();
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                p.x as f64,
                p.y as f64 - f64::from(m.baseline - m.ascent),
            )));
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                // Runs may be shaped with a substituted font.
                let shaped = run.run().font();
                let font_data = fonts
                    .entry((shaped.data.id(), shaped.index))
                    .or_insert_with(|| {
                        vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(shaped.data.data().to_vec()),
                            shaped.index,
                        )
                    });
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    premul_over_rgb_in_place(img.as_mut(), pixmap.data_as_u8_slice())
}

fn draw_builtin_line(ctx: &mut vello_cpu::RenderContext, font: &FontHandle, p: &LinePlacement) {
    let scale = builtin_font::scale_for(font.size_pt());
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    builtin_font::for_each_run(&p.text, scale, |rx, ry, rw, rh| {
        let x0 = (p.x + i64::from(rx)) as f64;
        let y0 = (p.y + i64::from(ry)) as f64;
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            x0,
            y0,
            x0 + f64::from(rw),
            y0 + f64::from(rh),
        ));
    });
}

/// Source-over of premultiplied RGBA8 `src` onto opaque RGB8 `dst`.
fn premul_over_rgb_in_place(dst: &mut [u8], src: &[u8]) -> BadgeResult<()> {
    if dst.len() / 3 != src.len() / 4 || dst.len() % 3 != 0 || src.len() % 4 != 0 {
        return Err(BadgeError::render("composite buffer size mismatch"));
    }
    for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 0 {
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = add_sat_u8(s[c], mul_div255_u8(u16::from(d[c]), inv));
        }
    }
    Ok(())
}

fn mul_div255_u8(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
