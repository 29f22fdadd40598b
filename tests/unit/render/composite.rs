use super::*;
use crate::{
    assets::fonts::FontProvider,
    foundation::{
        config::{FontSearchConfig, LayoutConfig},
        core::Canvas,
    },
    layout::fit::SizeSearch,
};

const DARK: image::Rgb<u8> = image::Rgb([20, 30, 40]);

fn two_tier_fixture(
    engine: &mut TextLayoutEngine,
    canvas: Canvas,
    zone: SafeZone,
    course: &str,
    unit: &str,
) -> TierStack {
    let provider = FontProvider::new(FontSearchConfig::builtin_only());
    let cfg = LayoutConfig::default();
    SizeSearch::new(&provider, engine, &cfg, canvas, zone)
        .two_tier(course, unit)
        .unwrap()
}

#[test]
fn lines_are_centered_in_the_zone() {
    let mut engine = TextLayoutEngine::new();
    let canvas = Canvas::new(800, 800).unwrap();
    let zone = SafeZone::new(100, 500, 400, 500, canvas).unwrap();
    let stack = two_tier_fixture(&mut engine, canvas, zone, "AI", "Intro");

    let placed = place_lines(zone, &stack);
    assert_eq!(placed.len(), 2);
    // total height 14 + 48 + 7 = 69, so the stack starts at 100 + (400 - 69) / 2
    assert_eq!((placed[0].x, placed[0].y), (389, 265));
    // course line gap 8 follows the last course line, then the inter-tier gap 48
    assert_eq!((placed[1].x, placed[1].y), (386, 335));
    assert_eq!(placed[1].tier, 1);
}

#[test]
fn overflowing_stack_starts_above_the_zone() {
    let mut engine = TextLayoutEngine::new();
    let canvas = Canvas::new(800, 800).unwrap();
    let zone = SafeZone::new(300, 310, 400, 500, canvas).unwrap();
    let stack = two_tier_fixture(&mut engine, canvas, zone, "Data Science", "Intro");

    let placed = place_lines(zone, &stack);
    assert!(placed[0].y < 300);
}

#[test]
fn multi_line_tier_uses_line_gap() {
    let mut engine = TextLayoutEngine::new();
    let canvas = Canvas::new(800, 800).unwrap();
    let zone = SafeZone::new(100, 700, 400, 100, canvas).unwrap();
    let stack = two_tier_fixture(&mut engine, canvas, zone, "AI", "Probability and Statistics");

    let placed = place_lines(zone, &stack);
    let unit_lines = placed.iter().filter(|p| p.tier == 1).collect::<Vec<_>>();
    assert_eq!(unit_lines.len(), 2);
    assert_eq!(
        unit_lines[1].y,
        unit_lines[0].y + i64::from(unit_lines[0].height) + 6
    );
}

#[test]
fn compose_draws_text_inside_the_zone_only() {
    let mut engine = TextLayoutEngine::new();
    let canvas = Canvas::new(800, 800).unwrap();
    let zone = SafeZone::new(100, 500, 400, 500, canvas).unwrap();
    let stack = two_tier_fixture(&mut engine, canvas, zone, "AI", "Intro");

    let mut img = image::RgbImage::from_pixel(800, 800, DARK);
    compose(&mut img, zone, &stack, &mut engine, [255, 255, 255, 255]).unwrap();

    // top bar of the "I" glyph at scale 2
    assert_eq!(img.get_pixel(405, 266).0, [255, 255, 255]);
    // unlit first column of the same glyph
    assert_eq!(img.get_pixel(401, 266).0, DARK.0);

    for (x, y, px) in img.enumerate_pixels() {
        if *px != DARK {
            assert!((100..500).contains(&y), "pixel drawn outside zone at ({x}, {y})");
            assert!((150..650).contains(&x), "pixel drawn outside zone at ({x}, {y})");
        }
    }
}

#[test]
fn compose_is_deterministic() {
    let canvas = Canvas::new(400, 300).unwrap();
    let zone = SafeZone::new(20, 200, 200, 300, canvas).unwrap();

    let render = || {
        let mut engine = TextLayoutEngine::new();
        let stack = two_tier_fixture(&mut engine, canvas, zone, "Machine Learning", "Unit One");
        let mut img = image::RgbImage::from_pixel(400, 300, DARK);
        compose(&mut img, zone, &stack, &mut engine, [255, 255, 255, 255]).unwrap();
        img
    };
    assert_eq!(render().as_raw(), render().as_raw());
}

#[test]
fn translucent_paint_blends_with_background() {
    let mut engine = TextLayoutEngine::new();
    let canvas = Canvas::new(800, 800).unwrap();
    let zone = SafeZone::new(100, 500, 400, 500, canvas).unwrap();
    let stack = two_tier_fixture(&mut engine, canvas, zone, "AI", "Intro");

    let mut img = image::RgbImage::from_pixel(800, 800, image::Rgb([0, 0, 0]));
    compose(&mut img, zone, &stack, &mut engine, [255, 255, 255, 128]).unwrap();

    let px = img.get_pixel(405, 266).0;
    assert!(px[0] > 100 && px[0] < 160, "unexpected blend {px:?}");
}

#[test]
fn premul_over_keeps_transparent_pixels() {
    let mut dst = vec![10, 20, 30, 40, 50, 60];
    let src = vec![0, 0, 0, 0, 255, 255, 255, 255];
    premul_over_rgb_in_place(&mut dst, &src).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255, 255, 255]);
}

#[test]
fn premul_over_rejects_mismatched_buffers() {
    let mut dst = vec![0; 6];
    assert!(premul_over_rgb_in_place(&mut dst, &[0; 4]).is_err());
}

#[test]
fn outline_three_tier_stays_in_zone_if_font_present() {
    let regular = std::path::PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
    let bold = std::path::PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf");
    if !regular.is_file() {
        return;
    }
    let mut search = FontSearchConfig::builtin_only();
    search.extrabold_fallbacks = vec![bold, regular.clone()];
    search.medium_fallbacks = vec![regular];
    let provider = FontProvider::new(search);
    let cfg = LayoutConfig::default();
    let mut engine = TextLayoutEngine::new();

    let canvas = Canvas::new(800, 600).unwrap();
    let zone = SafeZone::new(100, 500, 400, 600, canvas).unwrap();
    let stack = SizeSearch::new(&provider, &mut engine, &cfg, canvas, zone)
        .three_tier("Data Science", "Linear Models", "Unit 3")
        .unwrap();
    assert!(stack.tiers.iter().all(|t| !t.font.face().is_builtin()));

    let mut img = image::RgbImage::from_pixel(800, 600, DARK);
    compose(&mut img, zone, &stack, &mut engine, [255, 255, 255, 255]).unwrap();

    let mut lit = 0usize;
    for (x, y, px) in img.enumerate_pixels() {
        if *px != DARK {
            lit += 1;
            // one pixel of anti-aliasing slack
            assert!((99..=500).contains(&y), "pixel drawn outside zone at ({x}, {y})");
            assert!((99..=701).contains(&x), "pixel drawn outside zone at ({x}, {y})");
        }
    }
    assert!(lit > 0);
}
