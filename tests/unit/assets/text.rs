use super::*;
use crate::{
    assets::fonts::FontProvider,
    foundation::{config::FontSearchConfig, core::FontWeight},
};

fn builtin_provider() -> FontProvider {
    FontProvider::new(FontSearchConfig::builtin_only())
}

#[test]
fn builtin_metrics_follow_bitmap_grid() {
    let provider = builtin_provider();
    let mut engine = TextLayoutEngine::new();
    let font = provider.resolve(FontWeight::ExtraBold, 20);

    let ext = engine.measure(&font, "AI").unwrap();
    assert_eq!(ext, TextExtent { width: 22, height: 14 });
}

#[test]
fn empty_text_keeps_blank_height() {
    let provider = builtin_provider();
    let mut engine = TextLayoutEngine::new();
    let font = provider.resolve(FontWeight::Medium, 30);

    let ext = engine.measure(&font, "").unwrap();
    assert_eq!(ext.width, 0);
    assert_eq!(ext.height, 21);
}

#[test]
fn measurement_is_stable_across_handles() {
    let provider = builtin_provider();
    let mut engine = TextLayoutEngine::new();
    let a = engine
        .measure(&provider.resolve(FontWeight::Medium, 24), "Unit 4")
        .unwrap();
    let b = engine
        .measure(&provider.resolve(FontWeight::Medium, 24), "Unit 4")
        .unwrap();
    let mut fresh = TextLayoutEngine::new();
    let c = fresh
        .measure(&provider.resolve(FontWeight::Medium, 24), "Unit 4")
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn builtin_face_cannot_be_shaped() {
    let provider = builtin_provider();
    let mut engine = TextLayoutEngine::new();
    let font = provider.resolve(FontWeight::Medium, 24);
    assert!(
        engine
            .layout_line(&font, "x", TextBrushRgba8::default())
            .is_err()
    );
}

#[test]
fn outline_metrics_grow_with_size_if_font_present() {
    let path = std::path::PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
    if !path.is_file() {
        return;
    }
    let mut search = FontSearchConfig::builtin_only();
    search.medium_fallbacks = vec![path];
    let provider = FontProvider::new(search);
    let mut engine = TextLayoutEngine::new();

    let small = engine
        .measure(&provider.resolve(FontWeight::Medium, 16), "Course")
        .unwrap();
    let large = engine
        .measure(&provider.resolve(FontWeight::Medium, 48), "Course")
        .unwrap();
    assert!(small.width > 0 && small.height > 0);
    assert!(large.width > small.width);
    assert!(large.height > small.height);

    let blank = engine
        .measure(&provider.resolve(FontWeight::Medium, 16), "")
        .unwrap();
    assert_eq!(blank.width, 0);
    assert!(blank.height > 0);
}

#[test]
fn outline_height_follows_ink_if_font_present() {
    let path = std::path::PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf");
    if !path.is_file() {
        return;
    }
    let mut search = FontSearchConfig::builtin_only();
    search.medium_fallbacks = vec![path];
    let provider = FontProvider::new(search);
    let mut engine = TextLayoutEngine::new();
    let font = provider.resolve(FontWeight::Medium, 40);

    let lower = engine.measure(&font, "ace").unwrap();
    let caps = engine.measure(&font, "ACE").unwrap();
    let descending = engine.measure(&font, "Agy").unwrap();
    let line = engine
        .layout_line(&font, "Agy", TextBrushRgba8::default())
        .unwrap();

    assert!(lower.height < caps.height);
    assert!(caps.height < descending.height);
    assert!(descending.height <= line.height().ceil() as u32);
}
