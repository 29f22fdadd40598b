use super::*;
use crate::foundation::config::FontSearchConfig;

fn builtin_renderer() -> ThumbnailRenderer {
    ThumbnailRenderer::new(Config {
        layout: LayoutConfig::default(),
        fonts: FontSearchConfig::builtin_only(),
    })
    .unwrap()
}

fn badge_template(w: u32, h: u32) -> image::RgbImage {
    let mut img = image::RgbImage::from_pixel(w, h, image::Rgb([10, 10, 30]));
    for y in h / 4..h * 3 / 4 {
        for x in w / 8..w * 7 / 8 {
            img.put_pixel(x, y, image::Rgb([40, 200, 90]));
        }
    }
    img
}

#[test]
fn report_describes_two_tier_render() {
    let renderer = builtin_renderer();
    let mut img = badge_template(800, 800);
    let before = img.clone();

    let report = renderer
        .render(&mut img, &EpisodeText::new("AI", "Intro"))
        .unwrap();

    assert_eq!(report.variant, LayoutVariant::TwoTier);
    assert!(matches!(report.zone.source, crate::layout::zone::ZoneSource::Detected { .. }));
    assert_eq!(report.tiers.len(), 2);
    assert_eq!(report.tiers[0].weight, FontWeight::ExtraBold);
    assert_eq!(report.tiers[1].weight, FontWeight::Medium);
    assert_eq!(report.tiers[1].lines, vec!["Intro".to_string()]);
    assert_ne!(img.as_raw(), before.as_raw());
}

#[test]
fn unit_number_selects_three_tiers() {
    let renderer = builtin_renderer();
    let mut img = badge_template(1600, 900);
    let text = EpisodeText::new("Data Science", "Regression").with_unit_number("Unit 3");

    let report = renderer.render(&mut img, &text).unwrap();
    assert_eq!(report.variant, LayoutVariant::ThreeTier);
    assert_eq!(report.tiers[2].role, TierRole::UnitNumber);
    assert_eq!(report.tiers[2].size_pt, 72);
    assert_eq!(report.tiers[0].size_pt, report.tiers[1].size_pt);
}

#[test]
fn oversized_images_are_rejected() {
    let renderer = builtin_renderer();
    let mut img = image::RgbImage::new(70_000, 1);
    let err = renderer
        .render(&mut img, &EpisodeText::new("A", "B"))
        .unwrap_err();
    assert!(matches!(err, BadgeError::Validation(_)));
}

#[test]
fn manifest_accepts_optional_unit_number() {
    let jobs = parse_manifest(
        r#"[
            {"template": "a.png", "course_name": "C", "unit_name": "U", "output": "a.jpg"},
            {"template": "b.png", "course_name": "C", "unit_name": "U", "unit_number": "Unit 2", "output": "b.png"}
        ]"#,
    )
    .unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].text.unit_number, None);
    assert_eq!(jobs[1].text.unit_number.as_deref(), Some("Unit 2"));
}

#[test]
fn malformed_manifest_is_a_serde_error() {
    assert!(matches!(
        parse_manifest("{\"template\": 1}"),
        Err(BadgeError::Serde(_))
    ));
}

#[test]
fn zero_threads_is_rejected() {
    let renderer = builtin_renderer();
    assert!(renderer.render_batch(&[], Some(0)).is_err());
}

#[test]
fn render_file_writes_decodable_output() {
    let dir = std::env::temp_dir().join(format!("badgetext-unit-pipeline-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let template = dir.join("template.png");
    badge_template(400, 300).save(&template).unwrap();

    let out = dir.join("nested").join("thumb.jpg");
    let renderer = builtin_renderer();
    renderer
        .render_file(&template, &EpisodeText::new("Course", "Unit"), &out)
        .unwrap();

    let decoded = image::open(&out).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (400, 300));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn undecodable_template_fails() {
    let dir = std::env::temp_dir().join(format!("badgetext-unit-badtpl-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let template = dir.join("broken.png");
    std::fs::write(&template, b"not an image").unwrap();

    let err = builtin_renderer()
        .render_file(&template, &EpisodeText::new("A", "B"), &dir.join("o.jpg"))
        .unwrap_err();
    assert!(err.to_string().contains("cannot decode image"));
    let _ = std::fs::remove_dir_all(&dir);
}
