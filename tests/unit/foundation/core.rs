use super::*;

#[test]
fn canvas_rejects_zero_dims() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert_eq!(Canvas::new(3, 4).unwrap().width, 3);
}

#[test]
fn scale_is_relative_to_reference_width() {
    let c = Canvas::new(1600, 900).unwrap();
    assert_eq!(c.scale_from(800), 2.0);
}

#[test]
fn safe_zone_invariants() {
    let c = Canvas::new(100, 100).unwrap();
    assert!(SafeZone::new(10, 10, 50, 20, c).is_err());
    assert!(SafeZone::new(10, 101, 50, 20, c).is_err());
    assert!(SafeZone::new(10, 20, 50, 0, c).is_err());
    assert!(SafeZone::new(10, 20, 50, 101, c).is_err());

    let z = SafeZone::new(10, 40, 50, 80, c).unwrap();
    assert_eq!(z.height(), 30);
}

#[test]
fn scaled_px_truncates() {
    assert_eq!(scaled_px(1600, 0.06), 96);
    assert_eq!(scaled_px(1600, 0.46), 736);
    assert_eq!(scaled_px(1600, 0.72), 1152);
    assert_eq!(scaled_px(10, 0.99), 9);
    assert_eq!(scaled_px(10, -1.0), 0);
    assert_eq!(scaled_px(10, f64::NAN), 0);
}
