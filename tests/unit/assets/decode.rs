use super::*;

#[test]
fn decode_png_drops_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();

    let rgb = decode_template(&buf).unwrap();
    assert_eq!(rgb.dimensions(), (1, 1));
    assert_eq!(rgb.get_pixel(0, 0).0, [100, 50, 200]);
}

#[test]
fn garbage_bytes_are_rejected_as_undecodable() {
    let err = decode_template(b"definitely not an image").unwrap_err();
    assert!(matches!(err, BadgeError::Decode(_)));
    assert!(err.to_string().starts_with("cannot decode image:"));
}

#[test]
fn missing_template_is_an_io_error() {
    let err = load_template(Path::new("/definitely/missing/template.png")).unwrap_err();
    assert!(matches!(err, BadgeError::Other(_)));
}

#[test]
fn output_format_follows_extension() {
    assert_eq!(OutputFormat::from_path(Path::new("a.png")), OutputFormat::Png);
    assert_eq!(OutputFormat::from_path(Path::new("a.PNG")), OutputFormat::Png);
    assert_eq!(OutputFormat::from_path(Path::new("a.jpg")), OutputFormat::Jpeg);
    assert_eq!(OutputFormat::from_path(Path::new("thumb")), OutputFormat::Jpeg);
}

#[test]
fn png_encoding_is_lossless() {
    let img = image::RgbImage::from_fn(4, 3, |x, y| image::Rgb([x as u8 * 10, y as u8 * 20, 7]));
    let bytes = encode_image(&img, OutputFormat::Png).unwrap();
    assert_eq!(decode_template(&bytes).unwrap(), img);

    let jpeg = encode_image(&img, OutputFormat::Jpeg).unwrap();
    assert_eq!(decode_template(&jpeg).unwrap().dimensions(), (4, 3));
}
