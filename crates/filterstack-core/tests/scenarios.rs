//! Integration tests: drive a `Studio` through upload, stacked filters and
//! reset the way a web handler would.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use filterstack_core::{
    Filter, FilterError, FilterKind, ImageStore, MemoryStore, RgbImage, SessionKey, Studio, codec,
};
use image::Rgb;

fn png(img: &RgbImage) -> Vec<u8> {
    codec::encode_png(img).expect("encode test image")
}

fn gray(w: u32, h: u32, f: impl Fn(u32, u32) -> u8) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        let v = f(x, y);
        Rgb([v, v, v])
    })
}

fn upload(studio: &Studio<MemoryStore>, img: &RgbImage) -> SessionKey {
    studio.upload(None, "input.png", &png(img)).unwrap()
}

#[test]
fn flat_image_survives_mean_then_reset() {
    let studio = Studio::new(MemoryStore::new());
    let input = gray(10, 10, |_, _| 128);
    let key = upload(&studio, &input);

    let record = studio.view(Some(&key));
    assert!(record.original.is_some());
    assert!(record.processed.is_none());

    let filtered = studio.apply_filter(Some(&key), "mean").unwrap();
    assert_eq!(filtered.dimensions(), (10, 10));
    assert_eq!(filtered, input);
    assert!(studio.view(Some(&key)).processed.is_some());

    studio.reset(Some(&key)).unwrap();
    assert!(studio.view(Some(&key)).processed.is_none());
    assert_eq!(studio.current_image(Some(&key)).unwrap(), input);
}

#[test]
fn max_suppresses_single_pepper_pixel() {
    let studio = Studio::new(MemoryStore::new());
    let key = upload(&studio, &gray(4, 4, |x, y| if (x, y) == (1, 2) { 0 } else { 255 }));

    let filtered = studio.apply_filter(Some(&key), "max").unwrap();
    assert_eq!(filtered.get_pixel(1, 2).0, [255, 255, 255]);
    assert!(filtered.pixels().all(|p| p.0 == [255, 255, 255]));
}

#[test]
fn salt_removal_dilates_bright_outlier_over_neighbourhood() {
    let studio = Studio::new(MemoryStore::new());
    let key = upload(&studio, &gray(5, 5, |x, y| if (x, y) == (2, 2) { 255 } else { 0 }));

    let filtered = studio.apply_filter(Some(&key), "salt_removal").unwrap();
    // Two 5x5 dilations reach 4 pixels out, covering the whole image.
    assert!(filtered.pixels().all(|p| p.0 == [255, 255, 255]));
}

#[test]
fn second_sobelx_runs_on_gradient_image() {
    let studio = Studio::new(MemoryStore::new());
    let input = gray(8, 8, |x, _| if x < 4 { 0 } else { 100 });
    let key = upload(&studio, &input);

    let once = studio.apply_filter(Some(&key), "sobelx").unwrap();
    let twice = studio.apply_filter(Some(&key), "sobelx").unwrap();

    assert_ne!(once, twice);
    assert_eq!(once.get_pixel(2, 4).0[0], 0);
    assert_eq!(once.get_pixel(3, 4).0[0], 255);
    assert_eq!(twice.get_pixel(2, 4).0[0], 255);
    assert_eq!(twice.get_pixel(5, 4).0[0], 255);
    assert_eq!(twice, FilterKind::SobelX.apply(&once));
}

#[test]
fn gif_rejected_without_touching_store() {
    let studio = Studio::new(MemoryStore::new());
    let key = SessionKey::from_token("existing");
    let bytes = png(&gray(3, 3, |_, _| 9));

    let result = studio.upload(Some(key.clone()), "anim.GIF", &bytes);
    assert!(matches!(result, Err(FilterError::UnsupportedExtension(_))));
    assert!(studio.store().get(&key).is_empty());
    assert!(studio.store().is_empty());
}

#[test]
fn unknown_filter_stacks_glow() {
    let studio = Studio::new(MemoryStore::new());
    let input = gray(12, 12, |x, y| u8::try_from((x * 20 + y * 3) % 256).unwrap());
    let key = upload(&studio, &input);

    let via_unknown = studio.apply_filter(Some(&key), "xyz123").unwrap();
    assert_eq!(via_unknown, filterstack_core::filters::glow(&input));
}

#[test]
fn new_upload_replaces_stack() {
    let studio = Studio::new(MemoryStore::new());
    let key = upload(&studio, &gray(6, 6, |x, _| u8::try_from(x * 40).unwrap()));
    studio.apply_filter(Some(&key), "sobel").unwrap();

    let second = gray(6, 6, |_, y| u8::try_from(y * 40).unwrap());
    studio
        .upload(Some(key.clone()), "second.webp.png", &png(&second))
        .unwrap();

    let record = studio.view(Some(&key));
    assert!(record.processed.is_none());
    assert_eq!(studio.current_image(Some(&key)).unwrap(), second);
}
