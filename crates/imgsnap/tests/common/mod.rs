#![allow(dead_code)]

use base64::Engine as _;
use image::{Rgba, RgbaImage};
use tracing_subscriber::EnvFilter;

pub const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
pub const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const GREY: Rgba<u8> = Rgba([200, 200, 200, 255]);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imgsnap=debug")),
        )
        .with_test_writer()
        .try_init();
}

pub fn png(img: &RgbaImage) -> Vec<u8> {
    imgsnap::codec::encode(img).unwrap()
}

pub fn solid_png(w: u32, h: u32, color: Rgba<u8>) -> Vec<u8> {
    png(&RgbaImage::from_pixel(w, h, color))
}

pub fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Flip `n` scattered, non-adjacent pixels to red.
pub fn with_pixel_diffs(mut img: RgbaImage, n: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    for i in 0..n {
        let x = ((i as u64 * 7919) % w as u64) as u32;
        let y = ((i as u64 * 6271) % h as u64) as u32;
        img.put_pixel(x, y, RED);
    }
    img
}
