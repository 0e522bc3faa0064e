// src/photo.rs
//! Rider photos as inline JPEG data URLs, small enough to live in `riders.photo_url`.

use base64::{engine::general_purpose, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageResult, Rgb, RgbImage};

pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// Decode a PNG or JPEG, flatten any transparency onto white, resize to
/// `size`×`size` and encode it as `data:image/jpeg;base64,…`.
pub fn to_data_url(bytes: &[u8], size: u32, quality: u8) -> ImageResult<String> {
    let src = image::load_from_memory(bytes)?.to_rgba8();
    let flat = RgbImage::from_fn(src.width(), src.height(), |x, y| {
        let [r, g, b, a] = src.get_pixel(x, y).0;
        let over_white = |c: u8| ((u32::from(c) * u32::from(a) + 255 * (255 - u32::from(a))) / 255) as u8;
        Rgb([over_white(r), over_white(g), over_white(b)])
    });
    let small = imageops::resize(&flat, size, size, FilterType::Lanczos3);

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality).encode_image(&small)?;
    Ok(join!(DATA_URL_PREFIX, &general_purpose::STANDARD.encode(&jpeg)))
}
