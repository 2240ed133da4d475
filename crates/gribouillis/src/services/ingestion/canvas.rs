//! PNG normalization: decode, add a white border, encode.

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage, imageops};
use std::io::Cursor;

use crate::errors::{AppError, AppResult};

/// Width of the white border added on every side of an uploaded drawing.
pub const IMAGE_PADDING: u32 = 20;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Copy `src` onto an opaque white canvas grown by `padding` pixels on each
/// side. Pixels are copied unscaled at offset (`padding`, `padding`).
pub fn pad_image(src: &DynamicImage, padding: u32) -> RgbaImage {
    let (width, height) = src.dimensions();
    let border = padding.saturating_mul(2);
    let mut canvas = RgbaImage::from_pixel(
        width.saturating_add(border),
        height.saturating_add(border),
        WHITE,
    );
    imageops::replace(
        &mut canvas,
        &src.to_rgba8(),
        i64::from(padding),
        i64::from(padding),
    );
    canvas
}

/// Decode `bytes` strictly as PNG, pad it and return the re-encoded PNG.
pub fn normalize_png(bytes: &[u8], padding: u32) -> AppResult<Vec<u8>> {
    let decoded =
        image::load_from_memory_with_format(bytes, ImageFormat::Png).map_err(AppError::Decode)?;
    let padded = pad_image(&decoded, padding);

    let mut encoded = Cursor::new(Vec::new());
    padded
        .write_to(&mut encoded, ImageFormat::Png)
        .map_err(AppError::Encode)?;
    Ok(encoded.into_inner())
}
