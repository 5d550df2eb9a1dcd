//! Images built from height fields and color maps.

use image::{ImageBuffer, Rgba as Pixel, RgbaImage};

use crate::noise_field::HeightField;
use crate::regions::ColorMap;

/// Grayscale texture: black at height 0, white at height 1.
pub fn texture_from_height_map(field: &HeightField) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::new(field.width() as u32, field.height() as u32);

    for (x, y, &h) in field.as_tilemap().iter() {
        let v = (h.clamp(0.0, 1.0) * 255.0).round() as u8;
        img.put_pixel(x as u32, y as u32, Pixel([v, v, v, 255]));
    }

    img
}

/// One pixel per classified cell.
pub fn texture_from_color_map(colors: &ColorMap) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::new(colors.width as u32, colors.height as u32);

    for (x, y, color) in colors.iter() {
        img.put_pixel(x as u32, y as u32, Pixel(color.to_array()));
    }

    img
}
