//! Debug tool for comparing region presets visually
//! Generates one terrain and renders it with every preset, hill-shaded, in a grid

use image::{ImageBuffer, Rgba, RgbaImage};
use terrain_generator::generator::{DrawMode, MapGenerator};
use terrain_generator::params::GenerationParameters;
use terrain_generator::regions::RegionPreset;
use terrain_generator::texture;

const SIZE: usize = 241;
const SEED: u64 = 42;
const COLUMNS: u32 = 3;
const PADDING: u32 = 4;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    println!("Generating preset comparison grid...");

    let mut generator = MapGenerator::new(GenerationParameters {
        width: SIZE,
        height: SIZE,
        seed: SEED,
        ..Default::default()
    });
    generator.draw_mode = DrawMode::Mesh;

    let mut images: Vec<RgbaImage> = Vec::new();
    for &preset in RegionPreset::all() {
        println!("  Rendering: {} ({})", preset, preset.description());
        let output = generator.apply_preset(preset)?;
        let mut img = output.texture();
        if let Some(mesh) = output.mesh() {
            shade(&mut img, &mesh.normals(), mesh.vertices_per_row);
        }
        images.push(img);
    }

    let grid = create_grid(&images, COLUMNS);
    grid.save("preset_comparison.png")?;
    println!("Saved preset_comparison.png");

    let field = generator
        .last_output()
        .map(|output| output.field())
        .ok_or_else(|| anyhow::anyhow!("nothing generated"))?;
    texture::texture_from_height_map(field).save("preset_heights.png")?;
    println!("Saved preset_heights.png");

    Ok(())
}

/// Darken each pixel by a Lambert term from the mesh normal under it.
/// Only valid at full resolution, where pixels and vertices line up.
fn shade(img: &mut RgbaImage, normals: &[[f32; 3]], vertices_per_row: usize) {
    if vertices_per_row as u32 != img.width() {
        return;
    }
    let light = {
        let (x, y, z) = (-0.5f32, 0.8f32, 0.4f32);
        let len = (x * x + y * y + z * z).sqrt();
        [x / len, y / len, z / len]
    };

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let n = normals[y as usize * vertices_per_row + x as usize];
        let lambert = (n[0] * light[0] + n[1] * light[1] + n[2] * light[2]).max(0.0);
        let shade = 0.45 + 0.55 * lambert;
        for channel in pixel.0.iter_mut().take(3) {
            *channel = (*channel as f32 * shade).min(255.0) as u8;
        }
    }
}

fn create_grid(images: &[RgbaImage], columns: u32) -> RgbaImage {
    let cell_w = images.iter().map(|i| i.width()).max().unwrap_or(0);
    let cell_h = images.iter().map(|i| i.height()).max().unwrap_or(0);
    let rows = (images.len() as u32).div_ceil(columns);

    let mut grid: RgbaImage = ImageBuffer::from_pixel(
        columns * (cell_w + PADDING) + PADDING,
        rows * (cell_h + PADDING) + PADDING,
        Rgba([32, 32, 32, 255]),
    );

    for (i, img) in images.iter().enumerate() {
        let col = i as u32 % columns;
        let row = i as u32 / columns;
        let x0 = PADDING + col * (cell_w + PADDING);
        let y0 = PADDING + row * (cell_h + PADDING);
        image::imageops::overlay(&mut grid, img, x0 as i64, y0 as i64);
    }

    grid
}
