//! Export of height maps and generation settings.
//!
//! Height maps are written as 16-bit grayscale PNG, so every normalized
//! height survives with 1/65535 precision. Settings are written as a JSON
//! `GenerationRecord` that can be loaded back with `--config`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use image::{ImageBuffer, Luma};
use serde::{Deserialize, Serialize};

use crate::curve::HeightCurve;
use crate::error::ExportError;
use crate::generator::{DrawMode, DEFAULT_MESH_HEIGHT_MULTIPLIER};
use crate::noise_field::HeightField;
use crate::params::{GenerationParameters, LevelOfDetail};
use crate::regions::{RegionPreset, TerrainType};

/// Everything needed to reproduce a generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub parameters: GenerationParameters,
    #[serde(default)]
    pub level_of_detail: LevelOfDetail,
    #[serde(default = "default_height_multiplier")]
    pub mesh_height_multiplier: f32,
    #[serde(default)]
    pub draw_mode: DrawMode,
    /// Preset the regions came from; `None` for a custom palette
    #[serde(default)]
    pub preset: Option<RegionPreset>,
    pub regions: Vec<TerrainType>,
    #[serde(default)]
    pub height_curve: HeightCurve,
}

fn default_height_multiplier() -> f32 {
    DEFAULT_MESH_HEIGHT_MULTIPLIER
}

/// Write a height field as a 16-bit grayscale PNG.
pub fn export_heightmap_png<P: AsRef<Path>>(field: &HeightField, path: P) -> Result<(), ExportError> {
    let mut img: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::new(field.width() as u32, field.height() as u32);

    for (x, y, &h) in field.as_tilemap().iter() {
        let v = (h.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16;
        img.put_pixel(x as u32, y as u32, Luma([v]));
    }

    img.save(path.as_ref())?;
    log::debug!("wrote heightmap {}", path.as_ref().display());
    Ok(())
}

/// Write a record as pretty-printed JSON.
pub fn save_record<P: AsRef<Path>>(record: &GenerationRecord, path: P) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, record)?;
    writeln!(writer)?;
    writer.flush()?;
    log::debug!("wrote generation record {}", path.as_ref().display());
    Ok(())
}

/// Read a record written by [`save_record`] (or by hand).
pub fn load_record<P: AsRef<Path>>(path: P) -> Result<GenerationRecord, ExportError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let record: GenerationRecord = serde_json::from_reader(reader)?;
    record.parameters.check_dimensions()?;
    Ok(record)
}
