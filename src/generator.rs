//! Generation orchestration: parameters in, height field / color map / mesh
//! out, according to the selected draw mode.

use image::RgbaImage;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::display::MapDisplay;
use crate::error::{DisplayError, GenerationError};
use crate::export::GenerationRecord;
use crate::mesh::{build_mesh, MeshData};
use crate::noise_field::{self, HeightField};
use crate::params::{GenerationParameters, LevelOfDetail};
use crate::regions::{classify_all, ColorMap, Palette, RegionPreset};
use crate::texture;

/// Upper bound (inclusive) for randomized seeds
pub const RANDOM_SEED_MAX: u64 = 100_000;

pub const DEFAULT_MESH_HEIGHT_MULTIPLIER: f32 = 30.0;

/// Which outputs a generation produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Raw heights, shown as grayscale
    NoiseMap,
    /// Region colors, shown flat
    ColorMap,
    /// Region colors draped over a 3D mesh
    #[default]
    Mesh,
}

impl DrawMode {
    pub fn all() -> &'static [Self] {
        &[Self::NoiseMap, Self::ColorMap, Self::Mesh]
    }
}

impl std::fmt::Display for DrawMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoiseMap => write!(f, "noise"),
            Self::ColorMap => write!(f, "color"),
            Self::Mesh => write!(f, "mesh"),
        }
    }
}

impl std::str::FromStr for DrawMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown draw mode '{}', expected noise, color or mesh", s))
    }
}

/// Result of one generation.
#[derive(Clone, Debug, PartialEq)]
pub enum MapOutput {
    NoiseMap {
        field: HeightField,
    },
    ColorMap {
        field: HeightField,
        colors: ColorMap,
    },
    Mesh {
        field: HeightField,
        colors: ColorMap,
        mesh: MeshData,
    },
}

impl MapOutput {
    pub fn field(&self) -> &HeightField {
        match self {
            Self::NoiseMap { field } | Self::ColorMap { field, .. } | Self::Mesh { field, .. } => field,
        }
    }

    pub fn colors(&self) -> Option<&ColorMap> {
        match self {
            Self::NoiseMap { .. } => None,
            Self::ColorMap { colors, .. } | Self::Mesh { colors, .. } => Some(colors),
        }
    }

    pub fn mesh(&self) -> Option<&MeshData> {
        match self {
            Self::Mesh { mesh, .. } => Some(mesh),
            _ => None,
        }
    }

    /// Texture for display: grayscale for noise maps, region colors otherwise.
    pub fn texture(&self) -> RgbaImage {
        match self.colors() {
            Some(colors) => texture::texture_from_color_map(colors),
            None => texture::texture_from_height_map(self.field()),
        }
    }

    /// Hand this output to a display.
    pub fn draw(&self, display: &mut dyn MapDisplay) -> Result<(), DisplayError> {
        let texture = self.texture();
        match self.mesh() {
            Some(mesh) => display.draw_mesh(mesh, &texture),
            None => display.draw_texture(&texture),
        }
    }
}

/// Human-readable status strings for a host UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusLabels {
    pub seed: String,
    pub height: String,
    pub scale: String,
}

/// Owns the generation settings and the last successful output.
#[derive(Clone, Debug)]
pub struct MapGenerator {
    pub params: GenerationParameters,
    pub draw_mode: DrawMode,
    pub level_of_detail: LevelOfDetail,
    pub mesh_height_multiplier: f32,
    preset: Option<RegionPreset>,
    palette: Palette,
    last_output: Option<MapOutput>,
}

impl Default for MapGenerator {
    fn default() -> Self {
        Self::new(GenerationParameters::default())
    }
}

impl MapGenerator {
    pub fn new(params: GenerationParameters) -> Self {
        let preset = RegionPreset::default();
        Self {
            params,
            draw_mode: DrawMode::default(),
            level_of_detail: LevelOfDetail::FULL,
            mesh_height_multiplier: DEFAULT_MESH_HEIGHT_MULTIPLIER,
            preset: Some(preset),
            palette: preset.palette(),
            last_output: None,
        }
    }

    /// Restore settings from a saved record. Nothing is generated yet.
    pub fn from_record(record: GenerationRecord) -> Self {
        Self {
            params: record.parameters,
            draw_mode: record.draw_mode,
            level_of_detail: record.level_of_detail,
            mesh_height_multiplier: record.mesh_height_multiplier,
            preset: record.preset,
            palette: Palette {
                regions: record.regions,
                height_curve: record.height_curve,
            },
            last_output: None,
        }
    }

    /// Snapshot of the current settings.
    pub fn record(&self) -> GenerationRecord {
        GenerationRecord {
            parameters: self.params.clone(),
            level_of_detail: self.level_of_detail,
            mesh_height_multiplier: self.mesh_height_multiplier,
            draw_mode: self.draw_mode,
            preset: self.preset,
            regions: self.palette.regions.clone(),
            height_curve: self.palette.height_curve.clone(),
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The preset the palette came from, or `None` for a custom palette.
    pub fn preset(&self) -> Option<RegionPreset> {
        self.preset
    }

    /// Last successful output. A failed generation leaves it untouched.
    pub fn last_output(&self) -> Option<&MapOutput> {
        self.last_output.as_ref()
    }

    /// Clamp parameters in place, logging every adjustment.
    pub fn validate(&mut self) {
        let (params, adjustments) = self.params.validated();
        for adjustment in &adjustments {
            log::warn!("{adjustment}");
        }
        self.params = params;
    }

    /// Run the pipeline for the current draw mode.
    pub fn generate(&mut self) -> Result<&MapOutput, GenerationError> {
        self.validate();
        let field = noise_field::generate(&self.params)?;

        let output = match self.draw_mode {
            DrawMode::NoiseMap => MapOutput::NoiseMap { field },
            DrawMode::ColorMap => {
                let colors = classify_all(&field, &self.palette.regions);
                MapOutput::ColorMap { field, colors }
            }
            DrawMode::Mesh => {
                let colors = classify_all(&field, &self.palette.regions);
                let mesh = build_mesh(
                    &field,
                    self.mesh_height_multiplier,
                    &self.palette.height_curve,
                    self.level_of_detail,
                );
                MapOutput::Mesh { field, colors, mesh }
            }
        };

        log::info!(
            "generated {}x{} {} map (seed {}, {})",
            self.params.width,
            self.params.height,
            self.draw_mode,
            self.params.seed,
            self.level_of_detail
        );
        Ok(&*self.last_output.insert(output))
    }

    /// Draw the last output, if any. Returns whether anything was drawn.
    pub fn draw(&self, display: &mut dyn MapDisplay) -> Result<bool, DisplayError> {
        match &self.last_output {
            Some(output) => {
                output.draw(display)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Swap regions and height curve together, then regenerate.
    pub fn apply_preset(&mut self, preset: RegionPreset) -> Result<&MapOutput, GenerationError> {
        self.preset = Some(preset);
        self.palette = preset.palette();
        self.generate()
    }

    /// Install a custom palette, then regenerate.
    pub fn set_palette(&mut self, palette: Palette) -> Result<&MapOutput, GenerationError> {
        self.preset = None;
        self.palette = palette;
        self.generate()
    }

    pub fn increment_seed(&mut self) -> Result<&MapOutput, GenerationError> {
        self.params.seed = self.params.seed.wrapping_add(1);
        self.generate()
    }

    /// Pick a seed uniformly in `0..=RANDOM_SEED_MAX`, then regenerate.
    pub fn randomize_seed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&MapOutput, GenerationError> {
        self.params.seed = rng.gen_range(0..=RANDOM_SEED_MAX);
        self.generate()
    }

    pub fn labels(&self) -> StatusLabels {
        StatusLabels {
            seed: format!("Seed: {}", self.params.seed),
            height: format!("Height: {:.1}", self.mesh_height_multiplier),
            scale: format!("Scale: {:.1}", self.params.scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_generator(mode: DrawMode) -> MapGenerator {
        let mut generator = MapGenerator::new(GenerationParameters {
            width: 33,
            height: 33,
            seed: 10,
            ..Default::default()
        });
        generator.draw_mode = mode;
        generator
    }

    #[test]
    fn test_draw_modes_produce_expected_outputs() {
        let mut generator = small_generator(DrawMode::NoiseMap);
        let output = generator.generate().unwrap();
        assert!(output.colors().is_none() && output.mesh().is_none());

        generator.draw_mode = DrawMode::ColorMap;
        let output = generator.generate().unwrap();
        assert!(output.colors().is_some() && output.mesh().is_none());

        generator.draw_mode = DrawMode::Mesh;
        let output = generator.generate().unwrap();
        assert_eq!(output.mesh().unwrap().vertex_count(), 33 * 33);
    }

    #[test]
    fn test_generate_writes_back_clamped_params() {
        let mut generator = small_generator(DrawMode::NoiseMap);
        generator.params.lacunarity = 0.3;
        generator.params.octaves = -2;
        generator.generate().unwrap();
        assert_eq!(generator.params.lacunarity, 1.0);
        assert_eq!(generator.params.octaves, 0);
    }

    #[test]
    fn test_increment_seed_matches_direct_generation() {
        let mut generator = small_generator(DrawMode::ColorMap);
        generator.generate().unwrap();
        let incremented = generator.increment_seed().unwrap().clone();

        let mut direct = small_generator(DrawMode::ColorMap);
        direct.params.seed = 11;
        assert_eq!(&incremented, direct.generate().unwrap());
    }

    #[test]
    fn test_randomize_seed_in_range_and_reproducible() {
        let mut a = small_generator(DrawMode::NoiseMap);
        let mut b = small_generator(DrawMode::NoiseMap);
        a.randomize_seed(&mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        b.randomize_seed(&mut ChaCha8Rng::seed_from_u64(3)).unwrap();
        assert!(a.params.seed <= RANDOM_SEED_MAX);
        assert_eq!(a.params.seed, b.params.seed);
    }

    #[test]
    fn test_failed_generation_keeps_last_output() {
        let mut generator = small_generator(DrawMode::NoiseMap);
        let good = generator.generate().unwrap().clone();

        generator.params.width = 0;
        assert!(matches!(
            generator.generate(),
            Err(GenerationError::DegenerateDimensions { width: 0, .. })
        ));
        assert_eq!(generator.last_output(), Some(&good));
    }

    #[test]
    fn test_preset_swaps_regions_and_curve() {
        let mut generator = small_generator(DrawMode::Mesh);
        generator.apply_preset(RegionPreset::Desert).unwrap();
        assert_eq!(generator.preset(), Some(RegionPreset::Desert));
        assert_eq!(generator.palette(), &RegionPreset::Desert.palette());

        let custom = RegionPreset::Snowy.palette();
        generator.set_palette(custom.clone()).unwrap();
        assert_eq!(generator.preset(), None);
        assert_eq!(generator.palette(), &custom);
    }

    #[test]
    fn test_record_round_trip_through_generator() {
        let mut generator = small_generator(DrawMode::ColorMap);
        generator.level_of_detail = LevelOfDetail::new(2).unwrap();
        generator.apply_preset(RegionPreset::Forest).unwrap();

        let restored = MapGenerator::from_record(generator.record());
        assert_eq!(restored.record(), generator.record());
        assert!(restored.last_output().is_none());
    }

    #[test]
    fn test_labels() {
        let generator = small_generator(DrawMode::Mesh);
        let labels = generator.labels();
        assert_eq!(labels.seed, "Seed: 10");
        assert_eq!(labels.height, "Height: 30.0");
        assert_eq!(labels.scale, "Scale: 25.0");
    }

    #[test]
    fn test_draw_mode_names() {
        for mode in DrawMode::all() {
            assert_eq!(mode.to_string().parse::<DrawMode>(), Ok(*mode));
        }
    }

    struct RecordingDisplay {
        textures: usize,
        meshes: usize,
    }

    impl MapDisplay for RecordingDisplay {
        fn draw_texture(&mut self, _texture: &RgbaImage) -> Result<(), DisplayError> {
            self.textures += 1;
            Ok(())
        }

        fn draw_mesh(&mut self, _mesh: &MeshData, _texture: &RgbaImage) -> Result<(), DisplayError> {
            self.meshes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_draw_routes_by_mode() {
        let mut display = RecordingDisplay { textures: 0, meshes: 0 };
        let mut generator = small_generator(DrawMode::ColorMap);
        assert!(!generator.draw(&mut display).unwrap());

        generator.generate().unwrap();
        assert!(generator.draw(&mut display).unwrap());
        generator.draw_mode = DrawMode::Mesh;
        generator.generate().unwrap();
        generator.draw(&mut display).unwrap();

        assert_eq!((display.textures, display.meshes), (1, 1));
    }
}
