//! Procedural terrain generation library
//!
//! Seeded fractal noise becomes a normalized height field, which is
//! classified into region colors and turned into a level-of-detail mesh.

pub mod curve;
pub mod display;
pub mod error;
pub mod export;
pub mod generator;
pub mod mesh;
pub mod noise_field;
pub mod params;
pub mod regions;
pub mod texture;
pub mod tilemap;

pub use curve::HeightCurve;
pub use error::{DisplayError, ExportError, GenerationError};
pub use generator::{DrawMode, MapGenerator, MapOutput};
pub use mesh::{build_mesh, MeshData};
pub use noise_field::{generate, HeightField};
pub use params::{GenerationParameters, LevelOfDetail};
pub use regions::{classify, classify_all, ColorMap, Palette, RegionPreset, Rgba, TerrainType};
