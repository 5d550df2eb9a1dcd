//! Generation parameters and level-of-detail configuration.

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Side length of the default square map. `240` is divisible by every LOD
/// step (1, 2, 4, 6, 8, 10, 12), so 241 vertices land exactly on both edges.
pub const MAP_CHUNK_SIZE: usize = 241;

/// Highest supported level of detail.
pub const MAX_LEVEL_OF_DETAIL: u8 = 6;

/// Scalar inputs of noise synthesis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    /// Number of columns in the height field
    pub width: usize,
    /// Number of rows in the height field
    pub height: usize,
    /// Zoom of the noise; larger values give broader features
    pub scale: f32,
    /// Number of noise layers. Signed so that out-of-range input can be
    /// clamped instead of rejected.
    pub octaves: i32,
    /// Amplitude multiplier per octave (0.0-1.0)
    pub persistence: f32,
    /// Frequency multiplier per octave (>= 1.0)
    pub lacunarity: f32,
    pub seed: u64,
    /// Pan of the sampled noise plane
    pub offset: [f32; 2],
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            width: MAP_CHUNK_SIZE,
            height: MAP_CHUNK_SIZE,
            scale: 25.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 0,
            offset: [0.0, 0.0],
        }
    }
}

/// A parameter that was pulled back into its valid range.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamAdjustment {
    pub field: &'static str,
    pub requested: f64,
    pub applied: f64,
}

impl std::fmt::Display for ParamAdjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} clamped from {} to {}", self.field, self.requested, self.applied)
    }
}

impl GenerationParameters {
    /// Return a copy with a finite `lacunarity >= 1`, `octaves >= 0`,
    /// persistence in `[0, 1]` and a finite offset, plus the list of fields
    /// that had to change.
    pub fn validated(&self) -> (Self, Vec<ParamAdjustment>) {
        let mut clamped = self.clone();
        let mut adjustments = Vec::new();

        if !(clamped.lacunarity >= 1.0 && clamped.lacunarity.is_finite()) {
            adjustments.push(ParamAdjustment {
                field: "lacunarity",
                requested: clamped.lacunarity as f64,
                applied: 1.0,
            });
            clamped.lacunarity = 1.0;
        }
        if clamped.octaves < 0 {
            adjustments.push(ParamAdjustment {
                field: "octaves",
                requested: clamped.octaves as f64,
                applied: 0.0,
            });
            clamped.octaves = 0;
        }
        if !(0.0..=1.0).contains(&clamped.persistence) {
            let applied = if clamped.persistence > 1.0 { 1.0 } else { 0.0 };
            adjustments.push(ParamAdjustment {
                field: "persistence",
                requested: clamped.persistence as f64,
                applied: applied as f64,
            });
            clamped.persistence = applied;
        }
        for (field, component) in ["offset.x", "offset.y"].into_iter().zip(clamped.offset.iter_mut()) {
            if !component.is_finite() {
                adjustments.push(ParamAdjustment {
                    field,
                    requested: *component as f64,
                    applied: 0.0,
                });
                *component = 0.0;
            }
        }

        (clamped, adjustments)
    }

    /// Octave count after clamping.
    pub fn octave_count(&self) -> u32 {
        self.octaves.max(0) as u32
    }

    pub fn check_dimensions(&self) -> Result<(), GenerationError> {
        if self.width == 0 || self.height == 0 {
            return Err(GenerationError::DegenerateDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Mesh simplification level in `0..=6`.
///
/// Level 0 keeps every cell; higher levels skip cells with a stride of
/// `2 * level`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LevelOfDetail(u8);

impl LevelOfDetail {
    pub const FULL: Self = Self(0);

    pub fn new(level: u8) -> Result<Self, GenerationError> {
        if level > MAX_LEVEL_OF_DETAIL {
            return Err(GenerationError::InvalidLevelOfDetail(level));
        }
        Ok(Self(level))
    }

    /// Saturate any integer into the valid range.
    pub fn clamped(level: i64) -> Self {
        Self(level.clamp(0, MAX_LEVEL_OF_DETAIL as i64) as u8)
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Grid stride used when walking the height field.
    pub fn step(self) -> usize {
        if self.0 == 0 {
            1
        } else {
            self.0 as usize * 2
        }
    }

    /// Vertices along an edge of `cells` samples at this level.
    pub fn vertices_per_line(self, cells: usize) -> usize {
        if cells == 0 {
            return 0;
        }
        (cells - 1) / self.step() + 1
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..=MAX_LEVEL_OF_DETAIL).map(Self)
    }
}

impl TryFrom<u8> for LevelOfDetail {
    type Error = GenerationError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<LevelOfDetail> for u8 {
    fn from(lod: LevelOfDetail) -> u8 {
        lod.0
    }
}

impl std::fmt::Display for LevelOfDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LOD {} (step {})", self.0, self.step())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping_scenario() {
        let params = GenerationParameters {
            lacunarity: 0.3,
            octaves: -2,
            ..Default::default()
        };
        let (clamped, adjustments) = params.validated();
        assert_eq!(clamped.lacunarity, 1.0);
        assert_eq!(clamped.octaves, 0);
        assert_eq!(adjustments.len(), 2);
        assert_eq!(adjustments[0].field, "lacunarity");
        assert_eq!(adjustments[1].field, "octaves");
    }

    #[test]
    fn test_valid_params_untouched() {
        let params = GenerationParameters::default();
        let (clamped, adjustments) = params.validated();
        assert_eq!(clamped, params);
        assert!(adjustments.is_empty());
    }

    #[test]
    fn test_nan_lacunarity_clamped() {
        let params = GenerationParameters {
            lacunarity: f32::NAN,
            ..Default::default()
        };
        assert_eq!(params.validated().0.lacunarity, 1.0);
    }

    #[test]
    fn test_infinite_lacunarity_clamped() {
        let params = GenerationParameters {
            lacunarity: f32::INFINITY,
            ..Default::default()
        };
        let (clamped, adjustments) = params.validated();
        assert_eq!(clamped.lacunarity, 1.0);
        assert_eq!(adjustments[0].field, "lacunarity");
    }

    #[test]
    fn test_non_finite_offset_reset() {
        let params = GenerationParameters {
            offset: [f32::INFINITY, f32::NAN],
            ..Default::default()
        };
        let (clamped, adjustments) = params.validated();
        assert_eq!(clamped.offset, [0.0, 0.0]);
        let fields: Vec<&str> = adjustments.iter().map(|a| a.field).collect();
        assert_eq!(fields, vec!["offset.x", "offset.y"]);

        let params = GenerationParameters { offset: [12.5, -3.0], ..Default::default() };
        assert_eq!(params.validated().0.offset, [12.5, -3.0]);
    }

    #[test]
    fn test_persistence_clamped_into_unit_range() {
        let params = GenerationParameters { persistence: 1.7, ..Default::default() };
        assert_eq!(params.validated().0.persistence, 1.0);
        let params = GenerationParameters { persistence: -0.2, ..Default::default() };
        assert_eq!(params.validated().0.persistence, 0.0);
    }

    #[test]
    fn test_degenerate_dimensions() {
        let params = GenerationParameters { width: 0, ..Default::default() };
        assert_eq!(
            params.check_dimensions(),
            Err(GenerationError::DegenerateDimensions { width: 0, height: MAP_CHUNK_SIZE })
        );
    }

    #[test]
    fn test_lod_steps() {
        let steps: Vec<usize> = LevelOfDetail::all().map(|l| l.step()).collect();
        assert_eq!(steps, vec![1, 2, 4, 6, 8, 10, 12]);
    }

    #[test]
    fn test_lod_range() {
        assert!(LevelOfDetail::new(6).is_ok());
        assert_eq!(LevelOfDetail::new(7), Err(GenerationError::InvalidLevelOfDetail(7)));
        assert_eq!(LevelOfDetail::clamped(-3).level(), 0);
        assert_eq!(LevelOfDetail::clamped(42).level(), 6);
    }

    #[test]
    fn test_chunk_size_divides_every_step() {
        for lod in LevelOfDetail::all() {
            assert_eq!((MAP_CHUNK_SIZE - 1) % lod.step(), 0, "{lod}");
        }
    }
}
