//! Height-band classification and named region palettes.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::curve::HeightCurve;
use crate::noise_field::HeightField;
use crate::tilemap::Tilemap;

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Color of cells above every region threshold.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Per-cell colors of a classified height field.
pub type ColorMap = Tilemap<Rgba>;

/// A named height band. A cell belongs to the first band whose threshold is
/// at or above its height.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainType {
    pub name: String,
    pub height: f32,
    pub color: Rgba,
}

impl TerrainType {
    pub fn new(name: impl Into<String>, height: f32, color: Rgba) -> Self {
        Self {
            name: name.into(),
            height,
            color,
        }
    }
}

/// Color for a single height: first region with `height <= threshold`.
///
/// Heights above every threshold get [`Rgba::TRANSPARENT`].
pub fn classify(height: f32, regions: &[TerrainType]) -> Rgba {
    regions
        .iter()
        .find(|region| height <= region.height)
        .map_or(Rgba::TRANSPARENT, |region| region.color)
}

/// Classify every cell of a height field.
pub fn classify_all(field: &HeightField, regions: &[TerrainType]) -> ColorMap {
    let colors: Vec<Rgba> = field
        .as_slice()
        .par_iter()
        .map(|&h| classify(h, regions))
        .collect();

    let unclassified = colors.iter().filter(|&&c| c == Rgba::TRANSPARENT).count();
    if unclassified > 0 {
        log::debug!("{unclassified} cells above every region threshold left transparent");
    }

    let width = field.width();
    let height = field.height();
    Tilemap::from_vec(width, height, colors).unwrap_or_else(|| Tilemap::new(width, height))
}

/// Region table plus the curve used to raise the mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub regions: Vec<TerrainType>,
    pub height_curve: HeightCurve,
}

/// Built-in palettes, selectable by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionPreset {
    /// Oceans, beaches, grassland, rock and snowcaps
    #[default]
    Default,
    /// Dunes with rare oases
    Desert,
    /// Wooded lowlands
    Forest,
    /// Mostly rock with deep valleys
    Mountain,
    /// Frozen coast and ice fields
    Snowy,
    /// Archipelago in open sea
    Water,
}

impl RegionPreset {
    pub fn all() -> &'static [Self] {
        &[
            Self::Default,
            Self::Desert,
            Self::Forest,
            Self::Mountain,
            Self::Snowy,
            Self::Water,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Default => "Oceans, beaches, grassland and snowcaps",
            Self::Desert => "Dunes with rare oases",
            Self::Forest => "Wooded lowlands",
            Self::Mountain => "Rocky ranges with deep valleys",
            Self::Snowy => "Frozen coast and ice fields",
            Self::Water => "Archipelago in open sea",
        }
    }

    /// Regions and height curve of this preset, swapped in together.
    pub fn palette(&self) -> Palette {
        match self {
            Self::Default => Palette {
                regions: vec![
                    TerrainType::new("Deep Water", 0.3, Rgba::opaque(33, 61, 153)),
                    TerrainType::new("Shallow Water", 0.4, Rgba::opaque(54, 102, 198)),
                    TerrainType::new("Sand", 0.45, Rgba::opaque(209, 208, 128)),
                    TerrainType::new("Grass", 0.55, Rgba::opaque(86, 152, 23)),
                    TerrainType::new("Dense Grass", 0.6, Rgba::opaque(62, 107, 18)),
                    TerrainType::new("Rock", 0.7, Rgba::opaque(90, 69, 60)),
                    TerrainType::new("High Rock", 0.9, Rgba::opaque(75, 60, 53)),
                    TerrainType::new("Snow", 1.0, Rgba::opaque(255, 255, 255)),
                ],
                height_curve: HeightCurve::flat_below(0.4),
            },
            Self::Desert => Palette {
                regions: vec![
                    TerrainType::new("Oasis", 0.12, Rgba::opaque(48, 128, 160)),
                    TerrainType::new("Oasis Shore", 0.16, Rgba::opaque(104, 140, 62)),
                    TerrainType::new("Low Dunes", 0.45, Rgba::opaque(226, 196, 128)),
                    TerrainType::new("Dunes", 0.75, Rgba::opaque(214, 174, 104)),
                    TerrainType::new("Mesa", 0.9, Rgba::opaque(176, 112, 70)),
                    TerrainType::new("Mesa Top", 1.0, Rgba::opaque(150, 92, 58)),
                ],
                height_curve: HeightCurve::new([(0.0, 0.0), (0.16, 0.0), (0.75, 0.3), (0.85, 0.8), (1.0, 0.85)]),
            },
            Self::Forest => Palette {
                regions: vec![
                    TerrainType::new("River", 0.25, Rgba::opaque(52, 96, 150)),
                    TerrainType::new("Marsh", 0.32, Rgba::opaque(84, 110, 70)),
                    TerrainType::new("Meadow", 0.45, Rgba::opaque(110, 160, 60)),
                    TerrainType::new("Forest", 0.7, Rgba::opaque(34, 100, 34)),
                    TerrainType::new("Old Forest", 0.88, Rgba::opaque(22, 70, 30)),
                    TerrainType::new("Hilltop", 1.0, Rgba::opaque(96, 110, 80)),
                ],
                height_curve: HeightCurve::flat_below(0.25),
            },
            Self::Mountain => Palette {
                regions: vec![
                    TerrainType::new("Lake", 0.15, Rgba::opaque(40, 80, 130)),
                    TerrainType::new("Valley", 0.3, Rgba::opaque(88, 120, 60)),
                    TerrainType::new("Scree", 0.5, Rgba::opaque(120, 112, 100)),
                    TerrainType::new("Rock", 0.75, Rgba::opaque(92, 84, 78)),
                    TerrainType::new("Cliff", 0.9, Rgba::opaque(70, 64, 60)),
                    TerrainType::new("Peak", 1.0, Rgba::opaque(240, 240, 245)),
                ],
                height_curve: HeightCurve::new([(0.0, 0.0), (0.15, 0.0), (0.5, 0.3), (1.0, 1.0)]),
            },
            Self::Snowy => Palette {
                regions: vec![
                    TerrainType::new("Icy Water", 0.3, Rgba::opaque(70, 110, 150)),
                    TerrainType::new("Pack Ice", 0.38, Rgba::opaque(190, 215, 230)),
                    TerrainType::new("Tundra", 0.5, Rgba::opaque(150, 160, 140)),
                    TerrainType::new("Snowfield", 0.8, Rgba::opaque(230, 235, 240)),
                    TerrainType::new("Glacier", 1.0, Rgba::opaque(210, 230, 250)),
                ],
                height_curve: HeightCurve::flat_below(0.38),
            },
            Self::Water => Palette {
                regions: vec![
                    TerrainType::new("Abyss", 0.35, Rgba::opaque(16, 36, 110)),
                    TerrainType::new("Deep Water", 0.55, Rgba::opaque(30, 64, 160)),
                    TerrainType::new("Shallow Water", 0.68, Rgba::opaque(60, 120, 200)),
                    TerrainType::new("Reef", 0.72, Rgba::opaque(80, 180, 190)),
                    TerrainType::new("Beach", 0.78, Rgba::opaque(220, 210, 150)),
                    TerrainType::new("Island", 1.0, Rgba::opaque(70, 140, 50)),
                ],
                height_curve: HeightCurve::flat_below(0.72),
            },
        }
    }
}

impl std::fmt::Display for RegionPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Desert => write!(f, "desert"),
            Self::Forest => write!(f, "forest"),
            Self::Mountain => write!(f, "mountain"),
            Self::Snowy => write!(f, "snowy"),
            Self::Water => write!(f, "water"),
        }
    }
}

impl std::str::FromStr for RegionPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|preset| preset.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let names: Vec<String> = Self::all().iter().map(|p| p.to_string()).collect();
                format!("unknown preset '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bands() -> Vec<TerrainType> {
        vec![
            TerrainType::new("Water", 0.4, Rgba::opaque(0, 0, 255)),
            TerrainType::new("Land", 0.8, Rgba::opaque(0, 255, 0)),
        ]
    }

    #[test]
    fn test_first_match_wins() {
        let regions = bands();
        assert_eq!(classify(0.1, &regions), Rgba::opaque(0, 0, 255));
        assert_eq!(classify(0.4, &regions), Rgba::opaque(0, 0, 255));
        assert_eq!(classify(0.41, &regions), Rgba::opaque(0, 255, 0));
    }

    #[test]
    fn test_caller_order_respected() {
        // Not sorted: the wide band shadows the narrow one
        let regions = vec![
            TerrainType::new("Everything", 1.0, Rgba::opaque(1, 1, 1)),
            TerrainType::new("Low", 0.2, Rgba::opaque(2, 2, 2)),
        ];
        assert_eq!(classify(0.1, &regions), Rgba::opaque(1, 1, 1));
    }

    #[test]
    fn test_unclassified_height_is_transparent() {
        assert_eq!(classify(0.95, &bands()), Rgba::TRANSPARENT);
        assert_eq!(classify(0.5, &[]), Rgba::TRANSPARENT);
    }

    #[test]
    fn test_stable_under_downward_perturbation() {
        let regions = bands();
        let color = classify(0.7, &regions);
        for h in [0.69, 0.6, 0.5, 0.41] {
            assert_eq!(classify(h, &regions), color);
        }
    }

    #[test]
    fn test_classify_all_shape() {
        let field = HeightField::from_values(3, 2, vec![0.0, 0.5, 1.0, 0.3, 0.6, 0.9]);
        let colors = classify_all(&field, &bands());
        assert_eq!((colors.width, colors.height), (3, 2));
        assert_eq!(*colors.get(1, 0), Rgba::opaque(0, 255, 0));
        assert_eq!(*colors.get(2, 0), Rgba::TRANSPARENT);
        assert_eq!(*colors.get(0, 1), Rgba::opaque(0, 0, 255));
    }

    #[test]
    fn test_presets_cover_full_range() {
        for preset in RegionPreset::all() {
            let palette = preset.palette();
            let last = palette.regions.last().expect("preset has regions");
            assert_eq!(last.height, 1.0, "{preset} leaves the top band unclassified");
            assert!(palette.regions.windows(2).all(|w| w[0].height < w[1].height), "{preset}");
        }
    }

    #[test]
    fn test_preset_names_round_trip() {
        for preset in RegionPreset::all() {
            assert_eq!(preset.to_string().parse::<RegionPreset>(), Ok(*preset));
        }
        assert_eq!("Desert".parse::<RegionPreset>(), Ok(RegionPreset::Desert));
        assert!("lava".parse::<RegionPreset>().is_err());
    }
}
