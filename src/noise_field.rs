//! Fractal noise synthesis.
//!
//! Sums `octaves` layers of Perlin noise with growing frequency and shrinking
//! amplitude, then rescales the result from its observed range into `[0, 1]`.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::GenerationError;
use crate::params::GenerationParameters;
use crate::tilemap::Tilemap;

/// Stand-in for a non-positive scale
const MIN_SCALE: f64 = 0.0001;

/// Per-octave sample offsets are drawn from `[-OCTAVE_OFFSET_RANGE, OCTAVE_OFFSET_RANGE)`
const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Perlin lattice hashing repeats with this period on both axes
const PERLIN_PERIOD: f64 = 256.0;

/// Value given to every cell when the raw field has no spread
pub const FLAT_FIELD_VALUE: f32 = 0.5;

/// Normalized height grid. Every value lies in `[0, 1]`.
///
/// Only the noise module can build one; consumers get read access.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeightField(Tilemap<f32>);

impl HeightField {
    pub fn width(&self) -> usize {
        self.0.width
    }

    pub fn height(&self) -> usize {
        self.0.height
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        *self.0.get(x, y)
    }

    pub fn as_tilemap(&self) -> &Tilemap<f32> {
        &self.0
    }

    pub fn as_slice(&self) -> &[f32] {
        self.0.as_slice()
    }

    /// Summary statistics of the normalized heights.
    pub fn stats(&self, num_bins: usize) -> HeightStats {
        let num_bins = num_bins.clamp(1, 50);
        let values = self.as_slice();
        let count = values.len();

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        let mut sum = 0.0f64;
        let mut bins = vec![0usize; num_bins];
        for &h in values {
            min = min.min(h);
            max = max.max(h);
            sum += h as f64;
            let bin = ((h * num_bins as f32) as usize).min(num_bins - 1);
            bins[bin] += 1;
        }

        HeightStats {
            min,
            max,
            mean: (sum / count as f64) as f32,
            bins,
        }
    }
}

/// Distribution of heights, binned over `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightStats {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub bins: Vec<usize>,
}

impl HeightStats {
    /// Print a bar chart of the bins.
    pub fn print_histogram(&self) {
        let total: usize = self.bins.iter().sum();
        let max_bin = self.bins.iter().copied().max().unwrap_or(1).max(1);
        let bin_width = 1.0 / self.bins.len() as f32;

        println!("Height distribution (min {:.3}, max {:.3}, mean {:.3}):", self.min, self.max, self.mean);
        for (i, &count) in self.bins.iter().enumerate() {
            let bar_len = count * 40 / max_bin;
            let pct = 100.0 * count as f64 / total.max(1) as f64;
            println!(
                "  {:.2}-{:.2} │{:<40}│ {:>5.1}%",
                i as f32 * bin_width,
                (i + 1) as f32 * bin_width,
                "█".repeat(bar_len),
                pct
            );
        }
    }
}

/// Generate a height field from parameters, clamping them first.
pub fn generate(params: &GenerationParameters) -> Result<HeightField, GenerationError> {
    let (params, adjustments) = params.validated();
    for adjustment in &adjustments {
        log::warn!("{adjustment}");
    }

    synthesize(
        params.width,
        params.height,
        params.seed,
        params.scale,
        params.octave_count(),
        params.persistence,
        params.lacunarity,
        params.offset,
    )
}

/// Per-octave sample offsets, including the caller's pan.
///
/// Depends only on `seed` and the octave index, so the same seed always
/// samples the same region of the noise plane.
pub fn octave_offsets(seed: u64, octaves: u32, offset: [f32; 2]) -> Vec<[f64; 2]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..octaves)
        .map(|_| {
            let ox = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
            let oy = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
            [ox + offset[0] as f64, oy + offset[1] as f64]
        })
        .collect()
}

/// Fold a u64 seed into the 32 bits Perlin takes, keeping the high half.
fn perlin_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Bring a sample coordinate into one Perlin period.
///
/// Perlin converts coordinates to integers and panics outside `isize`
/// range, which deep octaves or tiny scales reach quickly. Non-finite
/// coordinates collapse to the origin.
fn wrap_sample(v: f64) -> f64 {
    if v.is_finite() {
        v.rem_euclid(PERLIN_PERIOD)
    } else {
        0.0
    }
}

/// Synthesize a normalized fractal noise field.
///
/// Parameters are used as given; call [`generate`] to clamp them first.
#[allow(clippy::too_many_arguments)]
pub fn synthesize(
    width: usize,
    height: usize,
    seed: u64,
    scale: f32,
    octaves: u32,
    persistence: f32,
    lacunarity: f32,
    offset: [f32; 2],
) -> Result<HeightField, GenerationError> {
    if width == 0 || height == 0 {
        return Err(GenerationError::DegenerateDimensions { width, height });
    }

    let scale = if scale > 0.0 { scale as f64 } else { MIN_SCALE };
    let persistence = persistence as f64;
    let lacunarity = lacunarity as f64;
    let perlin = Perlin::new(perlin_seed(seed));
    let offsets = octave_offsets(seed, octaves, offset);

    // Sample around the center so zooming keeps the middle fixed
    let half_width = width as f64 / 2.0;
    let half_height = height as f64 / 2.0;

    let mut raw = vec![0.0f64; width * height];
    raw.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, cell) in row.iter_mut().enumerate() {
            let mut amplitude = 1.0;
            let mut frequency = 1.0;
            let mut value = 0.0;

            for octave_offset in &offsets {
                let sample_x = (x as f64 - half_width + octave_offset[0]) / scale * frequency;
                let sample_y = (y as f64 - half_height + octave_offset[1]) / scale * frequency;
                value += perlin.get([wrap_sample(sample_x), wrap_sample(sample_y)]) * amplitude;

                amplitude *= persistence;
                frequency *= lacunarity;
            }

            *cell = value;
        }
    });

    let (min, max) = raw
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    log::debug!(
        "synthesized {}x{} field, {} octaves, raw range [{:.4}, {:.4}]",
        width, height, octaves, min, max
    );

    let normalized: Vec<f32> = if range > 0.0 && range.is_finite() {
        raw.iter()
            .map(|&v| (((v - min) / range) as f32).clamp(0.0, 1.0))
            .collect()
    } else {
        vec![FLAT_FIELD_VALUE; raw.len()]
    };

    let map = Tilemap::from_vec(width, height, normalized)
        .ok_or(GenerationError::DegenerateDimensions { width, height })?;
    Ok(HeightField(map))
}

#[cfg(test)]
impl HeightField {
    /// Build a field directly from values, for mesh and classifier tests.
    pub(crate) fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        HeightField(Tilemap::from_vec(width, height, values).expect("shape matches"))
    }
}
