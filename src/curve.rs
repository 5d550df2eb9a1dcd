//! Height remapping curves applied to mesh elevation.

use serde::{Deserialize, Serialize};

/// A piecewise-linear mapping from normalized height to elevation factor.
///
/// Keys are `(t, value)` pairs sorted by `t`. Inputs before the first key or
/// after the last key take that key's value. A curve with no keys is the
/// identity. Monotonicity is expected but not enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightCurve {
    keys: Vec<[f32; 2]>,
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::linear()
    }
}

impl HeightCurve {
    /// Build a curve from control points. Points are sorted by `t`; points
    /// with non-finite coordinates are dropped.
    pub fn new(keys: impl IntoIterator<Item = (f32, f32)>) -> Self {
        let mut keys: Vec<[f32; 2]> = keys
            .into_iter()
            .filter(|(t, v)| t.is_finite() && v.is_finite())
            .map(|(t, v)| [t, v])
            .collect();
        keys.sort_by(|a, b| a[0].total_cmp(&b[0]));
        Self { keys }
    }

    pub fn linear() -> Self {
        Self::new([(0.0, 0.0), (1.0, 1.0)])
    }

    /// Flat up to `water_level`, then rising with an ease-in toward 1.
    /// Keeps water and beaches level while mountains stay tall.
    pub fn flat_below(water_level: f32) -> Self {
        let w = water_level.clamp(0.0, 0.99);
        let span = 1.0 - w;
        Self::new([
            (0.0, 0.0),
            (w, 0.0),
            (w + span * 0.25, 0.08),
            (w + span * 0.5, 0.25),
            (w + span * 0.75, 0.55),
            (1.0, 1.0),
        ])
    }

    pub fn keys(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.keys.iter().map(|k| (k[0], k[1]))
    }

    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return t,
        };
        if t <= first[0] {
            return first[1];
        }
        if t >= last[0] {
            return last[1];
        }

        // First key strictly past t; the previous key is at or before it
        let upper = self.keys.partition_point(|k| k[0] <= t);
        let [t0, v0] = self.keys[upper - 1];
        let [t1, v1] = self.keys[upper];
        let span = t1 - t0;
        if span <= 0.0 {
            return v1;
        }
        v0 + (v1 - v0) * (t - t0) / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_is_identity() {
        let curve = HeightCurve::linear();
        for t in [0.0, 0.25, 0.5, 0.9, 1.0] {
            assert!((curve.evaluate(t) - t).abs() < 1e-6);
        }
    }

    #[test]
    fn test_empty_curve_is_identity() {
        let curve = HeightCurve::new(std::iter::empty());
        assert_eq!(curve.evaluate(0.37), 0.37);
    }

    #[test]
    fn test_clamps_outside_keys() {
        let curve = HeightCurve::new([(0.2, 0.1), (0.8, 0.9)]);
        assert_eq!(curve.evaluate(0.0), 0.1);
        assert_eq!(curve.evaluate(1.0), 0.9);
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_unsorted_keys_are_sorted() {
        let curve = HeightCurve::new([(1.0, 1.0), (0.0, 0.0), (0.5, 0.2)]);
        assert!((curve.evaluate(0.25) - 0.1).abs() < 1e-6);
        assert!((curve.evaluate(0.75) - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_flat_below_water_level() {
        let curve = HeightCurve::flat_below(0.4);
        assert_eq!(curve.evaluate(0.1), 0.0);
        assert_eq!(curve.evaluate(0.4), 0.0);
        assert_eq!(curve.evaluate(1.0), 1.0);

        let mut previous = 0.0;
        for i in 0..=100 {
            let v = curve.evaluate(i as f32 / 100.0);
            assert!(v >= previous);
            previous = v;
        }
    }
}
