//! Perlin noise island shape
//!
//! Samples fractal Perlin noise over the normalized map square and keeps land
//! only where the noise beats a threshold that grows with the distance from
//! the map center, so the island fades into ocean towards the border.

use glam::DVec2;
use noise::{NoiseFn, Perlin};

use super::{normalized, WaterMask};
use crate::geometry::Bounds;

/// Configuration for fractal Perlin noise
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerlinConfig {
    /// Frequency over the normalized `[-1, 1]` square (lower = larger landmasses)
    pub base_frequency: f64,
    /// Number of octaves for fractal detail layers
    pub octaves: usize,
    /// Amplitude decay per octave (controls roughness)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
}

impl Default for PerlinConfig {
    fn default() -> Self {
        Self {
            base_frequency: 1.5,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Noise island with a radial falloff
///
/// A point `q` in normalized coordinates is land when
/// `c > 0.3 + 0.3 * |q|^2`, where `c` is the fractal noise mapped to [0, 1].
pub struct PerlinIsland {
    noise: Perlin,
    config: PerlinConfig,
}

impl PerlinIsland {
    /// Create an island with the default noise configuration
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, PerlinConfig::default())
    }

    pub fn with_config(seed: u64, config: PerlinConfig) -> Self {
        // Fold the high bits in so seeds differing only above bit 32 differ here too
        let seed = (seed ^ (seed >> 32)) as u32;
        Self {
            noise: Perlin::new(seed),
            config,
        }
    }

    /// Fractal noise at a normalized position, in [-1, 1]
    pub fn sample(&self, q: DVec2) -> f64 {
        let mut total = 0.0;
        let mut norm = 0.0;
        let mut frequency = self.config.base_frequency;
        let mut amplitude = 1.0;

        for _ in 0..self.config.octaves {
            total += self.noise.get([q.x * frequency, q.y * frequency]) * amplitude;
            norm += amplitude;

            frequency *= self.config.lacunarity;
            amplitude *= self.config.persistence;
        }

        if norm > 0.0 {
            (total / norm).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

impl WaterMask for PerlinIsland {
    fn is_water(&self, point: DVec2, bounds: Bounds) -> bool {
        let q = normalized(point, bounds);
        let c = (self.sample(q) + 1.0) / 2.0;
        c <= 0.3 + 0.3 * q.length_squared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_range() {
        let island = PerlinIsland::new(42);
        for i in 0..40 {
            for j in 0..40 {
                let q = DVec2::new(i as f64 / 20.0 - 1.0, j as f64 / 20.0 - 1.0);
                let v = island.sample(q);
                assert!((-1.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_rectangle_corners_are_water() {
        // |q|^2 = 2 at the corners: the threshold 0.9 needs noise above 0.8
        let bounds = Bounds::new(100.0, 100.0);
        let island = PerlinIsland::new(3);
        for corner in bounds.corners() {
            assert!(island.is_water(corner, bounds));
        }
    }

    #[test]
    fn test_island_determinism() {
        let bounds = Bounds::new(64.0, 64.0);
        let a = PerlinIsland::new(123);
        let b = PerlinIsland::new(123);
        for i in 0..32 {
            let p = DVec2::new(i as f64 * 2.0 + 0.5, 31.7);
            assert_eq!(a.is_water(p, bounds), b.is_water(p, bounds));
        }
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let island = PerlinIsland::with_config(
            1,
            PerlinConfig {
                octaves: 0,
                ..Default::default()
            },
        );
        assert_eq!(island.sample(DVec2::new(0.3, 0.4)), 0.0);
        // c = 0.5 beats the threshold at the center only
        let bounds = Bounds::new(10.0, 10.0);
        assert!(!island.is_water(bounds.center(), bounds));
        assert!(island.is_water(DVec2::new(0.0, 5.0), bounds));
    }
}
