//! Land/water pre-classification
//!
//! Before the ocean flood fill every center is asked whether it is a water
//! candidate. The answer comes from a [`WaterMask`] policy:
//!
//! - [`PerlinIsland`]: fractal noise with a radial falloff (random mode)
//! - [`RadialIsland`]: overlapping sine bumps around the map center (random mode)
//! - [`RegionMask`]: land only inside user-drawn circles (mask-constrained mode)
//!
//! Any `Fn(DVec2, Bounds) -> bool` closure is a mask too.

mod mask;
mod perlin;

pub use mask::RegionMask;
pub use perlin::{PerlinConfig, PerlinIsland};

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{GenerationMode, IslandShape, MapConfig};
use crate::geometry::Bounds;

/// Decides which points of the map start out as water
pub trait WaterMask {
    /// Check whether a point is a water candidate
    fn is_water(&self, point: DVec2, bounds: Bounds) -> bool;
}

impl<F> WaterMask for F
where
    F: Fn(DVec2, Bounds) -> bool,
{
    fn is_water(&self, point: DVec2, bounds: Bounds) -> bool {
        self(point, bounds)
    }
}

/// Map a point into `[-1, 1] x [-1, 1]` with the map center at the origin
#[inline]
pub fn normalized(point: DVec2, bounds: Bounds) -> DVec2 {
    DVec2::new(
        2.0 * point.x / bounds.width - 1.0,
        2.0 * point.y / bounds.height - 1.0,
    )
}

/// Gap between the inner and outer ring of a radial island
const ISLAND_FACTOR: f64 = 1.07;

/// Island made of overlapping sine waves around the map center
///
/// All shape parameters are drawn once from the seed, so the same seed always
/// gives the same outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialIsland {
    bumps: i32,
    start_angle: f64,
    dip_angle: f64,
    dip_width: f64,
}

impl RadialIsland {
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self {
            bumps: rng.gen_range(1..=6),
            start_angle: rng.gen_range(0.0..TAU),
            dip_angle: rng.gen_range(0.0..TAU),
            dip_width: rng.gen_range(0.2..0.7),
        }
    }
}

impl WaterMask for RadialIsland {
    fn is_water(&self, point: DVec2, bounds: Bounds) -> bool {
        let q = normalized(point, bounds);
        let angle = q.y.atan2(q.x);
        let length = 0.5 * (q.x.abs().max(q.y.abs()) + q.length());
        let bumps = self.bumps as f64;

        let mut r1 = 0.5 + 0.40 * (self.start_angle + bumps * angle + ((bumps + 3.0) * angle).cos()).sin();
        let mut r2 = 0.7 - 0.20 * (self.start_angle + bumps * angle - ((bumps + 2.0) * angle).sin()).sin();

        let dip = angle - self.dip_angle;
        if dip.abs() < self.dip_width
            || (dip + 2.0 * PI).abs() < self.dip_width
            || (dip - 2.0 * PI).abs() < self.dip_width
        {
            r1 = 0.2;
            r2 = 0.2;
        }

        let land = length < r1 || (length > r1 * ISLAND_FACTOR && length < r2);
        !land
    }
}

/// Build the water mask a configuration asks for
///
/// Random mode seeds the island shape from `terrain_seed`; mask-constrained
/// mode uses the configured regions.
pub fn mask_for(config: &MapConfig) -> Box<dyn WaterMask> {
    match config.mode {
        GenerationMode::MaskConstrained => Box::new(RegionMask::new(config.mask_regions.clone())),
        GenerationMode::Random => match config.island_shape {
            IslandShape::Perlin => Box::new(PerlinIsland::new(config.terrain_seed)),
            IslandShape::Radial => Box::new(RadialIsland::new(config.terrain_seed)),
        },
    }
}
