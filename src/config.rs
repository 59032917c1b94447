//! Terrain Map Configuration and Builder
//!
//! This module provides the generation request value for deterministic map generation.
//! A `MapConfig` fully describes one map: the same configuration always produces
//! the identical graph and mesh.

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geometry::Bounds;

/// Upper limit for Lloyd relaxation rounds
pub const MAX_RELAXATION_ITERATIONS: i64 = 20;

/// How sites are classified as land or water before the ocean flood fill
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Land is shaped by the configured [`IslandShape`]
    #[default]
    Random,
    /// Land is whatever falls inside the configured mask regions
    MaskConstrained,
}

/// Island outline used in [`GenerationMode::Random`]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IslandShape {
    /// Fractal Perlin noise with a radial falloff
    #[default]
    Perlin,
    /// Overlapping sine waves around the map center
    Radial,
}

/// A user-drawn circular land region
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskRegion {
    /// Region center in map coordinates
    pub center: DVec2,
    /// Region radius in map units
    pub radius: f64,
}

impl MaskRegion {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }
}

/// Tuning constants for the hydrology passes
///
/// These are the knobs for elevation redistribution, river sampling and
/// moisture diffusion. The defaults produce maps whose biome spread covers
/// the whole decision table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydrologyOptions {
    /// Scale of the `sqrt(s) - sqrt(s * (1 - y))` redistribution curve
    ///
    /// Must be >= 1.0 so the curve reaches the top of the range. Larger values
    /// flatten the lowlands less.
    pub elevation_scale: f64,

    /// Raw elevation cost of one hop over water (land hops add 1.0)
    pub lake_step: f64,

    /// Per-hop moisture decay factor, in (0, 1)
    pub moisture_decay: f64,

    /// Number of river sources; `None` picks one per 20 polygons
    pub river_count: Option<usize>,

    /// Lowest corner elevation a river may start from
    pub river_source_min_elevation: f64,

    /// Highest corner elevation a river may start from
    pub river_source_max_elevation: f64,

    /// Corners with river strength above this seed moisture
    pub river_moisture_threshold: u32,

    /// Force every border center to water before the mask is asked
    ///
    /// On by default so the map is framed by ocean. Turn it off to let the
    /// mask decide border centers too, e.g. for land running off the map edge.
    pub border_is_water: bool,
}

impl Default for HydrologyOptions {
    fn default() -> Self {
        Self {
            elevation_scale: 1.1,
            lake_step: 0.01,
            moisture_decay: 0.9,
            river_count: None,
            river_source_min_elevation: 0.3,
            river_source_max_elevation: 0.9,
            river_moisture_threshold: 0,
            border_is_water: true,
        }
    }
}

impl HydrologyOptions {
    /// Validate the tuning constants
    pub fn validate(&self) -> Result<()> {
        if !(self.elevation_scale >= 1.0 && self.elevation_scale.is_finite()) {
            return Err(MapError::InvalidConfig(format!(
                "elevation scale must be a finite value >= 1.0 (got {})",
                self.elevation_scale
            )));
        }
        if !(self.lake_step > 0.0 && self.lake_step.is_finite()) {
            return Err(MapError::InvalidConfig(format!(
                "lake step must be positive (got {})",
                self.lake_step
            )));
        }
        if !(self.moisture_decay > 0.0 && self.moisture_decay < 1.0) {
            return Err(MapError::InvalidConfig(format!(
                "moisture decay must be in (0, 1) (got {})",
                self.moisture_decay
            )));
        }
        let min = self.river_source_min_elevation;
        let max = self.river_source_max_elevation;
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(MapError::InvalidConfig(format!(
                "river source elevation range must satisfy 0 <= min <= max <= 1 (got {}..{})",
                min, max
            )));
        }
        Ok(())
    }
}

/// Debug geometry toggles
///
/// Each enabled toggle adds the corresponding raw structure to the output as
/// point or line geometry.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugOptions {
    pub sites: bool,
    pub corners: bool,
    pub delaunay_edges: bool,
    pub voronoi_edges: bool,
}

impl DebugOptions {
    /// Check if any debug output is requested
    #[inline]
    pub fn any(&self) -> bool {
        self.sites || self.corners || self.delaunay_edges || self.voronoi_edges
    }
}

/// Configuration for deterministic terrain map generation
///
/// This is an immutable generation request: the pipeline consumes it and
/// returns a fresh map, sharing no state between runs.
///
/// # Example
///
/// ```rust
/// use voronoi_terrain::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .site_count(500)
///     .build()
///     .unwrap();
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: MapConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Random seed for site placement and river sources
    pub seed: u64,

    /// Random seed for the island shape (separate from the site seed)
    ///
    /// This allows the same polygon layout with different coastlines.
    pub terrain_seed: u64,

    /// Number of sites (polygons) to generate
    pub site_count: usize,

    /// Map width in world units
    pub width: f64,

    /// Map height in world units
    pub height: f64,

    /// Number of Lloyd relaxation rounds
    ///
    /// - 0: Random Voronoi cells (irregular)
    /// - 2: Good uniformity (default)
    /// - 5+: Diminishing returns
    pub relaxation_iterations: usize,

    /// Multiplier applied to normalized elevation when emitting vertices
    pub height_factor: f64,

    /// How land is chosen before the flood fill
    pub mode: GenerationMode,

    /// Land regions for [`GenerationMode::MaskConstrained`]
    pub mask_regions: Vec<MaskRegion>,

    /// Island outline for [`GenerationMode::Random`]
    pub island_shape: IslandShape,

    /// Hydrology tuning constants
    pub hydrology: HydrologyOptions,

    /// Extra debug geometry to emit
    pub debug: DebugOptions,

    /// Vertex budget of a single merged mesh buffer
    pub max_batch_vertices: usize,
}

impl MapConfig {
    /// Get the map rectangle
    #[inline]
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    /// Number of river sources to sample
    #[inline]
    pub fn river_count(&self) -> usize {
        self.hydrology
            .river_count
            .unwrap_or((self.site_count / 20).max(1))
    }

    /// Reject configurations the pipeline cannot honour
    ///
    /// Called by [`MapConfigBuilder::build`] and again at the start of every
    /// generation, since the fields are public.
    pub fn validate(&self) -> Result<()> {
        if self.site_count < 3 {
            return Err(MapError::InvalidConfig(format!(
                "site count must be at least 3 (got {})",
                self.site_count
            )));
        }
        if !(self.width > 0.0 && self.width.is_finite())
            || !(self.height > 0.0 && self.height.is_finite())
        {
            return Err(MapError::InvalidConfig(format!(
                "bounds must be positive (got {}x{})",
                self.width, self.height
            )));
        }
        if self.relaxation_iterations > MAX_RELAXATION_ITERATIONS as usize {
            return Err(MapError::InvalidConfig(format!(
                "relaxation iterations must be <= {} (got {})",
                MAX_RELAXATION_ITERATIONS, self.relaxation_iterations
            )));
        }
        if !(self.height_factor >= 0.0 && self.height_factor.is_finite()) {
            return Err(MapError::InvalidConfig(format!(
                "height factor must be finite and >= 0 (got {})",
                self.height_factor
            )));
        }
        if self.mode == GenerationMode::MaskConstrained && self.mask_regions.is_empty() {
            return Err(MapError::InvalidConfig(
                "mask-constrained generation needs at least one mask region".into(),
            ));
        }
        if let Some(region) = self
            .mask_regions
            .iter()
            .find(|r| !(r.radius > 0.0 && r.radius.is_finite()))
        {
            return Err(MapError::InvalidConfig(format!(
                "mask region radius must be positive (got {})",
                region.radius
            )));
        }
        if self.max_batch_vertices < 3 {
            return Err(MapError::InvalidConfig(format!(
                "max batch vertices must be at least 3 (got {})",
                self.max_batch_vertices
            )));
        }
        self.hydrology.validate()
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            terrain_seed: 0,
            site_count: 2000,
            width: 600.0,
            height: 600.0,
            relaxation_iterations: 2,
            height_factor: 50.0,
            mode: GenerationMode::Random,
            mask_regions: Vec::new(),
            island_shape: IslandShape::Perlin,
            hydrology: HydrologyOptions::default(),
            debug: DebugOptions::default(),
            max_batch_vertices: 65_536,
        }
    }
}

/// Builder for creating MapConfig with validation
///
/// # Example
///
/// ```rust
/// use voronoi_terrain::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(12345)
///     .site_count(1000)
///     .bounds(400.0, 300.0)
///     .unwrap()
///     .relaxation_iterations(3)
///     .unwrap()
///     .terrain_seed(67890)
///     .build()
///     .unwrap();
/// assert_eq!(config.site_count, 1000);
/// ```
#[derive(Debug, Clone)]
pub struct MapConfigBuilder {
    seed: Option<u64>,
    terrain_seed: Option<u64>,
    config: MapConfig,
}

impl MapConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - seed: Random (drawn once when the config is built)
    /// - site_count: 2000
    /// - bounds: 600 x 600
    /// - relaxation_iterations: 2
    /// - height_factor: 50
    /// - mode: Random with a Perlin island
    /// - terrain_seed: Same as seed
    pub fn new() -> Self {
        Self {
            seed: None,
            terrain_seed: None,
            config: MapConfig::default(),
        }
    }

    /// Set the random seed for site placement and rivers
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set a separate seed for the island shape
    pub fn terrain_seed(mut self, seed: u64) -> Self {
        self.terrain_seed = Some(seed);
        self
    }

    /// Set the number of sites (polygons)
    pub fn site_count(mut self, count: usize) -> Self {
        self.config.site_count = count;
        self
    }

    /// Set the map size
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is not a positive number
    pub fn bounds(mut self, width: f64, height: f64) -> Result<Self> {
        if !(width > 0.0 && width.is_finite()) || !(height > 0.0 && height.is_finite()) {
            return Err(MapError::InvalidConfig(format!(
                "bounds must be positive (got {}x{})",
                width, height
            )));
        }
        self.config.width = width;
        self.config.height = height;
        Ok(self)
    }

    /// Set the number of Lloyd relaxation rounds
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if iterations is negative or > 20
    pub fn relaxation_iterations(mut self, iterations: i64) -> Result<Self> {
        if !(0..=MAX_RELAXATION_ITERATIONS).contains(&iterations) {
            return Err(MapError::InvalidConfig(format!(
                "relaxation iterations must be in 0..={} (got {})",
                MAX_RELAXATION_ITERATIONS, iterations
            )));
        }
        self.config.relaxation_iterations = iterations as usize;
        Ok(self)
    }

    /// Set the vertical scale applied to normalized elevation
    pub fn height_factor(mut self, factor: f64) -> Self {
        self.config.height_factor = factor;
        self
    }

    /// Use random island generation with the given outline
    pub fn island_shape(mut self, shape: IslandShape) -> Self {
        self.config.mode = GenerationMode::Random;
        self.config.island_shape = shape;
        self
    }

    /// Add a land region and switch to mask-constrained generation
    pub fn mask_region(mut self, region: MaskRegion) -> Self {
        self.config.mode = GenerationMode::MaskConstrained;
        self.config.mask_regions.push(region);
        self
    }

    /// Set the generation mode explicitly
    pub fn mode(mut self, mode: GenerationMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn hydrology(mut self, options: HydrologyOptions) -> Self {
        self.config.hydrology = options;
        self
    }

    pub fn debug(mut self, options: DebugOptions) -> Self {
        self.config.debug = options;
        self
    }

    pub fn max_batch_vertices(mut self, vertices: usize) -> Self {
        self.config.max_batch_vertices = vertices;
        self
    }

    /// Build and validate the configuration
    ///
    /// If no seed was provided, a random seed is generated here so that the
    /// resulting config always reproduces the same map.
    pub fn build(self) -> Result<MapConfig> {
        let seed = self.seed.unwrap_or_else(rand::random);
        let terrain_seed = self.terrain_seed.unwrap_or(seed);

        let config = MapConfig {
            seed,
            terrain_seed,
            ..self.config
        };
        config.validate()?;
        Ok(config)
    }
}

impl Default for MapConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
