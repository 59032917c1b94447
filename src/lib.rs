//! Voronoi polygon-graph terrain generation
//!
//! A standalone library that turns a seeded set of sites into an island map:
//! a relaxed Voronoi/Delaunay polygon graph with ocean, lakes, elevation,
//! rivers, moisture and biomes, plus engine-agnostic mesh buffers.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use voronoi_terrain::*;
//!
//! // Generate a map
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .site_count(2000)
//!     .bounds(600.0, 600.0).unwrap()
//!     .relaxation_iterations(2).unwrap()
//!     .build().unwrap();
//!
//! let map = TerrainMap::generate(config).unwrap();
//!
//! // Mesh buffers are grouped by biome material
//! for mesh in map.meshes() {
//!     println!("{}: {} triangles", mesh.material.name, mesh.triangle_count());
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. [`generation`]: seeded sites, external Voronoi source, Lloyd relaxation
//! 2. [`graph`]: center/corner/edge arena built from the raw diagram
//! 3. [`terrain`] + [`hydrology`]: water mask, ocean flood fill, elevation,
//!    rivers, moisture
//! 4. [`biome`]: decision-table classification
//! 5. [`mesh`]: triangulation and material batching
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) point-to-center lookups using KD-tree
//! - `serde`: Enables serialization support for configuration and the graph

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod generation;
pub mod graph;
pub mod terrain;
pub mod hydrology;
pub mod biome;
pub mod mesh;
pub mod map;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{MapError, Result};
pub use config::{
    DebugOptions, GenerationMode, HydrologyOptions, IslandShape, MapConfig, MapConfigBuilder,
    MaskRegion,
};
pub use geometry::Bounds;
pub use graph::{Center, Corner, Edge, Graph, PolygonVertex};
pub use terrain::{PerlinIsland, RadialIsland, RegionMask, WaterMask};
pub use hydrology::HydrologyReport;
pub use biome::{classify, Biome};
pub use mesh::{
    emit_mesh, triangulate_center, BiomeMaterials, BiomePalette, CenterColors, DebugGeometry,
    Material, MaterialMapper, MeshBuffer, MeshOptions,
};
pub use map::{MapSummary, TerrainMap};

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam vector types for convenience
pub use glam::{DVec2, Vec3};
