//! TerrainMap: the full generation pipeline and its result

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::biome::{assign_biomes, Biome};
use crate::config::MapConfig;
use crate::error::{MapError, Result};
use crate::generation::{generate_graph, DiagramSource, VoronoiceSource};
use crate::graph::{Center, Graph};
use crate::hydrology::{simulate, HydrologyReport};
use crate::mesh::{emit_mesh, BiomeMaterials, DebugGeometry, MaterialMapper, MeshBuffer, MeshOptions};
use crate::terrain::{mask_for, WaterMask};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;
#[cfg(feature = "spatial-index")]
use glam::DVec2;

/// Aggregate counts over a finished map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapSummary {
    pub ocean_centers: usize,
    pub lake_centers: usize,
    pub land_centers: usize,
    pub coast_centers: usize,
    /// Edges carrying at least one river
    pub river_edges: usize,
    /// Number of centers per biome (biomes that never occur are absent)
    pub biomes: BTreeMap<Biome, usize>,
}

/// A generated terrain map
///
/// Owns the finished polygon graph (flags, elevation, moisture and biome on
/// every center and corner) together with the emitted mesh buffers. Each call
/// to [`TerrainMap::generate`] builds an independent map from its config.
///
/// # Examples
///
/// ```
/// use voronoi_terrain::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .site_count(200)
///     .bounds(100.0, 100.0)
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let map = TerrainMap::generate(config).unwrap();
/// assert_eq!(map.center_count(), 200);
///
/// let summary = map.summary();
/// println!("{} ocean, {} land centers", summary.ocean_centers, summary.land_centers);
/// ```
#[derive(Clone)]
pub struct TerrainMap {
    config: MapConfig,
    graph: Graph,
    meshes: Vec<MeshBuffer>,
    debug: DebugGeometry,
    hydrology: HydrologyReport,

    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl TerrainMap {
    /// Generate a map with the default stack
    ///
    /// Uses the `voronoice` diagram source, the water mask the config asks
    /// for (island shape or mask regions) and the default biome palette.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` before any work is done, or the first diagram or
    /// invariant error a stage reports. No partial map is returned.
    pub fn generate(config: MapConfig) -> Result<Self> {
        let mask = mask_for(&config);
        Self::generate_with(config, &VoronoiceSource::new(), &*mask, &BiomeMaterials)
    }

    /// Generate a map with a custom diagram source, water mask and materials
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_terrain::*;
    /// use voronoi_terrain::generation::VoronoiceSource;
    /// use voronoi_terrain::mesh::CenterColors;
    ///
    /// let config = MapConfigBuilder::new()
    ///     .seed(7)
    ///     .site_count(100)
    ///     .bounds(100.0, 100.0)
    ///     .unwrap()
    ///     .build()
    ///     .unwrap();
    ///
    /// // Everything left of the middle starts out as water
    /// let mask = |p: DVec2, b: Bounds| p.x < b.width / 2.0;
    /// let colors = CenterColors(|c: &Center| [c.elevation as f32, c.moisture as f32, 0.0, 1.0]);
    ///
    /// let map = TerrainMap::generate_with(config, &VoronoiceSource::new(), &mask, &colors).unwrap();
    /// assert!(!map.meshes().is_empty());
    /// ```
    pub fn generate_with<S, W, M>(config: MapConfig, source: &S, mask: &W, mapper: &M) -> Result<Self>
    where
        S: DiagramSource + ?Sized,
        W: WaterMask + ?Sized,
        M: MaterialMapper + ?Sized,
    {
        config.validate()?;
        let start = Instant::now();

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        // Step 1: Sites, diagram and relaxation
        let mut graph = generate_graph(&config, source, &mut rng)?;

        // Step 2: Water, elevation, rivers and moisture
        let hydrology = simulate(
            &mut graph,
            mask,
            &config.hydrology,
            config.river_count(),
            &mut rng,
        )?;

        // Step 3: Biomes
        assign_biomes(&mut graph);

        // Step 4: Render output
        let options = MeshOptions {
            height_factor: config.height_factor,
            max_batch_vertices: config.max_batch_vertices,
        };
        let meshes = emit_mesh(&graph, mapper, &options);
        let debug = DebugGeometry::collect(&graph, &config.debug, config.height_factor);

        #[cfg(feature = "spatial-index")]
        let spatial_index = {
            let sites: Vec<DVec2> = graph.centers().iter().map(|c| c.point).collect();
            SpatialIndex::new(&sites)
        };

        log::info!(
            "Generated map with {} centers, {} corners, {} mesh buffers in {:?}",
            graph.centers().len(),
            graph.corners().len(),
            meshes.len(),
            start.elapsed()
        );

        Ok(Self {
            config,
            graph,
            meshes,
            debug,
            hydrology,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    /// Get the configuration used to generate this map
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Get the finished polygon graph
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Mesh buffers, ordered by material name then creation order
    #[inline]
    pub fn meshes(&self) -> &[MeshBuffer] {
        &self.meshes
    }

    /// Debug geometry (empty unless toggled in the config)
    #[inline]
    pub fn debug_geometry(&self) -> &DebugGeometry {
        &self.debug
    }

    /// Counts reported by the hydrology passes
    #[inline]
    pub fn hydrology(&self) -> &HydrologyReport {
        &self.hydrology
    }

    #[inline]
    pub fn center_count(&self) -> usize {
        self.graph.centers().len()
    }

    /// Get a center by ID
    ///
    /// # Errors
    ///
    /// `CenterNotFound` if the ID is out of range.
    pub fn center(&self, id: usize) -> Result<&Center> {
        self.graph.center(id).ok_or(MapError::CenterNotFound(id))
    }

    /// Neighbor IDs of a center (empty for an invalid ID)
    pub fn neighbors(&self, id: usize) -> &[usize] {
        self.graph
            .center(id)
            .map(|c| c.neighbors.as_slice())
            .unwrap_or(&[])
    }

    /// Find centers within a given hop count of a center (BFS)
    ///
    /// Includes the start center; 0 hops returns just the start. The result
    /// is sorted by ID and empty for an invalid ID.
    pub fn find_centers_within_hops(&self, id: usize, hops: usize) -> Vec<usize> {
        if id >= self.center_count() {
            return vec![];
        }

        let mut visited = BTreeSet::new();
        let mut current = vec![id];
        visited.insert(id);

        for _ in 0..hops {
            let mut next = Vec::new();
            for &c in &current {
                for &neighbor in self.neighbors(c) {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            current = next;
        }

        visited.into_iter().collect()
    }

    /// Find the center whose polygon contains a point (requires spatial-index feature)
    ///
    /// Nearest-site lookup in a KD-tree, so points outside the map resolve to
    /// the closest border polygon.
    #[cfg(feature = "spatial-index")]
    pub fn find_center_at(&self, point: DVec2) -> Option<usize> {
        self.spatial_index.find_nearest(point)
    }

    /// Count centers by water state and biome
    pub fn summary(&self) -> MapSummary {
        let mut summary = MapSummary::default();
        for center in self.graph.centers() {
            if center.ocean {
                summary.ocean_centers += 1;
            } else if center.water {
                summary.lake_centers += 1;
            } else {
                summary.land_centers += 1;
            }
            if center.coast {
                summary.coast_centers += 1;
            }
            if let Some(biome) = center.biome {
                *summary.biomes.entry(biome).or_default() += 1;
            }
        }
        summary.river_edges = self.graph.edges().iter().filter(|e| e.river > 0).count();
        summary
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::config::{DebugOptions, IslandShape, MapConfigBuilder, MaskRegion};
    use crate::geometry::Bounds;
    use crate::hydrology::verify_downslopes;

    fn small_config(seed: u64) -> MapConfig {
        MapConfigBuilder::new()
            .seed(seed)
            .site_count(100)
            .bounds(100.0, 100.0)
            .unwrap()
            .relaxation_iterations(2)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_end_to_end_small_map() {
        let map = TerrainMap::generate(small_config(42)).unwrap();
        let graph = map.graph();

        assert_eq!(graph.centers().len(), 100);
        for c in graph.centers().iter().filter(|c| !c.border) {
            assert!(c.neighbors.len() >= 3, "center {} has {} neighbors", c.index, c.neighbors.len());
        }

        let area: f64 = graph.centers().iter().map(|c| c.area).sum();
        assert!((area - 10_000.0).abs() < 500.0, "total area {}", area);

        graph.validate().unwrap();
        verify_downslopes(graph).unwrap();

        // Every ocean center is reached from the border through water only
        let mut reached = vec![false; graph.centers().len()];
        let mut queue: VecDeque<usize> = graph
            .centers()
            .iter()
            .filter(|c| c.border && c.water)
            .map(|c| c.index)
            .collect();
        for &i in &queue {
            reached[i] = true;
        }
        while let Some(i) = queue.pop_front() {
            for &n in &graph.centers()[i].neighbors {
                if !reached[n] && graph.centers()[n].water {
                    reached[n] = true;
                    queue.push_back(n);
                }
            }
        }
        for c in graph.centers().iter().filter(|c| c.ocean) {
            assert!(reached[c.index], "ocean center {} is cut off from the border", c.index);
        }
    }

    #[test]
    fn test_few_sites_cover_map() {
        for site_count in [3, 4] {
            for seed in 0..8 {
                let mut config = small_config(seed);
                config.site_count = site_count;
                config.relaxation_iterations = 1;
                let map = TerrainMap::generate(config).unwrap();
                let area: f64 = map.graph().centers().iter().map(|c| c.area).sum();
                assert!(
                    (area - 10_000.0).abs() < 1e-6 * 10_000.0,
                    "{} sites, seed {}: total area {}",
                    site_count,
                    seed,
                    area
                );
            }
        }
    }

    #[test]
    fn test_same_seed_same_map() {
        let a = TerrainMap::generate(small_config(42)).unwrap();
        let b = TerrainMap::generate(small_config(42)).unwrap();
        assert_eq!(a.graph(), b.graph());
        assert_eq!(a.meshes(), b.meshes());
    }

    #[test]
    fn test_different_seed_different_map() {
        let a = TerrainMap::generate(small_config(1)).unwrap();
        let b = TerrainMap::generate(small_config(2)).unwrap();
        assert_ne!(a.graph(), b.graph());
    }

    #[test]
    fn test_every_center_is_classified() {
        let map = TerrainMap::generate(small_config(42)).unwrap();
        for c in map.graph().centers() {
            let biome = c.biome.unwrap();
            assert_eq!(biome == Biome::Ocean, c.ocean);
            assert!((0.0..=1.0).contains(&c.elevation));
            assert!((0.0..=1.0).contains(&c.moisture));
        }
    }

    #[test]
    fn test_border_centers_are_ocean() {
        let map = TerrainMap::generate(small_config(3)).unwrap();
        for c in map.graph().centers().iter().filter(|c| c.border) {
            assert!(c.ocean);
        }
    }

    #[test]
    fn test_summary_counts() {
        let map = TerrainMap::generate(small_config(42)).unwrap();
        let summary = map.summary();
        assert_eq!(
            summary.ocean_centers + summary.lake_centers + summary.land_centers,
            map.center_count()
        );
        assert_eq!(summary.biomes.values().sum::<usize>(), map.center_count());
        assert_eq!(summary.ocean_centers, map.hydrology().ocean_centers);
        assert_eq!(summary.biomes.get(&Biome::Ocean).copied().unwrap_or(0), summary.ocean_centers);
    }

    #[test]
    fn test_mesh_covers_every_polygon() {
        let map = TerrainMap::generate(small_config(42)).unwrap();
        let graph = map.graph();
        let expected: usize = graph
            .centers()
            .iter()
            .map(|c| graph.polygon_triangles(c.index).len())
            .sum();
        let emitted: usize = map.meshes().iter().map(|m| m.triangle_count()).sum();
        assert_eq!(emitted, expected);
    }

    #[test]
    fn test_mask_constrained_mode() {
        let config = MapConfigBuilder::new()
            .seed(9)
            .site_count(200)
            .bounds(100.0, 100.0)
            .unwrap()
            .mask_region(MaskRegion::new(glam::DVec2::new(50.0, 50.0), 25.0))
            .build()
            .unwrap();
        let map = TerrainMap::generate(config).unwrap();

        for c in map.graph().centers() {
            if c.point.distance(glam::DVec2::new(50.0, 50.0)) > 25.0 {
                assert!(c.water, "center {} outside the region is land", c.index);
            }
        }
        assert!(map.summary().land_centers > 0);
    }

    #[test]
    fn test_radial_island_shape() {
        let mut config = small_config(11);
        config.island_shape = IslandShape::Radial;
        let map = TerrainMap::generate(config).unwrap();
        assert_eq!(map.center_count(), 100);
    }

    #[test]
    fn test_generate_with_custom_mask() {
        let mask = |p: glam::DVec2, b: Bounds| p.x > b.width * 0.75;
        let map = TerrainMap::generate_with(
            small_config(5),
            &VoronoiceSource::new(),
            &mask,
            &BiomeMaterials,
        )
        .unwrap();
        assert!(map.summary().land_centers > 0);
        for c in map.graph().centers().iter().filter(|c| c.point.x > 80.0) {
            assert!(c.water);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MapConfig {
            site_count: 0,
            ..MapConfig::default()
        };
        assert!(matches!(
            TerrainMap::generate(config),
            Err(MapError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_center_lookup() {
        let map = TerrainMap::generate(small_config(42)).unwrap();
        assert!(map.center(0).is_ok());
        assert_eq!(map.center(100).unwrap_err(), MapError::CenterNotFound(100));
        assert!(map.neighbors(100).is_empty());
    }

    #[test]
    fn test_find_centers_within_hops() {
        let map = TerrainMap::generate(small_config(42)).unwrap();

        assert_eq!(map.find_centers_within_hops(0, 0), vec![0]);

        let one = map.find_centers_within_hops(0, 1);
        assert_eq!(one.len(), 1 + map.neighbors(0).len());

        let two = map.find_centers_within_hops(0, 2);
        assert!(two.len() > one.len());

        assert!(map.find_centers_within_hops(999, 3).is_empty());
    }

    #[test]
    fn test_debug_geometry_follows_toggles() {
        let mut config = small_config(42);
        config.debug = DebugOptions {
            sites: true,
            delaunay_edges: true,
            ..Default::default()
        };
        let map = TerrainMap::generate(config).unwrap();
        assert_eq!(map.debug_geometry().sites.len(), 100);
        assert_eq!(map.debug_geometry().delaunay_edges.len(), map.graph().edges().len());
        assert!(map.debug_geometry().corners.is_empty());

        let plain = TerrainMap::generate(small_config(42)).unwrap();
        assert!(plain.debug_geometry().is_empty());
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_find_center_at() {
        let map = TerrainMap::generate(small_config(42)).unwrap();
        for c in map.graph().centers().iter().take(10) {
            assert_eq!(map.find_center_at(c.point), Some(c.index));
        }
    }
}
