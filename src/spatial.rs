//! Spatial indexing for fast point-to-center lookups
//!
//! This module is only available with the `spatial-index` feature.

use glam::DVec2;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use kiddo::SquaredEuclidean;

/// Wrapper around a 2D KD-tree of center sites
///
/// The nearest site to a point is the center whose Voronoi polygon contains
/// it, so a nearest-neighbour query answers "which polygon was clicked".
#[derive(Clone)]
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f64, usize, 2, 32>>,
    len: usize,
}

impl SpatialIndex {
    /// Build the index from center sites
    ///
    /// # Example
    ///
    /// ```
    /// use voronoi_terrain::spatial::SpatialIndex;
    /// use voronoi_terrain::DVec2;
    ///
    /// let sites = vec![
    ///     DVec2::new(10.0, 10.0),
    ///     DVec2::new(90.0, 10.0),
    ///     DVec2::new(50.0, 90.0),
    /// ];
    ///
    /// let index = SpatialIndex::new(&sites);
    /// assert_eq!(index.find_nearest(DVec2::new(80.0, 20.0)), Some(1));
    /// ```
    pub fn new(sites: &[DVec2]) -> Self {
        let points: Vec<[f64; 2]> = sites.iter().map(|s| s.to_array()).collect();
        Self {
            tree: (!points.is_empty()).then(|| ImmutableKdTree::new_from_slice(&points)),
            len: points.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index of the site nearest to `point`, `None` for an empty index
    pub fn find_nearest(&self, point: DVec2) -> Option<usize> {
        let tree = self.tree.as_ref()?;
        Some(tree.nearest_one::<SquaredEuclidean>(&point.to_array()).item)
    }
}
