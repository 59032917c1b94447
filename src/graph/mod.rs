//! Polygon Graph
//!
//! The dual graph of a clipped Voronoi diagram, stored as three arenas:
//!
//! - [`Center`]: one per polygon (Voronoi site / Delaunay vertex)
//! - [`Corner`]: one per polygon vertex (Voronoi vertex)
//! - [`Edge`]: one per Delaunay edge, paired with its Voronoi edge
//!
//! All relations are plain indices into those arenas. The graph is built
//! once per generation by [`GraphBuilder`](builder::GraphBuilder), mutated in
//! place by the hydrology and biome passes, and read-only afterwards.

pub mod builder;

#[cfg(test)]
pub(crate) mod fixtures;

use std::collections::BTreeMap;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::biome::Biome;
use crate::error::{MapError, Result};
use crate::geometry::{signed_triangle_area, triangle_area, Bounds};

/// A polygon of the subdivision
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Center {
    /// Position in the arena (0 to center_count-1)
    pub index: usize,

    /// Site position
    pub point: DVec2,

    pub water: bool,
    pub ocean: bool,
    pub coast: bool,

    /// Touches the map outline
    pub border: bool,

    /// Mean of the touching corners' elevation, in [0, 1]
    pub elevation: f64,

    /// Mean of the touching corners' moisture, in [0, 1]
    pub moisture: f64,

    /// Set by [`assign_biomes`](crate::biome::assign_biomes)
    pub biome: Option<Biome>,

    /// Polygon area (including border closure)
    pub area: f64,

    /// Adjacent centers, sorted ascending
    pub neighbors: Vec<usize>,

    /// Bounding edges, sorted ascending
    pub borders: Vec<usize>,

    /// Polygon vertices, sorted ascending
    pub corners: Vec<usize>,
}

impl Center {
    pub(crate) fn new(index: usize, point: DVec2) -> Self {
        Self {
            index,
            point,
            water: false,
            ocean: false,
            coast: false,
            border: false,
            elevation: 0.0,
            moisture: 0.0,
            biome: None,
            area: 0.0,
            neighbors: Vec::new(),
            borders: Vec::new(),
            corners: Vec::new(),
        }
    }

    #[inline]
    pub fn is_neighbor_of(&self, other: usize) -> bool {
        self.neighbors.binary_search(&other).is_ok()
    }
}

/// A polygon vertex shared by the polygons meeting there
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Corner {
    pub index: usize,
    pub point: DVec2,

    pub water: bool,
    pub ocean: bool,
    pub coast: bool,

    /// Lies on the map outline
    pub border: bool,

    pub elevation: f64,
    pub moisture: f64,

    /// Neighbouring corner water flows to; `None` for sinks
    pub downslope: Option<usize>,

    /// Number of river walks that left this corner
    pub river: u32,

    /// Centers this corner belongs to, sorted ascending
    pub touches: Vec<usize>,

    /// Corners joined to this one by a Voronoi edge, sorted ascending
    pub adjacent: Vec<usize>,

    /// Incident edges, sorted ascending
    pub protrudes: Vec<usize>,
}

impl Corner {
    pub(crate) fn new(index: usize, point: DVec2) -> Self {
        Self {
            index,
            point,
            water: false,
            ocean: false,
            coast: false,
            border: false,
            elevation: 0.0,
            moisture: 0.0,
            downslope: None,
            river: 0,
            touches: Vec::new(),
            adjacent: Vec::new(),
            protrudes: Vec::new(),
        }
    }
}

/// A Delaunay edge between two centers and, when interior, the Voronoi edge
/// between two corners
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub index: usize,
    pub d0: usize,
    pub d1: usize,
    pub v0: Option<usize>,
    pub v1: Option<usize>,

    /// Lies on the map outline (fewer than two corners)
    pub border: bool,

    /// River strength along the Voronoi edge
    pub river: u32,
}

impl Edge {
    /// Both corners, when the Voronoi edge is fully defined
    #[inline]
    pub fn corners(&self) -> Option<(usize, usize)> {
        match (self.v0, self.v1) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    /// The center on the other side of this edge
    #[inline]
    pub fn other_center(&self, center: usize) -> usize {
        if self.d0 == center {
            self.d1
        } else {
            self.d0
        }
    }
}

/// A vertex of a polygon triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PolygonVertex {
    /// The polygon's own site
    Center(usize),
    /// A graph corner
    Corner(usize),
    /// A corner of the map rectangle inserted to close a border polygon
    BoundsCorner(DVec2),
}

/// Finished polygon graph
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub(crate) bounds: Bounds,
    pub(crate) tolerance: f64,
    pub(crate) centers: Vec<Center>,
    pub(crate) corners: Vec<Corner>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) triangles: Vec<[usize; 3]>,
}

impl Graph {
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Positional tolerance used for corner deduplication and border tests
    #[inline]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[inline]
    pub fn centers(&self) -> &[Center] {
        &self.centers
    }

    #[inline]
    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Delaunay triangles as center index triples
    #[inline]
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    #[inline]
    pub fn center(&self, index: usize) -> Option<&Center> {
        self.centers.get(index)
    }

    #[inline]
    pub fn corner(&self, index: usize) -> Option<&Corner> {
        self.corners.get(index)
    }

    #[inline]
    pub fn edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// Find the edge whose Voronoi segment joins two corners
    pub fn edge_between(&self, a: usize, b: usize) -> Option<&Edge> {
        let corner = self.corners.get(a)?;
        corner
            .protrudes
            .iter()
            .map(|&e| &self.edges[e])
            .find(|edge| matches!(edge.corners(), Some((x, y)) if (x == a && y == b) || (x == b && y == a)))
    }

    /// Resolve a polygon vertex to its planar position
    pub fn position(&self, vertex: PolygonVertex) -> DVec2 {
        match vertex {
            PolygonVertex::Center(i) => self.centers[i].point,
            PolygonVertex::Corner(i) => self.corners[i].point,
            PolygonVertex::BoundsCorner(p) => p,
        }
    }

    /// Triangulate a center's polygon
    ///
    /// Emits one fan triangle `(center, v0, v1)` per bounding edge with two
    /// corners. Border polygons are then closed along the map outline: walking
    /// the boundary counter-clockwise around the site, every border corner
    /// where the boundary runs out is joined to the next corner where it
    /// resumes, through every rectangle corner passed on the way.
    ///
    /// Returns an empty list for an unknown center.
    pub fn polygon_triangles(&self, center: usize) -> Vec<[PolygonVertex; 3]> {
        let Some(c) = self.centers.get(center) else {
            return Vec::new();
        };

        let mut triangles = Vec::with_capacity(c.borders.len() + 4);
        // corner -> (boundary arrives, boundary leaves), counter-clockwise
        let mut flow: BTreeMap<usize, (usize, usize)> = BTreeMap::new();

        for &e in &c.borders {
            if let Some((v0, v1)) = self.edges[e].corners() {
                triangles.push([
                    PolygonVertex::Center(center),
                    PolygonVertex::Corner(v0),
                    PolygonVertex::Corner(v1),
                ]);
                let (p0, p1) = (self.corners[v0].point, self.corners[v1].point);
                let (from, to) = if signed_triangle_area(c.point, p0, p1) >= 0.0 {
                    (v0, v1)
                } else {
                    (v1, v0)
                };
                flow.entry(from).or_default().1 += 1;
                flow.entry(to).or_default().0 += 1;
            }
        }

        if !c.border {
            return triangles;
        }

        let mut exits = Vec::new();
        let mut entries = Vec::new();
        for (&corner, &(arrives, leaves)) in &flow {
            if !self.corners[corner].border {
                continue;
            }
            match (arrives, leaves) {
                (1, 0) => exits.push(corner),
                (0, 1) => entries.push(corner),
                _ => {}
            }
        }

        for exit in exits {
            let from = self.corners[exit].point;
            let Some(slot) = (0..entries.len()).min_by(|&a, &b| {
                let da = self.bounds.outline_distance(from, self.corners[entries[a]].point);
                let db = self.bounds.outline_distance(from, self.corners[entries[b]].point);
                da.total_cmp(&db)
            }) else {
                break;
            };
            let entry = entries.swap_remove(slot);

            let mut chain = vec![PolygonVertex::Corner(exit)];
            chain.extend(
                self.bounds
                    .corners_between(from, self.corners[entry].point, self.tolerance)
                    .into_iter()
                    .map(PolygonVertex::BoundsCorner),
            );
            chain.push(PolygonVertex::Corner(entry));

            for pair in chain.windows(2) {
                triangles.push([PolygonVertex::Center(center), pair[0], pair[1]]);
            }
        }

        triangles
    }

    /// Area and area-weighted centroid of a center's polygon
    ///
    /// Returns `None` when the polygon has no triangles or zero area.
    pub fn polygon_centroid(&self, center: usize) -> Option<(f64, DVec2)> {
        let mut area = 0.0;
        let mut weighted = DVec2::ZERO;
        for [a, b, c] in self.polygon_triangles(center) {
            let (a, b, c) = (self.position(a), self.position(b), self.position(c));
            let t = triangle_area(a, b, c);
            area += t;
            weighted += (a + b + c) / 3.0 * t;
        }
        (area > 0.0).then(|| (area, weighted / area))
    }

    /// Check the structural invariants of the graph
    ///
    /// - index fields match arena positions and all references are in range
    /// - center and corner adjacency is symmetric
    /// - an edge with fewer than two corners is flagged border
    pub fn validate(&self) -> Result<()> {
        let nc = self.centers.len();
        let nq = self.corners.len();
        let ne = self.edges.len();

        for (i, c) in self.centers.iter().enumerate() {
            if c.index != i {
                return Err(MapError::InvariantViolation(format!(
                    "center {} stored at position {}",
                    c.index, i
                )));
            }
            for &n in &c.neighbors {
                let other = self.centers.get(n).ok_or_else(|| {
                    MapError::InvariantViolation(format!("center {} has unknown neighbor {}", i, n))
                })?;
                if !other.is_neighbor_of(i) {
                    return Err(MapError::InvariantViolation(format!(
                        "center adjacency {} -> {} is not symmetric",
                        i, n
                    )));
                }
            }
            if c.borders.iter().any(|&e| e >= ne) || c.corners.iter().any(|&q| q >= nq) {
                return Err(MapError::InvariantViolation(format!(
                    "center {} references an unknown edge or corner",
                    i
                )));
            }
        }

        for (i, q) in self.corners.iter().enumerate() {
            if q.index != i {
                return Err(MapError::InvariantViolation(format!(
                    "corner {} stored at position {}",
                    q.index, i
                )));
            }
            for &n in &q.adjacent {
                let other = self.corners.get(n).ok_or_else(|| {
                    MapError::InvariantViolation(format!("corner {} has unknown neighbor {}", i, n))
                })?;
                if other.adjacent.binary_search(&i).is_err() {
                    return Err(MapError::InvariantViolation(format!(
                        "corner adjacency {} -> {} is not symmetric",
                        i, n
                    )));
                }
            }
            if q.touches.iter().any(|&c| c >= nc) || q.protrudes.iter().any(|&e| e >= ne) {
                return Err(MapError::InvariantViolation(format!(
                    "corner {} references an unknown center or edge",
                    i
                )));
            }
            if q.downslope.is_some_and(|d| d >= nq) {
                return Err(MapError::InvariantViolation(format!(
                    "corner {} has an out-of-range downslope",
                    i
                )));
            }
        }

        for (i, e) in self.edges.iter().enumerate() {
            if e.index != i || e.d0 >= nc || e.d1 >= nc {
                return Err(MapError::InvariantViolation(format!(
                    "edge {} has inconsistent indices",
                    i
                )));
            }
            if [e.v0, e.v1].iter().flatten().any(|&q| q >= nq) {
                return Err(MapError::InvariantViolation(format!(
                    "edge {} references an unknown corner",
                    i
                )));
            }
            if e.corners().is_none() && !e.border {
                return Err(MapError::InvariantViolation(format!(
                    "edge {} has fewer than two corners but is not flagged border",
                    i
                )));
            }
        }

        Ok(())
    }
}
