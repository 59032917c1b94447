//! Raw planar subdivisions and the Voronoi source that produces them
//!
//! A [`DiagramSource`] turns a set of sites into a [`RawDiagram`]: the sites,
//! one [`RawEdge`] per Delaunay edge paired with its (clipped) Voronoi
//! segment, and the Delaunay triangles. The graph builder consumes this
//! without caring how it was computed.

use std::collections::BTreeSet;

use glam::DVec2;
use voronoice::{BoundingBox, Point, VoronoiBuilder};

use crate::error::{MapError, Result};
use crate::geometry::Bounds;

/// One Delaunay edge and its Voronoi dual
#[derive(Debug, Clone, PartialEq)]
pub struct RawEdge {
    /// First site index
    pub d0: usize,
    /// Second site index
    pub d1: usize,
    /// First Voronoi vertex, if the segment survives clipping
    pub v0: Option<DVec2>,
    /// Second Voronoi vertex, if the segment survives clipping
    pub v1: Option<DVec2>,
    /// Edge lies on the map outline
    pub border: bool,
}

/// Planar subdivision as reported by a [`DiagramSource`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawDiagram {
    pub sites: Vec<DVec2>,
    pub edges: Vec<RawEdge>,
    pub triangles: Vec<[usize; 3]>,
}

/// Anything that can build a bounded Voronoi/Delaunay subdivision
///
/// Implementations must be deterministic: identical sites and bounds always
/// give an identical diagram. Site `i` of the input is site `i` of the output.
pub trait DiagramSource {
    fn generate(&self, sites: &[DVec2], bounds: Bounds) -> Result<RawDiagram>;
}

/// [`DiagramSource`] backed by the `voronoice` crate
///
/// Cells are clipped to the map rectangle. Each Delaunay edge gets the two
/// vertices its cells share; edges whose cells share fewer than two vertices
/// after clipping are reported as border edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoronoiceSource {
    tolerance: Option<f64>,
}

impl VoronoiceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the distance under which two cell vertices count as shared
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        if tolerance > 0.0 {
            self.tolerance = Some(tolerance);
        }
        self
    }
}

impl DiagramSource for VoronoiceSource {
    fn generate(&self, sites: &[DVec2], bounds: Bounds) -> Result<RawDiagram> {
        let tolerance = self.tolerance.unwrap_or_else(|| bounds.tolerance());

        // voronoice works on a box centered at the origin
        let offset = bounds.center();
        let points: Vec<Point> = sites
            .iter()
            .map(|p| Point {
                x: p.x - offset.x,
                y: p.y - offset.y,
            })
            .collect();

        let voronoi = VoronoiBuilder::default()
            .set_sites(points)
            .set_bounding_box(BoundingBox::new_centered(bounds.width, bounds.height))
            .build()
            .ok_or_else(|| {
                MapError::DiagramFailed(format!(
                    "voronoice could not build a diagram for {} sites",
                    sites.len()
                ))
            })?;

        if voronoi.sites().len() != sites.len() {
            return Err(MapError::DegenerateDiagram {
                expected: sites.len(),
                actual: voronoi.sites().len(),
            });
        }

        let cells: Vec<Vec<DVec2>> = voronoi
            .iter_cells()
            .map(|cell| {
                cell.iter_vertices()
                    .map(|p| DVec2::new(p.x + offset.x, p.y + offset.y))
                    .collect()
            })
            .collect();

        let triangles: Vec<[usize; 3]> = voronoi
            .triangulation()
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        let mut pairs = BTreeSet::new();
        for t in &triangles {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                if a != b {
                    pairs.insert((a.min(b), a.max(b)));
                }
            }
        }

        let edges = pairs
            .into_iter()
            .map(|(d0, d1)| {
                let (v0, v1) = shared_segment(&cells[d0], &cells[d1], tolerance);
                RawEdge {
                    d0,
                    d1,
                    v0,
                    v1,
                    border: v1.is_none(),
                }
            })
            .collect();

        Ok(RawDiagram {
            sites: sites.to_vec(),
            edges,
            triangles,
        })
    }
}

/// Vertices two clipped cells have in common
///
/// When more than two vertices coincide (collinear clipping artefacts) the
/// two farthest apart span the shared segment.
fn shared_segment(a: &[DVec2], b: &[DVec2], tolerance: f64) -> (Option<DVec2>, Option<DVec2>) {
    let mut shared: Vec<DVec2> = Vec::new();
    for &p in a {
        let in_b = b.iter().any(|q| q.distance(p) <= tolerance);
        let seen = shared.iter().any(|q| q.distance(p) <= tolerance);
        if in_b && !seen {
            shared.push(p);
        }
    }

    match shared.len() {
        0 => (None, None),
        1 => (Some(shared[0]), None),
        _ => {
            let mut best = (shared[0], shared[1]);
            let mut best_distance = best.0.distance_squared(best.1);
            for (i, &p) in shared.iter().enumerate() {
                for &q in &shared[i + 1..] {
                    let d = p.distance_squared(q);
                    if d > best_distance {
                        best = (p, q);
                        best_distance = d;
                    }
                }
            }
            (Some(best.0), Some(best.1))
        }
    }
}
