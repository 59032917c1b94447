//! Raw diagram to polygon graph conversion

use std::collections::{BTreeSet, HashMap};

use glam::DVec2;

use super::{Center, Corner, Edge, Graph};
use crate::error::{MapError, Result};
use crate::generation::diagram::RawDiagram;
use crate::geometry::Bounds;

/// Hash grid that merges corners closer than the tolerance
///
/// Independent edge queries may report the same Voronoi vertex at slightly
/// different coordinates; all of them must map to one [`Corner`].
struct CornerIndex {
    cell: f64,
    tolerance: f64,
    buckets: HashMap<(i64, i64), Vec<usize>>,
}

impl CornerIndex {
    fn new(tolerance: f64) -> Self {
        Self {
            cell: tolerance.max(f64::EPSILON),
            tolerance,
            buckets: HashMap::new(),
        }
    }

    #[inline]
    fn key(&self, point: DVec2) -> (i64, i64) {
        (
            (point.x / self.cell).floor() as i64,
            (point.y / self.cell).floor() as i64,
        )
    }

    /// Return the index of the corner at `point`, creating it if needed
    fn get_or_insert(&mut self, point: DVec2, corners: &mut Vec<Corner>) -> usize {
        let (kx, ky) = self.key(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(bucket) = self.buckets.get(&(kx + dx, ky + dy)) {
                    if let Some(&found) = bucket
                        .iter()
                        .find(|&&q| corners[q].point.distance(point) <= self.tolerance)
                    {
                        return found;
                    }
                }
            }
        }

        let index = corners.len();
        corners.push(Corner::new(index, point));
        self.buckets.entry((kx, ky)).or_default().push(index);
        index
    }
}

/// Insert into a sorted list unless already present
#[inline]
fn insert_sorted(list: &mut Vec<usize>, value: usize) {
    if let Err(pos) = list.binary_search(&value) {
        list.insert(pos, value);
    }
}

/// Builds a [`Graph`] from a [`RawDiagram`]
///
/// # Example
///
/// ```rust
/// use voronoi_terrain::generation::{DiagramSource, VoronoiceSource};
/// use voronoi_terrain::graph::builder::GraphBuilder;
/// use voronoi_terrain::{Bounds, DVec2};
///
/// let bounds = Bounds::new(10.0, 10.0);
/// let sites = vec![
///     DVec2::new(2.0, 2.0),
///     DVec2::new(8.0, 3.0),
///     DVec2::new(3.0, 8.0),
///     DVec2::new(7.0, 7.0),
/// ];
/// let diagram = VoronoiceSource::new().generate(&sites, bounds).unwrap();
/// let graph = GraphBuilder::new(bounds).build(&diagram).unwrap();
/// assert_eq!(graph.centers().len(), 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    bounds: Bounds,
    tolerance: f64,
}

impl GraphBuilder {
    /// Create a builder using the default tolerance for `bounds`
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            tolerance: bounds.tolerance(),
        }
    }

    /// Override the positional tolerance (ignored unless positive)
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        if tolerance > 0.0 && tolerance.is_finite() {
            self.tolerance = tolerance;
        }
        self
    }

    /// Convert a raw diagram into a graph
    ///
    /// # Errors
    ///
    /// - `MalformedDiagram` for out-of-range or self-referencing site indices,
    ///   duplicated Delaunay edges, and edges with a single corner that are not
    ///   flagged border
    /// - `DegenerateDiagram` if any site ends up without a polygon
    pub fn build(&self, diagram: &RawDiagram) -> Result<Graph> {
        let n = diagram.sites.len();

        let mut centers: Vec<Center> = diagram
            .sites
            .iter()
            .enumerate()
            .map(|(i, &p)| Center::new(i, p))
            .collect();
        let mut corners: Vec<Corner> = Vec::new();
        let mut edges: Vec<Edge> = Vec::with_capacity(diagram.edges.len());
        let mut index = CornerIndex::new(self.tolerance);
        let mut seen = BTreeSet::new();

        for (i, raw) in diagram.edges.iter().enumerate() {
            if raw.d0 >= n || raw.d1 >= n {
                return Err(MapError::MalformedDiagram(format!(
                    "edge {} references site {} but the diagram has {} sites",
                    i,
                    raw.d0.max(raw.d1),
                    n
                )));
            }
            if raw.d0 == raw.d1 {
                return Err(MapError::MalformedDiagram(format!(
                    "edge {} joins site {} to itself",
                    i, raw.d0
                )));
            }
            if !seen.insert((raw.d0.min(raw.d1), raw.d0.max(raw.d1))) {
                return Err(MapError::MalformedDiagram(format!(
                    "sites {} and {} are joined by more than one edge",
                    raw.d0, raw.d1
                )));
            }

            let defined = raw.v0.is_some() as u8 + raw.v1.is_some() as u8;
            if defined == 1 && !raw.border {
                return Err(MapError::MalformedDiagram(format!(
                    "edge {} between sites {} and {} has a single corner but is not flagged border",
                    i, raw.d0, raw.d1
                )));
            }

            let v0 = raw.v0.map(|p| index.get_or_insert(p, &mut corners));
            let v1 = raw.v1.map(|p| index.get_or_insert(p, &mut corners));

            let edge = Edge {
                index: i,
                d0: raw.d0,
                d1: raw.d1,
                v0,
                v1,
                border: raw.border || defined < 2,
                river: 0,
            };

            for d in [edge.d0, edge.d1] {
                let center = &mut centers[d];
                insert_sorted(&mut center.borders, i);
                for v in [v0, v1].into_iter().flatten() {
                    insert_sorted(&mut center.corners, v);
                }
            }
            insert_sorted(&mut centers[edge.d0].neighbors, edge.d1);
            insert_sorted(&mut centers[edge.d1].neighbors, edge.d0);

            for v in [v0, v1].into_iter().flatten() {
                let corner = &mut corners[v];
                insert_sorted(&mut corner.protrudes, i);
                insert_sorted(&mut corner.touches, edge.d0);
                insert_sorted(&mut corner.touches, edge.d1);
            }
            if let (Some(a), Some(b)) = (v0, v1) {
                // A zero-length segment keeps its corner but is not a self loop
                if a != b {
                    insert_sorted(&mut corners[a].adjacent, b);
                    insert_sorted(&mut corners[b].adjacent, a);
                }
            }

            edges.push(edge);
        }

        if let Some(t) = diagram.triangles.iter().find(|t| t.iter().any(|&s| s >= n)) {
            return Err(MapError::MalformedDiagram(format!(
                "triangle {:?} references a site outside 0..{}",
                t, n
            )));
        }

        for corner in &mut corners {
            corner.border = self.bounds.on_border(corner.point, self.tolerance);
        }
        for center in &mut centers {
            center.border = center.corners.iter().any(|&q| corners[q].border)
                || center.borders.iter().any(|&e| edges[e].border);
        }

        let mut graph = Graph {
            bounds: self.bounds,
            tolerance: self.tolerance,
            centers,
            corners,
            edges,
            triangles: diagram.triangles.clone(),
        };

        let mut usable = 0;
        for i in 0..n {
            if let Some((area, _)) = graph.polygon_centroid(i) {
                graph.centers[i].area = area;
                usable += 1;
            }
        }
        if usable < n {
            return Err(MapError::DegenerateDiagram {
                expected: n,
                actual: usable,
            });
        }

        graph.validate()?;

        log::debug!(
            "Built graph: {} centers, {} corners, {} edges",
            graph.centers.len(),
            graph.corners.len(),
            graph.edges.len()
        );

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::diagram::RawEdge;
    use crate::graph::fixtures::grid_diagram;

    #[test]
    fn test_corner_deduplication() {
        let (mut diagram, bounds) = grid_diagram(3);
        // Jitter one endpoint below the tolerance
        let jitter = bounds.tolerance() * 0.5;
        if let Some(p) = diagram.edges[0].v1.as_mut() {
            p.x += jitter;
        }
        let graph = GraphBuilder::new(bounds).build(&diagram).unwrap();
        assert_eq!(graph.corners().len(), 12);
    }

    #[test]
    fn test_adjacency_lists_are_sorted_and_unique() {
        let (diagram, bounds) = grid_diagram(4);
        let graph = GraphBuilder::new(bounds).build(&diagram).unwrap();
        for c in graph.centers() {
            assert!(c.neighbors.windows(2).all(|w| w[0] < w[1]));
            assert!(c.corners.windows(2).all(|w| w[0] < w[1]));
        }
        for q in graph.corners() {
            assert!(q.touches.windows(2).all(|w| w[0] < w[1]));
            assert!(q.adjacent.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_border_flags() {
        let (diagram, bounds) = grid_diagram(3);
        let graph = GraphBuilder::new(bounds).build(&diagram).unwrap();

        let border_centers = graph.centers().iter().filter(|c| c.border).count();
        assert_eq!(border_centers, 8);
        assert!(!graph.centers()[4].border);

        // 12 corners: 8 on the outline, 4 interior
        let border_corners = graph.corners().iter().filter(|q| q.border).count();
        assert_eq!(border_corners, 8);
    }

    #[test]
    fn test_interior_corner_touches_four_centers() {
        let (diagram, bounds) = grid_diagram(3);
        let graph = GraphBuilder::new(bounds).build(&diagram).unwrap();
        for q in graph.corners().iter().filter(|q| !q.border) {
            assert_eq!(q.touches.len(), 4);
            assert_eq!(q.adjacent.len(), 4);
        }
    }

    #[test]
    fn test_single_corner_edge_must_be_border() {
        let (mut diagram, bounds) = grid_diagram(3);
        diagram.edges[0].v1 = None;
        let result = GraphBuilder::new(bounds).build(&diagram);
        assert!(matches!(result, Err(MapError::MalformedDiagram(_))));
    }

    #[test]
    fn test_cornerless_edge_is_flagged_border() {
        let (mut diagram, bounds) = grid_diagram(3);
        diagram.edges.push(RawEdge {
            d0: 0,
            d1: 4,
            v0: None,
            v1: None,
            border: false,
        });
        let graph = GraphBuilder::new(bounds).build(&diagram).unwrap();
        let edge = graph.edges().last().unwrap();
        assert!(edge.border);
        assert!(graph.centers()[0].is_neighbor_of(4));
    }

    #[test]
    fn test_out_of_range_site_rejected() {
        let (mut diagram, bounds) = grid_diagram(2);
        diagram.edges[0].d1 = 17;
        assert!(matches!(
            GraphBuilder::new(bounds).build(&diagram),
            Err(MapError::MalformedDiagram(_))
        ));
    }

    #[test]
    fn test_duplicate_edge_rejected() {
        let (mut diagram, bounds) = grid_diagram(2);
        let copy = diagram.edges[0].clone();
        diagram.edges.push(copy);
        assert!(GraphBuilder::new(bounds).build(&diagram).is_err());
    }

    #[test]
    fn test_polygonless_site_is_degenerate() {
        let (mut diagram, bounds) = grid_diagram(2);
        diagram.sites.push(DVec2::new(1.0, 1.0));
        match GraphBuilder::new(bounds).build(&diagram) {
            Err(MapError::DegenerateDiagram { expected, actual }) => {
                assert_eq!(expected, 5);
                assert_eq!(actual, 4);
            }
            other => panic!("expected a degenerate diagram, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_length_edge_has_no_self_adjacency() {
        let (mut diagram, bounds) = grid_diagram(3);
        let p = diagram.edges[0].v0;
        diagram.edges[0].v1 = p;
        let graph = GraphBuilder::new(bounds).build(&diagram).unwrap();
        for q in graph.corners() {
            assert!(!q.adjacent.contains(&q.index));
        }
        let edge = &graph.edges()[0];
        assert_eq!(edge.v0, edge.v1);
    }
}
