//! Debug geometry for visualizing the raw diagram

use glam::{DVec2, Vec3};

use crate::config::DebugOptions;
use crate::graph::Graph;

/// Line segment between two y-up points
pub type Segment = [[f32; 3]; 2];

/// Point and line geometry, filled only for the enabled toggles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugGeometry {
    /// Center sites
    pub sites: Vec<[f32; 3]>,
    /// Voronoi corners
    pub corners: Vec<[f32; 3]>,
    /// Center-to-center segments of every edge
    pub delaunay_edges: Vec<Segment>,
    /// Corner-to-corner segments of edges that have two corners
    pub voronoi_edges: Vec<Segment>,
}

#[inline]
fn lift(point: DVec2, elevation: f64, height_factor: f64) -> [f32; 3] {
    Vec3::new(
        point.x as f32,
        (elevation * height_factor) as f32,
        point.y as f32,
    )
    .to_array()
}

impl DebugGeometry {
    /// Collect the geometry requested by `options`
    pub fn collect(graph: &Graph, options: &DebugOptions, height_factor: f64) -> Self {
        let mut geometry = DebugGeometry::default();
        let centers = graph.centers();
        let corners = graph.corners();

        if options.sites {
            geometry.sites = centers
                .iter()
                .map(|c| lift(c.point, c.elevation, height_factor))
                .collect();
        }
        if options.corners {
            geometry.corners = corners
                .iter()
                .map(|q| lift(q.point, q.elevation, height_factor))
                .collect();
        }
        if options.delaunay_edges {
            geometry.delaunay_edges = graph
                .edges()
                .iter()
                .map(|e| {
                    let (a, b) = (&centers[e.d0], &centers[e.d1]);
                    [
                        lift(a.point, a.elevation, height_factor),
                        lift(b.point, b.elevation, height_factor),
                    ]
                })
                .collect();
        }
        if options.voronoi_edges {
            geometry.voronoi_edges = graph
                .edges()
                .iter()
                .filter_map(|e| e.corners())
                .map(|(a, b)| {
                    let (a, b) = (&corners[a], &corners[b]);
                    [
                        lift(a.point, a.elevation, height_factor),
                        lift(b.point, b.elevation, height_factor),
                    ]
                })
                .collect();
        }

        geometry
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
            && self.corners.is_empty()
            && self.delaunay_edges.is_empty()
            && self.voronoi_edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::fixtures::grid_graph;

    #[test]
    fn test_nothing_requested() {
        let graph = grid_graph(3);
        assert!(DebugGeometry::collect(&graph, &DebugOptions::default(), 1.0).is_empty());
    }

    #[test]
    fn test_toggles_are_independent() {
        let graph = grid_graph(3);
        let options = DebugOptions {
            sites: true,
            voronoi_edges: true,
            ..Default::default()
        };
        let geometry = DebugGeometry::collect(&graph, &options, 1.0);
        assert_eq!(geometry.sites.len(), 9);
        assert_eq!(geometry.voronoi_edges.len(), graph.edges().len());
        assert!(geometry.corners.is_empty());
        assert!(geometry.delaunay_edges.is_empty());
    }

    #[test]
    fn test_all_toggles() {
        let graph = grid_graph(4);
        let options = DebugOptions {
            sites: true,
            corners: true,
            delaunay_edges: true,
            voronoi_edges: true,
        };
        let geometry = DebugGeometry::collect(&graph, &options, 2.0);
        assert_eq!(geometry.corners.len(), graph.corners().len());
        assert_eq!(geometry.delaunay_edges.len(), graph.edges().len());
        assert_eq!(geometry.sites[0], [0.5, 0.0, 0.5]);
    }
}
