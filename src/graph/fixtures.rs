//! Hand-built diagrams for unit tests

use glam::DVec2;

use super::builder::GraphBuilder;
use super::Graph;
use crate::generation::diagram::{RawDiagram, RawEdge};
use crate::geometry::Bounds;
use crate::hydrology::{flood_ocean, mark_coast, mark_water};

/// An `n x n` grid of unit squares on a `n x n` map
///
/// Site `(i, j)` sits at `(i + 0.5, j + 0.5)` with index `j * n + i`. Only
/// horizontal and vertical neighbours are joined, so every interior corner
/// has four touching centers and the four rectangle corners are not graph
/// corners.
pub(crate) fn grid_diagram(n: usize) -> (RawDiagram, Bounds) {
    let index = |i: usize, j: usize| j * n + i;
    let point = |x: usize, y: usize| DVec2::new(x as f64, y as f64);

    let mut sites = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            sites.push(DVec2::new(i as f64 + 0.5, j as f64 + 0.5));
        }
    }

    let mut edges = Vec::new();
    for j in 0..n {
        for i in 0..n {
            if i + 1 < n {
                edges.push(RawEdge {
                    d0: index(i, j),
                    d1: index(i + 1, j),
                    v0: Some(point(i + 1, j)),
                    v1: Some(point(i + 1, j + 1)),
                    border: false,
                });
            }
            if j + 1 < n {
                edges.push(RawEdge {
                    d0: index(i, j),
                    d1: index(i, j + 1),
                    v0: Some(point(i, j + 1)),
                    v1: Some(point(i + 1, j + 1)),
                    border: false,
                });
            }
        }
    }

    let mut triangles = Vec::new();
    for j in 0..n.saturating_sub(1) {
        for i in 0..n - 1 {
            let (a, b, c, d) = (index(i, j), index(i + 1, j), index(i, j + 1), index(i + 1, j + 1));
            triangles.push([a, b, d]);
            triangles.push([a, d, c]);
        }
    }

    let bounds = Bounds::new(n as f64, n as f64);
    (RawDiagram { sites, edges, triangles }, bounds)
}

pub(crate) fn grid_graph(n: usize) -> Graph {
    let (diagram, bounds) = grid_diagram(n);
    GraphBuilder::new(bounds)
        .build(&diagram)
        .expect("grid diagram is well formed")
}

/// `n` horizontal strips spanning a `10 x n` map
///
/// Site `j` sits at `(5, j + 0.5)`. The end strips touch three sides of the
/// rectangle and every middle strip touches two opposite sides.
pub(crate) fn strip_diagram(n: usize) -> (RawDiagram, Bounds) {
    let sites = (0..n).map(|j| DVec2::new(5.0, j as f64 + 0.5)).collect();
    let edges = (1..n)
        .map(|j| RawEdge {
            d0: j - 1,
            d1: j,
            v0: Some(DVec2::new(0.0, j as f64)),
            v1: Some(DVec2::new(10.0, j as f64)),
            border: false,
        })
        .collect();

    let bounds = Bounds::new(10.0, n as f64);
    (RawDiagram { sites, edges, triangles: Vec::new() }, bounds)
}

/// Grid with land everywhere except the forced ocean ring and the cells
/// whose sites are listed in `lakes`, classified up to the coast pass
pub(crate) fn island_grid(n: usize, lakes: &[DVec2]) -> Graph {
    let mut graph = grid_graph(n);
    let mask = |p: DVec2, _: Bounds| lakes.iter().any(|l| l.distance(p) < 0.1);
    mark_water(&mut graph, &mask, true);
    flood_ocean(&mut graph);
    mark_coast(&mut graph);
    graph
}
