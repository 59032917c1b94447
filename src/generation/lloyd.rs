//! Lloyd's Relaxation for uniform site distribution
//!
//! Lloyd's Relaxation iteratively improves the uniformity of the polygons by
//! moving each site to the centroid of its polygon and rebuilding the whole
//! diagram from the moved sites.

use std::time::Instant;

use glam::DVec2;

use super::diagram::DiagramSource;
use crate::error::{MapError, Result};
use crate::geometry::Bounds;
use crate::graph::builder::GraphBuilder;
use crate::graph::Graph;

/// Options for Lloyd's relaxation algorithm
#[derive(Debug, Clone, Copy)]
pub struct LloydOptions {
    /// Number of relaxation rounds
    pub iterations: usize,
    /// Stop early once the largest site displacement drops below this
    /// distance. 0.0 always runs every round.
    pub convergence_threshold: f64,
}

impl Default for LloydOptions {
    fn default() -> Self {
        Self {
            iterations: 2,
            convergence_threshold: 0.0,
        }
    }
}

/// Build a graph from `sites`, relaxing it `options.iterations` times
///
/// Each round recomputes every site as the area-weighted centroid of its
/// polygon (border closure included), re-invokes `source` with the moved
/// sites and rebuilds the graph from scratch. Flags, elevation and moisture
/// are left untouched; they are computed on the final graph.
///
/// # Errors
///
/// Returns `DegenerateDiagram` if any build yields fewer polygons than
/// there are sites. The discrepancy is reported, never patched over.
pub fn relax<S: DiagramSource + ?Sized>(
    source: &S,
    builder: &GraphBuilder,
    sites: Vec<DVec2>,
    bounds: Bounds,
    options: LloydOptions,
) -> Result<Graph> {
    let total_start = Instant::now();
    let expected = sites.len();

    let mut graph = build_checked(source, builder, &sites, bounds, expected)?;

    log::debug!(
        "Lloyd: starting with {} sites, {} iterations",
        expected,
        options.iterations
    );

    for iteration in 0..options.iterations {
        let iter_start = Instant::now();

        let (moved, max_displacement) = relaxed_sites(&graph);
        graph = build_checked(source, builder, &moved, bounds, expected)?;

        log::debug!(
            "Lloyd: iteration {} took {:?}, max displacement {:.4}",
            iteration + 1,
            iter_start.elapsed(),
            max_displacement
        );

        if options.convergence_threshold > 0.0 && max_displacement < options.convergence_threshold
        {
            log::debug!(
                "Lloyd: converged after {} iterations (max displacement {:.4} < {:.4})",
                iteration + 1,
                max_displacement,
                options.convergence_threshold
            );
            break;
        }
    }

    log::debug!("Lloyd: finished in {:?}", total_start.elapsed());
    Ok(graph)
}

fn build_checked<S: DiagramSource + ?Sized>(
    source: &S,
    builder: &GraphBuilder,
    sites: &[DVec2],
    bounds: Bounds,
    expected: usize,
) -> Result<Graph> {
    let diagram = source.generate(sites, bounds)?;
    if diagram.sites.len() != expected {
        return Err(MapError::DegenerateDiagram {
            expected,
            actual: diagram.sites.len(),
        });
    }
    builder.build(&diagram)
}

/// Centroid of every polygon, plus the largest distance a site moved
pub fn relaxed_sites(graph: &Graph) -> (Vec<DVec2>, f64) {
    let mut max_displacement: f64 = 0.0;
    let sites = graph
        .centers()
        .iter()
        .map(|c| {
            let centroid = graph
                .polygon_centroid(c.index)
                .map_or(c.point, |(_, centroid)| centroid);
            max_displacement = max_displacement.max(centroid.distance(c.point));
            centroid
        })
        .collect();
    (sites, max_displacement)
}
