//! Polygon graph generation
//!
//! Seeded site placement, the external Voronoi source, and the Lloyd
//! relaxation loop that rebuilds the graph from relaxed sites.

pub mod diagram;
mod lloyd;
mod points;

pub use diagram::{DiagramSource, RawDiagram, RawEdge, VoronoiceSource};
pub use lloyd::{relax, relaxed_sites, LloydOptions};
pub use points::random_sites;

use rand::Rng;

use crate::config::MapConfig;
use crate::error::Result;
use crate::graph::builder::GraphBuilder;
use crate::graph::Graph;

/// Generate the relaxed polygon graph for a configuration (without terrain)
///
/// Sites are drawn from `rng`, which the caller keeps using for the later
/// random stages so a single seed drives the whole map.
pub fn generate_graph<S, R>(config: &MapConfig, source: &S, rng: &mut R) -> Result<Graph>
where
    S: DiagramSource + ?Sized,
    R: Rng + ?Sized,
{
    let bounds = config.bounds();

    // Step 1: Uniform random sites
    let sites = random_sites(rng, config.site_count, bounds);

    // Step 2: Build and relax
    let options = LloydOptions {
        iterations: config.relaxation_iterations,
        convergence_threshold: 0.0,
    };
    relax(source, &GraphBuilder::new(bounds), sites, bounds, options)
}
