//! Hydrology simulation
//!
//! Ordered passes over a finished graph. Each pass depends on the previous
//! one, so [`simulate`] is the normal entry point:
//!
//! 1. water candidates from a [`WaterMask`]
//! 2. ocean flood fill from the border, corner water/ocean flags
//! 3. coast flags
//! 4. raw elevation, rank redistribution, center elevation
//! 5. downslope pointers (verified acyclic)
//! 6. river tracing
//! 7. moisture diffusion, redistribution, center moisture

mod elevation;
mod moisture;
mod rivers;
mod water;

pub use elevation::{
    assign_center_elevation, elevation_curve, raw_elevation, redistribute_elevation,
};
pub use moisture::{assign_center_moisture, diffuse_moisture, redistribute_moisture};
pub use rivers::{assign_downslopes, trace_rivers, verify_downslopes};
pub use water::{flood_ocean, mark_coast, mark_water};

use std::time::Instant;

use rand::Rng;

use crate::config::HydrologyOptions;
use crate::error::Result;
use crate::graph::Graph;
use crate::terrain::WaterMask;

/// Counts gathered while the passes run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HydrologyReport {
    pub ocean_centers: usize,
    pub lake_centers: usize,
    pub coast_centers: usize,
    pub rivers: usize,
}

/// Rank-preserving redistribution
///
/// Sorts the values ascending (ties broken by position) and gives the value
/// of rank `r` the output `curve((r + 1) / n)`. For a non-decreasing curve,
/// `values[a] < values[b]` implies `out[a] <= out[b]`.
pub fn rank_redistribute<F>(values: &[f64], curve: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

    let mut out = vec![0.0; n];
    for (rank, &i) in order.iter().enumerate() {
        out[i] = curve((rank + 1) as f64 / n as f64);
    }
    out
}

/// Run every hydrology pass in order
///
/// `rng` is only used to sample river sources; the caller threads the same
/// generator it used for site placement.
///
/// # Errors
///
/// `InvariantViolation` if the downslope graph has a cycle or a river walk
/// cannot be completed.
pub fn simulate<M, R>(
    graph: &mut Graph,
    mask: &M,
    options: &HydrologyOptions,
    river_count: usize,
    rng: &mut R,
) -> Result<HydrologyReport>
where
    M: WaterMask + ?Sized,
    R: Rng + ?Sized,
{
    let start = Instant::now();

    mark_water(graph, mask, options.border_is_water);
    let ocean_centers = flood_ocean(graph);
    let coast_centers = mark_coast(graph);
    let lake_centers = graph
        .centers()
        .iter()
        .filter(|c| c.water && !c.ocean)
        .count();

    let raw = raw_elevation(graph, options.lake_step);
    redistribute_elevation(graph, &raw, options.elevation_scale);
    assign_center_elevation(graph);

    assign_downslopes(graph, &raw);
    verify_downslopes(graph)?;

    let rivers = trace_rivers(
        graph,
        river_count,
        options.river_source_min_elevation,
        options.river_source_max_elevation,
        rng,
    )?;

    diffuse_moisture(graph, options.moisture_decay, options.river_moisture_threshold);
    redistribute_moisture(graph);
    assign_center_moisture(graph);

    let report = HydrologyReport {
        ocean_centers,
        lake_centers,
        coast_centers,
        rivers,
    };
    log::info!(
        "Hydrology: {} ocean, {} lake, {} coast centers, {} rivers in {:?}",
        report.ocean_centers,
        report.lake_centers,
        report.coast_centers,
        report.rivers,
        start.elapsed()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Bounds;
    use crate::graph::fixtures::grid_graph;
    use glam::DVec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rank_redistribute_linear() {
        let out = rank_redistribute(&[5.0, 1.0, 3.0, 3.0], |y| y);
        assert_eq!(out, vec![1.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_rank_redistribute_empty() {
        assert!(rank_redistribute(&[], |y| y).is_empty());
    }

    proptest! {
        #[test]
        fn prop_rank_order_preserved(values in prop::collection::vec(-1000.0f64..1000.0, 1..200)) {
            let out = rank_redistribute(&values, |y| elevation_curve(y, 1.1));
            for a in 0..values.len() {
                for b in 0..values.len() {
                    if values[a] < values[b] {
                        prop_assert!(out[a] <= out[b]);
                    }
                }
                prop_assert!((0.0..=1.0).contains(&out[a]));
            }
        }
    }

    #[test]
    fn test_simulate_island_grid() {
        let mut graph = grid_graph(9);
        let lake = |p: DVec2, _: Bounds| p.distance(DVec2::new(4.5, 4.5)) < 0.1;
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let report = simulate(&mut graph, &lake, &HydrologyOptions::default(), 4, &mut rng).unwrap();

        assert_eq!(report.ocean_centers, 32);
        assert_eq!(report.lake_centers, 1);
        assert_eq!(report.rivers, 4);
        // 24 land cells along the ocean plus 4 around the lake
        assert_eq!(report.coast_centers, 28);

        for c in graph.centers() {
            assert!(!c.ocean || c.water);
            assert!(!(c.coast && c.water));
            assert!((0.0..=1.0).contains(&c.elevation));
            assert!((0.0..=1.0).contains(&c.moisture));
        }
        verify_downslopes(&graph).unwrap();
        graph.validate().unwrap();
    }
}
