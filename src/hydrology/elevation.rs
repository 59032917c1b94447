//! Elevation assignment and redistribution

use std::collections::VecDeque;

use super::rank_redistribute;
use crate::graph::Graph;

/// Raw corner elevation: weighted hop distance from the ocean
///
/// Ocean corners start at 0. Each hop costs `lake_step`, plus 1.0 when both
/// ends are land, so lakes stay flat while land climbs away from the sea.
/// Falls back to the border corners when there is no ocean, and to all zeros
/// when there is no border either. Corners the walk never reaches get the
/// highest reached value.
pub fn raw_elevation(graph: &Graph, lake_step: f64) -> Vec<f64> {
    let corners = &graph.corners;
    let mut raw = vec![f64::INFINITY; corners.len()];

    let mut seeds: Vec<usize> = corners.iter().filter(|q| q.ocean).map(|q| q.index).collect();
    if seeds.is_empty() {
        seeds = corners.iter().filter(|q| q.border).map(|q| q.index).collect();
    }
    if seeds.is_empty() {
        return vec![0.0; corners.len()];
    }

    let mut queue = VecDeque::with_capacity(corners.len());
    for s in seeds {
        raw[s] = 0.0;
        queue.push_back(s);
    }

    while let Some(q) = queue.pop_front() {
        for &s in &corners[q].adjacent {
            let mut elevation = raw[q] + lake_step;
            if !corners[q].water && !corners[s].water {
                elevation += 1.0;
            }
            if elevation < raw[s] {
                raw[s] = elevation;
                queue.push_back(s);
            }
        }
    }

    let highest = raw
        .iter()
        .copied()
        .filter(|e| e.is_finite())
        .fold(0.0, f64::max);
    for e in &mut raw {
        if !e.is_finite() {
            *e = highest;
        }
    }
    raw
}

/// Redistribution curve `sqrt(s) - sqrt(s * (1 - y))`, capped at 1
///
/// Maps an evenly spaced rank `y` in [0, 1] to an elevation that spends
/// more of the range on lowlands than on peaks.
#[inline]
pub fn elevation_curve(y: f64, scale: f64) -> f64 {
    let x = scale.sqrt() - (scale * (1.0 - y)).max(0.0).sqrt();
    x.clamp(0.0, 1.0)
}

/// Replace raw corner elevations with their rank on the elevation curve
///
/// Non-ocean corners are ranked by raw elevation (ties by index) and placed
/// along [`elevation_curve`]. Ocean corners are clamped to 0.
pub fn redistribute_elevation(graph: &mut Graph, raw: &[f64], scale: f64) {
    let land: Vec<usize> = graph
        .corners
        .iter()
        .filter(|q| !q.ocean)
        .map(|q| q.index)
        .collect();
    let values: Vec<f64> = land.iter().map(|&i| raw[i]).collect();
    let redistributed = rank_redistribute(&values, |y| elevation_curve(y, scale));

    for corner in &mut graph.corners {
        corner.elevation = 0.0;
    }
    for (&i, e) in land.iter().zip(redistributed) {
        graph.corners[i].elevation = e;
    }
}

/// Center elevation = mean of its corners
pub fn assign_center_elevation(graph: &mut Graph) {
    let Graph {
        centers, corners, ..
    } = graph;
    for center in centers.iter_mut() {
        center.elevation = mean(center.corners.iter().map(|&q| corners[q].elevation));
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
