//! Moisture diffusion

use std::collections::VecDeque;

use super::elevation::mean;
use super::rank_redistribute;
use crate::graph::Graph;

/// Upper bound on the moisture a river corner starts with
const MAX_RIVER_MOISTURE: f64 = 3.0;

/// Spread moisture outward from water and rivers
///
/// Water corners start at 1.0, river corners with strength above
/// `river_threshold` at `min(3, 0.2 * river)`. Each hop multiplies by
/// `decay`; a corner keeps the wettest value that reaches it.
pub fn diffuse_moisture(graph: &mut Graph, decay: f64, river_threshold: u32) {
    let corners = &mut graph.corners;
    let mut queue = VecDeque::new();

    for corner in corners.iter_mut() {
        corner.moisture = 0.0;
        if corner.water {
            corner.moisture = 1.0;
        }
        if corner.river > river_threshold {
            let river = (0.2 * corner.river as f64).min(MAX_RIVER_MOISTURE);
            corner.moisture = corner.moisture.max(river);
        }
        if corner.moisture > 0.0 {
            queue.push_back(corner.index);
        }
    }

    while let Some(q) = queue.pop_front() {
        let moisture = corners[q].moisture * decay;
        for i in 0..corners[q].adjacent.len() {
            let r = corners[q].adjacent[i];
            if moisture > corners[r].moisture {
                corners[r].moisture = moisture;
                queue.push_back(r);
            }
        }
    }
}

/// Rank-redistribute land moisture linearly onto (0, 1]
///
/// Water corners are set to 1.0. Everything ends up clamped to [0, 1].
pub fn redistribute_moisture(graph: &mut Graph) {
    let land: Vec<usize> = graph
        .corners
        .iter()
        .filter(|q| !q.water)
        .map(|q| q.index)
        .collect();
    let values: Vec<f64> = land.iter().map(|&i| graph.corners[i].moisture).collect();
    let redistributed = rank_redistribute(&values, |y| y);

    for (&i, m) in land.iter().zip(redistributed) {
        graph.corners[i].moisture = m;
    }
    for corner in &mut graph.corners {
        if corner.water {
            corner.moisture = 1.0;
        }
        corner.moisture = corner.moisture.clamp(0.0, 1.0);
    }
}

/// Center moisture = mean of its corners
pub fn assign_center_moisture(graph: &mut Graph) {
    let Graph {
        centers, corners, ..
    } = graph;
    for center in centers.iter_mut() {
        center.moisture = mean(center.corners.iter().map(|&q| corners[q].moisture)).clamp(0.0, 1.0);
    }
}
