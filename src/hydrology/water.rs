//! Water, ocean and coast classification

use std::collections::VecDeque;

use crate::graph::Graph;
use crate::terrain::WaterMask;

/// Mark water candidates
///
/// Every center asks the mask about its site. With `border_is_water` set,
/// border centers are water whatever the mask says, which frames the map
/// with ocean. Without it the mask alone decides, and a map whose border is
/// all land has no ocean at all.
pub fn mark_water<M: WaterMask + ?Sized>(graph: &mut Graph, mask: &M, border_is_water: bool) {
    let bounds = graph.bounds;
    for center in &mut graph.centers {
        center.water =
            (border_is_water && center.border) || mask.is_water(center.point, bounds);
        center.ocean = false;
        center.coast = false;
    }
}

/// Flood fill the ocean from the border
///
/// Starts at every water center touching the border and walks through water
/// neighbours only. Water centers the fill never reaches stay lakes. Corner
/// flags are derived from the touching centers afterwards.
///
/// Returns the number of ocean centers.
pub fn flood_ocean(graph: &mut Graph) -> usize {
    let mut queue = VecDeque::new();
    for center in &mut graph.centers {
        center.ocean = center.border && center.water;
        if center.ocean {
            queue.push_back(center.index);
        }
    }

    while let Some(c) = queue.pop_front() {
        for i in 0..graph.centers[c].neighbors.len() {
            let n = graph.centers[c].neighbors[i];
            let neighbor = &mut graph.centers[n];
            if neighbor.water && !neighbor.ocean {
                neighbor.ocean = true;
                queue.push_back(n);
            }
        }
    }

    let Graph {
        centers, corners, ..
    } = graph;
    for corner in corners.iter_mut() {
        let touches = &corner.touches;
        corner.water = !touches.is_empty() && touches.iter().all(|&c| centers[c].water);
        corner.ocean = !touches.is_empty() && touches.iter().all(|&c| centers[c].ocean);
    }

    graph.centers.iter().filter(|c| c.ocean).count()
}

/// Mark coast centers and corners
///
/// A center is coast when it is land with at least one water neighbour. A
/// corner is coast when it touches both water and land centers.
///
/// Returns the number of coast centers.
pub fn mark_coast(graph: &mut Graph) -> usize {
    let coast: Vec<bool> = graph
        .centers
        .iter()
        .map(|c| !c.water && c.neighbors.iter().any(|&n| graph.centers[n].water))
        .collect();
    for (center, coast) in graph.centers.iter_mut().zip(coast) {
        center.coast = coast;
    }

    let Graph {
        centers, corners, ..
    } = graph;
    for corner in corners.iter_mut() {
        let water = corner.touches.iter().any(|&c| centers[c].water);
        let land = corner.touches.iter().any(|&c| !centers[c].water);
        corner.coast = water && land;
    }

    graph.centers.iter().filter(|c| c.coast).count()
}
