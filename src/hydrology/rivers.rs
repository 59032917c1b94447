//! Downslope pointers and river tracing

use std::cmp::Ordering;

use rand::distributions::WeightedIndex;
use rand::prelude::*;

use crate::error::{MapError, Result};
use crate::graph::Graph;

/// Total order used for downslope selection: elevation, then raw elevation,
/// then corner index
#[inline]
fn slope_key(graph: &Graph, raw: &[f64], q: usize) -> (f64, f64, usize) {
    (graph.corners[q].elevation, raw[q], q)
}

#[inline]
fn compare(a: (f64, f64, usize), b: (f64, f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0)
        .then(a.1.total_cmp(&b.1))
        .then(a.2.cmp(&b.2))
}

/// Point every land corner at its lowest neighbour
///
/// Water corners (ocean and lake) are sinks and get no pointer. A land corner
/// points at the adjacent corner with the smallest key when that key is below
/// its own. Ties in elevation fall back to raw elevation and then to the
/// lower index, so pointers always strictly descend and can never cycle.
pub fn assign_downslopes(graph: &mut Graph, raw: &[f64]) {
    let pointers: Vec<Option<usize>> = graph
        .corners
        .iter()
        .map(|q| {
            if q.water {
                return None;
            }
            let own = slope_key(graph, raw, q.index);
            q.adjacent
                .iter()
                .map(|&n| slope_key(graph, raw, n))
                .min_by(|a, b| compare(*a, *b))
                .filter(|&best| compare(best, own) == Ordering::Less)
                .map(|best| best.2)
        })
        .collect();

    for (corner, downslope) in graph.corners.iter_mut().zip(pointers) {
        corner.downslope = downslope;
    }
}

/// Check that the downslope relation is an acyclic functional graph
///
/// Every pointer must target an adjacent corner, water corners must be
/// sinks, and no chain may revisit a corner.
pub fn verify_downslopes(graph: &Graph) -> Result<()> {
    const UNSEEN: u8 = 0;
    const ACTIVE: u8 = 1;
    const DONE: u8 = 2;

    let corners = &graph.corners;
    let mut state = vec![UNSEEN; corners.len()];
    let mut path = Vec::new();

    for start in 0..corners.len() {
        let mut q = start;
        loop {
            match state[q] {
                DONE => break,
                ACTIVE => {
                    return Err(MapError::InvariantViolation(format!(
                        "downslope cycle through corner {}",
                        q
                    )))
                }
                _ => {}
            }
            state[q] = ACTIVE;
            path.push(q);

            let corner = &corners[q];
            match corner.downslope {
                None => break,
                Some(next) => {
                    if corner.water {
                        return Err(MapError::InvariantViolation(format!(
                            "water corner {} has a downslope",
                            q
                        )));
                    }
                    if corner.adjacent.binary_search(&next).is_err() {
                        return Err(MapError::InvariantViolation(format!(
                            "corner {} points downslope at non-adjacent corner {}",
                            q, next
                        )));
                    }
                    q = next;
                }
            }
        }
        for p in path.drain(..) {
            state[p] = DONE;
        }
    }
    Ok(())
}

/// Trace rivers from elevated land corners down to the sea
///
/// Sources are sampled among land corners with elevation in
/// `[min_elevation, max_elevation]`, weighted by elevation. Each walk follows
/// the downslope pointers to a sink, adding one to the river strength of every
/// corner it leaves and every edge it crosses; rivers that meet add up.
///
/// Returns the number of rivers traced (0 if there is no candidate source).
///
/// # Errors
///
/// `InvariantViolation` if a walk takes more steps than there are corners or
/// crosses two corners no edge joins.
pub fn trace_rivers<R: Rng + ?Sized>(
    graph: &mut Graph,
    count: usize,
    min_elevation: f64,
    max_elevation: f64,
    rng: &mut R,
) -> Result<usize> {
    for corner in &mut graph.corners {
        corner.river = 0;
    }
    for edge in &mut graph.edges {
        edge.river = 0;
    }

    let candidates: Vec<usize> = graph
        .corners
        .iter()
        .filter(|q| !q.water && q.elevation >= min_elevation && q.elevation <= max_elevation)
        .map(|q| q.index)
        .collect();
    if candidates.is_empty() || count == 0 {
        log::debug!("No river sources in elevation range {}..{}", min_elevation, max_elevation);
        return Ok(0);
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|&q| graph.corners[q].elevation.max(f64::EPSILON))
        .collect();
    let distribution = WeightedIndex::new(&weights)
        .map_err(|e| MapError::InvariantViolation(format!("river source weights: {}", e)))?;

    let limit = graph.corners.len();
    for _ in 0..count {
        let mut q = candidates[distribution.sample(rng)];
        let mut steps = 0;
        while let Some(next) = graph.corners[q].downslope {
            steps += 1;
            if steps > limit {
                return Err(MapError::InvariantViolation(format!(
                    "river from corner {} did not reach a sink",
                    q
                )));
            }
            let edge = graph.edge_between(q, next).map(|e| e.index).ok_or_else(|| {
                MapError::InvariantViolation(format!(
                    "no edge joins corners {} and {} on a river",
                    q, next
                ))
            })?;
            graph.edges[edge].river += 1;
            graph.corners[q].river += 1;
            q = next;
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::super::elevation::{raw_elevation, redistribute_elevation};
    use super::*;
    use crate::graph::fixtures::island_grid;
    use glam::DVec2;
    use rand_chacha::ChaCha8Rng;

    fn sloped_grid(n: usize, lakes: &[DVec2]) -> (Graph, Vec<f64>) {
        let mut graph = island_grid(n, lakes);
        let raw = raw_elevation(&graph, 0.01);
        redistribute_elevation(&mut graph, &raw, 1.1);
        assign_downslopes(&mut graph, &raw);
        (graph, raw)
    }

    #[test]
    fn test_every_land_corner_drains() {
        let (graph, _) = sloped_grid(9, &[]);
        verify_downslopes(&graph).unwrap();

        for q in graph.corners() {
            if q.water {
                assert!(q.downslope.is_none());
                continue;
            }
            // Follow the chain to a sink within |corners| steps
            let mut current = q.index;
            let mut steps = 0;
            while let Some(next) = graph.corners()[current].downslope {
                assert!(graph.corners()[next].elevation <= graph.corners()[current].elevation);
                current = next;
                steps += 1;
                assert!(steps <= graph.corners().len());
            }
            assert!(graph.corners()[current].water);
        }
    }

    #[test]
    fn test_rivers_end_in_lakes_or_ocean() {
        let lakes = [DVec2::new(4.5, 4.5)];
        let (graph, _) = sloped_grid(9, &lakes);
        verify_downslopes(&graph).unwrap();
        for q in graph.corners().iter().filter(|q| !q.water) {
            assert!(q.downslope.is_some());
        }
    }

    #[test]
    fn test_cycle_is_reported() {
        let (mut graph, _) = sloped_grid(5, &[]);
        let a = graph
            .corners()
            .iter()
            .find(|q| !q.water && q.adjacent.iter().any(|&n| !graph.corners()[n].water))
            .unwrap()
            .index;
        let b = graph.corners()[a]
            .adjacent
            .iter()
            .copied()
            .find(|&n| !graph.corners()[n].water)
            .unwrap();
        graph.corners[a].downslope = Some(b);
        graph.corners[b].downslope = Some(a);

        assert!(matches!(
            verify_downslopes(&graph),
            Err(MapError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_trace_rivers_counts_flow() {
        let (mut graph, _) = sloped_grid(9, &[]);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let traced = trace_rivers(&mut graph, 5, 0.3, 0.9, &mut rng).unwrap();
        assert_eq!(traced, 5);

        // Every river leaves its source at least once
        let total: u32 = graph.edges().iter().map(|e| e.river).sum();
        assert!(total >= 5);

        // Flow only runs along downslope pointers
        for e in graph.edges().iter().filter(|e| e.river > 0) {
            let (a, b) = e.corners().unwrap();
            let qa = &graph.corners()[a];
            let qb = &graph.corners()[b];
            assert!(qa.downslope == Some(b) || qb.downslope == Some(a));
        }
        // Water corners never carry outgoing flow
        assert!(graph.corners().iter().filter(|q| q.water).all(|q| q.river == 0));
    }

    #[test]
    fn test_rivers_deterministic() {
        let run = || {
            let (mut graph, _) = sloped_grid(9, &[]);
            let mut rng = ChaCha8Rng::seed_from_u64(77);
            trace_rivers(&mut graph, 4, 0.3, 0.9, &mut rng).unwrap();
            graph.corners().iter().map(|q| q.river).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_no_candidates_means_no_rivers() {
        let (mut graph, _) = sloped_grid(5, &[]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // No corner sits above 1.0
        let traced = trace_rivers(&mut graph, 3, 1.0 + 1e-9, 1.0 + 1e-9, &mut rng).unwrap();
        assert_eq!(traced, 0);
        assert!(graph.edges().iter().all(|e| e.river == 0));
    }
}
