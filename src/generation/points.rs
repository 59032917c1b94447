//! Seeded Site Placement
//!
//! Sites are drawn uniformly inside the map rectangle from the generator the
//! pipeline passes in. Uniform random sites give irregular Voronoi cells;
//! Lloyd relaxation evens them out afterwards.

use glam::DVec2;
use rand::Rng;

use crate::geometry::Bounds;

/// Draw `count` sites uniformly inside `bounds`
///
/// # Arguments
///
/// * `rng` - Seeded generator shared with the later pipeline stages
/// * `count` - Number of sites to generate
/// * `bounds` - Map rectangle
///
/// # Example
///
/// ```rust
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use voronoi_terrain::generation::random_sites;
/// use voronoi_terrain::Bounds;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// let sites = random_sites(&mut rng, 100, Bounds::new(100.0, 100.0));
/// assert_eq!(sites.len(), 100);
/// ```
pub fn random_sites<R: Rng + ?Sized>(rng: &mut R, count: usize, bounds: Bounds) -> Vec<DVec2> {
    (0..count)
        .map(|_| {
            DVec2::new(
                rng.gen_range(0.0..bounds.width),
                rng.gen_range(0.0..bounds.height),
            )
        })
        .collect()
}
