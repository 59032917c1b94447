//! Complete workflow demonstration for voronoi_terrain
//!
//! Usage: `cargo run --example generate_map [seed]`

use voronoi_terrain::*;

fn main() -> Result<()> {
    println!("=== voronoi_terrain Complete Demo ===\n");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    // Step 1: Configure map
    println!("Step 1: Configuring map...");
    let config = MapConfigBuilder::new()
        .seed(seed)
        .site_count(2000)
        .bounds(600.0, 600.0)?
        .relaxation_iterations(2)?
        .build()?;

    println!("  Seed: {}", config.seed);
    println!("  Sites: {}", config.site_count);
    println!("  Bounds: {} x {}", config.width, config.height);

    // Step 2: Generate map
    println!("\nStep 2: Generating map...");
    let map = TerrainMap::generate(config)?;
    println!("  Generated {} centers", map.center_count());
    println!("  Corners: {}", map.graph().corners().len());
    println!("  Edges: {}", map.graph().edges().len());

    // Step 3: Analyze terrain
    let summary = map.summary();
    println!("\nStep 3: Terrain distribution:");
    println!("  Ocean: {}", summary.ocean_centers);
    println!("  Lake: {}", summary.lake_centers);
    println!("  Land: {} ({} coast)", summary.land_centers, summary.coast_centers);
    println!("  River edges: {}", summary.river_edges);
    for (biome, count) in &summary.biomes {
        let pct = (*count as f32 / map.center_count() as f32) * 100.0;
        println!("  {:28} {:5} ({:.1}%)", biome.name(), count, pct);
    }

    // Step 4: Query spatial index
    #[cfg(feature = "spatial-index")]
    {
        println!("\nStep 4: Spatial queries:");
        let point = DVec2::new(300.0, 300.0);
        if let Some(id) = map.find_center_at(point) {
            let center = map.center(id)?;
            println!("  Point {:?} -> Center {} ({:?})", point, id, center.biome);
            println!("  Center has {} neighbors", map.neighbors(id).len());
            println!(
                "  {} centers within 2 hops",
                map.find_centers_within_hops(id, 2).len()
            );
        }
    }

    // Step 5: Mesh buffers
    println!("\nStep 5: Mesh buffers:");
    for mesh in map.meshes() {
        println!(
            "  {:28} {:6} vertices, {:6} triangles",
            mesh.material.name,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }

    // Memory estimate
    let mem = map
        .meshes()
        .iter()
        .map(|m| m.positions.len() * 12 + m.normals.len() * 12 + m.indices.len() * 4)
        .sum::<usize>() as f32
        / 1024.0
        / 1024.0;
    println!("  Memory: {:.2} MB", mem);

    println!("\n=== Demo Complete ===");
    Ok(())
}
