//! Mesh emission for terrain maps
//!
//! Turns the polygon graph into engine-agnostic triangle buffers grouped by
//! material. Positions are y-up: a graph point `(x, y)` with elevation `e`
//! becomes `(x, e * height_factor, y)`.

pub mod debug;
mod materials;

pub use debug::DebugGeometry;
pub use materials::{
    biome_color, color_name, hex_color, BiomeMaterials, BiomePalette, CenterColors, Color,
    Material, MaterialMapper,
};

use std::collections::BTreeMap;

use glam::Vec3;

use crate::graph::{Graph, PolygonVertex};

/// Engine-agnostic mesh buffer for one material
///
/// Contains raw vertex data suitable for any rendering engine or an
/// OBJ-style writer (positions, triangle indices, group material name).
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffer {
    pub material: Material,
    /// Vertex positions (y-up)
    pub positions: Vec<[f32; 3]>,
    /// Area-weighted vertex normals, per polygon
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices
    pub indices: Vec<u32>,
}

impl MeshBuffer {
    fn new(material: Material) -> Self {
        Self {
            material,
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Options for mesh emission
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshOptions {
    /// Multiplier applied to normalized elevation
    pub height_factor: f64,
    /// Vertex budget of a single buffer
    pub max_batch_vertices: usize,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            height_factor: 50.0,
            max_batch_vertices: 65536,
        }
    }
}

/// Lift a polygon vertex into y-up 3D space
fn lift(graph: &Graph, vertex: PolygonVertex, height_factor: f64) -> Vec3 {
    let point = graph.position(vertex);
    let elevation = match vertex {
        PolygonVertex::Center(i) => graph.centers()[i].elevation,
        PolygonVertex::Corner(i) => graph.corners()[i].elevation,
        PolygonVertex::BoundsCorner(_) => 0.0,
    };
    Vec3::new(
        point.x as f32,
        (elevation * height_factor) as f32,
        point.y as f32,
    )
}

/// Triangulate a center's polygon in 3D
///
/// One triangle per bounding edge with two corners, plus up to two closing
/// triangles for border polygons. Every triangle is wound counter-clockwise
/// when seen from +Y. Returns an empty list for an unknown center.
pub fn triangulate_center(graph: &Graph, center: usize, height_factor: f64) -> Vec<[Vec3; 3]> {
    graph
        .polygon_triangles(center)
        .into_iter()
        .map(|[a, b, c]| {
            let a = lift(graph, a, height_factor);
            let b = lift(graph, b, height_factor);
            let c = lift(graph, c, height_factor);
            if (b - a).cross(c - a).y < 0.0 {
                [a, c, b]
            } else {
                [a, b, c]
            }
        })
        .collect()
}

/// Vertices and indices of one polygon, deduplicated by exact position
struct PolygonMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl PolygonMesh {
    fn from_triangles(triangles: &[[Vec3; 3]]) -> Self {
        let mut mesh = PolygonMesh {
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::with_capacity(triangles.len() * 3),
        };
        for triangle in triangles {
            let [a, b, c] = *triangle;
            let face = (b - a).cross(c - a);
            for p in triangle {
                let slot = match mesh.positions.iter().position(|q| q == p) {
                    Some(slot) => slot,
                    None => {
                        mesh.positions.push(*p);
                        mesh.normals.push(Vec3::ZERO);
                        mesh.positions.len() - 1
                    }
                };
                mesh.normals[slot] += face;
                mesh.indices.push(slot as u32);
            }
        }
        for n in &mut mesh.normals {
            *n = n.try_normalize().unwrap_or(Vec3::Y);
        }
        mesh
    }

    fn append_to(&self, buffer: &mut MeshBuffer) {
        let base = buffer.positions.len() as u32;
        buffer
            .positions
            .extend(self.positions.iter().map(|p| p.to_array()));
        buffer
            .normals
            .extend(self.normals.iter().map(|n| n.to_array()));
        buffer.indices.extend(self.indices.iter().map(|i| base + i));
    }
}

/// Emit batched mesh buffers for every center of the graph
///
/// Each polygon is appended to the open buffer of its material; a new buffer
/// is opened when the polygon would push it past `max_batch_vertices`. A
/// polygon larger than the budget on its own is split into single triangles.
/// Buffers come out ordered by material name, then creation order.
pub fn emit_mesh<M>(graph: &Graph, mapper: &M, options: &MeshOptions) -> Vec<MeshBuffer>
where
    M: MaterialMapper + ?Sized,
{
    let budget = options.max_batch_vertices.max(3);
    let mut groups: BTreeMap<String, Vec<MeshBuffer>> = BTreeMap::new();

    for center in graph.centers() {
        let triangles = triangulate_center(graph, center.index, options.height_factor);
        if triangles.is_empty() {
            continue;
        }
        let material = mapper.material(center);

        let whole = PolygonMesh::from_triangles(&triangles);
        let pieces = if whole.positions.len() <= budget {
            vec![whole]
        } else {
            triangles
                .iter()
                .map(|t| PolygonMesh::from_triangles(std::slice::from_ref(t)))
                .collect()
        };

        let buffers = groups.entry(material.name.clone()).or_default();
        for piece in pieces {
            let fits = buffers
                .last()
                .is_some_and(|b| b.vertex_count() + piece.positions.len() <= budget);
            if !fits {
                buffers.push(MeshBuffer::new(material.clone()));
            }
            if let Some(buffer) = buffers.last_mut() {
                piece.append_to(buffer);
            }
        }
    }

    let meshes: Vec<MeshBuffer> = groups.into_values().flatten().collect();
    log::debug!(
        "Emitted {} mesh buffers, {} triangles",
        meshes.len(),
        meshes.iter().map(|m| m.triangle_count()).sum::<usize>()
    );
    meshes
}
