//! Tessellation wrapper and mesh-based measurement.
//!
//! Wraps truck-meshalgo to produce a RenderMesh with FaceRange entries, and
//! derives volumes and bounds from the same triangulation.

use crate::types::{BoundingBox, FaceRange, KernelError, KernelId, MeshTolerance, RenderMesh};
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};

type TruckSolid = truck_modeling::Solid;
type TruckShell = truck_modeling::Shell;

/// Tessellate a truck Solid into a RenderMesh with per-face tracking.
pub fn tessellate_solid(
    solid: &TruckSolid,
    tolerance: &MeshTolerance,
    next_id: &mut u64,
) -> std::result::Result<RenderMesh, KernelError> {
    if !(tolerance.linear > 0.0) {
        return Err(KernelError::TessellationFailed {
            reason: format!("linear tolerance must be positive, got {}", tolerance.linear),
        });
    }
    let meshed_solid = solid.triangulation(tolerance.linear);

    let mut mesh = RenderMesh::default();

    for shell in meshed_solid.boundaries().iter() {
        for face in shell.face_iter() {
            let face_id = KernelId(*next_id);
            *next_id += 1;

            let maybe_mesh: Option<PolygonMesh> = face.surface();
            let Some(face_mesh) = maybe_mesh else {
                continue;
            };

            // If face is inverted, the mesh needs inversion too
            let face_mesh = if !face.orientation() {
                let mut m = face_mesh;
                m.invert();
                m
            } else {
                face_mesh
            };

            let start_index = mesh.indices.len() as u32;
            append_polygon(&mut mesh, &face_mesh);
            let end_index = mesh.indices.len() as u32;
            if end_index > start_index {
                mesh.face_ranges.push(FaceRange {
                    face_id,
                    start_index,
                    end_index,
                });
            }
        }
    }

    if mesh.indices.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "solid produced no triangles".to_string(),
        });
    }
    Ok(mesh)
}

fn append_polygon(mesh: &mut RenderMesh, polygon: &PolygonMesh) {
    let base_vertex = (mesh.vertices.len() / 3) as u32;
    let positions = polygon.positions();
    let normals = polygon.normals();

    for pos in positions {
        mesh.vertices.extend([pos[0] as f32, pos[1] as f32, pos[2] as f32]);
    }
    if normals.len() == positions.len() {
        for norm in normals {
            mesh.normals.extend([norm[0] as f32, norm[1] as f32, norm[2] as f32]);
        }
    } else {
        for _ in 0..positions.len() {
            mesh.normals.extend([0.0, 0.0, 1.0]);
        }
    }

    for face in polygon.faces().face_iter() {
        // Fan-triangulate quads and larger polygons.
        for k in 1..face.len().saturating_sub(1) {
            mesh.indices.extend([
                face[0].pos as u32 + base_vertex,
                face[k].pos as u32 + base_vertex,
                face[k + 1].pos as u32 + base_vertex,
            ]);
        }
    }
}

/// Signed enclosed volume of a triangulated surface (divergence theorem).
/// Positive for outward-oriented closed surfaces.
pub fn signed_volume(mesh: &PolygonMesh) -> f64 {
    let positions = mesh.positions();
    let mut volume = 0.0;
    for face in mesh.faces().face_iter() {
        let a = positions[face[0].pos];
        for k in 1..face.len().saturating_sub(1) {
            let b = positions[face[k].pos];
            let c = positions[face[k + 1].pos];
            volume += a[0] * (b[1] * c[2] - b[2] * c[1])
                + a[1] * (b[2] * c[0] - b[0] * c[2])
                + a[2] * (b[0] * c[1] - b[1] * c[0]);
        }
    }
    volume / 6.0
}

pub fn mesh_bounds(mesh: &PolygonMesh) -> Option<BoundingBox> {
    BoundingBox::from_points(mesh.positions().iter().map(|p| [p[0], p[1], p[2]]))
}

pub fn solid_mesh(solid: &TruckSolid, tolerance: f64) -> PolygonMesh {
    solid.triangulation(tolerance).to_polygon()
}

pub fn shell_mesh(shell: &TruckShell, tolerance: f64) -> PolygonMesh {
    shell.triangulation(tolerance).to_polygon()
}

/// Convert a kernel mesh back into flat f64 triangles, for writers.
pub fn triangles(mesh: &RenderMesh) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
    mesh.indices.chunks_exact(3).map(move |tri| {
        let v = |i: u32| {
            let i = i as usize * 3;
            [mesh.vertices[i], mesh.vertices[i + 1], mesh.vertices[i + 2]]
        };
        [v(tri[0]), v(tri[1]), v(tri[2])]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_volume_and_bounds_from_mesh() {
        let solid = primitives::make_box(1.0, 2.0, 3.0);
        let mesh = solid_mesh(&solid, 0.01);
        assert_relative_eq!(signed_volume(&mesh).abs(), 6.0, epsilon = 1e-9);

        let bbox = mesh_bounds(&mesh).unwrap();
        assert_relative_eq!(bbox.max[2] - bbox.min[2], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tessellate_box_face_ranges_cover_indices() {
        let solid = primitives::make_box(1.0, 1.0, 1.0);
        let mut next_id = 1;
        let mesh = tessellate_solid(&solid, &MeshTolerance::linear(0.1), &mut next_id).unwrap();

        assert!(!mesh.vertices.is_empty());
        assert_eq!(mesh.vertices.len(), mesh.normals.len());
        assert_eq!(mesh.face_ranges.len(), 6, "Box should have 6 face ranges");

        let covered: u32 = mesh
            .face_ranges
            .iter()
            .map(|r| r.end_index - r.start_index)
            .sum();
        assert_eq!(covered, mesh.indices.len() as u32);
        assert_eq!(triangles(&mesh).count(), mesh.triangle_count());
    }

    #[test]
    fn test_zero_tolerance_rejected() {
        let solid = primitives::make_box(1.0, 1.0, 1.0);
        let mut next_id = 1;
        assert!(tessellate_solid(&solid, &MeshTolerance::linear(0.0), &mut next_id).is_err());
    }
}
