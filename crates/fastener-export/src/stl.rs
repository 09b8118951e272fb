//! Binary STL export with a deflection derived from the part's size.

use geom_kernel::{BoundingBox, KernelError, KernelSolidHandle, MeshTolerance, RenderMesh};
use serde::{Deserialize, Serialize};
use shape_ops::KernelBundle;
use tracing::debug;

use crate::errors::ExportError;

/// Linear deflection bounds as fractions of the bounding-box diagonal.
pub const MIN_LINEAR_FRACTION: f64 = 0.001;
pub const MAX_LINEAR_FRACTION: f64 = 0.005;
/// Angular deflection bounds in radians.
pub const MIN_ANGULAR_DEFLECTION: f64 = 0.25;
pub const MAX_ANGULAR_DEFLECTION: f64 = 0.5;

/// Requested mesh fineness. Values outside the allowed bands are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StlOptions {
    pub linear_fraction: f64,
    pub angular_deflection: f64,
}

impl Default for StlOptions {
    fn default() -> Self {
        Self {
            linear_fraction: 0.002,
            angular_deflection: 0.35,
        }
    }
}

/// Tessellation tolerance for a solid with the given bounds.
pub fn stl_tolerance(bbox: &BoundingBox, options: &StlOptions) -> Result<MeshTolerance, ExportError> {
    let diagonal = bbox.diagonal();
    if !(diagonal > 0.0) {
        return Err(ExportError::EmptyMesh);
    }
    let fraction = options
        .linear_fraction
        .clamp(MIN_LINEAR_FRACTION, MAX_LINEAR_FRACTION);
    Ok(MeshTolerance {
        linear: fraction * diagonal,
        angular: options
            .angular_deflection
            .clamp(MIN_ANGULAR_DEFLECTION, MAX_ANGULAR_DEFLECTION),
    })
}

/// Tessellate a solid and encode it as binary STL.
pub fn export_stl(
    kb: &mut dyn KernelBundle,
    solid: &KernelSolidHandle,
    name: &str,
    options: &StlOptions,
) -> Result<Vec<u8>, ExportError> {
    let bbox = kb.bounding_box(solid)?;
    let tolerance = stl_tolerance(&bbox, options)?;
    debug!(linear = tolerance.linear, angular = tolerance.angular, "tessellating for STL");
    let mesh = kb.tessellate(solid, &tolerance)?;
    encode_binary_stl(&mesh, name)
}

/// Binary STL layout:
/// - 80-byte header
/// - u32 triangle count (little-endian)
/// - per triangle: normal, 3 vertices (all 3×f32), u16 attribute = 50 bytes
pub fn encode_binary_stl(mesh: &RenderMesh, name: &str) -> Result<Vec<u8>, ExportError> {
    let tri_count = mesh.triangle_count();
    if tri_count == 0 {
        return Err(ExportError::EmptyMesh);
    }

    let vertex_count = mesh.vertices.len() / 3;
    if let Some(&idx) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(KernelError::TessellationFailed {
            reason: format!("index {} out of range (vertex count = {})", idx, vertex_count),
        }
        .into());
    }

    let mut buf = Vec::with_capacity(84 + tri_count * 50);

    let header = format!("binary STL: {}", name);
    let header_bytes = header.as_bytes();
    buf.extend_from_slice(&header_bytes[..header_bytes.len().min(80)]);
    buf.resize(80, 0u8);

    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for tri in geom_kernel::tessellation::triangles(mesh) {
        for component in facet_normal(&tri) {
            buf.extend_from_slice(&component.to_le_bytes());
        }
        for vertex in &tri {
            for component in vertex {
                buf.extend_from_slice(&component.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    Ok(buf)
}

fn facet_normal(tri: &[[f32; 3]; 3]) -> [f32; 3] {
    let a = [
        tri[1][0] - tri[0][0],
        tri[1][1] - tri[0][1],
        tri[1][2] - tri[0][2],
    ];
    let b = [
        tri[2][0] - tri[0][0],
        tri[2][1] - tri[0][1],
        tri[2][2] - tri[0][2],
    ];
    let n = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len > 1e-12 {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0, 0.0, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geom_kernel::{Kernel, MockKernel};

    #[test]
    fn test_tolerance_scales_with_diagonal() {
        let bbox = BoundingBox::new([0.0; 3], [30.0, 40.0, 0.0]);
        let tol = stl_tolerance(&bbox, &StlOptions::default()).unwrap();
        assert_relative_eq!(tol.linear, 0.1, epsilon = 1e-12);
        assert_relative_eq!(tol.angular, 0.35);
    }

    #[test]
    fn test_tolerance_is_clamped() {
        let bbox = BoundingBox::new([0.0; 3], [100.0, 0.0, 0.0]);
        let coarse = StlOptions {
            linear_fraction: 0.1,
            angular_deflection: 2.0,
        };
        let tol = stl_tolerance(&bbox, &coarse).unwrap();
        assert_relative_eq!(tol.linear, 0.5, epsilon = 1e-12);
        assert_relative_eq!(tol.angular, MAX_ANGULAR_DEFLECTION);

        let fine = StlOptions {
            linear_fraction: 0.0,
            angular_deflection: 0.0,
        };
        let tol = stl_tolerance(&bbox, &fine).unwrap();
        assert_relative_eq!(tol.linear, 0.1, epsilon = 1e-12);
        assert_relative_eq!(tol.angular, MIN_ANGULAR_DEFLECTION);
    }

    #[test]
    fn test_degenerate_bounds_rejected() {
        let point = BoundingBox::new([1.0; 3], [1.0; 3]);
        assert!(matches!(
            stl_tolerance(&point, &StlOptions::default()),
            Err(ExportError::EmptyMesh)
        ));
    }

    #[test]
    fn test_binary_layout() {
        let mut kernel = MockKernel::new();
        let cube = kernel.make_box([2.0; 3]).unwrap();
        let bytes = export_stl(&mut kernel, &cube, "cube", &StlOptions::default()).unwrap();

        assert!(bytes.starts_with(b"binary STL: cube"));
        let count = u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]);
        assert_eq!(count, 12);
        assert_eq!(bytes.len(), 84 + 12 * 50);
    }

    #[test]
    fn test_normals_follow_winding() {
        let mesh = RenderMesh {
            vertices: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![],
            indices: vec![0, 1, 2],
            face_ranges: vec![],
        };
        let bytes = encode_binary_stl(&mesh, "tri").unwrap();
        let nz = f32::from_le_bytes([bytes[92], bytes[93], bytes[94], bytes[95]]);
        assert_relative_eq!(nz, 1.0);
    }

    #[test]
    fn test_empty_and_corrupt_meshes() {
        assert!(matches!(
            encode_binary_stl(&RenderMesh::default(), "empty"),
            Err(ExportError::EmptyMesh)
        ));
        let corrupt = RenderMesh {
            vertices: vec![0.0; 6],
            normals: vec![],
            indices: vec![0, 1, 2],
            face_ranges: vec![],
        };
        assert!(matches!(
            encode_binary_stl(&corrupt, "bad"),
            Err(ExportError::Kernel(KernelError::TessellationFailed { .. }))
        ));
    }
}
