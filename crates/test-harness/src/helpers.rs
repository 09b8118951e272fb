//! Helper functions: error type, parameter fixtures, mesh math.

use fastener_engine::BuildError;
use fastener_types::{BoltParameters, HeadType, LengthUnit, ShankSpec, ThreadSpec};
use geom_kernel::{BoundingBox, KernelError, RenderMesh};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),
}

// ── Fixtures ────────────────────────────────────────────────────────────────

/// M6x1 thread with a 20 long shank, 5 of grip and 0.1 of body undercut.
pub fn example_shank() -> (ThreadSpec, ShankSpec) {
    let thread = ThreadSpec::new(6.0, 1.0);
    let shank = ShankSpec {
        grip_length: 5.0,
        body_tolerance: 0.1,
        ..ShankSpec::new(6.0, 20.0)
    };
    (thread, shank)
}

/// Standard millimetre bolt with its nut enabled.
///
/// Panics on an unknown designation; fixtures only use table sizes.
pub fn standard_bolt(designation: &str, length: f64, head: HeadType) -> BoltParameters {
    let mut params =
        BoltParameters::from_designation(designation, length, head, LengthUnit::Millimeter)
            .unwrap_or_else(|e| panic!("fixture {}: {}", designation, e));
    params.nut.generate = true;
    params
}

// ── Mesh Math ───────────────────────────────────────────────────────────────

/// Vertex bounds of a mesh, or `None` when it has no vertices.
pub fn mesh_bounding_box(mesh: &RenderMesh) -> Option<BoundingBox> {
    BoundingBox::from_points(
        mesh.vertices
            .chunks_exact(3)
            .map(|v| [v[0] as f64, v[1] as f64, v[2] as f64]),
    )
}

/// Enclosed volume of a triangle mesh by the divergence theorem. Positive
/// for closed, outward-wound meshes.
pub fn mesh_signed_volume(mesh: &RenderMesh) -> f64 {
    geom_kernel::tessellation::triangles(mesh)
        .map(|[a, b, c]| {
            let a = a.map(f64::from);
            let b = b.map(f64::from);
            let c = c.map(f64::from);
            a[0] * (b[1] * c[2] - b[2] * c[1])
                + a[1] * (b[2] * c[0] - b[0] * c[2])
                + a[2] * (b[0] * c[1] - b[1] * c[0])
        })
        .sum::<f64>()
        / 6.0
}
