//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics,
//! so a scenario can collect every failure in one pass.

use std::collections::HashMap;

use geom_kernel::{KernelIntrospect, KernelSolidHandle, RenderMesh};
use shape_ops::KernelBundle;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

// ── Mesh Oracles ────────────────────────────────────────────────────────────

/// Vertices closer than this are welded before edge counting.
const WELD_TOLERANCE: f64 = 1e-5;

/// Check that a triangle mesh is closed and consistently wound: after
/// welding coincident vertices, every edge is used once in each direction.
pub fn check_closed_mesh(mesh: &RenderMesh) -> OracleVerdict {
    let mut canonical: HashMap<[i64; 3], u32> = HashMap::new();
    let welded: Vec<u32> = mesh
        .vertices
        .chunks_exact(3)
        .map(|v| {
            let q = |c: f32| (c as f64 / WELD_TOLERANCE).round() as i64;
            let next = canonical.len() as u32;
            *canonical.entry([q(v[0]), q(v[1]), q(v[2])]).or_insert(next)
        })
        .collect();

    let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
    for tri in mesh.indices.chunks_exact(3) {
        let Some(ids) = tri
            .iter()
            .map(|&i| welded.get(i as usize).copied())
            .collect::<Option<Vec<u32>>>()
        else {
            return OracleVerdict::fail(
                "closed_mesh",
                format!("triangle {:?} indexes past {} vertices", tri, welded.len()),
            );
        };
        for k in 0..3 {
            let (a, b) = (ids[k], ids[(k + 1) % 3]);
            if a != b {
                *directed.entry((a, b)).or_insert(0) += 1;
            }
        }
    }

    if directed.is_empty() {
        return OracleVerdict::fail("closed_mesh", "mesh has no edges".to_string());
    }

    let bad: Vec<((u32, u32), usize, usize)> = directed
        .iter()
        .filter_map(|(&(a, b), &forward)| {
            let backward = directed.get(&(b, a)).copied().unwrap_or(0);
            (forward != 1 || backward != 1).then_some(((a, b), forward, backward))
        })
        .collect();

    if bad.is_empty() {
        OracleVerdict::pass(
            "closed_mesh",
            format!("{} edges, each used once per direction", directed.len() / 2),
        )
    } else {
        OracleVerdict::fail(
            "closed_mesh",
            format!(
                "{} open or non-manifold edges: {:?}",
                bad.len(),
                &bad[..bad.len().min(5)]
            ),
        )
    }
}

// ── Solid Oracles ───────────────────────────────────────────────────────────

/// Check that the solid encloses a positive volume.
pub fn check_positive_volume(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
) -> OracleVerdict {
    match introspect.volume(solid) {
        Ok(v) if v > 0.0 => OracleVerdict::pass_val("positive_volume", format!("volume {:.6}", v), v),
        Ok(v) => OracleVerdict::fail_val("positive_volume", format!("volume {:.6}", v), v),
        Err(e) => OracleVerdict::fail("positive_volume", format!("volume query failed: {}", e)),
    }
}

/// Check that the solid spans exactly `[lo, hi]` along Z.
pub fn check_z_span(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    lo: f64,
    hi: f64,
    tol: f64,
) -> OracleVerdict {
    let bbox = match introspect.bounding_box(solid) {
        Ok(b) => b,
        Err(e) => {
            return OracleVerdict::fail("z_span", format!("bounding box query failed: {}", e))
        }
    };
    let error = (bbox.min[2] - lo).abs().max((bbox.max[2] - hi).abs());
    let detail = format!(
        "z in [{:.6}, {:.6}], expected [{}, {}] (tol={})",
        bbox.min[2], bbox.max[2], lo, hi, tol
    );
    if error <= tol {
        OracleVerdict::pass_val("z_span", detail, error)
    } else {
        OracleVerdict::fail_val("z_span", detail, error)
    }
}

/// Check that the grip region `0 < z < grip` carries no thread geometry.
///
/// A plain cylinder section only has edges on its wall there (the seam);
/// helical groove edges have their centres near the axis.
pub fn check_plain_grip(
    introspect: &dyn KernelIntrospect,
    solid: &KernelSolidHandle,
    grip: f64,
    body_radius: f64,
    tol: f64,
) -> OracleVerdict {
    let edges = match introspect.measure_edges(solid) {
        Ok(edges) => edges,
        Err(e) => {
            return OracleVerdict::fail("plain_grip", format!("edge query failed: {}", e))
        }
    };
    let intruders: Vec<[f64; 3]> = edges
        .iter()
        .map(|(_, m)| m.centroid)
        .filter(|c| c[2] > tol && c[2] < grip - tol)
        .filter(|c| c[0].hypot(c[1]) < 0.5 * body_radius)
        .collect();

    if intruders.is_empty() {
        OracleVerdict::pass(
            "plain_grip",
            format!("no interior edges in z (0, {})", grip),
        )
    } else {
        OracleVerdict::fail(
            "plain_grip",
            format!(
                "{} edges inside the grip region, first centroids {:?}",
                intruders.len(),
                &intruders[..intruders.len().min(3)]
            ),
        )
    }
}

/// Check that two solids share at most `max_overlap` of volume, measured as
/// `vol(a) - vol(a - b)`. Intermediate results are released.
pub fn check_overlap_volume(
    kb: &mut dyn KernelBundle,
    a: &KernelSolidHandle,
    b: &KernelSolidHandle,
    max_overlap: f64,
) -> OracleVerdict {
    let total = match kb.volume(a) {
        Ok(v) => v,
        Err(e) => return OracleVerdict::fail("overlap_volume", format!("volume failed: {}", e)),
    };
    let pieces = match kb.boolean_subtract(a, b) {
        Ok(pieces) => pieces,
        Err(e) => {
            return OracleVerdict::fail("overlap_volume", format!("subtract failed: {}", e))
        }
    };
    let remaining: Result<f64, _> = pieces.iter().map(|p| kb.volume(p)).sum();
    kb.release_all(pieces);

    match remaining {
        Ok(remaining) => {
            let overlap = total - remaining;
            let detail = format!("overlap {:.6} of {:.6} (max {})", overlap, total, max_overlap);
            if overlap <= max_overlap {
                OracleVerdict::pass_val("overlap_volume", detail, overlap)
            } else {
                OracleVerdict::fail_val("overlap_volume", detail, overlap)
            }
        }
        Err(e) => OracleVerdict::fail("overlap_volume", format!("volume failed: {}", e)),
    }
}

/// Check that no radius exceeds `limit`.
pub fn check_radius_limit(radii: &[f64], limit: f64) -> OracleVerdict {
    let worst = radii.iter().copied().fold(0.0f64, f64::max);
    let detail = format!("{} radii, largest {:.6}, limit {:.6}", radii.len(), worst, limit);
    if worst <= limit + 1e-12 {
        OracleVerdict::pass_val("radius_limit", detail, worst)
    } else {
        OracleVerdict::fail_val("radius_limit", detail, worst)
    }
}
