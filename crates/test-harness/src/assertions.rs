//! Assertion helpers with diagnostic output.
//!
//! Every failure includes expected versus actual values and the scenario
//! context string.

use geom_kernel::RenderMesh;

use crate::helpers::HarnessError;
use crate::oracle::OracleVerdict;

/// Fail with every failed verdict listed, not just the first.
pub fn assert_verdicts(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    let failed: Vec<String> = verdicts
        .iter()
        .filter(|v| !v.passed)
        .map(|v| format!("  {}: {}", v.oracle_name, v.detail))
        .collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::OracleFailure {
            oracle: ctx.to_string(),
            detail: format!("{} of {} checks failed:\n{}", failed.len(), verdicts.len(), failed.join("\n")),
        })
    }
}

/// Assert the mesh bounding box matches expected values within tolerance.
pub fn assert_bounding_box(
    mesh: &RenderMesh,
    expected_min: [f64; 3],
    expected_max: [f64; 3],
    tol: f64,
    ctx: &str,
) -> Result<(), HarnessError> {
    let bbox = crate::helpers::mesh_bounding_box(mesh).ok_or_else(|| {
        HarnessError::AssertionFailed {
            detail: format!("[{}] mesh has no vertices", ctx),
        }
    })?;

    for i in 0..3 {
        if (bbox.min[i] - expected_min[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] bounding box min[{}]: expected {:.3}, got {:.3} (tol={})",
                    ctx, i, expected_min[i], bbox.min[i], tol,
                ),
            });
        }
        if (bbox.max[i] - expected_max[i]).abs() > tol {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] bounding box max[{}]: expected {:.3}, got {:.3} (tol={})",
                    ctx, i, expected_max[i], bbox.max[i], tol,
                ),
            });
        }
    }
    Ok(())
}

/// Assert that a diagnostics warning list mentions `needle`.
pub fn assert_warned(warnings: &[String], needle: &str, ctx: &str) -> Result<(), HarnessError> {
    if warnings.iter().any(|w| w.contains(needle)) {
        Ok(())
    } else {
        Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected a warning containing {:?}. Warnings: [{}]",
                ctx,
                needle,
                warnings.join("; "),
            ),
        })
    }
}
