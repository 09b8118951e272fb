use std::f64::consts::TAU;

use geom_kernel::KernelSolidHandle;
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Largest |y| a profile point may have and still count as lying in the XZ plane.
const PLANE_TOLERANCE: f64 = 1e-9;

/// Revolve a closed polyline in the X–Z half-plane a full turn about Z.
///
/// Used for the conical lead-in tool at a shank tip. The polyline is closed
/// implicitly from the last point back to the first.
pub fn chamfer_profile(
    kb: &mut dyn KernelBundle,
    points: &[[f64; 3]],
) -> Result<KernelSolidHandle, OpError> {
    if points.len() < 3 {
        return Err(OpError::InvalidParameter {
            reason: format!("chamfer profile needs at least 3 points, got {}", points.len()),
        });
    }
    if let Some(p) = points.iter().find(|p| p[1].abs() > PLANE_TOLERANCE) {
        return Err(OpError::InvalidParameter {
            reason: format!("chamfer profile point {:?} is off the XZ plane", p),
        });
    }
    if let Some(p) = points.iter().find(|p| p[0] < -PLANE_TOLERANCE) {
        return Err(OpError::InvalidParameter {
            reason: format!("chamfer profile point {:?} crosses the Z axis", p),
        });
    }
    debug!(points = points.len(), "chamfer profile");

    let face = kb.make_polygon_face(points)?;
    Ok(kb.revolve_face(face, [0.0; 3], [0.0, 0.0, 1.0], TAU)?)
}
