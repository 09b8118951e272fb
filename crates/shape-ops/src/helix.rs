use geom_kernel::{HelixPath, KernelSolidHandle};
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// Sweep a closed profile along a helix on a cylinder of `guide_diameter`.
///
/// The helix covers `[0, length]` plus a quarter pitch past both ends, so the
/// result is always longer than `length`. Trimming is left to the caller.
pub fn helical_sweep(
    kb: &mut dyn KernelBundle,
    profile: &[[f64; 3]],
    guide_diameter: f64,
    pitch: f64,
    length: f64,
) -> Result<KernelSolidHandle, OpError> {
    if !(pitch > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("helix pitch must be positive, got {}", pitch),
        });
    }
    if !(guide_diameter > 0.0) || !(length > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!(
                "helix needs positive diameter and length, got d={} l={}",
                guide_diameter, length
            ),
        });
    }
    if profile.len() < 3 {
        return Err(OpError::InvalidParameter {
            reason: format!("sweep profile needs at least 3 points, got {}", profile.len()),
        });
    }

    let path = HelixPath::new(0.5 * guide_diameter, pitch, length);
    debug!(
        radius = path.radius,
        pitch,
        turns = path.turns(),
        "helical sweep"
    );
    Ok(kb.sweep_helix(profile, &path)?)
}
