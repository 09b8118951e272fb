//! Thread-cutting tool: a 60° tooth section swept along a helix.

use geom_kernel::KernelSolidHandle;

use crate::helix::helical_sweep;
use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// ISO basic thread depth as a fraction of the pitch.
pub const THREAD_DEPTH_FACTOR: f64 = 0.614;

/// Radial margin on both sides of the tooth, as a fraction of the pitch.
pub const THREAD_CLEARANCE_FACTOR: f64 = 0.05;

/// Tooth cross-section in the XZ plane for a thread with the given minor
/// diameter: narrow near the root, one full pitch wide past the crest.
pub fn thread_profile_points(minor_diameter: f64, pitch: f64) -> [[f64; 3]; 4] {
    let r = 0.5 * minor_diameter;
    let margin = THREAD_CLEARANCE_FACTOR * pitch;
    let inner = r - margin;
    let outer = r + THREAD_DEPTH_FACTOR * pitch + margin;
    [
        [inner, 0.0, -pitch / 8.0],
        [inner, 0.0, pitch / 8.0],
        [outer, 0.0, pitch / 2.0],
        [outer, 0.0, -pitch / 2.0],
    ]
}

/// Helical tool that carves the thread groove when subtracted from a rod.
pub fn thread_tool(
    kb: &mut dyn KernelBundle,
    minor_diameter: f64,
    pitch: f64,
    length: f64,
) -> Result<KernelSolidHandle, OpError> {
    if !(minor_diameter > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!("minor diameter must be positive, got {}", minor_diameter),
        });
    }
    let profile = thread_profile_points(minor_diameter, pitch);
    helical_sweep(kb, &profile, minor_diameter, pitch, length)
}
