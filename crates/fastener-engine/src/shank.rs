//! Threaded shank: an over-length threaded blank, an optional plain grip
//! near z = 0, trimmed to length and chamfered at the tip (z = L).
//!
//! The grip is kept plain by clearing the thread tool over `[0, grip]`
//! before the cut. The blank surface is then never cut there, and no face
//! of the result has to be fused onto a coplanar one.

use fastener_types::{ShankSpec, ThreadSpec};
use geom_kernel::{KernelSolidHandle, Transform};
use shape_ops::{
    boolean_keep_largest, chamfer_profile, thread_tool, BooleanKind, Diagnostics, KernelBundle,
};
use tracing::{debug, instrument, warn};

use crate::types::{BuildError, Stage, StageExt};

/// Extra blank length beyond the requested length, in pitches.
pub const BUILD_MARGIN_PITCHES: f64 = 4.0;

/// Full threads that must remain below the grip.
pub const MIN_THREAD_PITCHES: f64 = 3.0;

/// How far the grip mask reaches below the bottom of the thread tool.
const GRIP_MASK_UNDERCUT: f64 = 1.0;

/// Extra height of the trim mask past the end of the blank.
const TRIM_MASK_MARGIN: f64 = 10.0;

/// Grip length actually used: at most `L - 3p`, never negative.
pub fn effective_grip(thread: &ThreadSpec, shank: &ShankSpec) -> f64 {
    let limit = (shank.total_length - MIN_THREAD_PITCHES * thread.pitch).max(0.0);
    shank.grip_length.clamp(0.0, limit)
}

/// Lead-in chamfer section at the tip of a shank of length `length`.
///
/// A 45° notch whose flank meets the tip plane at radius `d/2 - p` and the
/// wall at `L - d/2 - p`. The section reaches half a pitch past the tip so
/// its top face stays clear of the tip face.
pub fn chamfer_points(thread: &ThreadSpec, length: f64) -> [[f64; 3]; 3] {
    let d = thread.major_diameter;
    let p = thread.pitch;
    let lift = 0.5 * p;
    [
        [(0.5 * d - p - lift).max(0.0), 0.0, length + lift],
        [d, 0.0, length + lift],
        [d, 0.0, length - 0.5 * d - p],
    ]
}

/// Build a shank spanning z ∈ [0, L] along +Z.
#[instrument(
    skip(kb, thread, shank, diagnostics),
    fields(d = thread.major_diameter, p = thread.pitch, l = shank.total_length)
)]
pub fn build_shank(
    kb: &mut dyn KernelBundle,
    thread: &ThreadSpec,
    shank: &ShankSpec,
    diagnostics: &mut Diagnostics,
) -> Result<KernelSolidHandle, BuildError> {
    thread.validate()?;
    shank.validate()?;

    let length = shank.total_length;
    let pitch = thread.pitch;
    let radius = 0.5 * shank.body_diameter();

    let grip = effective_grip(thread, shank);
    if grip < shank.grip_length {
        warn!(
            requested = shank.grip_length,
            applied = grip,
            "grip length leaves too few threads, clamping"
        );
        diagnostics.warn(format!(
            "grip length {} clamped to {} to keep {} threads",
            shank.grip_length, grip, MIN_THREAD_PITCHES
        ));
    }

    if length - grip < pitch {
        warn!(length, grip, pitch, "threaded length shorter than one pitch, building plain rod");
        diagnostics.warn(format!(
            "threaded length {} is shorter than the pitch {}; shank left unthreaded",
            length - grip,
            pitch
        ));
        return kb.make_cylinder(radius, length).at(Stage::Shank, "plain rod");
    }

    let build_length = length + BUILD_MARGIN_PITCHES * pitch;
    debug!(radius, grip, build_length, "threaded blank");

    let blank = kb.make_cylinder(radius, build_length).at(Stage::Shank, "blank")?;
    let mut tool = match thread_tool(kb, thread.minor_diameter(), pitch, build_length) {
        Ok(tool) => tool,
        Err(e) => {
            kb.release(blank);
            return Err(e).at(Stage::Shank, "thread tool");
        }
    };
    if grip > 1e-6 {
        tool = match clear_grip(kb, tool, thread, grip) {
            Ok(tool) => tool,
            Err(e) => {
                kb.release(blank);
                return Err(e);
            }
        };
    }
    let mut rod = boolean_keep_largest(kb, blank, tool, BooleanKind::Subtract, "thread cut")
        .at(Stage::Shank, "thread cut")?;

    let trim = cylinder_at(
        kb,
        thread.major_diameter,
        build_length + TRIM_MASK_MARGIN,
        length,
    );
    let trim = match trim {
        Ok(trim) => trim,
        Err(e) => {
            kb.release(rod);
            return Err(e);
        }
    };
    rod = boolean_keep_largest(kb, rod, trim, BooleanKind::Subtract, "length trim")
        .at(Stage::Shank, "length trim")?;

    let chamfer = match chamfer_profile(kb, &chamfer_points(thread, length)) {
        Ok(chamfer) => chamfer,
        Err(e) => {
            kb.release(rod);
            return Err(e).at(Stage::Shank, "chamfer tool");
        }
    };
    boolean_keep_largest(kb, rod, chamfer, BooleanKind::Subtract, "tip chamfer")
        .at(Stage::Shank, "tip chamfer")
}

/// Remove the part of the thread tool below `grip`, so the cut leaves the
/// blank plain over [0, grip].
fn clear_grip(
    kb: &mut dyn KernelBundle,
    tool: KernelSolidHandle,
    thread: &ThreadSpec,
    grip: f64,
) -> Result<KernelSolidHandle, BuildError> {
    // The tool starts at most 3/4 of a pitch below z = 0.
    let undercut = GRIP_MASK_UNDERCUT + thread.pitch;
    let mask = match cylinder_at(kb, thread.major_diameter, grip + undercut, -undercut) {
        Ok(mask) => mask,
        Err(e) => {
            kb.release(tool);
            return Err(e);
        }
    };
    boolean_keep_largest(kb, tool, mask, BooleanKind::Subtract, "grip clear")
        .at(Stage::Shank, "grip clear")
}

/// Cylinder of the given radius and height with its base at `z`.
fn cylinder_at(
    kb: &mut dyn KernelBundle,
    radius: f64,
    height: f64,
    z: f64,
) -> Result<KernelSolidHandle, BuildError> {
    let cylinder = kb.make_cylinder(radius, height).at(Stage::Shank, "mask")?;
    kb.place(cylinder, &Transform::translation([0.0, 0.0, z]))
        .at(Stage::Shank, "mask placement")
}
