use std::f64::consts::PI;

use fastener_types::BoltParameters;
use geom_kernel::Transform;
use shape_ops::{
    boolean_keep_largest, clamped_edge_fillet, junction_fillet, BooleanKind, Diagnostics,
    KernelBundle,
};
use tracing::{debug, info, instrument};

use crate::head::build_head;
use crate::shank::build_shank;
use crate::types::{BuildError, BuildOptions, BuildOutput, Stage, StageExt};

/// Axial overlap between head and shank for lengths above [`SHORT_SHANK`].
pub const HEAD_OVERLAP: f64 = 0.1;

/// Shanks at or below this length overlap the head by half their length.
pub const SHORT_SHANK: f64 = 0.2;

/// Edge fillets are clamped to this share of the major diameter.
pub const BOLT_FILLET_CLAMP: f64 = 0.1;

/// Axial overlap used when fusing the head onto a shank of `length`.
pub fn head_overlap(length: f64) -> f64 {
    if length <= SHORT_SHANK {
        0.5 * length
    } else {
        HEAD_OVERLAP
    }
}

/// Build a complete bolt: tip at z = 0, head on top.
#[instrument(
    skip(kb, params, options),
    fields(d = params.thread.major_diameter, l = params.shank.total_length)
)]
pub fn build_bolt(
    kb: &mut dyn KernelBundle,
    params: &BoltParameters,
    options: &BuildOptions,
) -> Result<BuildOutput, BuildError> {
    params.thread.validate()?;
    params.shank.validate()?;
    params.head.validate()?;

    let mut diagnostics = Diagnostics::default();
    let length = params.shank.total_length;

    let shank = build_shank(kb, &params.thread, &params.shank, &mut diagnostics)?;
    // Flip so the chamfered tip points down and the grip meets the head.
    let shank = kb
        .place(
            shank,
            &Transform::rotation([0.0, 0.0, 0.5 * length], [1.0, 0.0, 0.0], PI),
        )
        .at(Stage::Shank, "flip")?;

    let head = match build_head(
        kb,
        &params.thread,
        &params.head,
        options.hex_construction,
        &mut diagnostics,
    ) {
        Ok(head) => head,
        Err(e) => {
            kb.release(shank);
            return Err(e);
        }
    };
    let overlap = head_overlap(length);
    let junction = length - overlap;
    debug!(overlap, junction, "placing head");
    let head = match kb.place(head, &Transform::translation([0.0, 0.0, junction])) {
        Ok(head) => head,
        Err(e) => {
            kb.release(shank);
            return Err(e).at(Stage::Head, "head placement");
        }
    };

    let mut solid =
        boolean_keep_largest(kb, shank, head, BooleanKind::Union, "fuse").at(Stage::Fuse, "fuse")?;

    if params.head.underhead_fillet_radius > 0.0 {
        let (rounded, report) = junction_fillet(
            kb,
            solid,
            params.head.underhead_fillet_radius,
            junction,
            "underhead",
        );
        solid = rounded;
        diagnostics.fillets.push(report);
    }

    if params.shank.edge_fillet_radius > 0.0 {
        let (rounded, report) = clamped_edge_fillet(
            kb,
            solid,
            params.shank.edge_fillet_radius,
            BOLT_FILLET_CLAMP * params.thread.major_diameter,
            "bolt edges",
        );
        solid = rounded;
        diagnostics.fillets.push(report);
    }

    info!(
        warnings = diagnostics.warnings.len(),
        fillets = diagnostics.fillets.len(),
        "bolt built"
    );
    Ok(BuildOutput {
        solid,
        diagnostics,
    })
}
