//! Nuts are cut with a scaled copy of the bolt's own threaded shank, so the
//! internal thread is always the complement of a real external one.

use fastener_types::{BoltParameters, ShankSpec};
use geom_kernel::{KernelSolidHandle, Transform};
use shape_ops::{
    boolean_keep_largest, clamped_edge_fillet, execute_boolean, hex_prism, select_largest,
    BooleanKind, Diagnostics, KernelBundle,
};
use tracing::{debug, info, instrument, warn};

use crate::shank::build_shank;
use crate::types::{BuildError, BuildOptions, BuildOutput, Stage, StageExt};

/// How far the cutter sticks out of each face of the nut.
pub const NUT_CUTTER_OVERLAP: f64 = 5.0;

/// Thickness of the washer face under a nut.
pub const NUT_WASHER_THICKNESS: f64 = 0.5;

/// Edge fillets are clamped to this share of the width across flats.
pub const NUT_FILLET_CLAMP: f64 = 0.1;

/// Radial scale applied to the cutter for the nut clearance.
pub fn clearance_scale(params: &BoltParameters) -> f64 {
    1.0 + params.nut.tolerance / params.thread.major_diameter
}

/// Build the nut for `params`, base at z = 0.
#[instrument(
    skip(kb, params, options),
    fields(d = params.thread.major_diameter, s = params.nut.width_across_flats)
)]
pub fn build_nut(
    kb: &mut dyn KernelBundle,
    params: &BoltParameters,
    options: &BuildOptions,
) -> Result<BuildOutput, BuildError> {
    params.thread.validate()?;
    params.nut.validate(&params.thread)?;

    let mut diagnostics = Diagnostics::default();
    let nut = &params.nut;
    let washer = if nut.washer_face_diameter > 0.0 {
        NUT_WASHER_THICKNESS
    } else {
        0.0
    };
    let height = nut.height + washer;

    let blank = nut_blank(kb, params, options, washer)?;

    let scale = clearance_scale(params);
    debug!(height, scale, "cutting nut thread");
    let cutter = match thread_cutter(kb, params, height, scale, &mut diagnostics) {
        Ok(cutter) => Some(cutter),
        Err(e) => {
            warn!(error = %e, "nut thread cutter failed, drilling a plain hole");
            diagnostics.warn(format!("thread cutter failed ({}); plain hole used", e));
            None
        }
    };

    let threaded = cutter.map(|cutter| {
        let cut = execute_boolean(kb, &blank, &cutter, BooleanKind::Subtract);
        kb.release(cutter);
        cut
    });
    let mut solid = match threaded {
        Some(Ok(solids)) => match select_largest(kb, solids) {
            Some(solid) => {
                kb.release(blank);
                solid
            }
            None => {
                warn!("nut thread cut produced no solids, drilling a plain hole");
                diagnostics.warn("thread cut produced no solids; plain hole used");
                through_hole(kb, blank, params, height, scale)?
            }
        },
        Some(Err(e)) => {
            warn!(error = %e, "nut thread cut failed, drilling a plain hole");
            diagnostics.warn(format!("thread cut failed ({}); plain hole used", e));
            through_hole(kb, blank, params, height, scale)?
        }
        None => through_hole(kb, blank, params, height, scale)?,
    };

    if nut.edge_fillet_radius > 0.0 {
        let (rounded, report) = clamped_edge_fillet(
            kb,
            solid,
            nut.edge_fillet_radius,
            NUT_FILLET_CLAMP * nut.width_across_flats,
            "nut edges",
        );
        solid = rounded;
        diagnostics.fillets.push(report);
    }

    info!(warnings = diagnostics.warnings.len(), "nut built");
    Ok(BuildOutput {
        solid,
        diagnostics,
    })
}

/// Hex body with an optional washer face underneath.
fn nut_blank(
    kb: &mut dyn KernelBundle,
    params: &BoltParameters,
    options: &BuildOptions,
    washer: f64,
) -> Result<KernelSolidHandle, BuildError> {
    let nut = &params.nut;
    let body = hex_prism(
        kb,
        nut.width_across_flats,
        nut.height,
        options.hex_construction,
    )
    .at(Stage::Nut, "hex blank")?;
    if washer <= 0.0 {
        return Ok(body);
    }

    let body = kb
        .place(body, &Transform::translation([0.0, 0.0, washer]))
        .at(Stage::Nut, "blank placement")?;
    let face = match kb.make_cylinder(0.5 * nut.washer_face_diameter, 2.0 * washer) {
        Ok(face) => face,
        Err(e) => {
            kb.release(body);
            return Err(e).at(Stage::Nut, "washer face");
        }
    };
    boolean_keep_largest(kb, body, face, BooleanKind::Union, "washer fuse")
        .at(Stage::Nut, "washer fuse")
}

/// Threaded rod through the whole nut, grown by the clearance scale.
fn thread_cutter(
    kb: &mut dyn KernelBundle,
    params: &BoltParameters,
    height: f64,
    scale: f64,
    diagnostics: &mut Diagnostics,
) -> Result<KernelSolidHandle, BuildError> {
    let rod = ShankSpec {
        total_length: height + 2.0 * NUT_CUTTER_OVERLAP,
        grip_length: 0.0,
        edge_fillet_radius: 0.0,
        ..params.shank
    };
    let cutter = build_shank(kb, &params.thread, &rod, diagnostics)?;
    let placement = Transform::translation([0.0, 0.0, -NUT_CUTTER_OVERLAP])
        .then(&Transform::uniform_scale([0.0, 0.0, 0.5 * height], scale));
    kb.place(cutter, &placement).at(Stage::Nut, "cutter placement")
}

/// Last resort: a plain clearance hole. Failure here is fatal.
fn through_hole(
    kb: &mut dyn KernelBundle,
    blank: KernelSolidHandle,
    params: &BoltParameters,
    height: f64,
    scale: f64,
) -> Result<KernelSolidHandle, BuildError> {
    let radius = 0.5 * params.thread.major_diameter * scale;
    let hole = kb
        .make_cylinder(radius, height + 2.0 * NUT_CUTTER_OVERLAP)
        .and_then(|hole| kb.place(hole, &Transform::translation([0.0, 0.0, -NUT_CUTTER_OVERLAP])));
    let hole = match hole {
        Ok(hole) => hole,
        Err(e) => {
            kb.release(blank);
            return Err(e).at(Stage::Nut, "clearance hole");
        }
    };
    boolean_keep_largest(kb, blank, hole, BooleanKind::Subtract, "clearance hole")
        .at(Stage::Nut, "clearance hole")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fastener_types::{HeadSpec, NutSpec, ThreadSpec};
    use geom_kernel::{KernelIntrospect, MockKernel, MockOp, MockOpKind};

    fn m8() -> BoltParameters {
        BoltParameters {
            thread: ThreadSpec::new(8.0, 1.25),
            shank: ShankSpec::new(8.0, 30.0),
            head: HeadSpec::hex(13.0, 5.3),
            nut: NutSpec::new(13.0, 6.8),
        }
    }

    #[test]
    fn test_nut_keeps_hex_bounds() {
        let mut kernel = MockKernel::new();
        let out = build_nut(&mut kernel, &m8(), &BuildOptions::default()).unwrap();
        let bbox = kernel.bounding_box(&out.solid).unwrap();
        assert_relative_eq!(bbox.max[0], 6.5, epsilon = 1e-9);
        assert_relative_eq!(bbox.min[2], 0.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max[2], 6.8, epsilon = 1e-9);
        assert!(out.diagnostics.warnings.is_empty());
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn test_cutter_is_scaled_by_clearance() {
        let params = m8();
        let mut kernel = MockKernel::new();
        build_nut(&mut kernel, &params, &BuildOptions::default()).unwrap();
        let scale = clearance_scale(&params);
        assert_relative_eq!(scale, 1.0 + 0.1 / 8.0);
        let scaled = kernel.operations().iter().any(|op| {
            matches!(op, MockOp::Transform { scale: s } if (s - scale).abs() < 1e-9)
        });
        assert!(scaled, "no transform with the clearance scale");
    }

    #[test]
    fn test_failed_thread_cut_falls_back_to_hole() {
        let mut kernel = MockKernel::new();
        // Thread, trim and chamfer cuts of the cutter succeed; the nut cut fails.
        kernel.inject_fault(MockOpKind::Subtract, 3);
        let out = build_nut(&mut kernel, &m8(), &BuildOptions::default()).unwrap();

        assert_eq!(out.diagnostics.warnings.len(), 1);
        assert!(out.diagnostics.warnings[0].contains("plain hole"));
        assert_eq!(kernel.count(MockOpKind::Subtract), 5);
        let solid_hex = 3f64.sqrt() / 2.0 * 13.0 * 13.0 * 6.8;
        assert!(kernel.volume(&out.solid).unwrap() < solid_hex);
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn test_failed_fallback_is_fatal() {
        let mut kernel = MockKernel::new();
        kernel.inject_fault(MockOpKind::Subtract, 3);
        kernel.inject_fault(MockOpKind::Subtract, 0);
        let err = build_nut(&mut kernel, &m8(), &BuildOptions::default()).unwrap_err();
        match err {
            BuildError::Construction {
                stage, operation, ..
            } => {
                assert_eq!(stage, Stage::Nut);
                assert_eq!(operation, "clearance hole");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(kernel.live_solids(), 0);
    }

    #[test]
    fn test_cutter_failure_falls_back_to_hole() {
        let mut kernel = MockKernel::new();
        kernel.inject_fault(MockOpKind::SweepHelix, 0);
        let out = build_nut(&mut kernel, &m8(), &BuildOptions::default()).unwrap();
        assert_eq!(out.diagnostics.warnings.len(), 1);
        assert_eq!(kernel.count(MockOpKind::Subtract), 1);
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn test_washer_face_raises_hex() {
        let mut params = m8();
        params.nut.washer_face_diameter = 11.6;
        let mut kernel = MockKernel::new();
        let out = build_nut(&mut kernel, &params, &BuildOptions::default()).unwrap();
        let bbox = kernel.bounding_box(&out.solid).unwrap();
        assert_relative_eq!(bbox.min[2], 0.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max[2], 6.8 + NUT_WASHER_THICKNESS, epsilon = 1e-9);
    }

    #[test]
    fn test_nut_fillet_clamped_to_tenth_of_width() {
        let mut params = m8();
        params.nut.edge_fillet_radius = 4.0;
        let mut kernel = MockKernel::new();
        let out = build_nut(&mut kernel, &params, &BuildOptions::default()).unwrap();
        let report = &out.diagnostics.fillets[0];
        assert_relative_eq!(report.applied_radius, 1.3);
        assert!(kernel.fillet_radii().iter().all(|r| *r <= 1.3 + 1e-12));
    }

    #[test]
    fn test_nut_narrower_than_thread_rejected() {
        let mut params = m8();
        params.nut.width_across_flats = 7.0;
        let mut kernel = MockKernel::new();
        let err = build_nut(&mut kernel, &params, &BuildOptions::default()).unwrap_err();
        assert!(matches!(err, BuildError::Validation(_)));
        assert!(kernel.operations().is_empty());
    }
}
