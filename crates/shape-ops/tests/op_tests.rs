use approx::assert_relative_eq;
use proptest::prelude::*;

use geom_kernel::{Kernel, KernelIntrospect, MockKernel, MockOpKind, Transform};
use shape_ops::{
    boolean_keep_largest, chamfer_profile, clamped_edge_fillet, hex_prism, thread_tool,
    BooleanKind, FilletOutcome, HexConstruction, KernelBundle, OpError,
};

/// Cylinder of radius 4 along [0, 20], the usual shape of an M8 blank.
fn rod(kernel: &mut MockKernel) -> geom_kernel::KernelSolidHandle {
    kernel.make_cylinder(4.0, 20.0).unwrap()
}

// ── Boolean selection ──────────────────────────────────────────────────────

#[test]
fn slab_cut_splitting_a_rod_keeps_the_longer_piece() {
    let mut kernel = MockKernel::new();
    let blank = rod(&mut kernel);
    // A wide disc through z ∈ [5, 6] leaves pieces of length 5 and 14.
    let disc = kernel.make_cylinder(10.0, 1.0).unwrap();
    let disc = kernel
        .place(disc, &Transform::translation([0.0, 0.0, 5.0]))
        .unwrap();

    let kept =
        boolean_keep_largest(&mut kernel, blank, disc, BooleanKind::Subtract, "split").unwrap();
    let bbox = kernel.bounding_box(&kept).unwrap();
    assert_relative_eq!(bbox.min[2], 6.0, epsilon = 1e-9);
    assert_relative_eq!(bbox.max[2], 20.0, epsilon = 1e-9);
    assert_eq!(kernel.live_solids(), 1);
}

#[test]
fn disjoint_union_keeps_larger_volume_regardless_of_operand_order() {
    for swap in [false, true] {
        let mut kernel = MockKernel::new();
        let small = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let large = kernel.make_box([2.0, 2.0, 2.0]).unwrap();
        let large = kernel
            .place(large, &Transform::translation([5.0, 0.0, 0.0]))
            .unwrap();
        let (a, b) = if swap { (large, small) } else { (small, large) };

        let kept = boolean_keep_largest(&mut kernel, a, b, BooleanKind::Union, "fuse").unwrap();
        assert_relative_eq!(kernel.volume(&kept).unwrap(), 8.0);
        assert_eq!(kernel.live_solids(), 1);
    }
}

#[test]
fn failed_boolean_releases_operands() {
    let mut kernel = MockKernel::new();
    kernel.inject_fault(MockOpKind::Subtract, 0);
    let blank = rod(&mut kernel);
    let tool = thread_tool(&mut kernel, 6.647, 1.25, 20.0).unwrap();
    let err = boolean_keep_largest(&mut kernel, blank, tool, BooleanKind::Subtract, "thread cut")
        .unwrap_err();
    assert!(matches!(err, OpError::Kernel(_)));
    assert_eq!(kernel.live_solids(), 0);
}

// ── Tools against a blank ──────────────────────────────────────────────────

#[test]
fn thread_cut_keeps_rod_bounds() {
    let mut kernel = MockKernel::new();
    let blank = rod(&mut kernel);
    let before = kernel.volume(&blank).unwrap();
    let tool = thread_tool(&mut kernel, 6.647, 1.25, 20.0).unwrap();
    let threaded =
        boolean_keep_largest(&mut kernel, blank, tool, BooleanKind::Subtract, "thread cut")
            .unwrap();

    let bbox = kernel.bounding_box(&threaded).unwrap();
    assert_relative_eq!(bbox.min[2], 0.0);
    assert_relative_eq!(bbox.max[2], 20.0);
    let after = kernel.volume(&threaded).unwrap();
    assert!(after < before && after > 0.0);
}

#[test]
fn chamfer_tool_cuts_tip() {
    let mut kernel = MockKernel::new();
    let blank = rod(&mut kernel);
    let before = kernel.volume(&blank).unwrap();
    let tool = chamfer_profile(
        &mut kernel,
        &[[2.75, 0.0, 20.0], [8.0, 0.0, 20.0], [8.0, 0.0, 14.75]],
    )
    .unwrap();
    let cut =
        boolean_keep_largest(&mut kernel, blank, tool, BooleanKind::Subtract, "chamfer").unwrap();
    assert!(kernel.volume(&cut).unwrap() < before);
}

#[test]
fn hex_prism_fillet_failure_is_reported_not_raised() {
    let mut kernel = MockKernel::new();
    let prism = hex_prism(&mut kernel, 13.0, 5.3, HexConstruction::Polygon).unwrap();
    kernel.inject_fault(MockOpKind::Fillet, 0);
    let (prism, report) = clamped_edge_fillet(&mut kernel, prism, 0.5, 1.3, "nut edges");
    assert!(matches!(report.outcome, FilletOutcome::Failed { .. }));
    assert!(kernel.volume(&prism).is_ok());
}

// ── Properties ─────────────────────────────────────────────────────────────

fn arb_radius() -> impl Strategy<Value = f64> {
    0.0f64..20.0
}

fn arb_width() -> impl Strategy<Value = f64> {
    1.0f64..50.0
}

proptest! {
    #[test]
    fn applied_fillet_radius_never_exceeds_clamp(
        requested in arb_radius(),
        width in arb_width(),
    ) {
        let mut kernel = MockKernel::new();
        let max_radius = 0.1 * width;
        let prism = hex_prism(&mut kernel, width, width, HexConstruction::Polygon).unwrap();
        let (_, report) = clamped_edge_fillet(&mut kernel, prism, requested, max_radius, "edge");

        prop_assert!(report.applied_radius <= max_radius + 1e-12);
        for r in kernel.fillet_radii() {
            prop_assert!(r <= max_radius + 1e-12, "fillet radius {} above {}", r, max_radius);
        }
        prop_assert_eq!(kernel.live_solids(), 1);
    }
}

proptest! {
    #[test]
    fn hex_prism_constructions_agree_on_bounds(
        width in arb_width(),
        height in 0.5f64..30.0,
    ) {
        let mut kernel = MockKernel::new();
        let polygon = hex_prism(&mut kernel, width, height, HexConstruction::Polygon).unwrap();
        let petals = hex_prism(&mut kernel, width, height, HexConstruction::Petals).unwrap();
        let a = kernel.bounding_box(&polygon).unwrap();
        let b = kernel.bounding_box(&petals).unwrap();
        for i in 0..3 {
            prop_assert!((a.min[i] - b.min[i]).abs() < 1e-6);
            prop_assert!((a.max[i] - b.max[i]).abs() < 1e-6);
        }
    }
}
