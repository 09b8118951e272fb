//! Bolt heads. Every head is built with its bearing face at z = 0.

use fastener_types::{HeadSpec, HeadType, ThreadSpec};
use geom_kernel::{KernelSolidHandle, Transform};
use shape_ops::{
    boolean_keep_largest, hex_prism, BooleanKind, Diagnostics, HexConstruction, KernelBundle,
};
use tracing::{debug, instrument, warn};

use crate::types::{BuildError, Stage, StageExt};

/// How far the socket tool rises above the top face.
const SOCKET_TOOL_MARGIN: f64 = 1.0;

/// Build the head described by `head`.
#[instrument(skip(kb, thread, head, diagnostics), fields(head_type = ?head.head_type))]
pub fn build_head(
    kb: &mut dyn KernelBundle,
    thread: &ThreadSpec,
    head: &HeadSpec,
    construction: HexConstruction,
    diagnostics: &mut Diagnostics,
) -> Result<KernelSolidHandle, BuildError> {
    head.validate()?;

    if head.width_across_flats <= thread.major_diameter {
        warn!(
            width = head.width_across_flats,
            major_diameter = thread.major_diameter,
            "head is not wider than the thread"
        );
        diagnostics.warn(format!(
            "head width {} does not exceed thread diameter {}",
            head.width_across_flats, thread.major_diameter
        ));
    }

    let s = head.width_across_flats;
    let k = head.height;
    let body = match head.head_type {
        HeadType::Hex => hex_prism(kb, s, k, construction).at(Stage::Head, "hex prism")?,
        HeadType::SocketCap => socket_cap(kb, head, construction)?,
        HeadType::Flat => kb.make_cylinder(0.5 * s, k).at(Stage::Head, "round head")?,
        HeadType::Countersunk => {
            warn!("countersunk heads are modelled as flat cylinders");
            diagnostics.warn("countersunk head built as a flat cylinder");
            kb.make_cylinder(0.5 * s, k).at(Stage::Head, "round head")?
        }
    };

    if head.has_washer_face() {
        add_washer_face(kb, body, head)
    } else {
        Ok(body)
    }
}

fn socket_cap(
    kb: &mut dyn KernelBundle,
    head: &HeadSpec,
    construction: HexConstruction,
) -> Result<KernelSolidHandle, BuildError> {
    let k = head.height;
    debug!(
        socket = head.socket_size,
        depth = head.socket_depth,
        "socket cap head"
    );
    let cap = kb
        .make_cylinder(0.5 * head.width_across_flats, k)
        .at(Stage::Head, "cap body")?;
    let socket = hex_prism(
        kb,
        head.socket_size,
        head.socket_depth + SOCKET_TOOL_MARGIN,
        construction,
    )
    .and_then(|socket| {
        Ok(kb.place(
            socket,
            &Transform::translation([0.0, 0.0, k - head.socket_depth]),
        )?)
    });
    let socket = match socket {
        Ok(socket) => socket,
        Err(e) => {
            kb.release(cap);
            return Err(e).at(Stage::Head, "socket tool");
        }
    };
    boolean_keep_largest(kb, cap, socket, BooleanKind::Subtract, "socket cut")
        .at(Stage::Head, "socket cut")
}

/// Raise the head by the washer thickness and fuse a washer cylinder under it.
fn add_washer_face(
    kb: &mut dyn KernelBundle,
    body: KernelSolidHandle,
    head: &HeadSpec,
) -> Result<KernelSolidHandle, BuildError> {
    let t = head.washer_face_thickness;
    let body = kb
        .place(body, &Transform::translation([0.0, 0.0, t]))
        .at(Stage::Head, "head placement")?;

    // A washer no wider than the head can reach into it for a clean fuse.
    let reach = if head.washer_face_diameter <= head.width_across_flats {
        0.5 * head.height.min(t)
    } else {
        0.0
    };
    let washer = match kb.make_cylinder(0.5 * head.washer_face_diameter, t + reach) {
        Ok(washer) => washer,
        Err(e) => {
            kb.release(body);
            return Err(e).at(Stage::Head, "washer face");
        }
    };
    boolean_keep_largest(kb, body, washer, BooleanKind::Union, "washer fuse")
        .at(Stage::Head, "washer fuse")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geom_kernel::{KernelIntrospect, MockKernel, MockOpKind};

    fn thread() -> ThreadSpec {
        ThreadSpec::new(8.0, 1.25)
    }

    fn build(kernel: &mut MockKernel, head: &HeadSpec) -> (KernelSolidHandle, Diagnostics) {
        let mut diagnostics = Diagnostics::default();
        let solid = build_head(
            kernel,
            &thread(),
            head,
            HexConstruction::Polygon,
            &mut diagnostics,
        )
        .unwrap();
        (solid, diagnostics)
    }

    #[test]
    fn test_hex_head() {
        let mut kernel = MockKernel::new();
        let (solid, diagnostics) = build(&mut kernel, &HeadSpec::hex(13.0, 5.3));
        let bbox = kernel.bounding_box(&solid).unwrap();
        assert_relative_eq!(bbox.max[0], 6.5, epsilon = 1e-9);
        assert_relative_eq!(bbox.min[2], 0.0);
        assert_relative_eq!(bbox.max[2], 5.3);
        assert!(diagnostics.warnings.is_empty());
    }

    #[test]
    fn test_socket_cap_head_cuts_socket() {
        let mut kernel = MockKernel::new();
        let head = HeadSpec::socket_cap(13.0, 8.0, 6.0, 4.0);
        let (solid, _) = build(&mut kernel, &head);
        let full = std::f64::consts::PI * 6.5 * 6.5 * 8.0;
        assert!(kernel.volume(&solid).unwrap() < full);
        assert_eq!(kernel.count(MockOpKind::Subtract), 1);
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn test_oversized_socket_rejected_before_construction() {
        let mut kernel = MockKernel::new();
        let head = HeadSpec::socket_cap(10.0, 6.0, 9.5, 3.0);
        let mut diagnostics = Diagnostics::default();
        let err = build_head(
            &mut kernel,
            &thread(),
            &head,
            HexConstruction::Polygon,
            &mut diagnostics,
        )
        .unwrap_err();
        match err {
            BuildError::Validation(e) => assert_eq!(e.field, "head.socket_size"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(kernel.operations().is_empty());
    }

    #[test]
    fn test_countersunk_matches_flat_with_warning() {
        let mut kernel = MockKernel::new();
        let (flat, flat_diag) = build(&mut kernel, &HeadSpec::round(HeadType::Flat, 16.0, 5.0));
        let (csk, csk_diag) =
            build(&mut kernel, &HeadSpec::round(HeadType::Countersunk, 16.0, 5.0));
        assert_relative_eq!(
            kernel.volume(&flat).unwrap(),
            kernel.volume(&csk).unwrap()
        );
        assert!(flat_diag.warnings.is_empty());
        assert_eq!(csk_diag.warnings.len(), 1);
    }

    #[test]
    fn test_washer_face_sits_below_head() {
        let mut kernel = MockKernel::new();
        let mut head = HeadSpec::hex(13.0, 5.3);
        head.washer_face_diameter = 11.6;
        head.washer_face_thickness = 0.6;
        let (solid, _) = build(&mut kernel, &head);

        let bbox = kernel.bounding_box(&solid).unwrap();
        assert_relative_eq!(bbox.min[2], 0.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max[2], 5.9, epsilon = 1e-9);
        assert_eq!(kernel.count(MockOpKind::Union), 1);
        assert_eq!(kernel.live_solids(), 1);
    }

    #[test]
    fn test_narrow_head_warns() {
        let mut kernel = MockKernel::new();
        let (_, diagnostics) = build(&mut kernel, &HeadSpec::hex(7.0, 5.3));
        assert_eq!(diagnostics.warnings.len(), 1);
    }
}
