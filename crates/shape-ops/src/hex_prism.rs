use std::f64::consts::{FRAC_PI_3, FRAC_PI_6};

use geom_kernel::{KernelSolidHandle, Transform};
use tracing::debug;

use crate::boolean::{boolean_keep_largest, BooleanKind};
use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// How the hexagonal cross-section is produced. Both give the same solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexConstruction {
    /// Extrude a six-vertex polygon.
    #[default]
    Polygon,
    /// Circumscribed cylinder with six box petals cut off at the flats.
    Petals,
}

/// Circumradius of a regular hexagon with the given across-flats width.
pub fn circumradius(across_flats: f64) -> f64 {
    across_flats / 3f64.sqrt()
}

/// Hexagon vertices in the XY plane at `z`, starting at π/6.
pub fn hexagon_points(across_flats: f64, z: f64) -> [[f64; 3]; 6] {
    let r = circumradius(across_flats);
    std::array::from_fn(|i| {
        let angle = FRAC_PI_6 + i as f64 * FRAC_PI_3;
        [r * angle.cos(), r * angle.sin(), z]
    })
}

/// Hexagonal prism centered on Z with its base at z = 0.
pub fn hex_prism(
    kb: &mut dyn KernelBundle,
    across_flats: f64,
    height: f64,
    construction: HexConstruction,
) -> Result<KernelSolidHandle, OpError> {
    if !(across_flats > 0.0) || !(height > 0.0) {
        return Err(OpError::InvalidParameter {
            reason: format!(
                "hex prism needs positive width and height, got s={} h={}",
                across_flats, height
            ),
        });
    }
    debug!(across_flats, height, ?construction, "hex prism");

    match construction {
        HexConstruction::Polygon => {
            let face = kb.make_polygon_face(&hexagon_points(across_flats, 0.0))?;
            Ok(kb.extrude_face(face, [0.0, 0.0, 1.0], height)?)
        }
        HexConstruction::Petals => petal_prism(kb, across_flats, height),
    }
}

fn petal_prism(
    kb: &mut dyn KernelBundle,
    across_flats: f64,
    height: f64,
) -> Result<KernelSolidHandle, OpError> {
    let r = circumradius(across_flats);
    let mut blank = kb.make_cylinder(r, height)?;

    for i in 0..6 {
        let petal = kb.make_box([2.0 * r, 2.0 * r, height + 2.0])?;
        let placement = Transform::translation([0.5 * across_flats, -r, -1.0]).then(
            &Transform::rotation([0.0; 3], [0.0, 0.0, 1.0], i as f64 * FRAC_PI_3),
        );
        let petal = match kb.place(petal, &placement) {
            Ok(petal) => petal,
            Err(e) => {
                kb.release(blank);
                return Err(e.into());
            }
        };
        blank = boolean_keep_largest(kb, blank, petal, BooleanKind::Subtract, "hex petal cut")?;
    }
    Ok(blank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geom_kernel::{KernelIntrospect, MockKernel, MockOpKind};

    #[test]
    fn test_hexagon_flats_at_half_width() {
        let points = hexagon_points(10.0, 0.0);
        // The flat between vertices 5 and 0 faces +X; vertex 1 is the +Y corner.
        let mid_x = 0.5 * (points[5][0] + points[0][0]);
        assert_relative_eq!(mid_x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(points[1][1], circumradius(10.0), epsilon = 1e-12);
    }

    #[test]
    fn test_polygon_prism_volume() {
        let mut kernel = MockKernel::new();
        let solid = hex_prism(&mut kernel, 13.0, 5.3, HexConstruction::Polygon).unwrap();
        // Area of a hexagon: (√3 / 2) s².
        let expected = 3f64.sqrt() / 2.0 * 13.0 * 13.0 * 5.3;
        assert_relative_eq!(kernel.volume(&solid).unwrap(), expected, max_relative = 1e-9);
    }

    #[test]
    fn test_petal_prism_matches_polygon_bounds() {
        let mut kernel = MockKernel::new();
        let polygon = hex_prism(&mut kernel, 13.0, 5.3, HexConstruction::Polygon).unwrap();
        let petals = hex_prism(&mut kernel, 13.0, 5.3, HexConstruction::Petals).unwrap();

        let a = kernel.bounding_box(&polygon).unwrap();
        let b = kernel.bounding_box(&petals).unwrap();
        // Flats face ±X, corners ±Y.
        assert_relative_eq!(a.max[0], 6.5, epsilon = 1e-9);
        assert_relative_eq!(b.max[0], 6.5, epsilon = 1e-9);
        assert_relative_eq!(b.max[1], a.max[1], epsilon = 1e-9);
        assert_relative_eq!(b.max[2], 5.3, epsilon = 1e-9);
        assert_eq!(kernel.count(MockOpKind::Subtract), 6);
        assert_eq!(kernel.live_solids(), 2);
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        let mut kernel = MockKernel::new();
        assert!(matches!(
            hex_prism(&mut kernel, 0.0, 5.0, HexConstruction::Polygon),
            Err(OpError::InvalidParameter { .. })
        ));
        assert!(matches!(
            hex_prism(&mut kernel, 10.0, -1.0, HexConstruction::Petals),
            Err(OpError::InvalidParameter { .. })
        ));
        assert!(kernel.operations().is_empty());
    }
}
