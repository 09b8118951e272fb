//! Higher-level primitive builders on top of truck's sweep API.
//!
//! truck has no built-in box/cylinder/helix; everything is successive sweeps
//! or hand-assembled shells.

use crate::types::{HelixPath, KernelError};
use std::f64::consts::PI;
use truck_modeling::builder;
use truck_modeling::geometry::{Curve, Line};
use truck_modeling::topology::{Edge, Face, Shell, Solid, Vertex, Wire};
use truck_modeling::{EuclideanSpace, Point3, Rad, Vector3};

/// Create a box solid via successive translational sweeps.
/// Origin at (0,0,0), extends to (w,h,d).
pub fn make_box(w: f64, h: f64, d: f64) -> Solid {
    let v = builder::vertex(Point3::new(0.0, 0.0, 0.0));
    let edge = builder::tsweep(&v, Vector3::new(w, 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, h, 0.0));
    builder::tsweep(&face, Vector3::new(0.0, 0.0, d))
}

/// Create a cylinder solid: circle wire → face → translational sweep.
/// Base centered at origin in XY plane, extending along +Z.
pub fn make_cylinder(radius: f64, height: f64) -> Result<Solid, KernelError> {
    let v = builder::vertex(Point3::new(radius, 0.0, 0.0));
    let wire = builder::rsweep(&v, Point3::origin(), Vector3::unit_z(), Rad(2.0 * PI));
    let face = builder::try_attach_plane(&[wire]).map_err(|e| KernelError::InvalidGeometry {
        reason: format!("circular face: {}", e),
    })?;
    Ok(builder::tsweep(&face, Vector3::new(0.0, 0.0, height)))
}

fn line_edge(a: &Vertex, b: &Vertex) -> Edge {
    Edge::new(a, b, Curve::Line(Line(a.point(), b.point())))
}

fn point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

/// Planar face bounded by a closed polygon.
pub fn polygon_face(points: &[[f64; 3]]) -> Result<Face, KernelError> {
    if points.len() < 3 {
        return Err(KernelError::InvalidGeometry {
            reason: format!("polygon needs at least 3 points, got {}", points.len()),
        });
    }

    // Create all vertices first so edges share endpoints.
    let n = points.len();
    let vertices: Vec<Vertex> = points.iter().map(|&p| builder::vertex(point(p))).collect();
    let wire: Wire = (0..n)
        .map(|i| line_edge(&vertices[i], &vertices[(i + 1) % n]))
        .collect();

    builder::try_attach_plane(&[wire]).map_err(|e| KernelError::InvalidGeometry {
        reason: format!("failed to create planar face: {}", e),
    })
}

fn planar_face(edges: Vec<Edge>) -> Result<Face, KernelError> {
    let wire: Wire = edges.into_iter().collect();
    builder::try_attach_plane(&[wire]).map_err(|e| KernelError::SweepFailed {
        reason: format!("helical facet is not planar: {}", e),
    })
}

/// Helical sweep as a closed polyhedral shell.
///
/// The profile is copied to every station of the path by the screw motion;
/// neighbouring copies are joined by pairs of planar triangles and the two end
/// copies are capped with the profile polygon. Edges are shared between
/// adjacent facets so the shell is closed. The returned solid may still be
/// inside-out; callers fix orientation after measuring it.
pub fn helix_sweep(
    profile: &[[f64; 3]],
    path: &HelixPath,
    segments_per_turn: usize,
) -> Result<Solid, KernelError> {
    if profile.len() < 3 {
        return Err(KernelError::SweepFailed {
            reason: format!("profile needs at least 3 points, got {}", profile.len()),
        });
    }
    if !(path.pitch > 0.0) || !(path.u_end > path.u_start) {
        return Err(KernelError::SweepFailed {
            reason: format!(
                "degenerate helix: pitch {} over [{}, {}]",
                path.pitch, path.u_start, path.u_end
            ),
        });
    }

    let n = profile.len();
    let rings: Vec<Vec<Vertex>> = path
        .stations(segments_per_turn)
        .into_iter()
        .map(|u| {
            let screw = path.screw(u);
            profile
                .iter()
                .map(|&p| builder::vertex(point(screw.apply_point(p))))
                .collect()
        })
        .collect();

    let profile_edges: Vec<Vec<Edge>> = rings
        .iter()
        .map(|ring| (0..n).map(|j| line_edge(&ring[j], &ring[(j + 1) % n])).collect())
        .collect();
    let rails: Vec<Vec<Edge>> = rings
        .windows(2)
        .map(|w| (0..n).map(|j| line_edge(&w[0][j], &w[1][j])).collect())
        .collect();
    let diagonals: Vec<Vec<Edge>> = rings
        .windows(2)
        .map(|w| (0..n).map(|j| line_edge(&w[0][j], &w[1][(j + 1) % n])).collect())
        .collect();

    let mut faces: Vec<Face> = Vec::with_capacity(2 * n * rails.len() + 2);
    for i in 0..rails.len() {
        for j in 0..n {
            let k = (j + 1) % n;
            faces.push(planar_face(vec![
                profile_edges[i][j].clone(),
                rails[i][k].clone(),
                diagonals[i][j].inverse(),
            ])?);
            faces.push(planar_face(vec![
                diagonals[i][j].clone(),
                profile_edges[i + 1][j].inverse(),
                rails[i][j].inverse(),
            ])?);
        }
    }

    let first = &profile_edges[0];
    faces.push(planar_face(first.iter().rev().map(Edge::inverse).collect())?);
    let last = &profile_edges[profile_edges.len() - 1];
    faces.push(planar_face(last.to_vec())?);

    let shell: Shell = faces.into_iter().collect();
    Solid::try_new(vec![shell]).map_err(|e| KernelError::SweepFailed {
        reason: format!("helical shell is not closed: {}", e),
    })
}
