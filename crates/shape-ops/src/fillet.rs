//! Best-effort fillets. Every function here hands back a usable solid and a
//! report; a fillet the kernel cannot build leaves the input solid as it was.

use geom_kernel::{KernelId, KernelSolidHandle};
use tracing::{debug, warn};

use crate::kernel_ext::KernelBundle;
use crate::types::{FilletOutcome, FilletReport};

/// Requested radii at or below this are ignored.
pub const MIN_FILLET_RADIUS: f64 = 0.01;

/// An edge qualifies for an edge fillet only when longer than this many radii.
pub const EDGE_LENGTH_FACTOR: f64 = 4.0;

/// Half-width of the band around a junction plane in which edges are rounded.
pub const JUNCTION_BAND: f64 = 0.2;

fn skipped(
    stage: &'static str,
    requested: f64,
    applied: f64,
    candidates: usize,
    reason: impl Into<String>,
) -> FilletReport {
    FilletReport {
        stage,
        requested_radius: requested,
        applied_radius: applied,
        candidate_edges: candidates,
        qualifying_edges: 0,
        outcome: FilletOutcome::Skipped {
            reason: reason.into(),
        },
    }
}

/// Fillet `edges` and replace `solid` on success. On failure `solid` is
/// returned untouched and the report says why.
pub fn fillet_best_effort(
    kb: &mut dyn KernelBundle,
    solid: KernelSolidHandle,
    edges: &[KernelId],
    radius: f64,
    stage: &'static str,
) -> (KernelSolidHandle, FilletReport) {
    let mut report = FilletReport {
        stage,
        requested_radius: radius,
        applied_radius: radius,
        candidate_edges: edges.len(),
        qualifying_edges: edges.len(),
        outcome: FilletOutcome::Applied,
    };
    match kb.fillet_edges(&solid, edges, radius) {
        Ok(rounded) => {
            debug!(stage, radius, edges = edges.len(), "fillet applied");
            kb.release(solid);
            (rounded, report)
        }
        Err(e) => {
            warn!(stage, radius, error = %e, "fillet failed, keeping unfilleted solid");
            report.outcome = FilletOutcome::Failed {
                reason: e.to_string(),
            };
            (solid, report)
        }
    }
}

/// Round every edge longer than [`EDGE_LENGTH_FACTOR`] radii.
///
/// The requested radius is clamped to `max_radius`; requests at or below
/// [`MIN_FILLET_RADIUS`] are skipped.
pub fn clamped_edge_fillet(
    kb: &mut dyn KernelBundle,
    solid: KernelSolidHandle,
    requested: f64,
    max_radius: f64,
    stage: &'static str,
) -> (KernelSolidHandle, FilletReport) {
    if !(requested > MIN_FILLET_RADIUS) {
        let report = skipped(stage, requested, 0.0, 0, "radius below minimum");
        return (solid, report);
    }
    let radius = if requested > max_radius {
        warn!(stage, requested, max_radius, "clamping fillet radius");
        max_radius
    } else {
        requested
    };

    let edges = match kb.measure_edges(&solid) {
        Ok(edges) => edges,
        Err(e) => {
            warn!(stage, error = %e, "could not measure edges for fillet");
            let report = FilletReport {
                outcome: FilletOutcome::Failed {
                    reason: e.to_string(),
                },
                ..skipped(stage, requested, radius, 0, "")
            };
            return (solid, report);
        }
    };
    let qualifying: Vec<KernelId> = edges
        .iter()
        .filter(|(_, m)| m.length > EDGE_LENGTH_FACTOR * radius)
        .map(|(id, _)| *id)
        .collect();
    debug!(
        stage,
        radius,
        candidates = edges.len(),
        qualifying = qualifying.len(),
        "edge fillet selection"
    );
    if qualifying.is_empty() {
        let report = skipped(
            stage,
            requested,
            radius,
            edges.len(),
            format!("no edge longer than {} radii", EDGE_LENGTH_FACTOR),
        );
        return (solid, report);
    }

    let (solid, mut report) = fillet_best_effort(kb, solid, &qualifying, radius, stage);
    report.requested_radius = requested;
    report.candidate_edges = edges.len();
    (solid, report)
}

/// Round the edges whose centre lies within [`JUNCTION_BAND`] of the plane
/// `z = plane_z`, such as where a head meets its shank.
pub fn junction_fillet(
    kb: &mut dyn KernelBundle,
    solid: KernelSolidHandle,
    radius: f64,
    plane_z: f64,
    stage: &'static str,
) -> (KernelSolidHandle, FilletReport) {
    if !(radius > 0.0) {
        let report = skipped(stage, radius, 0.0, 0, "no radius requested");
        return (solid, report);
    }
    let edges = match kb.measure_edges(&solid) {
        Ok(edges) => edges,
        Err(e) => {
            warn!(stage, error = %e, "could not measure edges for fillet");
            let report = FilletReport {
                outcome: FilletOutcome::Failed {
                    reason: e.to_string(),
                },
                ..skipped(stage, radius, radius, 0, "")
            };
            return (solid, report);
        }
    };
    let near: Vec<KernelId> = edges
        .iter()
        .filter(|(_, m)| (m.centroid[2] - plane_z).abs() < JUNCTION_BAND)
        .map(|(id, _)| *id)
        .collect();
    if near.is_empty() {
        let report = skipped(
            stage,
            radius,
            radius,
            edges.len(),
            format!("no edge near z = {}", plane_z),
        );
        return (solid, report);
    }

    let (solid, mut report) = fillet_best_effort(kb, solid, &near, radius, stage);
    report.candidate_edges = edges.len();
    (solid, report)
}
