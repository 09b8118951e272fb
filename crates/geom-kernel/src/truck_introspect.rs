//! KernelIntrospect for TruckKernel: measurements over stored truck solids.

use crate::tessellation;
use crate::traits::KernelIntrospect;
use crate::truck_kernel::TruckKernel;
use crate::types::*;
use std::collections::HashSet;

use truck_modeling::topology::Solid;
use truck_modeling::{BoundedCurve, ParameterDivision1D};

/// Edge ids encode the owning handle in the upper 32 bits.
pub(crate) fn edge_id(handle: &KernelSolidHandle, index: usize) -> KernelId {
    KernelId((handle.id() << 32) | index as u64)
}

fn edge_measures(solid: &Solid, tolerance: f64) -> Vec<EdgeMeasure> {
    let mut seen = HashSet::new();
    let mut measures = Vec::new();
    for shell in solid.boundaries().iter() {
        for edge in shell.edge_iter() {
            // Deduplicate edges (each edge appears in two faces)
            if !seen.insert(edge.id()) {
                continue;
            }
            let curve = edge.oriented_curve();
            let (_params, points) = curve.parameter_division(curve.range_tuple(), tolerance);

            let mut length = 0.0;
            let mut weighted = [0.0; 3];
            for pair in points.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let seg = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2))
                    .sqrt();
                length += seg;
                for i in 0..3 {
                    weighted[i] += seg * 0.5 * (a[i] + b[i]);
                }
            }
            let centroid = if length > 0.0 {
                [weighted[0] / length, weighted[1] / length, weighted[2] / length]
            } else {
                points
                    .first()
                    .map(|p| [p[0], p[1], p[2]])
                    .unwrap_or([0.0; 3])
            };
            measures.push(EdgeMeasure { length, centroid });
        }
    }
    measures
}

impl KernelIntrospect for TruckKernel {
    fn volume(&self, solid: &KernelSolidHandle) -> Result<f64, KernelError> {
        let mesh = tessellation::solid_mesh(self.get_solid(solid)?, self.config().measure_tolerance);
        Ok(tessellation::signed_volume(&mesh).abs())
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<BoundingBox, KernelError> {
        let mesh = tessellation::solid_mesh(self.get_solid(solid)?, self.config().measure_tolerance);
        tessellation::mesh_bounds(&mesh).ok_or_else(|| KernelError::TessellationFailed {
            reason: "empty mesh while measuring bounds".to_string(),
        })
    }

    fn measure_edges(
        &self,
        solid: &KernelSolidHandle,
    ) -> Result<Vec<(KernelId, EdgeMeasure)>, KernelError> {
        let truck_solid = self.get_solid(solid)?;
        Ok(edge_measures(truck_solid, self.config().measure_tolerance)
            .into_iter()
            .enumerate()
            .map(|(i, m)| (edge_id(solid, i), m))
            .collect())
    }
}
