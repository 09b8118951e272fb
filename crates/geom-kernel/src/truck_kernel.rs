//! TruckKernel: real geometry kernel wrapping truck's API.

use crate::primitives;
use crate::tessellation;
use crate::traits::Kernel;
use crate::types::*;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace, warn};

// Import truck types selectively to avoid shadowing std::result::Result
use truck_modeling::builder;
use truck_modeling::topology::{Face, Solid};
use truck_modeling::{InnerSpace, Matrix4, Point3, Rad, Vector3};
use truck_stepio::out;

/// Fraction of a station step the helix is advanced by before sweeping.
/// Stations then sit between the quarter turns where revolved faces carry
/// their seams, and ring vertices stay off whole-pitch cut planes.
const HELIX_STATION_PHASE: f64 = 0.5;

/// Scales applied to the configured boolean tolerance, tried in order.
const BOOLEAN_TOLERANCE_LADDER: [f64; 3] = [1.0, 0.5, 0.25];

/// Tuning knobs for the truck backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruckConfig {
    /// Helical sweep stations per full turn.
    pub helix_segments_per_turn: usize,
    /// Tolerance handed to truck-shapeops booleans.
    pub boolean_tolerance: f64,
    /// Triangulation tolerance used for volume and bounding-box queries.
    pub measure_tolerance: f64,
}

impl Default for TruckConfig {
    fn default() -> Self {
        Self {
            helix_segments_per_turn: 24,
            boolean_tolerance: 0.05,
            measure_tolerance: 0.01,
        }
    }
}

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    config: TruckConfig,
    next_handle: u64,
    next_id: u64,
    solids: HashMap<u64, Solid>,
    /// Standalone faces created by make_polygon_face, awaiting extrude or revolve.
    standalone_faces: HashMap<u64, Face>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self::with_config(TruckConfig::default())
    }

    pub fn with_config(config: TruckConfig) -> Self {
        Self {
            config,
            next_handle: 1,
            next_id: 1,
            solids: HashMap::new(),
            standalone_faces: HashMap::new(),
        }
    }

    pub fn config(&self) -> &TruckConfig {
        &self.config
    }

    /// Number of solids currently owned by handles.
    pub fn live_solids(&self) -> usize {
        self.solids.len()
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &KernelSolidHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    fn take_face(&mut self, face: KernelId) -> Result<Face, KernelError> {
        self.standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })
    }

    /// Flip a closed solid whose boundary points inward.
    fn orient_outward(&self, mut solid: Solid) -> Solid {
        let mesh = tessellation::solid_mesh(&solid, self.config.measure_tolerance);
        if tessellation::signed_volume(&mesh) < 0.0 {
            solid.not();
        }
        solid
    }

    /// Split a boolean result into one solid per outer shell. Cavity shells
    /// (negative volume) stay with the outer shell whose bounds contain them.
    fn split_shells(&mut self, solid: Solid) -> Result<Vec<KernelSolidHandle>, KernelError> {
        let boundaries = solid.boundaries();
        if boundaries.is_empty() {
            return Ok(Vec::new());
        }
        if boundaries.len() == 1 {
            return Ok(vec![self.store_solid(solid)]);
        }

        let tol = self.config.measure_tolerance;
        let mut outers = Vec::new();
        let mut cavities = Vec::new();
        for shell in boundaries.iter() {
            let mesh = tessellation::shell_mesh(shell, tol);
            let Some(bounds) = tessellation::mesh_bounds(&mesh) else {
                continue;
            };
            if tessellation::signed_volume(&mesh) >= 0.0 {
                outers.push((vec![shell.clone()], bounds));
            } else {
                cavities.push((shell.clone(), bounds));
            }
        }
        for (cavity, bounds) in cavities {
            let host = outers.iter_mut().find(|(_, outer)| {
                outer.contains_point(bounds.min, tol) && outer.contains_point(bounds.max, tol)
            });
            match host {
                Some((shells, _)) => shells.push(cavity),
                None => debug!("dropping cavity shell with no enclosing outer shell"),
            }
        }

        let mut handles = Vec::with_capacity(outers.len());
        for (shells, _) in outers {
            let part = Solid::try_new(shells).map_err(|e| KernelError::BooleanFailed {
                reason: format!("invalid shell in boolean result: {}", e),
            })?;
            handles.push(self.store_solid(part));
        }
        Ok(handles)
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Run one truck boolean. A `None` result and a panic inside truck both come
/// back as `BooleanFailed`.
fn guarded_boolean<F>(operation: &str, op: F) -> Result<Solid, KernelError>
where
    F: FnOnce() -> Option<Solid>,
{
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Some(solid)) => Ok(solid),
        Ok(None) => Err(KernelError::BooleanFailed {
            reason: format!("truck {} returned no solid", operation),
        }),
        Err(payload) => Err(KernelError::BooleanFailed {
            reason: format!("truck {} panicked: {}", operation, panic_message(&*payload)),
        }),
    }
}

/// Try `op` at each rung of the tolerance ladder and keep the first success.
fn boolean_with_retries<F>(
    operation: &str,
    base_tolerance: f64,
    op: F,
) -> Result<Solid, KernelError>
where
    F: Fn(f64) -> Option<Solid>,
{
    let mut last_error = None;
    for scale in BOOLEAN_TOLERANCE_LADDER {
        let tolerance = base_tolerance * scale;
        match guarded_boolean(operation, || op(tolerance)) {
            Ok(solid) => return Ok(solid),
            Err(e) => {
                warn!(operation, tolerance, error = %e, "truck boolean failed");
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| KernelError::BooleanFailed {
        reason: format!("truck {} was not attempted", operation),
    }))
}

fn truck_matrix(transform: &Transform) -> Matrix4 {
    Matrix4::from(transform.to_cols_array())
}

impl Kernel for TruckKernel {
    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        if !(radius > 0.0 && height > 0.0) {
            return Err(KernelError::InvalidGeometry {
                reason: format!("cylinder r={} h={}", radius, height),
            });
        }
        let solid = primitives::make_cylinder(radius, height)?;
        Ok(self.store_solid(solid))
    }

    fn make_box(&mut self, size: [f64; 3]) -> Result<KernelSolidHandle, KernelError> {
        if size.iter().any(|s| !(*s > 0.0)) {
            return Err(KernelError::InvalidGeometry {
                reason: format!("box size {:?}", size),
            });
        }
        let solid = primitives::make_box(size[0], size[1], size[2]);
        Ok(self.store_solid(solid))
    }

    fn make_polygon_face(&mut self, points: &[[f64; 3]]) -> Result<KernelId, KernelError> {
        let face = primitives::polygon_face(points)?;
        let face_id = self.alloc_id();
        self.standalone_faces.insert(face_id.0, face);
        Ok(face_id)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let truck_face = self.take_face(face)?;

        let dir = Vector3::new(direction[0], direction[1], direction[2]);
        if dir.magnitude() < 1e-12 {
            return Err(KernelError::InvalidGeometry {
                reason: "extrude direction has zero length".to_string(),
            });
        }
        let sweep_vec = dir.normalize() * depth;

        let solid = builder::tsweep(&truck_face, sweep_vec);
        let solid = self.orient_outward(solid);
        Ok(self.store_solid(solid))
    }

    fn revolve_face(
        &mut self,
        face: KernelId,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        let truck_face = self.take_face(face)?;

        let origin = Point3::new(axis_origin[0], axis_origin[1], axis_origin[2]);
        let axis = Vector3::new(axis_direction[0], axis_direction[1], axis_direction[2]);
        if axis.magnitude() < 1e-12 {
            return Err(KernelError::InvalidGeometry {
                reason: "revolve axis has zero length".to_string(),
            });
        }

        let solid = builder::rsweep(&truck_face, origin, axis.normalize(), Rad(angle));
        let solid = self.orient_outward(solid);
        Ok(self.store_solid(solid))
    }

    fn sweep_helix(
        &mut self,
        profile: &[[f64; 3]],
        path: &HelixPath,
    ) -> Result<KernelSolidHandle, KernelError> {
        let segments = self.config.helix_segments_per_turn;
        debug!(
            turns = path.turns(),
            segments_per_turn = segments,
            profile_points = profile.len(),
            "building helical sweep"
        );
        let path = path.advanced(HELIX_STATION_PHASE * path.station_step(segments));
        let solid = primitives::helix_sweep(profile, &path, segments)?;
        let solid = self.orient_outward(solid);
        Ok(self.store_solid(solid))
    }

    fn transform(
        &mut self,
        solid: &KernelSolidHandle,
        transform: &Transform,
    ) -> Result<KernelSolidHandle, KernelError> {
        let moved = builder::transformed(self.get_solid(solid)?, truck_matrix(transform));
        Ok(self.store_solid(moved))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<Vec<KernelSolidHandle>, KernelError> {
        let solid_a = self.get_solid(a)?;
        let solid_b = self.get_solid(b)?;
        let result = boolean_with_retries("or()", self.config.boolean_tolerance, |tol| {
            truck_shapeops::or(solid_a, solid_b, tol)
        })?;
        self.split_shells(result)
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<Vec<KernelSolidHandle>, KernelError> {
        let solid_a = self.get_solid(a)?;
        let mut solid_b = self.get_solid(b)?.clone();

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        let result = boolean_with_retries("and()", self.config.boolean_tolerance, |tol| {
            truck_shapeops::and(solid_a, &solid_b, tol)
        })?;
        self.split_shells(result)
    }

    fn fillet_edges(
        &mut self,
        _solid: &KernelSolidHandle,
        _edges: &[KernelId],
        _radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        Err(KernelError::NotSupported {
            operation: "fillet_edges".to_string(),
        })
    }

    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: &MeshTolerance,
    ) -> Result<RenderMesh, KernelError> {
        let truck_solid = self
            .solids
            .get(&solid.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(solid.id()),
            })?;
        trace!(linear = tolerance.linear, "tessellating");
        tessellation::tessellate_solid(truck_solid, tolerance, &mut self.next_id)
    }

    fn write_shape(
        &self,
        solid: &KernelSolidHandle,
        format: ShapeFormat,
    ) -> Result<String, KernelError> {
        let compressed = self.get_solid(solid)?.compress();
        match format {
            ShapeFormat::Brep => {
                serde_json::to_string(&compressed).map_err(|e| KernelError::Export {
                    reason: e.to_string(),
                })
            }
            ShapeFormat::Step => Ok(out::CompleteStepDisplay::new(
                out::StepModel::from(&compressed),
                out::StepHeaderDescriptor {
                    file_name: "fastener.step".to_owned(),
                    ..Default::default()
                },
            )
            .to_string()),
        }
    }

    fn release(&mut self, solid: KernelSolidHandle) {
        self.solids.remove(&solid.id());
    }
}
