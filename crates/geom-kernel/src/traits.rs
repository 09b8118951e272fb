use crate::types::*;

/// Core geometry kernel trait. Provides all shape construction and modification operations.
/// Implemented by TruckKernel (wraps real truck) and MockKernel (deterministic test double).
///
/// Operations never consume their input solids; callers that are done with an
/// input give it back with [`Kernel::release`].
pub trait Kernel {
    /// Cylinder with its base centered at the origin in XY, extending along +Z.
    fn make_cylinder(&mut self, radius: f64, height: f64)
        -> Result<KernelSolidHandle, KernelError>;

    /// Box with one corner at the origin, extending to `size`.
    fn make_box(&mut self, size: [f64; 3]) -> Result<KernelSolidHandle, KernelError>;

    /// Closed planar polygon face. The returned id is consumed by the next
    /// extrude or revolve that uses it.
    fn make_polygon_face(&mut self, points: &[[f64; 3]]) -> Result<KernelId, KernelError>;

    /// Extrude a planar face along a direction vector.
    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Revolve a planar face around an axis.
    fn revolve_face(
        &mut self,
        face: KernelId,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Sweep a closed polyline profile along a helix with the sweep frame's
    /// binormal held at +Z, and cap both ends. The result is never trimmed.
    fn sweep_helix(
        &mut self,
        profile: &[[f64; 3]],
        path: &HelixPath,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Transformed copy of a solid.
    fn transform(
        &mut self,
        solid: &KernelSolidHandle,
        transform: &Transform,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Boolean union of two solids. The result may hold any number of disjoint solids.
    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<Vec<KernelSolidHandle>, KernelError>;

    /// Boolean subtraction: a minus b. The result may hold any number of disjoint solids.
    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<Vec<KernelSolidHandle>, KernelError>;

    /// Fillet (round) the specified edges with the given radius.
    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError>;

    /// Tessellate a solid to a triangle mesh.
    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: &MeshTolerance,
    ) -> Result<RenderMesh, KernelError>;

    /// Serialize a solid.
    fn write_shape(
        &self,
        solid: &KernelSolidHandle,
        format: ShapeFormat,
    ) -> Result<String, KernelError>;

    /// Drop a solid. Unknown handles are ignored.
    fn release(&mut self, solid: KernelSolidHandle);
}

/// Measurement trait. Provides read-only queries on kernel geometry.
pub trait KernelIntrospect {
    /// Enclosed volume.
    fn volume(&self, solid: &KernelSolidHandle) -> Result<f64, KernelError>;

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<BoundingBox, KernelError>;

    /// Every unique edge of the solid with its length and centre of mass.
    fn measure_edges(
        &self,
        solid: &KernelSolidHandle,
    ) -> Result<Vec<(KernelId, EdgeMeasure)>, KernelError>;
}
