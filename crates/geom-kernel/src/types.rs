use nalgebra::{Matrix4, Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Opaque handle to a solid in the geometry kernel.
/// A handle is the only owner of its solid: it is neither `Clone` nor `Copy`,
/// and is given back to the kernel with [`crate::Kernel::release`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct KernelSolidHandle(pub(crate) u64);

impl KernelSolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }

    /// Raw handle number, for logging.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Transient kernel-internal entity identifier (faces, edges).
/// Stable within a single kernel session, never across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KernelId(pub u64);

/// Errors from kernel operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("sweep failed: {reason}")]
    SweepFailed { reason: String },

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("entity not found: {id:?}")]
    EntityNotFound { id: KernelId },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("export failed: {reason}")]
    Export { reason: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl BoundingBox {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all points, or `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = [f64; 3]>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first, first);
        for p in iter {
            bbox.include(p);
        }
        Some(bbox)
    }

    pub fn include(&mut self, p: [f64; 3]) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> [f64; 3] {
        [
            0.5 * (self.min[0] + self.max[0]),
            0.5 * (self.min[1] + self.max[1]),
            0.5 * (self.min[2] + self.max[2]),
        ]
    }

    pub fn diagonal(&self) -> f64 {
        let [dx, dy, dz] = self.size();
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn volume(&self) -> f64 {
        let [dx, dy, dz] = self.size();
        dx.max(0.0) * dy.max(0.0) * dz.max(0.0)
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        out.include(other.min);
        out.include(other.max);
        out
    }

    /// Overlapping region, if the boxes overlap by more than `eps` on every axis.
    pub fn intersection(&self, other: &BoundingBox, eps: f64) -> Option<BoundingBox> {
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for i in 0..3 {
            min[i] = self.min[i].max(other.min[i]);
            max[i] = self.max[i].min(other.max[i]);
            if max[i] - min[i] <= eps {
                return None;
            }
        }
        Some(BoundingBox { min, max })
    }

    /// The eight corners, in no particular order.
    pub fn corners(&self) -> [[f64; 3]; 8] {
        let (a, b) = (self.min, self.max);
        [
            [a[0], a[1], a[2]],
            [b[0], a[1], a[2]],
            [a[0], b[1], a[2]],
            [b[0], b[1], a[2]],
            [a[0], a[1], b[2]],
            [b[0], a[1], b[2]],
            [a[0], b[1], b[2]],
            [b[0], b[1], b[2]],
        ]
    }

    pub fn contains_point(&self, p: [f64; 3], eps: f64) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] - eps && p[i] <= self.max[i] + eps)
    }
}

/// Length and centre of mass of a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeMeasure {
    pub length: f64,
    pub centroid: [f64; 3],
}

/// Tessellation tolerances. `linear` is the chordal deviation in model units,
/// `angular` the maximum normal deviation in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshTolerance {
    pub linear: f64,
    pub angular: f64,
}

impl MeshTolerance {
    pub fn linear(linear: f64) -> Self {
        Self {
            linear,
            angular: 0.5,
        }
    }
}

/// Serialization formats the kernel can write directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeFormat {
    Brep,
    Step,
}

/// Affine placement: translation, rotation about an axis through a point,
/// uniform scale about a point, and compositions of those.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn translation(offset: [f64; 3]) -> Self {
        Self {
            matrix: Matrix4::new_translation(&Vector3::from(offset)),
        }
    }

    /// Rotation by `angle` radians about the line through `origin` along `axis`.
    pub fn rotation(origin: [f64; 3], axis: [f64; 3], angle: f64) -> Self {
        let o = Vector3::from(origin);
        let axis = Unit::new_normalize(Vector3::from(axis));
        Self {
            matrix: Matrix4::new_translation(&o)
                * Matrix4::from_axis_angle(&axis, angle)
                * Matrix4::new_translation(&-o),
        }
    }

    pub fn uniform_scale(center: [f64; 3], factor: f64) -> Self {
        let c = Vector3::from(center);
        Self {
            matrix: Matrix4::new_translation(&c)
                * Matrix4::new_nonuniform_scaling(&Vector3::new(factor, factor, factor))
                * Matrix4::new_translation(&-c),
        }
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            matrix: next.matrix * self.matrix,
        }
    }

    pub fn apply_point(&self, p: [f64; 3]) -> [f64; 3] {
        let q = self.matrix.transform_point(&Point3::from(p));
        [q.x, q.y, q.z]
    }

    /// Linear scale factor (cube root of the determinant of the linear part).
    pub fn scale_factor(&self) -> f64 {
        self.matrix.fixed_view::<3, 3>(0, 0).determinant().abs().cbrt()
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Column-major element array, as expected by cgmath-style matrices.
    pub fn to_cols_array(&self) -> [[f64; 4]; 4] {
        let m = &self.matrix;
        let mut cols = [[0.0; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, v) in col.iter_mut().enumerate() {
                *v = m[(r, c)];
            }
        }
        cols
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Extra helix length at each end, as a fraction of the pitch.
pub const HELIX_OVERLAP_FACTOR: f64 = 0.25;

/// Helical guide path on a cylinder about the Z axis.
///
/// The path is the line `z = pitch * u / 2π` in (angle, height) space lifted
/// onto the cylinder of the given radius, trimmed to `[u_start, u_end]`.
/// Sweeping along it is a screw motion: rotate by `u` about Z and rise by
/// `pitch * u / 2π`, so the swept profile keeps its orientation relative to +Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HelixPath {
    pub radius: f64,
    pub pitch: f64,
    pub u_start: f64,
    pub u_end: f64,
}

impl HelixPath {
    /// Path covering `[0, length]` plus a quarter pitch of overlap at both ends.
    pub fn new(radius: f64, pitch: f64, length: f64) -> Self {
        Self::with_overlap(radius, pitch, length, HELIX_OVERLAP_FACTOR * pitch)
    }

    pub fn with_overlap(radius: f64, pitch: f64, length: f64, overlap: f64) -> Self {
        Self {
            radius,
            pitch,
            u_start: -(overlap / pitch) * TAU,
            u_end: (length / pitch + overlap / pitch) * TAU,
        }
    }

    pub fn z_at(&self, u: f64) -> f64 {
        self.pitch * u / TAU
    }

    pub fn point_at(&self, u: f64) -> [f64; 3] {
        [
            self.radius * u.cos(),
            self.radius * u.sin(),
            self.z_at(u),
        ]
    }

    pub fn turns(&self) -> f64 {
        (self.u_end - self.u_start) / TAU
    }

    /// Length of the guide curve itself.
    pub fn arc_length(&self) -> f64 {
        let per_turn = (TAU * self.radius).hypot(self.pitch);
        self.turns() * per_turn
    }

    /// Screw placement of the profile at parameter `u`.
    pub fn screw(&self, u: f64) -> Transform {
        Transform::rotation([0.0; 3], [0.0, 0.0, 1.0], u)
            .then(&Transform::translation([0.0, 0.0, self.z_at(u)]))
    }

    fn segment_count(&self, segments_per_turn: usize) -> usize {
        (self.turns() * segments_per_turn.max(3) as f64)
            .ceil()
            .max(1.0) as usize
    }

    /// Parameter spacing between neighbouring [`stations`](Self::stations).
    pub fn station_step(&self, segments_per_turn: usize) -> f64 {
        (self.u_end - self.u_start) / self.segment_count(segments_per_turn) as f64
    }

    /// Evenly spaced parameters from `u_start` to `u_end`, at least
    /// `segments_per_turn` intervals per full turn.
    pub fn stations(&self, segments_per_turn: usize) -> Vec<f64> {
        let segments = self.segment_count(segments_per_turn);
        let step = self.station_step(segments_per_turn);
        (0..=segments)
            .map(|i| self.u_start + step * i as f64)
            .collect()
    }

    /// The same helix with both ends moved along it by `du`. Sweeps along the
    /// result are the original sweep under a screw motion.
    pub fn advanced(&self, du: f64) -> Self {
        Self {
            u_start: self.u_start + du,
            u_end: self.u_end + du,
            ..*self
        }
    }
}

/// Tessellated triangle mesh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderMesh {
    /// Flat array of vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub vertices: Vec<f32>,
    /// Flat array of vertex normals [nx0, ny0, nz0, nx1, ny1, nz1, ...].
    pub normals: Vec<f32>,
    /// Triangle indices into the vertex array.
    pub indices: Vec<u32>,
    /// Mapping from triangle ranges to logical faces.
    pub face_ranges: Vec<FaceRange>,
}

impl RenderMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Maps a contiguous range of triangles to a logical face.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRange {
    pub face_id: KernelId,
    /// Start index in the indices array (inclusive).
    pub start_index: u32,
    /// End index in the indices array (exclusive).
    pub end_index: u32,
}

impl Serialize for KernelId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KernelId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(KernelId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_helix_path_overlap_bounds() {
        let path = HelixPath::new(2.5, 1.0, 10.0);
        assert_relative_eq!(path.z_at(path.u_start), -0.25, epsilon = 1e-12);
        assert_relative_eq!(path.z_at(path.u_end), 10.25, epsilon = 1e-12);
        assert_relative_eq!(path.turns(), 10.5, epsilon = 1e-12);
    }

    #[test]
    fn test_helix_stations_cover_path() {
        let path = HelixPath::new(2.5, 1.0, 2.0);
        let stations = path.stations(24);
        assert_eq!(stations.len(), 61);
        assert_relative_eq!(stations[0], path.u_start);
        assert_relative_eq!(*stations.last().unwrap(), path.u_end, epsilon = 1e-9);
        assert_relative_eq!(path.station_step(24), PI / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_advanced_path_keeps_span() {
        let path = HelixPath::new(2.5, 1.0, 2.0);
        let moved = path.advanced(PI / 24.0);
        assert_relative_eq!(moved.turns(), path.turns(), epsilon = 1e-12);
        assert_relative_eq!(
            moved.z_at(moved.u_start) - path.z_at(path.u_start),
            1.0 / 48.0,
            epsilon = 1e-12
        );
        assert_eq!(moved.stations(24).len(), path.stations(24).len());
    }

    #[test]
    fn test_screw_rises_one_pitch_per_turn() {
        let path = HelixPath::new(1.0, 2.0, 4.0);
        let p = path.screw(2.0 * PI).apply_point([1.0, 0.0, 0.0]);
        assert_relative_eq!(p[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(p[2], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotation_about_offset_axis() {
        // 180 degrees about X through (0, 0, 5) maps z=0 to z=10.
        let t = Transform::rotation([0.0, 0.0, 5.0], [1.0, 0.0, 0.0], PI);
        let p = t.apply_point([1.0, 0.0, 0.0]);
        assert_relative_eq!(p[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(p[2], 10.0, epsilon = 1e-12);
        assert_relative_eq!(t.scale_factor(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_scale_about_center() {
        let t = Transform::uniform_scale([0.0, 0.0, 5.0], 2.0);
        let p = t.apply_point([1.0, 0.0, 6.0]);
        assert_relative_eq!(p[0], 2.0);
        assert_relative_eq!(p[2], 7.0);
        assert_relative_eq!(t.scale_factor(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bbox_intersection_and_union() {
        let a = BoundingBox::new([0.0; 3], [2.0; 3]);
        let b = BoundingBox::new([1.0; 3], [3.0; 3]);
        let c = BoundingBox::new([2.0, 0.0, 0.0], [4.0, 2.0, 2.0]);
        assert_eq!(
            a.intersection(&b, 1e-9),
            Some(BoundingBox::new([1.0; 3], [2.0; 3]))
        );
        // Touching boxes do not overlap.
        assert_eq!(a.intersection(&c, 1e-9), None);
        assert_eq!(a.union(&c), BoundingBox::new([0.0; 3], [4.0, 2.0, 2.0]));
        assert_relative_eq!(a.volume(), 8.0);
    }
}
