//! MockKernel: deterministic test double implementing Kernel + KernelIntrospect.
//!
//! Every solid is reduced to an axis-aligned bounding box, an enclosed volume
//! and a list of measured edges. Primitives are exact; booleans follow simple
//! box rules that are enough to reason about lengths, splits and fillets:
//!
//! - a cutter whose bounds do not overlap the target leaves it unchanged;
//! - a "filled" cutter (volume at least half its box) that spans the target on
//!   two axes slices it along the third, which can split it into two solids or
//!   remove it entirely;
//! - any other cutter removes an estimated volume and keeps the bounds;
//! - a union of separated boxes returns both solids, otherwise one.
//!
//! Every call is recorded in an operation log, and one-shot faults can be
//! injected per operation kind.
//! Used by shape-ops, fastener-engine and the test harness.

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

const EPS: f64 = 1e-9;

/// Share of its bounding box a cutter must fill to slice like a slab.
const FILLED_RATIO: f64 = 0.5;

/// Operation kinds, for fault injection and log filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOpKind {
    Cylinder,
    Box,
    PolygonFace,
    Extrude,
    Revolve,
    SweepHelix,
    Transform,
    Union,
    Subtract,
    Fillet,
    Tessellate,
    Write,
}

/// One recorded kernel call.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOp {
    Cylinder { radius: f64, height: f64 },
    Box { size: [f64; 3] },
    PolygonFace { points: usize },
    Extrude { depth: f64 },
    Revolve { angle: f64 },
    SweepHelix { turns: f64 },
    Transform { scale: f64 },
    Union,
    Subtract,
    Fillet { radius: f64, edges: usize },
    Tessellate { linear: f64 },
    Write { format: ShapeFormat },
}

impl MockOp {
    pub fn kind(&self) -> MockOpKind {
        match self {
            MockOp::Cylinder { .. } => MockOpKind::Cylinder,
            MockOp::Box { .. } => MockOpKind::Box,
            MockOp::PolygonFace { .. } => MockOpKind::PolygonFace,
            MockOp::Extrude { .. } => MockOpKind::Extrude,
            MockOp::Revolve { .. } => MockOpKind::Revolve,
            MockOp::SweepHelix { .. } => MockOpKind::SweepHelix,
            MockOp::Transform { .. } => MockOpKind::Transform,
            MockOp::Union => MockOpKind::Union,
            MockOp::Subtract => MockOpKind::Subtract,
            MockOp::Fillet { .. } => MockOpKind::Fillet,
            MockOp::Tessellate { .. } => MockOpKind::Tessellate,
            MockOp::Write { .. } => MockOpKind::Write,
        }
    }
}

/// A mock edge with known length and centre of mass.
#[derive(Debug, Clone)]
struct MockEdge {
    id: KernelId,
    length: f64,
    centroid: [f64; 3],
}

/// An analytic solid.
#[derive(Debug, Clone)]
struct MockSolid {
    bbox: BoundingBox,
    volume: f64,
    edges: Vec<MockEdge>,
}

impl MockSolid {
    /// Share of the bounding box occupied by the solid.
    fn fill(&self) -> f64 {
        let boxed = self.bbox.volume();
        if boxed > EPS {
            (self.volume / boxed).min(1.0)
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Fault {
    kind: MockOpKind,
    skip: usize,
}

/// Deterministic test double for the geometry kernel.
/// Implements both Kernel and KernelIntrospect.
pub struct MockKernel {
    next_id: u64,
    next_handle: u64,
    solids: HashMap<u64, MockSolid>,
    /// Polygons created by make_polygon_face, awaiting extrude or revolve.
    standalone_faces: HashMap<u64, Vec<[f64; 3]>>,
    log: Vec<MockOp>,
    faults: Vec<Fault>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            next_handle: 1,
            solids: HashMap::new(),
            standalone_faces: HashMap::new(),
            log: Vec::new(),
            faults: Vec::new(),
        }
    }

    /// Make one future call of `kind` fail: the first `skip` calls succeed,
    /// the next one fails. Faults of the same kind fire in injection order.
    pub fn inject_fault(&mut self, kind: MockOpKind, skip: usize) {
        self.faults.push(Fault { kind, skip });
    }

    /// Every call made so far, including failed ones.
    pub fn operations(&self) -> &[MockOp] {
        &self.log
    }

    pub fn count(&self, kind: MockOpKind) -> usize {
        self.log.iter().filter(|op| op.kind() == kind).count()
    }

    /// Radii of every fillet attempted so far.
    pub fn fillet_radii(&self) -> Vec<f64> {
        self.log
            .iter()
            .filter_map(|op| match op {
                MockOp::Fillet { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect()
    }

    /// Number of solids currently owned by handles.
    pub fn live_solids(&self) -> usize {
        self.solids.len()
    }

    fn alloc_id(&mut self) -> KernelId {
        let id = KernelId(self.next_id);
        self.next_id += 1;
        id
    }

    fn alloc_handle(&mut self) -> KernelSolidHandle {
        let h = KernelSolidHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    /// Record a call and fire a pending fault for its kind, if due.
    fn begin(&mut self, op: MockOp) -> Result<(), KernelError> {
        let kind = op.kind();
        self.log.push(op);
        let Some(pos) = self.faults.iter().position(|f| f.kind == kind) else {
            return Ok(());
        };
        if self.faults[pos].skip > 0 {
            self.faults[pos].skip -= 1;
            return Ok(());
        }
        self.faults.remove(pos);
        let reason = format!("injected {:?} fault", kind);
        Err(match kind {
            MockOpKind::Union | MockOpKind::Subtract => KernelError::BooleanFailed { reason },
            MockOpKind::SweepHelix => KernelError::SweepFailed { reason },
            MockOpKind::Fillet => KernelError::FilletFailed { reason },
            MockOpKind::Tessellate => KernelError::TessellationFailed { reason },
            MockOpKind::Write => KernelError::Export { reason },
            _ => KernelError::Other { message: reason },
        })
    }

    fn edge(&mut self, length: f64, centroid: [f64; 3]) -> MockEdge {
        MockEdge {
            id: self.alloc_id(),
            length,
            centroid,
        }
    }

    fn line(&mut self, a: [f64; 3], b: [f64; 3]) -> MockEdge {
        self.edge(distance(a, b), midpoint(a, b))
    }

    fn box_edges(&mut self, bbox: &BoundingBox) -> Vec<MockEdge> {
        let c = bbox.corners();
        // Corner index bits: 1 = x max, 2 = y max, 4 = z max.
        let pairs = [
            (0, 1),
            (2, 3),
            (4, 5),
            (6, 7),
            (0, 2),
            (1, 3),
            (4, 6),
            (5, 7),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];
        pairs.iter().map(|&(a, b)| self.line(c[a], c[b])).collect()
    }

    /// Fresh ids for a copied edge list.
    fn copy_edges<'a, I: IntoIterator<Item = &'a MockEdge>>(&mut self, edges: I) -> Vec<MockEdge> {
        let copied: Vec<(f64, [f64; 3])> =
            edges.into_iter().map(|e| (e.length, e.centroid)).collect();
        copied
            .into_iter()
            .map(|(length, centroid)| self.edge(length, centroid))
            .collect()
    }

    fn store(&mut self, solid: MockSolid) -> KernelSolidHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    fn get(&self, handle: &KernelSolidHandle) -> Result<&MockSolid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or(KernelError::EntityNotFound {
                id: KernelId(handle.id()),
            })
    }

    fn take_face(&mut self, face: KernelId) -> Result<Vec<[f64; 3]>, KernelError> {
        self.standalone_faces
            .remove(&face.0)
            .ok_or(KernelError::EntityNotFound { id: face })
    }

    /// Piece of `target` between `lo` and `hi` along `axis`, or `None` when empty.
    fn slab_piece(
        &mut self,
        target: &MockSolid,
        axis: usize,
        lo: f64,
        hi: f64,
        cut_plane: f64,
    ) -> Option<MockSolid> {
        let full = target.bbox.max[axis] - target.bbox.min[axis];
        if hi - lo <= EPS || full <= EPS {
            return None;
        }
        let mut bbox = target.bbox;
        bbox.min[axis] = lo;
        bbox.max[axis] = hi;

        let kept: Vec<MockEdge> = target
            .edges
            .iter()
            .filter(|e| bbox.contains_point(e.centroid, EPS))
            .cloned()
            .collect();
        let mut edges = self.copy_edges(&kept);

        // Section outline where the cutter sliced the solid.
        let size = bbox.size();
        let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
        let mut center = bbox.center();
        center[axis] = cut_plane;
        edges.push(self.edge(0.5 * PI * (size[u] + size[v]), center));

        Some(MockSolid {
            bbox,
            volume: target.volume * (hi - lo) / full,
            edges,
        })
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    norm(sub(a, b))
}

fn midpoint(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        0.5 * (a[0] + b[0]),
        0.5 * (a[1] + b[1]),
        0.5 * (a[2] + b[2]),
    ]
}

/// Area, area centroid and unit normal of a planar polygon (Newell's method).
fn polygon_area_centroid(points: &[[f64; 3]]) -> Option<(f64, [f64; 3], [f64; 3])> {
    if points.len() < 3 {
        return None;
    }
    let mut newell = [0.0; 3];
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        let c = cross(*p, q);
        for k in 0..3 {
            newell[k] += c[k];
        }
    }
    let len = norm(newell);
    if len < EPS {
        return None;
    }
    let normal = [newell[0] / len, newell[1] / len, newell[2] / len];

    let p0 = points[0];
    let mut total = 0.0;
    let mut centroid = [0.0; 3];
    for w in points[1..].windows(2) {
        let area = 0.5 * dot(cross(sub(w[0], p0), sub(w[1], p0)), normal);
        for k in 0..3 {
            centroid[k] += area * (p0[k] + w[0][k] + w[1][k]) / 3.0;
        }
        total += area;
    }
    if total.abs() < EPS {
        return None;
    }
    Some((
        0.5 * len,
        [centroid[0] / total, centroid[1] / total, centroid[2] / total],
        normal,
    ))
}

fn z_range(points: &[[f64; 3]]) -> (f64, f64) {
    points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        (lo.min(p[2]), hi.max(p[2]))
    })
}

impl Kernel for MockKernel {
    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.begin(MockOp::Cylinder { radius, height })?;
        if !(radius > 0.0 && height > 0.0) {
            return Err(KernelError::InvalidGeometry {
                reason: format!("cylinder r={} h={}", radius, height),
            });
        }
        let edges = vec![
            self.edge(TAU * radius, [0.0, 0.0, 0.0]),
            self.edge(TAU * radius, [0.0, 0.0, height]),
            self.line([radius, 0.0, 0.0], [radius, 0.0, height]),
        ];
        let solid = MockSolid {
            bbox: BoundingBox::new([-radius, -radius, 0.0], [radius, radius, height]),
            volume: PI * radius * radius * height,
            edges,
        };
        Ok(self.store(solid))
    }

    fn make_box(&mut self, size: [f64; 3]) -> Result<KernelSolidHandle, KernelError> {
        self.begin(MockOp::Box { size })?;
        if size.iter().any(|s| !(*s > 0.0)) {
            return Err(KernelError::InvalidGeometry {
                reason: format!("box size {:?}", size),
            });
        }
        let bbox = BoundingBox::new([0.0; 3], size);
        let edges = self.box_edges(&bbox);
        let solid = MockSolid {
            bbox,
            volume: size[0] * size[1] * size[2],
            edges,
        };
        Ok(self.store(solid))
    }

    fn make_polygon_face(&mut self, points: &[[f64; 3]]) -> Result<KernelId, KernelError> {
        self.begin(MockOp::PolygonFace {
            points: points.len(),
        })?;
        if polygon_area_centroid(points).is_none() {
            return Err(KernelError::InvalidGeometry {
                reason: format!("degenerate polygon with {} points", points.len()),
            });
        }
        let id = self.alloc_id();
        self.standalone_faces.insert(id.0, points.to_vec());
        Ok(id)
    }

    fn extrude_face(
        &mut self,
        face: KernelId,
        direction: [f64; 3],
        depth: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.begin(MockOp::Extrude { depth })?;
        let points = self.take_face(face)?;
        let len = norm(direction);
        if len < 1e-12 {
            return Err(KernelError::InvalidGeometry {
                reason: "extrude direction has zero length".to_string(),
            });
        }
        let offset = [
            direction[0] / len * depth,
            direction[1] / len * depth,
            direction[2] / len * depth,
        ];
        let (area, _, normal) =
            polygon_area_centroid(&points).ok_or_else(|| KernelError::InvalidGeometry {
                reason: "degenerate face".to_string(),
            })?;
        let top: Vec<[f64; 3]> = points
            .iter()
            .map(|p| [p[0] + offset[0], p[1] + offset[1], p[2] + offset[2]])
            .collect();

        let n = points.len();
        let mut edges = Vec::with_capacity(3 * n);
        for i in 0..n {
            let j = (i + 1) % n;
            edges.push(self.line(points[i], points[j]));
            edges.push(self.line(top[i], top[j]));
            edges.push(self.line(points[i], top[i]));
        }

        let bbox = BoundingBox::from_points(points.iter().chain(top.iter()).copied())
            .ok_or_else(|| KernelError::InvalidGeometry {
                reason: "empty face".to_string(),
            })?;
        let solid = MockSolid {
            bbox,
            volume: area * dot(normal, offset).abs(),
            edges,
        };
        Ok(self.store(solid))
    }

    fn revolve_face(
        &mut self,
        face: KernelId,
        axis_origin: [f64; 3],
        axis_direction: [f64; 3],
        angle: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.begin(MockOp::Revolve { angle })?;
        let points = self.take_face(face)?;
        let len = norm(axis_direction);
        if len < 1e-12 {
            return Err(KernelError::InvalidGeometry {
                reason: "revolve axis has zero length".to_string(),
            });
        }
        if axis_direction[0].abs() > EPS || axis_direction[1].abs() > EPS {
            return Err(KernelError::NotSupported {
                operation: "mock revolve about an axis not parallel to Z".to_string(),
            });
        }
        let (area, centroid, _) =
            polygon_area_centroid(&points).ok_or_else(|| KernelError::InvalidGeometry {
                reason: "degenerate profile".to_string(),
            })?;
        let radial = |p: [f64; 3]| (p[0] - axis_origin[0]).hypot(p[1] - axis_origin[1]);

        let sweep = angle.abs().min(TAU);
        let mut edges = Vec::new();
        for p in &points {
            let r = radial(*p);
            if r > EPS {
                edges.push(self.edge(sweep * r, [axis_origin[0], axis_origin[1], p[2]]));
            }
        }
        let outer = points.iter().map(|p| radial(*p)).fold(0.0, f64::max);
        let (z_lo, z_hi) = z_range(&points);
        let solid = MockSolid {
            bbox: BoundingBox::new(
                [axis_origin[0] - outer, axis_origin[1] - outer, z_lo],
                [axis_origin[0] + outer, axis_origin[1] + outer, z_hi],
            ),
            volume: sweep * radial(centroid) * area,
            edges,
        };
        Ok(self.store(solid))
    }

    fn sweep_helix(
        &mut self,
        profile: &[[f64; 3]],
        path: &HelixPath,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.begin(MockOp::SweepHelix {
            turns: path.turns(),
        })?;
        if !(path.pitch > 0.0) || !(path.u_end > path.u_start) {
            return Err(KernelError::SweepFailed {
                reason: format!(
                    "degenerate helix: pitch {} over [{}, {}]",
                    path.pitch, path.u_start, path.u_end
                ),
            });
        }
        let (area, centroid, _) =
            polygon_area_centroid(profile).ok_or_else(|| KernelError::SweepFailed {
                reason: format!("degenerate profile with {} points", profile.len()),
            })?;
        let (z_lo, z_hi) = z_range(profile);
        if z_hi - z_lo > path.pitch * (1.0 + 1e-9) {
            return Err(KernelError::SweepFailed {
                reason: format!(
                    "profile spans {} axially, more than the pitch {}: turns would intersect",
                    z_hi - z_lo,
                    path.pitch
                ),
            });
        }

        let turns = path.turns();
        let z_start = path.z_at(path.u_start);
        let z_end = path.z_at(path.u_end);
        let mid = 0.5 * (z_start + z_end);

        let mut edges = Vec::new();
        for p in profile {
            let r = p[0].hypot(p[1]);
            edges.push(self.edge(
                turns * (TAU * r).hypot(path.pitch),
                [0.0, 0.0, p[2] + mid],
            ));
        }
        for u in [path.u_start, path.u_end] {
            let screw = path.screw(u);
            let placed: Vec<[f64; 3]> = profile.iter().map(|&p| screw.apply_point(p)).collect();
            for i in 0..placed.len() {
                edges.push(self.line(placed[i], placed[(i + 1) % placed.len()]));
            }
        }

        let outer = profile.iter().map(|p| p[0].hypot(p[1])).fold(0.0, f64::max);
        let solid = MockSolid {
            bbox: BoundingBox::new(
                [-outer, -outer, z_lo + z_start],
                [outer, outer, z_hi + z_end],
            ),
            volume: turns * TAU * centroid[0].hypot(centroid[1]) * area,
            edges,
        };
        Ok(self.store(solid))
    }

    fn transform(
        &mut self,
        solid: &KernelSolidHandle,
        transform: &Transform,
    ) -> Result<KernelSolidHandle, KernelError> {
        let scale = transform.scale_factor();
        self.begin(MockOp::Transform { scale })?;
        if scale < EPS {
            return Err(KernelError::InvalidGeometry {
                reason: "singular transform".to_string(),
            });
        }
        let source = self.get(solid)?.clone();
        let bbox = BoundingBox::from_points(
            source
                .bbox
                .corners()
                .iter()
                .map(|c| transform.apply_point(*c)),
        )
        .unwrap_or(source.bbox);
        let edges = source
            .edges
            .iter()
            .map(|e| (e.length * scale, transform.apply_point(e.centroid)))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|(length, centroid)| self.edge(length, centroid))
            .collect();
        let moved = MockSolid {
            bbox,
            volume: source.volume * scale.powi(3),
            edges,
        };
        Ok(self.store(moved))
    }

    fn boolean_union(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<Vec<KernelSolidHandle>, KernelError> {
        self.begin(MockOp::Union)?;
        let sa = self.get(a)?.clone();
        let sb = self.get(b)?.clone();

        let separated = (0..3).any(|i| {
            sa.bbox.min[i] > sb.bbox.max[i] + EPS || sb.bbox.min[i] > sa.bbox.max[i] + EPS
        });
        if separated {
            let ea = self.copy_edges(&sa.edges);
            let eb = self.copy_edges(&sb.edges);
            let first = self.store(MockSolid { edges: ea, ..sa });
            let second = self.store(MockSolid { edges: eb, ..sb });
            return Ok(vec![first, second]);
        }

        let shared = sa
            .bbox
            .intersection(&sb.bbox, EPS)
            .map(|overlap| overlap.volume() * sa.fill().min(sb.fill()))
            .unwrap_or(0.0);
        let volume = (sa.volume + sb.volume - shared).max(sa.volume.max(sb.volume));
        let edges = self.copy_edges(sa.edges.iter().chain(sb.edges.iter()));
        let fused = MockSolid {
            bbox: sa.bbox.union(&sb.bbox),
            volume,
            edges,
        };
        Ok(vec![self.store(fused)])
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelSolidHandle,
        b: &KernelSolidHandle,
    ) -> Result<Vec<KernelSolidHandle>, KernelError> {
        self.begin(MockOp::Subtract)?;
        let target = self.get(a)?.clone();
        let cutter = self.get(b)?.clone();

        let Some(overlap) = target.bbox.intersection(&cutter.bbox, EPS) else {
            let edges = self.copy_edges(&target.edges);
            return Ok(vec![self.store(MockSolid { edges, ..target })]);
        };

        let covers: Vec<bool> = (0..3)
            .map(|i| {
                cutter.bbox.min[i] <= target.bbox.min[i] + EPS
                    && cutter.bbox.max[i] >= target.bbox.max[i] - EPS
            })
            .collect();
        let covered = covers.iter().filter(|c| **c).count();
        let filled = cutter.fill() >= FILLED_RATIO;

        if filled && covered == 3 {
            return Ok(Vec::new());
        }
        if filled && covered == 2 {
            let axis = covers.iter().position(|c| !*c).unwrap_or(2);
            let (lo, hi) = (overlap.min[axis], overlap.max[axis]);
            let mut pieces = Vec::new();
            if let Some(piece) = self.slab_piece(&target, axis, target.bbox.min[axis], lo, lo) {
                pieces.push(piece);
            }
            if let Some(piece) = self.slab_piece(&target, axis, hi, target.bbox.max[axis], hi) {
                pieces.push(piece);
            }
            return Ok(pieces.into_iter().map(|p| self.store(p)).collect());
        }

        let removed = (overlap.volume() * cutter.fill()).min(0.5 * target.volume);
        let cut_edges: Vec<MockEdge> = cutter
            .edges
            .iter()
            .filter(|e| target.bbox.contains_point(e.centroid, EPS))
            .cloned()
            .collect();
        let edges = self.copy_edges(target.edges.iter().chain(cut_edges.iter()));
        let result = MockSolid {
            bbox: target.bbox,
            volume: target.volume - removed,
            edges,
        };
        Ok(vec![self.store(result)])
    }

    fn fillet_edges(
        &mut self,
        solid: &KernelSolidHandle,
        edges: &[KernelId],
        radius: f64,
    ) -> Result<KernelSolidHandle, KernelError> {
        self.begin(MockOp::Fillet {
            radius,
            edges: edges.len(),
        })?;
        let source = self.get(solid)?.clone();
        if edges.is_empty() {
            return Err(KernelError::FilletFailed {
                reason: "no edges selected".to_string(),
            });
        }
        if !(radius > 0.0) {
            return Err(KernelError::FilletFailed {
                reason: format!("radius must be positive, got {}", radius),
            });
        }
        let mut rounded_length = 0.0;
        for id in edges {
            let edge = source
                .edges
                .iter()
                .find(|e| e.id == *id)
                .ok_or(KernelError::EntityNotFound { id: *id })?;
            if edge.length < 2.0 * radius {
                return Err(KernelError::FilletFailed {
                    reason: format!(
                        "radius {} too large for edge {:?} of length {}",
                        radius, id, edge.length
                    ),
                });
            }
            rounded_length += edge.length;
        }

        let removed = (1.0 - PI / 4.0) * radius * radius * rounded_length;
        let edges = self.copy_edges(&source.edges);
        let rounded = MockSolid {
            bbox: source.bbox,
            volume: (source.volume - removed).max(0.5 * source.volume),
            edges,
        };
        Ok(self.store(rounded))
    }

    fn tessellate(
        &mut self,
        solid: &KernelSolidHandle,
        tolerance: &MeshTolerance,
    ) -> Result<RenderMesh, KernelError> {
        self.begin(MockOp::Tessellate {
            linear: tolerance.linear,
        })?;
        if !(tolerance.linear > 0.0) {
            return Err(KernelError::TessellationFailed {
                reason: format!("linear tolerance must be positive, got {}", tolerance.linear),
            });
        }
        let bbox = self.get(solid)?.bbox;
        Ok(self.tessellate_box(&bbox))
    }

    fn write_shape(
        &self,
        solid: &KernelSolidHandle,
        format: ShapeFormat,
    ) -> Result<String, KernelError> {
        let source = self.get(solid)?;
        let summary = serde_json::json!({
            "format": format,
            "volume": source.volume,
            "bbox": source.bbox,
            "edges": source.edges.len(),
        });
        Ok(summary.to_string())
    }

    fn release(&mut self, solid: KernelSolidHandle) {
        self.solids.remove(&solid.id());
    }
}

impl MockKernel {
    /// Box mesh over the solid's bounds: 8 vertices, 2 triangles per face.
    fn tessellate_box(&mut self, bbox: &BoundingBox) -> RenderMesh {
        let corners = bbox.corners();
        let mut mesh = RenderMesh::default();
        for c in &corners {
            mesh.vertices
                .extend([c[0] as f32, c[1] as f32, c[2] as f32]);
            let center = bbox.center();
            let n = sub(*c, center);
            let len = norm(n).max(EPS);
            mesh.normals
                .extend([(n[0] / len) as f32, (n[1] / len) as f32, (n[2] / len) as f32]);
        }
        // Outward windings over the corner numbering of `BoundingBox::corners`.
        let quads: [[u32; 4]; 6] = [
            [0, 2, 3, 1],
            [4, 5, 7, 6],
            [0, 1, 5, 4],
            [2, 6, 7, 3],
            [0, 4, 6, 2],
            [1, 3, 7, 5],
        ];
        for q in &quads {
            let start_index = mesh.indices.len() as u32;
            mesh.indices.extend([q[0], q[1], q[2], q[0], q[2], q[3]]);
            let face_id = self.alloc_id();
            mesh.face_ranges.push(FaceRange {
                face_id,
                start_index,
                end_index: mesh.indices.len() as u32,
            });
        }
        mesh
    }
}

impl KernelIntrospect for MockKernel {
    fn volume(&self, solid: &KernelSolidHandle) -> Result<f64, KernelError> {
        Ok(self.get(solid)?.volume)
    }

    fn bounding_box(&self, solid: &KernelSolidHandle) -> Result<BoundingBox, KernelError> {
        Ok(self.get(solid)?.bbox)
    }

    fn measure_edges(
        &self,
        solid: &KernelSolidHandle,
    ) -> Result<Vec<(KernelId, EdgeMeasure)>, KernelError> {
        Ok(self
            .get(solid)?
            .edges
            .iter()
            .map(|e| {
                (
                    e.id,
                    EdgeMeasure {
                        length: e.length,
                        centroid: e.centroid,
                    },
                )
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cylinder_is_exact() {
        let mut kernel = MockKernel::new();
        let cyl = kernel.make_cylinder(2.0, 3.0).unwrap();
        assert_relative_eq!(kernel.volume(&cyl).unwrap(), PI * 12.0, epsilon = 1e-12);
        let bbox = kernel.bounding_box(&cyl).unwrap();
        assert_eq!(bbox.min, [-2.0, -2.0, 0.0]);
        assert_eq!(bbox.max, [2.0, 2.0, 3.0]);
        assert_eq!(kernel.measure_edges(&cyl).unwrap().len(), 3);
    }

    #[test]
    fn test_hexagon_extrude_volume() {
        let mut kernel = MockKernel::new();
        let r = 10.0 / 3f64.sqrt();
        let points: Vec<[f64; 3]> = (0..6)
            .map(|i| {
                let a = PI / 6.0 + i as f64 * PI / 3.0;
                [r * a.cos(), r * a.sin(), 0.0]
            })
            .collect();
        let face = kernel.make_polygon_face(&points).unwrap();
        let prism = kernel.extrude_face(face, [0.0, 0.0, 1.0], 4.0).unwrap();
        // Regular hexagon area: (sqrt(3) / 2) * s^2.
        assert_relative_eq!(
            kernel.volume(&prism).unwrap(),
            3f64.sqrt() / 2.0 * 100.0 * 4.0,
            epsilon = 1e-9
        );
        assert_eq!(kernel.measure_edges(&prism).unwrap().len(), 18);
    }

    #[test]
    fn test_revolve_uses_pappus() {
        let mut kernel = MockKernel::new();
        let face = kernel
            .make_polygon_face(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 0.0, 1.0], [1.0, 0.0, 1.0]])
            .unwrap();
        let ring = kernel
            .revolve_face(face, [0.0; 3], [0.0, 0.0, 1.0], TAU)
            .unwrap();
        // Annulus between r=1 and r=2, height 1.
        assert_relative_eq!(kernel.volume(&ring).unwrap(), PI * 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_helix_rejects_profile_taller_than_pitch() {
        let mut kernel = MockKernel::new();
        let profile = [[2.0, 0.0, -0.6], [2.5, 0.0, 0.0], [2.0, 0.0, 0.6]];
        let err = kernel
            .sweep_helix(&profile, &HelixPath::new(2.0, 1.0, 5.0))
            .unwrap_err();
        assert!(matches!(err, KernelError::SweepFailed { .. }));
    }

    #[test]
    fn test_slab_cut_trims_length() {
        let mut kernel = MockKernel::new();
        let rod = kernel.make_cylinder(1.0, 10.0).unwrap();
        let mask = kernel.make_cylinder(3.0, 20.0).unwrap();
        let placed = kernel
            .transform(&mask, &Transform::translation([0.0, 0.0, 6.0]))
            .unwrap();
        let result = kernel.boolean_subtract(&rod, &placed).unwrap();
        assert_eq!(result.len(), 1);
        let bbox = kernel.bounding_box(&result[0]).unwrap();
        assert_relative_eq!(bbox.min[2], 0.0);
        assert_relative_eq!(bbox.max[2], 6.0);
        assert_relative_eq!(kernel.volume(&result[0]).unwrap(), PI * 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_slab_cut_through_middle_splits() {
        let mut kernel = MockKernel::new();
        let bar = kernel.make_box([10.0, 1.0, 1.0]).unwrap();
        let slab = kernel.make_box([2.0, 3.0, 3.0]).unwrap();
        let slab = kernel
            .transform(&slab, &Transform::translation([4.0, -1.0, -1.0]))
            .unwrap();
        let pieces = kernel.boolean_subtract(&bar, &slab).unwrap();
        assert_eq!(pieces.len(), 2);
        let volumes: Vec<f64> = pieces.iter().map(|p| kernel.volume(p).unwrap()).collect();
        assert_relative_eq!(volumes[0], 4.0, epsilon = 1e-9);
        assert_relative_eq!(volumes[1], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_enclosing_cutter_removes_everything() {
        let mut kernel = MockKernel::new();
        let small = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let big = kernel.make_cylinder(5.0, 5.0).unwrap();
        let big = kernel
            .transform(&big, &Transform::translation([0.0, 0.0, -2.0]))
            .unwrap();
        assert!(kernel.boolean_subtract(&small, &big).unwrap().is_empty());
    }

    #[test]
    fn test_separated_union_returns_both() {
        let mut kernel = MockKernel::new();
        let a = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let b = kernel.make_box([2.0, 2.0, 2.0]).unwrap();
        let b = kernel
            .transform(&b, &Transform::translation([5.0, 0.0, 0.0]))
            .unwrap();
        let result = kernel.boolean_union(&a, &b).unwrap();
        assert_eq!(result.len(), 2);

        // Touching boxes fuse.
        let c = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let c = kernel
            .transform(&c, &Transform::translation([0.0, 0.0, 1.0]))
            .unwrap();
        let fused = kernel.boolean_union(&a, &c).unwrap();
        assert_eq!(fused.len(), 1);
        assert_relative_eq!(kernel.volume(&fused[0]).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fillet_rejects_short_edges() {
        let mut kernel = MockKernel::new();
        let cube = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let edges: Vec<KernelId> = kernel
            .measure_edges(&cube)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert!(kernel.fillet_edges(&cube, &edges, 0.6).is_err());
        let rounded = kernel.fillet_edges(&cube, &edges, 0.1).unwrap();
        assert!(kernel.volume(&rounded).unwrap() < 1.0);
        assert_eq!(kernel.fillet_radii(), vec![0.6, 0.1]);
    }

    #[test]
    fn test_injected_fault_fires_once_after_skips() {
        let mut kernel = MockKernel::new();
        kernel.inject_fault(MockOpKind::Cylinder, 1);
        assert!(kernel.make_cylinder(1.0, 1.0).is_ok());
        assert!(kernel.make_cylinder(1.0, 1.0).is_err());
        assert!(kernel.make_cylinder(1.0, 1.0).is_ok());
        assert_eq!(kernel.count(MockOpKind::Cylinder), 3);
    }

    #[test]
    fn test_release_tracks_live_solids() {
        let mut kernel = MockKernel::new();
        let a = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        let b = kernel.make_box([1.0, 1.0, 1.0]).unwrap();
        assert_eq!(kernel.live_solids(), 2);
        kernel.release(a);
        kernel.release(b);
        assert_eq!(kernel.live_solids(), 0);
    }

    #[test]
    fn test_write_shape_summarizes() {
        let mut kernel = MockKernel::new();
        let cube = kernel.make_box([1.0, 2.0, 3.0]).unwrap();
        let text = kernel.write_shape(&cube, ShapeFormat::Step).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["format"], "step");
        assert_eq!(value["volume"], 6.0);
    }
}
