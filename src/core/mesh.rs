//! The planar subdivision container.
//!
//! [`Mesh`] owns the quad-edge arena and implements the Guibas–Stolfi
//! primitives (`make_edge`, `splice`) plus the derived ring navigation every
//! algorithm in this crate is written in terms of. Higher-level operations
//! (location, insertion, constraints, traversal) live in sibling modules as
//! further `impl Mesh` blocks.
//!
//! A mesh is bootstrapped from a bounding triangle or convex quadrilateral
//! whose edges are created constrained; everything afterwards happens inside
//! that polygon. The outer face carries no handle and is never triangulated.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use thiserror::Error;

use crate::core::handles::HandleType;
use crate::core::quad_edge::{EdgeId, Quad, QuadKey};
use crate::geometry::point::Point;
use crate::geometry::predicates::{orientation, Orientation};
use crate::geometry::segment::LineSegment;

/// Relative half-width of the on-edge band, as a fraction of edge length.
pub const DEFAULT_EDGE_TOLERANCE: f64 = 1e-9;

/// Point coincidence radius, as a fraction of the bounding box diagonal.
pub const DEFAULT_POINT_TOLERANCE_FACTOR: f64 = 1e-9;

/// Errors from mesh construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MeshBuildError {
    /// The bounding points are collinear or coincident.
    #[error("bounding points are collinear or coincident")]
    DegenerateBounds,
    /// The bounding quadrilateral is not strictly convex.
    #[error("bounding quadrilateral is not strictly convex")]
    NonConvexBounds,
}

/// A mutable planar subdivision over a quad-edge arena.
///
/// The three type parameters are the application payloads attached to points,
/// directed edges, and faces respectively; all default to `()`.
///
/// # Examples
///
/// ```
/// use subdivision::core::mesh::Mesh;
/// use subdivision::geometry::point::Point;
///
/// let mesh: Mesh = Mesh::from_triangle(
///     Point::new(0.0, 0.0),
///     Point::new(10.0, 0.0),
///     Point::new(0.0, 10.0),
/// )
/// .unwrap();
/// assert_eq!(mesh.edge_count(), 3);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Mesh<PH = (), EH = (), FH = ()>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    pub(crate) quads: SlotMap<QuadKey, Quad<PH, EH, FH>>,
    pub(crate) start_edge: EdgeId,
    /// Undirected edges alive in the subdivision (deferred-deleted excluded).
    pub(crate) edge_count: usize,
    /// Records flagged for deferred deletion, awaiting [`Mesh::collect`].
    pub(crate) dead_count: usize,
    pub(crate) tolerance: f64,
    pub(crate) point_distance_tolerance: f64,
    pub(crate) bounding_points: Vec<Point>,
}

impl<PH, EH, FH> Mesh<PH, EH, FH>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    fn empty(bounding_points: Vec<Point>) -> Self {
        let diagonal = bounding_box_diagonal(&bounding_points);
        Self {
            quads: SlotMap::with_key(),
            start_edge: EdgeId::default(),
            edge_count: 0,
            dead_count: 0,
            tolerance: DEFAULT_EDGE_TOLERANCE,
            point_distance_tolerance: (diagonal * DEFAULT_POINT_TOLERANCE_FACTOR).max(1e-12),
            bounding_points,
        }
    }

    /// Creates a subdivision bounded by the triangle `(a, b, c)`.
    ///
    /// The triangle is normalized to counterclockwise order and its edges are
    /// created constrained, so the boundary can never be swapped or deleted.
    ///
    /// # Errors
    ///
    /// Returns [`MeshBuildError::DegenerateBounds`] when the three points are
    /// collinear or coincident.
    pub fn from_triangle(a: Point, b: Point, c: Point) -> Result<Self, MeshBuildError> {
        let (b, c) = match orientation(a, b, c) {
            Orientation::POSITIVE => (b, c),
            Orientation::NEGATIVE => (c, b),
            Orientation::DEGENERATE => return Err(MeshBuildError::DegenerateBounds),
        };

        let mut mesh = Self::empty(vec![a, b, c]);
        let ea = mesh.make_edge_raw(a, b, true);
        let eb = mesh.make_edge_raw(b, c, true);
        mesh.splice(ea.sym(), eb);
        let ec = mesh.make_edge_raw(c, a, true);
        mesh.splice(eb.sym(), ec);
        mesh.splice(ec.sym(), ea);
        mesh.start_edge = ea;
        Ok(mesh)
    }

    /// Creates a subdivision bounded by the convex quadrilateral
    /// `(a, b, c, d)`, split into two triangles by the diagonal `c -> a`.
    ///
    /// Vertex order is normalized to counterclockwise; the four boundary
    /// edges are created constrained, the diagonal is not.
    ///
    /// # Errors
    ///
    /// Returns [`MeshBuildError::DegenerateBounds`] for a near-zero-area
    /// polygon and [`MeshBuildError::NonConvexBounds`] when any corner is
    /// reflex or straight.
    pub fn from_quadrilateral(
        a: Point,
        b: Point,
        c: Point,
        d: Point,
    ) -> Result<Self, MeshBuildError> {
        let mut corners = [a, b, c, d];
        let area: f64 = (0..4)
            .map(|i| corners[i].cross(corners[(i + 1) & 3]))
            .sum();
        if area.abs() <= f64::EPSILON * 64.0 {
            return Err(MeshBuildError::DegenerateBounds);
        }
        if area < 0.0 {
            corners.reverse();
        }
        for i in 0..4 {
            let turn = orientation(corners[i], corners[(i + 1) & 3], corners[(i + 2) & 3]);
            if turn != Orientation::POSITIVE {
                return Err(MeshBuildError::NonConvexBounds);
            }
        }

        let [a, b, c, d] = corners;
        let mut mesh = Self::empty(corners.to_vec());
        let ea = mesh.make_edge_raw(a, b, true);
        let eb = mesh.make_edge_raw(b, c, true);
        mesh.splice(ea.sym(), eb);
        let ec = mesh.make_edge_raw(c, d, true);
        mesh.splice(eb.sym(), ec);
        let ed = mesh.make_edge_raw(d, a, true);
        mesh.splice(ec.sym(), ed);
        mesh.splice(ed.sym(), ea);
        // Diagonal c -> a splits the polygon into two triangles.
        mesh.connect_unchecked(eb, ea, false);
        mesh.start_edge = ea;
        Ok(mesh)
    }

    // =========================================================================
    // GUIBAS–STOLFI PRIMITIVES
    // =========================================================================

    /// Allocates a fresh isolated edge `org -> dest`.
    pub(crate) fn make_edge_raw(&mut self, org: Point, dest: Point, constrained: bool) -> EdgeId {
        let key = self
            .quads
            .insert_with_key(|k| Quad::isolated(k, org, dest, constrained));
        self.edge_count += 1;
        EdgeId::new(key, 0)
    }

    /// The splice primitive: swaps the onext rings of `a` and `b` and, in
    /// lockstep, the lnext rings of their duals. Splicing twice with the same
    /// arguments undoes itself.
    pub(crate) fn splice(&mut self, a: EdgeId, b: EdgeId) {
        let alpha = self.o_next(a).rot();
        let beta = self.o_next(b).rot();

        let a_next = self.o_next(a);
        let b_next = self.o_next(b);
        let alpha_next = self.o_next(alpha);
        let beta_next = self.o_next(beta);

        self.set_next(a, b_next);
        self.set_next(b, a_next);
        self.set_next(alpha, beta_next);
        self.set_next(beta, alpha_next);
    }

    /// Detaches both directions of `e` from their origin rings.
    pub(crate) fn unsplice(&mut self, e: EdgeId) {
        let p = self.o_prev(e);
        self.splice(e, p);
        let ps = self.o_prev(e.sym());
        self.splice(e.sym(), ps);
    }

    /// Connects `dest(a)` to `org(b)` with a new edge sharing their face.
    ///
    /// Endpoint handles are copied from `a` and `b`; both sides of the new
    /// edge take the face handle left of `a`. Topological validity (both
    /// edges bordering the same face) is the caller's responsibility.
    pub(crate) fn connect_unchecked(&mut self, a: EdgeId, b: EdgeId, constrained: bool) -> EdgeId {
        let e = self.make_edge_raw(self.dest(a), self.org(b), constrained);
        let face = self.face_handle(a);
        let a_lnext = self.l_next(a);
        self.splice(e, a_lnext);
        self.splice(e.sym(), b);
        self.set_point_handle(e, self.point_handle(a.sym()));
        self.set_point_handle(e.sym(), self.point_handle(b));
        self.set_face_handle(e, face);
        self.set_face_handle(e.sym(), face);
        e
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Next edge counterclockwise around the origin of `e`.
    ///
    /// # Panics
    ///
    /// Panics if `e` does not refer to a record in the arena.
    #[must_use]
    #[inline]
    pub fn o_next(&self, e: EdgeId) -> EdgeId {
        self.quads[e.quad].next[e.rot as usize]
    }

    #[inline]
    fn set_next(&mut self, e: EdgeId, next: EdgeId) {
        self.quads[e.quad].next[e.rot as usize] = next;
    }

    /// Next edge clockwise around the origin of `e`.
    #[must_use]
    #[inline]
    pub fn o_prev(&self, e: EdgeId) -> EdgeId {
        self.o_next(e.rot()).rot()
    }

    /// Next edge counterclockwise around the left face of `e`.
    #[must_use]
    #[inline]
    pub fn l_next(&self, e: EdgeId) -> EdgeId {
        self.o_next(e.inv_rot()).rot()
    }

    /// Previous edge around the left face of `e`.
    #[must_use]
    #[inline]
    pub fn l_prev(&self, e: EdgeId) -> EdgeId {
        self.o_next(e).sym()
    }

    /// Next edge clockwise around the destination of `e`.
    #[must_use]
    #[inline]
    pub fn d_prev(&self, e: EdgeId) -> EdgeId {
        self.o_next(e.inv_rot()).inv_rot()
    }

    /// Next edge clockwise around the right face of `e`.
    #[must_use]
    #[inline]
    pub fn r_prev(&self, e: EdgeId) -> EdgeId {
        self.o_next(e.sym())
    }

    // =========================================================================
    // GEOMETRY AND PAYLOAD ACCESSORS
    // =========================================================================

    /// Origin of the primal edge `e`.
    ///
    /// # Panics
    ///
    /// Panics if `e` does not refer to a record in the arena.
    #[must_use]
    #[inline]
    pub fn org(&self, e: EdgeId) -> Point {
        debug_assert!(e.is_primal());
        self.quads[e.quad].endpoints[point_slot(e)]
    }

    /// Destination of the primal edge `e`.
    #[must_use]
    #[inline]
    pub fn dest(&self, e: EdgeId) -> Point {
        self.org(e.sym())
    }

    #[inline]
    pub(crate) fn set_org(&mut self, e: EdgeId, p: Point) {
        debug_assert!(e.is_primal());
        self.quads[e.quad].endpoints[point_slot(e)] = p;
    }

    #[inline]
    pub(crate) fn set_dest(&mut self, e: EdgeId, p: Point) {
        self.set_org(e.sym(), p);
    }

    /// The segment from `org(e)` to `dest(e)`.
    #[must_use]
    pub fn edge_segment(&self, e: EdgeId) -> LineSegment {
        LineSegment::new(self.org(e), self.dest(e))
    }

    /// Payload of the vertex at the origin of `e`, if any.
    #[must_use]
    pub fn point_handle(&self, e: EdgeId) -> Option<PH> {
        debug_assert!(e.is_primal());
        self.quads[e.quad].point_handles[point_slot(e)]
    }

    /// Sets the payload of the vertex record at the origin of `e`.
    ///
    /// Vertex payloads are stored per edge record; insertion routines copy
    /// them onto every spoke they create, so reads through any spoke agree.
    pub fn set_point_handle(&mut self, e: EdgeId, handle: Option<PH>) {
        debug_assert!(e.is_primal());
        self.quads[e.quad].point_handles[point_slot(e)] = handle;
    }

    /// Payload of the directed edge `e`, if any.
    #[must_use]
    pub fn edge_handle(&self, e: EdgeId) -> Option<EH> {
        debug_assert!(e.is_primal());
        self.quads[e.quad].edge_handles[point_slot(e)]
    }

    /// Sets the payload of the directed edge `e`.
    pub fn set_edge_handle(&mut self, e: EdgeId, handle: Option<EH>) {
        debug_assert!(e.is_primal());
        self.quads[e.quad].edge_handles[point_slot(e)] = handle;
    }

    /// Payload of the face left of the primal edge `e`, if any.
    ///
    /// The outer face always reads `None`.
    #[must_use]
    pub fn face_handle(&self, e: EdgeId) -> Option<FH> {
        debug_assert!(e.is_primal());
        self.quads[e.quad].face_handles[face_slot(e)]
    }

    /// Sets the payload of the face left of the primal edge `e`.
    ///
    /// This sets the handle slot on this record only; face-level assignment
    /// (all edges of a ring) is done by the constraint machinery.
    pub fn set_face_handle(&mut self, e: EdgeId, handle: Option<FH>) {
        debug_assert!(e.is_primal());
        self.quads[e.quad].face_handles[face_slot(e)] = handle;
    }

    /// Payload of the face right of the primal edge `e`, if any.
    #[must_use]
    pub fn right_face_handle(&self, e: EdgeId) -> Option<FH> {
        self.face_handle(e.sym())
    }

    /// The corners of the face left of `e`, in ring order starting at
    /// `org(e)`.
    #[must_use]
    pub fn face_polygon(&self, e: EdgeId) -> Vec<Point> {
        let mut corners = Vec::new();
        let mut walker = e;
        for _ in 0..=2 * self.edge_count {
            corners.push(self.org(walker));
            walker = self.l_next(walker);
            if walker == e {
                return corners;
            }
        }
        tracing::warn!(edge = %e, "left-face ring did not close while collecting corners");
        corners
    }

    /// The three corners of the triangular face left of `e`, starting at
    /// `org(e)`, or `None` when that face is not a triangle.
    #[must_use]
    pub fn triangle(&self, e: EdgeId) -> Option<[Point; 3]> {
        let second = self.l_next(e);
        let third = self.l_next(second);
        if self.l_next(third) == e {
            Some([self.org(e), self.org(second), self.org(third)])
        } else {
            None
        }
    }

    /// Whether `e` is constrained (boundary or application constraint).
    #[must_use]
    pub fn is_constrained(&self, e: EdgeId) -> bool {
        self.quads[e.quad].constrained
    }

    pub(crate) fn set_constrained(&mut self, e: EdgeId, constrained: bool) {
        self.quads[e.quad].constrained = constrained;
    }

    // =========================================================================
    // BOOKKEEPING
    // =========================================================================

    /// Whether `e` refers to a live (not removed, not deferred-deleted)
    /// record.
    #[must_use]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.quads.get(e.quad).is_some_and(|q| !q.deleted)
    }

    /// Number of live undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of records flagged for deferred deletion and not yet
    /// reclaimed.
    #[must_use]
    pub fn pending_reclaim(&self) -> usize {
        self.dead_count
    }

    /// A live edge to start walks from.
    #[must_use]
    pub fn start_edge(&self) -> EdgeId {
        self.start_edge
    }

    /// The bounding polygon's vertices, in counterclockwise order.
    #[must_use]
    pub fn bounding_points(&self) -> &[Point] {
        &self.bounding_points
    }

    /// Relative on-edge tolerance (fraction of edge length).
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Sets the relative on-edge tolerance.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance.max(0.0);
    }

    /// Absolute point coincidence radius.
    #[must_use]
    pub fn point_distance_tolerance(&self) -> f64 {
        self.point_distance_tolerance
    }

    /// Sets the absolute point coincidence radius.
    pub fn set_point_distance_tolerance(&mut self, tolerance: f64) {
        self.point_distance_tolerance = tolerance.max(0.0);
    }

    /// Whether `p` lies inside or on the bounding polygon.
    #[must_use]
    pub fn domain_contains(&self, p: Point) -> bool {
        let n = self.bounding_points.len();
        (0..n).all(|i| {
            let a = self.bounding_points[i];
            let b = self.bounding_points[(i + 1) % n];
            orientation(a, b, p) != Orientation::NEGATIVE
        })
    }

    pub(crate) fn any_live_edge(&self) -> Option<EdgeId> {
        self.quads
            .iter()
            .find(|(_, q)| !q.deleted)
            .map(|(k, _)| EdgeId::new(k, 0))
    }

    /// Re-anchors the start edge after `removed` leaves the arena.
    pub(crate) fn repair_start_edge(&mut self, removed: QuadKey) {
        if self.start_edge.quad == removed {
            if let Some(e) = self.any_live_edge() {
                self.start_edge = e;
            }
        }
    }

    /// Whether the face left of `e` is an interior face.
    ///
    /// Interior face rings turn counterclockwise: no clockwise corner and at
    /// least one counterclockwise one. The outer face fails this because its
    /// ring turns clockwise at every convex corner of the boundary.
    #[must_use]
    pub fn is_interior_face(&self, e: EdgeId) -> bool {
        let mut saw_ccw = false;
        let mut walker = e;
        // Bounded by the total edge count in case of corrupted rings.
        for _ in 0..=2 * self.edge_count {
            let next = self.l_next(walker);
            match orientation(self.org(walker), self.dest(walker), self.dest(next)) {
                Orientation::NEGATIVE => return false,
                Orientation::POSITIVE => saw_ccw = true,
                Orientation::DEGENERATE => {}
            }
            walker = next;
            if walker == e {
                return saw_ccw;
            }
        }
        tracing::warn!(edge = %e, "left-face ring did not close while classifying face");
        false
    }
}

/// Endpoint slot of a primal edge: rotation 0 owns slot 0, rotation 2 slot 1.
#[inline]
const fn point_slot(e: EdgeId) -> usize {
    (e.rot >> 1) as usize
}

/// Face-handle slot for the face left of a primal edge.
///
/// The left face is the origin of `e.inv_rot()`; dual rotation 1 owns slot 0
/// and dual rotation 3 slot 1.
#[inline]
const fn face_slot(e: EdgeId) -> usize {
    (e.inv_rot().rot >> 1) as usize
}

pub(crate) fn bounding_box_diagonal(points: &[Point]) -> f64 {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min = Point::new(min.x.min(p.x), min.y.min(p.y));
        max = Point::new(max.x.max(p.x), max.y.max(p.y));
    }
    if points.is_empty() {
        0.0
    } else {
        min.distance_to(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Mesh {
        Mesh::from_triangle(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        )
        .unwrap()
    }

    #[test]
    fn test_from_triangle_rings() {
        let mesh = unit_triangle();
        assert_eq!(mesh.edge_count(), 3);

        let ea = mesh.start_edge();
        assert_eq!(mesh.org(ea), Point::new(0.0, 0.0));
        assert_eq!(mesh.dest(ea), Point::new(10.0, 0.0));

        // Interior face ring: a->b, b->c, c->a.
        let eb = mesh.l_next(ea);
        let ec = mesh.l_next(eb);
        assert_eq!(mesh.org(eb), Point::new(10.0, 0.0));
        assert_eq!(mesh.dest(eb), Point::new(0.0, 10.0));
        assert_eq!(mesh.dest(ec), Point::new(0.0, 0.0));
        assert_eq!(mesh.l_next(ec), ea);

        // Outer face ring closes in three steps as well.
        let out = ea.sym();
        assert_eq!(mesh.l_next(mesh.l_next(mesh.l_next(out))), out);

        assert!(mesh.is_interior_face(ea));
        assert!(!mesh.is_interior_face(out));
    }

    #[test]
    fn test_from_triangle_normalizes_orientation() {
        // Clockwise input still yields a ccw interior face.
        let mesh = Mesh::<(), (), ()>::from_triangle(
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        )
        .unwrap();
        assert!(mesh.is_interior_face(mesh.start_edge()));
    }

    #[test]
    fn test_from_triangle_rejects_collinear() {
        let result = Mesh::<(), (), ()>::from_triangle(
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
        );
        assert_eq!(result.unwrap_err(), MeshBuildError::DegenerateBounds);
    }

    #[test]
    fn test_from_quadrilateral() {
        let mesh = Mesh::<(), (), ()>::from_quadrilateral(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        )
        .unwrap();

        // Four boundary edges plus the diagonal.
        assert_eq!(mesh.edge_count(), 5);

        // Both triangles left of the boundary edges are interior and close
        // in three lnext steps.
        let ea = mesh.start_edge();
        assert!(mesh.is_constrained(ea));
        assert_eq!(mesh.l_next(mesh.l_next(mesh.l_next(ea))), ea);
        assert!(mesh.is_interior_face(ea));

        // The diagonal is the only unconstrained edge.
        let diagonal = mesh
            .quads
            .iter()
            .map(|(k, _)| EdgeId::new(k, 0))
            .find(|&e| !mesh.is_constrained(e))
            .unwrap();
        let ends = [mesh.org(diagonal), mesh.dest(diagonal)];
        assert!(ends.contains(&Point::new(0.0, 0.0)));
        assert!(ends.contains(&Point::new(100.0, 100.0)));
    }

    #[test]
    fn test_from_quadrilateral_rejects_nonconvex() {
        let result = Mesh::<(), (), ()>::from_quadrilateral(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 10.0),
        );
        assert_eq!(result.unwrap_err(), MeshBuildError::NonConvexBounds);
    }

    #[test]
    fn test_splice_is_involutive() {
        let mut mesh = unit_triangle();
        let ea = mesh.start_edge();
        let eb = mesh.l_next(ea);
        let before: Vec<_> = mesh.quads.values().map(|q| q.next).collect();

        mesh.splice(ea, eb);
        mesh.splice(ea, eb);

        let after: Vec<_> = mesh.quads.values().map(|q| q.next).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_navigation_identities() {
        let mesh = unit_triangle();
        let ea = mesh.start_edge();
        for e in [ea, ea.sym(), mesh.l_next(ea), mesh.l_next(ea).sym()] {
            assert_eq!(mesh.o_prev(mesh.o_next(e)), e);
            assert_eq!(mesh.l_prev(mesh.l_next(e)), e);
            assert_eq!(mesh.o_next(mesh.o_prev(e)), e);
        }
    }

    #[test]
    fn test_domain_contains() {
        let mesh = unit_triangle();
        assert!(mesh.domain_contains(Point::new(1.0, 1.0)));
        assert!(mesh.domain_contains(Point::new(0.0, 0.0)));
        assert!(mesh.domain_contains(Point::new(5.0, 5.0)));
        assert!(!mesh.domain_contains(Point::new(6.0, 6.0)));
        assert!(!mesh.domain_contains(Point::new(-1.0, 3.0)));
    }

    #[test]
    fn test_face_polygon_and_triangle() {
        let mut mesh = Mesh::<(), (), ()>::from_quadrilateral(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        )
        .unwrap();
        let ea = mesh.start_edge();

        let tri = mesh.triangle(ea).unwrap();
        assert_eq!(
            tri,
            [
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0)
            ]
        );
        assert_eq!(mesh.face_polygon(ea), tri.to_vec());

        // Removing the diagonal leaves a quadrilateral face: no triangle,
        // four corners.
        let diagonal = mesh
            .quads
            .iter()
            .map(|(k, _)| EdgeId::new(k, 0))
            .find(|&e| !mesh.is_constrained(e))
            .unwrap();
        mesh.delete_edge(diagonal).unwrap();
        assert_eq!(mesh.triangle(ea), None);
        assert_eq!(mesh.face_polygon(ea).len(), 4);
    }

    #[test]
    fn test_right_face_handle_reads_other_side() {
        let mut mesh: Mesh<(), (), u8> = Mesh::from_triangle(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        )
        .unwrap();
        let e = mesh.start_edge();

        mesh.set_face_handle(e.sym(), Some(4));
        assert_eq!(mesh.right_face_handle(e), Some(4));
        assert_eq!(mesh.face_handle(e), None);
        assert_eq!(mesh.right_face_handle(e.sym()), None);
    }

    #[test]
    fn test_handles_roundtrip() {
        let mut mesh: Mesh<u32, char, i8> = Mesh::from_triangle(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        )
        .unwrap();
        let e = mesh.start_edge();

        assert_eq!(mesh.point_handle(e), None);
        mesh.set_point_handle(e, Some(7));
        assert_eq!(mesh.point_handle(e), Some(7));

        mesh.set_edge_handle(e, Some('x'));
        assert_eq!(mesh.edge_handle(e), Some('x'));
        assert_eq!(mesh.edge_handle(e.sym()), None);

        mesh.set_face_handle(e, Some(-3));
        assert_eq!(mesh.face_handle(e), Some(-3));
        assert_eq!(mesh.face_handle(e.sym()), None);
    }
}
