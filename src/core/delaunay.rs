//! Incremental site insertion with Delaunay maintenance.
//!
//! [`Mesh::insert_site`] classifies the query against the located geometry:
//! coincident with a vertex (returns it), on an edge (splits the edge and
//! retriangulates both side faces by fanning from the new vertex), or inside
//! a face (fans the face from the new vertex). With `make_delaunay` set, a
//! Lawson worklist then flips suspect edges until the local Delaunay
//! criterion holds; flips stop at constrained edges, so constraints survive
//! insertion.
//!
//! Exactly cocircular configurations classify as boundary cases and are never
//! flipped, which keeps regular grids stable. A failed restoration pass is
//! logged, not fatal: the subdivision stays topologically valid either way.

use thiserror::Error;

use crate::core::collections::SmallBuffer;
use crate::core::handles::HandleType;
use crate::core::locate::{LocateError, LocatorContext};
use crate::core::mesh::Mesh;
use crate::core::quad_edge::EdgeId;
use crate::geometry::point::Point;
use crate::geometry::predicates::{in_circle, orientation, InCircle, Orientation};

/// Errors from site insertion.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InsertSiteError {
    /// The point lies outside the bounding polygon.
    #[error("point ({x}, {y}) lies outside the bounding polygon")]
    OutsideDomain {
        /// Query x coordinate.
        x: f64,
        /// Query y coordinate.
        y: f64,
    },
    /// Point location failed.
    #[error(transparent)]
    Locate(#[from] LocateError),
}

impl<PH, EH, FH> Mesh<PH, EH, FH>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    /// Inserts a site at `point` and returns an edge whose origin is the
    /// resulting vertex.
    ///
    /// A point within the point distance tolerance of an existing vertex
    /// returns that vertex without changing the mesh, so insertion is
    /// idempotent. `force_on_edge` bypasses the on-edge tolerance test and
    /// projects the point onto the located edge; the constraint machinery
    /// uses this for computed intersection points.
    ///
    /// # Errors
    ///
    /// [`InsertSiteError::OutsideDomain`] for points outside the bounding
    /// polygon; location failures pass through.
    pub fn insert_site(
        &mut self,
        point: Point,
        make_delaunay: bool,
        force_on_edge: bool,
        ctx: &mut LocatorContext,
    ) -> Result<EdgeId, InsertSiteError> {
        self.insert_site_with_handle(point, None, make_delaunay, force_on_edge, ctx)
    }

    /// [`Mesh::insert_site`], additionally attaching `handle` to the vertex.
    ///
    /// When the point coincides with an existing vertex that has no payload
    /// yet, the handle is attached to it; an existing payload is kept.
    ///
    /// # Errors
    ///
    /// Same as [`Mesh::insert_site`].
    pub fn insert_site_with_handle(
        &mut self,
        point: Point,
        handle: Option<PH>,
        make_delaunay: bool,
        force_on_edge: bool,
        ctx: &mut LocatorContext,
    ) -> Result<EdgeId, InsertSiteError> {
        if !self.domain_contains(point) {
            return Err(InsertSiteError::OutsideDomain {
                x: point.x,
                y: point.y,
            });
        }

        let e = self.locate(point, ctx)?;
        let pdt = self.point_distance_tolerance;

        // Vertex coincidence: nothing to insert.
        if point.distance_to(self.org(e)) <= pdt {
            self.adopt_vertex_handle(e, handle);
            return Ok(e);
        }
        if point.distance_to(self.dest(e)) <= pdt {
            let v = e.sym();
            self.adopt_vertex_handle(v, handle);
            return Ok(v);
        }

        // The walk guarantees the point is in the located face, not that it
        // is the located edge the point sits on; the whole ring is a split
        // candidate.
        if let Some(re) = self.ring_edge_for_split(e, point, force_on_edge) {
            let spoke = self.insert_point_on_edge(re, point, handle, make_delaunay);
            ctx.remember(spoke);
            return Ok(spoke);
        }

        let anchor = self.face_anchor_for(e, point);
        let spoke = self.fan_into_face(anchor, point, handle);
        if make_delaunay {
            self.restore_delaunay(spoke);
        }
        ctx.remember(spoke);
        Ok(spoke)
    }

    /// Splits `e` at (the projection of) `p` and retriangulates the two side
    /// faces by fanning from the new vertex. Returns a spoke of the new
    /// vertex.
    ///
    /// Projections landing within tolerance of an endpoint return that
    /// endpoint instead of splitting.
    pub(crate) fn insert_point_on_edge(
        &mut self,
        e: EdgeId,
        p: Point,
        handle: Option<PH>,
        make_delaunay: bool,
    ) -> EdgeId {
        let seg = self.edge_segment(e);
        let t = seg.project_parameter(p).clamp(0.0, 1.0);
        let p = seg.point_at(t);
        let pdt = self.point_distance_tolerance;
        if p.distance_to(self.org(e)) <= pdt {
            self.adopt_vertex_handle(e, handle);
            return e;
        }
        if p.distance_to(self.dest(e)) <= pdt {
            let v = e.sym();
            self.adopt_vertex_handle(v, handle);
            return v;
        }

        let ne = self.split_at(e, p);
        self.set_point_handle(ne, handle);
        self.set_point_handle(e.sym(), handle);

        // The outer face stays untriangulated; a boundary split only fans
        // the interior side.
        if self.is_interior_face(ne) {
            self.fan_left_face(ne);
        }
        let back = e.sym();
        if self.is_interior_face(back) {
            self.fan_left_face(back);
        }
        if make_delaunay {
            self.restore_delaunay(ne);
        }
        ne
    }

    /// Picks the edge of the located face's ring that `point` lies on, if
    /// any. With `force` set, the nearest in-band ring edge wins regardless
    /// of the distance test.
    fn ring_edge_for_split(&self, e: EdgeId, point: Point, force: bool) -> Option<EdgeId> {
        let mut best: Option<(f64, EdgeId)> = None;
        let mut walker = e;
        for _ in 0..=2 * self.edge_count {
            let seg = self.edge_segment(walker);
            let t = seg.project_parameter(point);
            if (-self.tolerance..=1.0 + self.tolerance).contains(&t) {
                let rel = seg.distance_to_line(point) / seg.length().max(1.0);
                if best.map_or(true, |(bd, _)| rel < bd) {
                    best = Some((rel, walker));
                }
            }
            walker = self.l_next(walker);
            if walker == e {
                break;
            }
        }
        match best {
            Some((rel, re)) if force || rel <= self.tolerance => Some(re),
            _ => None,
        }
    }

    /// Attaches `handle` to the vertex at `org(v)` unless it already carries
    /// a payload. Writes every spoke's origin slot so reads agree.
    fn adopt_vertex_handle(&mut self, v: EdgeId, handle: Option<PH>) {
        if handle.is_none() || self.point_handle(v).is_some() {
            return;
        }
        let mut s = v;
        for _ in 0..=2 * self.edge_count {
            self.set_point_handle(s, handle);
            s = self.o_next(s);
            if s == v {
                break;
            }
        }
    }

    /// Re-aims the fan anchor when location and containment disagree, which
    /// tolerance noise can produce near edges. Picks the ring edge nearest
    /// the point and orients it so the point is not strictly right of it.
    fn face_anchor_for(&self, e: EdgeId, point: Point) -> EdgeId {
        if self.face_contains(e, point) {
            return e;
        }
        tracing::warn!(
            x = point.x,
            y = point.y,
            edge = %e,
            "located face does not contain the insertion point, re-aiming"
        );
        let mut best = e;
        let mut best_distance = f64::INFINITY;
        let mut walker = e;
        for _ in 0..=2 * self.edge_count {
            let d = self.edge_segment(walker).distance_to_point(point);
            if d < best_distance {
                best_distance = d;
                best = walker;
            }
            walker = self.l_next(walker);
            if walker == e {
                break;
            }
        }
        if self.lies_right_strict(best, point) {
            best.sym()
        } else {
            best
        }
    }

    /// Fans the face left of `e` from a new vertex at `point`, connecting it
    /// to every corner of the ring. Returns a spoke with origin `point`.
    fn fan_into_face(&mut self, e: EdgeId, point: Point, handle: Option<PH>) -> EdgeId {
        let first = self.org(e);
        let face = self.face_handle(e);

        let mut base = self.make_edge_raw(first, point, false);
        self.set_point_handle(base, self.point_handle(e));
        self.set_point_handle(base.sym(), handle);
        self.set_face_handle(base, face);
        self.set_face_handle(base.sym(), face);
        self.splice(base, e);
        let spoke = base.sym();

        let mut e = e;
        let mut guard = 0;
        loop {
            base = self.connect_unchecked(e, base.sym(), false);
            e = self.o_prev(base);
            if self.dest(e) == first {
                break;
            }
            guard += 1;
            if guard > self.edge_count {
                tracing::warn!(point = %point, "face fan did not close");
                break;
            }
        }
        spoke
    }

    /// Triangulates the face left of `start` by fanning from `org(start)`.
    pub(crate) fn fan_left_face(&mut self, start: EdgeId) {
        let mut e = start;
        let mut guard = 0;
        while self.l_next(self.l_next(self.l_next(e))) != e {
            let chord = self.connect_unchecked(self.l_next(e), e, false);
            e = chord.sym();
            guard += 1;
            if guard > self.edge_count {
                tracing::warn!(edge = %start, "face fan did not reach a triangle");
                break;
            }
        }
    }

    // =========================================================================
    // LAWSON FLIPS
    // =========================================================================

    /// Restores the local Delaunay criterion around the vertex `org(spoke)`
    /// by flipping suspect edges, never crossing constraints.
    pub(crate) fn restore_delaunay(&mut self, spoke: EdgeId) {
        let mut suspects: SmallBuffer<EdgeId, 16> = SmallBuffer::new();
        let mut s = spoke;
        for _ in 0..=2 * self.edge_count {
            suspects.push(self.l_next(s));
            s = self.o_next(s);
            if s == spoke {
                break;
            }
        }

        let budget = 32 * self.edge_count + 64;
        let mut steps = 0;
        while let Some(e) = suspects.pop() {
            steps += 1;
            if steps > budget {
                tracing::warn!(steps, "delaunay restoration exceeded its flip budget");
                break;
            }
            if !self.contains_edge(e) || self.is_constrained(e) {
                continue;
            }
            if !self.flip_improves(e) {
                continue;
            }
            if !self.flip_is_safe(e) {
                tracing::debug!(edge = %e, "skipping flip inside non-convex quadrilateral");
                continue;
            }
            self.swap_unchecked(e);
            suspects.extend([
                self.l_next(e),
                self.l_prev(e),
                self.l_next(e.sym()),
                self.l_prev(e.sym()),
            ]);
        }
    }

    /// The local Delaunay violation test: the apex of the right face lies
    /// strictly inside the circumcircle of the left face.
    pub(crate) fn flip_improves(&self, e: EdgeId) -> bool {
        let a = self.org(e);
        let b = self.dest(e);
        let left = self.dest(self.l_next(e));
        let right = self.dest(self.l_next(e.sym()));
        in_circle(a, b, left, right) == InCircle::INSIDE
    }

    /// Whether flipping `e` keeps both faces valid: the surrounding
    /// quadrilateral must be strictly convex.
    pub(crate) fn flip_is_safe(&self, e: EdgeId) -> bool {
        let corners = [
            self.org(e),
            self.dest(self.l_next(e.sym())),
            self.dest(e),
            self.dest(self.l_next(e)),
        ];
        (0..4).all(|i| {
            orientation(corners[i], corners[(i + 1) & 3], corners[(i + 2) & 3])
                == Orientation::POSITIVE
        })
    }
}
