//! Constrained segment insertion.
//!
//! [`Mesh::insert_edge`] forces a segment into the triangulation as a chain
//! of constrained edges. The segment is consumed in chunks: each chunk runs
//! from the current vertex to the next event on the segment, which is either
//! the far endpoint, an existing vertex lying on the segment, or a crossing
//! with another constrained edge. Constrained crossings get a vertex inserted
//! at the computed intersection point, splitting both constraints there.
//!
//! Within a chunk only unconstrained edges cross the segment; they are
//! removed by swapping them out of the way, deferring any swap whose
//! surrounding quadrilateral is not convex until other swaps make it so.
//! Once the chunk's edge exists it is marked constrained and the requested
//! face handles are assigned to its sides, oriented by the segment direction.
//!
//! Re-inserting an existing constraint is a no-op walk over its chain, so
//! insertion is idempotent.

use thiserror::Error;

use crate::core::delaunay::InsertSiteError;
use crate::core::handles::HandleType;
use crate::core::locate::{LocateError, LocatorContext, WalkEvent, WalkMode};
use crate::core::mesh::Mesh;
use crate::core::quad_edge::EdgeId;
use crate::geometry::point::Point;
use crate::geometry::predicates::{orientation, Orientation};
use crate::geometry::segment::LineSegment;

/// How many full clearing passes a chunk may take before giving up.
const MAX_CLEAR_PASSES: usize = 64;

/// Errors from constrained segment insertion.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConstraintError {
    /// Inserting a segment endpoint or intersection vertex failed.
    #[error(transparent)]
    InsertSite(#[from] InsertSiteError),
    /// A walk along the segment failed.
    #[error(transparent)]
    Locate(#[from] LocateError),
    /// The inserter could not clear a path for one chunk of the segment.
    #[error("failed to force constrained edge from ({x1}, {y1}) to ({x2}, {y2})")]
    CannotForceConstraint {
        /// Chunk start x.
        x1: f64,
        /// Chunk start y.
        y1: f64,
        /// Chunk end x.
        x2: f64,
        /// Chunk end y.
        y2: f64,
    },
}

impl<PH, EH, FH> Mesh<PH, EH, FH>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    /// Forces `segment` into the subdivision as a chain of constrained
    /// edges, inserting its endpoints (and any intersection vertices with
    /// existing constraints) as sites first.
    ///
    /// `left` and `right` are face handles assigned to the sides of every
    /// chain edge, oriented by the segment direction: `left` goes to the side
    /// a walker from start to end sees on its left. `None` leaves a side
    /// untouched. `point_handle` is attached to every vertex this insertion
    /// creates: the two endpoints and any intersection vertices; vertices
    /// that already carry a payload keep it.
    ///
    /// # Errors
    ///
    /// Endpoint insertion and walk errors pass through;
    /// [`ConstraintError::CannotForceConstraint`] reports a chunk that could
    /// not be cleared, which leaves the mesh valid but the constraint
    /// incomplete.
    pub fn insert_edge(
        &mut self,
        segment: &LineSegment,
        left: Option<FH>,
        right: Option<FH>,
        point_handle: Option<PH>,
        ctx: &mut LocatorContext,
    ) -> Result<(), ConstraintError> {
        let end_spoke =
            self.insert_site_with_handle(segment.end, point_handle, true, false, ctx)?;
        let pb = self.org(end_spoke);
        let start_spoke =
            self.insert_site_with_handle(segment.start, point_handle, true, false, ctx)?;
        let mut pa = self.org(start_spoke);

        let pdt = self.point_distance_tolerance;
        if pa.distance_to(pb) <= pdt {
            // Coincident endpoints degenerate to a point insertion.
            return Ok(());
        }
        let dir = pb - pa;

        let mut chunks = 0;
        loop {
            chunks += 1;
            if chunks > 4 * self.edge_count + 64 {
                return Err(cannot_force(pa, pb));
            }

            let start = self.point_locate(pa, ctx)?;
            let walk = self.segment_walk(start, pb, WalkMode::Constrain)?;
            let px = match walk.event {
                WalkEvent::Target(te) => self.org(te),
                WalkEvent::Vertex(ve) => self.org(ve),
                WalkEvent::Constrained(ce) => {
                    let spoke = self.split_constraint_at_crossing(ce, pa, pb, point_handle);
                    self.org(spoke)
                }
            };

            self.clear_chunk(pa, px, ctx)?;
            self.mark_chunk_edge(pa, px, dir, left, right, ctx)?;

            if px.distance_to(pb) <= pdt {
                return Ok(());
            }
            pa = px;
        }
    }

    /// Inserts a vertex where the segment `(pa, pb)` crosses the constrained
    /// edge `ce`, splitting `ce` there. Returns a spoke of the new vertex.
    fn split_constraint_at_crossing(
        &mut self,
        ce: EdgeId,
        pa: Point,
        pb: Point,
        point_handle: Option<PH>,
    ) -> EdgeId {
        let chain = LineSegment::new(pa, pb);
        let crossed = self.edge_segment(ce);
        let ip = chain.intersection_point(&crossed).unwrap_or_else(|| {
            // Near-parallel crossing; settle for the endpoint nearer the
            // chain's supporting line.
            if chain.distance_to_line(crossed.start) <= chain.distance_to_line(crossed.end) {
                crossed.start
            } else {
                crossed.end
            }
        });
        tracing::debug!(
            edge = %ce,
            x = ip.x,
            y = ip.y,
            "splitting constrained edge at segment intersection"
        );
        self.insert_point_on_edge(ce, ip, point_handle, true)
    }

    /// Swaps away every unconstrained edge crossing the open chunk
    /// `(pa, px)`. Both chunk ends are vertices and no vertex or constrained
    /// edge touches the open chunk, so swapping is always sufficient.
    fn clear_chunk(
        &mut self,
        pa: Point,
        px: Point,
        ctx: &mut LocatorContext,
    ) -> Result<(), ConstraintError> {
        for _ in 0..MAX_CLEAR_PASSES {
            let start = self.point_locate(pa, ctx)?;
            let walk = self.segment_walk(start, px, WalkMode::Constrain)?;
            match walk.event {
                WalkEvent::Target(_) => {
                    if walk.crossings.is_empty() {
                        return Ok(());
                    }
                    let mut progress = false;
                    for e in walk.crossings {
                        if !self.contains_edge(e) || self.is_constrained(e) {
                            continue;
                        }
                        // An earlier swap in this pass may already have
                        // pulled the edge off the chunk.
                        if !self.crosses_open_segment(e, pa, px) {
                            continue;
                        }
                        if self.flip_is_safe(e) {
                            self.swap_unchecked(e);
                            progress = true;
                        } else {
                            tracing::debug!(
                                edge = %e,
                                "deferring swap inside non-convex quadrilateral"
                            );
                        }
                    }
                    if !progress {
                        return Err(cannot_force(pa, px));
                    }
                }
                WalkEvent::Vertex(_) | WalkEvent::Constrained(_) => {
                    return Err(cannot_force(pa, px));
                }
            }
        }
        Err(cannot_force(pa, px))
    }

    /// Marks the now-existing edge `pa -> px` constrained and assigns the
    /// oriented face handles.
    fn mark_chunk_edge(
        &mut self,
        pa: Point,
        px: Point,
        dir: Point,
        left: Option<FH>,
        right: Option<FH>,
        ctx: &mut LocatorContext,
    ) -> Result<(), ConstraintError> {
        let pdt = self.point_distance_tolerance;
        let start = self.point_locate(pa, ctx)?;
        let mut s = start;
        for _ in 0..=2 * self.edge_count {
            if self.dest(s).distance_to(px) <= pdt {
                self.set_constrained(s, true);
                let (l, r) = if (self.dest(s) - self.org(s)).dot(dir) >= 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };
                if l.is_some() {
                    self.set_face_handle(s, l);
                }
                if r.is_some() {
                    self.set_face_handle(s.sym(), r);
                }
                return Ok(());
            }
            s = self.o_next(s);
            if s == start {
                break;
            }
        }
        Err(cannot_force(pa, px))
    }

    /// Whether `e` crosses the open segment `(a, b)` transversally.
    fn crosses_open_segment(&self, e: EdgeId, a: Point, b: Point) -> bool {
        let o = self.org(e);
        let d = self.dest(e);
        let s1 = orientation(a, b, o);
        let s2 = orientation(a, b, d);
        let s3 = orientation(o, d, a);
        let s4 = orientation(o, d, b);
        s1 != Orientation::DEGENERATE
            && s2 != Orientation::DEGENERATE
            && s3 != Orientation::DEGENERATE
            && s4 != Orientation::DEGENERATE
            && s1 != s2
            && s3 != s4
    }
}

fn cannot_force(a: Point, b: Point) -> ConstraintError {
    ConstraintError::CannotForceConstraint {
        x1: a.x,
        y1: a.y,
        x2: b.x,
        y2: b.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Mesh<(), (), u16> {
        Mesh::from_quadrilateral(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        )
        .unwrap()
    }

    /// Collects the constrained edges whose segment lies on `segment`'s
    /// supporting line.
    fn constrained_chain(mesh: &Mesh<(), (), u16>, segment: &LineSegment) -> Vec<EdgeId> {
        let mut chain = Vec::new();
        mesh.for_each_edge(|e| {
            if mesh.is_constrained(e)
                && segment.distance_to_line(mesh.org(e)) <= 1e-9
                && segment.distance_to_line(mesh.dest(e)) <= 1e-9
            {
                chain.push(e);
            }
        });
        chain
    }

    #[test]
    fn test_insert_edge_between_fresh_endpoints() {
        let mut mesh = square();
        let mut ctx = LocatorContext::new();

        let segment = LineSegment::new(Point::new(20.0, 30.0), Point::new(80.0, 70.0));
        mesh.insert_edge(&segment, None, None, None, &mut ctx).unwrap();

        let chain = constrained_chain(&mesh, &segment);
        assert!(!chain.is_empty());
        let total: f64 = chain.iter().map(|&e| mesh.edge_segment(e).length()).sum();
        assert!((total - segment.length()).abs() < 1e-6);
    }

    #[test]
    fn test_insert_edge_is_idempotent() {
        let mut mesh = square();
        let mut ctx = LocatorContext::new();

        let segment = LineSegment::new(Point::new(10.0, 80.0), Point::new(90.0, 20.0));
        mesh.insert_edge(&segment, None, None, None, &mut ctx).unwrap();
        let edges_before = mesh.edge_count();

        mesh.insert_edge(&segment, None, None, None, &mut ctx).unwrap();
        assert_eq!(mesh.edge_count(), edges_before);
    }

    #[test]
    fn test_insert_edge_assigns_oriented_face_handles() {
        let mut mesh = square();
        let mut ctx = LocatorContext::new();

        let segment = LineSegment::new(Point::new(20.0, 50.0), Point::new(80.0, 50.0));
        mesh.insert_edge(&segment, Some(1), Some(2), None, &mut ctx).unwrap();

        for e in constrained_chain(&mesh, &segment) {
            // Orient each chain edge along the segment before reading sides.
            let along = if (mesh.dest(e) - mesh.org(e)).dot(segment.direction()) >= 0.0 {
                e
            } else {
                e.sym()
            };
            assert_eq!(mesh.face_handle(along), Some(1));
            assert_eq!(mesh.face_handle(along.sym()), Some(2));
        }
    }

    #[test]
    fn test_crossing_constraints_get_split_at_intersection() {
        let mut mesh = square();
        let mut ctx = LocatorContext::new();

        let horizontal = LineSegment::new(Point::new(20.0, 50.0), Point::new(80.0, 50.0));
        let vertical = LineSegment::new(Point::new(50.0, 20.0), Point::new(50.0, 80.0));
        mesh.insert_edge(&horizontal, None, None, None, &mut ctx).unwrap();
        mesh.insert_edge(&vertical, None, None, None, &mut ctx).unwrap();

        // The intersection vertex exists and all four arms are constrained.
        let cross = mesh
            .point_locate(Point::new(50.0, 50.0), &mut ctx)
            .unwrap();
        assert_eq!(mesh.org(cross), Point::new(50.0, 50.0));

        let mut constrained_arms = 0;
        let mut s = cross;
        loop {
            if mesh.is_constrained(s) {
                constrained_arms += 1;
            }
            s = mesh.o_next(s);
            if s == cross {
                break;
            }
        }
        assert_eq!(constrained_arms, 4);

        // Both chains still cover their full segments.
        let h: f64 = constrained_chain(&mesh, &horizontal)
            .iter()
            .map(|&e| mesh.edge_segment(e).length())
            .sum();
        let v: f64 = constrained_chain(&mesh, &vertical)
            .iter()
            .map(|&e| mesh.edge_segment(e).length())
            .sum();
        assert!((h - horizontal.length()).abs() < 1e-6);
        assert!((v - vertical.length()).abs() < 1e-6);
    }

    #[test]
    fn test_insert_edge_attaches_point_handles() {
        let mut mesh: Mesh<u32, (), ()> = Mesh::from_quadrilateral(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        )
        .unwrap();
        let mut ctx = LocatorContext::new();

        let horizontal = LineSegment::new(Point::new(20.0, 50.0), Point::new(80.0, 50.0));
        let vertical = LineSegment::new(Point::new(50.0, 20.0), Point::new(50.0, 80.0));
        mesh.insert_edge(&horizontal, None, None, Some(7), &mut ctx)
            .unwrap();
        mesh.insert_edge(&vertical, None, None, Some(8), &mut ctx)
            .unwrap();

        // Endpoints carry their segment's handle.
        for p in [horizontal.start, horizontal.end] {
            let spoke = mesh.point_locate(p, &mut ctx).unwrap();
            assert_eq!(mesh.point_handle(spoke), Some(7));
        }
        for p in [vertical.start, vertical.end] {
            let spoke = mesh.point_locate(p, &mut ctx).unwrap();
            assert_eq!(mesh.point_handle(spoke), Some(8));
        }

        // The intersection vertex is created while inserting the vertical
        // segment and takes its handle.
        let cross = mesh.point_locate(Point::new(50.0, 50.0), &mut ctx).unwrap();
        assert_eq!(mesh.org(cross), Point::new(50.0, 50.0));
        assert_eq!(mesh.point_handle(cross), Some(8));

        // Re-inserting with another handle does not overwrite payloads.
        mesh.insert_edge(&horizontal, None, None, Some(9), &mut ctx)
            .unwrap();
        let start = mesh.point_locate(horizontal.start, &mut ctx).unwrap();
        assert_eq!(mesh.point_handle(start), Some(7));
    }

    #[test]
    fn test_constraint_survives_later_insertions() {
        let mut mesh = square();
        let mut ctx = LocatorContext::new();

        let segment = LineSegment::new(Point::new(15.0, 40.0), Point::new(85.0, 60.0));
        mesh.insert_edge(&segment, None, None, None, &mut ctx).unwrap();

        for (x, y) in [(30.0, 20.0), (70.0, 80.0), (50.0, 45.0), (52.0, 55.0)] {
            mesh.insert_site(Point::new(x, y), true, false, &mut ctx)
                .unwrap();
        }

        let total: f64 = constrained_chain(&mesh, &segment)
            .iter()
            .map(|&e| mesh.edge_segment(e).length())
            .sum();
        assert!((total - segment.length()).abs() < 1e-6);
    }
}
