//! Point location and segment walking.
//!
//! The primary locator is the Guibas–Stolfi walk: from a starting edge, step
//! toward the query point by orientation tests until the containing face is
//! found. The walk is bounded by `edge_count + 2` steps; if tolerance noise
//! ever makes it cycle, a brute-force arena scan answers instead, so location
//! never fails on an in-domain query.
//!
//! Walk starts come from a caller-owned [`LocatorContext`] holding the last
//! located edge, revalidated against the arena before use. Queries issued
//! close together are then near-constant time.
//!
//! The segment walker below the public API advances along a directed segment
//! face by face, reporting crossed edges and vertex pass-throughs. It backs
//! [`Mesh::walk`], [`Mesh::shoot`], and the constraint inserter.

use thiserror::Error;

use crate::core::handles::HandleType;
use crate::core::mesh::{bounding_box_diagonal, Mesh};
use crate::core::quad_edge::EdgeId;
use crate::geometry::point::Point;
use crate::geometry::predicates::{orientation, Orientation};
use crate::geometry::segment::{LineSegment, Ray};

/// Errors from point location and segment walking.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LocateError {
    /// The mesh has no live edges to walk on.
    #[error("mesh has no live edges")]
    EmptyMesh,
    /// A walk failed to make progress within its step bound.
    #[error("walk stuck after {steps} steps while heading for ({x}, {y})")]
    StuckWalk {
        /// Query x coordinate.
        x: f64,
        /// Query y coordinate.
        y: f64,
        /// Steps taken before giving up.
        steps: usize,
    },
    /// No vertex coincides with the query point.
    #[error("no vertex within tolerance of ({x}, {y})")]
    VertexNotFound {
        /// Query x coordinate.
        x: f64,
        /// Query y coordinate.
        y: f64,
    },
}

/// Caller-owned locality cache for walk starting points.
///
/// Holding one context per query stream keeps successive locates near each
/// other cheap without any shared mutable state; independent streams simply
/// use independent contexts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LocatorContext {
    last_located: Option<EdgeId>,
}

impl LocatorContext {
    /// A context with no cached edge.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_located: None }
    }

    /// Forgets the cached edge.
    pub fn reset(&mut self) {
        self.last_located = None;
    }

    pub(crate) fn remember(&mut self, e: EdgeId) {
        self.last_located = Some(e);
    }
}

/// Where a segment walk stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkEvent {
    /// Reached the target; the edge's origin is the target vertex.
    Target(EdgeId),
    /// Passed through an intermediate vertex lying on the segment; the
    /// edge's origin is that vertex.
    Vertex(EdgeId),
    /// Stopped at a constrained edge crossing the segment.
    Constrained(EdgeId),
}

/// What a segment walk treats as a stopping event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkMode {
    /// Cross everything; stop only at the target.
    Traverse,
    /// Stop at the first intermediate vertex or constrained crossing.
    Constrain,
    /// Pass through vertices; stop at the first constrained crossing.
    Shoot,
}

/// Result of a segment walk: the unconstrained edges crossed before the
/// stopping event, in order.
#[derive(Debug, Clone)]
pub(crate) struct SegmentWalk {
    pub(crate) crossings: Vec<EdgeId>,
    pub(crate) event: WalkEvent,
}

/// Walker position: at a vertex (edge origin) or about to cross an edge
/// whose left face is the current one.
#[derive(Debug, Clone, Copy)]
pub(crate) enum WalkState {
    AtVertex(EdgeId),
    AtCrossing(EdgeId),
}

/// First step of a walk leaving a vertex.
enum VertexExit {
    /// A spoke ends at the target.
    Target(EdgeId),
    /// A spoke is collinear with the walk direction; continue from its
    /// destination.
    Along(EdgeId),
    /// The walk leaves through the edge opposite the vertex.
    Crossing(EdgeId),
}

impl<PH, EH, FH> Mesh<PH, EH, FH>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    // =========================================================================
    // PUBLIC LOCATORS
    // =========================================================================

    /// Locates `point`, returning an edge of the face containing it.
    ///
    /// If `point` coincides with a vertex within the point distance
    /// tolerance, the returned edge has that vertex as its origin. If it lies
    /// on an edge, that edge (or its reverse) is returned. Otherwise the
    /// returned edge has the containing face on its left.
    ///
    /// # Errors
    ///
    /// [`LocateError::EmptyMesh`] if the mesh has no live edges;
    /// [`LocateError::StuckWalk`] only if both the walk and the brute-force
    /// fallback fail, which indicates a corrupted mesh.
    pub fn locate(&self, point: Point, ctx: &mut LocatorContext) -> Result<EdgeId, LocateError> {
        let mut e = match ctx.last_located {
            Some(cached) if self.contains_edge(cached) => cached,
            _ if self.contains_edge(self.start_edge) => self.start_edge,
            _ => self.any_live_edge().ok_or(LocateError::EmptyMesh)?,
        };

        let pdt = self.point_distance_tolerance;
        let max_steps = self.edge_count + 2;
        for _ in 0..max_steps {
            if point.distance_to(self.org(e)) <= pdt {
                ctx.remember(e);
                return Ok(e);
            }
            if point.distance_to(self.dest(e)) <= pdt {
                let found = e.sym();
                ctx.remember(found);
                return Ok(found);
            }
            if self.lies_right_strict(e, point) {
                e = e.sym();
                continue;
            }
            let onext = self.o_next(e);
            if !self.lies_right_strict(onext, point) {
                e = onext;
                continue;
            }
            let dprev = self.d_prev(e);
            if !self.lies_right_strict(dprev, point) {
                e = dprev;
                continue;
            }
            ctx.remember(e);
            return Ok(e);
        }

        tracing::warn!(
            x = point.x,
            y = point.y,
            steps = max_steps,
            "point location walk hit its step bound, scanning the arena"
        );
        let found = self.brute_force_locate(point).ok_or(LocateError::StuckWalk {
            x: point.x,
            y: point.y,
            steps: max_steps,
        })?;
        ctx.remember(found);
        Ok(found)
    }

    /// Locates an existing vertex, returning an edge whose origin is that
    /// vertex.
    ///
    /// # Errors
    ///
    /// [`LocateError::VertexNotFound`] when no vertex lies within the point
    /// distance tolerance of `point`.
    pub fn point_locate(
        &self,
        point: Point,
        ctx: &mut LocatorContext,
    ) -> Result<EdgeId, LocateError> {
        let pdt = self.point_distance_tolerance;
        if let Ok(e) = self.locate(point, ctx) {
            if self.org(e).distance_to(point) <= pdt {
                return Ok(e);
            }
            if self.dest(e).distance_to(point) <= pdt {
                return Ok(e.sym());
            }
            // The located face's remaining corners.
            let mut walker = self.l_next(e);
            for _ in 0..=2 * self.edge_count {
                if walker == e {
                    break;
                }
                if self.org(walker).distance_to(point) <= pdt {
                    ctx.remember(walker);
                    return Ok(walker);
                }
                walker = self.l_next(walker);
            }
        }

        // Exact scan; the walk can miss a vertex only through tolerance noise.
        let mut best: Option<(f64, EdgeId)> = None;
        for (key, quad) in &self.quads {
            if quad.deleted {
                continue;
            }
            for e in [EdgeId::new(key, 0), EdgeId::new(key, 2)] {
                let d = self.org(e).distance_to(point);
                if d <= pdt && best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, e));
                }
            }
        }
        best.map(|(_, e)| e).ok_or(LocateError::VertexNotFound {
            x: point.x,
            y: point.y,
        })
    }

    /// Walks from `segment.start` to `segment.end`, both of which must be
    /// existing vertices, and returns an edge whose origin is the end vertex.
    ///
    /// # Errors
    ///
    /// [`LocateError::VertexNotFound`] if either endpoint is not a vertex;
    /// [`LocateError::StuckWalk`] if the walk dead-ends.
    pub fn walk(
        &self,
        segment: &LineSegment,
        ctx: &mut LocatorContext,
    ) -> Result<EdgeId, LocateError> {
        let start = self.point_locate(segment.start, ctx)?;
        let walk = self.segment_walk(start, segment.end, WalkMode::Traverse)?;
        match walk.event {
            WalkEvent::Target(e) => Ok(e),
            WalkEvent::Vertex(_) | WalkEvent::Constrained(_) => Err(LocateError::StuckWalk {
                x: segment.end.x,
                y: segment.end.y,
                steps: walk.crossings.len(),
            }),
        }
    }

    /// Shoots a ray and returns the first constrained edge it crosses.
    ///
    /// The bounding polygon is constrained, so every ray from an in-domain
    /// origin hits something.
    ///
    /// # Errors
    ///
    /// [`LocateError::StuckWalk`] when the origin lies outside the
    /// subdivision or the walk dead-ends.
    pub fn shoot(&self, ray: &Ray, ctx: &mut LocatorContext) -> Result<EdgeId, LocateError> {
        let reach = 2.0 * bounding_box_diagonal(&self.bounding_points) + 1.0;
        let far = ray.origin + ray.direction.normalized() * reach;
        let pdt = self.point_distance_tolerance;

        let e = self.locate(ray.origin, ctx)?;
        let state = if ray.origin.distance_to(self.org(e)) <= pdt {
            WalkState::AtVertex(e)
        } else if ray.origin.distance_to(self.dest(e)) <= pdt {
            WalkState::AtVertex(e.sym())
        } else {
            // An origin exactly on the located edge may exit through the
            // other side's ring instead.
            let crossing = self
                .face_exit_crossing(e, ray.origin, far)
                .or_else(|_| self.face_exit_crossing(e.sym(), ray.origin, far))?;
            WalkState::AtCrossing(crossing)
        };

        let walk = self.segment_walk_from(state, ray.origin, far, WalkMode::Shoot)?;
        match walk.event {
            WalkEvent::Constrained(c) => Ok(c),
            WalkEvent::Target(_) | WalkEvent::Vertex(_) => Err(LocateError::StuckWalk {
                x: far.x,
                y: far.y,
                steps: walk.crossings.len(),
            }),
        }
    }

    // =========================================================================
    // SEGMENT WALKER
    // =========================================================================

    /// Runs a segment walk starting at the vertex `org(from_vertex)`.
    pub(crate) fn segment_walk(
        &self,
        from_vertex: EdgeId,
        target: Point,
        mode: WalkMode,
    ) -> Result<SegmentWalk, LocateError> {
        let origin = self.org(from_vertex);
        self.segment_walk_from(WalkState::AtVertex(from_vertex), origin, target, mode)
    }

    fn segment_walk_from(
        &self,
        start: WalkState,
        origin: Point,
        target: Point,
        mode: WalkMode,
    ) -> Result<SegmentWalk, LocateError> {
        let pdt = self.point_distance_tolerance;
        let bound = 4 * self.edge_count + 8;
        let mut crossings = Vec::new();
        let mut state = start;

        for _ in 0..bound {
            match state {
                WalkState::AtVertex(ve) => {
                    let v = self.org(ve);
                    if v.distance_to(target) <= pdt {
                        return Ok(SegmentWalk {
                            crossings,
                            event: WalkEvent::Target(ve),
                        });
                    }
                    if mode == WalkMode::Constrain && v.distance_to(origin) > pdt {
                        return Ok(SegmentWalk {
                            crossings,
                            event: WalkEvent::Vertex(ve),
                        });
                    }
                    match self.vertex_exit(ve, target)? {
                        VertexExit::Target(spoke) => {
                            return Ok(SegmentWalk {
                                crossings,
                                event: WalkEvent::Target(spoke.sym()),
                            });
                        }
                        VertexExit::Along(spoke) => state = WalkState::AtVertex(spoke.sym()),
                        VertexExit::Crossing(c) => state = WalkState::AtCrossing(c),
                    }
                }
                WalkState::AtCrossing(c) => {
                    if self.org(c).distance_to(target) <= pdt {
                        return Ok(SegmentWalk {
                            crossings,
                            event: WalkEvent::Target(c),
                        });
                    }
                    if self.dest(c).distance_to(target) <= pdt {
                        return Ok(SegmentWalk {
                            crossings,
                            event: WalkEvent::Target(c.sym()),
                        });
                    }
                    // The target inside the face being left, without being a
                    // vertex of it, means the walk has nowhere to go.
                    if orientation(self.org(c), self.dest(c), target) == Orientation::POSITIVE {
                        return Err(LocateError::StuckWalk {
                            x: target.x,
                            y: target.y,
                            steps: crossings.len(),
                        });
                    }
                    if mode != WalkMode::Traverse && self.is_constrained(c) {
                        return Ok(SegmentWalk {
                            crossings,
                            event: WalkEvent::Constrained(c),
                        });
                    }
                    crossings.push(c);
                    // Cross into the face right of c and pick the next exit
                    // by which side of the walk line its apex falls on.
                    let apex_edge = self.l_next(c.sym());
                    let apex = self.dest(apex_edge);
                    match orientation(origin, apex, target) {
                        Orientation::POSITIVE => {
                            state = WalkState::AtCrossing(self.l_next(apex_edge));
                        }
                        Orientation::NEGATIVE => state = WalkState::AtCrossing(apex_edge),
                        Orientation::DEGENERATE => state = WalkState::AtVertex(apex_edge.sym()),
                    }
                }
            }
        }

        Err(LocateError::StuckWalk {
            x: target.x,
            y: target.y,
            steps: bound,
        })
    }

    /// Finds how a walk leaves the vertex `org(start)` heading for `target`.
    fn vertex_exit(&self, start: EdgeId, target: Point) -> Result<VertexExit, LocateError> {
        let origin = self.org(start);
        let pdt = self.point_distance_tolerance;
        let ring_bound = 2 * self.edge_count + 2;

        // Direct spokes first: ending at the target or collinear ahead.
        let mut s = start;
        for _ in 0..ring_bound {
            let d = self.dest(s);
            if d.distance_to(target) <= pdt {
                return Ok(VertexExit::Target(s));
            }
            if orientation(origin, d, target) == Orientation::DEGENERATE
                && (d - origin).dot(target - origin) > 0.0
                && (d - origin).norm() <= (target - origin).norm()
            {
                return Ok(VertexExit::Along(s));
            }
            s = self.o_next(s);
            if s == start {
                break;
            }
        }

        // Rotate until the target is strictly left of the spoke.
        let mut s = start;
        let mut rotations = 0;
        while orientation(origin, self.dest(s), target) != Orientation::POSITIVE {
            s = self.o_next(s);
            rotations += 1;
            if s == start || rotations > ring_bound {
                return Err(LocateError::StuckWalk {
                    x: target.x,
                    y: target.y,
                    steps: rotations,
                });
            }
        }
        // Then advance while the next spoke still has the target on its left,
        // leaving s on the clockwise side of the wedge containing the target.
        for _ in 0..ring_bound {
            let next = self.o_next(s);
            if orientation(origin, self.dest(next), target) == Orientation::POSITIVE {
                s = next;
            } else {
                break;
            }
        }

        Ok(VertexExit::Crossing(self.l_next(s)))
    }

    /// The ring edge through which the segment `from -> to` leaves the face
    /// left of `e`.
    fn face_exit_crossing(&self, e: EdgeId, from: Point, to: Point) -> Result<EdgeId, LocateError> {
        let seg = LineSegment::new(from, to);
        let mut best: Option<(f64, EdgeId)> = None;
        let mut walker = e;
        for _ in 0..=2 * self.edge_count {
            if let Some((t, u)) = seg.intersection_parameters(&self.edge_segment(walker)) {
                if t > 1e-12 && (-1e-9..=1.0 + 1e-9).contains(&u)
                    && best.map_or(true, |(bt, _)| t < bt)
                {
                    best = Some((t, walker));
                }
            }
            walker = self.l_next(walker);
            if walker == e {
                break;
            }
        }
        best.map(|(_, c)| c).ok_or(LocateError::StuckWalk {
            x: to.x,
            y: to.y,
            steps: 0,
        })
    }

    // =========================================================================
    // FALLBACKS
    // =========================================================================

    /// Whether `point` is strictly right of the directed edge `e`.
    #[must_use]
    pub(crate) fn lies_right_strict(&self, e: EdgeId, point: Point) -> bool {
        orientation(self.org(e), self.dest(e), point) == Orientation::NEGATIVE
    }

    /// Whether the face left of `e` contains `point` (boundary included).
    pub(crate) fn face_contains(&self, e: EdgeId, point: Point) -> bool {
        let mut walker = e;
        for _ in 0..=2 * self.edge_count {
            if self.lies_right_strict(walker, point) {
                return false;
            }
            walker = self.l_next(walker);
            if walker == e {
                return true;
            }
        }
        false
    }

    fn brute_force_locate(&self, point: Point) -> Option<EdgeId> {
        for (key, quad) in &self.quads {
            if quad.deleted {
                continue;
            }
            for e in [EdgeId::new(key, 0), EdgeId::new(key, 2)] {
                if self.is_interior_face(e) && self.face_contains(e, point) {
                    return Some(e);
                }
            }
        }
        // Out-of-face queries settle for the nearest live edge.
        let mut best: Option<(f64, EdgeId)> = None;
        for (key, quad) in &self.quads {
            if quad.deleted {
                continue;
            }
            let e = EdgeId::new(key, 0);
            let d = self.edge_segment(e).distance_to_point(point);
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, e));
            }
        }
        best.map(|(_, e)| e)
    }
}
