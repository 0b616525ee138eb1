//! Topological mutators: connect, split, swap, and edge deletion.
//!
//! Everything here is built from `splice` and `make_edge`; the mutators keep
//! payload handles and the constrained flag consistent across the rewiring.
//! Deletion comes in two flavors: immediate removal and deferred removal
//! ([`Mesh::gc_delete_edge`]) that detaches the record but leaves it in the
//! arena until [`Mesh::collect`] reclaims it, so batch operations can hold
//! edge ids across deletions without dangling.

use thiserror::Error;

use crate::core::handles::HandleType;
use crate::core::mesh::Mesh;
use crate::core::quad_edge::EdgeId;
use crate::geometry::point::Point;

/// Errors from the topological mutators.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MutateError {
    /// The edge id does not refer to a live record.
    #[error("edge is not in the mesh")]
    MissingEdge,
    /// Swapping a constrained edge would break a constraint.
    #[error("cannot swap a constrained edge")]
    ConstrainedEdge,
    /// `connect` requires both edges to border the same face, witnessed by
    /// equal face handles.
    #[error("connect endpoints lie in faces with different face handles")]
    FaceHandleMismatch,
    /// `split` takes an interior parameter only.
    #[error("split parameter {t} outside the open interval (0, 1)")]
    SplitParameterOutOfRange {
        /// The offending parameter.
        t: f64,
    },
}

/// Errors from edge deletion.
///
/// [`DeleteEdgeError::Constrained`] is an expected outcome for callers
/// sweeping edge sets; it reports that the edge was left in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeleteEdgeError {
    /// The edge id does not refer to a live record.
    #[error("edge is not in the mesh")]
    MissingEdge,
    /// The edge is constrained and was not deleted.
    #[error("cannot delete a constrained edge while its constraint remains")]
    Constrained,
}

impl<PH, EH, FH> Mesh<PH, EH, FH>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    /// Connects `dest(a)` to `org(b)` with a new unconstrained edge, splitting
    /// the face both border.
    ///
    /// Both sides of the new edge inherit the shared face handle; endpoint
    /// payloads are copied from `a` and `b`.
    ///
    /// # Errors
    ///
    /// [`MutateError::MissingEdge`] if either edge is dead;
    /// [`MutateError::FaceHandleMismatch`] if the edges carry different left
    /// face handles, the witness for bordering different faces.
    pub fn connect(&mut self, a: EdgeId, b: EdgeId) -> Result<EdgeId, MutateError> {
        if !self.contains_edge(a) || !self.contains_edge(b) {
            return Err(MutateError::MissingEdge);
        }
        if self.face_handle(a) != self.face_handle(b) {
            return Err(MutateError::FaceHandleMismatch);
        }
        Ok(self.connect_unchecked(a, b, false))
    }

    /// Splits `e` at parameter `t`, inserting a vertex on it.
    ///
    /// After the split `e` runs from its old origin to the new vertex and the
    /// returned edge from the new vertex to the old destination. Constrained
    /// flags, edge handles, and face handles carry over to both halves.
    ///
    /// # Errors
    ///
    /// [`MutateError::MissingEdge`] for a dead edge;
    /// [`MutateError::SplitParameterOutOfRange`] unless `0 < t < 1`.
    pub fn split(&mut self, e: EdgeId, t: f64) -> Result<EdgeId, MutateError> {
        if !self.contains_edge(e) {
            return Err(MutateError::MissingEdge);
        }
        if !(t > 0.0 && t < 1.0) {
            return Err(MutateError::SplitParameterOutOfRange { t });
        }
        let p = self.edge_segment(e).point_at(t);
        Ok(self.split_at(e, p))
    }

    /// Splits `e` at the point `p`, assumed to lie on it.
    pub(crate) fn split_at(&mut self, e: EdgeId, p: Point) -> EdgeId {
        let old_dest = self.dest(e);
        let old_dest_handle = self.point_handle(e.sym());
        let constrained = self.is_constrained(e);
        let forward_handle = self.edge_handle(e);
        let reverse_handle = self.edge_handle(e.sym());
        let left_face = self.face_handle(e);
        let right_face = self.face_handle(e.sym());

        // Detach the destination end, shorten e, and wire the new half into
        // the slot the old destination end occupied.
        let ring_slot = self.o_prev(e.sym());
        self.splice(e.sym(), ring_slot);
        self.set_dest(e, p);
        self.set_point_handle(e.sym(), None);

        let ne = self.make_edge_raw(p, old_dest, constrained);
        self.set_point_handle(ne.sym(), old_dest_handle);
        self.set_edge_handle(ne, forward_handle);
        self.set_edge_handle(ne.sym(), reverse_handle);
        self.set_face_handle(ne, left_face);
        self.set_face_handle(ne.sym(), right_face);
        self.splice(ne, e.sym());
        self.splice(ne.sym(), ring_slot);
        ne
    }

    /// Rotates `e` inside the quadrilateral formed by its two adjacent
    /// triangles, so it connects their apexes instead.
    ///
    /// Both adjacent faces must be triangles and the quadrilateral convex;
    /// callers check this (see the Delaunay flip machinery). Directed edge
    /// payloads are dropped since the edge's endpoints change.
    ///
    /// # Errors
    ///
    /// [`MutateError::MissingEdge`] for a dead edge;
    /// [`MutateError::ConstrainedEdge`] for a constrained one.
    pub fn swap(&mut self, e: EdgeId) -> Result<(), MutateError> {
        if !self.contains_edge(e) {
            return Err(MutateError::MissingEdge);
        }
        if self.is_constrained(e) {
            return Err(MutateError::ConstrainedEdge);
        }
        self.swap_unchecked(e);
        Ok(())
    }

    /// The flip rewiring, without validity checks.
    ///
    /// A swap never crosses a constrained edge and face handles can only
    /// differ across constrained edges, so both new faces inherit the handle
    /// left of the old edge.
    pub(crate) fn swap_unchecked(&mut self, e: EdgeId) {
        let face = self.face_handle(e);
        let a = self.o_prev(e);
        let b = self.o_prev(e.sym());

        self.splice(e, a);
        self.splice(e.sym(), b);
        let a_lnext = self.l_next(a);
        let b_lnext = self.l_next(b);
        self.splice(e, a_lnext);
        self.splice(e.sym(), b_lnext);

        self.set_org(e, self.dest(a));
        self.set_dest(e, self.dest(b));
        self.set_point_handle(e, self.point_handle(a.sym()));
        self.set_point_handle(e.sym(), self.point_handle(b.sym()));
        self.set_edge_handle(e, None);
        self.set_edge_handle(e.sym(), None);
        self.set_face_handle(e, face);
        self.set_face_handle(e.sym(), face);
    }

    /// Removes `e` from the subdivision immediately, merging the faces on
    /// either side.
    ///
    /// # Errors
    ///
    /// [`DeleteEdgeError::MissingEdge`] for a dead edge;
    /// [`DeleteEdgeError::Constrained`] for a constrained one, which is left
    /// in place.
    pub fn delete_edge(&mut self, e: EdgeId) -> Result<(), DeleteEdgeError> {
        if !self.contains_edge(e) {
            return Err(DeleteEdgeError::MissingEdge);
        }
        if self.is_constrained(e) {
            return Err(DeleteEdgeError::Constrained);
        }
        self.unsplice(e);
        self.quads.remove(e.quad);
        self.edge_count -= 1;
        self.repair_start_edge(e.quad);
        Ok(())
    }

    /// Detaches `e` and flags its record for deferred reclamation.
    ///
    /// The record stays in the arena, so ids held elsewhere stay
    /// distinguishable from new allocations until [`Mesh::collect`] runs;
    /// [`Mesh::contains_edge`] reports it dead immediately.
    ///
    /// # Errors
    ///
    /// Same as [`Mesh::delete_edge`].
    pub fn gc_delete_edge(&mut self, e: EdgeId) -> Result<(), DeleteEdgeError> {
        if !self.contains_edge(e) {
            return Err(DeleteEdgeError::MissingEdge);
        }
        if self.is_constrained(e) {
            return Err(DeleteEdgeError::Constrained);
        }
        self.unsplice(e);
        self.quads[e.quad].deleted = true;
        self.edge_count -= 1;
        self.dead_count += 1;
        self.repair_start_edge(e.quad);
        Ok(())
    }

    /// Reclaims all deferred-deleted records in one pass over the arena and
    /// returns how many were removed.
    pub fn collect(&mut self) -> usize {
        let reclaimed = self.dead_count;
        if reclaimed > 0 {
            self.quads.retain(|_, quad| !quad.deleted);
            self.dead_count = 0;
            tracing::debug!(reclaimed, "reclaimed deferred-deleted edge records");
        }
        reclaimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Mesh {
        Mesh::from_quadrilateral(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        )
        .unwrap()
    }

    fn diagonal(mesh: &Mesh) -> EdgeId {
        mesh.quads
            .iter()
            .map(|(k, _)| EdgeId::new(k, 0))
            .find(|&e| !mesh.is_constrained(e))
            .unwrap()
    }

    #[test]
    fn test_swap_rotates_diagonal() {
        let mut mesh = square();
        let d = diagonal(&mesh);

        mesh.swap(d).unwrap();

        let ends = [mesh.org(d), mesh.dest(d)];
        assert!(ends.contains(&Point::new(100.0, 0.0)));
        assert!(ends.contains(&Point::new(0.0, 100.0)));
        assert_eq!(mesh.edge_count(), 5);

        // Both adjacent faces are triangles again.
        assert_eq!(mesh.l_next(mesh.l_next(mesh.l_next(d))), d);
        let ds = d.sym();
        assert_eq!(mesh.l_next(mesh.l_next(mesh.l_next(ds))), ds);
    }

    #[test]
    fn test_swap_rejects_constrained() {
        let mut mesh = square();
        let boundary = mesh.start_edge();
        assert_eq!(mesh.swap(boundary), Err(MutateError::ConstrainedEdge));
    }

    #[test]
    fn test_split_preserves_flags_and_ring() {
        let mut mesh = square();
        let d = diagonal(&mesh);
        let org = mesh.org(d);
        let dest = mesh.dest(d);

        let ne = mesh.split(d, 0.5).unwrap();

        assert_eq!(mesh.org(d), org);
        assert_eq!(mesh.dest(d), Point::new(50.0, 50.0));
        assert_eq!(mesh.org(ne), Point::new(50.0, 50.0));
        assert_eq!(mesh.dest(ne), dest);
        assert!(!mesh.is_constrained(ne));
        assert_eq!(mesh.edge_count(), 6);

        // The two halves follow each other around both side faces.
        assert_eq!(mesh.l_next(d), ne);
        assert_eq!(mesh.l_next(ne.sym()), d.sym());

        // Each side face is now a quadrilateral.
        let ring = d;
        let mut len = 0;
        let mut walker = ring;
        loop {
            walker = mesh.l_next(walker);
            len += 1;
            if walker == ring {
                break;
            }
        }
        assert_eq!(len, 4);
    }

    #[test]
    fn test_split_rejects_bad_parameter() {
        let mut mesh = square();
        let d = diagonal(&mesh);
        assert_eq!(
            mesh.split(d, 0.0),
            Err(MutateError::SplitParameterOutOfRange { t: 0.0 })
        );
        assert_eq!(
            mesh.split(d, 1.5),
            Err(MutateError::SplitParameterOutOfRange { t: 1.5 })
        );
    }

    #[test]
    fn test_split_of_constrained_edge_keeps_both_halves_constrained() {
        let mut mesh = square();
        let boundary = mesh.start_edge();
        let ne = mesh.split(boundary, 0.25).unwrap();
        assert!(mesh.is_constrained(boundary));
        assert!(mesh.is_constrained(ne));
    }

    #[test]
    fn test_connect_retriangulates_after_split() {
        let mut mesh = square();
        let d = diagonal(&mesh);
        let ne = mesh.split(d, 0.5).unwrap();

        // Cut the quadrilateral left of d back into triangles with a chord
        // from the corner after the split point back to the split point.
        let across = mesh.connect(mesh.l_next(ne), ne).unwrap();
        assert_eq!(mesh.org(across), mesh.dest(mesh.l_next(ne)));
        assert_eq!(mesh.dest(across), Point::new(50.0, 50.0));
        assert_eq!(mesh.l_next(across), ne);
        assert_eq!(mesh.l_next(mesh.l_next(mesh.l_next(across))), across);
        assert_eq!(mesh.edge_count(), 7);
    }

    #[test]
    fn test_connect_rejects_mismatched_face_handles() {
        let mut mesh: Mesh<(), (), u8> = Mesh::from_quadrilateral(
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        )
        .unwrap();
        let a = mesh.start_edge();
        let b = mesh.l_next(a);
        mesh.set_face_handle(a, Some(1));
        mesh.set_face_handle(b, Some(2));
        assert_eq!(mesh.connect(a, b), Err(MutateError::FaceHandleMismatch));
    }

    #[test]
    fn test_delete_edge() {
        let mut mesh = square();
        let d = diagonal(&mesh);

        mesh.delete_edge(d).unwrap();
        assert_eq!(mesh.edge_count(), 4);
        assert!(!mesh.contains_edge(d));

        // The merged face is the full square.
        let e = mesh.start_edge();
        let mut len = 0;
        let mut walker = e;
        loop {
            walker = mesh.l_next(walker);
            len += 1;
            if walker == e {
                break;
            }
        }
        assert_eq!(len, 4);
    }

    #[test]
    fn test_delete_edge_rejects_constrained() {
        let mut mesh = square();
        let boundary = mesh.start_edge();
        assert_eq!(mesh.delete_edge(boundary), Err(DeleteEdgeError::Constrained));
        assert_eq!(
            mesh.gc_delete_edge(boundary),
            Err(DeleteEdgeError::Constrained)
        );
    }

    #[test]
    fn test_gc_delete_then_collect() {
        let mut mesh = square();
        let d = diagonal(&mesh);

        mesh.gc_delete_edge(d).unwrap();
        assert!(!mesh.contains_edge(d));
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(mesh.pending_reclaim(), 1);
        assert_eq!(
            mesh.gc_delete_edge(d),
            Err(DeleteEdgeError::MissingEdge)
        );

        assert_eq!(mesh.collect(), 1);
        assert_eq!(mesh.pending_reclaim(), 0);
        assert_eq!(mesh.collect(), 0);
        assert_eq!(mesh.quads.len(), 4);
    }
}
