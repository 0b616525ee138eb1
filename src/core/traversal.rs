//! Flood traversals and global counts.
//!
//! All traversals flood outward from the start edge through onext rings,
//! tracking visited records in a call-scoped hash set, so nested traversals
//! never interfere and there is no depth ceiling. The subdivision is
//! connected by construction (everything hangs off the bounding polygon), so
//! a flood reaches every live record.
//!
//! Counts feed the Euler characteristic `V - E + F`, which is 2 for every
//! valid subdivision of the plane here (the outer face counts).

use crate::core::collections::fast_hash_set_with_capacity;
use crate::core::handles::HandleType;
use crate::core::mesh::Mesh;
use crate::core::quad_edge::{EdgeId, QuadKey};

impl<PH, EH, FH> Mesh<PH, EH, FH>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    fn flood_seed(&self) -> Option<EdgeId> {
        if self.contains_edge(self.start_edge) {
            Some(self.start_edge)
        } else {
            self.any_live_edge()
        }
    }

    /// Calls `f` once per live undirected primal edge, with its rotation-0
    /// direction.
    pub fn for_each_edge<F: FnMut(EdgeId)>(&self, mut f: F) {
        let Some(seed) = self.flood_seed() else {
            return;
        };
        let mut visited = fast_hash_set_with_capacity::<QuadKey>(self.edge_count);
        let mut stack = vec![seed];
        while let Some(e) = stack.pop() {
            if !visited.insert(e.quad()) {
                continue;
            }
            f(EdgeId::new(e.quad(), 0));
            stack.push(self.o_next(e));
            stack.push(self.o_next(e.sym()));
        }
    }

    /// Calls `f` once per live dual edge, with its rotation-1 direction.
    pub fn for_each_dual_edge<F: FnMut(EdgeId)>(&self, mut f: F) {
        self.for_each_edge(|e| f(e.rot()));
    }

    /// Calls `f` once per vertex, with a spoke whose origin is that vertex.
    pub fn for_each_vertex<F: FnMut(EdgeId)>(&self, mut f: F) {
        let Some(seed) = self.flood_seed() else {
            return;
        };
        let mut visited = fast_hash_set_with_capacity::<EdgeId>(2 * self.edge_count);
        let mut stack = vec![seed, seed.sym()];
        while let Some(e) = stack.pop() {
            if visited.contains(&e) {
                continue;
            }
            f(e);
            // Mark the whole origin ring as this vertex and flood across to
            // the far endpoints.
            let mut s = e;
            loop {
                visited.insert(s);
                stack.push(s.sym());
                s = self.o_next(s);
                if s == e {
                    break;
                }
            }
        }
    }

    /// Calls `f` once per face, the outer face included, with an edge whose
    /// left face it is.
    pub fn for_each_face<F: FnMut(EdgeId)>(&self, mut f: F) {
        let Some(seed) = self.flood_seed() else {
            return;
        };
        let mut visited = fast_hash_set_with_capacity::<EdgeId>(2 * self.edge_count);
        let mut stack = vec![seed, seed.sym()];
        while let Some(e) = stack.pop() {
            if visited.contains(&e) {
                continue;
            }
            f(e);
            // Mark the whole left-face ring and flood into the neighbors.
            let mut s = e;
            loop {
                visited.insert(s);
                stack.push(s.sym());
                s = self.l_next(s);
                if s == e {
                    break;
                }
            }
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        let mut count = 0;
        self.for_each_vertex(|_| count += 1);
        count
    }

    /// Number of faces, the outer face included.
    #[must_use]
    pub fn face_count(&self) -> usize {
        let mut count = 0;
        self.for_each_face(|_| count += 1);
        count
    }

    /// Euler characteristic `V - E + F`; 2 for every valid subdivision.
    #[must_use]
    pub fn euler_characteristic(&self) -> i64 {
        let v = self.vertex_count() as i64;
        let e = self.edge_count as i64;
        let f = self.face_count() as i64;
        v - e + f
    }
}
