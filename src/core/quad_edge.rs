//! Quad-edge records and directed-edge identity.
//!
//! Every undirected edge of the subdivision is stored as one [`Quad`] arena
//! record holding four directed edges: the primal edge, its reverse, and the
//! two dual edges connecting the faces on either side. A directed edge is
//! identified by [`EdgeId`], an arena key plus a rotation in `0..4`:
//!
//! - `rot 0` — the primal edge as created
//! - `rot 1` — the dual edge from right face to left face
//! - `rot 2` — the primal edge reversed
//! - `rot 3` — the dual edge from left face to right face
//!
//! The rotation operators below are pure index arithmetic; all topology
//! (`onext` and its derivatives) lives on the mesh, which owns the arena.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::core::handles::HandleType;
use crate::geometry::point::Point;

new_key_type! {
    /// Arena key of one quad-edge record.
    pub struct QuadKey;
}

/// Identity of a directed edge: an arena key and a rotation.
///
/// `EdgeId` is a plain value; navigating from it requires the owning
/// [`Mesh`](crate::core::mesh::Mesh). The rotation operators compose as in
/// Guibas–Stolfi: `rot` turns a quarter-turn counterclockwise in the edge
/// algebra, `sym` reverses direction, `inv_rot` turns clockwise.
///
/// # Examples
///
/// ```
/// use subdivision::core::quad_edge::EdgeId;
///
/// let e = EdgeId::default();
/// assert_eq!(e.rot().rot(), e.sym());
/// assert_eq!(e.rot().inv_rot(), e);
/// assert_eq!(e.sym().sym(), e);
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EdgeId {
    pub(crate) quad: QuadKey,
    pub(crate) rot: u8,
}

impl EdgeId {
    #[must_use]
    #[inline]
    pub(crate) const fn new(quad: QuadKey, rot: u8) -> Self {
        Self { quad, rot }
    }

    /// The arena key of the underlying quad record.
    #[must_use]
    #[inline]
    pub const fn quad(self) -> QuadKey {
        self.quad
    }

    /// Rotation index of this directed edge within its record.
    #[must_use]
    #[inline]
    pub const fn rotation(self) -> u8 {
        self.rot
    }

    /// Quarter-turn counterclockwise: the dual edge crossing this one from
    /// right to left.
    #[must_use]
    #[inline]
    pub const fn rot(self) -> Self {
        Self::new(self.quad, (self.rot + 1) & 3)
    }

    /// The same edge with direction reversed.
    #[must_use]
    #[inline]
    pub const fn sym(self) -> Self {
        Self::new(self.quad, (self.rot + 2) & 3)
    }

    /// Quarter-turn clockwise; inverse of [`EdgeId::rot`].
    #[must_use]
    #[inline]
    pub const fn inv_rot(self) -> Self {
        Self::new(self.quad, (self.rot + 3) & 3)
    }

    /// Whether this edge lives in the primal subdivision (rotation 0 or 2)
    /// rather than its dual.
    #[must_use]
    #[inline]
    pub const fn is_primal(self) -> bool {
        self.rot & 1 == 0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}.{}", self.quad, self.rot)
    }
}

/// One arena record: four directed edges plus endpoint geometry, payload
/// handles, and lifecycle flags.
///
/// Slot conventions, all indexed off the record's own rotations:
///
/// - `next[r]` — onext pointer of the directed edge with rotation `r`
/// - `endpoints[0]`/`endpoints[1]` — origin of rotation 0 / rotation 2
/// - `point_handles[i]` — payload of `endpoints[i]`'s vertex, if any
/// - `edge_handles[0]`/`edge_handles[1]` — payload of the rotation-0 /
///   rotation-2 direction
/// - `face_handles[0]`/`face_handles[1]` — payload of the face that is the
///   origin of rotation 1 (right of the primal edge) / rotation 3 (left)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub(crate) struct Quad<PH, EH, FH>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    pub(crate) next: [EdgeId; 4],
    pub(crate) endpoints: [Point; 2],
    pub(crate) point_handles: [Option<PH>; 2],
    pub(crate) edge_handles: [Option<EH>; 2],
    pub(crate) face_handles: [Option<FH>; 2],
    pub(crate) constrained: bool,
    pub(crate) deleted: bool,
}

impl<PH, EH, FH> Quad<PH, EH, FH>
where
    PH: HandleType,
    EH: HandleType,
    FH: HandleType,
{
    /// A fresh isolated record for the edge `org -> dest`, wired per
    /// Guibas–Stolfi `MakeEdge`: the primal directions are their own onext,
    /// the dual directions point at each other.
    pub(crate) fn isolated(key: QuadKey, org: Point, dest: Point, constrained: bool) -> Self {
        Self {
            next: [
                EdgeId::new(key, 0),
                EdgeId::new(key, 3),
                EdgeId::new(key, 2),
                EdgeId::new(key, 1),
            ],
            endpoints: [org, dest],
            point_handles: [None, None],
            edge_handles: [None, None],
            face_handles: [None, None],
            constrained,
            deleted: false,
        }
    }
}
