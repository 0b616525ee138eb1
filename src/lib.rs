//! # subdivision
//!
//! A mutable planar subdivision engine over the Guibas–Stolfi quad-edge
//! structure, maintaining an incremental, optionally-constrained Delaunay
//! triangulation.
//!
//! A [`Mesh`](core::mesh::Mesh) is bootstrapped from a bounding triangle or
//! convex quadrilateral and then mutated in place:
//!
//! - [`insert_site`](core::mesh::Mesh#method.insert_site) adds a point,
//!   splitting a face or an edge and optionally restoring the Delaunay
//!   criterion with Lawson flips;
//! - [`insert_edge`](core::mesh::Mesh#method.insert_edge) forces a segment
//!   in as a chain of constrained edges, splitting crossing constraints at
//!   their intersections;
//! - [`locate`](core::mesh::Mesh#method.locate),
//!   [`walk`](core::mesh::Mesh#method.walk), and
//!   [`shoot`](core::mesh::Mesh#method.shoot) answer point, segment, and ray
//!   queries through walks seeded from a caller-owned
//!   [`LocatorContext`](core::locate::LocatorContext);
//! - `split`/`connect`/`swap`/`delete_edge` expose the raw topological
//!   mutators, with [`gc_delete_edge`](core::mesh::Mesh#method.gc_delete_edge)
//!   and [`collect`](core::mesh::Mesh#method.collect) providing deferred
//!   reclamation for batch deletions.
//!
//! Points, directed edges, and faces all carry optional application payloads
//! (the `PH`, `EH`, `FH` type parameters), which the engine stores and copies
//! but never interprets.
//!
//! # Example
//!
//! ```
//! use subdivision::prelude::*;
//!
//! let mut mesh: Mesh = Mesh::from_quadrilateral(
//!     Point::new(0.0, 0.0),
//!     Point::new(100.0, 0.0),
//!     Point::new(100.0, 100.0),
//!     Point::new(0.0, 100.0),
//! )?;
//! let mut ctx = LocatorContext::new();
//!
//! mesh.insert_site(Point::new(25.0, 40.0), true, false, &mut ctx)?;
//! mesh.insert_edge(
//!     &LineSegment::new(Point::new(10.0, 10.0), Point::new(90.0, 90.0)),
//!     None,
//!     None,
//!     None,
//!     &mut ctx,
//! )?;
//!
//! assert_eq!(mesh.euler_characteristic(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]

/// Core subdivision machinery: arena, mesh, locators, and mutators.
pub mod core {
    pub mod collections;
    pub mod constraint;
    pub mod delaunay;
    pub mod dump;
    pub mod handles;
    pub mod locate;
    pub mod mesh;
    pub mod mutate;
    pub mod quad_edge;
    pub mod traversal;
}

/// Planar geometry: points, segments, rays, and predicates.
pub mod geometry {
    pub mod point;
    pub mod predicates;
    pub mod segment;
}

/// Convenience re-exports of the types most callers need.
pub mod prelude {
    pub use crate::core::constraint::ConstraintError;
    pub use crate::core::delaunay::InsertSiteError;
    pub use crate::core::handles::HandleType;
    pub use crate::core::locate::{LocateError, LocatorContext};
    pub use crate::core::mesh::{Mesh, MeshBuildError};
    pub use crate::core::mutate::{DeleteEdgeError, MutateError};
    pub use crate::core::quad_edge::{EdgeId, QuadKey};
    pub use crate::geometry::point::Point;
    pub use crate::geometry::predicates::{
        ccw, in_circle, orientation, InCircle, Orientation,
    };
    pub use crate::geometry::segment::{LineSegment, Ray};
}
