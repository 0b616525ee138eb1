//! End-to-end constrained triangulation scenario: a vertex grid inside a
//! bounding square, then a constrained segment forced through a whole row of
//! collinear vertices.

use subdivision::prelude::*;

fn grid_mesh() -> (Mesh, LocatorContext) {
    let mut mesh: Mesh = Mesh::from_quadrilateral(
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        Point::new(100.0, 100.0),
        Point::new(0.0, 100.0),
    )
    .expect("bounding square is convex");
    let mut ctx = LocatorContext::new();

    for i in 1..=9 {
        for j in 1..=9 {
            let p = Point::new(f64::from(i) * 10.0, f64::from(j) * 10.0);
            mesh.insert_site(p, true, false, &mut ctx)
                .expect("grid site inserts");
        }
    }
    (mesh, ctx)
}

fn assert_interior_faces_are_triangles(mesh: &Mesh) {
    mesh.for_each_face(|e| {
        if mesh.is_interior_face(e) {
            assert_eq!(
                mesh.l_next(mesh.l_next(mesh.l_next(e))),
                e,
                "interior face at {} is not a triangle",
                mesh.org(e)
            );
        }
    });
}

/// Sum of constrained edge lengths lying on `segment`'s supporting line.
fn constrained_cover(mesh: &Mesh, segment: &LineSegment) -> f64 {
    let mut total = 0.0;
    mesh.for_each_edge(|e| {
        if mesh.is_constrained(e)
            && segment.distance_to_line(mesh.org(e)) <= 1e-9
            && segment.distance_to_line(mesh.dest(e)) <= 1e-9
        {
            total += mesh.edge_segment(e).length();
        }
    });
    total
}

#[test]
fn grid_triangulation_is_valid() {
    let (mesh, _) = grid_mesh();

    // 4 corners + 81 grid vertices.
    assert_eq!(mesh.vertex_count(), 85);
    assert_eq!(mesh.euler_characteristic(), 2);
    assert_interior_faces_are_triangles(&mesh);
}

#[test]
fn grid_triangulation_is_locally_delaunay() {
    let (mesh, _) = grid_mesh();

    mesh.for_each_edge(|e| {
        if mesh.is_constrained(e) {
            return;
        }
        let a = mesh.org(e);
        let b = mesh.dest(e);
        let l = mesh.dest(mesh.l_next(e));
        let r = mesh.dest(mesh.l_next(e.sym()));
        assert_ne!(
            in_circle(a, b, l, r),
            InCircle::INSIDE,
            "edge {a} -> {b} violates the delaunay criterion"
        );
    });
}

#[test]
fn constrained_segment_through_collinear_vertices() {
    let (mut mesh, mut ctx) = grid_mesh();

    let segment = LineSegment::new(Point::new(5.0, 50.0), Point::new(95.0, 50.0));
    mesh.insert_edge(&segment, None, None, None, &mut ctx)
        .expect("constraint inserts");

    // Two new endpoint vertices; every grid vertex on y = 50 splits the
    // chain, so it covers the segment exactly.
    assert_eq!(mesh.vertex_count(), 87);
    assert_eq!(mesh.euler_characteristic(), 2);
    assert_interior_faces_are_triangles(&mesh);
    assert!((constrained_cover(&mesh, &segment) - segment.length()).abs() < 1e-6);

    // A located row vertex carries constrained spokes along the segment.
    let at_center = mesh
        .point_locate(Point::new(50.0, 50.0), &mut ctx)
        .expect("row vertex exists");
    assert_eq!(mesh.org(at_center), Point::new(50.0, 50.0));

    let mut constrained_on_row = 0;
    let mut s = at_center;
    loop {
        if mesh.is_constrained(s) && mesh.dest(s).y == 50.0 {
            constrained_on_row += 1;
        }
        s = mesh.o_next(s);
        if s == at_center {
            break;
        }
    }
    assert_eq!(constrained_on_row, 2);
}

#[test]
fn constraint_reinsertion_is_idempotent() {
    let (mut mesh, mut ctx) = grid_mesh();

    let segment = LineSegment::new(Point::new(5.0, 50.0), Point::new(95.0, 50.0));
    mesh.insert_edge(&segment, None, None, None, &mut ctx).unwrap();
    let edges = mesh.edge_count();
    let vertices = mesh.vertex_count();

    mesh.insert_edge(&segment, None, None, None, &mut ctx).unwrap();
    assert_eq!(mesh.edge_count(), edges);
    assert_eq!(mesh.vertex_count(), vertices);
}

#[test]
fn shoot_stops_at_interior_constraint() {
    let (mut mesh, mut ctx) = grid_mesh();

    let segment = LineSegment::new(Point::new(5.0, 50.0), Point::new(95.0, 50.0));
    mesh.insert_edge(&segment, None, None, None, &mut ctx).unwrap();

    // A ray fired upward from below the row must stop at it, not at the
    // bounding square.
    let ray = Ray::new(Point::new(52.0, 31.0), Point::new(0.0, 1.0));
    let hit = mesh.shoot(&ray, &mut ctx).expect("ray hits the row");
    assert!(mesh.is_constrained(hit));
    assert_eq!(mesh.org(hit).y, 50.0);
    assert_eq!(mesh.dest(hit).y, 50.0);
}

#[test]
fn walk_follows_the_constrained_row() {
    let (mut mesh, mut ctx) = grid_mesh();

    let segment = LineSegment::new(Point::new(5.0, 50.0), Point::new(95.0, 50.0));
    mesh.insert_edge(&segment, None, None, None, &mut ctx).unwrap();

    let arrival = mesh.walk(&segment, &mut ctx).expect("walk reaches the end");
    assert_eq!(mesh.org(arrival), Point::new(95.0, 50.0));
}

#[test]
fn deleting_constrained_chain_edges_is_rejected() {
    let (mut mesh, mut ctx) = grid_mesh();

    let segment = LineSegment::new(Point::new(5.0, 50.0), Point::new(95.0, 50.0));
    mesh.insert_edge(&segment, None, None, None, &mut ctx).unwrap();

    let mut rejected = 0;
    let mut chain = Vec::new();
    mesh.for_each_edge(|e| {
        if mesh.is_constrained(e) && mesh.org(e).y == 50.0 && mesh.dest(e).y == 50.0 {
            chain.push(e);
        }
    });
    assert!(!chain.is_empty());
    for e in chain {
        if mesh.delete_edge(e) == Err(DeleteEdgeError::Constrained) {
            rejected += 1;
        }
    }
    assert!(rejected > 0);
    assert_eq!(mesh.euler_characteristic(), 2);
}
