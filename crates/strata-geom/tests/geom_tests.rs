use strata_geom::{BlockBox, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_add_sub() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c, Vec3::new(-3.0, 7.0, -3.0), 1e-6));
    assert!(vec3_approx_eq(c - a, b, 1e-6));
}

#[test]
fn vec3_cross_is_orthogonal() {
    let a = Vec3::new(1.0, 0.0, 0.0);
    let b = Vec3::new(0.0, 0.0, 1.0);
    let c = a.cross(b);
    assert!(vec3_approx_eq(c, Vec3::new(0.0, -1.0, 0.0), 1e-6));
    assert!(approx_eq(c.dot(a), 0.0, 1e-6));
}

#[test]
fn block_box_chunk_span_single_chunk() {
    let b = BlockBox::new((2, 0, 3), (4, 4, 4));
    assert_eq!(b.chunk_span(), Some(((0, 0), (0, 0))));
}

#[test]
fn block_box_expand_reaches_neighbor_chunks() {
    let b = BlockBox::new((0, 5, 15), (1, 1, 1)).expand(1);
    assert_eq!(b.origin, (-1, 4, 14));
    assert_eq!(b.size, (3, 3, 3));
    assert_eq!(b.chunk_span(), Some(((-1, 0), (0, 1))));
}

#[test]
fn empty_block_box_has_no_span() {
    let b = BlockBox::new((0, 0, 0), (0, 4, 4));
    assert!(b.is_empty());
    assert_eq!(b.chunk_span(), None);
}
