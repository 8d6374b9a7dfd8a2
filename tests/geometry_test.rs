use cgmath::{InnerSpace, Vector3};
use realistic_render::data_structures::{
    geometry::{Geometry, check_indices, compute_tangents, flat_shaded, perpendicular_frame},
    model::ModelVertex,
};

fn vertex(position: [f32; 3], tex_coords: [f32; 2], normal: [f32; 3]) -> ModelVertex {
    ModelVertex {
        position,
        tex_coords,
        normal,
        ..Default::default()
    }
}

fn assert_unit_frame(v: &ModelVertex) {
    let n = Vector3::from(v.normal);
    let t = Vector3::from(v.tangent);
    let b = Vector3::from(v.bitangent);
    assert!((t.magnitude() - 1.0).abs() < 1e-5, "tangent {t:?} is not unit length");
    assert!((b.magnitude() - 1.0).abs() < 1e-5, "bitangent {b:?} is not unit length");
    assert!(t.dot(n).abs() < 1e-5, "tangent {t:?} is not perpendicular to {n:?}");
    assert!(b.dot(n).abs() < 1e-5, "bitangent {b:?} is not perpendicular to {n:?}");
    assert!(t.dot(b).abs() < 1e-5);
}

#[test]
fn should_follow_the_uv_directions() {
    let up = [0.0, 0.0, 1.0];
    let mut vertices = vec![
        vertex([0.0, 0.0, 0.0], [0.0, 1.0], up),
        vertex([1.0, 0.0, 0.0], [1.0, 1.0], up),
        vertex([0.0, 1.0, 0.0], [0.0, 0.0], up),
    ];
    compute_tangents(&mut vertices, &[0, 1, 2]);

    for v in &vertices {
        assert_eq!(v.tangent, [1.0, 0.0, 0.0]);
        assert_eq!(v.bitangent, [0.0, 1.0, 0.0]);
    }
}

#[test]
fn should_build_a_frame_without_uvs() {
    let normal = Vector3::new(1.0, 1.0, 0.0).normalize().into();
    let mut vertices = vec![
        vertex([0.0, 0.0, 0.0], [0.0, 0.0], normal),
        vertex([1.0, -1.0, 0.0], [0.0, 0.0], normal),
        vertex([0.0, 0.0, 1.0], [0.0, 0.0], normal),
    ];
    compute_tangents(&mut vertices, &[0, 1, 2]);

    vertices.iter().for_each(assert_unit_frame);
}

#[test]
fn should_build_a_frame_for_vertices_outside_every_triangle() {
    let mut vertices = vec![
        vertex([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 1.0, 0.0]),
        vertex([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 1.0, 0.0]),
        vertex([0.0, 0.0, 1.0], [0.0, 1.0], [0.0, 1.0, 0.0]),
        // Not referenced by any index
        vertex([5.0, 5.0, 5.0], [0.0, 0.0], [1.0, 0.0, 0.0]),
    ];
    compute_tangents(&mut vertices, &[0, 1, 2]);

    assert_unit_frame(&vertices[3]);
}

#[test]
fn should_skip_triangles_with_out_of_range_indices() {
    let mut vertices = vec![
        vertex([0.0, 0.0, 0.0], [0.0, 0.0], [0.0, 0.0, 1.0]),
        vertex([1.0, 0.0, 0.0], [1.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    compute_tangents(&mut vertices, &[0, 1, 9]);

    vertices.iter().for_each(assert_unit_frame);
}

#[test]
fn should_pick_some_frame_for_a_zero_normal() {
    let (t, b) = perpendicular_frame(Vector3::new(0.0, 0.0, 0.0));
    assert!((t.magnitude() - 1.0).abs() < 1e-5);
    assert!((b.magnitude() - 1.0).abs() < 1e-5);
    assert!(t.dot(b).abs() < 1e-5);

    let (t, b) = perpendicular_frame(Vector3::unit_x());
    assert!(t.dot(Vector3::unit_x()).abs() < 1e-5);
    assert!(b.dot(Vector3::unit_x()).abs() < 1e-5);
}

#[test]
fn should_give_every_triangle_its_face_normal() {
    let positions = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, -1.0],
    ];
    let vertices: Vec<_> = positions
        .iter()
        .map(|&p| vertex(p, [0.0, 0.0], [0.0, 0.0, 0.0]))
        .collect();

    // Shares the edge 0-1 between a triangle facing +Z and one facing +Y
    let (flat, indices) = flat_shaded(&vertices, &[0, 1, 2, 0, 1, 3]);

    assert_eq!(flat.len(), 6);
    assert_eq!(indices, [0, 1, 2, 3, 4, 5]);
    assert!(flat[..3].iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    assert!(flat[3..].iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
    assert_eq!(flat[5].position, [0.0, 0.0, -1.0]);
}

#[test]
fn should_point_degenerate_faces_up() {
    let vertices = vec![vertex([1.0, 1.0, 1.0], [0.0, 0.0], [0.0, 0.0, 0.0]); 3];
    let (flat, _) = flat_shaded(&vertices, &[0, 1, 2]);
    assert!(flat.iter().all(|v| v.normal == [0.0, 1.0, 0.0]));
}

#[test]
fn should_reject_indices_past_the_vertex_list() {
    assert!(check_indices(&[0, 1, 2], 3).is_ok());
    assert!(check_indices(&[], 0).is_ok());

    let err = check_indices(&[0, 1, 3], 3).expect_err("index 3 is out of bounds");
    assert!(err.to_string().contains("index 3"), "{err}");
}

#[test]
fn should_keep_the_builtin_tangents_of_the_box() {
    let cuboid = Geometry::cuboid(1.0, 2.0, 3.0);
    assert_eq!(cuboid.triangle_count(), 12);
    cuboid.vertices.iter().for_each(assert_unit_frame);
}
