// Host-side tests for procedural particle meshes.

use glam::Vec3;
use motes_core::MeshKind;
use motes_render::{build_mesh, MeshData};

fn extent(mesh: &MeshData) -> Vec3 {
    mesh.vertices
        .iter()
        .map(|v| Vec3::from(v.position).abs())
        .fold(Vec3::ZERO, Vec3::max)
}

#[test]
fn index_counts_match_shape() {
    let plane = build_mesh(MeshKind::Plane, Vec3::new(0.1, 0.15, 0.0));
    assert_eq!((plane.vertices.len(), plane.index_count()), (4, 6));

    let cuboid = build_mesh(MeshKind::Box, Vec3::ONE);
    assert_eq!((cuboid.vertices.len(), cuboid.index_count()), (24, 36));

    let octa = build_mesh(MeshKind::Octahedron, Vec3::ONE);
    assert_eq!((octa.vertices.len(), octa.index_count()), (24, 24));

    let sphere = build_mesh(MeshKind::Sphere, Vec3::ONE);
    assert_eq!(sphere.vertices.len(), 9 * 13);
    assert_eq!(sphere.index_count(), 8 * 12 * 6);
}

#[test]
fn indices_stay_in_range_and_form_triangles() {
    for kind in [MeshKind::Plane, MeshKind::Box, MeshKind::Sphere, MeshKind::Octahedron] {
        let mesh = build_mesh(kind, Vec3::splat(0.5));
        assert_eq!(mesh.indices.len() % 3, 0, "{kind:?}");
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }
}

#[test]
fn normals_are_unit_length() {
    for kind in [MeshKind::Plane, MeshKind::Box, MeshKind::Sphere, MeshKind::Octahedron] {
        let mesh = build_mesh(kind, Vec3::splat(2.0));
        for v in &mesh.vertices {
            let len = Vec3::from(v.normal).length();
            assert!((len - 1.0).abs() < 1e-4, "{kind:?} normal length {len}");
        }
    }
}

#[test]
fn dimensions_are_baked_into_vertices() {
    let confetti = build_mesh(MeshKind::Box, Vec3::new(2.0, 0.1, 1.0));
    assert!(extent(&confetti).distance(Vec3::new(1.0, 0.05, 0.5)) < 1e-5);

    let petal = build_mesh(MeshKind::Plane, Vec3::new(0.1, 0.15, 0.0));
    assert!(extent(&petal).distance(Vec3::new(0.05, 0.075, 0.0)) < 1e-5);

    let sphere = build_mesh(MeshKind::Sphere, Vec3::splat(0.3));
    for v in &sphere.vertices {
        assert!((Vec3::from(v.position).length() - 0.3).abs() < 1e-5);
    }

    let dust = build_mesh(MeshKind::Octahedron, Vec3::ONE);
    assert!(extent(&dust).distance(Vec3::ONE) < 1e-5);
}
