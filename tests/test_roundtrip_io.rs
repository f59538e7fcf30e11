use cloudconv_core::{Face, FaceCorner, PointCloud, PointXYZRGBA, SubMesh, TexMaterial, TextureMesh};
use cloudconv_io::{
    convert_obj_to_off, convert_off_to_pcd, convert_off_to_ply, convert_pcd_to_off,
    convert_ply_to_off, normalize_face_indices, read_obj, read_off, read_pcd, read_ply,
    write_obj, write_off, write_pcd_binary, write_ply_binary,
};
use std::fs;
use tempfile::tempdir;

const TRIANGLE: &str = "COFF\n3 1 0\n\
                        0 0 0 255 0 0 0\n\
                        1 0 0 0 255 0 0\n\
                        0 1 0 0 0 255 0\n\
                        3 0 1 2\n";

fn colored_grid(n: usize) -> PointCloud {
    (0..n)
        .map(|i| {
            let f = i as f32;
            PointXYZRGBA::new(f * 0.25, -f * 0.5, f.sin()).with_rgba(
                (i * 7 % 256) as u8,
                (i * 13 % 256) as u8,
                (i * 29 % 256) as u8,
                (i % 256) as u8,
            )
        })
        .collect()
}

#[test]
fn coff_triangle_reads_and_rewrites_identically() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("triangle.off");
    let dst = dir.path().join("triangle_copy.off");
    fs::write(&src, TRIANGLE).unwrap();

    let loaded = read_off(&src).unwrap();
    assert!(loaded.colored);
    assert_eq!(loaded.mesh.cloud.len(), 3);
    assert_eq!(loaded.mesh.cloud.point(1).rgba(), [0, 255, 0, 0]);
    assert_eq!(loaded.mesh.faces, vec![Face::new(vec![0, 1, 2])]);

    write_off(&dst, &loaded.mesh.cloud, &loaded.mesh.faces).unwrap();
    assert_eq!(fs::read_to_string(&dst).unwrap(), TRIANGLE);
}

#[test]
fn off_roundtrip_preserves_points_colors_and_faces() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("grid.off");
    let cloud = colored_grid(50);
    let faces: Vec<Face> = (0..48u32)
        .map(|i| Face::new(vec![i, i + 1, i + 2]))
        .chain(std::iter::once(Face::new(vec![0, 10, 20, 30, 40])))
        .collect();

    write_off(&path, &cloud, &faces).unwrap();
    let loaded = read_off(&path).unwrap().mesh;

    assert_eq!(loaded.cloud.len(), cloud.len());
    for (a, b) in loaded.cloud.iter_points().zip(cloud.iter_points()) {
        assert!((a.x - b.x).abs() < 1e-6);
        assert!((a.y - b.y).abs() < 1e-6);
        assert!((a.z - b.z).abs() < 1e-6);
        assert_eq!(a.rgba(), b.rgba());
    }
    assert_eq!(loaded.faces, faces);
}

#[test]
fn nan_point_is_dropped_and_faces_follow() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("holes.off");
    let mut cloud = colored_grid(4);
    cloud.x[1] = f32::NAN;

    write_off(
        &path,
        &cloud,
        &[Face::new(vec![0, 2, 3]), Face::new(vec![0, 1, 2])],
    )
    .unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let header = text.lines().nth(1).unwrap();
    assert_eq!(header, "3 1 0");
    assert!(!text.contains("NaN"));

    let loaded = read_off(&path).unwrap().mesh;
    assert_eq!(loaded.cloud.len(), 3);
    assert_eq!(loaded.faces, vec![Face::new(vec![0, 1, 2])]);
    assert_eq!(loaded.cloud.point(1).rgba(), cloud.point(2).rgba());
}

#[test]
fn pcd_and_ply_binary_roundtrip() {
    let dir = tempdir().unwrap();
    let cloud = colored_grid(200);

    let pcd = dir.path().join("grid.pcd");
    write_pcd_binary(&pcd, &cloud).unwrap();
    assert_eq!(read_pcd(&pcd).unwrap(), cloud);

    let ply = dir.path().join("grid.ply");
    write_ply_binary(&ply, &cloud).unwrap();
    assert_eq!(read_ply(&ply).unwrap(), cloud);
}

#[test]
fn conversion_chain_appends_extensions() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("scene.off");
    fs::write(&src, TRIANGLE).unwrap();

    let pcd = convert_off_to_pcd(&src).unwrap();
    assert_eq!(pcd.file_name().unwrap(), "scene.off.pcd");
    let off_again = convert_pcd_to_off(&pcd).unwrap();
    assert_eq!(off_again.file_name().unwrap(), "scene.off.pcd.off");

    let ply = convert_off_to_ply(&off_again).unwrap();
    let last = convert_ply_to_off(&ply).unwrap();
    assert_eq!(last.file_name().unwrap(), "scene.off.pcd.off.ply.off");

    // points survive four hops, faces were dropped at the first
    let original = read_off(&src).unwrap().mesh.cloud;
    let result = read_off(&last).unwrap().mesh;
    assert_eq!(result.cloud, original);
    assert!(result.faces.is_empty());
}

#[test]
fn written_obj_normalizes_and_converts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("quad.obj");
    let cloud = PointCloud::from_xyz(
        vec![0.0, 1.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0, 1.0],
        vec![0.0; 4],
    );
    let corner = |p: u32, t: u32| FaceCorner {
        position: p,
        texture: Some(t),
        normal: Some(p),
    };
    let mesh = TextureMesh {
        cloud,
        tex_coordinates: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        normals: vec![[0.0, 0.0, 1.0]; 4],
        submeshes: vec![SubMesh {
            material: Some("tile".into()),
            faces: vec![vec![corner(0, 3), corner(1, 2), corner(2, 1), corner(3, 0)]],
        }],
        materials: vec![TexMaterial::new("tile")],
    };
    write_obj(&path, &mesh, 6).unwrap();
    assert!(dir.path().join("quad.mtl").exists());

    let reloaded = read_obj(&path).unwrap();
    assert_eq!(reloaded.face_count(), 1);
    assert_eq!(reloaded.materials.len(), 1);
    assert_eq!(reloaded.materials[0].name, "tile");
    assert!(reloaded.submeshes[0].faces[0].iter().all(|c| c.texture.is_some()));

    assert_eq!(normalize_face_indices(&path).unwrap(), 1);
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("f 1/1/1 2/2/2 3/3/3 4/4/4"), "{text}");

    let off = convert_obj_to_off(&path).unwrap();
    let polygon = read_off(off).unwrap().mesh;
    assert_eq!(polygon.cloud.len(), 4);
    assert_eq!(polygon.faces, vec![Face::new(vec![0, 1, 2, 3])]);
}
