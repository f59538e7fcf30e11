use cloudconv_core::{Face, PointCloud, PointXYZRGBA};
use cloudconv_filters::{remap_faces, remove_nan};
use cloudconv_io::{CloudIo, IoConfig, OutputPaths};
use std::fs;
use tempfile::tempdir;

/// Two quads and a triangle sharing an edge, with texture and normal
/// indices that differ from the position indices.
const SCENE_OBJ: &str = "# scene\n\
v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv 2 0 0\nv 2 1 0\nv 3 0 0\n\
vt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\nvt 0.5 0.5\nvt 0.2 0.2\nvt 0.7 0.1\n\
vn 0 0 1\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\nvn 0 0 1\n\
f 1/4/7 2/3/6 3/2/5 4/1/4\n\
f 2/7/1 5/6/2 6/5/3 3/4/4\n\
f 5/1/1 7/2/2 6/3/3\n";

/// End-to-end pipeline: OBJ → normalize → OFF → PCD → OFF
#[test]
fn pipeline_obj_normalize_off_pcd() {
    let dir = tempdir().unwrap();
    let io = CloudIo::new(IoConfig::default().with_paths(OutputPaths::in_dir(dir.path())));

    let obj = dir.path().join("scene.obj");
    fs::write(&obj, SCENE_OBJ).unwrap();

    // Step 1: normalize face groups in place
    assert_eq!(io.normalize_obj(&obj).unwrap(), 3);
    let text = fs::read_to_string(&obj).unwrap();
    assert!(text.starts_with("# scene\nv 0 0 0\n"));
    assert!(text.ends_with("f 5/5/5 7/7/7 6/6/6\n"));

    // Step 2: the normalized file still loads
    let mesh = io.load_obj(&obj).unwrap();
    assert_eq!(mesh.face_count(), 3);
    assert_eq!(mesh.cloud.len(), 7);

    // Step 3: OBJ → OFF keeps faces
    let off = io.convert_obj_to_off(&obj).unwrap();
    assert_eq!(off, dir.path().join("scene.obj.off"));
    let polygon = io.load_off(&off).unwrap().mesh;
    assert_eq!(polygon.faces.len(), 3);
    assert_eq!(polygon.faces[0].len(), 4);
    assert_eq!(polygon.faces[2].len(), 3);

    // Step 4: OFF → PCD → OFF keeps points, loses faces
    let pcd = io.convert_off_to_pcd(&off).unwrap();
    let back = io.convert_pcd_to_off(&pcd).unwrap();
    let points_only = io.load_off(&back).unwrap().mesh;
    assert_eq!(points_only.cloud, polygon.cloud);
    assert!(points_only.faces.is_empty());
}

/// Invalid points are filtered before saving and the faces follow them.
#[test]
fn pipeline_filter_then_save_all_formats() {
    let dir = tempdir().unwrap();
    let io = CloudIo::new(IoConfig::default().with_paths(OutputPaths::in_dir(dir.path())));

    let mut cloud: PointCloud = (0..10)
        .map(|i| PointXYZRGBA::new(i as f32, 0.0, 0.0).with_rgba(i as u8 * 20, 0, 0, 255))
        .collect();
    cloud.y[3] = f32::NAN;
    cloud.z[7] = f32::INFINITY;
    let faces = vec![
        Face::new(vec![0, 1, 2]),
        Face::new(vec![2, 3, 4]),
        Face::new(vec![4, 5, 6, 8]),
        Face::new(vec![7, 8, 9]),
    ];

    let (valid, kept) = remove_nan(&cloud);
    assert_eq!(valid.len(), 8);
    let remapped = remap_faces(&faces, &kept, cloud.len());
    assert_eq!(remapped.dropped, 2);
    assert_eq!(
        remapped.faces,
        vec![Face::new(vec![0, 1, 2]), Face::new(vec![3, 4, 5, 6])]
    );

    let off = io.save_off(&cloud, &faces, None).unwrap();
    let pcd = io.save_pcd(&valid, None).unwrap();
    let ply = io.save_ply(&cloud, None).unwrap();

    let from_off = io.load_off(&off).unwrap().mesh;
    assert_eq!(from_off.cloud, valid);
    assert_eq!(from_off.faces, remapped.faces);
    assert_eq!(io.load_pcd(&pcd).unwrap(), valid);
    assert_eq!(io.load_ply(&ply).unwrap(), valid);
}
