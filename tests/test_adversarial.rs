//! Adversarial edge-case integration tests.
//!
//! Corrupted headers, truncated bodies, empty file names and missing files
//! must come back as errors, never as panics or partially written outputs.

use cloudconv_core::{Face, PointCloud, PointXYZRGBA, TextureMesh};
use cloudconv_io::{
    convert_off_to_pcd, convert_off_to_ply, normalize_face_indices, read_obj, read_off, read_pcd,
    read_ply, write_obj, write_off, write_pcd, write_ply, CloudIo, IoError,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_and_read(name: &str, contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (dir, path)
}

// ────────────────── empty file names ──────────────────

#[test]
fn empty_filename_saves_fail_without_creating_files() {
    let dir = tempdir().unwrap();
    let cloud = PointCloud::from_points([PointXYZRGBA::new(1.0, 2.0, 3.0)]);
    let empty = Path::new("");

    assert!(matches!(write_off(empty, &cloud, &[]), Err(IoError::EmptyPath)));
    assert!(matches!(write_pcd(empty, &cloud), Err(IoError::EmptyPath)));
    assert!(matches!(write_ply(empty, &cloud), Err(IoError::EmptyPath)));
    assert!(matches!(
        write_obj(empty, &TextureMesh::default(), 6),
        Err(IoError::EmptyPath)
    ));

    let io = CloudIo::default();
    assert!(matches!(io.save_off(&cloud, &[], Some(empty)), Err(IoError::EmptyPath)));
    assert!(matches!(io.save_pcd(&cloud, Some(empty)), Err(IoError::EmptyPath)));

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn empty_filename_loads_fail() {
    assert!(matches!(read_off(""), Err(IoError::EmptyPath)));
    assert!(matches!(read_pcd(""), Err(IoError::EmptyPath)));
    assert!(matches!(read_ply(""), Err(IoError::EmptyPath)));
    assert!(matches!(read_obj(""), Err(IoError::EmptyPath)));
    assert!(matches!(normalize_face_indices(""), Err(IoError::EmptyPath)));
}

// ────────────────── missing files ──────────────────

#[test]
fn missing_files_are_not_found() {
    let dir = tempdir().unwrap();
    for name in ["a.off", "a.pcd", "a.ply", "a.obj"] {
        let path = dir.path().join(name);
        let err = match name {
            "a.off" => read_off(&path).map(|_| ()),
            "a.pcd" => read_pcd(&path).map(|_| ()),
            "a.ply" => read_ply(&path).map(|_| ()),
            _ => read_obj(&path).map(|_| ()),
        }
        .unwrap_err();
        assert!(
            matches!(&err, IoError::FileNotFound { path: p } if p == &path),
            "{name}: {err}"
        );
    }
}

// ────────────────── OFF ──────────────────

#[test]
fn off_rejects_unknown_tag() {
    let (_dir, path) = write_and_read("bad.off", b"NOFF\n1 0 0\n0 0 0\n");
    assert!(matches!(read_off(&path), Err(IoError::MalformedFormat { .. })));
}

#[test]
fn off_rejects_empty_file() {
    let (_dir, path) = write_and_read("empty.off", b"");
    assert!(read_off(&path).is_err());
}

#[test]
fn off_rejects_truncated_body() {
    let (_dir, path) = write_and_read("short.off", b"COFF\n3 1 0\n0 0 0 1 2 3 4\n");
    assert!(matches!(read_off(&path), Err(IoError::MalformedFormat { .. })));
}

#[test]
fn off_rejects_negative_counts() {
    let (_dir, path) = write_and_read("neg.off", b"OFF\n-1 0 0\n");
    assert!(read_off(&path).is_err());
}

#[test]
fn off_huge_header_count_does_not_allocate_up_front() {
    let (_dir, path) = write_and_read("huge.off", b"OFF\n4000000000 0 0\n1 2 3\n");
    assert!(read_off(&path).is_err());
}

#[test]
fn coff_body_under_off_tag_is_misaligned() {
    let (_dir, path) = write_and_read(
        "mislabelled.off",
        b"OFF\n3 1 0\n0 0 0 255 0 0 0\n1 0 0 0 255 0 0\n0 1 0 0 0 255 0\n3 0 1 2\n",
    );
    assert!(matches!(read_off(&path), Err(IoError::MalformedFormat { .. })));
}

#[test]
fn one_based_off_reads_and_converts() {
    let (dir, path) = write_and_read(
        "one_based.off",
        b"OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 1 2 3\n",
    );

    let mesh = read_off(&path).unwrap().mesh;
    assert_eq!(mesh.faces, vec![Face::new(vec![1, 2, 3])]);

    let pcd = convert_off_to_pcd(&path).unwrap();
    assert_eq!(read_pcd(&pcd).unwrap(), mesh.cloud);
    let ply = convert_off_to_ply(&path).unwrap();
    assert_eq!(read_ply(&ply).unwrap().len(), 3);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn off_faces_past_the_cloud_are_written_as_given() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("loose.off");
    let cloud = PointCloud::from_xyz(vec![0.0], vec![0.0], vec![0.0]);

    write_off(&path, &cloud, &[Face::new(vec![0, 7])]).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "COFF\n1 1 0\n0 0 0 255 255 255 0\n2 0 7\n"
    );
}

#[test]
fn off_all_points_non_finite() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("void.off");
    let cloud = PointCloud::from_xyz(
        vec![f32::NAN, f32::INFINITY],
        vec![0.0, 0.0],
        vec![0.0, f32::NEG_INFINITY],
    );

    write_off(&path, &cloud, &[Face::new(vec![0, 1])]).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "COFF\n0 0 0\n");
    let loaded = read_off(&path).unwrap().mesh;
    assert!(loaded.cloud.is_empty());
    assert!(loaded.faces.is_empty());
}

// ────────────────── PCD / PLY ──────────────────

#[test]
fn pcd_without_data_line() {
    let (_dir, path) = write_and_read("nodata.pcd", b"VERSION 0.7\nFIELDS x y z\nPOINTS 1\n");
    assert!(matches!(read_pcd(&path), Err(IoError::MalformedFormat { .. })));
}

#[test]
fn pcd_truncated_binary_payload() {
    let mut bytes = b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nPOINTS 2\nDATA binary\n"
        .to_vec();
    bytes.extend_from_slice(&1.0f32.to_le_bytes());
    let (_dir, path) = write_and_read("short.pcd", &bytes);
    assert!(read_pcd(&path).is_err());
}

#[test]
fn ply_without_magic() {
    let (_dir, path) = write_and_read("nomagic.ply", b"format ascii 1.0\nend_header\n");
    assert!(read_ply(&path).is_err());
}

#[test]
fn ply_missing_end_header() {
    let (_dir, path) = write_and_read(
        "noend.ply",
        b"ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n",
    );
    assert!(read_ply(&path).is_err());
}

// ────────────────── OBJ ──────────────────

#[test]
fn obj_face_past_vertex_list() {
    let (_dir, path) = write_and_read("bad.obj", b"v 0 0 0\nv 1 0 0\nf 1 2 9\n");
    assert!(read_obj(&path).is_err());
}

#[test]
fn obj_missing_material_library_is_tolerated() {
    let (_dir, path) = write_and_read(
        "nomtl.obj",
        b"mtllib missing.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
    );
    let mesh = read_obj(&path).unwrap();
    assert_eq!(mesh.face_count(), 1);
    assert!(mesh.materials.is_empty());
}

#[test]
fn normalizer_leaves_file_intact_on_bad_face() {
    let original = "v 0 0 0\nf 1/1/1 2/2/2 3/3/3\nf 1/x 2 3\n";
    let (dir, path) = write_and_read("partial.obj", original.as_bytes());

    assert!(normalize_face_indices(&path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}
