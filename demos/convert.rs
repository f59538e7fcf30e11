//! Converts a file between formats, or runs a small demo when no path is
//! given.
//!
//! ```text
//! cargo run --example convert -- scene.off
//! RUST_LOG=debug cargo run --example convert
//! ```

use cloudconv::{CloudIo, Face, IoConfig, OutputPaths, PointCloud, PointXYZRGBA};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    match std::env::args().nth(1) {
        Some(path) => convert_one(&CloudIo::default(), Path::new(&path)),
        None => demo(),
    }
}

fn convert_one(io: &CloudIo, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let written = match ext.as_deref() {
        Some("off") => io.convert_off_to_pcd(path)?,
        Some("pcd") => io.convert_pcd_to_off(path)?,
        Some("ply") => io.convert_ply_to_off(path)?,
        Some("obj") => {
            let faces = io.normalize_obj(path)?;
            println!("Normalized {} face lines", faces);
            io.convert_obj_to_off(path)?
        }
        _ => return Err(format!("unrecognized extension: {}", path.display()).into()),
    };
    println!("{} -> {}", path.display(), written.display());
    Ok(())
}

fn demo() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let io = CloudIo::new(IoConfig::default().with_paths(OutputPaths::in_dir(dir.path())));

    // A colored triangle plus one invalid point that the writers drop
    let cloud = PointCloud::from_points([
        PointXYZRGBA::new(0.0, 0.0, 0.0).with_rgba(255, 0, 0, 0),
        PointXYZRGBA::new(f32::NAN, 0.0, 0.0),
        PointXYZRGBA::new(1.0, 0.0, 0.0).with_rgba(0, 255, 0, 0),
        PointXYZRGBA::new(0.0, 1.0, 0.0).with_rgba(0, 0, 255, 0),
    ]);
    let faces = [Face::new(vec![0, 2, 3])];

    let off = io.save_off(&cloud, &faces, None)?;
    println!("{}:\n{}", off.display(), std::fs::read_to_string(&off)?);

    let pcd = io.convert_off_to_pcd(&off)?;
    let ply = io.convert_off_to_ply(&off)?;
    let back = io.convert_pcd_to_off(&pcd)?;
    println!("Wrote {}, {} and {}", pcd.display(), ply.display(), back.display());

    let reloaded = io.load_off(&back)?;
    println!(
        "Round trip kept {} points and {} faces",
        reloaded.mesh.cloud.len(),
        reloaded.mesh.faces.len()
    );
    Ok(())
}
