//! Wavefront OBJ textured meshes with MTL material libraries.
//!
//! Loading goes through `tobj`. Each `tobj` model becomes one [`SubMesh`];
//! since `tobj` gives every model its own vertex list, vertices shared
//! between models are duplicated in the merged cloud.

use cloudconv_core::{FaceCorner, PointXYZRGBA, SubMesh, TexMaterial, TextureMesh};
use std::fs;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{ensure_path, FaceIndexOutOfRange, IoError, IoResult};

const FORMAT: &str = "OBJ";

/// Decimal places used for coordinates when none are configured.
pub const DEFAULT_OBJ_PRECISION: usize = 6;

/// Loads an OBJ file and the material library it references.
///
/// A missing or unreadable material library is logged and the mesh is
/// returned without materials.
pub fn read_obj(path: impl AsRef<Path>) -> IoResult<TextureMesh> {
    let path = path.as_ref();
    ensure_path(path)?;
    let file = fs::File::open(path).map_err(|e| IoError::from_open(e, path))?;

    let (models, materials) = tobj::load_obj_buf(
        &mut BufReader::new(file),
        &tobj::LoadOptions {
            single_index: false,
            triangulate: false,
            ..Default::default()
        },
        |mtl| match path.parent() {
            Some(parent) => tobj::load_mtl(parent.join(mtl)),
            None => tobj::load_mtl(mtl),
        },
    )?;

    let materials = match materials {
        Ok(materials) => materials,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not load OBJ material library");
            Vec::new()
        }
    };

    let mut mesh = TextureMesh {
        materials: materials.iter().map(convert_material).collect(),
        ..Default::default()
    };

    for model in &models {
        debug!(name = %model.name, "Merging OBJ model");
        let m = &model.mesh;

        let pos_base = mesh.cloud.len() as u32;
        let tex_base = mesh.tex_coordinates.len() as u32;
        let nrm_base = mesh.normals.len() as u32;

        for (i, c) in m.positions.chunks_exact(3).enumerate() {
            let mut p = PointXYZRGBA::new(c[0], c[1], c[2]);
            if let Some(rgb) = m.vertex_color.get(i * 3..i * 3 + 3) {
                p.r = unit_to_byte(rgb[0]);
                p.g = unit_to_byte(rgb[1]);
                p.b = unit_to_byte(rgb[2]);
            }
            mesh.cloud.push(p);
        }
        mesh.tex_coordinates
            .extend(m.texcoords.chunks_exact(2).map(|c| [c[0], c[1]]));
        mesh.normals
            .extend(m.normals.chunks_exact(3).map(|c| [c[0], c[1], c[2]]));

        // `face_arities` is left empty when every face is a triangle.
        let arities: Vec<usize> = if m.face_arities.is_empty() {
            vec![3; m.indices.len() / 3]
        } else {
            m.face_arities.iter().map(|&a| a as usize).collect()
        };

        let mut faces = Vec::with_capacity(arities.len());
        let mut start = 0;
        for arity in arities {
            let end = start + arity;
            let positions = m.indices.get(start..end).ok_or_else(|| {
                IoError::malformed(FORMAT, format!("model {} has truncated face data", model.name))
            })?;
            let corners = positions
                .iter()
                .enumerate()
                .map(|(k, &pi)| FaceCorner {
                    position: pos_base + pi,
                    texture: m.texcoord_indices.get(start + k).map(|&t| tex_base + t),
                    normal: m.normal_indices.get(start + k).map(|&n| nrm_base + n),
                })
                .collect();
            faces.push(corners);
            start = end;
        }

        let material = m
            .material_id
            .and_then(|id| materials.get(id))
            .map(|mat| mat.name.clone());
        mesh.submeshes.push(SubMesh { material, faces });
    }

    if mesh.cloud.is_empty() {
        warn!(path = %path.display(), "OBJ file contains no referenced vertices");
    }
    info!(
        points = mesh.cloud.len(),
        faces = mesh.face_count(),
        materials = mesh.materials.len(),
        path = %path.display(),
        "Loaded OBJ file"
    );
    Ok(mesh)
}

/// Writes a textured mesh as OBJ, plus a sibling `.mtl` file when the mesh
/// has materials. Coordinates are written with `precision` decimals.
///
/// Face groups are 1-based `p/t/n`, `p/t`, `p//n` or `p` depending on which
/// indices each corner carries.
pub fn write_obj(path: impl AsRef<Path>, mesh: &TextureMesh, precision: usize) -> IoResult<()> {
    let path = path.as_ref();
    ensure_path(path)?;
    check_positions(mesh)?;

    let mtl_path = path.with_extension("mtl");
    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(w, "# Exported by cloudconv")?;
    if !mesh.materials.is_empty() {
        if let Some(name) = mtl_path.file_name() {
            writeln!(w, "mtllib {}", name.to_string_lossy())?;
        }
    }

    writeln!(w, "# Vertices: {}", mesh.cloud.len())?;
    for p in mesh.cloud.iter_points() {
        writeln!(
            w,
            "v {:.prec$} {:.prec$} {:.prec$}",
            p.x,
            p.y,
            p.z,
            prec = precision
        )?;
    }

    if !mesh.normals.is_empty() {
        writeln!(w, "# Vertex normals: {}", mesh.normals.len())?;
        for n in &mesh.normals {
            writeln!(
                w,
                "vn {:.prec$} {:.prec$} {:.prec$}",
                n[0],
                n[1],
                n[2],
                prec = precision
            )?;
        }
    }

    if !mesh.tex_coordinates.is_empty() {
        writeln!(w, "# Texture coordinates: {}", mesh.tex_coordinates.len())?;
        for t in &mesh.tex_coordinates {
            writeln!(w, "vt {:.prec$} {:.prec$}", t[0], t[1], prec = precision)?;
        }
    }

    for (si, sub) in mesh.submeshes.iter().enumerate() {
        writeln!(w, "# Submesh {}: {} faces", si, sub.faces.len())?;
        if let Some(material) = &sub.material {
            writeln!(w, "usemtl {}", material)?;
        }
        for face in &sub.faces {
            write!(w, "f")?;
            for c in face {
                let p = c.position + 1;
                match (c.texture, c.normal) {
                    (Some(t), Some(n)) => write!(w, " {}/{}/{}", p, t + 1, n + 1)?,
                    (Some(t), None) => write!(w, " {}/{}", p, t + 1)?,
                    (None, Some(n)) => write!(w, " {}//{}", p, n + 1)?,
                    (None, None) => write!(w, " {}", p)?,
                }
            }
            writeln!(w)?;
        }
    }
    w.flush()?;

    if !mesh.materials.is_empty() {
        write_mtl(&mtl_path, &mesh.materials)?;
    }

    info!(
        points = mesh.cloud.len(),
        faces = mesh.face_count(),
        path = %path.display(),
        "Saved OBJ file"
    );
    Ok(())
}

fn write_mtl(path: &Path, materials: &[TexMaterial]) -> IoResult<()> {
    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);
    for m in materials {
        writeln!(w, "newmtl {}", m.name)?;
        writeln!(w, "Ka {} {} {}", m.ambient[0], m.ambient[1], m.ambient[2])?;
        writeln!(w, "Kd {} {} {}", m.diffuse[0], m.diffuse[1], m.diffuse[2])?;
        writeln!(w, "Ks {} {} {}", m.specular[0], m.specular[1], m.specular[2])?;
        writeln!(w, "Ns {}", m.shininess)?;
        writeln!(w, "d {}", m.dissolve)?;
        writeln!(w, "illum {}", m.illumination)?;
        if let Some(tex) = &m.diffuse_texture {
            writeln!(w, "map_Kd {}", tex)?;
        }
        writeln!(w)?;
    }
    w.flush()?;
    debug!(materials = materials.len(), path = %path.display(), "Saved MTL file");
    Ok(())
}

fn check_positions(mesh: &TextureMesh) -> IoResult<()> {
    let len = mesh.cloud.len();
    let faces = mesh.submeshes.iter().flat_map(|s| s.faces.iter());
    for (face, corners) in faces.enumerate() {
        if let Some(c) = corners.iter().find(|c| c.position as usize >= len) {
            return Err(FaceIndexOutOfRange {
                face,
                index: c.position,
                len,
            }
            .into());
        }
    }
    Ok(())
}

fn convert_material(m: &tobj::Material) -> TexMaterial {
    let defaults = TexMaterial::new(m.name.clone());
    TexMaterial {
        ambient: m.ambient.unwrap_or(defaults.ambient),
        diffuse: m.diffuse.unwrap_or(defaults.diffuse),
        specular: m.specular.unwrap_or(defaults.specular),
        shininess: m.shininess.unwrap_or(defaults.shininess),
        dissolve: m.dissolve.unwrap_or(defaults.dissolve),
        illumination: m.illumination_model.unwrap_or(defaults.illumination),
        diffuse_texture: m.diffuse_texture.clone(),
        ..defaults
    }
}

fn unit_to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
