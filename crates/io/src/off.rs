//! OFF / COFF plain-text vertex+face format.
//!
//! ```text
//! COFF
//! <points> <faces> <edges>
//! x y z [r g b a]          one per point, colors only under COFF
//! n v0 v1 ... v(n-1)       one per face
//! ```
//!
//! Reading is a single pass over a whitespace token stream that yields the
//! points and faces together. Writing always emits `COFF`, drops points with
//! non-finite coordinates and renumbers face indices to match.

use cloudconv_core::{Face, PointCloud, PointXYZRGBA, PolygonMesh};
use cloudconv_filters::{remap_faces, remove_nan};
use std::fmt::Display;
use std::fs;
use std::io::{BufWriter, Write as _};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{ensure_path, read_file, IoError, IoResult};

pub const OFF_TAG: &str = "OFF";
pub const COFF_TAG: &str = "COFF";

const FORMAT: &str = "OFF";

// Cap on up-front allocation so a lying header cannot exhaust memory.
const MAX_PREALLOC: usize = 1 << 20;

/// Result of parsing an OFF file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OffMesh {
    pub mesh: PolygonMesh,
    /// True when the tag line was `COFF`.
    pub colored: bool,
}

/// Reads points and faces from an OFF or COFF file.
pub fn read_off(path: impl AsRef<Path>) -> IoResult<OffMesh> {
    let path = path.as_ref();
    let raw = read_file(path)?;
    let text = std::str::from_utf8(&raw)
        .map_err(|e| IoError::malformed(FORMAT, format!("invalid UTF-8: {}", e)))?;

    let parsed = parse_off(text)?;
    if parsed.mesh.cloud.is_empty() {
        warn!(path = %path.display(), "OFF file contains no points");
    }
    info!(
        points = parsed.mesh.cloud.len(),
        faces = parsed.mesh.faces.len(),
        colored = parsed.colored,
        path = %path.display(),
        "Loaded OFF file"
    );
    Ok(parsed)
}

/// Reads only the points of an OFF file, plus whether it was tagged `COFF`.
pub fn read_off_points(path: impl AsRef<Path>) -> IoResult<(PointCloud, bool)> {
    let OffMesh { mesh, colored } = read_off(path)?;
    Ok((mesh.cloud, colored))
}

/// Reads only the faces of an OFF file.
pub fn read_off_faces(path: impl AsRef<Path>) -> IoResult<Vec<Face>> {
    Ok(read_off(path)?.mesh.faces)
}

/// Parses OFF text already in memory.
pub fn parse_off(text: &str) -> IoResult<OffMesh> {
    let (tag_line, body) = text.split_once('\n').unwrap_or((text, ""));
    let colored = match tag_line.trim() {
        COFF_TAG => true,
        OFF_TAG => false,
        other => {
            return Err(IoError::malformed(
                FORMAT,
                format!("unknown tag line {:?}, expected OFF or COFF", other),
            ))
        }
    };

    let mut tokens = tokenize(body);
    let n_points: usize = tokens.parse_next("point count")?;
    let n_faces: usize = tokens.parse_next("face count")?;
    let _n_edges: usize = tokens.parse_next("edge count")?;
    debug!(n_points, n_faces, colored, "Parsed OFF header");

    let mut cloud = PointCloud::with_capacity(n_points.min(MAX_PREALLOC));
    for _ in 0..n_points {
        let x = tokens.parse_next("x coordinate")?;
        let y = tokens.parse_next("y coordinate")?;
        let z = tokens.parse_next("z coordinate")?;
        let mut p = PointXYZRGBA::new(x, y, z);
        if colored {
            let r = tokens.channel_next("red")?;
            let g = tokens.channel_next("green")?;
            let b = tokens.channel_next("blue")?;
            let a = tokens.channel_next("alpha")?;
            p = p.with_rgba(r, g, b, a);
        }
        cloud.push(p);
    }

    let mut faces = Vec::with_capacity(n_faces.min(MAX_PREALLOC));
    for _ in 0..n_faces {
        let n: usize = tokens.parse_next("face vertex count")?;
        let mut vertices = Vec::with_capacity(n.min(MAX_PREALLOC));
        for _ in 0..n {
            vertices.push(tokens.parse_next("face vertex index")?);
        }
        faces.push(Face::new(vertices));
    }

    if let Some((line, tok)) = tokens.iter.next() {
        return Err(IoError::malformed(
            FORMAT,
            format!(
                "line {}: unexpected token {:?} after {} points and {} faces",
                line, tok, n_points, n_faces
            ),
        ));
    }

    Ok(OffMesh {
        mesh: PolygonMesh::new(cloud, faces),
        colored,
    })
}

/// Writes a COFF file.
///
/// Points with a NaN or infinite coordinate are left out of both the header
/// count and the body, and faces are renumbered to the compacted point list.
/// Faces that touch a dropped point are not written. Indices that do not
/// address an input point are written unchanged.
pub fn write_off(path: impl AsRef<Path>, cloud: &PointCloud, faces: &[Face]) -> IoResult<()> {
    let path = path.as_ref();
    ensure_path(path)?;

    let (valid, kept) = remove_nan(cloud);
    let remapped = remap_faces(faces, &kept, cloud.len());
    if remapped.dropped > 0 {
        warn!(
            dropped = remapped.dropped,
            "Skipped faces referencing non-finite points"
        );
    }

    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(w, "{}", COFF_TAG)?;
    writeln!(w, "{} {} 0", valid.len(), remapped.faces.len())?;

    for p in valid.iter_points() {
        writeln!(
            w,
            "{} {} {} {} {} {} {}",
            p.x, p.y, p.z, p.r, p.g, p.b, p.a
        )?;
    }

    for face in &remapped.faces {
        write!(w, "{}", face.len())?;
        for v in &face.vertices {
            write!(w, " {}", v)?;
        }
        writeln!(w)?;
    }

    w.flush()?;

    info!(
        points = valid.len(),
        faces = remapped.faces.len(),
        path = %path.display(),
        "Saved OFF file"
    );
    Ok(())
}

pub fn write_off_mesh(path: impl AsRef<Path>, mesh: &PolygonMesh) -> IoResult<()> {
    write_off(path, &mesh.cloud, &mesh.faces)
}

/// Whitespace tokens tagged with their 1-based line number.
struct Tokens<I> {
    iter: I,
    line: usize,
}

// Body starts on line 2, after the tag line.
fn tokenize(body: &str) -> Tokens<impl Iterator<Item = (usize, &str)> + '_> {
    let iter = body
        .lines()
        .enumerate()
        .flat_map(|(i, line)| line.split_whitespace().map(move |tok| (i + 2, tok)));
    Tokens { iter, line: 1 }
}

impl<'a, I> Tokens<I>
where
    I: Iterator<Item = (usize, &'a str)>,
{
    fn next_token(&mut self, what: &str) -> IoResult<&'a str> {
        match self.iter.next() {
            Some((line, tok)) => {
                self.line = line;
                Ok(tok)
            }
            None => Err(IoError::malformed(
                FORMAT,
                format!(
                    "unexpected end of file after line {} while reading {}",
                    self.line, what
                ),
            )),
        }
    }

    fn parse_next<T>(&mut self, what: &str) -> IoResult<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        let tok = self.next_token(what)?;
        tok.parse::<T>().map_err(|e| {
            IoError::malformed(
                FORMAT,
                format!("line {}: invalid {} {:?}: {}", self.line, what, tok, e),
            )
        })
    }

    /// Color channels are read as plain integers and saturated into a byte.
    fn channel_next(&mut self, what: &str) -> IoResult<u8> {
        let v: i64 = self.parse_next(what)?;
        Ok(v.clamp(0, 255) as u8)
    }
}
