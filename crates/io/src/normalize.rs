//! In-place rewrite of OBJ face lines so each corner reuses its position
//! index for the texture and normal slots.
//!
//! ```text
//! f 1/2/3 4/5/6 7/8/9   ->   f 1/1/1 4/4/4 7/7/7
//! ```
//!
//! Every other line is copied byte for byte, line endings included. The
//! rewrite assumes a single writer: nothing guards against another process
//! editing the file at the same time.

use std::fs;
use std::io::Write as _;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{read_file, IoError, IoResult};

const FORMAT: &str = "OBJ";
const FACE_MARKER: &[u8] = b"f";

/// Rewrites the face lines of the OBJ file at `path` and returns how many
/// were rewritten.
///
/// The new content goes to a temporary file in the same directory which then
/// replaces the original. On any error the original is left as it was and the
/// temporary file is removed.
pub fn normalize_face_indices(path: impl AsRef<Path>) -> IoResult<usize> {
    let path = path.as_ref();
    let raw = read_file(path)?;
    let (rewritten, faces) = normalize_face_bytes(&raw)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    debug!(tmp = %tmp.path().display(), "Writing normalized OBJ to temporary file");
    tmp.write_all(&rewritten)?;
    tmp.flush()?;
    tmp.as_file()
        .set_permissions(fs::metadata(path)?.permissions())?;
    tmp.persist(path)?;

    info!(faces, path = %path.display(), "Normalized OBJ face indices");
    Ok(faces)
}

/// Applies the face rewrite to OBJ text in memory. Returns the new text and
/// the number of face lines rewritten.
pub fn normalize_face_text(text: &str) -> IoResult<(String, usize)> {
    let (out, faces) = normalize_face_bytes(text.as_bytes())?;
    let out = String::from_utf8(out).map_err(|e| IoError::malformed(FORMAT, e.to_string()))?;
    Ok((out, faces))
}

/// Byte-level form of [`normalize_face_text`]. Only face lines are decoded,
/// so comments, names and paths in any encoding are copied unchanged.
pub fn normalize_face_bytes(data: &[u8]) -> IoResult<(Vec<u8>, usize)> {
    let mut out = Vec::with_capacity(data.len());
    let mut faces = 0;

    for (i, line) in data.split_inclusive(|&b| b == b'\n').enumerate() {
        let content_len = line
            .iter()
            .rposition(|&b| b != b'\r' && b != b'\n')
            .map_or(0, |p| p + 1);
        let (content, ending) = line.split_at(content_len);

        let mut tokens = content
            .split(|b| b.is_ascii_whitespace())
            .filter(|t| !t.is_empty());
        if tokens.next() != Some(FACE_MARKER) {
            out.extend_from_slice(line);
            continue;
        }

        out.extend_from_slice(FACE_MARKER);
        let mut groups = 0;
        for group in tokens {
            let position = group.split(|&b| b == b'/').next().unwrap_or_default();
            let p = std::str::from_utf8(position)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| {
                    IoError::malformed(
                        FORMAT,
                        format!(
                            "line {}: invalid position index {:?}",
                            i + 1,
                            String::from_utf8_lossy(position)
                        ),
                    )
                })?;
            write!(out, " {}/{}/{}", p, p, p)?;
            groups += 1;
        }
        if groups == 0 {
            return Err(IoError::malformed(
                FORMAT,
                format!("line {}: face has no vertices", i + 1),
            ));
        }

        out.extend_from_slice(ending);
        faces += 1;
    }

    Ok((out, faces))
}
