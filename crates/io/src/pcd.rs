use cloudconv_core::{PointCloud, PointXYZRGBA};
use std::fs;
use std::io::{BufWriter, Write as _};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{ensure_path, read_file, IoError, IoResult};

const FORMAT: &str = "PCD";

/// Reads a PCD file (ASCII or binary format).
///
/// `x y z` are required. A packed `rgba` field (or `rgb`, leaving alpha at
/// its default) is decoded when present; every other field is skipped.
pub fn read_pcd(path: impl AsRef<Path>) -> IoResult<PointCloud> {
    let path = path.as_ref();
    let raw = read_file(path)?;

    let header_end = find_data_line_end(&raw)
        .ok_or_else(|| IoError::malformed(FORMAT, "missing DATA line"))?;
    let header_text = std::str::from_utf8(&raw[..header_end])
        .map_err(|_| IoError::malformed(FORMAT, "header is not valid UTF-8"))?;
    let header = parse_header(header_text)?;
    debug!(
        points = header.points,
        fields = header.fields.len(),
        data = ?header.data,
        "Parsed PCD header"
    );

    let layout = Layout::resolve(&header.fields)?;
    let body = &raw[header_end..];
    let cloud = match header.data {
        DataFormat::Ascii => read_pcd_ascii(body, &header, &layout)?,
        DataFormat::Binary => read_pcd_binary(body, &header, &layout)?,
    };

    if cloud.is_empty() {
        warn!(path = %path.display(), "PCD file contains no points");
    }
    info!(points = cloud.len(), path = %path.display(), "Loaded PCD file");
    Ok(cloud)
}

/// Writes a PCD file in ASCII format with a packed `rgba` field.
pub fn write_pcd(path: impl AsRef<Path>, cloud: &PointCloud) -> IoResult<()> {
    let path = path.as_ref();
    ensure_path(path)?;

    let mut out = header_string(cloud.len(), "ascii");
    for p in cloud.iter_points() {
        out.push_str(&format!("{} {} {} {}\n", p.x, p.y, p.z, p.packed_rgba()));
    }
    fs::write(path, out)?;

    info!(points = cloud.len(), path = %path.display(), "Saved PCD file");
    Ok(())
}

/// Writes a PCD file in binary format.
pub fn write_pcd_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> IoResult<()> {
    let path = path.as_ref();
    ensure_path(path)?;

    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);
    w.write_all(header_string(cloud.len(), "binary").as_bytes())?;

    for p in cloud.iter_points() {
        w.write_all(&p.x.to_le_bytes())?;
        w.write_all(&p.y.to_le_bytes())?;
        w.write_all(&p.z.to_le_bytes())?;
        w.write_all(&p.packed_rgba().to_le_bytes())?;
    }
    w.flush()?;

    info!(points = cloud.len(), path = %path.display(), "Saved binary PCD file");
    Ok(())
}

// --- Internal helpers ---

fn header_string(points: usize, data: &str) -> String {
    let mut header = String::new();
    header.push_str("# .PCD v0.7 - Point Cloud Data file format\n");
    header.push_str("VERSION 0.7\n");
    header.push_str("FIELDS x y z rgba\n");
    header.push_str("SIZE 4 4 4 4\n");
    header.push_str("TYPE F F F U\n");
    header.push_str("COUNT 1 1 1 1\n");
    header.push_str(&format!("WIDTH {}\n", points));
    header.push_str("HEIGHT 1\n");
    header.push_str("VIEWPOINT 0 0 0 1 0 0 0\n");
    header.push_str(&format!("POINTS {}\n", points));
    header.push_str(&format!("DATA {}\n", data));
    header
}

#[derive(Debug, PartialEq)]
enum DataFormat {
    Ascii,
    Binary,
}

#[derive(Debug, Clone)]
struct PcdField {
    name: String,
    size: usize,
    kind: char,
    count: usize,
}

struct PcdHeader {
    fields: Vec<PcdField>,
    points: usize,
    data: DataFormat,
}

/// Where the fields we care about live inside one record.
struct Layout {
    /// ASCII column of x, y, z.
    xyz_column: [usize; 3],
    /// Byte offset of x, y, z in a binary record.
    xyz_offset: [usize; 3],
    color: Option<ColorField>,
    /// Total ASCII columns per record.
    columns: usize,
    /// Bytes per binary record.
    stride: usize,
}

struct ColorField {
    column: usize,
    offset: usize,
    /// `F` when the packed color is stored as float bits.
    kind: char,
    has_alpha: bool,
}

impl Layout {
    fn resolve(fields: &[PcdField]) -> IoResult<Self> {
        let mut columns = 0;
        let mut stride = 0;
        let mut xyz_column = [None; 3];
        let mut xyz_offset = [0; 3];
        let mut color = None;

        for field in fields {
            let axis = match field.name.as_str() {
                "x" => Some(0),
                "y" => Some(1),
                "z" => Some(2),
                _ => None,
            };
            if let Some(axis) = axis {
                if field.kind != 'F' || field.size != 4 || field.count == 0 {
                    return Err(IoError::unsupported(
                        FORMAT,
                        format!("field {} must be a 4-byte float", field.name),
                    ));
                }
                xyz_column[axis] = Some(columns);
                xyz_offset[axis] = stride;
            } else if field.name == "rgba" || field.name == "rgb" {
                if field.size != 4 || field.count == 0 {
                    return Err(IoError::unsupported(
                        FORMAT,
                        format!("packed color field must be 4 bytes, got {}", field.size),
                    ));
                }
                color = Some(ColorField {
                    column: columns,
                    offset: stride,
                    kind: field.kind,
                    has_alpha: field.name == "rgba",
                });
            }
            columns = columns
                .checked_add(field.count)
                .ok_or_else(|| IoError::malformed(FORMAT, "field layout overflows"))?;
            stride = field
                .size
                .checked_mul(field.count)
                .and_then(|bytes| stride.checked_add(bytes))
                .ok_or_else(|| IoError::malformed(FORMAT, "field layout overflows"))?;
        }

        match xyz_column {
            [Some(cx), Some(cy), Some(cz)] => Ok(Self {
                xyz_column: [cx, cy, cz],
                xyz_offset,
                color,
                columns,
                stride,
            }),
            _ => Err(IoError::malformed(FORMAT, "file missing x, y, z fields")),
        }
    }
}

impl ColorField {
    fn apply(&self, packed: u32, p: &mut PointXYZRGBA) {
        let alpha = p.a;
        p.set_packed_rgba(packed);
        if !self.has_alpha {
            p.a = alpha;
        }
    }
}

/// Finds the byte offset just past the newline ending the DATA line.
fn find_data_line_end(raw: &[u8]) -> Option<usize> {
    let data_marker = b"DATA";
    for i in 0..=raw.len().saturating_sub(data_marker.len()) {
        if (i == 0 || raw[i - 1] == b'\n') && raw[i..].starts_with(data_marker) {
            if let Some(offset) = raw[i..].iter().position(|&b| b == b'\n') {
                return Some(i + offset + 1);
            }
            return Some(raw.len());
        }
    }
    None
}

fn parse_header(header: &str) -> IoResult<PcdHeader> {
    let mut names: Vec<String> = Vec::new();
    let mut sizes: Vec<usize> = Vec::new();
    let mut kinds: Vec<char> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut points = None;
    let mut width = None;
    let mut data = None;

    for line in header.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let key = parts.next().unwrap_or_default();
        let values: Vec<&str> = parts.collect();
        match key {
            "FIELDS" | "COLUMNS" => names = values.iter().map(|s| s.to_string()).collect(),
            "SIZE" => sizes = parse_numbers(key, &values)?,
            "COUNT" => counts = parse_numbers(key, &values)?,
            "TYPE" => kinds = values.iter().filter_map(|s| s.chars().next()).collect(),
            "POINTS" => points = Some(parse_single(key, &values)?),
            "WIDTH" => width = Some(parse_single(key, &values)?),
            "DATA" => {
                data = Some(match values.first().copied() {
                    Some("ascii") => DataFormat::Ascii,
                    Some("binary") => DataFormat::Binary,
                    other => {
                        return Err(IoError::unsupported(
                            FORMAT,
                            format!("DATA format {}", other.unwrap_or("(none)")),
                        ))
                    }
                });
            }
            _ => {}
        }
    }

    if names.is_empty() {
        // Default to x y z if no FIELDS line found
        names = vec!["x".to_string(), "y".to_string(), "z".to_string()];
    }
    let n = names.len();
    let sizes = if sizes.is_empty() { vec![4; n] } else { sizes };
    let kinds = if kinds.is_empty() { vec!['F'; n] } else { kinds };
    let counts = if counts.is_empty() { vec![1; n] } else { counts };
    if sizes.len() != n || kinds.len() != n || counts.len() != n {
        return Err(IoError::malformed(
            FORMAT,
            format!(
                "FIELDS has {} entries but SIZE/TYPE/COUNT have {}/{}/{}",
                n,
                sizes.len(),
                kinds.len(),
                counts.len()
            ),
        ));
    }

    let fields = names
        .into_iter()
        .zip(sizes)
        .zip(kinds)
        .zip(counts)
        .map(|(((name, size), kind), count)| PcdField {
            name,
            size,
            kind,
            count,
        })
        .collect();

    // Fall back to WIDTH if POINTS is not found
    let points = points
        .or(width)
        .ok_or_else(|| IoError::malformed(FORMAT, "missing POINTS/WIDTH header"))?;
    let data = data.ok_or_else(|| IoError::malformed(FORMAT, "missing DATA line"))?;

    Ok(PcdHeader {
        fields,
        points,
        data,
    })
}

fn parse_numbers(key: &str, values: &[&str]) -> IoResult<Vec<usize>> {
    values
        .iter()
        .map(|v| {
            v.parse::<usize>().map_err(|e| {
                IoError::malformed(FORMAT, format!("invalid {} value {:?}: {}", key, v, e))
            })
        })
        .collect()
}

fn parse_single(key: &str, values: &[&str]) -> IoResult<usize> {
    let first = values
        .first()
        .ok_or_else(|| IoError::malformed(FORMAT, format!("{} has no value", key)))?;
    first
        .parse::<usize>()
        .map_err(|e| IoError::malformed(FORMAT, format!("invalid {} value: {}", key, e)))
}

fn read_pcd_ascii(body: &[u8], header: &PcdHeader, layout: &Layout) -> IoResult<PointCloud> {
    let content = std::str::from_utf8(body)
        .map_err(|e| IoError::malformed(FORMAT, format!("invalid UTF-8: {}", e)))?;

    let mut cloud = PointCloud::with_capacity(header.points.min(1 << 20));

    for (row, line) in content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .enumerate()
    {
        if row >= header.points {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < layout.columns {
            return Err(IoError::malformed(
                FORMAT,
                format!(
                    "point {} has {} values, expected {}",
                    row,
                    parts.len(),
                    layout.columns
                ),
            ));
        }

        let parse_f32 = |col: usize| -> IoResult<f32> {
            parts[col].parse::<f32>().map_err(|e| {
                IoError::malformed(
                    FORMAT,
                    format!("point {}: invalid float {:?}: {}", row, parts[col], e),
                )
            })
        };

        let [cx, cy, cz] = layout.xyz_column;
        let mut p = PointXYZRGBA::new(parse_f32(cx)?, parse_f32(cy)?, parse_f32(cz)?);

        if let Some(color) = &layout.color {
            let packed = if color.kind == 'F' {
                parse_f32(color.column)?.to_bits()
            } else {
                parts[color.column].parse::<u32>().map_err(|e| {
                    IoError::malformed(
                        FORMAT,
                        format!("point {}: invalid packed color: {}", row, e),
                    )
                })?
            };
            color.apply(packed, &mut p);
        }

        cloud.push(p);
    }

    if cloud.len() != header.points {
        return Err(IoError::malformed(
            FORMAT,
            format!(
                "header declares {} points but body has {}",
                header.points,
                cloud.len()
            ),
        ));
    }

    Ok(cloud)
}

fn read_pcd_binary(body: &[u8], header: &PcdHeader, layout: &Layout) -> IoResult<PointCloud> {
    let expected_size = header.points.saturating_mul(layout.stride);
    if body.len() < expected_size {
        return Err(IoError::malformed(
            FORMAT,
            format!(
                "binary data too short: have {} bytes, expected {} ({} points x {} bytes)",
                body.len(),
                expected_size,
                header.points,
                layout.stride
            ),
        ));
    }

    let mut cloud = PointCloud::with_capacity(header.points);
    for record in body.chunks_exact(layout.stride).take(header.points) {
        let read_4 = |offset: usize| -> [u8; 4] {
            [
                record[offset],
                record[offset + 1],
                record[offset + 2],
                record[offset + 3],
            ]
        };

        let [ox, oy, oz] = layout.xyz_offset;
        let mut p = PointXYZRGBA::new(
            f32::from_le_bytes(read_4(ox)),
            f32::from_le_bytes(read_4(oy)),
            f32::from_le_bytes(read_4(oz)),
        );
        if let Some(color) = &layout.color {
            color.apply(u32::from_le_bytes(read_4(color.offset)), &mut p);
        }
        cloud.push(p);
    }

    Ok(cloud)
}
