use cloudconv_core::{PointCloud, PointXYZRGBA};
use cloudconv_filters::remove_nan;
use std::fs;
use std::io::{BufWriter, Write as _};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{ensure_path, read_file, IoError, IoResult};

const FORMAT: &str = "PLY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

/// Property type as declared in the PLY header.
#[derive(Debug, Clone, Copy)]
enum PropType {
    Float,
    Double,
    Uchar,
}

impl PropType {
    fn byte_size(self) -> usize {
        match self {
            PropType::Float => 4,
            PropType::Double => 8,
            PropType::Uchar => 1,
        }
    }
}

/// Parsed header information.
struct PlyHeader {
    format: PlyFormat,
    vertex_count: usize,
    property_names: Vec<String>,
    property_types: Vec<PropType>,
    header_end_offset: usize, // byte offset just after the end_header line
}

impl PlyHeader {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.property_names.iter().position(|n| n == name)
    }
}

fn parse_ply_header(data: &[u8]) -> IoResult<PlyHeader> {
    let (header_end, header_end_offset) = find_end_header(data)
        .ok_or_else(|| IoError::malformed(FORMAT, "missing end_header"))?;

    let header_text = std::str::from_utf8(&data[..header_end])
        .map_err(|_| IoError::malformed(FORMAT, "header is not valid UTF-8"))?;

    let mut format = None;
    let mut vertex_count: usize = 0;
    let mut property_names: Vec<String> = Vec::new();
    let mut property_types: Vec<PropType> = Vec::new();
    let mut in_vertex_element = false;
    let mut seen_ply_magic = false;

    for line in header_text.lines() {
        let line = line.trim();

        if !seen_ply_magic {
            if line == "ply" {
                seen_ply_magic = true;
                continue;
            }
            return Err(IoError::malformed(FORMAT, "file does not start with 'ply'"));
        }

        if line.starts_with("format") {
            if line.contains("ascii") {
                format = Some(PlyFormat::Ascii);
            } else if line.contains("binary_little_endian") {
                format = Some(PlyFormat::BinaryLittleEndian);
            } else {
                return Err(IoError::unsupported(FORMAT, line));
            }
        } else if line.starts_with("element vertex") {
            in_vertex_element = true;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return Err(IoError::malformed(FORMAT, "invalid element vertex line"));
            }
            vertex_count = parts[2].parse::<usize>().map_err(|e| {
                IoError::malformed(FORMAT, format!("invalid vertex count: {}", e))
            })?;
        } else if line.starts_with("element") {
            in_vertex_element = false;
        } else if line.starts_with("property") && in_vertex_element {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                let ptype = match parts[1] {
                    "float" | "float32" => PropType::Float,
                    "double" | "float64" => PropType::Double,
                    "uchar" | "uint8" => PropType::Uchar,
                    other => {
                        return Err(IoError::unsupported(
                            FORMAT,
                            format!("vertex property type {}", other),
                        ));
                    }
                };
                property_types.push(ptype);
                property_names.push(parts[2].to_string());
            }
        }
    }

    let format = format.ok_or_else(|| IoError::malformed(FORMAT, "format line missing"))?;
    debug!(
        vertex_count,
        properties = property_names.len(),
        format = ?format,
        "Parsed PLY header"
    );

    Ok(PlyHeader {
        format,
        vertex_count,
        property_names,
        property_types,
        header_end_offset,
    })
}

/// Start of the `end_header` line and the offset just past its line ending,
/// which may be `\n` or `\r\n`.
fn find_end_header(data: &[u8]) -> Option<(usize, usize)> {
    let mut start = 0;
    for line in data.split_inclusive(|&b| b == b'\n') {
        let end = start + line.len();
        let content = line.strip_suffix(b"\n")?;
        let content = content.strip_suffix(b"\r").unwrap_or(content);
        if content == b"end_header" {
            return Some((start, end));
        }
        start = end;
    }
    None
}

/// Reads the vertex element of a PLY file.
///
/// `red green blue` are decoded when all three are present, `alpha`
/// independently; missing channels keep the default white / zero alpha.
pub fn read_ply(path: impl AsRef<Path>) -> IoResult<PointCloud> {
    let path = path.as_ref();
    let data = read_file(path)?;
    let header = parse_ply_header(&data)?;

    let (idx_x, idx_y, idx_z) = match (
        header.index_of("x"),
        header.index_of("y"),
        header.index_of("z"),
    ) {
        (Some(ix), Some(iy), Some(iz)) => (ix, iy, iz),
        _ => {
            return Err(IoError::malformed(
                FORMAT,
                "missing required x, y, z properties",
            ));
        }
    };

    let rgb = match (
        header.index_of("red"),
        header.index_of("green"),
        header.index_of("blue"),
    ) {
        (Some(r), Some(g), Some(b)) => Some([r, g, b]),
        _ => None,
    };
    let idx_alpha = header.index_of("alpha");

    let vertex_count = header.vertex_count;
    let mut cloud = PointCloud::with_capacity(vertex_count.min(1 << 20));

    match header.format {
        PlyFormat::Ascii => {
            let body = std::str::from_utf8(&data[header.header_end_offset..])
                .map_err(|_| IoError::malformed(FORMAT, "body is not valid UTF-8"))?;
            for line in body
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .take(vertex_count)
            {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < header.property_names.len() {
                    return Err(IoError::malformed(
                        FORMAT,
                        format!(
                            "vertex line has {} fields, expected {}",
                            parts.len(),
                            header.property_names.len()
                        ),
                    ));
                }

                let parse_f32 = |idx: usize| -> IoResult<f32> {
                    parts[idx].parse::<f32>().map_err(|e| {
                        IoError::malformed(FORMAT, format!("failed to parse float: {}", e))
                    })
                };
                let parse_u8 = |idx: usize| -> IoResult<u8> {
                    parts[idx].parse::<u8>().map_err(|e| {
                        IoError::malformed(FORMAT, format!("failed to parse color byte: {}", e))
                    })
                };

                let mut p =
                    PointXYZRGBA::new(parse_f32(idx_x)?, parse_f32(idx_y)?, parse_f32(idx_z)?);
                if let Some([ir, ig, ib]) = rgb {
                    p.r = parse_u8(ir)?;
                    p.g = parse_u8(ig)?;
                    p.b = parse_u8(ib)?;
                }
                if let Some(ia) = idx_alpha {
                    p.a = parse_u8(ia)?;
                }
                cloud.push(p);
            }

            if cloud.len() != vertex_count {
                return Err(IoError::malformed(
                    FORMAT,
                    format!(
                        "header declares {} vertices but body has {}",
                        vertex_count,
                        cloud.len()
                    ),
                ));
            }
        }
        PlyFormat::BinaryLittleEndian => {
            let body = &data[header.header_end_offset..];
            let offsets: Vec<usize> = header
                .property_types
                .iter()
                .scan(0, |acc, t| {
                    let off = *acc;
                    *acc += t.byte_size();
                    Some(off)
                })
                .collect();
            let stride: usize = header.property_types.iter().map(|t| t.byte_size()).sum();
            let needed = vertex_count.saturating_mul(stride);
            if body.len() < needed {
                return Err(IoError::malformed(
                    FORMAT,
                    format!(
                        "binary body too short: need {} bytes, got {}",
                        needed,
                        body.len()
                    ),
                ));
            }

            for vi in 0..vertex_count {
                let row = &body[vi * stride..(vi + 1) * stride];
                let read_f32_at = |prop_idx: usize| -> f32 {
                    let off = offsets[prop_idx];
                    match header.property_types[prop_idx] {
                        PropType::Double => {
                            let mut b = [0u8; 8];
                            b.copy_from_slice(&row[off..off + 8]);
                            f64::from_le_bytes(b) as f32
                        }
                        PropType::Uchar => row[off] as f32,
                        PropType::Float => {
                            f32::from_le_bytes([row[off], row[off + 1], row[off + 2], row[off + 3]])
                        }
                    }
                };
                let read_u8_at = |prop_idx: usize| -> u8 { row[offsets[prop_idx]] };

                let mut p = PointXYZRGBA::new(
                    read_f32_at(idx_x),
                    read_f32_at(idx_y),
                    read_f32_at(idx_z),
                );
                if let Some([ir, ig, ib]) = rgb {
                    p.r = read_u8_at(ir);
                    p.g = read_u8_at(ig);
                    p.b = read_u8_at(ib);
                }
                if let Some(ia) = idx_alpha {
                    p.a = read_u8_at(ia);
                }
                cloud.push(p);
            }
        }
    }

    if cloud.is_empty() {
        warn!(path = %path.display(), "PLY file contains no points");
    }
    info!(points = cloud.len(), path = %path.display(), "Loaded PLY file");
    Ok(cloud)
}

fn header_string(format: &str, vertex_count: usize) -> String {
    let mut out = String::new();
    out.push_str("ply\n");
    out.push_str(&format!("format {} 1.0\n", format));
    out.push_str(&format!("element vertex {}\n", vertex_count));
    out.push_str("property float x\n");
    out.push_str("property float y\n");
    out.push_str("property float z\n");
    out.push_str("property uchar red\n");
    out.push_str("property uchar green\n");
    out.push_str("property uchar blue\n");
    out.push_str("property uchar alpha\n");
    out.push_str("end_header\n");
    out
}

/// Write a PLY file in ASCII format. Points with non-finite coordinates are
/// removed first.
pub fn write_ply(path: impl AsRef<Path>, cloud: &PointCloud) -> IoResult<()> {
    let path = path.as_ref();
    ensure_path(path)?;
    let (cloud, _) = remove_nan(cloud);

    let mut out = header_string("ascii", cloud.len());
    for p in cloud.iter_points() {
        out.push_str(&format!(
            "{} {} {} {} {} {} {}\n",
            p.x, p.y, p.z, p.r, p.g, p.b, p.a
        ));
    }
    fs::write(path, out)?;

    info!(points = cloud.len(), path = %path.display(), "Saved PLY file");
    Ok(())
}

/// Write a PLY file in binary_little_endian format. Points with non-finite
/// coordinates are removed first.
pub fn write_ply_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> IoResult<()> {
    let path = path.as_ref();
    ensure_path(path)?;
    let (cloud, _) = remove_nan(cloud);

    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);
    w.write_all(header_string("binary_little_endian", cloud.len()).as_bytes())?;

    for p in cloud.iter_points() {
        w.write_all(&p.x.to_le_bytes())?;
        w.write_all(&p.y.to_le_bytes())?;
        w.write_all(&p.z.to_le_bytes())?;
        w.write_all(&p.rgba())?;
    }
    w.flush()?;

    info!(points = cloud.len(), path = %path.display(), "Saved binary PLY file");
    Ok(())
}
