use cloudconv_core::{Face, PointCloud};
use thiserror::Error;

/// A face refers to a point index that does not exist in the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("face {face} references point {index}, but the cloud has {len} points")]
pub struct FaceIndexOutOfRange {
    pub face: usize,
    pub index: u32,
    pub len: usize,
}

/// Faces rewritten into the index space of a filtered cloud.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RemappedFaces {
    pub faces: Vec<Face>,
    /// Faces that touched a removed point and were left out.
    pub dropped: usize,
}

/// Removes every point with a NaN or infinite coordinate.
///
/// Returns the filtered cloud together with the original index of each
/// retained point, in order.
pub fn remove_nan(cloud: &PointCloud) -> (PointCloud, Vec<usize>) {
    let kept: Vec<usize> = (0..cloud.len())
        .filter(|&i| cloud.x[i].is_finite() && cloud.y[i].is_finite() && cloud.z[i].is_finite())
        .collect();

    if kept.len() == cloud.len() {
        return (cloud.clone(), kept);
    }

    (cloud.select(&kept), kept)
}

/// Rewrites face indices from the original cloud's index space into the
/// space produced by [`remove_nan`].
///
/// `kept` is the index map returned by `remove_nan` and `original_len` the
/// length of the cloud before filtering. When nothing was removed the faces
/// come back unchanged. Indices at or past `original_len` are not covered by
/// the map and pass through as written.
pub fn remap_faces(faces: &[Face], kept: &[usize], original_len: usize) -> RemappedFaces {
    if kept.len() == original_len {
        return RemappedFaces {
            faces: faces.to_vec(),
            dropped: 0,
        };
    }

    let mut new_index: Vec<Option<u32>> = vec![None; original_len];
    for (new, &old) in kept.iter().enumerate() {
        new_index[old] = Some(new as u32);
    }

    let mut out = RemappedFaces {
        faces: Vec::with_capacity(faces.len()),
        dropped: 0,
    };

    'faces: for face in faces {
        let mut vertices = Vec::with_capacity(face.len());
        for &v in &face.vertices {
            match new_index.get(v as usize) {
                Some(Some(nv)) => vertices.push(*nv),
                Some(None) => {
                    out.dropped += 1;
                    continue 'faces;
                }
                None => vertices.push(v),
            }
        }
        out.faces.push(Face::new(vertices));
    }

    out
}

/// Fails on the first face index that is not below `len`.
pub fn check_face_indices(faces: &[Face], len: usize) -> Result<(), FaceIndexOutOfRange> {
    for (face, f) in faces.iter().enumerate() {
        if let Some(&index) = f.vertices.iter().find(|&&v| v as usize >= len) {
            return Err(FaceIndexOutOfRange { face, index, len });
        }
    }
    Ok(())
}
