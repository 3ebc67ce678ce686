//! Wavefront OBJ parsing.
//!
//! Only geometry is read: `v`, `vt`, `vn` and `f` statements. Groups,
//! smoothing groups and material statements are skipped.

use crate::error::LoadError;
use crate::procedural::{IndexBuffer, RenderMesh};
use glamx::{Vec2, Vec3};

/// Parses an OBJ document into a mesh with a unified index buffer.
///
/// Polygons are triangulated as fans. Normals are recomputed when any face
/// corner lacks one, and uvs are dropped when any face corner lacks one.
pub fn parse_obj(source: &str) -> Result<RenderMesh, LoadError> {
    let mut coords: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut faces: Vec<[[u32; 3]; 3]> = Vec::new();
    let mut missing_normals = false;
    let mut missing_uvs = false;

    for (i, line) in source.lines().enumerate() {
        let line_number = i + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut words = line.split_whitespace();
        let Some(tag) = words.next() else {
            continue;
        };

        match tag {
            "v" => coords.push(parse_vec3(&mut words, line_number)?),
            "vn" => normals.push(parse_vec3(&mut words, line_number)?),
            "vt" => {
                let u = parse_float(words.next(), line_number)?;
                // The v coordinate is optional for one-dimensional textures.
                let v = match words.next() {
                    Some(w) => parse_float(Some(w), line_number)?,
                    None => 0.0,
                };
                uvs.push(Vec2::new(u, 1.0 - v));
            }
            "f" => {
                let mut corners = Vec::with_capacity(4);
                for word in words {
                    let corner = parse_corner(
                        word,
                        line_number,
                        [coords.len(), normals.len(), uvs.len()],
                    )?;
                    missing_uvs |= corner[2].is_none();
                    missing_normals |= corner[1].is_none();
                    corners.push([
                        corner[0].unwrap_or(0),
                        corner[1].unwrap_or(0),
                        corner[2].unwrap_or(0),
                    ]);
                }

                if corners.len() < 3 {
                    return Err(LoadError::Obj {
                        line: line_number,
                        message: format!("a face needs 3 vertices, found {}", corners.len()),
                    });
                }

                for k in 1..corners.len() - 1 {
                    faces.push([corners[0], corners[k], corners[k + 1]]);
                }
            }
            _ => {}
        }
    }

    if faces.is_empty() {
        return Err(LoadError::Obj {
            line: source.lines().count(),
            message: "the document has no faces".to_string(),
        });
    }

    let has_uvs = !missing_uvs && !uvs.is_empty();
    let has_normals = !missing_normals && !normals.is_empty();

    let mut mesh = RenderMesh::new(
        coords,
        has_normals.then_some(normals),
        has_uvs.then_some(uvs),
        Some(IndexBuffer::Split(faces)),
    );

    if !has_normals {
        mesh.recompute_normals();
    }
    mesh.unify_index_buffer();

    Ok(mesh)
}

fn parse_float(word: Option<&str>, line: usize) -> Result<f32, LoadError> {
    let word = word.ok_or_else(|| LoadError::Obj {
        line,
        message: "missing coordinate".to_string(),
    })?;
    word.parse().map_err(|_| LoadError::Obj {
        line,
        message: format!("`{}` is not a number", word),
    })
}

fn parse_vec3<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<Vec3, LoadError> {
    Ok(Vec3::new(
        parse_float(words.next(), line)?,
        parse_float(words.next(), line)?,
        parse_float(words.next(), line)?,
    ))
}

/// Parses `v`, `v/vt`, `v//vn` or `v/vt/vn` into zero-based
/// `[position, normal, uv]` indices.
fn parse_corner(
    word: &str,
    line: usize,
    counts: [usize; 3],
) -> Result<[Option<u32>; 3], LoadError> {
    let mut parts = word.split('/');
    let position = parts.next().filter(|s| !s.is_empty());
    let uv = parts.next().filter(|s| !s.is_empty());
    let normal = parts.next().filter(|s| !s.is_empty());

    let position = position.ok_or_else(|| LoadError::Obj {
        line,
        message: format!("`{}` has no vertex index", word),
    })?;

    Ok([
        Some(resolve_index(position, counts[0], line)?),
        normal.map(|n| resolve_index(n, counts[1], line)).transpose()?,
        uv.map(|t| resolve_index(t, counts[2], line)).transpose()?,
    ])
}

/// Turns a one-based (or negative, relative) OBJ index into a zero-based one.
fn resolve_index(word: &str, count: usize, line: usize) -> Result<u32, LoadError> {
    let raw: i64 = word.parse().map_err(|_| LoadError::Obj {
        line,
        message: format!("`{}` is not an index", word),
    })?;

    let resolved = match raw {
        0 => None,
        r if r > 0 => Some(r - 1),
        r => Some(count as i64 + r),
    };

    match resolved {
        Some(i) if i >= 0 && (i as usize) < count => Ok(i as u32),
        _ => Err(LoadError::Obj {
            line,
            message: format!("index {} is out of bounds ({} elements)", raw, count),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# a unit quad
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
s off
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quads_are_fan_triangulated() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(mesh.coords.len(), 4);
        assert_eq!(
            mesh.indices,
            IndexBuffer::Unified(vec![[0, 1, 2], [0, 2, 3]])
        );
        assert_eq!(mesh.normals.unwrap(), vec![Vec3::Z; 4]);
        // OBJ uvs have their origin at the bottom.
        assert_eq!(mesh.uvs.unwrap()[0], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn missing_normals_are_computed() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert!(mesh.uvs.is_none());
        for n in mesh.normals.unwrap() {
            assert!((n - Vec3::Z).length() < 1.0e-6);
        }
    }

    #[test]
    fn negative_indices_count_from_the_end() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n").unwrap();
        assert_eq!(mesh.indices, IndexBuffer::Unified(vec![[0, 1, 2]]));
    }

    #[test]
    fn normal_only_corners_are_supported() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nf 1//1 2//1 3//1\n").unwrap();
        assert_eq!(mesh.normals.unwrap(), vec![Vec3::NEG_Z; 3]);
    }

    #[test]
    fn out_of_bounds_indices_are_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, LoadError::Obj { line: 3, .. }));
    }

    #[test]
    fn zero_index_is_rejected() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, LoadError::Obj { line: 4, .. }));
    }

    #[test]
    fn garbage_coordinates_are_reported_with_their_line() {
        let err = parse_obj("v 0 0 0\nv 1 zero 0\n").unwrap_err();
        match err {
            LoadError::Obj { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("zero"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn documents_without_faces_are_rejected() {
        assert!(parse_obj("v 0 0 0\n").is_err());
    }
}
