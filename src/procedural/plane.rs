use super::{utils, IndexBuffer, RenderMesh};
use glamx::{Vec2, Vec3};

/// Generates a subdivided rectangle on the XY plane, facing `+Z`.
///
/// The grid has `(width_segments + 1) * (height_segments + 1)` vertices laid
/// out row by row from the top-left corner. Rotate the node by `-π/2` around
/// `X` to lay it down as a floor facing `+Y`.
///
/// # Arguments
/// * `width` - Size along the X axis
/// * `height` - Size along the Y axis
/// * `width_segments` - Number of subdivisions along X, at least one
/// * `height_segments` - Number of subdivisions along Y, at least one
pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> RenderMesh {
    let grid_x = width_segments.max(1);
    let grid_y = height_segments.max(1);
    let segment_width = width / grid_x as f32;
    let segment_height = height / grid_y as f32;

    let nverts = ((grid_x + 1) * (grid_y + 1)) as usize;
    let mut coords = Vec::with_capacity(nverts);
    let mut uvs = Vec::with_capacity(nverts);

    for iy in 0..=grid_y {
        let y = iy as f32 * segment_height - height / 2.0;
        for ix in 0..=grid_x {
            let x = ix as f32 * segment_width - width / 2.0;
            coords.push(Vec3::new(x, -y, 0.0));
            uvs.push(Vec2::new(
                ix as f32 / grid_x as f32,
                1.0 - iy as f32 / grid_y as f32,
            ));
        }
    }

    let row = grid_x + 1;
    let mut faces = Vec::with_capacity((grid_x * grid_y * 2) as usize);
    for iy in 0..grid_y {
        for ix in 0..grid_x {
            let ul = ix + row * iy;
            let ur = ul + 1;
            let dl = ix + row * (iy + 1);
            let dr = dl + 1;
            utils::push_rectangle_indices(ul, ur, dl, dr, &mut faces);
        }
    }

    RenderMesh::new(
        coords,
        Some(vec![Vec3::Z; nverts]),
        Some(uvs),
        Some(IndexBuffer::Unified(faces)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_grid_sizes() {
        let mesh = plane(3.0, 3.0, 32, 32);
        assert_eq!(mesh.coords.len(), 33 * 33);
        assert_eq!(mesh.num_triangles(), 32 * 32 * 2);
        assert_eq!(mesh.coords[0], Vec3::new(-1.5, 1.5, 0.0));
        assert_eq!(mesh.coords[33 * 33 - 1], Vec3::new(1.5, -1.5, 0.0));
    }

    #[test]
    fn plane_faces_positive_z() {
        let mesh = plane(2.0, 1.0, 2, 3);
        let IndexBuffer::Unified(ref faces) = mesh.indices else {
            panic!("planes use a unified index buffer");
        };

        for f in faces {
            let [a, b, c] = f.map(|i| mesh.coords[i as usize]);
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }

    #[test]
    fn zero_segments_still_make_a_quad() {
        let mesh = plane(1.0, 1.0, 0, 0);
        assert_eq!(mesh.num_triangles(), 2);
    }
}
