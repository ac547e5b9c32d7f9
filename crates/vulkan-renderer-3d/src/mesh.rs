use std::mem;

use ash::vk;
use cgmath::{Vector2, Vector3};

use vulkan_renderer::offset_of;

#[derive(Clone, Debug)]
pub(crate) struct VertexInputDescription {
    pub(crate) bindings: Vec<vk::VertexInputBindingDescription>,
    pub(crate) attributes: Vec<vk::VertexInputAttributeDescription>,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Vector2<f32>,
}

impl Vertex {
    const fn new(position: Vector3<f32>, normal: Vector3<f32>, uv: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }

    pub(crate) fn input_description() -> VertexInputDescription {
        let bindings = vec![vk::VertexInputBindingDescription {
            binding: 0,
            stride: mem::size_of::<Self>() as u32,
            input_rate: vk::VertexInputRate::VERTEX,
        }];
        let attributes = vec![
            vk::VertexInputAttributeDescription {
                location: 0,
                binding: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Self, position) as u32,
            },
            vk::VertexInputAttributeDescription {
                location: 1,
                binding: 0,
                format: vk::Format::R32G32B32_SFLOAT,
                offset: offset_of!(Self, normal) as u32,
            },
            vk::VertexInputAttributeDescription {
                location: 2,
                binding: 0,
                format: vk::Format::R32G32_SFLOAT,
                offset: offset_of!(Self, uv) as u32,
            },
        ];

        VertexInputDescription {
            bindings,
            attributes,
        }
    }
}

const fn v(px: f32, py: f32, pz: f32, nx: f32, ny: f32, nz: f32, u: f32, w: f32) -> Vertex {
    Vertex::new(
        Vector3::new(px, py, pz),
        Vector3::new(nx, ny, nz),
        Vector2::new(u, w),
    )
}

/// Unit cube centered at the origin, one normal and uv pair per face corner.
/// Not indexed; 6 faces * 2 triangles * 3 vertices.
#[rustfmt::skip]
pub const CUBE_VERTICES: [Vertex; 36] = [
    // back face
    v(-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0),
    v( 0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 0.0),
    v( 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0),
    v( 0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0),
    v(-0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 1.0),
    v(-0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0),
    // front face
    v(-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0),
    v( 0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 0.0),
    v( 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0),
    v( 0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0),
    v(-0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 1.0),
    v(-0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0),
    // left face
    v(-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 0.0),
    v(-0.5,  0.5, -0.5, -1.0,  0.0,  0.0,  1.0, 1.0),
    v(-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 1.0),
    v(-0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 1.0),
    v(-0.5, -0.5,  0.5, -1.0,  0.0,  0.0,  0.0, 0.0),
    v(-0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 0.0),
    // right face
    v( 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0),
    v( 0.5,  0.5, -0.5,  1.0,  0.0,  0.0,  1.0, 1.0),
    v( 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0),
    v( 0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0),
    v( 0.5, -0.5,  0.5,  1.0,  0.0,  0.0,  0.0, 0.0),
    v( 0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0),
    // bottom face
    v(-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0),
    v( 0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  1.0, 1.0),
    v( 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0),
    v( 0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0),
    v(-0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  0.0, 0.0),
    v(-0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0),
    // top face
    v(-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 1.0),
    v( 0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  1.0, 1.0),
    v( 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 0.0),
    v( 0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  1.0, 0.0),
    v(-0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  0.0, 0.0),
    v(-0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  0.0, 1.0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn cube_normals_are_unit_and_axis_aligned() {
        for vertex in CUBE_VERTICES {
            assert_eq!(vertex.normal.magnitude(), 1.0);
            let nonzero = [vertex.normal.x, vertex.normal.y, vertex.normal.z]
                .iter()
                .filter(|c| **c != 0.0)
                .count();
            assert_eq!(nonzero, 1);
        }
    }

    #[test]
    fn cube_uvs_are_in_unit_square() {
        for vertex in CUBE_VERTICES {
            assert!((0.0..=1.0).contains(&vertex.uv.x));
            assert!((0.0..=1.0).contains(&vertex.uv.y));
        }
    }

    #[test]
    fn vertex_stride_matches_attribute_layout() {
        let description = Vertex::input_description();
        assert_eq!(description.bindings[0].stride, 32);
        assert_eq!(description.attributes[1].offset, 12);
        assert_eq!(description.attributes[2].offset, 24);
    }
}
