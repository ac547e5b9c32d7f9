#![allow(clippy::missing_safety_doc)]

mod mesh;

use std::{error, mem, result};

use ash::vk;
use cgmath::{EuclideanSpace, Matrix4, Point3, Vector4};
use log::debug;

use common::component::PointLight;
use common::object::GameObject;
use common::TIME;
use vulkan_renderer::buffer::Buffer;
use vulkan_renderer::descriptor::{DescriptorPool, DescriptorSet, DescriptorSetLayout};
use vulkan_renderer::device::Device;
use vulkan_renderer::pipeline::Pipeline;
use vulkan_renderer::renderpass::RenderPass;
use vulkan_renderer::shader::Shader;
use vulkan_renderer::texture::Texture;

pub use self::mesh::{Vertex, CUBE_VERTICES};

type Result<T> = result::Result<T, Box<dyn error::Error>>;

/// Scale applied to the cube drawn at the light position.
const LAMP_SCALE: f32 = 0.2;

/// Per-frame uniform data shared by every object in the scene. Vectors are
/// padded to vec4 to match std140 layout.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
struct SceneUniform {
    view: Matrix4<f32>,
    proj: Matrix4<f32>,
    view_pos: Vector4<f32>,
    light_pos: Vector4<f32>,
    light_ambient: Vector4<f32>,
    light_diffuse: Vector4<f32>,
    light_specular: Vector4<f32>,
}

impl SceneUniform {
    fn new(
        view: Matrix4<f32>,
        proj: Matrix4<f32>,
        view_pos: Point3<f32>,
        light: &PointLight,
    ) -> Self {
        Self {
            view,
            proj,
            view_pos: view_pos.to_vec().extend(1.0),
            light_pos: light.position.to_vec().extend(1.0),
            light_ambient: light.ambient().extend(1.0),
            light_diffuse: light.diffuse().extend(1.0),
            light_specular: light.specular().extend(1.0),
        }
    }
}

/// Per-object data pushed into the command buffer instead of a UBO; small
/// enough to fit in the 128-byte push constant budget every device guarantees.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
struct ObjectPush {
    model: Matrix4<f32>,
    shininess: f32,
    _pad: [f32; 3],
}

impl ObjectPush {
    fn new(model: Matrix4<f32>, shininess: f32) -> Self {
        Self {
            model,
            shininess,
            _pad: [0.0; 3],
        }
    }

    unsafe fn as_bytes(&self) -> &[u8] {
        std::slice::from_raw_parts(self as *const Self as *const u8, mem::size_of::<Self>())
    }
}

/// Draws lit, textured cubes plus an unlit lamp cube marking the light
/// position. One pipeline pair, one shared descriptor set.
pub struct SceneRenderer3D {
    scene_vertex_shader: Shader,
    scene_fragment_shader: Shader,
    lamp_vertex_shader: Shader,
    lamp_fragment_shader: Shader,

    descriptor_pool: DescriptorPool,
    descriptor_set_layouts: Vec<DescriptorSetLayout>,
    descriptor_sets: Vec<DescriptorSet>,

    uniform_buffer: Buffer,

    diffuse_map: Texture,
    specular_map: Texture,

    scene_pipeline: Pipeline,
    lamp_pipeline: Pipeline,

    vertex_buffer: Buffer,
    vertex_count: u32,
}

impl SceneRenderer3D {
    pub unsafe fn new(
        device: &Device,
        renderpass: &RenderPass,
        diffuse_map: Texture,
        specular_map: Texture,
    ) -> Result<Self> {
        // create shaders
        let scene_vertex_shader =
            Shader::from_spv(device, include_bytes!("../assets/shaders/scene.vert.spv"))
                .map_err(|e| format!("create scene vertex shader module: {:?}", e))?;
        let scene_fragment_shader =
            Shader::from_spv(device, include_bytes!("../assets/shaders/scene.frag.spv"))
                .map_err(|e| format!("create scene fragment shader module: {:?}", e))?;
        let lamp_vertex_shader =
            Shader::from_spv(device, include_bytes!("../assets/shaders/lamp.vert.spv"))
                .map_err(|e| format!("create lamp vertex shader module: {:?}", e))?;
        let lamp_fragment_shader =
            Shader::from_spv(device, include_bytes!("../assets/shaders/lamp.frag.spv"))
                .map_err(|e| format!("create lamp fragment shader module: {:?}", e))?;

        // create descriptor pool
        let descriptor_pool_sizes = [
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER,
                descriptor_count: 1,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                descriptor_count: 2,
            },
        ];
        let descriptor_pool = DescriptorPool::new(device, &descriptor_pool_sizes, 1)
            .map_err(|e| format!("create descriptor pool: {:?}", e))?;

        // create descriptor sets and layouts
        // binding 0: scene UBO, binding 1: diffuse map, binding 2: specular map
        let (descriptor_sets, descriptor_set_layouts) = {
            let ds_layouts = {
                let ds_layout_bindings = [
                    vk::DescriptorSetLayoutBinding {
                        binding: 0,
                        descriptor_type: vk::DescriptorType::UNIFORM_BUFFER,
                        descriptor_count: 1,
                        stage_flags: vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                        ..Default::default()
                    },
                    vk::DescriptorSetLayoutBinding {
                        binding: 1,
                        descriptor_type: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                        descriptor_count: 1,
                        stage_flags: vk::ShaderStageFlags::FRAGMENT,
                        ..Default::default()
                    },
                    vk::DescriptorSetLayoutBinding {
                        binding: 2,
                        descriptor_type: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                        descriptor_count: 1,
                        stage_flags: vk::ShaderStageFlags::FRAGMENT,
                        ..Default::default()
                    },
                ];
                let ds_layout = DescriptorSetLayout::new(device, &ds_layout_bindings)
                    .map_err(|e| format!("create descriptor set layout: {:?}", e))?;
                vec![ds_layout]
            };
            let ds = DescriptorSet::new(device, &descriptor_pool, &ds_layouts)
                .map_err(|e| format!("create descriptor set: {:?}", e))?;

            (ds, ds_layouts)
        };

        // create uniform buffer
        let uniform_buffer = {
            let buf_size = mem::size_of::<SceneUniform>() as u64;
            Buffer::new(
                device,
                device.memory_properties(),
                vk::BufferUsageFlags::UNIFORM_BUFFER,
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
                buf_size,
            )
            .map_err(|e| format!("create uniform buffer: {:?}", e))?
        };

        // point descriptors at the uniform buffer and the material textures
        descriptor_sets[0]
            .update_ubo(
                device,
                0,
                &uniform_buffer,
                0,
                mem::size_of::<SceneUniform>() as u64,
            )
            .map_err(|e| format!("update UBO descriptor: {:?}", e))?;
        descriptor_sets[0]
            .update_texture(device, 1, &diffuse_map)
            .map_err(|e| format!("update diffuse map descriptor: {:?}", e))?;
        descriptor_sets[0]
            .update_texture(device, 2, &specular_map)
            .map_err(|e| format!("update specular map descriptor: {:?}", e))?;

        // both pipelines share the same layout shape
        let push_constant_ranges = [vk::PushConstantRange {
            stage_flags: vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
            offset: 0,
            size: mem::size_of::<ObjectPush>() as u32,
        }];

        let vertex_input_description = Vertex::input_description();
        let scene_pipeline = Pipeline::new(
            device,
            renderpass,
            &scene_vertex_shader,
            &scene_fragment_shader,
            &vertex_input_description.bindings,
            &vertex_input_description.attributes,
            &descriptor_set_layouts,
            &push_constant_ranges,
        )
        .map_err(|e| format!("create scene pipeline: {:?}", e))?;
        let lamp_pipeline = Pipeline::new(
            device,
            renderpass,
            &lamp_vertex_shader,
            &lamp_fragment_shader,
            &vertex_input_description.bindings,
            &vertex_input_description.attributes,
            &descriptor_set_layouts,
            &push_constant_ranges,
        )
        .map_err(|e| format!("create lamp pipeline: {:?}", e))?;

        // upload the cube mesh once; every draw reuses it
        let vertex_buffer = {
            let buf_size = mem::size_of_val(&CUBE_VERTICES) as u64;
            let mut buf = Buffer::new(
                device,
                device.memory_properties(),
                vk::BufferUsageFlags::VERTEX_BUFFER,
                vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
                buf_size,
            )
            .map_err(|e| format!("create vertex buffer: {:?}", e))?;
            buf.update(device, &CUBE_VERTICES)
                .map_err(|e| format!("update vertex buffer: {:?}", e))?;
            buf
        };

        Ok(Self {
            scene_vertex_shader,
            scene_fragment_shader,
            lamp_vertex_shader,
            lamp_fragment_shader,
            descriptor_pool,
            descriptor_set_layouts,
            descriptor_sets,
            uniform_buffer,
            diffuse_map,
            specular_map,
            scene_pipeline,
            lamp_pipeline,
            vertex_buffer,
            vertex_count: CUBE_VERTICES.len() as u32,
        })
    }

    unsafe fn update_uniform_buffer(
        &mut self,
        device: &Device,
        uniform: SceneUniform,
    ) -> Result<()> {
        TIME!("SceneRenderer3D.update_uniform_buffer");
        self.uniform_buffer
            .update(device, &[uniform])
            .map_err(|e| format!("update uniform buffer: {:?}", e))?;
        Ok(())
    }

    /// Records draw commands for the whole scene into `command_buffer`: one
    /// lit cube per object, then the lamp cube at the light position.
    #[allow(clippy::too_many_arguments)]
    pub unsafe fn render(
        &mut self,
        device: &Device,
        command_buffer: vk::CommandBuffer,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        view_pos: Point3<f32>,
        light: &PointLight,
        objects: &[GameObject],
    ) -> Result<()> {
        TIME!("SceneRenderer3D.render");

        // update uniform buffer
        let uniform = SceneUniform::new(view, projection, view_pos, light);
        self.update_uniform_buffer(device, uniform)
            .map_err(|e| format!("update uniform buffer: {:?}", e))?;

        // bind shared state once
        device.cmd_bind_descriptor_sets(
            command_buffer,
            vk::PipelineBindPoint::GRAPHICS,
            self.scene_pipeline.layout,
            0,
            &[*self.descriptor_sets[0]],
            &[],
        );
        device.cmd_bind_vertex_buffers(command_buffer, 0, &[*self.vertex_buffer], &[0]);

        // lit objects
        device.cmd_bind_pipeline(
            command_buffer,
            vk::PipelineBindPoint::GRAPHICS,
            *self.scene_pipeline,
        );
        for object in objects {
            let push = ObjectPush::new(object.transform.matrix(), object.material.shininess);
            device.cmd_push_constants(
                command_buffer,
                self.scene_pipeline.layout,
                vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                0,
                push.as_bytes(),
            );
            device.cmd_draw(command_buffer, self.vertex_count, 1, 0, 0);
        }

        // lamp cube at the light position
        device.cmd_bind_pipeline(
            command_buffer,
            vk::PipelineBindPoint::GRAPHICS,
            *self.lamp_pipeline,
        );
        let lamp_model = Matrix4::from_translation(light.position.to_vec())
            * Matrix4::from_scale(LAMP_SCALE);
        let push = ObjectPush::new(lamp_model, 0.0);
        device.cmd_push_constants(
            command_buffer,
            self.lamp_pipeline.layout,
            vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
            0,
            push.as_bytes(),
        );
        device.cmd_draw(command_buffer, self.vertex_count, 1, 0, 0);

        Ok(())
    }

    pub unsafe fn destroy(&mut self, device: &Device) {
        debug!("Destroying SceneRenderer3D");

        // NOTE: All submitted commands that refer to these resources must have
        // completed execution.
        device.device_wait_idle().expect("device wait idle");

        self.vertex_buffer.destroy(device);
        self.scene_pipeline.destroy(device);
        self.lamp_pipeline.destroy(device);
        self.uniform_buffer.destroy(device);
        self.diffuse_map.destroy(device);
        self.specular_map.destroy(device);
        for mut layout in self.descriptor_set_layouts.drain(..) {
            layout.destroy(device);
        }
        self.descriptor_pool.destroy(device);
        self.scene_vertex_shader.destroy(device);
        self.scene_fragment_shader.destroy(device);
        self.lamp_vertex_shader.destroy(device);
        self.lamp_fragment_shader.destroy(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector3};

    #[test]
    fn scene_uniform_matches_std140_size() {
        // 2 mat4 + 5 vec4
        assert_eq!(mem::size_of::<SceneUniform>(), 208);
    }

    #[test]
    fn object_push_fits_guaranteed_push_constant_budget() {
        assert_eq!(mem::size_of::<ObjectPush>(), 80);
        assert!(mem::size_of::<ObjectPush>() <= 128);
    }

    #[test]
    fn scene_uniform_derives_light_terms() {
        let light = PointLight {
            position: Point3::new(1.0, 2.0, 3.0),
            color: Vector3::new(1.0, 1.0, 1.0),
        };
        let uniform = SceneUniform::new(
            Matrix4::identity(),
            Matrix4::identity(),
            Point3::new(0.0, 0.0, 10.0),
            &light,
        );
        assert_eq!(uniform.light_pos, Vector4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(uniform.light_diffuse, Vector4::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(uniform.light_ambient, Vector4::new(0.1, 0.1, 0.1, 1.0));
        assert_eq!(uniform.view_pos.z, 10.0);
    }
}
