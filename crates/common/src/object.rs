use cgmath::{Deg, Vector3};

use crate::component;

/// A renderable scene entity: a transform plus its material.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GameObject {
    pub transform: component::Transform,
    pub material: component::Material,
}

impl GameObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, axis: Vector3<f32>, angle: Deg<f32>) -> Self {
        self.transform.rotation_axis = axis;
        self.transform.rotation_angle = angle;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.transform.scale = scale;
        self
    }

    pub fn with_material(mut self, material: component::Material) -> Self {
        self.material = material;
        self
    }
}
