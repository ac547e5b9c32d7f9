use cgmath::{Deg, InnerSpace, Matrix4, Point3, Vector3};

/// Position, orientation and scale of a scene object.
///
/// Orientation is an axis/angle pair because every object in the demo spins
/// about a fixed axis; the axis does not need to be normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation_axis: Vector3<f32>,
    pub rotation_angle: Deg<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let translate = Matrix4::from_translation(self.position);
        let scale =
            Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        if self.rotation_axis.magnitude2() > 0.0 {
            translate * Matrix4::from_axis_angle(self.rotation_axis.normalize(), self.rotation_angle) * scale
        } else {
            translate * scale
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation_axis: Vector3::new(0.0, 1.0, 0.0),
            rotation_angle: Deg(0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Surface parameters fed to the lighting shader. The diffuse and specular
/// colors come from textures, so only the exponent lives here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub shininess: f32,
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Material {
    fn default() -> Self {
        Self { shininess: 32.0 }
    }
}

/// A single point light. The ambient and diffuse terms are derived from the
/// light color instead of being stored, so animating `color` keeps all three
/// terms consistent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub color: Vector3<f32>,
}

impl PointLight {
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position,
            color: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn diffuse(&self) -> Vector3<f32> {
        self.color * 0.5
    }

    pub fn ambient(&self) -> Vector3<f32> {
        self.diffuse() * 0.2
    }

    pub fn specular(&self) -> Vector3<f32> {
        Vector3::new(1.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::SquareMatrix;

    #[test]
    fn default_transform_is_identity() {
        let matrix = Transform::default().matrix();
        assert_eq!(matrix, Matrix4::identity());
    }

    #[test]
    fn translation_lands_in_last_column() {
        let transform = Transform {
            position: Vector3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };
        let matrix = transform.matrix();
        assert_eq!(matrix[3][0], 1.0);
        assert_eq!(matrix[3][1], 2.0);
        assert_eq!(matrix[3][2], 3.0);
    }

    #[test]
    fn unnormalized_rotation_axis_is_accepted() {
        let transform = Transform {
            rotation_axis: Vector3::new(1.0, 0.3, 0.5),
            rotation_angle: Deg(40.0),
            ..Default::default()
        };
        let matrix = transform.matrix();
        // a pure rotation keeps unit length in every column
        for col in 0..3 {
            let len2 = matrix[col][0] * matrix[col][0]
                + matrix[col][1] * matrix[col][1]
                + matrix[col][2] * matrix[col][2];
            assert!((len2 - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn light_terms_follow_color() {
        let mut light = PointLight::new(Point3::new(0.0, 1.0, 0.0));
        assert_eq!(light.diffuse(), Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(light.ambient(), Vector3::new(0.1, 0.1, 0.1));

        light.color = Vector3::new(1.0, 0.0, 0.0);
        assert_eq!(light.diffuse(), Vector3::new(0.5, 0.0, 0.0));
        assert_eq!(light.specular(), Vector3::new(1.0, 1.0, 1.0));
    }
}
