use std::f32::consts::FRAC_PI_2;

use cgmath::{ortho, Matrix4, Rad};

use crate::fly::DEFAULT_ZOOM;
use crate::perspective::{FAR_PLANE, NEAR_PLANE, VULKAN_CLIP, ZOOM_MAX, ZOOM_MIN};
use crate::{Camera, ProjectionMode};

/// Half-width and half-height of the fixed orthographic view volume, in
/// world units.
const HALF_EXTENT: f32 = 5.0;

/// Isometric orthographic projection.
///
/// The view volume is fixed: a 10x10 box tilted so the scene reads as an
/// isometric diorama. Zoom is tracked so it survives mode switches, but the
/// matrix does not depend on it, and neither does the window size.
#[derive(Clone, Copy, Debug)]
pub struct CameraOrthographic {
    zoom: f32,
    initial_zoom: f32,
}

impl CameraOrthographic {
    pub fn new() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            initial_zoom: DEFAULT_ZOOM,
        }
    }
}

impl Default for CameraOrthographic {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for CameraOrthographic {
    fn projection_matrix(&self) -> Matrix4<f32> {
        // tilt past vertical about X, then spin about Z, for a 2:1 isometric
        // viewing angle
        let tilt = Rad(0.5f32.atan() + FRAC_PI_2);
        let spin = Rad(2.0 * 2.0f32.atan());
        let volume = ortho(
            -HALF_EXTENT,
            HALF_EXTENT,
            -HALF_EXTENT,
            HALF_EXTENT,
            NEAR_PLANE,
            FAR_PLANE,
        );
        VULKAN_CLIP * volume * Matrix4::from_angle_x(tilt) * Matrix4::from_angle_z(spin)
    }

    fn set_zoom(&mut self, degrees: f32) {
        self.zoom = degrees.clamp(ZOOM_MIN, ZOOM_MAX);
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }

    fn reset_zoom(&mut self) {
        self.zoom = self.initial_zoom;
    }

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn mode(&self) -> ProjectionMode {
        ProjectionMode::Orthographic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_does_not_change_the_matrix() {
        let mut projection = CameraOrthographic::new();
        let before = projection.projection_matrix();
        projection.set_zoom(10.0);
        assert_eq!(projection.zoom(), 10.0);
        assert_eq!(projection.projection_matrix(), before);
    }

    #[test]
    fn resize_does_not_change_the_matrix() {
        let mut projection = CameraOrthographic::new();
        let before = projection.projection_matrix();
        projection.resize(1600, 200);
        assert_eq!(projection.projection_matrix(), before);
    }

    #[test]
    fn matrix_is_affine_orthographic() {
        // no perspective divide: the last row is (0, 0, 0, 1)
        let matrix = CameraOrthographic::new().projection_matrix();
        assert_eq!(matrix[0][3], 0.0);
        assert_eq!(matrix[1][3], 0.0);
        assert_eq!(matrix[2][3], 0.0);
        assert_eq!(matrix[3][3], 1.0);
    }
}
