use cgmath::{perspective, Deg, Matrix4};

use crate::fly::DEFAULT_ZOOM;
use crate::Camera;

pub(crate) const ZOOM_MIN: f32 = 1.0;
pub(crate) const ZOOM_MAX: f32 = 90.0;

pub(crate) const NEAR_PLANE: f32 = 0.1;
pub(crate) const FAR_PLANE: f32 = 100.0;

// cgmath produces OpenGL-style clip space; Vulkan flips Y and maps depth to
// [0, 1] instead of [-1, 1].
#[rustfmt::skip]
pub(crate) const VULKAN_CLIP: Matrix4<f32> = Matrix4::new(
    1.0,  0.0, 0.0, 0.0,
    0.0, -1.0, 0.0, 0.0,
    0.0,  0.0, 0.5, 0.0,
    0.0,  0.0, 0.5, 1.0,
);

/// Perspective projection driven by the camera zoom angle (vertical field
/// of view, degrees).
#[derive(Clone, Copy, Debug)]
pub struct CameraPerspective {
    zoom: f32,
    initial_zoom: f32,
    aspect: f32,
}

impl CameraPerspective {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            initial_zoom: DEFAULT_ZOOM,
            aspect: aspect_ratio(width, height),
        }
    }
}

impl Camera for CameraPerspective {
    fn projection_matrix(&self) -> Matrix4<f32> {
        VULKAN_CLIP * perspective(Deg(self.zoom), self.aspect, NEAR_PLANE, FAR_PLANE)
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

    fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        // minimized window; keep the previous frame renderable
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_zoom_clamps_to_fov_range() {
        let mut projection = CameraPerspective::new(800, 600);
        projection.set_zoom(0.25);
        assert_eq!(projection.zoom(), 1.0);
        projection.set_zoom(120.0);
        assert_eq!(projection.zoom(), 90.0);
        projection.set_zoom(45.0);
        assert_eq!(projection.zoom(), 45.0);
    }

    #[test]
    fn reset_restores_initial_zoom() {
        let mut projection = CameraPerspective::new(800, 600);
        projection.set_zoom(10.0);
        projection.reset_zoom();
        assert_eq!(projection.zoom(), DEFAULT_ZOOM);
    }

    #[test]
    fn narrower_fov_magnifies() {
        let mut projection = CameraPerspective::new(800, 600);
        let wide = projection.projection_matrix();
        projection.set_zoom(10.0);
        let narrow = projection.projection_matrix();
        // focal length scales inversely with fov
        assert!(narrow[0][0] > wide[0][0]);
        assert!(narrow[1][1].abs() > wide[1][1].abs());
    }

    #[test]
    fn resize_updates_aspect() {
        let mut projection = CameraPerspective::new(800, 600);
        let before = projection.projection_matrix();
        projection.resize(1600, 600);
        let after = projection.projection_matrix();
        assert!(after[0][0] < before[0][0]);
        // vertical scale is unaffected by aspect
        assert_eq!(after[1][1], before[1][1]);
    }

    #[test]
    fn zero_height_resize_does_not_blow_up() {
        let mut projection = CameraPerspective::new(800, 600);
        projection.resize(800, 0);
        let matrix = projection.projection_matrix();
        assert!(matrix[0][0].is_finite());
    }
}
