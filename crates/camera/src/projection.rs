use cgmath::Matrix4;

use crate::ortho::CameraOrthographic;
use crate::perspective::CameraPerspective;
use crate::{Camera, ProjectionMode};

/// Runtime-switchable projection pair.
///
/// Both halves track the same zoom so nothing is lost when toggling between
/// them mid-flight; only the matrix of the active mode is ever handed out.
#[derive(Clone, Copy, Debug)]
pub struct CameraProjection {
    perspective: CameraPerspective,
    orthographic: CameraOrthographic,
    mode: ProjectionMode,
}

impl CameraProjection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            perspective: CameraPerspective::new(width, height),
            orthographic: CameraOrthographic::new(),
            mode: ProjectionMode::Perspective,
        }
    }
}

impl Camera for CameraProjection {
    fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => self.perspective.projection_matrix(),
            ProjectionMode::Orthographic => self.orthographic.projection_matrix(),
        }
    }

    fn set_zoom(&mut self, degrees: f32) {
        self.perspective.set_zoom(degrees);
        self.orthographic.set_zoom(degrees);
    }

    fn zoom(&self) -> f32 {
        match self.mode {
            ProjectionMode::Perspective => self.perspective.zoom(),
            ProjectionMode::Orthographic => self.orthographic.zoom(),
        }
    }

    fn reset_zoom(&mut self) {
        self.perspective.reset_zoom();
        self.orthographic.reset_zoom();
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.perspective.resize(width, height);
        self.orthographic.resize(width, height);
    }

    fn set_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
    }

    fn mode(&self) -> ProjectionMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_perspective_mode() {
        let projection = CameraProjection::new(800, 600);
        assert_eq!(projection.mode(), ProjectionMode::Perspective);
        assert_eq!(
            projection.projection_matrix(),
            CameraPerspective::new(800, 600).projection_matrix()
        );
    }

    #[test]
    fn mode_switch_swaps_the_matrix() {
        let mut projection = CameraProjection::new(800, 600);
        projection.set_mode(ProjectionMode::Orthographic);
        assert_eq!(
            projection.projection_matrix(),
            CameraOrthographic::new().projection_matrix()
        );

        projection.set_mode(ProjectionMode::Perspective);
        assert_eq!(
            projection.projection_matrix(),
            CameraPerspective::new(800, 600).projection_matrix()
        );
    }

    #[test]
    fn zoom_survives_a_round_trip_through_ortho() {
        let mut projection = CameraProjection::new(800, 600);
        projection.set_zoom(30.0);
        projection.set_mode(ProjectionMode::Orthographic);
        projection.set_mode(ProjectionMode::Perspective);
        assert_eq!(projection.zoom(), 30.0);
    }
}
