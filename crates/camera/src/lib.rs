mod controller;
mod fly;
mod ortho;
mod perspective;
mod projection;

use cgmath::Matrix4;

pub use self::controller::CameraController;
pub use self::fly::{FlyCamera, MoveDirection};
pub use self::ortho::CameraOrthographic;
pub use self::perspective::CameraPerspective;
pub use self::projection::CameraProjection;

/// Identifies which projection a [`Camera`] is currently producing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectionMode {
    Perspective,
    Orthographic,
}

/// Projection half of the camera system. The view transform is owned by
/// [`FlyCamera`]; implementations of this trait only build the projection
/// matrix from the current zoom angle and surface size.
pub trait Camera {
    fn projection_matrix(&self) -> Matrix4<f32>;
    fn set_zoom(&mut self, degrees: f32);
    fn zoom(&self) -> f32;
    fn reset_zoom(&mut self);
    fn resize(&mut self, width: u32, height: u32);

    /// Switches the active projection. Single-projection implementations
    /// ignore the request.
    fn set_mode(&mut self, _mode: ProjectionMode) {}

    fn mode(&self) -> ProjectionMode {
        ProjectionMode::Perspective
    }
}
