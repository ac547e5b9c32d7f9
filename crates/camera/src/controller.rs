use std::time;

use cgmath::{Matrix4, Point3};
use winit::event::{Event, VirtualKeyCode, WindowEvent};

use super::{Camera, FlyCamera, MoveDirection, ProjectionMode};
use input::InputSystem;

/// Per-frame bridge between the input system and the camera pair.
///
/// The controller is the single writer of camera state: the event loop
/// calls [`CameraController::on_update`] exactly once per frame after all
/// input events for that frame have been accumulated, then the renderer
/// reads the resulting matrices.
#[derive(Debug, Clone)]
pub struct CameraController<T: Camera> {
    camera: FlyCamera,
    projection: T,
}

impl<T> CameraController<T>
where
    T: Camera,
{
    pub fn new(camera: FlyCamera, mut projection: T) -> Self {
        projection.set_zoom(camera.zoom());
        Self { camera, projection }
    }

    /// Drains the frame's input into camera mutations. WASD moves, mouse
    /// motion looks, scroll zooms.
    pub fn on_update(&mut self, input: &InputSystem, delta: time::Duration) {
        let delta_seconds = delta.as_secs_f32();

        if input.is_key_pressed(VirtualKeyCode::W) {
            self.camera
                .process_keyboard(MoveDirection::Forward, delta_seconds);
        }
        if input.is_key_pressed(VirtualKeyCode::S) {
            self.camera
                .process_keyboard(MoveDirection::Backward, delta_seconds);
        }
        if input.is_key_pressed(VirtualKeyCode::A) {
            self.camera
                .process_keyboard(MoveDirection::Left, delta_seconds);
        }
        if input.is_key_pressed(VirtualKeyCode::D) {
            self.camera
                .process_keyboard(MoveDirection::Right, delta_seconds);
        }

        // winit reports positive y for downward motion; the camera expects
        // positive to pitch up
        let (dx, dy) = input.mouse_delta();
        if dx != 0.0 || dy != 0.0 {
            self.camera.process_mouse_move(dx, -dy, true);
        }

        let scroll = input.mouse_scroll_y();
        if scroll != 0.0 {
            self.camera.process_scroll(scroll);
        }

        // projection toggle; when both keys are held, perspective wins
        if input.is_key_pressed(VirtualKeyCode::O) {
            self.projection.set_mode(ProjectionMode::Orthographic);
        }
        if input.is_key_pressed(VirtualKeyCode::P) {
            self.projection.set_mode(ProjectionMode::Perspective);
        }

        // the projection follows the camera zoom
        self.projection.set_zoom(self.camera.zoom());
    }

    pub fn on_event(&mut self, event: &Event<()>) {
        #[allow(clippy::single_match)]
        #[allow(clippy::collapsible_match)]
        match event {
            Event::WindowEvent { ref event, .. } => match *event {
                WindowEvent::Resized(size) => self.projection.resize(size.width, size.height),
                _ => {}
            },
            _ => {}
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera.view_matrix()
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection.projection_matrix()
    }

    pub fn view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection.projection_matrix() * self.camera.view_matrix()
    }

    pub fn position(&self) -> Point3<f32> {
        self.camera.position()
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FlyCamera {
        &mut self.camera
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cgmath::EuclideanSpace;
    use winit::event::ElementState;

    use super::*;
    use crate::{CameraOrthographic, CameraPerspective, CameraProjection};

    fn controller() -> CameraController<CameraPerspective> {
        CameraController::new(
            FlyCamera::new(Point3::origin()),
            CameraPerspective::new(800, 600),
        )
    }

    #[test]
    fn forward_key_moves_along_heading() {
        let mut controller = controller();
        let mut input = InputSystem::new();
        input.key_event(VirtualKeyCode::W, ElementState::Pressed);

        controller.on_update(&input, Duration::from_secs(1));
        // default heading is -Z
        assert!(controller.position().z < 0.0);
        assert!(controller.position().x.abs() < 1e-5);
    }

    #[test]
    fn mouse_delta_drives_look_with_inverted_y() {
        let mut controller = controller();
        let mut input = InputSystem::new();
        // moving the mouse up (negative winit dy) should pitch up
        input.mouse_moved(0.0, -100.0);

        controller.on_update(&input, Duration::from_millis(16));
        assert!(controller.camera().pitch() > 0.0);
    }

    #[test]
    fn scroll_reaches_projection_zoom() {
        let mut controller = controller();
        let mut input = InputSystem::new();
        input.scrolled(1.0);

        controller.on_update(&input, Duration::from_millis(16));
        assert_eq!(controller.camera().zoom(), 44.0);
        assert_eq!(controller.projection_matrix(), {
            let mut projection = CameraPerspective::new(800, 600);
            projection.set_zoom(44.0);
            projection.projection_matrix()
        });
    }

    #[test]
    fn o_and_p_keys_toggle_projection_mode() {
        let mut controller = CameraController::new(
            FlyCamera::new(Point3::origin()),
            CameraProjection::new(800, 600),
        );
        let mut input = InputSystem::new();

        input.key_event(VirtualKeyCode::O, ElementState::Pressed);
        controller.on_update(&input, Duration::from_millis(16));
        assert_eq!(
            controller.projection_matrix(),
            CameraOrthographic::new().projection_matrix()
        );

        input.key_event(VirtualKeyCode::O, ElementState::Released);
        input.key_event(VirtualKeyCode::P, ElementState::Pressed);
        controller.on_update(&input, Duration::from_millis(16));
        assert_eq!(
            controller.projection_matrix(),
            CameraPerspective::new(800, 600).projection_matrix()
        );
    }

    #[test]
    fn perspective_wins_when_both_toggle_keys_are_held() {
        let mut controller = CameraController::new(
            FlyCamera::new(Point3::origin()),
            CameraProjection::new(800, 600),
        );
        let mut input = InputSystem::new();
        input.key_event(VirtualKeyCode::O, ElementState::Pressed);
        input.key_event(VirtualKeyCode::P, ElementState::Pressed);

        controller.on_update(&input, Duration::from_millis(16));
        assert_eq!(
            controller.projection_matrix(),
            CameraPerspective::new(800, 600).projection_matrix()
        );
    }

    #[test]
    fn idle_input_leaves_state_untouched() {
        let mut controller = controller();
        let input = InputSystem::new();
        let before = controller.view_projection_matrix();

        controller.on_update(&input, Duration::from_millis(16));
        assert_eq!(controller.view_projection_matrix(), before);
    }
}
