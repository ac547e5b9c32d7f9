use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

/// Default heading looks down -Z.
pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 2.5;
pub const DEFAULT_SENSITIVITY: f32 = 0.1;
pub const DEFAULT_ZOOM: f32 = 45.0;

/// Pitch is kept away from +-90 so the heading never becomes parallel to
/// world-up (which would zero out the cross products below).
const PITCH_LIMIT: f32 = 89.0;

const ZOOM_MIN: f32 = 1.0;
const ZOOM_MAX: f32 = 90.0;
// Scroll only adjusts zoom while inside this window; the clamp afterwards
// uses the wider [ZOOM_MIN, ZOOM_MAX] range. A single large scroll can
// therefore push zoom past the window before being clamped. Intentional,
// see process_scroll().
const ZOOM_ADJUST_MAX: f32 = 45.0;

/// Movement request decoupled from any concrete key binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// Free-flying first person camera.
///
/// Orientation is stored as unbounded yaw plus clamped pitch, both in
/// degrees. Two heading vectors are derived from them: `look_dir` follows
/// the full yaw+pitch orientation and always drives the view matrix, while
/// `front` is the same heading with pitch forced to zero, used for
/// ground-style movement when `flying` is off.
///
/// Known limitation: if `world_up` is overridden so that the active heading
/// can become parallel to it, the derived basis degenerates (normalize of a
/// near-zero cross product). With the default +Y up and constrained mouse
/// look this state is unreachable thanks to the pitch clamp.
#[derive(Clone, Copy, Debug)]
pub struct FlyCamera {
    position: Point3<f32>,
    world_up: Vector3<f32>,

    yaw: f32,
    pitch: f32,

    front: Vector3<f32>,
    look_dir: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,

    movement_speed: f32,
    mouse_sensitivity: f32,
    zoom: f32,

    flying: bool,
}

impl FlyCamera {
    pub fn new(position: Point3<f32>) -> Self {
        let mut camera = Self {
            position,
            world_up: Vector3::new(0.0, 1.0, 0.0),
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            front: Vector3::new(0.0, 0.0, -1.0),
            look_dir: Vector3::new(0.0, 0.0, -1.0),
            right: Vector3::new(1.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            zoom: DEFAULT_ZOOM,
            flying: true,
        };
        camera.update_vectors();
        camera
    }

    pub fn with_yaw(mut self, degrees: f32) -> Self {
        self.yaw = degrees;
        self.update_vectors();
        self
    }

    pub fn with_pitch(mut self, degrees: f32) -> Self {
        self.pitch = degrees;
        self.update_vectors();
        self
    }

    pub fn with_world_up(mut self, world_up: Vector3<f32>) -> Self {
        self.world_up = world_up;
        self.update_vectors();
        self
    }

    pub fn with_speed(mut self, units_per_second: f32) -> Self {
        self.movement_speed = units_per_second;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.mouse_sensitivity = sensitivity;
        self
    }

    pub fn with_zoom(mut self, degrees: f32) -> Self {
        self.zoom = degrees.clamp(ZOOM_MIN, ZOOM_MAX);
        self
    }

    pub fn with_flying(mut self, flying: bool) -> Self {
        self.set_flying(flying);
        self
    }

    /// Displaces the camera along its movement basis. Movement only touches
    /// the position, so no basis recompute happens here.
    pub fn process_keyboard(&mut self, direction: MoveDirection, delta_seconds: f32) {
        let heading = self.movement_heading();
        let velocity = self.movement_speed * delta_seconds;
        match direction {
            MoveDirection::Forward => self.position += heading * velocity,
            MoveDirection::Backward => self.position -= heading * velocity,
            MoveDirection::Left => self.position -= self.right * velocity,
            MoveDirection::Right => self.position += self.right * velocity,
        }
    }

    /// Applies raw cursor deltas, in screen units. Positive `y_offset`
    /// pitches up. Yaw accumulates without bound; the trigonometry in
    /// update_vectors() is periodic so wrapping is unnecessary.
    pub fn process_mouse_move(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Scroll-wheel zoom. Scrolling forward (positive offset) narrows the
    /// field of view.
    ///
    /// The offset is only applied while zoom sits inside [1, 45], but the
    /// clamp that follows allows the full [1, 90] range: a large negative
    /// offset from inside the window can land anywhere up to 90, after
    /// which further widening is ignored.
    pub fn process_scroll(&mut self, y_offset: f32) {
        if self.zoom >= ZOOM_MIN && self.zoom <= ZOOM_ADJUST_MAX {
            self.zoom -= y_offset;
        }
        if self.zoom <= ZOOM_MIN {
            self.zoom = ZOOM_MIN;
        }
        if self.zoom >= ZOOM_MAX {
            self.zoom = ZOOM_MAX;
        }
    }

    /// Right-handed look-at transform for the current state. Pure accessor;
    /// calling it twice without mutation yields bit-identical matrices.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.look_dir, self.up)
    }

    pub fn set_flying(&mut self, flying: bool) {
        if self.flying != flying {
            self.flying = flying;
            self.update_vectors();
        }
    }

    pub fn flying(&self) -> bool {
        self.flying
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn look_dir(&self) -> Vector3<f32> {
        self.look_dir
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    fn movement_heading(&self) -> Vector3<f32> {
        if self.flying {
            self.look_dir
        } else {
            self.front
        }
    }

    // Rebuilds the derived basis from yaw/pitch. Must run after every
    // orientation or mode change so readers never observe a stale basis.
    fn update_vectors(&mut self) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();

        self.look_dir = Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();

        // same heading with pitch forced to zero
        self.front = Vector3::new(yaw.cos(), 0.0, yaw.sin()).normalize();

        let heading = self.movement_heading();
        self.right = heading.cross(self.world_up).normalize();
        self.up = self.right.cross(heading).normalize();
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{EuclideanSpace, SquareMatrix};

    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_unit(v: Vector3<f32>, name: &str) {
        assert!(
            (v.magnitude() - 1.0).abs() < EPS,
            "{name} not unit length: {v:?}"
        );
    }

    fn assert_orthogonal(a: Vector3<f32>, b: Vector3<f32>, msg: &str) {
        assert!(a.dot(b).abs() < EPS, "{msg}: dot = {}", a.dot(b));
    }

    #[test]
    fn basis_orthonormal_over_reachable_states() {
        for flying in [true, false] {
            for yaw_step in -12..=12 {
                for pitch_step in -8..=8 {
                    let yaw = yaw_step as f32 * 30.0;
                    let pitch = pitch_step as f32 * 11.0; // stays within +-88
                    let camera = FlyCamera::new(Point3::origin())
                        .with_yaw(yaw)
                        .with_pitch(pitch)
                        .with_flying(flying);

                    assert_unit(camera.front(), "front");
                    assert_unit(camera.look_dir(), "look_dir");
                    assert_unit(camera.right(), "right");
                    assert_unit(camera.up(), "up");

                    let heading = if flying {
                        camera.look_dir()
                    } else {
                        camera.front()
                    };
                    assert_orthogonal(heading, camera.right(), "heading/right");
                    assert_orthogonal(heading, camera.up(), "heading/up");
                    assert_orthogonal(camera.right(), camera.up(), "right/up");
                }
            }
        }
    }

    #[test]
    fn constrained_pitch_clamps_at_limit() {
        let mut camera = FlyCamera::new(Point3::origin());
        for _ in 0..100 {
            camera.process_mouse_move(0.0, 500.0, true);
        }
        assert_eq!(camera.pitch(), 89.0);

        for _ in 0..100 {
            camera.process_mouse_move(0.0, -500.0, true);
        }
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn unconstrained_pitch_is_unbounded() {
        let mut camera = FlyCamera::new(Point3::origin());
        camera.process_mouse_move(0.0, 5000.0, false);
        // sensitivity 0.1 -> 500 degrees of pitch
        assert!((camera.pitch() - 500.0).abs() < 1e-3);
    }

    #[test]
    fn yaw_is_never_wrapped() {
        let mut camera = FlyCamera::new(Point3::origin());
        camera.process_mouse_move(36_000.0, 0.0, true);
        assert!((camera.yaw() - (DEFAULT_YAW + 3600.0)).abs() < 1e-2);
    }

    #[test]
    fn zoom_stays_within_bounds() {
        let mut camera = FlyCamera::new(Point3::origin());
        for offset in [10.0, -100.0, 3.5, -3.5, 60.0, -0.1, 500.0, -500.0] {
            camera.process_scroll(offset);
            assert!(
                (1.0..=90.0).contains(&camera.zoom()),
                "zoom escaped bounds: {}",
                camera.zoom()
            );
        }
    }

    #[test]
    fn zoom_decrements_inside_adjust_window() {
        let mut camera = FlyCamera::new(Point3::origin());
        assert_eq!(camera.zoom(), 45.0);
        camera.process_scroll(1.0);
        assert_eq!(camera.zoom(), 44.0);
    }

    #[test]
    fn zoom_ignores_scroll_outside_adjust_window() {
        let mut camera = FlyCamera::new(Point3::origin()).with_zoom(50.0);
        camera.process_scroll(1.0);
        assert_eq!(camera.zoom(), 50.0);
    }

    #[test]
    fn zoom_can_jump_past_adjust_window_before_clamp() {
        // from inside the window a single large scroll lands at the outer
        // clamp bound, not at the window edge
        let mut camera = FlyCamera::new(Point3::origin());
        camera.process_scroll(-100.0);
        assert_eq!(camera.zoom(), 90.0);

        let mut camera = FlyCamera::new(Point3::origin());
        camera.process_scroll(100.0);
        assert_eq!(camera.zoom(), 1.0);
    }

    #[test]
    fn grounded_forward_movement_stays_horizontal() {
        let mut camera = FlyCamera::new(Point3::origin())
            .with_pitch(45.0)
            .with_flying(false);
        camera.process_keyboard(MoveDirection::Forward, 1.0);
        assert_eq!(camera.position().y, 0.0);
        assert!(camera.position().z < 0.0);
    }

    #[test]
    fn flying_forward_movement_follows_pitch() {
        let mut camera = FlyCamera::new(Point3::origin())
            .with_pitch(45.0)
            .with_flying(true);
        camera.process_keyboard(MoveDirection::Forward, 1.0);
        assert!(camera.position().y > 0.0);
    }

    #[test]
    fn strafe_moves_along_right_vector() {
        let mut camera = FlyCamera::new(Point3::origin());
        camera.process_keyboard(MoveDirection::Right, 1.0);
        // default heading is -Z, so right is +X
        assert!((camera.position().x - DEFAULT_SPEED).abs() < EPS);
        assert!(camera.position().y.abs() < EPS);
        assert!(camera.position().z.abs() < EPS);
    }

    #[test]
    fn zero_delta_produces_no_displacement() {
        let mut camera = FlyCamera::new(Point3::origin());
        camera.process_keyboard(MoveDirection::Forward, 0.0);
        assert_eq!(camera.position(), Point3::origin());
    }

    #[test]
    fn default_view_matrix_is_identity() {
        // at the origin looking down -Z with +Y up the look-at transform is
        // the identity
        let camera = FlyCamera::new(Point3::origin());
        let view = camera.view_matrix();
        let identity = Matrix4::<f32>::identity();
        for column in 0..4 {
            for row in 0..4 {
                assert!(
                    (view[column][row] - identity[column][row]).abs() < EPS,
                    "view[{column}][{row}] = {}",
                    view[column][row]
                );
            }
        }
    }

    #[test]
    fn view_matrix_is_idempotent() {
        let camera = FlyCamera::new(Point3::new(1.5, -2.0, 7.25))
            .with_yaw(123.4)
            .with_pitch(-31.7);
        assert_eq!(camera.view_matrix(), camera.view_matrix());
    }

    #[test]
    fn yaw_wraparound_equivalence() {
        let a = FlyCamera::new(Point3::origin()).with_yaw(370.0);
        let b = FlyCamera::new(Point3::origin()).with_yaw(10.0);
        let delta = a.look_dir() - b.look_dir();
        assert!(delta.magnitude() < EPS, "look_dir differs: {delta:?}");
    }

    #[test]
    fn toggling_flying_recomputes_basis() {
        let mut camera = FlyCamera::new(Point3::origin()).with_pitch(45.0);
        let flying_right = camera.right();
        let flying_up = camera.up();

        camera.set_flying(false);
        // right is unchanged for the default world-up, but up must snap back
        // to the horizontal-heading basis
        assert_orthogonal(camera.front(), camera.up(), "front/up after toggle");
        assert!((camera.up().y - 1.0).abs() < EPS);

        camera.set_flying(true);
        assert_eq!(camera.right(), flying_right);
        assert_eq!(camera.up(), flying_up);
    }
}
