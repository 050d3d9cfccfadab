//! Orbit/free-fly camera and per-frame ray basis derivation

use glam::{Quat, Vec3};

/// Default yaw looking down -Z, in degrees
pub const DEFAULT_YAW: f32 = -90.0;
/// Default pitch, in degrees
pub const DEFAULT_PITCH: f32 = 0.0;
/// Free-fly movement speed in world units per second
pub const DEFAULT_SPEED: f32 = 3.0;
/// Mouse sensitivity in degrees per pixel of cursor travel
pub const DEFAULT_SENSITIVITY: f32 = 0.25;
/// Default vertical field of view, in degrees
pub const DEFAULT_FOV: f32 = 45.0;

/// Pitch is kept strictly inside this bound so front never aligns with
/// world up (the right vector would collapse to zero there).
pub const PITCH_LIMIT: f32 = 89.0;

/// Field of view bounds in degrees
pub const FOV_MIN: f32 = 1.0;
pub const FOV_MAX: f32 = 45.0;

/// Translation directions for free-fly movement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// How rotation input is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// WASD translation plus mouse-look yaw/pitch accumulation
    FreeFly,
    /// Position and front rotate together about the world origin,
    /// only while a drag is active
    Orbit,
}

/// Camera position and orientation snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    pub position: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

/// A single ray cast into the scene
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Viewport quantities derived from the camera once per frame.
///
/// `lower_left` is the world-space point at screen (0,0); `horizontal` and
/// `vertical` span the full viewport. The horizontal span is
/// `2 * near * tan(fov / 2)` and the vertical span is the horizontal span
/// divided by the aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct RayBasis {
    pub origin: Vec3,
    pub lower_left: Vec3,
    pub horizontal: Vec3,
    pub vertical: Vec3,
}

impl RayBasis {
    /// Build the ray for normalized screen coordinates u,v in [0,1],
    /// v increasing upward.
    pub fn ray(&self, u: f32, v: f32) -> Ray {
        let dir =
            (self.lower_left + u * self.horizontal + v * self.vertical - self.origin).normalize();
        Ray::new(self.origin, dir)
    }
}

/// Perspective camera with two interaction modes: free-fly mouse-look and
/// drag-gated orbit about the origin.
///
/// The orthonormal basis (front/right/up) is re-derived after every
/// mutation, never integrated incrementally, so it cannot drift.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub position: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    /// Yaw in degrees, kept in sync with `front`
    yaw: f32,
    /// Pitch in degrees, clamped to (-PITCH_LIMIT, PITCH_LIMIT)
    pitch: f32,
    /// Field of view in degrees, clamped to [FOV_MIN, FOV_MAX]
    fov: f32,
    pub near: f32,
    pub far: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub mode: CameraMode,
    dragging: bool,
}

impl OrbitCamera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov: DEFAULT_FOV,
            near: 0.1,
            far: 1000.0,
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            mode: CameraMode::Orbit,
            dragging: false,
        };
        camera.update_vectors();
        camera
    }

    /// Current position and orthonormal basis
    pub fn view_basis(&self) -> ViewBasis {
        ViewBasis {
            position: self.position,
            forward: self.front,
            right: self.right,
            up: self.up,
        }
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    /// Translate in free-fly mode. Orbit mode has no translation.
    pub fn process_movement(&mut self, direction: MoveDirection, dt: f32) {
        if self.mode != CameraMode::FreeFly {
            return;
        }
        let velocity = self.movement_speed * dt;
        match direction {
            MoveDirection::Forward => self.position += self.front * velocity,
            MoveDirection::Backward => self.position -= self.front * velocity,
            MoveDirection::Left => self.position -= self.right * velocity,
            MoveDirection::Right => self.position += self.right * velocity,
            MoveDirection::Up => self.position += self.world_up * velocity,
            MoveDirection::Down => self.position -= self.world_up * velocity,
        }
    }

    /// Apply a rotation delta in screen pixels.
    ///
    /// Free-fly accumulates yaw/pitch and rebuilds the basis. Orbit rotates
    /// position and front together about the world up axis (yaw) and the
    /// local right axis (pitch); deltas arriving while no drag is active are
    /// ignored entirely.
    pub fn rotate(&mut self, d_yaw: f32, d_pitch: f32) {
        match self.mode {
            CameraMode::FreeFly => {
                self.yaw += d_yaw * self.mouse_sensitivity;
                self.pitch = (self.pitch + d_pitch * self.mouse_sensitivity)
                    .clamp(-PITCH_LIMIT, PITCH_LIMIT);
                self.update_vectors();
            }
            CameraMode::Orbit => {
                if !self.dragging {
                    return;
                }
                self.orbit_yaw((-d_yaw * self.mouse_sensitivity).to_radians());
                self.orbit_pitch((-d_pitch * self.mouse_sensitivity).to_radians());
            }
        }
    }

    /// Scroll input: zooms the field of view in free-fly, dollies the orbit
    /// radius in orbit mode.
    pub fn process_scroll(&mut self, delta: f32) {
        match self.mode {
            CameraMode::FreeFly => {
                self.fov = (self.fov - delta).clamp(FOV_MIN, FOV_MAX);
            }
            CameraMode::Orbit => {
                let distance = (self.position.length() - delta).max(1.0);
                self.position = self.position.normalize_or_zero() * distance;
            }
        }
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
        self.dragging = false;
    }

    /// Derive the per-frame ray basis from the current state. Recomputed
    /// every frame because fov and aspect can change between frames.
    pub fn ray_basis(&self, aspect: f32) -> RayBasis {
        let h_span = 2.0 * self.near * (self.fov.to_radians() / 2.0).tan();
        let v_span = h_span / aspect.max(1e-6);

        let horizontal = self.right * h_span;
        let vertical = self.up * v_span;
        let lower_left =
            self.position + self.front * self.near - horizontal / 2.0 - vertical / 2.0;

        RayBasis {
            origin: self.position,
            lower_left,
            horizontal,
            vertical,
        }
    }

    fn orbit_yaw(&mut self, angle: f32) {
        let rotation = Quat::from_axis_angle(self.world_up, angle);
        self.position = rotation * self.position;
        self.front = (rotation * self.front).normalize();
        self.sync_angles_from_front();
        self.update_vectors();
    }

    fn orbit_pitch(&mut self, angle: f32) {
        let rotation = Quat::from_axis_angle(self.right, angle);
        let new_front = (rotation * self.front).normalize();
        // Reject the delta when it would push front into the pole.
        if new_front.y.asin().to_degrees().abs() >= PITCH_LIMIT {
            return;
        }
        self.front = new_front;
        self.position = rotation * self.position;
        self.sync_angles_from_front();
        self.update_vectors();
    }

    fn sync_angles_from_front(&mut self) {
        self.pitch = self
            .front
            .y
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.yaw = self.front.z.atan2(self.front.x).to_degrees();
    }

    /// Rebuild front from yaw/pitch, then right and up from front.
    fn update_vectors(&mut self) {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();

        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        // Looking at the origin from slightly above the disk plane.
        Self::new(Vec3::new(0.0, 6.0, 30.0), DEFAULT_YAW, -11.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn assert_orthonormal(basis: &ViewBasis) {
        assert!((basis.forward.length() - 1.0).abs() < EPS);
        assert!((basis.right.length() - 1.0).abs() < EPS);
        assert!((basis.up.length() - 1.0).abs() < EPS);
        assert!(basis.forward.dot(basis.right).abs() < EPS);
        assert!(basis.forward.dot(basis.up).abs() < EPS);
        assert!(basis.right.dot(basis.up).abs() < EPS);
    }

    #[test]
    fn test_basis_orthonormal_after_free_fly_rotations() {
        let mut camera = OrbitCamera::default();
        camera.set_mode(CameraMode::FreeFly);
        // Deterministic pseudo-random walk over rotation deltas.
        let mut seed = 7u32;
        for _ in 0..200 {
            seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
            let d_yaw = ((seed >> 8) % 400) as f32 - 200.0;
            let d_pitch = ((seed >> 16) % 400) as f32 - 200.0;
            camera.rotate(d_yaw, d_pitch);
            assert_orthonormal(&camera.view_basis());
        }
    }

    #[test]
    fn test_basis_orthonormal_after_orbit_rotations() {
        let mut camera = OrbitCamera::default();
        camera.set_mode(CameraMode::Orbit);
        camera.begin_drag();
        for i in 0..200 {
            let d_yaw = ((i % 17) as f32) - 8.0;
            let d_pitch = ((i % 11) as f32) - 5.0;
            camera.rotate(d_yaw, d_pitch);
            assert_orthonormal(&camera.view_basis());
        }
    }

    #[test]
    fn test_pitch_stays_clamped() {
        let mut camera = OrbitCamera::default();
        camera.set_mode(CameraMode::FreeFly);
        camera.rotate(0.0, 100000.0);
        assert!(camera.pitch() <= PITCH_LIMIT);
        assert_orthonormal(&camera.view_basis());

        camera.rotate(0.0, -200000.0);
        assert!(camera.pitch() >= -PITCH_LIMIT);
        assert_orthonormal(&camera.view_basis());
    }

    #[test]
    fn test_orbit_pitch_stays_clamped() {
        let mut camera = OrbitCamera::default();
        camera.set_mode(CameraMode::Orbit);
        camera.begin_drag();
        for _ in 0..2000 {
            camera.rotate(0.0, 25.0);
            assert!(camera.pitch().abs() <= PITCH_LIMIT);
            assert_orthonormal(&camera.view_basis());
        }
    }

    #[test]
    fn test_view_basis_idempotent() {
        let camera = OrbitCamera::new(Vec3::new(3.0, 2.0, 8.0), -75.0, -12.0);
        let a = camera.view_basis();
        let b = camera.view_basis();
        assert_eq!(a, b);
    }

    #[test]
    fn test_orbit_rotation_ignored_without_drag() {
        let mut camera = OrbitCamera::default();
        camera.set_mode(CameraMode::Orbit);
        let before = camera.view_basis();
        camera.rotate(50.0, 30.0);
        let after = camera.view_basis();
        assert_eq!(before, after);
    }

    #[test]
    fn test_orbit_preserves_distance_to_origin() {
        let mut camera = OrbitCamera::default();
        camera.set_mode(CameraMode::Orbit);
        camera.begin_drag();
        let distance = camera.position.length();
        for _ in 0..100 {
            camera.rotate(13.0, -7.0);
        }
        assert!((camera.position.length() - distance).abs() < 0.01);
    }

    #[test]
    fn test_fov_clamped() {
        let mut camera = OrbitCamera::default();
        camera.set_mode(CameraMode::FreeFly);
        camera.process_scroll(1000.0);
        assert!((camera.fov() - FOV_MIN).abs() < EPS);
        camera.process_scroll(-1000.0);
        assert!((camera.fov() - FOV_MAX).abs() < EPS);
    }

    #[test]
    fn test_center_ray_matches_forward() {
        let camera = OrbitCamera::new(Vec3::new(1.0, 2.0, 15.0), -90.0, -10.0);
        let basis = camera.ray_basis(16.0 / 9.0);
        let ray = basis.ray(0.5, 0.5);
        let forward = camera.view_basis().forward;
        assert!(ray.dir.dot(forward) > 1.0 - EPS);
    }

    #[test]
    fn test_ray_spans_follow_fov_and_aspect() {
        let camera = OrbitCamera::new(Vec3::ZERO, -90.0, 0.0);
        let aspect = 2.0;
        let basis = camera.ray_basis(aspect);
        let expected_h = 2.0 * camera.near * (camera.fov().to_radians() / 2.0).tan();
        assert!((basis.horizontal.length() - expected_h).abs() < EPS);
        assert!((basis.vertical.length() - expected_h / aspect).abs() < EPS);
    }

    #[test]
    fn test_free_fly_movement_directions() {
        let mut camera = OrbitCamera::new(Vec3::ZERO, -90.0, 0.0);
        camera.set_mode(CameraMode::FreeFly);
        camera.process_movement(MoveDirection::Forward, 1.0);
        assert!(camera.position.z < 0.0);
        let x_before = camera.position.x;
        camera.process_movement(MoveDirection::Right, 1.0);
        assert!(camera.position.x > x_before);
        camera.process_movement(MoveDirection::Up, 1.0);
        assert!(camera.position.y > 0.0);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!((ray.at(3.0) - Vec3::new(3.0, 0.0, 0.0)).length() < EPS);
    }
}
