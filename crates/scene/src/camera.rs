use glam::{Mat4, Vec3};
use std::f32::consts::{PI, TAU};

/// Perspective camera with a cached projection matrix.
///
/// Changing `fov_y_degrees`, `aspect`, `near` or `far` has no effect on
/// [`PerspectiveCamera::projection_matrix`] until
/// [`PerspectiveCamera::update_projection_matrix`] runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov_y_degrees,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    /// Set the aspect ratio and rebuild the projection.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize_or(Vec3::Y)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

/// Spherical coordinates around the orbit target; `phi` is measured from +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let radius = offset.length();
        if radius == 0.0 {
            return Self {
                radius,
                theta: 0.0,
                phi: 0.0,
            };
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

/// Orbit controller with optional damping.
///
/// Input methods only accumulate deltas; [`OrbitControls::update`] integrates
/// them into the camera once per frame. With damping enabled a fraction
/// `damping_factor` of the pending motion is applied per update and the rest
/// decays, so the camera keeps gliding after input stops.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }
}

const MOTION_EPSILON: f32 = 1e-6;

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Rotate by a pointer drag of `(dx, dy)` pixels on a viewport `height` pixels tall.
    /// A drag across the full height turns the camera once around.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        self.theta_delta -= TAU * dx / height * self.rotate_speed;
        self.phi_delta -= TAU * dy / height * self.rotate_speed;
    }

    /// Dolly by wheel steps. Positive steps move the camera closer.
    pub fn dolly(&mut self, steps: f32) {
        let zoom = 0.95_f32.powf(self.zoom_speed);
        self.scale *= zoom.powf(steps);
    }

    /// Pan by a pointer drag in screen space.
    pub fn pan(&mut self, dx: f32, dy: f32, height: f32, camera: &PerspectiveCamera) {
        let height = height.max(1.0);
        let half_fov = camera.fov_y_degrees.to_radians() / 2.0;
        let distance = (camera.position - self.target).length() * half_fov.tan();
        let left = camera.right() * (-2.0 * dx * distance / height * self.pan_speed);
        let up = camera.up() * (2.0 * dy * distance / height * self.pan_speed);
        self.pan_offset += left + up;
    }

    /// Integrate pending motion into `camera`. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        let step = if self.enable_damping { self.damping_factor } else { 1.0 };
        spherical.theta += self.theta_delta * step;
        spherical.phi =
            (spherical.phi + self.phi_delta * step).clamp(MOTION_EPSILON, PI - MOTION_EPSILON);
        spherical.radius =
            (spherical.radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * step;

        let previous = camera.position;
        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.theta_delta *= decay;
            self.phi_delta *= decay;
            self.pan_offset *= decay;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        camera.position.distance_squared(previous) > MOTION_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sketch_camera() -> (PerspectiveCamera, OrbitControls) {
        let mut camera = PerspectiveCamera::new(25.0, 16.0 / 9.0, 0.1, 100.0);
        camera.position = Vec3::new(0.0, 6.0, 22.0);
        let mut controls = OrbitControls::new(Vec3::new(0.0, 3.0, 0.0));
        controls.enable_damping = true;
        (camera, controls)
    }

    #[test]
    fn set_aspect_rebuilds_projection() {
        let mut camera = PerspectiveCamera::new(25.0, 1.0, 0.1, 100.0);
        camera.set_aspect(2.0);
        assert_eq!(camera.aspect, 2.0);
        assert_eq!(
            camera.projection_matrix(),
            Mat4::perspective_rh(25.0_f32.to_radians(), 2.0, 0.1, 100.0)
        );
    }

    #[test]
    fn projection_is_cached_until_updated() {
        let mut camera = PerspectiveCamera::new(25.0, 1.0, 0.1, 100.0);
        let before = camera.projection_matrix();
        camera.aspect = 3.0;
        assert_eq!(camera.projection_matrix(), before);
        camera.update_projection_matrix();
        assert_ne!(camera.projection_matrix(), before);
    }

    #[test]
    fn view_projection_is_finite() {
        let (mut camera, mut controls) = sketch_camera();
        controls.update(&mut camera);
        let vp = camera.view_projection();
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn idle_update_keeps_position_and_looks_at_target() {
        let (mut camera, mut controls) = sketch_camera();
        let moved = controls.update(&mut camera);
        assert!(!moved);
        assert!(camera.position.distance(Vec3::new(0.0, 6.0, 22.0)) < 1e-4);
        assert_eq!(camera.target, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn spherical_round_trip() {
        let offset = Vec3::new(1.5, -2.0, 3.0);
        let back = Spherical::from_offset(offset).to_offset();
        assert!(back.distance(offset) < 1e-5);
    }

    #[test]
    fn damping_spreads_rotation_over_frames() {
        let (mut camera, mut controls) = sketch_camera();
        let start = camera.position;
        controls.rotate(100.0, 0.0, 720.0);

        assert!(controls.update(&mut camera));
        let first_step = camera.position.distance(start);

        let mut still_moving = 0;
        for _ in 0..10 {
            if controls.update(&mut camera) {
                still_moving += 1;
            }
        }
        assert!(first_step > 0.0);
        assert_eq!(still_moving, 10);
        // Radius around the target is preserved by pure rotation.
        let radius = (camera.position - controls.target).length();
        let start_radius = (start - Vec3::new(0.0, 3.0, 0.0)).length();
        assert!((radius - start_radius).abs() < 1e-3);
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let (mut camera, mut controls) = sketch_camera();
        controls.enable_damping = false;
        controls.rotate(180.0, 0.0, 720.0);
        assert!(controls.update(&mut camera));
        assert!(!controls.update(&mut camera));
    }

    #[test]
    fn dolly_in_moves_closer() {
        let (mut camera, mut controls) = sketch_camera();
        controls.enable_damping = false;
        let before = (camera.position - controls.target).length();
        controls.dolly(1.0);
        controls.update(&mut camera);
        let after = (camera.position - controls.target).length();
        assert!((after - before * 0.95).abs() < 1e-3);
    }

    #[test]
    fn pan_moves_target() {
        let (mut camera, mut controls) = sketch_camera();
        controls.enable_damping = false;
        controls.update(&mut camera);
        controls.pan(50.0, 0.0, 720.0, &camera);
        controls.update(&mut camera);
        assert!(controls.target.x < 0.0);
        assert!((controls.target.y - 3.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let (mut camera, mut controls) = sketch_camera();
        controls.enable_damping = false;
        controls.rotate(0.0, 10_000.0, 720.0);
        controls.update(&mut camera);
        assert!(camera.position.y > controls.target.y);
        assert!(camera.position.is_finite());
    }
}
