/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};

use crate::transform::{normalize_or_zero, Transform, NORMALIZE_EPSILON};

/// Smallest vertical field of view, in degrees
pub const MIN_FOVY: f32 = 1.0;
/// Largest vertical field of view, in degrees
pub const MAX_FOVY: f32 = 150.0;
/// Free-look elevation limit, in degrees from the horizon
pub const MAX_ELEVATION: f32 = 89.0;

/// Which view construction to use for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Look at `center` from `eye`
    #[default]
    Focus,
    /// First-person: look along the camera's own forward vector
    Free,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Focus => ViewMode::Free,
            ViewMode::Free => ViewMode::Focus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    eye: Point3<f32>,
    center: Point3<f32>,
    up: Vector3<f32>,
    fovy: f32,
}

/// Camera configuration for 3D rendering.
///
/// The camera does not know which [`ViewMode`] is active; callers pass it
/// when asking for a view matrix. `forward` and `right` only matter in free
/// mode, `center` only in focus mode.
#[derive(Debug, Clone)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub center: Point3<f32>,
    pub up: Vector3<f32>,
    fovy: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    defaults: Pose,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self::looking_at(
            Point3::new(0.0, 0.0, 5.0),
            Point3::origin(),
            Vector3::y(),
            45.0,
        );
        camera.set_viewport(width, height);
        camera
    }

    /// Camera at `eye` looking at `center`. The pose given here is what
    /// [`Camera::reset_to_defaults`] returns to.
    pub fn looking_at(eye: Point3<f32>, center: Point3<f32>, up: Vector3<f32>, fovy: f32) -> Self {
        let fovy = fovy.clamp(MIN_FOVY, MAX_FOVY);
        let mut camera = Self {
            eye,
            center,
            up,
            fovy,
            aspect: 4.0 / 3.0,
            near: 0.1,
            far: 100.0,
            forward: Vector3::zeros(),
            right: Vector3::zeros(),
            defaults: Pose {
                eye,
                center,
                up,
                fovy,
            },
        };
        camera.aim_at_center();
        camera
    }

    /// Free-look direction
    pub fn forward(&self) -> Vector3<f32> {
        self.forward
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    /// Vertical field of view in degrees
    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    /// Set the field of view, clamped to `[MIN_FOVY, MAX_FOVY]`. Non-finite
    /// values are ignored.
    pub fn set_fovy(&mut self, fovy: f32) {
        if fovy.is_finite() {
            self.fovy = fovy.clamp(MIN_FOVY, MAX_FOVY);
        }
    }

    /// Narrow (positive delta) or widen the field of view
    pub fn zoom(&mut self, delta: f32) {
        self.set_fovy(self.fovy - delta);
    }

    /// Update the aspect ratio for a new viewport size
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self, mode: ViewMode) -> Matrix4<f32> {
        match mode {
            ViewMode::Focus => Transform::look_at(&self.eye, &self.center, &self.up),
            ViewMode::Free => Transform::look_along(&self.eye, &self.forward, &self.up),
        }
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Transform::perspective(self.fovy, self.aspect, self.near, self.far)
    }

    pub fn move_forward(&mut self, distance: f32) {
        self.eye += self.forward * distance;
    }

    pub fn move_right(&mut self, distance: f32) {
        self.eye += self.right * distance;
    }

    pub fn move_up(&mut self, distance: f32) {
        self.eye += normalize_or_zero(&self.up) * distance;
    }

    /// Turn the free-look direction: yaw about the world up vector, then pitch
    /// about the resulting local right axis.
    ///
    /// Positive yaw turns right, positive pitch looks up. Pitch cannot carry
    /// the elevation past `MAX_ELEVATION`, so forward never lines up with `up`.
    /// Yaw alone leaves the elevation untouched.
    pub fn rotate(&mut self, yaw_degrees: f32, pitch_degrees: f32) {
        let Some(up) = Unit::try_new(self.up, NORMALIZE_EPSILON) else {
            return;
        };

        let yaw = Rotation3::from_axis_angle(&up, -yaw_degrees.to_radians());
        let mut forward = normalize_or_zero(&(yaw * self.forward));

        if pitch_degrees != 0.0 {
            if let Some(right) = Unit::try_new(forward.cross(&*up), NORMALIZE_EPSILON) {
                let elevation = forward.dot(&*up).clamp(-1.0, 1.0).asin().to_degrees();
                // Only movement toward a pole is limited; a pose already past
                // the limit may still pitch back.
                let target = if pitch_degrees > 0.0 {
                    (elevation + pitch_degrees).min(MAX_ELEVATION.max(elevation))
                } else {
                    (elevation + pitch_degrees).max((-MAX_ELEVATION).min(elevation))
                };
                let pitch = Rotation3::from_axis_angle(&right, (target - elevation).to_radians());
                forward = normalize_or_zero(&(pitch * forward));
            }
        }

        self.forward = forward;
        self.right = normalize_or_zero(&forward.cross(&self.up));
    }

    /// Restore eye, center, up and field of view to the construction pose,
    /// and aim free-look at the center again.
    pub fn reset_to_defaults(&mut self) {
        self.eye = self.defaults.eye;
        self.center = self.defaults.center;
        self.up = self.defaults.up;
        self.fovy = self.defaults.fovy;
        self.aim_at_center();
    }

    fn aim_at_center(&mut self) {
        self.forward = normalize_or_zero(&(self.center - self.eye));
        self.right = normalize_or_zero(&self.forward.cross(&self.up));
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(camera.fovy(), 45.0);
        assert_relative_eq!(camera.forward(), Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(camera.right(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_focus_view_matches_reference_look_at() {
        let camera = Camera::default();
        let reference = Matrix4::look_at_rh(
            &Point3::new(0.0, 0.0, 5.0),
            &Point3::origin(),
            &Vector3::y(),
        );
        assert_relative_eq!(camera.view_matrix(ViewMode::Focus), reference, epsilon = 1e-6);
        assert_relative_eq!(camera.view_matrix(ViewMode::Free), reference, epsilon = 1e-6);
    }

    #[test]
    fn test_free_view_ignores_center() {
        let mut camera = Camera::default();
        camera.rotate(90.0, 0.0);
        let free = camera.view_matrix(ViewMode::Free);

        camera.center = Point3::new(10.0, -4.0, 2.0);
        assert_relative_eq!(camera.view_matrix(ViewMode::Free), free);
        assert_relative_eq!(
            free,
            Matrix4::look_at_rh(&camera.eye, &Point3::new(1.0, 0.0, 5.0), &Vector3::y()),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_yaw_is_invertible() {
        let mut camera = Camera::default();
        let original = camera.forward();

        camera.rotate(90.0, 0.0);
        assert_relative_eq!(camera.forward(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(camera.right(), Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-6);

        camera.rotate(-90.0, 0.0);
        assert_relative_eq!(camera.forward(), original, epsilon = 1e-6);
    }

    #[test]
    fn test_yaw_from_steep_pose_is_invertible() {
        let mut camera = Camera::looking_at(
            Point3::new(0.0, 5.0, 0.05),
            Point3::origin(),
            Vector3::y(),
            45.0,
        );
        let original = camera.forward();
        let elevation = |camera: &Camera| camera.forward().y.asin().to_degrees();
        let steep = elevation(&camera);
        assert!(steep < -MAX_ELEVATION);

        camera.rotate(90.0, 0.0);
        assert_relative_eq!(elevation(&camera), steep, epsilon = 1e-3);

        camera.rotate(-90.0, 0.0);
        assert_relative_eq!(elevation(&camera), steep, epsilon = 1e-3);
        assert_relative_eq!(camera.forward(), original, epsilon = 1e-5);
    }

    #[test]
    fn test_yaw_from_pitched_pose_is_invertible() {
        let mut camera = Camera::default();
        camera.rotate(0.0, 40.0);
        let pitched = camera.forward();

        camera.rotate(135.0, 0.0);
        assert_relative_eq!(camera.forward().y, pitched.y, epsilon = 1e-5);
        camera.rotate(-135.0, 0.0);
        assert_relative_eq!(camera.forward(), pitched, epsilon = 1e-5);
    }

    #[test]
    fn test_steep_pose_can_pitch_away_from_pole() {
        let mut camera = Camera::looking_at(
            Point3::new(0.0, 5.0, 0.05),
            Point3::origin(),
            Vector3::y(),
            45.0,
        );
        let before = camera.forward().y;
        // Further down is refused, back toward the horizon is allowed
        camera.rotate(0.0, -5.0);
        assert_relative_eq!(camera.forward().y, before, epsilon = 1e-5);
        camera.rotate(0.0, 10.0);
        assert!(camera.forward().y > before);
    }

    #[test]
    fn test_pitch_looks_up_and_stays_unit() {
        let mut camera = Camera::default();
        camera.rotate(0.0, 30.0);
        assert_relative_eq!(camera.forward().y, 0.5, epsilon = 1e-5);
        assert_relative_eq!(camera.forward().norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.right(), Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_pitch_is_limited_below_vertical() {
        let mut camera = Camera::default();
        for _ in 0..20 {
            camera.rotate(3.0, 25.0);
        }
        let elevation = camera.forward().y.asin().to_degrees();
        assert_relative_eq!(elevation, MAX_ELEVATION, epsilon = 1e-2);
        assert!(camera.right().norm() > 0.99);
    }

    #[test]
    fn test_many_small_rotations_stay_normalized() {
        let mut camera = Camera::default();
        for i in 0..10_000 {
            let sign = if i % 2 == 0 { 1.0 } else { -0.5 };
            camera.rotate(0.37 * sign, 0.11 * sign);
        }
        assert_relative_eq!(camera.forward().norm(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.right().norm(), 1.0, epsilon = 1e-5);
        assert!(camera.forward().dot(&camera.right()).abs() < 1e-5);
    }

    #[test]
    fn test_movement_follows_direction_vectors() {
        let mut camera = Camera::default();
        camera.move_forward(2.0);
        assert_relative_eq!(camera.eye, Point3::new(0.0, 0.0, 3.0));
        camera.move_right(-1.0);
        assert_relative_eq!(camera.eye, Point3::new(-1.0, 0.0, 3.0));
        camera.move_up(0.5);
        assert_relative_eq!(camera.eye, Point3::new(-1.0, 0.5, 3.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::default();
        for delta in [500.0, -3.0, -1000.0, 7.5, 1e9, -1e9, f32::NAN] {
            for _ in 0..10 {
                camera.zoom(delta);
                assert!((MIN_FOVY..=MAX_FOVY).contains(&camera.fovy()));
            }
        }
        camera.set_fovy(400.0);
        assert_eq!(camera.fovy(), MAX_FOVY);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut camera = Camera::default();
        camera.move_forward(3.0);
        camera.rotate(45.0, 10.0);
        camera.center = Point3::new(1.0, 1.0, 1.0);
        camera.zoom(20.0);

        camera.reset_to_defaults();
        assert_eq!(camera.eye, Point3::new(0.0, 0.0, 5.0));
        assert_eq!(camera.center, Point3::origin());
        assert_eq!(camera.fovy(), 45.0);
        assert_relative_eq!(camera.forward(), Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_projection_uses_field_of_view() {
        let mut camera = Camera::new(100, 100);
        camera.set_fovy(90.0);
        let proj = camera.projection_matrix();
        assert_relative_eq!(proj[(0, 0)], 1.0, epsilon = 1e-6);
        assert_relative_eq!(proj[(1, 1)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_height_viewport_keeps_aspect() {
        let mut camera = Camera::new(640, 480);
        camera.set_viewport(640, 0);
        assert_relative_eq!(camera.aspect, 640.0 / 480.0);
    }
}
