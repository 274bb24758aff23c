use crate::camera::IsometricCamera;
use glam::Vec3;
use std::f32::consts::TAU;

/// Orbit controls around the camera target with damped rotation.
///
/// Rotation input accumulates and is bled into the camera over several
/// `update` calls. Zoom applies immediately. Panning is not supported; the
/// target stays on the board center.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Azimuth around +Y, radians.
    theta: f32,
    /// Polar angle from +Y, radians.
    phi: f32,
    radius: f32,
    pending_theta: f32,
    pending_phi: f32,
    pub damping: f32,
    pub rotate_speed: f32,
    pub min_polar: f32,
    pub max_polar: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub enabled: bool,
}

impl OrbitControls {
    /// Controls starting from the camera's current offset.
    pub fn new(camera: &IsometricCamera) -> Self {
        let offset = camera.offset;
        let radius = offset.length().max(f32::EPSILON);
        Self {
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            radius,
            pending_theta: 0.0,
            pending_phi: 0.0,
            damping: 0.1,
            rotate_speed: 1.0,
            min_polar: 0.15,
            max_polar: 1.35,
            min_zoom: 0.5,
            max_zoom: 3.0,
            enabled: true,
        }
    }

    /// Queue a rotation from a pointer drag of `dx`, `dy` pixels on a
    /// viewport `viewport_height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !self.enabled || viewport_height <= 0.0 {
            return;
        }
        let scale = TAU * self.rotate_speed / viewport_height;
        self.pending_theta -= dx * scale;
        self.pending_phi -= dy * scale;
    }

    /// Multiply the camera zoom, clamped to the configured range.
    pub fn zoom(&self, camera: &mut IsometricCamera, factor: f32) {
        if !self.enabled || !(factor > 0.0) {
            return;
        }
        camera.zoom = (camera.zoom * factor).clamp(self.min_zoom, self.max_zoom);
    }

    /// Apply one damping step. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut IsometricCamera) -> bool {
        let step_theta = self.pending_theta * self.damping;
        let step_phi = self.pending_phi * self.damping;
        self.pending_theta -= step_theta;
        self.pending_phi -= step_phi;
        if self.pending_theta.abs() < 1e-5 {
            self.pending_theta = 0.0;
        }
        if self.pending_phi.abs() < 1e-5 {
            self.pending_phi = 0.0;
        }

        let theta = self.theta + step_theta;
        let phi = (self.phi + step_phi).clamp(self.min_polar, self.max_polar);
        if theta == self.theta && phi == self.phi {
            return false;
        }
        self.theta = theta;
        self.phi = phi;
        camera.offset = Vec3::new(
            self.radius * phi.sin() * theta.sin(),
            self.radius * phi.cos(),
            self.radius * phi.sin() * theta.cos(),
        );
        true
    }

    pub fn is_settled(&self) -> bool {
        self.pending_theta == 0.0 && self.pending_phi == 0.0
    }

    pub fn polar_angle(&self) -> f32 {
        self.phi
    }

    pub fn azimuth(&self) -> f32 {
        self.theta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_camera_offset() {
        let cam = IsometricCamera::default();
        let controls = OrbitControls::new(&cam);
        assert!((controls.azimuth() - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
        assert!((controls.polar_angle() - (1.0f32 / 3.0f32.sqrt()).acos()).abs() < 1e-4);
    }

    #[test]
    fn idle_update_leaves_camera_alone() {
        let mut cam = IsometricCamera::default();
        let before = cam;
        let mut controls = OrbitControls::new(&cam);
        assert!(!controls.update(&mut cam));
        assert_eq!(cam, before);
    }

    #[test]
    fn rotation_is_damped_and_settles() {
        let mut cam = IsometricCamera::default();
        let mut controls = OrbitControls::new(&cam);
        controls.rotate(100.0, 0.0, 800.0);

        assert!(controls.update(&mut cam));
        assert!(!controls.is_settled());
        for _ in 0..500 {
            controls.update(&mut cam);
        }
        assert!(controls.is_settled());
        assert!((cam.offset.length() - IsometricCamera::DISTANCE).abs() < 0.1);
    }

    #[test]
    fn polar_angle_is_clamped_above_ground() {
        let mut cam = IsometricCamera::default();
        let mut controls = OrbitControls::new(&cam);
        controls.rotate(0.0, -100_000.0, 800.0);
        for _ in 0..500 {
            controls.update(&mut cam);
        }
        assert!(controls.polar_angle() <= controls.max_polar);
        assert!(cam.offset.y > 0.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = IsometricCamera::default();
        let controls = OrbitControls::new(&cam);
        controls.zoom(&mut cam, 10.0);
        assert_eq!(cam.zoom, 3.0);
        controls.zoom(&mut cam, 0.01);
        assert_eq!(cam.zoom, 0.5);
        controls.zoom(&mut cam, -1.0);
        assert_eq!(cam.zoom, 0.5);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut cam = IsometricCamera::default();
        let mut controls = OrbitControls::new(&cam);
        controls.enabled = false;
        controls.rotate(100.0, 100.0, 800.0);
        controls.zoom(&mut cam, 2.0);
        assert!(controls.is_settled());
        assert_eq!(cam.zoom, 1.0);
    }
}
