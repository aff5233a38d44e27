// rig.rs — 围绕地球的轨道相机

use std::f32::consts::{PI, TAU};

/// Camera surface the view controller drives.
pub trait CameraRig {
    fn current_distance(&self) -> f32;
    fn set_azimuthal_angle(&mut self, radians: f32);
    fn set_polar_angle(&mut self, radians: f32);
    fn set_min_distance(&mut self, distance: f32);
    fn set_max_distance(&mut self, distance: f32);
    /// Applies pending changes. Returns true if the camera moved.
    fn update(&mut self) -> bool;
}

// 避免相机落在 Y 轴上，保证 look_at 的基向量有效
const POLE_EPS: f32 = 1e-4;

/// Orbit controls in spherical coordinates around the origin.
/// Polar angle 0 looks down from +Y; azimuth 0 sits on +Z.
#[derive(Debug, Clone)]
pub struct OrbitRig {
    azimuth: f32,
    polar: f32,
    distance: f32,
    pending_azimuth: f32,
    pending_polar: f32,

    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar: f32,
    pub max_polar: f32,

    pub rotate_speed: f32,
    pub enable_rotate: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,

    pub fov_y_deg: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for OrbitRig {
    fn default() -> Self {
        // 相机初始位于 (0, 0, 2.5)，看向原点
        Self {
            azimuth: 0.0,
            polar: PI / 2.0,
            distance: 2.5,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar: 0.0,
            max_polar: PI,
            rotate_speed: 0.5,
            enable_rotate: true,
            enable_zoom: false,
            enable_pan: false,
            fov_y_deg: 50.0,
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

impl OrbitRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    /// Queues a drag rotation. A drag across the full viewport height
    /// turns the globe by `rotate_speed` full revolutions.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !self.enable_rotate || viewport_height <= 0.0 {
            return;
        }
        self.pending_azimuth -= TAU * dx / viewport_height * self.rotate_speed;
        self.pending_polar -= TAU * dy / viewport_height * self.rotate_speed;
    }

    /// Scroll wheel input. Zoom is owned by the view presets, so this only
    /// does something if `enable_zoom` was switched on.
    pub fn zoom(&mut self, scroll: f32) {
        if !self.enable_zoom {
            return;
        }
        self.distance *= (-scroll * 0.1).exp();
    }

    pub fn eye(&self) -> glam::Vec3 {
        let sin_p = self.polar.sin();
        glam::Vec3::new(
            self.distance * sin_p * self.azimuth.sin(),
            self.distance * self.polar.cos(),
            self.distance * sin_p * self.azimuth.cos(),
        )
    }

    pub fn view_proj(&self, aspect: f32) -> glam::Mat4 {
        let view = glam::Mat4::look_at_rh(self.eye(), glam::Vec3::ZERO, glam::Vec3::Y);
        let proj = glam::Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            aspect.max(1e-3),
            self.z_near,
            self.z_far,
        );
        proj * view
    }
}

impl CameraRig for OrbitRig {
    fn current_distance(&self) -> f32 {
        self.distance
    }

    fn set_azimuthal_angle(&mut self, radians: f32) {
        self.azimuth = radians;
        self.pending_azimuth = 0.0;
    }

    fn set_polar_angle(&mut self, radians: f32) {
        self.polar = radians;
        self.pending_polar = 0.0;
    }

    fn set_min_distance(&mut self, distance: f32) {
        self.min_distance = distance;
    }

    fn set_max_distance(&mut self, distance: f32) {
        self.max_distance = distance;
    }

    fn update(&mut self) -> bool {
        let before = (self.azimuth, self.polar, self.distance);

        self.azimuth += self.pending_azimuth;
        self.polar += self.pending_polar;
        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;

        // 用 max/min 而不是 clamp：固定距离时上下限可能暂时交叉
        self.polar = self.min_polar.max(self.max_polar.min(self.polar));
        self.polar = self.polar.max(POLE_EPS).min(PI - POLE_EPS);
        self.distance = self.min_distance.max(self.max_distance.min(self.distance));

        before != (self.azimuth, self.polar, self.distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_front_of_globe() {
        let rig = OrbitRig::new();
        let eye = rig.eye();
        assert!(eye.x.abs() < 1e-5);
        assert!(eye.y.abs() < 1e-5);
        assert!((eye.z - 2.5).abs() < 1e-5);
    }

    #[test]
    fn pinned_bounds_move_camera_on_update() {
        let mut rig = OrbitRig::new();
        rig.set_min_distance(4.0);
        rig.set_max_distance(4.0);
        assert_eq!(rig.current_distance(), 2.5);
        assert!(rig.update());
        assert_eq!(rig.current_distance(), 4.0);
        assert!(!rig.update());
    }

    #[test]
    fn polar_is_kept_off_the_poles() {
        let mut rig = OrbitRig::new();
        rig.set_polar_angle(0.0);
        rig.update();
        assert!(rig.polar() > 0.0);
        let eye = rig.eye();
        assert!(eye.y > 2.49);

        let m = rig.view_proj(16.0 / 9.0);
        assert!(m.to_cols_array().iter().all(|v| v.is_finite()));

        rig.set_polar_angle(PI + 1.0);
        rig.update();
        assert!(rig.polar() < PI);
    }

    #[test]
    fn drag_rotates_with_speed_factor() {
        let mut rig = OrbitRig::new();
        rig.rotate(100.0, 0.0, 400.0);
        rig.update();
        let expected = -TAU * 100.0 / 400.0 * 0.5;
        assert!((rig.azimuth() - expected).abs() < 1e-5);
    }

    #[test]
    fn zoom_is_disabled() {
        let mut rig = OrbitRig::new();
        rig.zoom(3.0);
        rig.update();
        assert_eq!(rig.current_distance(), 2.5);
    }

    #[test]
    fn preset_angles_discard_pending_drag() {
        let mut rig = OrbitRig::new();
        rig.rotate(50.0, 50.0, 100.0);
        rig.set_azimuthal_angle(1.0);
        rig.set_polar_angle(1.0);
        rig.update();
        assert_eq!(rig.azimuth(), 1.0);
        assert_eq!(rig.polar(), 1.0);
    }
}
