use crate::action::ControlAction;
use glam::Vec3;
use rondavel_common::ViewportSize;
use rondavel_scene::PerspectiveCamera;
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;

/// Spherical coordinates about the Y axis: `phi` is the polar angle from +Y,
/// `theta` the azimuth from +Z towards +X.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
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

/// Orbits the camera around a target point.
///
/// Input only accumulates deltas; `update` applies them. With damping on,
/// each update applies `damping_factor` of the remaining delta and keeps the
/// rest, so motion eases out over following frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vec3,
    last_position: Vec3,
    last_target: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enabled: true,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            last_position: Vec3::ZERO,
            last_target: Vec3::ZERO,
        }
    }
}

impl OrbitControls {
    /// Controls bound to `camera`, orbiting its current look-at point.
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            target: camera.target,
            last_position: camera.position,
            last_target: camera.target,
            ..Self::default()
        }
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.enable_damping = true;
        self.damping_factor = factor;
        self
    }

    /// True while damped motion is still being applied.
    pub fn is_settling(&self) -> bool {
        self.spherical_delta.theta.abs() > EPS
            || self.spherical_delta.phi.abs() > EPS
            || self.pan_offset.length_squared() > EPS
    }

    /// Accumulate an input action. `surface` is the size of the element the
    /// pointer moves over; rotation and pan are relative to its height.
    pub fn handle(
        &mut self,
        action: ControlAction,
        camera: &PerspectiveCamera,
        surface: ViewportSize,
    ) {
        if !self.enabled || action.is_noop() {
            return;
        }
        let height = surface.height as f32;
        match action {
            ControlAction::Rotate { dx, dy } => {
                if height == 0.0 {
                    return;
                }
                self.rotate_left(TAU * dx / height * self.rotate_speed);
                self.rotate_up(TAU * dy / height * self.rotate_speed);
            }
            ControlAction::Pan { dx, dy } => {
                if height == 0.0 {
                    return;
                }
                let offset = camera.position - self.target;
                let target_distance =
                    offset.length() * (camera.fov_degrees() * 0.5).to_radians().tan();
                let world = camera.world_matrix();
                let (dx, dy) = (dx * self.pan_speed, dy * self.pan_speed);
                self.pan_offset += world.col(0).truncate() * -(2.0 * dx * target_distance / height);
                self.pan_offset += world.col(1).truncate() * (2.0 * dy * target_distance / height);
            }
            ControlAction::Zoom { delta_y } => {
                let zoom_scale = 0.95_f32.powf(self.zoom_speed);
                if delta_y < 0.0 {
                    self.scale *= zoom_scale;
                } else {
                    self.scale /= zoom_scale;
                }
            }
        }
        tracing::trace!("orbit input {action:?}");
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Apply pending motion to the camera. Returns whether it moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut spherical = Spherical::from_offset(offset);

        let step = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        spherical.theta += self.spherical_delta.theta * step;
        spherical.phi += self.spherical_delta.phi * step;
        // With min > max the upper limit wins.
        spherical.phi = spherical
            .phi
            .max(self.min_polar_angle)
            .min(self.max_polar_angle)
            .clamp(EPS, PI - EPS);
        spherical.radius = (spherical.radius * self.scale)
            .max(self.min_distance)
            .min(self.max_distance);

        self.target += self.pan_offset * step;
        camera.position = self.target + spherical.to_offset();
        camera.look_at(self.target);

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= keep;
            self.spherical_delta.phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        let moved = camera.position.distance_squared(self.last_position) > EPS
            || self.target.distance_squared(self.last_target) > EPS;
        self.last_position = camera.position;
        self.last_target = self.target;
        moved
    }
}
