use glam::{Mat4, Vec3};
use rondavel_common::Color;

/// Orthographic shadow camera of a directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalShadow {
    pub map_size: u32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
    pub bias: f32,
}

impl Default for DirectionalShadow {
    fn default() -> Self {
        Self {
            map_size: 512,
            left: -5.0,
            right: 5.0,
            bottom: -5.0,
            top: 5.0,
            near: 0.5,
            far: 500.0,
            bias: 0.0,
        }
    }
}

impl DirectionalShadow {
    /// Light-space view-projection for a light at `position` aimed at `target`.
    pub fn view_projection(&self, position: Vec3, target: Vec3) -> Mat4 {
        let dir = (target - position).normalize_or_zero();
        // look_at degenerates when the light points straight down the up axis.
        let up = if dir.abs_diff_eq(Vec3::NEG_Y, 1e-4) || dir.abs_diff_eq(Vec3::Y, 1e-4) {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(position, target, up);
        let proj = Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        );
        proj * view
    }
}

/// Light sources. A light's position comes from its node's transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Uniform light from every direction; casts no shadows.
    Ambient { color: Color, intensity: f32 },
    /// Parallel light travelling from the node position towards `target`.
    Directional {
        color: Color,
        intensity: f32,
        target: Vec3,
        shadow: DirectionalShadow,
    },
}

impl Light {
    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self::Ambient { color, intensity }
    }

    pub fn directional(color: Color, intensity: f32) -> Self {
        Self::Directional {
            color,
            intensity,
            target: Vec3::ZERO,
            shadow: DirectionalShadow::default(),
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Ambient { color, .. } | Self::Directional { color, .. } => *color,
        }
    }

    pub fn intensity(&self) -> f32 {
        match self {
            Self::Ambient { intensity, .. } | Self::Directional { intensity, .. } => *intensity,
        }
    }

    pub fn set_intensity(&mut self, value: f32) {
        match self {
            Self::Ambient { intensity, .. } | Self::Directional { intensity, .. } => {
                *intensity = value
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadow_camera_maps_target_into_clip_volume() {
        let shadow = DirectionalShadow::default();
        let vp = shadow.view_projection(Vec3::new(4.0, 5.0, -2.0), Vec3::ZERO);
        let clip = vp.project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-4 && clip.y.abs() < 1e-4);
        assert!(clip.z > 0.0 && clip.z < 1.0);
    }

    #[test]
    fn shadow_camera_handles_vertical_light() {
        let shadow = DirectionalShadow::default();
        let vp = shadow.view_projection(Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn intensity_accessors() {
        let mut l = Light::directional(Color::WHITE, 0.75);
        assert_eq!(l.intensity(), 0.75);
        l.set_intensity(0.1);
        assert_eq!(l.intensity(), 0.1);
        assert_eq!(l.color(), Color::WHITE);
    }
}
