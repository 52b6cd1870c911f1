use rondavel_common::Color;

/// Physically based surface description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
}

impl StandardMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}
