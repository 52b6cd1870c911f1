/// A high-level camera input produced by any host (desktop window, headless
/// script, test).
///
/// Deltas are in logical pixels of the input surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    /// Orbit around the target by a pointer drag.
    Rotate { dx: f32, dy: f32 },
    /// Move the target in the screen plane by a pointer drag.
    Pan { dx: f32, dy: f32 },
    /// Dolly by a wheel delta. Negative values move towards the target.
    Zoom { delta_y: f32 },
}

impl ControlAction {
    /// Zero-length drags and wheel events carry no motion.
    pub fn is_noop(&self) -> bool {
        match *self {
            Self::Rotate { dx, dy } | Self::Pan { dx, dy } => dx == 0.0 && dy == 0.0,
            Self::Zoom { delta_y } => delta_y == 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_detection() {
        assert!(ControlAction::Rotate { dx: 0.0, dy: 0.0 }.is_noop());
        assert!(!ControlAction::Pan { dx: 1.0, dy: 0.0 }.is_noop());
        assert!(ControlAction::Zoom { delta_y: 0.0 }.is_noop());
        assert!(!ControlAction::Zoom { delta_y: -1.0 }.is_noop());
    }
}
