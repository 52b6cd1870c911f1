use rondavel_common::NodeId;
use rondavel_scene::{SceneError, SceneGraph, SceneHandles};
use std::fmt;

/// Errors from reading or writing a slider.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("no slider named {0:?}")]
    UnknownSlider(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

type Getter = Box<dyn Fn(&SceneGraph) -> Result<f32, SceneError>>;
type Setter = Box<dyn Fn(&mut SceneGraph, f32) -> Result<(), SceneError>>;

/// A named numeric parameter of the scene with a range and a step.
pub struct SliderBinding {
    pub name: String,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    get: Getter,
    set: Setter,
}

impl SliderBinding {
    pub fn new(
        name: impl Into<String>,
        min: f32,
        max: f32,
        step: f32,
        get: impl Fn(&SceneGraph) -> Result<f32, SceneError> + 'static,
        set: impl Fn(&mut SceneGraph, f32) -> Result<(), SceneError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            step,
            get: Box::new(get),
            set: Box::new(set),
        }
    }

    /// Slider over a light's intensity.
    pub fn light_intensity(name: impl Into<String>, light: NodeId, min: f32, max: f32, step: f32) -> Self {
        Self::new(
            name,
            min,
            max,
            step,
            move |scene| Ok(scene.light(light)?.intensity()),
            move |scene, value| {
                scene.light_mut(light)?.set_intensity(value);
                Ok(())
            },
        )
    }

    /// Slider over one axis (0 = x, 1 = y, 2 = z) of a node's local position.
    pub fn position_axis(
        name: impl Into<String>,
        node: NodeId,
        axis: usize,
        min: f32,
        max: f32,
        step: f32,
    ) -> Self {
        Self::new(
            name,
            min,
            max,
            step,
            move |scene| {
                let n = scene.get(node).ok_or(SceneError::UnknownNode(node))?;
                Ok(n.transform.position[axis])
            },
            move |scene, value| {
                let n = scene.get_mut(node).ok_or(SceneError::UnknownNode(node))?;
                n.transform.position[axis] = value;
                Ok(())
            },
        )
    }

    /// Clamp into `[min, max]` and snap to the nearest multiple of `step`.
    pub fn quantize(&self, value: f32) -> f32 {
        let clamp = |v: f32| v.max(self.min).min(self.max);
        let clamped = clamp(value);
        if self.step <= 0.0 {
            return clamped;
        }
        clamp((clamped / self.step).round() * self.step)
    }

    pub fn get(&self, scene: &SceneGraph) -> Result<f32, SceneError> {
        (self.get)(scene)
    }

    /// Write a quantized value and return what was stored.
    pub fn set(&self, scene: &mut SceneGraph, value: f32) -> Result<f32, SceneError> {
        let value = self.quantize(value);
        (self.set)(scene, value)?;
        Ok(value)
    }
}

impl fmt::Debug for SliderBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliderBinding")
            .field("name", &self.name)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("step", &self.step)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for SliderBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {}] step {}", self.name, self.min, self.max, self.step)
    }
}

/// Registry of sliders, rendered by the desktop host and listed by the CLI.
#[derive(Debug, Default)]
pub struct DebugPanel {
    sliders: Vec<SliderBinding>,
}

impl DebugPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lighting sliders for an assembled scene.
    pub fn with_defaults(handles: &SceneHandles) -> Self {
        let mut panel = Self::new();
        panel
            .register(SliderBinding::light_intensity(
                "ambient intensity",
                handles.ambient,
                0.0,
                1.0,
                0.001,
            ))
            .register(SliderBinding::light_intensity(
                "moon intensity",
                handles.moon,
                0.0,
                1.0,
                0.001,
            ));
        for (axis, name) in ["moon x", "moon y", "moon z"].into_iter().enumerate() {
            panel.register(SliderBinding::position_axis(
                name,
                handles.moon,
                axis,
                -5.0,
                5.0,
                0.001,
            ));
        }
        panel
    }

    /// Add a slider. A slider with the same name is replaced.
    pub fn register(&mut self, binding: SliderBinding) -> &mut Self {
        if let Some(existing) = self.sliders.iter_mut().find(|s| s.name == binding.name) {
            tracing::warn!("replacing slider {:?}", binding.name);
            *existing = binding;
        } else {
            self.sliders.push(binding);
        }
        self
    }

    pub fn sliders(&self) -> &[SliderBinding] {
        &self.sliders
    }

    pub fn len(&self) -> usize {
        self.sliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sliders.is_empty()
    }

    fn slider(&self, name: &str) -> Result<&SliderBinding, PanelError> {
        self.sliders
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| PanelError::UnknownSlider(name.to_string()))
    }

    pub fn get(&self, scene: &SceneGraph, name: &str) -> Result<f32, PanelError> {
        Ok(self.slider(name)?.get(scene)?)
    }

    pub fn set(&self, scene: &mut SceneGraph, name: &str, value: f32) -> Result<f32, PanelError> {
        let stored = self.slider(name)?.set(scene, value)?;
        tracing::debug!("{name} = {stored}");
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rondavel_common::ViewportSize;
    use rondavel_scene::{Assembly, SceneConfig, assemble};

    fn setup() -> (Assembly, DebugPanel) {
        let a = assemble(&SceneConfig::default(), ViewportSize::new(800, 600)).unwrap();
        let panel = DebugPanel::with_defaults(&a.handles);
        (a, panel)
    }

    #[test]
    fn default_sliders() {
        let (_, panel) = setup();
        let names: Vec<&str> = panel.sliders().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            ["ambient intensity", "moon intensity", "moon x", "moon y", "moon z"]
        );
        assert_eq!(panel.sliders()[2].min, -5.0);
        assert_eq!(panel.sliders()[2].max, 5.0);
    }

    #[test]
    fn reads_assembled_values() {
        let (a, panel) = setup();
        assert_eq!(panel.get(&a.scene, "ambient intensity").unwrap(), 0.2);
        assert_eq!(panel.get(&a.scene, "moon intensity").unwrap(), 0.75);
        assert_eq!(panel.get(&a.scene, "moon x").unwrap(), 4.0);
        assert_eq!(panel.get(&a.scene, "moon y").unwrap(), 5.0);
        assert_eq!(panel.get(&a.scene, "moon z").unwrap(), -2.0);
    }

    #[test]
    fn set_clamps_to_range() {
        let (mut a, panel) = setup();
        assert_eq!(panel.set(&mut a.scene, "ambient intensity", 3.0).unwrap(), 1.0);
        assert_eq!(a.scene.light(a.handles.ambient).unwrap().intensity(), 1.0);
        assert_eq!(panel.set(&mut a.scene, "moon intensity", -0.5).unwrap(), 0.0);
        assert_eq!(panel.set(&mut a.scene, "moon x", 7.0).unwrap(), 5.0);
        assert_eq!(panel.set(&mut a.scene, "moon z", -9.0).unwrap(), -5.0);
    }

    #[test]
    fn set_snaps_to_step() {
        let (mut a, panel) = setup();
        let stored = panel.set(&mut a.scene, "moon intensity", 0.123_45).unwrap();
        assert!((stored - 0.123).abs() < 1e-6);
        let stored = panel.set(&mut a.scene, "moon y", 1.000_6).unwrap();
        assert!((stored - 1.001).abs() < 1e-6);
    }

    #[test]
    fn moving_the_moon_moves_its_node() {
        let (mut a, panel) = setup();
        panel.set(&mut a.scene, "moon x", -3.0).unwrap();
        let moon = a.scene.get(a.handles.moon).unwrap();
        let expected = glam::Vec3::new(-3.0, 5.0, -2.0);
        assert!((moon.transform.position - expected).length() < 1e-5);
    }

    #[test]
    fn unknown_slider_is_an_error() {
        let (mut a, panel) = setup();
        assert!(matches!(
            panel.set(&mut a.scene, "sun", 1.0),
            Err(PanelError::UnknownSlider(_))
        ));
    }

    #[test]
    fn stale_handle_surfaces_scene_error() {
        let (mut a, mut panel) = setup();
        panel.register(SliderBinding::light_intensity("ghost", NodeId::new(), 0.0, 1.0, 0.1));
        assert!(matches!(
            panel.get(&a.scene, "ghost"),
            Err(PanelError::Scene(SceneError::UnknownNode(_)))
        ));
        // a mesh is not a light
        panel.register(SliderBinding::light_intensity("floor", a.handles.floor, 0.0, 1.0, 0.1));
        assert!(matches!(
            panel.set(&mut a.scene, "floor", 0.5),
            Err(PanelError::Scene(SceneError::NotALight(_)))
        ));
    }

    #[test]
    fn register_replaces_same_name() {
        let (a, mut panel) = setup();
        panel.register(SliderBinding::light_intensity(
            "moon intensity",
            a.handles.moon,
            0.0,
            2.0,
            0.01,
        ));
        assert_eq!(panel.len(), 5);
        assert_eq!(panel.sliders()[1].max, 2.0);
    }

    #[test]
    fn zero_step_only_clamps() {
        let binding = SliderBinding::new("free", -1.0, 1.0, 0.0, |_| Ok(0.0), |_, _| Ok(()));
        assert_eq!(binding.quantize(0.123_456), 0.123_456);
        assert_eq!(binding.quantize(2.0), 1.0);
        assert_eq!(binding.to_string(), "free [-1, 1] step 0");
    }
}
