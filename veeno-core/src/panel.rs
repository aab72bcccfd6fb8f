/// Debug panel: the list of live-editable controls and their bindings
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::light::Lights;
use crate::params::{snap, TextField, TextParams};
use crate::projection::Camera;

const POSITION_RANGE: RangeInclusive<f32> = -10.0..=10.0;
const INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=10.0;
const FINE_STEP: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// The field a control reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    AmbientPosition(Axis),
    AmbientIntensity,
    PointPosition(Axis),
    PointIntensity,
    CameraPosition(Axis),
    Text(TextField),
}

impl Binding {
    pub fn read(&self, lights: &Lights, camera: &Camera, params: &TextParams) -> ControlValue {
        match *self {
            Binding::AmbientPosition(axis) => ControlValue::Number(lights.ambient.position[axis.index()]),
            Binding::AmbientIntensity => ControlValue::Number(lights.ambient.intensity),
            Binding::PointPosition(axis) => ControlValue::Number(lights.point.position[axis.index()]),
            Binding::PointIntensity => ControlValue::Number(lights.point.intensity),
            Binding::CameraPosition(axis) => ControlValue::Number(camera.position[axis.index()]),
            Binding::Text(TextField::Text) => ControlValue::Text(params.text.clone()),
            Binding::Text(TextField::BevelEnabled) => ControlValue::Bool(params.bevel_enabled),
            Binding::Text(field) => ControlValue::Number(params.number(field).unwrap_or_default()),
        }
    }

    fn slot<'a>(&self, target: &'a mut Bound<'_>) -> Option<&'a mut f32> {
        match *self {
            Binding::AmbientPosition(axis) => Some(&mut target.lights.ambient.position[axis.index()]),
            Binding::AmbientIntensity => Some(&mut target.lights.ambient.intensity),
            Binding::PointPosition(axis) => Some(&mut target.lights.point.position[axis.index()]),
            Binding::PointIntensity => Some(&mut target.lights.point.intensity),
            Binding::CameraPosition(axis) => Some(&mut target.camera.position[axis.index()]),
            Binding::Text(_) => None,
        }
    }
}

/// Mutable view of everything the panel edits
pub struct Bound<'a> {
    pub lights: &'a mut Lights,
    pub camera: &'a mut Camera,
    pub params: &'a mut TextParams,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Slider {
        range: RangeInclusive<f32>,
        step: f32,
    },
    Toggle,
    TextInput,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlValue {
    Number(f32),
    Bool(bool),
    Text(String),
}

impl fmt::Display for ControlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlValue::Number(value) => write!(f, "{value:.2}"),
            ControlValue::Bool(value) => write!(f, "{value}"),
            ControlValue::Text(value) => write!(f, "{value:?}"),
        }
    }
}

/// What the caller has to do after a control was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEffect {
    Unchanged,
    /// A light or camera field changed; picked up on the next frame
    Updated,
    /// A text parameter changed; the text mesh must be rebuilt
    Rebuild,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub label: &'static str,
    pub folder: Option<&'static str>,
    pub binding: Binding,
    pub kind: ControlKind,
}

impl Control {
    fn slider(label: &'static str, folder: Option<&'static str>, binding: Binding, range: RangeInclusive<f32>, step: f32) -> Self {
        Self {
            label,
            folder,
            binding,
            kind: ControlKind::Slider { range, step },
        }
    }

    /// Label prefixed with its folder, e.g. `TEXT/size`
    pub fn path(&self) -> String {
        match self.folder {
            Some(folder) => format!("{folder}/{}", self.label),
            None => self.label.to_string(),
        }
    }
}

/// Ordered list of controls
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    controls: Vec<Control>,
}

impl Panel {
    /// Lights, then the `CAMERA` folder, then the `TEXT` folder
    pub fn standard() -> Self {
        let mut controls = Vec::new();
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            controls.push(Control::slider(axis.label(), None, Binding::AmbientPosition(axis), POSITION_RANGE, FINE_STEP));
        }
        controls.push(Control::slider("intensity", None, Binding::AmbientIntensity, INTENSITY_RANGE, FINE_STEP));
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            controls.push(Control::slider(axis.label(), None, Binding::PointPosition(axis), POSITION_RANGE, FINE_STEP));
        }
        controls.push(Control::slider("intensity", None, Binding::PointIntensity, INTENSITY_RANGE, FINE_STEP));
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            controls.push(Control::slider(axis.label(), Some("CAMERA"), Binding::CameraPosition(axis), POSITION_RANGE, FINE_STEP));
        }
        for field in TextField::ALL {
            let binding = Binding::Text(field);
            let control = match field.range() {
                Some(range) => Control::slider(field.label(), Some("TEXT"), binding, range, field.step()),
                None => Control {
                    label: field.label(),
                    folder: Some("TEXT"),
                    binding,
                    kind: if field == TextField::BevelEnabled {
                        ControlKind::Toggle
                    } else {
                        ControlKind::TextInput
                    },
                },
            };
            controls.push(control);
        }
        Self { controls }
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Control> {
        self.controls.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Control> {
        self.controls.iter()
    }

    fn control(&self, index: usize) -> Result<&Control> {
        self.controls.get(index).ok_or(Error::UnknownControl(index))
    }

    pub fn value(&self, index: usize, lights: &Lights, camera: &Camera, params: &TextParams) -> Result<ControlValue> {
        Ok(self.control(index)?.binding.read(lights, camera, params))
    }

    /// Write `value` to the bound field, clamped and snapped for sliders
    pub fn apply(&self, index: usize, value: ControlValue, mut target: Bound<'_>) -> Result<ControlEffect> {
        let control = self.control(index)?;
        let mismatch = |value: &ControlValue| Error::ControlType {
            label: control.label,
            value: value.to_string(),
        };

        let effect = match (&control.kind, control.binding, &value) {
            (ControlKind::Slider { .. }, Binding::Text(field), ControlValue::Number(number)) => {
                rebuild_if(target.params.set_number(field, *number)?)
            }
            (ControlKind::Slider { range, step }, binding, ControlValue::Number(number)) => {
                if !number.is_finite() {
                    return Err(mismatch(&value));
                }
                let snapped = snap(*number, range, *step);
                match binding.slot(&mut target) {
                    Some(slot) if *slot != snapped => {
                        *slot = snapped;
                        ControlEffect::Updated
                    }
                    _ => ControlEffect::Unchanged,
                }
            }
            (ControlKind::Toggle, Binding::Text(TextField::BevelEnabled), ControlValue::Bool(enabled)) => {
                rebuild_if(target.params.set_bevel_enabled(*enabled))
            }
            (ControlKind::TextInput, Binding::Text(TextField::Text), ControlValue::Text(text)) => {
                rebuild_if(target.params.set_text(text))
            }
            _ => return Err(mismatch(&value)),
        };

        if effect != ControlEffect::Unchanged {
            tracing::debug!(control = %control.path(), %value, ?effect, "control applied");
        }
        Ok(effect)
    }

    /// Move a slider by `steps` increments or flip a toggle
    pub fn nudge(&self, index: usize, steps: i32, target: Bound<'_>) -> Result<ControlEffect> {
        let control = self.control(index)?;
        let current = control.binding.read(target.lights, target.camera, target.params);
        let value = match (&control.kind, current) {
            (ControlKind::Slider { step, .. }, ControlValue::Number(number)) => {
                ControlValue::Number(number + steps as f32 * step)
            }
            (ControlKind::Toggle, ControlValue::Bool(enabled)) if steps != 0 => ControlValue::Bool(!enabled),
            _ => return Ok(ControlEffect::Unchanged),
        };
        self.apply(index, value, target)
    }
}

fn rebuild_if(changed: bool) -> ControlEffect {
    if changed {
        ControlEffect::Rebuild
    } else {
        ControlEffect::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct State {
        lights: Lights,
        camera: Camera,
        params: TextParams,
    }

    impl State {
        fn new() -> Self {
            Self {
                lights: Lights::default(),
                camera: Camera::default(),
                params: TextParams::default(),
            }
        }

        fn bound(&mut self) -> Bound<'_> {
            Bound {
                lights: &mut self.lights,
                camera: &mut self.camera,
                params: &mut self.params,
            }
        }
    }

    fn index_of(panel: &Panel, path: &str) -> usize {
        panel.iter().position(|c| c.path() == path).unwrap()
    }

    #[test]
    fn test_standard_layout() {
        let panel = Panel::standard();
        assert_eq!(panel.len(), 20);
        let paths: Vec<String> = panel.iter().map(Control::path).collect();
        assert_eq!(&paths[..4], ["x", "y", "z", "intensity"]);
        assert_eq!(paths[8], "CAMERA/x");
        assert_eq!(paths[11], "TEXT/text");
        assert_eq!(paths[19], "TEXT/bevelSegments");
        assert_eq!(panel.get(15).unwrap().kind, ControlKind::Toggle);
    }

    #[test]
    fn test_text_controls_request_rebuild() {
        let panel = Panel::standard();
        let mut state = State::new();

        let size = index_of(&panel, "TEXT/size");
        let effect = panel.apply(size, ControlValue::Number(1.234), state.bound()).unwrap();
        assert_eq!(effect, ControlEffect::Rebuild);
        assert_relative_eq!(state.params.size, 1.23, epsilon = 1e-5);

        let text = index_of(&panel, "TEXT/text");
        let effect = panel.apply(text, ControlValue::Text("hello".into()), state.bound()).unwrap();
        assert_eq!(effect, ControlEffect::Rebuild);
        let effect = panel.apply(text, ControlValue::Text("hello".into()), state.bound()).unwrap();
        assert_eq!(effect, ControlEffect::Unchanged);
    }

    #[test]
    fn test_light_controls_update_in_place() {
        let panel = Panel::standard();
        let mut state = State::new();

        let effect = panel.apply(7, ControlValue::Number(25.0), state.bound()).unwrap();
        assert_eq!(effect, ControlEffect::Updated);
        assert_relative_eq!(state.lights.point.intensity, 10.0, epsilon = 1e-5);

        let effect = panel.apply(8, ControlValue::Number(-4.5), state.bound()).unwrap();
        assert_eq!(effect, ControlEffect::Updated);
        assert_relative_eq!(state.camera.position.x, -4.5, epsilon = 1e-5);
    }

    #[test]
    fn test_nudge_steps_and_toggles() {
        let panel = Panel::standard();
        let mut state = State::new();

        let segments = index_of(&panel, "TEXT/bevelSegments");
        panel.nudge(segments, 3, state.bound()).unwrap();
        assert_eq!(state.params.bevel_segments, 7);
        panel.nudge(segments, -100, state.bound()).unwrap();
        assert_eq!(state.params.bevel_segments, 1);

        let bevel = index_of(&panel, "TEXT/bevelEnabled");
        assert_eq!(panel.nudge(bevel, 1, state.bound()).unwrap(), ControlEffect::Rebuild);
        assert!(!state.params.bevel_enabled);

        let text = index_of(&panel, "TEXT/text");
        assert_eq!(panel.nudge(text, 1, state.bound()).unwrap(), ControlEffect::Unchanged);
    }

    #[test]
    fn test_mismatched_values_are_rejected() {
        let panel = Panel::standard();
        let mut state = State::new();
        assert!(matches!(
            panel.apply(15, ControlValue::Number(1.0), state.bound()),
            Err(Error::ControlType { label: "bevelEnabled", .. })
        ));
        assert!(matches!(
            panel.apply(99, ControlValue::Bool(true), state.bound()),
            Err(Error::UnknownControl(99))
        ));
        assert_eq!(state.params, TextParams::default());
    }

    #[test]
    fn test_value_reads_bound_fields() {
        let panel = Panel::standard();
        let state = State::new();
        let value = panel.value(11, &state.lights, &state.camera, &state.params).unwrap();
        assert_eq!(value, ControlValue::Text("veeno".into()));
        let value = panel.value(3, &state.lights, &state.camera, &state.params).unwrap();
        assert_eq!(value, ControlValue::Number(1.4));
    }
}
