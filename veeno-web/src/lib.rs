/// Veeno Web - extruded text scene on an HTML canvas
///
/// The page owns the control panel UI and drives it through the
/// `control_*` and `set_control` methods of [`WebApp`].

pub mod animation;
pub mod console;
pub mod dom;
pub mod fetch;
pub mod painter;

use animation::AnimationLoop;
use dom::Listener;
use painter::Painter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;
use veeno_core::{AssetEvent, ControlEffect, ControlKind, ControlValue, SceneConfig, SceneController, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlCanvasElement, PointerEvent, WheelEvent};

/// Zoom factor per wheel notch
pub const WHEEL_ZOOM: f32 = 0.95;

fn js_error(error: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&error.to_string()).into()
}

pub fn effect_name(effect: ControlEffect) -> &'static str {
    match effect {
        ControlEffect::Unchanged => "unchanged",
        ControlEffect::Updated => "updated",
        ControlEffect::Rebuild => "rebuild",
    }
}

fn control_value_from_js(value: &JsValue) -> Option<ControlValue> {
    if let Some(number) = value.as_f64() {
        Some(ControlValue::Number(number as f32))
    } else if let Some(flag) = value.as_bool() {
        Some(ControlValue::Bool(flag))
    } else {
        value.as_string().map(ControlValue::Text)
    }
}

fn control_value_to_js(value: ControlValue) -> JsValue {
    match value {
        ControlValue::Number(number) => JsValue::from_f64(number as f64),
        ControlValue::Bool(flag) => JsValue::from_bool(flag),
        ControlValue::Text(text) => JsValue::from_str(&text),
    }
}

struct WebState {
    controller: SceneController,
    canvas: HtmlCanvasElement,
    painter: Painter,
    status: Option<String>,
}

impl WebState {
    fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) -> Result<(), JsValue> {
        self.controller
            .resize(width, height, device_pixel_ratio)
            .map_err(js_error)?;
        self.sync_canvas()
    }

    /// Size the backing store; this also resets the context transform
    fn sync_canvas(&self) -> Result<(), JsValue> {
        let viewport = self.controller.viewport();
        let (width, height) = viewport.backing_size();
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.painter.set_pixel_ratio(viewport.pixel_ratio)
    }

    fn frame(&mut self, now: f64) {
        for event in self.controller.tick(now) {
            match event {
                AssetEvent::FontLoaded { family, glyphs } => {
                    tracing::info!(%family, glyphs, "font ready");
                    self.status = None;
                }
                AssetEvent::MatcapLoaded => tracing::info!("matcap ready"),
                AssetEvent::ToonTextureLoaded => tracing::info!("toon texture ready"),
                AssetEvent::Failed { asset, error } => {
                    self.status = Some(format!("{asset}: {error}"));
                }
            }
        }
        let viewport = *self.controller.viewport();
        let triangles = self
            .controller
            .frame(viewport.width as f32, viewport.height as f32);
        self.painter.paint(
            &triangles,
            self.controller.scene().background,
            viewport.width as f32,
            viewport.height as f32,
        );
    }
}

#[wasm_bindgen]
pub struct WebApp {
    state: Rc<RefCell<WebState>>,
    animation: Option<AnimationLoop>,
    _listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl WebApp {
    /// Bind to the canvas with id `canvas_id`. `config_json` overrides the
    /// default scene configuration; asset paths are fetched relative to the
    /// page.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, config_json: Option<String>) -> Result<WebApp, JsValue> {
        let config = match config_json {
            Some(json) => SceneConfig::from_json(&json).map_err(js_error)?,
            None => SceneConfig::default(),
        };

        let window = dom::window()?;
        let canvas = dom::canvas(canvas_id)?;
        let painter = Painter::new(dom::context_2d(&canvas)?);
        let (width, height, ratio) = dom::window_size(&window)?;
        let viewport = Viewport::new(width.max(1), height.max(1), ratio).map_err(js_error)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut controller = SceneController::new(&config, viewport, &mut rng).map_err(js_error)?;
        controller.attach_font(fetch::fetch_font(&config.font));
        if let Some(matcap) = &config.matcap {
            controller.attach_matcap(fetch::fetch_matcap(matcap));
        }
        if let Some(texture) = &config.toon_texture {
            controller.attach_toon_texture(fetch::fetch_toon_texture(texture));
        }

        let state = WebState {
            controller,
            canvas: canvas.clone(),
            painter,
            status: None,
        };
        state.sync_canvas()?;
        let state = Rc::new(RefCell::new(state));

        let listeners = vec![
            Self::on_resize(&window, &state)?,
            Self::on_pointer_move(&canvas, &state)?,
            Self::on_wheel(&canvas, &state)?,
        ];

        tracing::info!(canvas = canvas_id, font = %config.font, "web app ready");
        Ok(WebApp {
            state,
            animation: None,
            _listeners: listeners,
        })
    }

    /// Start drawing every animation frame
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.is_running() {
            return Ok(());
        }
        let state = Rc::clone(&self.state);
        self.animation = Some(AnimationLoop::start(move |now| {
            if let Ok(mut state) = state.try_borrow_mut() {
                state.frame(now);
            }
        })?);
        Ok(())
    }

    /// Cancel the pending frame; `start` resumes
    pub fn stop(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.animation.as_ref().is_some_and(AnimationLoop::is_running)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().controller.is_loading()
    }

    /// Last asset failure, if any
    pub fn status(&self) -> Option<String> {
        self.state.borrow().status.clone()
    }

    pub fn resize(&self, width: u32, height: u32, device_pixel_ratio: f32) -> Result<(), JsValue> {
        self.state.borrow_mut().resize(width, height, device_pixel_ratio)
    }

    pub fn control_count(&self) -> usize {
        self.state.borrow().controller.control_count()
    }

    /// Folder-qualified label, e.g. `TEXT/size`
    pub fn control_label(&self, index: usize) -> Option<String> {
        self.state.borrow().controller.control(index).map(|control| control.path())
    }

    /// `slider`, `toggle` or `text`
    pub fn control_kind(&self, index: usize) -> Option<String> {
        let state = self.state.borrow();
        let kind = match &state.controller.control(index)?.kind {
            ControlKind::Slider { .. } => "slider",
            ControlKind::Toggle => "toggle",
            ControlKind::TextInput => "text",
        };
        Some(kind.to_string())
    }

    /// `[min, max, step]` of a slider
    pub fn control_range(&self, index: usize) -> Option<Vec<f32>> {
        let state = self.state.borrow();
        match &state.controller.control(index)?.kind {
            ControlKind::Slider { range, step } => Some(vec![*range.start(), *range.end(), *step]),
            _ => None,
        }
    }

    pub fn control_value(&self, index: usize) -> Result<JsValue, JsValue> {
        let value = self
            .state
            .borrow()
            .controller
            .control_value(index)
            .map_err(js_error)?;
        Ok(control_value_to_js(value))
    }

    /// Apply a panel edit. Returns `unchanged`, `updated` or `rebuild`.
    pub fn set_control(&self, index: usize, value: JsValue) -> Result<String, JsValue> {
        let value = control_value_from_js(&value)
            .ok_or_else(|| js_error(format!("control {index}: unsupported value {value:?}")))?;
        let effect = self
            .state
            .borrow_mut()
            .controller
            .apply_control(index, value)
            .map_err(js_error)?;
        Ok(effect_name(effect).to_string())
    }

    pub fn nudge_control(&self, index: usize, steps: i32) -> Result<String, JsValue> {
        let effect = self
            .state
            .borrow_mut()
            .controller
            .nudge_control(index, steps)
            .map_err(js_error)?;
        Ok(effect_name(effect).to_string())
    }
}

impl WebApp {
    fn on_resize(window: &web_sys::Window, state: &Rc<RefCell<WebState>>) -> Result<Listener, JsValue> {
        let state = Rc::clone(state);
        let source = window.clone();
        Listener::add(window, "resize", move |_: Event| {
            let Ok(mut state) = state.try_borrow_mut() else {
                return;
            };
            let resized = dom::window_size(&source).and_then(|(w, h, ratio)| state.resize(w, h, ratio));
            if let Err(error) = resized {
                tracing::debug!(error = %fetch::describe(&error), "ignoring resize");
            }
        })
    }

    fn on_pointer_move(canvas: &HtmlCanvasElement, state: &Rc<RefCell<WebState>>) -> Result<Listener, JsValue> {
        let state = Rc::clone(state);
        Listener::add(canvas, "pointermove", move |event: Event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            let Ok(mut state) = state.try_borrow_mut() else {
                return;
            };
            let controller = &mut state.controller;
            controller.pointer_moved(event.offset_x() as f32, event.offset_y() as f32);
            // Primary button held: orbit by a full turn per viewport height
            if event.buttons() & 1 != 0 {
                let height = controller.viewport().height as f32;
                controller.orbit(
                    TAU * event.movement_x() as f32 / height,
                    TAU * event.movement_y() as f32 / height,
                );
            }
        })
    }

    fn on_wheel(canvas: &HtmlCanvasElement, state: &Rc<RefCell<WebState>>) -> Result<Listener, JsValue> {
        let state = Rc::clone(state);
        Listener::add(canvas, "wheel", move |event: Event| {
            let Some(event) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            event.prevent_default();
            if let Ok(mut state) = state.try_borrow_mut() {
                let factor = if event.delta_y() > 0.0 { WHEEL_ZOOM } else { 1.0 / WHEEL_ZOOM };
                state.controller.zoom(factor);
            }
        })
    }
}

impl Drop for WebApp {
    fn drop(&mut self) {
        self.stop();
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console::init(tracing::Level::INFO);
    Ok(())
}
