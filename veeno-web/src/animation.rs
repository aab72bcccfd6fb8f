/// `requestAnimationFrame` loop that can be stopped
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Self-scheduling frame callback. The closure lives in `callback` and
/// re-registers itself every frame; `stop` cancels the pending frame and
/// drops the closure, which breaks the reference cycle.
pub struct AnimationLoop {
    callback: Rc<RefCell<Option<FrameCallback>>>,
    pending: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    /// Call `tick` with the frame timestamp in seconds until stopped
    pub fn start(mut tick: impl FnMut(f64) + 'static) -> Result<Self, JsValue> {
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));

        let next = Rc::clone(&callback);
        let next_pending = Rc::clone(&pending);
        *callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
            next_pending.set(None);
            tick(timestamp / 1000.0);
            if let Some(closure) = next.borrow().as_ref() {
                match request_frame(closure) {
                    Ok(id) => next_pending.set(Some(id)),
                    Err(error) => tracing::error!(?error, "requestAnimationFrame failed"),
                }
            }
        }));

        if let Some(closure) = callback.borrow().as_ref() {
            pending.set(Some(request_frame(closure)?));
        }
        tracing::debug!("animation loop started");
        Ok(Self { callback, pending })
    }

    pub fn is_running(&self) -> bool {
        self.callback.borrow().is_some()
    }

    pub fn stop(&self) {
        if let Some(id) = self.pending.take() {
            if let Some(window) = web_sys::window() {
                if let Err(error) = window.cancel_animation_frame(id) {
                    tracing::warn!(?error, "cancelAnimationFrame failed");
                }
            }
        }
        if self.callback.borrow_mut().take().is_some() {
            tracing::debug!("animation loop stopped");
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_frame(closure: &FrameCallback) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(closure.as_ref().unchecked_ref())
}
