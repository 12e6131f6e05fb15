//! Deferred layout retry for containers that are not laid out yet.
//!
//! A single timer is armed at a time: re-arming cancels the pending one, and
//! tearing down cancels it and ignores any tick that still slips through.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[derive(Default)]
struct TimerState {
    handle: Option<i32>,
    callback: Option<Function>,
    tick: Option<Closure<dyn FnMut()>>,
    torn_down: bool,
}

#[derive(Default)]
pub(crate) struct DeferredLayout {
    state: Rc<RefCell<TimerState>>,
}

impl DeferredLayout {
    /// Run `callback` after `delay_ms`, replacing any pending run.
    pub(crate) fn schedule(&self, callback: Function, delay_ms: i32) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut s = self.state.borrow_mut();
        if s.torn_down {
            return;
        }
        if let Some(handle) = s.handle.take() {
            window.clear_timeout_with_handle(handle);
        }
        s.callback = Some(callback);
        if s.tick.is_none() {
            let weak_state = Rc::downgrade(&self.state);
            let tick = Closure::wrap(Box::new(move || {
                if let Some(state) = weak_state.upgrade() {
                    Self::fire(&state);
                }
            }) as Box<dyn FnMut()>);
            s.tick = Some(tick);
        }
        let Some(tick) = s.tick.as_ref() else {
            return;
        };
        s.handle = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                delay_ms.max(0),
            )
            .ok();
    }

    fn fire(state: &Rc<RefCell<TimerState>>) {
        let callback = {
            let mut s = state.borrow_mut();
            s.handle = None;
            if s.torn_down {
                return;
            }
            s.callback.take()
        };
        // The callback may schedule again, so no borrow is held here.
        if let Some(callback) = callback {
            if let Err(err) = callback.call0(&JsValue::NULL) {
                log::warn!("deferred layout callback failed: {err:?}");
            }
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.state.borrow().handle.is_some()
    }

    /// Cancel the pending run, if any.
    pub(crate) fn cancel(&self) {
        let mut s = self.state.borrow_mut();
        if let Some(handle) = s.handle.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
        s.callback = None;
    }

    /// Cancel and refuse any further scheduling.
    pub(crate) fn tear_down(&self) {
        self.cancel();
        self.state.borrow_mut().torn_down = true;
    }
}

impl Drop for DeferredLayout {
    fn drop(&mut self) {
        self.tear_down();
    }
}
