use super::types::FrameError;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Something that runs a callback before the next repaint
pub trait FrameHost {
    type Handle;

    /// Queue `callback`; `None` when the host refused the request
    fn request(&self, callback: Box<dyn FnOnce()>) -> Option<Self::Handle>;

    fn cancel(&self, handle: Self::Handle);
}

/// `requestAnimationFrame` on the browser window
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserFrameHost;

impl FrameHost for BrowserFrameHost {
    type Handle = i32;

    fn request(&self, callback: Box<dyn FnOnce()>) -> Option<i32> {
        use wasm_bindgen::{closure::Closure, JsCast};

        let window = web_sys::window()?;
        // Freed by wasm-bindgen once it has been called
        let callback = Closure::once_into_js(callback);
        window.request_animation_frame(callback.unchecked_ref()).ok()
    }

    fn cancel(&self, handle: i32) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}

type FrameFn = Box<dyn FnMut() -> Result<(), FrameError>>;

struct LoopState<H: FrameHost> {
    host: H,
    frame: RefCell<FrameFn>,
    running: Cell<bool>,
    generation: Cell<u64>,
    pending: RefCell<Option<H::Handle>>,
}

/// A cancellable per-frame task.
///
/// Every `start` begins a new generation and every `stop` ends it, so a frame
/// callback that was queued before `stop` finds a stale generation and does nothing.
pub struct RenderLoop<H: FrameHost + 'static> {
    state: Rc<LoopState<H>>,
}

impl<H: FrameHost + 'static> RenderLoop<H> {
    pub fn new(host: H, frame: impl FnMut() -> Result<(), FrameError> + 'static) -> Self {
        Self {
            state: Rc::new(LoopState {
                host,
                frame: RefCell::new(Box::new(frame)),
                running: Cell::new(false),
                generation: Cell::new(0),
                pending: RefCell::new(None),
            }),
        }
    }

    pub fn start(&self) {
        if self.state.running.get() {
            return;
        }
        self.state.running.set(true);
        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);
        schedule(&self.state, generation);
    }

    pub fn stop(&self) {
        if !self.state.running.replace(false) {
            return;
        }
        self.state.generation.set(self.state.generation.get() + 1);
        if let Some(handle) = self.state.pending.borrow_mut().take() {
            self.state.host.cancel(handle);
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }
}

fn schedule<H: FrameHost + 'static>(state: &Rc<LoopState<H>>, generation: u64) {
    let weak: Weak<LoopState<H>> = Rc::downgrade(state);
    let handle = state.host.request(Box::new(move || {
        if let Some(state) = weak.upgrade() {
            tick(&state, generation);
        }
    }));
    *state.pending.borrow_mut() = handle;
}

fn tick<H: FrameHost + 'static>(state: &Rc<LoopState<H>>, generation: u64) {
    if !state.running.get() || state.generation.get() != generation {
        return;
    }
    state.pending.borrow_mut().take();

    let result = {
        let mut frame = state.frame.borrow_mut();
        (*frame)()
    };
    match result {
        Ok(()) | Err(FrameError::NotReady) => {}
        Err(FrameError::Draw(message)) => {
            leptos::logging::warn!("Frame draw failed: {message}");
        }
    }

    // The frame itself may have stopped the loop
    if state.running.get() && state.generation.get() == generation {
        schedule(state, generation);
    }
}
