use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` loop that can be cancelled from outside the
/// callback.
pub struct AnimationLoop {
    callback: FrameCallback,
    handle: Rc<Cell<Option<i32>>>,
}

impl AnimationLoop {
    pub fn start(mut on_frame: impl FnMut(f64) + 'static) -> Self {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(None));

        let callback_next = callback.clone();
        let handle_next = handle.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            on_frame(timestamp);
            handle_next.set(request(&callback_next));
        }) as Box<dyn FnMut(f64)>));

        handle.set(request(&callback));
        Self { callback, handle }
    }

    /// Cancel the pending frame and drop the callback, breaking the
    /// self-reference that keeps it alive.
    pub fn stop(&self) {
        if let (Some(id), Some(w)) = (self.handle.take(), web::window()) {
            let _ = w.cancel_animation_frame(id);
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request(callback: &FrameCallback) -> Option<i32> {
    let w = web::window()?;
    let cb = callback.borrow();
    let closure = cb.as_ref()?;
    w.request_animation_frame(closure.as_ref().unchecked_ref()).ok()
}
