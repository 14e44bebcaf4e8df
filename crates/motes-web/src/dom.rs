use glam::Vec2;
use motes_core::{pixel_to_ndc, scroll_progress, DeviceHints};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) {
    if let Some(w) = web::window() {
        let dpr = w.device_pixel_ratio();
        let rect = canvas.get_bounding_client_rect();
        canvas.set_width(((rect.width() * dpr) as u32).max(1));
        canvas.set_height(((rect.height() * dpr) as u32).max(1));
    }
}

/// Pointer position in NDC relative to the canvas, `y` up.
pub fn client_to_ndc(canvas: &web::HtmlCanvasElement, client_x: f64, client_y: f64) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    pixel_to_ndc(
        (client_x - rect.left()) as f32,
        (client_y - rect.top()) as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

pub fn page_scroll_progress(window: &web::Window) -> f32 {
    let scroll_top = window.scroll_y().unwrap_or(0.0) as f32;
    let viewport = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0) as f32;
    let content = window
        .document()
        .and_then(|d| d.document_element())
        .map(|el| el.scroll_height() as f32)
        .unwrap_or(0.0);
    scroll_progress(scroll_top, content, viewport)
}

pub fn device_hints(window: &web::Window) -> DeviceHints {
    let navigator = window.navigator();
    // deviceMemory is Chromium-only and not in web-sys
    let memory = js_sys::Reflect::get(&navigator, &JsValue::from_str("deviceMemory"))
        .ok()
        .and_then(|v| v.as_f64());
    DeviceHints {
        device_memory_gb: memory.map(|m| m as f32),
        mobile: navigator
            .user_agent()
            .map(|ua| DeviceHints::is_mobile_user_agent(&ua))
            .unwrap_or(false),
    }
}

/// An event listener that detaches itself when dropped.
pub struct Listener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Listener {
    pub fn new(
        target: &web::EventTarget,
        kind: &'static str,
        handler: impl FnMut(web::Event) + 'static,
    ) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}
