//! Window and document listeners: the first gesture starts audio, pointer
//! moves steer the motes, scrolling picks the section.

use crate::dom::{self, Listener};
use crate::App;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

pub fn wire(app: &Rc<RefCell<App>>, window: &web::Window) -> Result<Vec<Listener>, JsValue> {
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let mut listeners = Vec::with_capacity(7);

    for kind in ["click", "keydown"] {
        let app = app.clone();
        listeners.push(Listener::new(window, kind, move |_| {
            crate::start_audio(app.clone());
        })?);
    }

    {
        let app = app.clone();
        let win = window.clone();
        listeners.push(Listener::new(window, "scroll", move |_| {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.scene.set_scroll(dom::page_scroll_progress(&win));
            }
        })?);
    }

    {
        let app = app.clone();
        listeners.push(Listener::new(window, "pointermove", move |ev| {
            let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                return;
            };
            if let Ok(mut app) = app.try_borrow_mut() {
                let ndc = dom::client_to_ndc(&app.canvas, ev.client_x() as f64, ev.client_y() as f64);
                app.pointer_ndc = Some(ndc);
            }
        })?);
    }

    if let Some(root) = document.document_element() {
        let app = app.clone();
        listeners.push(Listener::new(&root, "pointerleave", move |_| {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.pointer_ndc = None;
            }
        })?);
    }

    {
        let app = app.clone();
        listeners.push(Listener::new(window, "resize", move |_| {
            if let Ok(app) = app.try_borrow() {
                dom::sync_canvas_backing_size(&app.canvas);
            }
        })?);
    }

    {
        // a hidden tab must not integrate the whole gap on return
        let app = app.clone();
        listeners.push(Listener::new(&document, "visibilitychange", move |_| {
            if let Ok(mut app) = app.try_borrow_mut() {
                app.clock.pause();
            }
        })?);
    }

    Ok(listeners)
}
