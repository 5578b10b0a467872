use super::dom::{self, Listener};
use crate::animation::Easing;
use crate::error::InteractionError;
use crate::frame::{FrameScheduler, FrameTask};
use crate::geometry::AxisExtent;
use crate::source::{Listeners, ScrollBehavior, ScrollSource, Subscription};
use js_sys::{Array, Function, Object, Reflect};
use std::ops::ControlFlow;
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Event, HtmlElement, ScrollBehavior as DomScrollBehavior, ScrollToOptions, Window};

const LENIS_DURATION_S: f64 = 1.0;
const LENIS_TOUCH_MULTIPLIER: f64 = 1.5;

fn dom_behavior(behavior: ScrollBehavior) -> DomScrollBehavior {
    match behavior {
        ScrollBehavior::Immediate => DomScrollBehavior::Instant,
        ScrollBehavior::Smooth => DomScrollBehavior::Smooth,
    }
}

fn document_extent(window: &Window) -> AxisExtent {
    let content = window
        .document()
        .and_then(|d| d.document_element())
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(0.0);
    let viewport = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);

    AxisExtent { content, viewport }
}

/// Page scroll driven by `window.Lenis`.
pub struct LenisSource {
    window: Window,
    lenis: JsValue,
    listeners: Listeners,
    raf: FrameTask,
    _on_scroll: Closure<dyn FnMut(JsValue)>,
    _easing: Closure<dyn Fn(f64) -> f64>,
}

impl LenisSource {
    pub fn create(frames: Rc<dyn FrameScheduler>) -> Result<Self, InteractionError> {
        let window = dom::window()?;
        let constructor = Reflect::get(&window, &JsValue::from_str("Lenis"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or(InteractionError::ScrollEngineUnavailable)?;

        let easing = Closure::<dyn Fn(f64) -> f64>::new(|t: f64| Easing::ExpoOut.apply(t));
        let options = Object::new();
        let _ = Reflect::set(&options, &"duration".into(), &JsValue::from_f64(LENIS_DURATION_S));
        let _ = Reflect::set(&options, &"easing".into(), easing.as_ref());
        let _ = Reflect::set(&options, &"smoothTouch".into(), &JsValue::TRUE);
        let _ = Reflect::set(
            &options,
            &"touchMultiplier".into(),
            &JsValue::from_f64(LENIS_TOUCH_MULTIPLIER),
        );

        let lenis = Reflect::construct(&constructor, &Array::of1(&options))
            .map_err(|_| InteractionError::Js { call: "new Lenis" })?;

        let listeners = Listeners::new();
        let fanout = listeners.clone();
        let on_scroll = Closure::<dyn FnMut(JsValue)>::new(move |instance: JsValue| {
            if let Some(position) = dom::get_f64(&instance, "scroll") {
                fanout.emit(position);
            }
        });
        let handler: &JsValue = on_scroll.as_ref();
        dom::call_method(&lenis, "on", &[JsValue::from_str("scroll"), handler.clone()])?;

        let driver = lenis.clone();
        let raf = FrameTask::spawn(frames, move |timestamp| {
            let _ = dom::call_method(&driver, "raf", &[JsValue::from_f64(timestamp)]);
            ControlFlow::Continue(())
        });

        Ok(Self {
            window,
            lenis,
            listeners,
            raf,
            _on_scroll: on_scroll,
            _easing: easing,
        })
    }
}

impl ScrollSource for LenisSource {
    fn position(&self) -> f64 {
        dom::get_f64(&self.lenis, "scroll").unwrap_or(0.0)
    }

    fn set_position(&self, position: f64, behavior: ScrollBehavior) {
        let flags = behavior.engine_options();
        let options = Object::new();
        let _ = Reflect::set(&options, &"immediate".into(), &JsValue::from_bool(flags.immediate));
        let _ = Reflect::set(&options, &"force".into(), &JsValue::from_bool(flags.force));
        let _ = dom::call_method(
            &self.lenis,
            "scrollTo",
            &[JsValue::from_f64(position), options.into()],
        );
    }

    fn extent(&self) -> AxisExtent {
        document_extent(&self.window)
    }

    fn subscribe(&self, listener: Rc<dyn Fn(f64)>) -> Subscription {
        self.listeners.add(listener)
    }

    fn pause(&self) {
        let _ = dom::call_method(&self.lenis, "stop", &[]);
    }

    fn resume(&self) {
        let _ = dom::call_method(&self.lenis, "start", &[]);
    }

    fn refresh(&self) {
        let _ = dom::call_method(&self.lenis, "resize", &[]);
        self.listeners.emit(self.position());
    }
}

impl Drop for LenisSource {
    fn drop(&mut self) {
        self.raf.cancel();
    }
}

/// Native window scrolling, used when Lenis is not on the page.
pub struct WindowSource {
    window: Window,
    listeners: Listeners,
    _scroll: Listener,
}

impl WindowSource {
    pub fn create() -> Result<Self, InteractionError> {
        let window = dom::window()?;
        let listeners = Listeners::new();

        let fanout = listeners.clone();
        let reader = window.clone();
        let scroll = Listener::new(&window, "scroll", true, move |_: Event| {
            fanout.emit(reader.scroll_y().unwrap_or(0.0));
        });

        Ok(Self {
            window,
            listeners,
            _scroll: scroll,
        })
    }
}

impl ScrollSource for WindowSource {
    fn position(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn set_position(&self, position: f64, behavior: ScrollBehavior) {
        let options = ScrollToOptions::new();
        options.set_top(position);
        options.set_behavior(dom_behavior(behavior));
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    fn extent(&self) -> AxisExtent {
        document_extent(&self.window)
    }

    fn subscribe(&self, listener: Rc<dyn Fn(f64)>) -> Subscription {
        self.listeners.add(listener)
    }

    // Native scrolling has no inertia to suspend.
    fn pause(&self) {}

    fn resume(&self) {}

    fn refresh(&self) {
        self.listeners.emit(self.position());
    }
}

/// Horizontal scroll offset of an overflowing element.
pub struct ElementSource {
    element: HtmlElement,
    listeners: Listeners,
    _scroll: Listener,
}

impl ElementSource {
    pub fn horizontal(element: HtmlElement) -> Self {
        let listeners = Listeners::new();

        let fanout = listeners.clone();
        let reader = element.clone();
        let scroll = Listener::new(&element, "scroll", true, move |_: Event| {
            fanout.emit(dom::get_f64(&reader, "scrollLeft").unwrap_or(0.0));
        });

        Self {
            element,
            listeners,
            _scroll: scroll,
        }
    }
}

impl ScrollSource for ElementSource {
    fn position(&self) -> f64 {
        dom::get_f64(&self.element, "scrollLeft").unwrap_or(0.0)
    }

    fn set_position(&self, position: f64, behavior: ScrollBehavior) {
        match behavior {
            ScrollBehavior::Immediate => {
                dom::set_f64(&self.element, "scrollLeft", position);
            }
            ScrollBehavior::Smooth => {
                let options = ScrollToOptions::new();
                options.set_left(position);
                options.set_behavior(DomScrollBehavior::Smooth);
                self.element.scroll_to_with_scroll_to_options(&options);
            }
        }
    }

    fn extent(&self) -> AxisExtent {
        AxisExtent {
            content: f64::from(self.element.scroll_width()),
            viewport: f64::from(self.element.client_width()),
        }
    }

    fn subscribe(&self, listener: Rc<dyn Fn(f64)>) -> Subscription {
        self.listeners.add(listener)
    }

    fn pause(&self) {}

    fn resume(&self) {}

    fn refresh(&self) {
        self.listeners.emit(self.position());
    }
}
