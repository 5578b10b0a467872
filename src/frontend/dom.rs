use crate::config::Capabilities;
use crate::error::InteractionError;
use crate::frame::FrameScheduler;
use crate::geometry::{Axis, ThumbVisualState, TrackGeometry};
use crate::scrollbar::ThumbView;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Element, Event, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, PointerEvent, ResizeObserver, Window,
};

pub fn window() -> Result<Window, InteractionError> {
    web_sys::window().ok_or(InteractionError::NoWindow)
}

fn media_matches(query: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

pub fn probe_capabilities() -> Capabilities {
    let pointer_capture = web_sys::window()
        .map(|w| Reflect::has(&w, &JsValue::from_str("PointerEvent")).unwrap_or(false))
        .unwrap_or(false);

    Capabilities {
        coarse_pointer: media_matches("(hover: none) and (pointer: coarse)"),
        pointer_capture,
        reduced_motion: media_matches("(prefers-reduced-motion: reduce)"),
    }
}

/// `requestAnimationFrame`-backed scheduler.
pub struct RafFrames;

impl FrameScheduler for RafFrames {
    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(move |timestamp: f64| callback(timestamp));
        let _ = window.request_animation_frame(callback.unchecked_ref());
    }
}

pub fn schedule_timeout(delay_ms: u32, callback: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(callback);
    let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        i32::try_from(delay_ms).unwrap_or(i32::MAX),
    );
}

/// Event listener removed from its target on drop.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<E, F>(target: &EventTarget, event: &'static str, passive: bool, mut handler: F) -> Self
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Ok(event) = event.dyn_into::<E>() {
                handler(event);
            }
        });

        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            callback.as_ref().unchecked_ref(),
            &options,
        );

        Self {
            target: target.clone(),
            event,
            callback,
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Intersection observer disconnected on drop.
pub struct Observer {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl Observer {
    /// `on_change` receives the intersecting flag of each reported entry.
    pub fn new(threshold: f64, mut on_change: impl FnMut(bool) + 'static) -> Result<Self, InteractionError> {
        Self::with_targets(threshold, move |_, _, intersecting| on_change(intersecting))
    }

    /// Like `new`, but also hands over the observer and the element each
    /// entry reports on, so the callback can stop observing it.
    pub fn with_targets(
        threshold: f64,
        mut on_change: impl FnMut(&IntersectionObserver, Element, bool) + 'static,
    ) -> Result<Self, InteractionError> {
        let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                        on_change(&observer, entry.target(), entry.is_intersecting());
                    }
                }
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .map_err(|_| InteractionError::Js {
                call: "new IntersectionObserver",
            })?;

        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    pub fn observe(&self, element: &Element) {
        self.observer.observe(element);
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Resize observer disconnected on drop. Fires once right after `observe`
/// and again whenever an observed element changes size.
pub struct SizeObserver {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(Array, ResizeObserver)>,
}

impl SizeObserver {
    pub fn new(mut on_resize: impl FnMut() + 'static) -> Result<Self, InteractionError> {
        let callback = Closure::<dyn FnMut(Array, ResizeObserver)>::new(
            move |_entries: Array, _observer: ResizeObserver| on_resize(),
        );
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref()).map_err(|_| {
            InteractionError::Js {
                call: "new ResizeObserver",
            }
        })?;

        Ok(Self {
            observer,
            _callback: callback,
        })
    }

    pub fn observe(&self, element: &Element) {
        self.observer.observe(element);
    }
}

impl Drop for SizeObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

pub fn get_f64(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key)).ok()?.as_f64()
}

pub fn set_f64(target: &JsValue, key: &str, value: f64) -> bool {
    Reflect::set(target, &JsValue::from_str(key), &JsValue::from_f64(value)).unwrap_or(false)
}

pub fn call_method(target: &JsValue, name: &'static str, args: &[JsValue]) -> Result<JsValue, InteractionError> {
    let method = Reflect::get(target, &JsValue::from_str(name)).map_err(|_| InteractionError::Js { call: name })?;
    let method = method
        .dyn_ref::<Function>()
        .ok_or(InteractionError::Js { call: name })?;
    let args: Array = args.iter().collect();

    method.apply(target, &args).map_err(|_| InteractionError::Js { call: name })
}

pub fn pointer_along(axis: Axis, event: &PointerEvent) -> f64 {
    match axis {
        Axis::Vertical => f64::from(event.client_y()),
        Axis::Horizontal => f64::from(event.client_x()),
    }
}

pub fn track_length(axis: Axis, track: &HtmlElement) -> f64 {
    match axis {
        Axis::Vertical => f64::from(track.offset_height()),
        Axis::Horizontal => f64::from(track.offset_width()),
    }
}

/// Pointer offset from the track's leading edge.
pub fn offset_within(axis: Axis, track: &HtmlElement, event: &PointerEvent) -> f64 {
    let rect = track.get_bounding_client_rect();
    match axis {
        Axis::Vertical => f64::from(event.client_y()) - rect.top(),
        Axis::Horizontal => f64::from(event.client_x()) - rect.left(),
    }
}

pub fn event_targets(event: &Event, element: &HtmlElement) -> bool {
    event
        .target()
        .map(|target| JsValue::from(target) == JsValue::from(element.clone()))
        .unwrap_or(false)
}

/// Closest ancestor (or self) of the event target matching `selector`.
pub fn closest_from_event(event: &Event, selector: &str) -> Option<Element> {
    event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}

fn set_body_user_select(value: &str) {
    if let Some(body) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.body()) {
        let _ = body.style().set_property("user-select", value);
    }
}

/// Writes thumb state as inline styles.
pub struct DomThumbView {
    axis: Axis,
    track: HtmlElement,
    thumb: HtmlElement,
    hide_when_fits: bool,
}

impl DomThumbView {
    pub fn new(axis: Axis, track: HtmlElement, thumb: HtmlElement, hide_when_fits: bool) -> Self {
        Self {
            axis,
            track,
            thumb,
            hide_when_fits,
        }
    }
}

impl ThumbView for DomThumbView {
    fn render(&self, thumb: &ThumbVisualState, geometry: &TrackGeometry) {
        let offset = thumb.offset_px(geometry.track_length);
        let length = thumb.length_px(geometry.track_length);
        let style = self.thumb.style();

        let (size_property, transform) = match self.axis {
            Axis::Vertical => ("height", format!("translate3d(0, {offset:.2}px, 0)")),
            Axis::Horizontal => ("width", format!("translate3d({offset:.2}px, 0, 0)")),
        };
        let _ = style.set_property(size_property, &format!("{length:.2}px"));
        let _ = style.set_property("transform", &transform);
    }

    fn set_dragging(&self, dragging: bool) {
        let _ = self.thumb.class_list().toggle_with_force("dragging", dragging);
        set_body_user_select(if dragging { "none" } else { "" });
    }

    fn set_overflowing(&self, overflowing: bool) {
        if self.hide_when_fits {
            let _ = self
                .track
                .style()
                .set_property("display", if overflowing { "block" } else { "none" });
        }
    }
}
