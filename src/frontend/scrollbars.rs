use super::dom::{self, DomThumbView, Listener, SizeObserver};
use super::Runtime;
use crate::debounce::Debounce;
use crate::error::{disable_on_error, require, InteractionError};
use crate::geometry::Axis;
use crate::scrollbar::{PressTarget, ScrollbarHandle, VirtualScrollbar};
use crate::source::{ScrollSource, Subscription};
use crate::telemetry::{log_event, LogLevel};
use std::cell::Cell;
use std::rc::Rc;
use web_sys::{Element, Event, HtmlElement, PointerEvent};
use yew::prelude::*;

/// DOM parts of one virtual scrollbar.
pub struct ScrollbarParts {
    pub axis: Axis,
    pub track: Option<HtmlElement>,
    pub thumb: Option<HtmlElement>,
    pub track_selector: &'static str,
    pub thumb_selector: &'static str,
    /// Hide the whole track while the content fits.
    pub hide_when_fits: bool,
    /// Element whose size follows the scrolled content.
    pub content: Option<Element>,
}

/// A scrollbar wired to the page. Dropping it removes every listener and
/// detaches from the source.
pub struct MountedScrollbar {
    handle: ScrollbarHandle,
    resize: Debounce,
    _content_observer: Option<SizeObserver>,
    _subscription: Subscription,
    _listeners: Vec<Listener>,
}

impl Drop for MountedScrollbar {
    fn drop(&mut self) {
        self.resize.cancel();
        if self.handle.is_dragging() {
            self.handle.release();
        }
    }
}

pub fn mount_scrollbar(
    parts: ScrollbarParts,
    source: Rc<dyn ScrollSource>,
    runtime: &Runtime,
) -> Result<MountedScrollbar, InteractionError> {
    let axis = parts.axis;
    let track = require(parts.track, "track", parts.track_selector)?;
    let thumb = require(parts.thumb, "thumb", parts.thumb_selector)?;
    let window = dom::window()?;

    let view = Rc::new(DomThumbView::new(
        axis,
        track.clone(),
        thumb.clone(),
        parts.hide_when_fits,
    ));
    let bar = VirtualScrollbar::new(runtime.config.scrollbar(axis), source, view);
    let handle = ScrollbarHandle::new(bar, Rc::clone(&runtime.frames));
    let subscription = handle.attach();
    handle.reconcile(dom::track_length(axis, &track));

    let mut listeners = Vec::new();

    // Window resizes and content size changes share one debounce.
    let resize = Debounce::new();
    let schedule_reconcile: Rc<dyn Fn()> = {
        let handle = handle.clone();
        let track = track.clone();
        let debounce = resize.clone();
        let delay_ms = runtime.config.resize_debounce_ms;
        Rc::new(move || {
            let token = debounce.trigger();
            let handle = handle.clone();
            let track = track.clone();
            let debounce = debounce.clone();
            dom::schedule_timeout(delay_ms, move || {
                if debounce.is_current(token) {
                    handle.reconcile(dom::track_length(axis, &track));
                }
            });
        })
    };

    {
        let schedule_reconcile = Rc::clone(&schedule_reconcile);
        listeners.push(Listener::new(&window, "resize", true, move |_: Event| {
            schedule_reconcile();
        }));
    }

    let content_observer = match parts.content {
        Some(content) => {
            let schedule_reconcile = Rc::clone(&schedule_reconcile);
            match SizeObserver::new(move || schedule_reconcile()) {
                Ok(observer) => {
                    observer.observe(&content);
                    Some(observer)
                }
                Err(error) => {
                    log_event(
                        LogLevel::Warn,
                        "content_observer_unavailable",
                        serde_json::json!({ "axis": axis, "reason": error.to_string() }),
                    );
                    None
                }
            }
        }
        None => None,
    };

    {
        let handle = handle.clone();
        let thumb = thumb.clone();
        let target_track = track.clone();
        listeners.push(Listener::new(&track, "pointerdown", false, move |event: PointerEvent| {
            let target = if dom::event_targets(&event, &thumb) {
                PressTarget::Thumb
            } else {
                PressTarget::Track
            };
            handle.press_track(target, dom::offset_within(axis, &target_track, &event));
        }));
    }

    let drag_enabled = runtime.config.drag_enabled(&runtime.capabilities);
    if drag_enabled {
        let captured = Rc::new(Cell::new(None::<i32>));
        let use_capture = runtime.capabilities.pointer_capture;

        {
            let handle = handle.clone();
            let captured = Rc::clone(&captured);
            let capture_target = thumb.clone();
            listeners.push(Listener::new(&thumb, "pointerdown", false, move |event: PointerEvent| {
                if event.button() != 0 {
                    return;
                }
                event.prevent_default();
                if use_capture && capture_target.set_pointer_capture(event.pointer_id()).is_ok() {
                    captured.set(Some(event.pointer_id()));
                }
                handle.press_thumb(dom::pointer_along(axis, &event));
            }));
        }

        {
            let handle = handle.clone();
            listeners.push(Listener::new(&window, "pointermove", false, move |event: PointerEvent| {
                if handle.is_dragging() {
                    event.prevent_default();
                    handle.pointer_moved(dom::pointer_along(axis, &event));
                }
            }));
        }

        for event_name in ["pointerup", "pointercancel"] {
            let handle = handle.clone();
            let captured = Rc::clone(&captured);
            let capture_target = thumb.clone();
            listeners.push(Listener::new(&window, event_name, true, move |_: PointerEvent| {
                if !handle.is_dragging() {
                    return;
                }
                if let Some(pointer_id) = captured.take() {
                    let _ = capture_target.release_pointer_capture(pointer_id);
                }
                handle.release();
            }));
        }

        // Capture can be lost without a pointerup ever reaching the window.
        {
            let handle = handle.clone();
            let captured = Rc::clone(&captured);
            listeners.push(Listener::new(&thumb, "lostpointercapture", true, move |_: PointerEvent| {
                if captured.take().is_some() {
                    handle.release();
                }
            }));
        }
    }

    let geometry = handle.geometry();
    log_event(
        LogLevel::Info,
        "scrollbar_mounted",
        serde_json::json!({
            "axis": axis,
            "drag": drag_enabled,
            "track_length": geometry.track_length,
            "thumb_length": geometry.thumb_length,
        }),
    );

    Ok(MountedScrollbar {
        handle,
        resize,
        _content_observer: content_observer,
        _subscription: subscription,
        _listeners: listeners,
    })
}

#[function_component(PageScrollbar)]
pub fn page_scrollbar() -> Html {
    let runtime = use_context::<Runtime>();
    let track = use_node_ref();
    let thumb = use_node_ref();

    {
        let track = track.clone();
        let thumb = thumb.clone();
        use_effect_with(runtime, move |runtime| {
            let mounted = runtime.as_ref().and_then(|runtime| {
                let parts = ScrollbarParts {
                    axis: Axis::Vertical,
                    track: track.cast::<HtmlElement>(),
                    thumb: thumb.cast::<HtmlElement>(),
                    track_selector: ".scroll-bar-track",
                    thumb_selector: ".scroll-bar-thumb",
                    hide_when_fits: false,
                    content: web_sys::window()
                        .and_then(|w| w.document())
                        .and_then(|d| d.body())
                        .map(Element::from),
                };
                disable_on_error(
                    "page_scrollbar",
                    mount_scrollbar(parts, Rc::clone(&runtime.page), runtime),
                )
            });
            move || drop(mounted)
        });
    }

    html! {
        <div class="scroll-bar-container" aria-hidden="true">
            <div class="scroll-bar-track" ref={track}>
                <div class="scroll-bar-thumb" ref={thumb}></div>
            </div>
        </div>
    }
}
