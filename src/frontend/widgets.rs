use super::dom::{self, Listener, Observer};
use super::Runtime;
use crate::animation::{AnimationEngine, FrameAnimator};
use crate::counter::counter_tween;
use crate::error::{disable_on_error, require, InteractionError};
use crate::frame::FrameTask;
use crate::marquee::Marquee;
use crate::scroll_top::ScrollTopVisibility;
use crate::source::ScrollBehavior;
use crate::telemetry::{log_event, LogLevel};
use crate::theme::{persist_theme, resolve_theme, Theme, ThemeStore};
use js_sys::{Function, Reflect};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, Event, HtmlElement, PointerEvent, Storage};
use yew::prelude::*;

const KPI_VISIBLE_RATIO: f64 = 0.5;

struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<Storage> {
        window()?.local_storage().ok().flatten()
    }
}

impl ThemeStore for LocalStorage {
    fn load(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(key, value);
        }
    }
}

fn apply_theme(theme: Theme) {
    if let Some(document) = window().and_then(|w| w.document()) {
        if let Some(root) = document.document_element() {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
    }
}

fn apply_theme_with_transition(theme: Theme, reduced_motion: bool) {
    if reduced_motion {
        apply_theme(theme);
        return;
    }

    let Some(document) = window().and_then(|w| w.document()) else {
        apply_theme(theme);
        return;
    };

    let document_js: JsValue = document.into();
    let Ok(start_view_transition) =
        Reflect::get(&document_js, &JsValue::from_str("startViewTransition"))
    else {
        apply_theme(theme);
        return;
    };

    let Some(start_view_transition) = start_view_transition.dyn_ref::<Function>() else {
        apply_theme(theme);
        return;
    };

    let callback = Closure::once_into_js(move || apply_theme(theme));
    if start_view_transition.call1(&document_js, &callback).is_err() {
        apply_theme(theme);
    }
}

#[function_component(ThemeToggle)]
pub fn theme_toggle() -> Html {
    let runtime = use_context::<Runtime>();
    let theme = use_state(|| resolve_theme(&LocalStorage));

    {
        let current = *theme;
        use_effect_with((), move |_| {
            apply_theme(current);
            || ()
        });
    }

    let reduced_motion = runtime
        .map(|runtime| runtime.capabilities.reduced_motion)
        .unwrap_or(false);
    let on_toggle = {
        let theme = theme.clone();
        Callback::from(move |_| {
            let next = (*theme).toggled();
            persist_theme(&LocalStorage, next);
            apply_theme_with_transition(next, reduced_motion);
            theme.set(next);
        })
    };

    html! {
        <button
            id="theme-switch"
            class="theme-toggle"
            type="button"
            aria-label={(*theme).toggle_label()}
            aria-pressed={(*theme).pressed().to_string()}
            onclick={on_toggle}
        >
            <span aria-hidden="true">{if (*theme).pressed() { "◑" } else { "◐" }}</span>
        </button>
    }
}

#[function_component(ScrollTopButton)]
pub fn scroll_top_button() -> Html {
    let runtime = use_context::<Runtime>();
    let visible = use_state(|| false);

    {
        let visible = visible.setter();
        use_effect_with(runtime.clone(), move |runtime| {
            let subscription = runtime.as_ref().map(|runtime| {
                let tracker = RefCell::new(ScrollTopVisibility::new(runtime.config.scroll_top_threshold));
                if let Some(initial) = tracker.borrow_mut().observe(runtime.page.position()) {
                    visible.set(initial);
                }
                runtime.page.subscribe(Rc::new(move |position: f64| {
                    if let Some(next) = tracker.borrow_mut().observe(position) {
                        visible.set(next);
                    }
                }))
            });
            move || drop(subscription)
        });
    }

    let onclick = Callback::from(move |_: MouseEvent| {
        if let Some(runtime) = runtime.as_ref() {
            runtime.page.set_position(0.0, ScrollBehavior::Smooth);
        }
    });

    html! {
        <button
            id="scrollTop"
            type="button"
            class={classes!("scroll-top-btn", (*visible).then_some("visible"))}
            aria-label="Back to top"
            {onclick}
        >
            <span aria-hidden="true">{"↑"}</span>
        </button>
    }
}

struct MountedTicker {
    auto_scroll: Rc<RefCell<FrameTask>>,
    snap: Rc<RefCell<FrameTask>>,
    _observer: Observer,
    _listeners: Vec<Listener>,
}

impl Drop for MountedTicker {
    fn drop(&mut self) {
        self.auto_scroll.borrow().cancel();
        self.snap.borrow().cancel();
    }
}

fn write_offset(track: &HtmlElement, offset: f64) {
    let _ = track
        .style()
        .set_property("transform", &format!("translate3d({offset:.2}px, 0, 0)"));
}

/// Half the track (it holds the list twice) and the distance between two
/// neighbouring items.
fn measure_ticker(track: &HtmlElement) -> (f64, f64) {
    let loop_width = f64::from(track.scroll_width()) / 2.0;
    let items = track.get_elements_by_class_name("ticker-item");
    let item_width = match (items.item(0), items.item(1)) {
        (Some(first), Some(second)) => match (
            first.dyn_into::<HtmlElement>(),
            second.dyn_into::<HtmlElement>(),
        ) {
            (Ok(first), Ok(second)) => f64::from(second.offset_left() - first.offset_left()),
            _ => 0.0,
        },
        _ => 0.0,
    };
    (loop_width, item_width)
}

fn mount_ticker(
    container: Option<HtmlElement>,
    track: Option<HtmlElement>,
    runtime: &Runtime,
) -> Result<MountedTicker, InteractionError> {
    let container = require(container, "ticker container", ".skills-ticker-container")?;
    let track = require(track, "ticker track", ".skills-ticker-track")?;
    let window = dom::window()?;

    let (loop_width, item_width) = measure_ticker(&track);
    let marquee = Rc::new(RefCell::new(Marquee::new(loop_width, item_width)));
    let auto_scroll = Rc::new(RefCell::new(FrameTask::idle()));
    let snap = Rc::new(RefCell::new(FrameTask::idle()));
    let mut listeners = Vec::new();

    let observer = {
        let marquee = Rc::clone(&marquee);
        let auto_scroll = Rc::clone(&auto_scroll);
        let frames = Rc::clone(&runtime.frames);
        let track = track.clone();
        let reduced_motion = runtime.capabilities.reduced_motion;
        Observer::new(0.0, move |visible| {
            if !visible {
                auto_scroll.borrow().cancel();
                return;
            }
            if reduced_motion || auto_scroll.borrow().is_active() {
                return;
            }
            let target = Rc::downgrade(&marquee);
            let track = track.clone();
            let task = FrameTask::drive(Rc::clone(&frames), target, move |marquee: &mut Marquee| {
                marquee.tick();
                write_offset(&track, marquee.offset());
            });
            *auto_scroll.borrow_mut() = task;
        })?
    };
    observer.observe(&container);

    {
        let marquee = Rc::clone(&marquee);
        let track_for_resize = track.clone();
        listeners.push(Listener::new(&window, "resize", true, move |_: Event| {
            let (loop_width, item_width) = measure_ticker(&track_for_resize);
            marquee.borrow_mut().measure(loop_width, item_width);
        }));
    }

    if runtime.config.drag_enabled(&runtime.capabilities) {
        {
            let marquee = Rc::clone(&marquee);
            let snap = Rc::clone(&snap);
            let track_style = track.clone();
            listeners.push(Listener::new(&container, "pointerdown", true, move |event: PointerEvent| {
                snap.borrow().cancel();
                marquee.borrow_mut().press(f64::from(event.client_x()));
                let _ = track_style.style().set_property("cursor", "grabbing");
            }));
        }

        {
            let marquee = Rc::clone(&marquee);
            let track = track.clone();
            listeners.push(Listener::new(&window, "pointermove", false, move |event: PointerEvent| {
                let mut marquee = marquee.borrow_mut();
                if !marquee.is_dragging() {
                    return;
                }
                event.prevent_default();
                marquee.drag_to(f64::from(event.client_x()));
                write_offset(&track, marquee.offset());
            }));
        }

        for event_name in ["pointerup", "pointercancel"] {
            let marquee = Rc::clone(&marquee);
            let snap = Rc::clone(&snap);
            let track = track.clone();
            let animator = FrameAnimator::new(Rc::clone(&runtime.frames));
            listeners.push(Listener::new(&window, event_name, true, move |_: PointerEvent| {
                let _ = track.style().set_property("cursor", "grab");
                let Some(tween) = marquee.borrow_mut().release() else {
                    return;
                };

                let on_update = {
                    let marquee = Rc::clone(&marquee);
                    let track = track.clone();
                    Box::new(move |offset: f64| {
                        let mut marquee = marquee.borrow_mut();
                        marquee.set_offset(offset);
                        write_offset(&track, marquee.offset());
                    })
                };
                let on_complete = {
                    let marquee = Rc::clone(&marquee);
                    Box::new(move || marquee.borrow_mut().finish_snap())
                };
                *snap.borrow_mut() = animator.animate(tween, on_update, on_complete);
            }));
        }
    }

    Ok(MountedTicker {
        auto_scroll,
        snap,
        _observer: observer,
        _listeners: listeners,
    })
}

#[derive(Properties, PartialEq)]
pub struct SkillsTickerProps {
    pub skills: &'static [&'static str],
}

#[function_component(SkillsTicker)]
pub fn skills_ticker(props: &SkillsTickerProps) -> Html {
    let runtime = use_context::<Runtime>();
    let container = use_node_ref();
    let track = use_node_ref();

    {
        let container = container.clone();
        let track = track.clone();
        use_effect_with(runtime, move |runtime| {
            let mounted = runtime.as_ref().and_then(|runtime| {
                disable_on_error(
                    "skills_ticker",
                    mount_ticker(container.cast::<HtmlElement>(), track.cast::<HtmlElement>(), runtime),
                )
            });
            move || drop(mounted)
        });
    }

    let items = || {
        props.skills.iter().map(|skill| {
            html! {
                <>
                    <span class="ticker-item">{*skill}</span>
                    <span class="sep" aria-hidden="true">{"•"}</span>
                </>
            }
        })
    };

    html! {
        <div class="skills-ticker-container" ref={container}>
            <div class="skills-ticker-track" ref={track}>
                { for items() }
                { for items() }
            </div>
        </div>
    }
}

struct MountedCounter {
    animation: Rc<RefCell<FrameTask>>,
    _observer: Observer,
}

impl Drop for MountedCounter {
    fn drop(&mut self) {
        self.animation.borrow().cancel();
    }
}

fn mount_counter(
    value: Option<HtmlElement>,
    target: &str,
    runtime: &Runtime,
) -> Result<Option<MountedCounter>, InteractionError> {
    let value = require(value, "kpi value", "[data-target]")?;
    let Some((tween, format)) = counter_tween(target) else {
        log_event(
            LogLevel::Debug,
            "counter_skipped",
            serde_json::json!({ "target": target }),
        );
        return Ok(None);
    };

    let animation = Rc::new(RefCell::new(FrameTask::idle()));
    let started = Cell::new(false);
    let observer = {
        let animation = Rc::clone(&animation);
        let animator = FrameAnimator::new(Rc::clone(&runtime.frames));
        let reduced_motion = runtime.capabilities.reduced_motion;
        let value = value.clone();
        Observer::new(KPI_VISIBLE_RATIO, move |visible| {
            if !visible || started.replace(true) {
                return;
            }
            if reduced_motion {
                value.set_text_content(Some(&format.render(tween.to)));
                return;
            }
            let writer = value.clone();
            let on_update = Box::new(move |current: f64| {
                writer.set_text_content(Some(&format.render(current)));
            });
            *animation.borrow_mut() = animator.animate(tween, on_update, Box::new(|| ()));
        })?
    };
    observer.observe(&value);

    Ok(Some(MountedCounter {
        animation,
        _observer: observer,
    }))
}

#[derive(Properties, PartialEq)]
pub struct KpiStatProps {
    pub target: AttrValue,
    pub label: &'static str,
    #[prop_or_default]
    pub suffix: &'static str,
}

/// One KPI figure that counts up from zero the first time it is half visible.
#[function_component(KpiStat)]
pub fn kpi_stat(props: &KpiStatProps) -> Html {
    let runtime = use_context::<Runtime>();
    let value = use_node_ref();

    {
        let value = value.clone();
        let target = props.target.clone();
        use_effect_with(runtime, move |runtime| {
            let mounted = runtime.as_ref().and_then(|runtime| {
                disable_on_error(
                    "kpi_counter",
                    mount_counter(value.cast::<HtmlElement>(), &target, runtime),
                )
                .flatten()
            });
            move || drop(mounted)
        });
    }

    html! {
        <div class="kpi-stat">
            <span class="kpi-value">
                <span data-target={props.target.clone()} ref={value}>{"0"}</span>
                {props.suffix}
            </span>
            <span class="kpi-label">{props.label}</span>
        </div>
    }
}
