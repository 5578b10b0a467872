use super::dom::{self, Observer};
use super::Runtime;
use crate::animation::{AnimationEngine, FrameAnimator};
use crate::collapsible::{
    CollapsibleController, CollapsibleStyle, CollapsibleView, ContentBox, EDUCATION_CARD,
    PROJECT_ACCORDION,
};
use crate::error::{disable_on_error, require, InteractionError};
use crate::frame::{FrameScheduler, FrameTask};
use crate::preloader::{PreloadGate, PreloadPhase, FADE, HOLD_MS};
use crate::reveal::{RevealTracker, REVEAL_SELECTOR, REVEAL_THRESHOLD};
use crate::telemetry::{log_event, LogLevel};
use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};
use yew::prelude::*;

const REVEAL_INDEX_ATTR: &str = "data-reveal-index";

#[derive(PartialEq)]
pub struct Education {
    pub school: &'static str,
    pub degree: &'static str,
    pub coursework: &'static [&'static str],
}

pub const EDUCATION: &[Education] = &[Education {
    school: "Undergraduate studies",
    degree: "Electronics and Communication Engineering",
    coursework: &[
        "Digital System Design",
        "VLSI Design",
        "Computer Architecture",
        "Verification Methodologies",
        "Microprocessors",
    ],
}];

#[derive(PartialEq)]
pub struct Project {
    pub name: &'static str,
    pub summary: &'static str,
    pub details: &'static [&'static str],
}

pub const PROJECTS: &[Project] = &[
    Project {
        name: "Dual-Port RAM verification",
        summary: "UVM testbench for a dual-port memory.",
        details: &[
            "Constrained-random sequences for simultaneous reads and writes on both ports.",
            "Coverage model closed at 100% functional coverage.",
            "SystemVerilog assertions for port collisions.",
        ],
    },
    Project {
        name: "AHB to APB bridge",
        summary: "Verilog bridge between high- and low-frequency buses.",
        details: &[
            "FSM-based transfer control between the AHB and APB domains.",
            "Directed tests for single and burst transfers.",
        ],
    },
];

/// Writes the animated box as inline styles. Capped sections animate
/// `max-height`, the rest animate `height`.
struct DomContentView {
    content: HtmlElement,
    size_property: &'static str,
}

impl CollapsibleView for DomContentView {
    fn render(&self, content: ContentBox, _open: bool) {
        let style = self.content.style();
        let _ = style.set_property(self.size_property, &format!("{:.2}px", content.height));
        let _ = style.set_property("margin-top", &format!("{:.2}px", content.margin));
    }
}

fn mount_collapsible(
    name: &'static str,
    selector: &'static str,
    style: CollapsibleStyle,
    content: Option<HtmlElement>,
    runtime: &Runtime,
) -> Result<CollapsibleController, InteractionError> {
    let content = require(content, name, selector)?;
    let view = DomContentView {
        content,
        size_property: if style.max_height.is_some() {
            "max-height"
        } else {
            "height"
        },
    };

    Ok(CollapsibleController::new(
        name,
        style,
        Rc::new(view),
        Rc::clone(&runtime.page),
        Rc::clone(&runtime.frames),
        runtime.capabilities.reduced_motion,
    ))
}

/// Shared wiring of the two collapsible components: mounts the controller
/// and returns the click callback plus the open flag to render from.
#[hook]
fn use_collapsible(
    name: &'static str,
    selector: &'static str,
    style: CollapsibleStyle,
    content: NodeRef,
) -> (bool, Callback<MouseEvent>) {
    let runtime = use_context::<Runtime>();
    let open = use_state(|| false);
    let controller = use_mut_ref(|| None::<CollapsibleController>);

    {
        let controller = Rc::clone(&controller);
        let content = content.clone();
        use_effect_with(runtime, move |runtime| {
            *controller.borrow_mut() = runtime.as_ref().and_then(|runtime| {
                disable_on_error(
                    name,
                    mount_collapsible(name, selector, style, content.cast::<HtmlElement>(), runtime),
                )
            });
            move || {
                controller.borrow_mut().take();
            }
        });
    }

    let onclick = {
        let open = open.clone();
        Callback::from(move |_: MouseEvent| {
            let mut controller = controller.borrow_mut();
            let next = match controller.as_mut() {
                Some(controller) => {
                    let natural = content
                        .cast::<HtmlElement>()
                        .map(|content| f64::from(content.scroll_height()))
                        .unwrap_or(0.0);
                    controller.toggle(natural)
                }
                None => !*open,
            };
            open.set(next);
        })
    };

    (*open, onclick)
}

#[derive(Properties, PartialEq)]
pub struct EducationCardProps {
    pub entry: &'static Education,
}

#[function_component(EducationCard)]
pub fn education_card(props: &EducationCardProps) -> Html {
    let content = use_node_ref();
    let (open, onclick) = use_collapsible(
        "education_card",
        ".coursework-list",
        EDUCATION_CARD,
        content.clone(),
    );
    let entry = props.entry;

    html! {
        <div class={classes!("education-item", "interactive", "reveal-up", open.then_some("active"))} {onclick}>
            <h4>{entry.school}</h4>
            <p>{entry.degree}</p>
            <ul class="coursework-list" ref={content}>
                { for entry.coursework.iter().map(|course| html! { <li>{*course}</li> }) }
            </ul>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProjectAccordionProps {
    pub project: &'static Project,
}

#[function_component(ProjectAccordion)]
pub fn project_accordion(props: &ProjectAccordionProps) -> Html {
    let content = use_node_ref();
    let (open, onclick) = use_collapsible(
        "project_accordion",
        ".project-details",
        PROJECT_ACCORDION,
        content.clone(),
    );
    let project = props.project;

    html! {
        <article class="project-card reveal-up">
            <h4>{project.name}</h4>
            <p>{project.summary}</p>
            <button
                type="button"
                class={classes!("read-more-btn", open.then_some("active"))}
                aria-expanded={open.to_string()}
                {onclick}
            >
                {if open { "Read Less" } else { "Read More" }}
            </button>
            <div class={classes!("project-details", open.then_some("visible"))} ref={content}>
                <ul>
                    { for project.details.iter().map(|detail| html! { <li>{*detail}</li> }) }
                </ul>
            </div>
        </article>
    }
}

fn reveal(element: &Element) {
    let _ = element.class_list().add_1("revealed");
}

fn mount_reveals(runtime: &Runtime) -> Result<Observer, InteractionError> {
    let document = dom::window()?
        .document()
        .ok_or(InteractionError::MissingElement {
            role: "document",
            selector: "document",
        })?;
    let targets = document
        .query_selector_all(REVEAL_SELECTOR)
        .map_err(|_| InteractionError::Js {
            call: "querySelectorAll",
        })?;

    let elements: Vec<Element> = (0..targets.length())
        .filter_map(|i| targets.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect();
    let tracker = Rc::new(RefCell::new(RevealTracker::new(elements.len())));

    if runtime.capabilities.reduced_motion {
        tracker.borrow_mut().reveal_all();
        elements.iter().for_each(reveal);
    }

    let frames = Rc::clone(&runtime.frames);
    let observer = {
        let tracker = Rc::clone(&tracker);
        Observer::with_targets(REVEAL_THRESHOLD, move |observer, element, intersecting| {
            let Some(index) = element
                .get_attribute(REVEAL_INDEX_ATTR)
                .and_then(|value| value.parse::<usize>().ok())
            else {
                return;
            };
            if tracker.borrow_mut().intersected(index, intersecting) {
                observer.unobserve(&element);
                frames.request_frame(Box::new(move |_| reveal(&element)));
            }
        })?
    };

    if !tracker.borrow().is_complete() {
        for (index, element) in elements.iter().enumerate() {
            let _ = element.set_attribute(REVEAL_INDEX_ATTR, &index.to_string());
            observer.observe(element);
        }
    }

    log_event(
        LogLevel::Debug,
        "reveals_mounted",
        serde_json::json!({ "targets": elements.len() }),
    );
    Ok(observer)
}

/// Reveals every `.reveal-*` element rendered before it. Place it last.
#[function_component(ScrollReveals)]
pub fn scroll_reveals() -> Html {
    let runtime = use_context::<Runtime>();

    use_effect_with(runtime, move |runtime| {
        let mounted = runtime
            .as_ref()
            .and_then(|runtime| disable_on_error("scroll_reveals", mount_reveals(runtime)));
        move || drop(mounted)
    });

    Html::default()
}

fn set_body_loading(loading: bool) {
    if let Some(body) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.body()) {
        let _ = body.class_list().toggle_with_force("loading", loading);
    }
}

struct MountedPreloader {
    gate: Rc<RefCell<PreloadGate>>,
    fill: FrameTask,
    fade: Rc<RefCell<FrameTask>>,
}

impl Drop for MountedPreloader {
    fn drop(&mut self) {
        self.fill.cancel();
        self.fade.borrow().cancel();
        self.gate.borrow_mut().finish();
        set_body_loading(false);
    }
}

fn mount_preloader(
    overlay: Option<HtmlElement>,
    progress: Option<HtmlElement>,
    runtime: &Runtime,
    on_done: UseStateSetter<bool>,
) -> Result<MountedPreloader, InteractionError> {
    let overlay = require(overlay, "preloader", "#kinetic-preloader")?;
    let progress = require(progress, "preloader progress", ".loader-progress")?;

    set_body_loading(true);
    let gate = Rc::new(RefCell::new(PreloadGate::new(Rc::clone(&runtime.page))));
    let fade = Rc::new(RefCell::new(FrameTask::idle()));

    let finish: Rc<dyn Fn()> = {
        let gate = Rc::downgrade(&gate);
        Rc::new(move || {
            if let Some(gate) = gate.upgrade() {
                gate.borrow_mut().finish();
            }
            set_body_loading(false);
            on_done.set(true);
        })
    };

    if runtime.capabilities.reduced_motion {
        finish();
        return Ok(MountedPreloader {
            gate,
            fill: FrameTask::idle(),
            fade,
        });
    }

    let fill = {
        let gate = Rc::downgrade(&gate);
        let fade = Rc::downgrade(&fade);
        let frames = Rc::clone(&runtime.frames);
        FrameTask::spawn(Rc::clone(&runtime.frames), move |timestamp| {
            let Some(gate) = gate.upgrade() else {
                return ControlFlow::Break(());
            };
            let width = gate.borrow_mut().tick(timestamp);
            let _ = progress.style().set_property("width", &format!("{width:.1}%"));
            if gate.borrow().phase() == PreloadPhase::Filling {
                return ControlFlow::Continue(());
            }

            let fade = fade.clone();
            let overlay = overlay.clone();
            let finish = Rc::clone(&finish);
            let animator = FrameAnimator::new(Rc::clone(&frames));
            dom::schedule_timeout(HOLD_MS, move || {
                // Unmounted while holding.
                let Some(fade) = fade.upgrade() else {
                    return;
                };
                let on_update = Box::new(move |opacity: f64| {
                    let _ = overlay.style().set_property("opacity", &format!("{opacity:.3}"));
                });
                let on_complete = Box::new(move || finish());
                *fade.borrow_mut() = animator.animate(FADE, on_update, on_complete);
            });
            ControlFlow::Break(())
        })
    };

    Ok(MountedPreloader { gate, fill, fade })
}

/// Full-screen loading overlay. The page does not scroll until it is gone.
#[function_component(Preloader)]
pub fn preloader() -> Html {
    let runtime = use_context::<Runtime>();
    let overlay = use_node_ref();
    let progress = use_node_ref();
    let done = use_state(|| false);

    {
        let overlay = overlay.clone();
        let progress = progress.clone();
        let done = done.setter();
        use_effect_with(runtime, move |runtime| {
            let mounted = runtime.as_ref().and_then(|runtime| {
                disable_on_error(
                    "preloader",
                    mount_preloader(
                        overlay.cast::<HtmlElement>(),
                        progress.cast::<HtmlElement>(),
                        runtime,
                        done.clone(),
                    ),
                )
            });
            if mounted.is_none() {
                done.set(true);
            }
            move || drop(mounted)
        });
    }

    if *done {
        return Html::default();
    }

    html! {
        <div id="kinetic-preloader" class="preloader" ref={overlay} aria-hidden="true">
            <div class="loader-track">
                <div class="loader-progress" ref={progress}></div>
            </div>
        </div>
    }
}
