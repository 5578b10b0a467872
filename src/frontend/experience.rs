use super::dom::{self, Listener};
use super::scrollbars::{mount_scrollbar, MountedScrollbar, ScrollbarParts};
use super::sources::ElementSource;
use super::Runtime;
use crate::error::{disable_on_error, require, InteractionError};
use crate::geometry::Axis;
use crate::panel::{DetailChange, DetailSelection, DragScrollPanel, PanelHandle, PanelRelease};
use crate::source::{ScrollBehavior, ScrollSource};
use crate::telemetry::{log_event, LogLevel};
use std::rc::Rc;
use web_sys::{Event, HtmlElement, PointerEvent};
use yew::prelude::*;

const DETAIL_SCROLL_OFFSET: f64 = 100.0;
const CARDS_SCROLL_OFFSET: f64 = 50.0;

pub struct Experience {
    pub id: &'static str,
    pub company: &'static str,
    pub title: &'static str,
    pub bullets: &'static [&'static str],
    pub skills: &'static [&'static str],
}

pub const EXPERIENCES: &[Experience] = &[
    Experience {
        id: "cognizant",
        company: "Cognizant",
        title: "Programmer Analyst",
        bullets: &[
            "Gained systems-level experience in how hardware integrates into larger enterprise stacks.",
            "Automated business workflows by developing and deploying solutions on the APPIAN low-code platform.",
            "Analyzed and optimized enterprise-level processes on cross-functional projects.",
        ],
        skills: &["APPIAN", "Process Management", "Automation", "Systems Integration"],
    },
    Experience {
        id: "insemi",
        company: "InSemi",
        title: "Design Verification Engineer",
        bullets: &[
            "Developed a UVM testbench to validate a Dual-Port RAM design.",
            "Created constrained-random test cases that achieved 100% functional coverage.",
            "Checked protocol compliance with SystemVerilog assertions.",
        ],
        skills: &["UVM", "SystemVerilog", "Verification", "Coverage", "Timing Analysis"],
    },
    Experience {
        id: "maven",
        company: "Maven Silicon",
        title: "Digital Design Intern",
        bullets: &[
            "Translated functional specifications into hardware implementations.",
            "Designed an AMBA AHB-APB bridge in Verilog between high- and low-frequency SoC subsystems.",
        ],
        skills: &["Verilog RTL", "Digital Design", "AMBA", "SoC Design", "FSM"],
    },
    Experience {
        id: "coreel",
        company: "CoreEL",
        title: "Verification Intern",
        bullets: &[
            "Built SystemVerilog testbench components (drivers, monitors, scoreboards) from scratch.",
            "Reached 100% functional and code coverage on a full adder DUT.",
        ],
        skills: &["SystemVerilog", "Verification", "Coverage", "Digital Design", "Testbench"],
    },
];

fn find_experience(id: &str) -> Option<&'static Experience> {
    EXPERIENCES.iter().find(|entry| entry.id == id)
}

#[derive(Default, PartialEq)]
struct SelectionState(DetailSelection);

enum SelectionAction {
    Toggle(String),
    Close,
}

impl Reducible for SelectionState {
    type Action = SelectionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = self.0.clone();
        match action {
            SelectionAction::Toggle(id) => {
                let change = next.toggle(&id);
                let opened = matches!(change, DetailChange::Open(_));
                log_event(
                    LogLevel::Debug,
                    "detail_toggled",
                    serde_json::json!({ "card": id, "open": opened }),
                );
            }
            SelectionAction::Close => {
                if !next.close() {
                    return self;
                }
            }
        }
        Rc::new(Self(next))
    }
}

/// Smooth-scrolls the page so `element` sits `offset` pixels below the top.
fn scroll_page_to(runtime: &Runtime, element: Option<HtmlElement>, offset: f64) {
    if let Some(element) = element {
        let top = element.get_bounding_client_rect().top() + runtime.page.position() - offset;
        runtime.page.set_position(top.max(0.0), ScrollBehavior::Smooth);
    }
}

struct MountedPanel {
    panel: Option<PanelHandle>,
    _scrollbar: MountedScrollbar,
    _listeners: Vec<Listener>,
}

impl Drop for MountedPanel {
    fn drop(&mut self) {
        if let Some(panel) = self.panel.as_ref() {
            panel.cancel();
        }
    }
}

struct PanelParts {
    container: Option<HtmlElement>,
    track: Option<HtmlElement>,
    thumb: Option<HtmlElement>,
}

fn card_id(event: &Event) -> Option<String> {
    dom::closest_from_event(event, ".exp-card[data-exp-id]")?.get_attribute("data-exp-id")
}

fn mount_panel(
    parts: PanelParts,
    runtime: &Runtime,
    on_card_click: Callback<String>,
) -> Result<MountedPanel, InteractionError> {
    let container = require(parts.container, "experience container", "#experienceContainer")?;
    let window = dom::window()?;

    let source: Rc<dyn ScrollSource> = Rc::new(ElementSource::horizontal(container.clone()));
    let scrollbar = mount_scrollbar(
        ScrollbarParts {
            axis: Axis::Horizontal,
            track: parts.track,
            thumb: parts.thumb,
            track_selector: "#expScrollbarTrack",
            thumb_selector: "#expScrollbarThumb",
            hide_when_fits: true,
            content: Some(container.clone().into()),
        },
        Rc::clone(&source),
        runtime,
    )?;

    let mut listeners = Vec::new();
    if !runtime.config.drag_enabled(&runtime.capabilities) {
        // Without drags the cards still open on a plain click.
        listeners.push(Listener::new(&container, "click", true, move |event: MouseEvent| {
            if dom::closest_from_event(&event, "a, button").is_some() {
                return;
            }
            if let Some(id) = card_id(&event) {
                on_card_click.emit(id);
            }
        }));

        return Ok(MountedPanel {
            panel: None,
            _scrollbar: scrollbar,
            _listeners: listeners,
        });
    }

    let panel = PanelHandle::new(
        DragScrollPanel::new(
            source,
            runtime.config.drag_threshold,
            runtime.config.panel_drag_multiplier,
        ),
        Rc::clone(&runtime.frames),
    );

    {
        let panel = panel.clone();
        let grab_target = container.clone();
        listeners.push(Listener::new(&container, "pointerdown", true, move |event: PointerEvent| {
            if event.button() != 0 || dom::closest_from_event(&event, "a, button").is_some() {
                return;
            }
            panel.press(f64::from(event.client_x()), card_id(&event));
            let _ = grab_target.class_list().add_1("is-dragging");
        }));
    }

    {
        let panel = panel.clone();
        listeners.push(Listener::new(&window, "pointermove", true, move |event: PointerEvent| {
            panel.moved(f64::from(event.client_x()));
        }));
    }

    {
        let panel = panel.clone();
        let grab_target = container.clone();
        listeners.push(Listener::new(&window, "pointerup", true, move |_: PointerEvent| {
            let _ = grab_target.class_list().remove_1("is-dragging");
            if let PanelRelease::Clicked(Some(id)) = panel.release() {
                on_card_click.emit(id);
            }
        }));
    }

    {
        let panel = panel.clone();
        let grab_target = container.clone();
        listeners.push(Listener::new(&window, "pointercancel", true, move |_: PointerEvent| {
            let _ = grab_target.class_list().remove_1("is-dragging");
            panel.cancel();
        }));
    }

    Ok(MountedPanel {
        panel: Some(panel),
        _scrollbar: scrollbar,
        _listeners: listeners,
    })
}

fn render_detail(entry: &Experience, on_back: Callback<MouseEvent>) -> Html {
    html! {
        <>
            <button type="button" class="back-to-cards-btn" onclick={on_back}>
                <span class="tooltip">{"Back to Cards"}</span>
            </button>
            <div class="experience-detail-content">
                <h4>{entry.title}</h4>
                <ul>
                    { for entry.bullets.iter().map(|bullet| html! { <li>{*bullet}</li> }) }
                </ul>
                <h5 class="skill-tags-mini-title">{"Relevant Skills"}</h5>
                <ul class="skill-tags-mini">
                    { for entry.skills.iter().map(|skill| html! {
                        <li class="skill-tag-mini" data-skill={*skill}>{*skill}</li>
                    }) }
                </ul>
            </div>
        </>
    }
}

#[function_component(ExperiencePanel)]
pub fn experience_panel() -> Html {
    let runtime = use_context::<Runtime>();
    let selection = use_reducer(SelectionState::default);
    let container = use_node_ref();
    let track = use_node_ref();
    let thumb = use_node_ref();
    let detail = use_node_ref();

    let on_card_click = {
        let dispatcher = selection.dispatcher();
        Callback::from(move |id: String| dispatcher.dispatch(SelectionAction::Toggle(id)))
    };

    {
        let container = container.clone();
        let track = track.clone();
        let thumb = thumb.clone();
        use_effect_with(runtime.clone(), move |runtime| {
            let mounted = runtime.as_ref().and_then(|runtime| {
                let parts = PanelParts {
                    container: container.cast::<HtmlElement>(),
                    track: track.cast::<HtmlElement>(),
                    thumb: thumb.cast::<HtmlElement>(),
                };
                disable_on_error("experience_panel", mount_panel(parts, runtime, on_card_click))
            });
            move || drop(mounted)
        });
    }

    {
        let runtime = runtime.clone();
        let detail = detail.clone();
        let active_id = selection.0.active().map(str::to_string);
        use_effect_with(active_id, move |active_id| {
            if let Some(runtime) = runtime.as_ref() {
                // The detail changed the page height.
                runtime.page.refresh();
                if active_id.is_some() {
                    scroll_page_to(runtime, detail.cast::<HtmlElement>(), DETAIL_SCROLL_OFFSET);
                }
            }
            || ()
        });
    }

    let on_back = {
        let dispatcher = selection.dispatcher();
        let container = container.clone();
        Callback::from(move |_: MouseEvent| {
            dispatcher.dispatch(SelectionAction::Close);
            if let Some(runtime) = runtime.as_ref() {
                scroll_page_to(runtime, container.cast::<HtmlElement>(), CARDS_SCROLL_OFFSET);
            }
        })
    };

    let active = selection.0.active().and_then(find_experience);

    html! {
        <div class="experience-panel">
            <div id="experienceContainer" class="experience-container" ref={container}>
                { for EXPERIENCES.iter().map(|entry| html! {
                    <article
                        class={classes!("exp-card", selection.0.is_active(entry.id).then_some("exp-active"))}
                        data-exp-id={entry.id}
                    >
                        <h4>{entry.company}</h4>
                        <p>{entry.title}</p>
                    </article>
                }) }
            </div>
            <div id="expScrollbarTrack" class="exp-scrollbar-track" ref={track}>
                <div id="expScrollbarThumb" class="exp-scrollbar-thumb" ref={thumb}></div>
            </div>
            <div
                id="experience-detail-container"
                class={classes!("experience-detail", active.is_some().then_some("visible"))}
                ref={detail}
            >
                { active.map(|entry| render_detail(entry, on_back)).unwrap_or_default() }
            </div>
        </div>
    }
}
