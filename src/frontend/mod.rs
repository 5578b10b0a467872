mod dom;
mod experience;
mod scrollbars;
mod sections;
mod sources;
mod widgets;

use crate::config::{Capabilities, InteractionConfig};
use crate::error::InteractionError;
use crate::frame::FrameScheduler;
use crate::source::ScrollSource;
use crate::telemetry::{self, log_event, LogLevel};
use experience::{ExperiencePanel, EXPERIENCES};
use scrollbars::PageScrollbar;
use sections::{EducationCard, Preloader, ProjectAccordion, ScrollReveals, EDUCATION, PROJECTS};
use sources::{LenisSource, WindowSource};
use std::rc::Rc;
use web_sys::{window, Element};
use widgets::{KpiStat, ScrollTopButton, SkillsTicker, ThemeToggle};
use yew::prelude::*;

const SKILLS: &[&str] = &[
    "SystemVerilog",
    "UVM",
    "Verilog RTL",
    "Python",
    "C++",
    "Java",
    "TypeScript",
    "SQL",
    "AMBA",
    "Digital Design",
];

/// Shared by every widget through a yew context: the resolved config, the
/// probed capabilities and the page's scroll source, all created once at boot.
#[derive(Clone)]
pub struct Runtime {
    pub config: Rc<InteractionConfig>,
    pub capabilities: Capabilities,
    pub page: Rc<dyn ScrollSource>,
    pub frames: Rc<dyn FrameScheduler>,
}

impl PartialEq for Runtime {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.config, &other.config)
            && Rc::ptr_eq(&self.page, &other.page)
            && self.capabilities == other.capabilities
    }
}

fn page_source(frames: Rc<dyn FrameScheduler>) -> Result<Rc<dyn ScrollSource>, InteractionError> {
    match LenisSource::create(frames) {
        Ok(lenis) => {
            log_event(LogLevel::Info, "scroll_engine", serde_json::json!({ "engine": "lenis" }));
            Ok(Rc::new(lenis))
        }
        Err(error) => {
            log_event(
                LogLevel::Info,
                "scroll_engine",
                serde_json::json!({ "engine": "window", "reason": error.to_string() }),
            );
            Ok(Rc::new(WindowSource::create()?))
        }
    }
}

fn boot(root: &Element) -> Result<Runtime, InteractionError> {
    let config = InteractionConfig::from_lookup(|key| root.get_attribute(&format!("data-{key}")));
    telemetry::set_min_level(config.log_level);
    log_event(
        LogLevel::Info,
        "config_resolved",
        serde_json::to_value(&config).unwrap_or_default(),
    );

    let capabilities = dom::probe_capabilities();
    log_event(
        LogLevel::Debug,
        "capabilities",
        serde_json::json!({
            "coarse_pointer": capabilities.coarse_pointer,
            "pointer_capture": capabilities.pointer_capture,
            "reduced_motion": capabilities.reduced_motion,
            "drag": config.drag_enabled(&capabilities),
        }),
    );

    let frames: Rc<dyn FrameScheduler> = Rc::new(dom::RafFrames);
    let page = page_source(Rc::clone(&frames))?;

    Ok(Runtime {
        config: Rc::new(config),
        capabilities,
        page,
        frames,
    })
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub runtime: Option<Runtime>,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let widgets = html! {
        <>
            <Preloader />
            <header class="site-header">
                <ThemeToggle />
            </header>
            <PageScrollbar />
            <section class="experience" aria-label="Experience">
                <ExperiencePanel />
            </section>
            <section class="education" aria-label="Education">
                { for EDUCATION.iter().map(|entry| html! { <EducationCard {entry} /> }) }
            </section>
            <section class="projects" aria-label="Projects">
                { for PROJECTS.iter().map(|project| html! { <ProjectAccordion {project} /> }) }
            </section>
            <section class="skills reveal-up" aria-label="Skills">
                <SkillsTicker skills={SKILLS} />
            </section>
            <section class="kpi-dashboard reveal-up" aria-label="At a glance">
                <KpiStat target={EXPERIENCES.len().to_string()} label="Internships" />
                <KpiStat target="100" suffix="%" label="Functional coverage" />
                <KpiStat target={SKILLS.len().to_string()} label="Core skills" />
            </section>
            <ScrollTopButton />
            <ScrollReveals />
        </>
    };

    match props.runtime.clone() {
        Some(runtime) => html! {
            <ContextProvider<Runtime> context={runtime}>
                { widgets }
            </ContextProvider<Runtime>>
        },
        None => widgets,
    }
}

pub fn run() {
    let root = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("app"))
        .expect("missing #app mount point");

    // Without a runtime the page still renders; every interactive widget
    // stays inert.
    let runtime = match boot(&root) {
        Ok(runtime) => Some(runtime),
        Err(error) => {
            log_event(
                LogLevel::Warn,
                "boot_failed",
                serde_json::json!({ "reason": error.to_string() }),
            );
            None
        }
    };

    yew::Renderer::<App>::with_root_and_props(root, AppProps { runtime }).render();
}
