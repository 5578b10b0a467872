use crate::animation::{AnimationEngine, Easing, FrameAnimator, Tween};
use crate::frame::{FrameScheduler, FrameTask};
use crate::source::ScrollSource;
use crate::telemetry::{log_event, LogLevel};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollapsibleStyle {
    pub duration_ms: f64,
    pub open_margin: f64,
    /// Cap on the opened height. `None` opens to the content's own height.
    pub max_height: Option<f64>,
    pub easing: Easing,
}

pub const EDUCATION_CARD: CollapsibleStyle = CollapsibleStyle {
    duration_ms: 250.0,
    open_margin: 30.0,
    max_height: Some(300.0),
    easing: Easing::Power3Out,
};

pub const PROJECT_ACCORDION: CollapsibleStyle = CollapsibleStyle {
    duration_ms: 300.0,
    open_margin: 30.0,
    max_height: None,
    easing: Easing::Power3Out,
};

/// Rendered height and top margin of the collapsible content.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContentBox {
    pub height: f64,
    pub margin: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub open: bool,
    pub from: ContentBox,
    pub to: ContentBox,
    /// Runs 0 to 1; `at` maps it onto the box.
    pub progress: Tween,
}

impl Transition {
    pub fn at(&self, progress: f64) -> ContentBox {
        let lerp = |from: f64, to: f64| from + (to - from) * progress;
        ContentBox {
            height: lerp(self.from.height, self.to.height),
            margin: lerp(self.from.margin, self.to.margin),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Collapsible {
    style: CollapsibleStyle,
    open: bool,
    shown: ContentBox,
}

impl Collapsible {
    pub fn new(style: CollapsibleStyle) -> Self {
        Self {
            style,
            open: false,
            shown: ContentBox::default(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn shown(&self) -> ContentBox {
        self.shown
    }

    /// Flips the state. The transition starts from whatever is on screen, so
    /// toggling mid-animation reverses smoothly.
    pub fn toggle(&mut self, natural_height: f64) -> Transition {
        self.open = !self.open;

        let to = if self.open {
            let natural = natural_height.max(0.0);
            ContentBox {
                height: self.style.max_height.map_or(natural, |cap| natural.min(cap)),
                margin: self.style.open_margin,
            }
        } else {
            ContentBox::default()
        };

        Transition {
            open: self.open,
            from: self.shown,
            to,
            progress: Tween::new(0.0, 1.0, self.style.duration_ms, self.style.easing),
        }
    }

    pub fn show(&mut self, content: ContentBox) {
        self.shown = content;
    }
}

pub trait CollapsibleView {
    fn render(&self, content: ContentBox, open: bool);
}

/// Runs toggles against a view and tells the page scroll source to
/// re-measure once the layout has settled.
pub struct CollapsibleController {
    name: &'static str,
    state: Rc<RefCell<Collapsible>>,
    view: Rc<dyn CollapsibleView>,
    source: Rc<dyn ScrollSource>,
    animator: FrameAnimator,
    task: FrameTask,
    reduced_motion: bool,
}

impl CollapsibleController {
    pub fn new(
        name: &'static str,
        style: CollapsibleStyle,
        view: Rc<dyn CollapsibleView>,
        source: Rc<dyn ScrollSource>,
        frames: Rc<dyn FrameScheduler>,
        reduced_motion: bool,
    ) -> Self {
        let state = Rc::new(RefCell::new(Collapsible::new(style)));
        view.render(ContentBox::default(), false);

        Self {
            name,
            state,
            view,
            source,
            animator: FrameAnimator::new(frames),
            task: FrameTask::idle(),
            reduced_motion,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().is_open()
    }

    pub fn is_animating(&self) -> bool {
        self.task.is_active()
    }

    /// Returns the new open state.
    pub fn toggle(&mut self, natural_height: f64) -> bool {
        self.task.cancel();
        let transition = self.state.borrow_mut().toggle(natural_height);

        log_event(
            LogLevel::Debug,
            "section_toggled",
            serde_json::json!({ "section": self.name, "open": transition.open }),
        );

        if self.reduced_motion {
            self.state.borrow_mut().show(transition.to);
            self.view.render(transition.to, transition.open);
            self.source.refresh();
            return transition.open;
        }

        let on_update = {
            let state = Rc::clone(&self.state);
            let view = Rc::clone(&self.view);
            Box::new(move |progress: f64| {
                let content = transition.at(progress);
                state.borrow_mut().show(content);
                view.render(content, transition.open);
            })
        };
        let on_complete = {
            let source = Rc::clone(&self.source);
            Box::new(move || source.refresh())
        };
        self.task = self.animator.animate(transition.progress, on_update, on_complete);

        transition.open
    }

    pub fn cancel(&self) {
        self.task.cancel();
    }
}

impl Drop for CollapsibleController {
    fn drop(&mut self) {
        self.task.cancel();
    }
}
