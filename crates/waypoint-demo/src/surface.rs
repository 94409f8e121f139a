#![forbid(unsafe_code)]

//! Text-mode presentation surface: cards stacked in a named window.

use std::rc::Rc;

use tracing::{debug, warn};
use waypoint_core::{
    ArgumentRouteStorage, Arguments, ConcreteStack, Element, ElementFactory, ElementId,
    HasArguments, NavigationDirection, RouteStorage, StackDiff, StackPatcher, TransitionConfig,
    TransitionKind,
};

/// Routes in the demo are plain screen names.
pub type Screen = String;

/// A displayable card.
#[derive(Debug)]
pub struct Card {
    pub serial: u64,
    pub element: ElementId,
    arguments: Option<Arguments>,
}

impl HasArguments for Card {
    fn arguments(&self) -> Option<&Arguments> {
        self.arguments.as_ref()
    }

    fn arguments_mut(&mut self) -> &mut Arguments {
        self.arguments.get_or_insert_with(Arguments::new)
    }
}

/// Builds one [`Card`] per element and tags it with its route.
#[derive(Debug)]
pub struct CardFactory {
    storage: ArgumentRouteStorage<Screen>,
    next_serial: u64,
}

impl CardFactory {
    pub fn new(storage: ArgumentRouteStorage<Screen>) -> Self {
        Self {
            storage,
            next_serial: 1,
        }
    }

    /// Cards built so far.
    pub fn built(&self) -> u64 {
        self.next_serial - 1
    }
}

impl ElementFactory<Screen, String> for CardFactory {
    type Unit = Rc<Card>;

    fn create(&mut self, element: &Element<Screen>, window: &String) -> Rc<Card> {
        debug!(%window, element = %element.id(), route = %element.route(), "building card");
        let mut card = Card {
            serial: self.next_serial,
            element: element.id(),
            arguments: None,
        };
        self.next_serial += 1;
        self.storage.store(&mut card, element.route().clone());
        Rc::new(card)
    }
}

/// Describes each patch as one line of text.
#[derive(Debug)]
pub struct ConsolePatcher {
    storage: ArgumentRouteStorage<Screen>,
    lines: Vec<String>,
}

impl ConsolePatcher {
    pub fn new(storage: ArgumentRouteStorage<Screen>) -> Self {
        Self {
            storage,
            lines: Vec::new(),
        }
    }

    /// Take the lines written since the last drain.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl StackPatcher<Screen, String, Rc<Card>> for ConsolePatcher {
    fn patch(
        &mut self,
        transition: &TransitionConfig,
        window: &String,
        old: &ConcreteStack<Screen, Rc<Card>>,
        new: &ConcreteStack<Screen, Rc<Card>>,
    ) {
        let diff = StackDiff::of_concrete(old, new);
        let showing = match new.top() {
            Some(top) => match self.storage.get(&**top.unit()) {
                Ok(route) => format!("{route} (card #{})", top.unit().serial),
                Err(err) => {
                    warn!(%err, element = %top.unit().element, "card lost its route");
                    format!("? (card #{})", top.unit().serial)
                }
            },
            None => "nothing".to_string(),
        };
        let trail: Vec<&str> = new.routes().map(String::as_str).collect();

        self.lines.push(format!(
            "[{window}] {:<8} {:<13} showing {showing}  stack: {}  (+{} -{})",
            direction_label(diff.direction),
            transition_label(transition),
            if trail.is_empty() {
                "-".to_string()
            } else {
                trail.join(" > ")
            },
            diff.added.len(),
            diff.removed.len(),
        ));
    }
}

fn direction_label(direction: NavigationDirection) -> &'static str {
    match direction {
        NavigationDirection::None => "stay",
        NavigationDirection::Forward => "forward",
        NavigationDirection::Backward => "backward",
        NavigationDirection::Replace => "replace",
    }
}

fn transition_label(transition: &TransitionConfig) -> String {
    let kind = match transition.kind {
        TransitionKind::None => "none",
        TransitionKind::Fade => "fade",
        TransitionKind::Slide => "slide",
        TransitionKind::Scale => "scale",
    };
    format!("{kind} {}ms", transition.effective_duration().as_millis())
}
