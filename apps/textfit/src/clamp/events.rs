//! Clamp signals and the observer registry that delivers them.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampEvent {
    /// A font-size search ran (whether or not it found a fitting size).
    SoftClampAttempted,
    /// The text was truncated.
    HardClampApplied,
    /// The pass left the surface fitting its line budget.
    ClampCompleted,
}

type Handler = Box<dyn FnMut(ClampEvent)>;

/// Handlers registered on one controller, run synchronously in registration
/// order. A handler with a filter only sees that event.
#[derive(Default)]
pub struct ClampObservers {
    handlers: Vec<(Option<ClampEvent>, Handler)>,
}

impl ClampObservers {
    pub fn register(&mut self, filter: Option<ClampEvent>, handler: impl FnMut(ClampEvent) + 'static) {
        self.handlers.push((filter, Box::new(handler)));
    }

    pub fn emit(&mut self, event: ClampEvent) {
        for (filter, handler) in &mut self.handlers {
            if filter.map_or(true, |f| f == event) {
                handler(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ClampObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClampObservers")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// What one remediation pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PassReport {
    pub events: Vec<ClampEvent>,
    /// Inline font size left on the surface, if any.
    pub font_size: Option<f32>,
    /// True when the rendered text differs from the original snapshot.
    pub truncated: bool,
}

impl PassReport {
    pub fn changed(&self) -> bool {
        !self.events.is_empty()
    }
}
