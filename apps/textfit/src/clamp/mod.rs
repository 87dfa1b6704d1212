// Text-fit controller: fits an element's text into a line budget by shrinking
// its font size and, failing that, truncating it with an ellipsis.
// All work is synchronous; the controller never spawns or yields.

pub mod config;
pub mod controller;
pub mod events;
pub mod measure;
pub mod surface;

pub use config::{ClampConfig, ClampOptions, Length};
pub use controller::{TextClamp, WatchState};
pub use events::{ClampEvent, PassReport};
pub use measure::Measurement;
pub use surface::{
    ChangeNotifier, InlineStyle, MutationObserverInit, MutationRecord, RenderSurface,
    ResizeSubscription,
};
