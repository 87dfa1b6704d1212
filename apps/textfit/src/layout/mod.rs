// Simulated rendering host: font metrics, greedy word-wrap, and an element +
// viewport pair implementing the clamp capability traits. Used by tests and
// the demo binary; it is a stand-in for a real rendering environment.

pub mod element;
pub mod font_metrics;
pub mod viewport;
pub mod wrap;

pub use element::{ElementStyle, SimulatedElement};
pub use font_metrics::{get_metrics, FontFamily};
pub use viewport::SimulatedViewport;
