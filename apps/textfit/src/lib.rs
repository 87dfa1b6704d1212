//! Fit text into a bounded number of lines.
//!
//! [`TextClamp`] binds to one [`RenderSurface`] and, on demand or in response
//! to change notifications, shrinks the font size (soft clamp) or truncates
//! the text with an ellipsis (hard clamp) until the content fits its line
//! budget. [`layout`] provides a simulated surface for tests and demos.

pub mod clamp;
pub mod errors;
pub mod layout;

pub use clamp::{
    ChangeNotifier, ClampConfig, ClampEvent, ClampOptions, Length, RenderSurface, TextClamp,
};
pub use errors::FitError;
