mod config;

use anyhow::Result;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use textfit::layout::{ElementStyle, SimulatedElement, SimulatedViewport};
use textfit::{ClampEvent, RenderSurface, TextClamp};

use crate::config::Config;

const DEFAULT_HEADINGS: [&str; 2] = [
    "Travis Van Couvering",
    "Notes on fitting headings into narrow columns",
];

/// Outcome for one heading after the initial fit and a simulated narrowing resize.
#[derive(Debug, Serialize)]
struct HeadingReport {
    original: String,
    rendered: String,
    font_size_px: f32,
    lines: usize,
    width_px: f32,
    events: Vec<ClampEvent>,
}

fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting textfit v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let headings: Vec<String> = if args.is_empty() {
        DEFAULT_HEADINGS.iter().map(|h| h.to_string()).collect()
    } else {
        args
    };

    let reports = headings
        .iter()
        .map(|heading| fit_heading(heading, &config))
        .collect::<Result<Vec<_>>>()?;

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

/// Binds a watching controller to a simulated heading, then narrows the
/// container by a quarter and lets the resize notification re-fit it.
fn fit_heading(heading: &str, config: &Config) -> Result<HeadingReport> {
    let stylesheet = ElementStyle {
        font: config.font,
        font_size_px: config.font_size_px,
        ..ElementStyle::default()
    };
    let element = SimulatedElement::new(heading, config.width_px, stylesheet);
    let viewport = SimulatedViewport::new(config.width_px);
    let mut clamp = TextClamp::new(element, viewport, config.clamp_options())?;

    let events = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = std::rc::Rc::clone(&events);
    clamp.on_event(move |event| sink.borrow_mut().push(event));
    clamp.watch(true);

    let narrowed = (config.width_px * 0.75).floor();
    clamp.surface_mut().set_width(narrowed);
    clamp.notifier_mut().resize(narrowed);
    let passes = clamp.pump();
    info!(heading, passes, width = narrowed, "heading re-fitted after resize");

    let surface = clamp.surface();
    let events = events.borrow().clone();
    Ok(HeadingReport {
        original: clamp.original_text(),
        rendered: surface.text_content(),
        font_size_px: surface.computed_font_size(),
        lines: surface.line_count(),
        width_px: surface.width(),
        events,
    })
}
