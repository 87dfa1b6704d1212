//! The text-fit controller.
//!
//! # Pass structure
//! - `clamp` is the single entry point. It suspends watching, runs either the
//!   soft clamp (font-size search, falling back to truncation) or the hard
//!   clamp (truncation only), then resumes watching without another pass.
//! - Every overflow test goes through the measurement protocol in
//!   `measure.rs`, which itself suspends watching, so no write the controller
//!   makes is ever observed as an external change.
//!
//! # Watch lifecycle
//! `Idle` ⇄ `Watching { resize }`. Notifications are pulled with [`TextClamp::pump`]
//! or pushed with [`TextClamp::on_resize`] / [`TextClamp::on_mutations`]; both
//! are ignored while idle.

use tracing::{debug, info, warn};

use crate::clamp::config::{
    ClampConfig, ClampOptions, Length, DEFAULT_ELLIPSIS, DEFAULT_MIN_FONT_SIZE_PX,
    MAX_FONT_SIZE_PX,
};
use crate::clamp::events::{ClampEvent, ClampObservers, PassReport};
use crate::clamp::measure::{self, Measurement};
use crate::clamp::surface::{
    ChangeNotifier, MutationObserverInit, MutationRecord, RenderSurface, ResizeSubscription,
};
use crate::errors::FitError;

/// Tolerance for `lines > max_lines`, absorbing float error in px heights.
const LINE_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Watching { resize: ResizeSubscription },
}

/// Host notifications drained while watching was suspended, still owed a pass.
#[derive(Debug, Default)]
struct Carried {
    records: Vec<MutationRecord>,
    resizes: usize,
}

fn checked_font_size(px: f32) -> Result<f32, FitError> {
    if px > MAX_FONT_SIZE_PX {
        return Err(FitError::FontSizeOutOfRange(px));
    }
    Ok(px)
}

#[derive(Debug)]
pub struct TextClamp<S, N> {
    surface: S,
    notifier: N,
    config: ClampConfig,
    /// Whitespace-split snapshot of the content at construction. Never changes.
    original_words: Vec<String>,
    watch: WatchState,
    carried: Carried,
    observers: ClampObservers,
    last_pass: PassReport,
}

fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

impl<S: RenderSurface, N: ChangeNotifier> TextClamp<S, N> {
    /// Binds a controller to `surface`.
    ///
    /// `maxFontSize` defaults to the surface's computed font size (truncated to
    /// whole px) and `basisLineHeight` to one measurement pass. Both are frozen
    /// from here on.
    pub fn new(mut surface: S, notifier: N, options: ClampOptions) -> Result<Self, FitError> {
        let max_lines = options.checked_max_lines()?;
        let original_words = split_words(&surface.text_content());

        let max_font_size = checked_font_size(match options.max_font_size {
            Some(length) => length.as_px(),
            None => surface.computed_font_size().trunc(),
        })?;
        let min_font_size = checked_font_size(
            options
                .min_font_size
                .map_or(DEFAULT_MIN_FONT_SIZE_PX, Length::as_px),
        )?;
        let basis_line_height = match options.basis_line_height {
            Some(length) => length.as_px(),
            None => measure::measure(&mut surface, max_lines).line_height,
        };

        let config = ClampConfig {
            max_lines,
            use_soft_clamp: options.use_soft_clamp.unwrap_or(true),
            strict: options.strict.unwrap_or(true),
            basis_line_height,
            min_font_size,
            max_font_size,
            ellipsis: options
                .ellipsis
                .unwrap_or_else(|| DEFAULT_ELLIPSIS.to_string()),
        };
        debug!(?config, words = original_words.len(), "text clamp created");

        Ok(TextClamp {
            surface,
            notifier,
            config,
            original_words,
            watch: WatchState::Idle,
            carried: Carried::default(),
            observers: ClampObservers::default(),
            last_pass: PassReport::default(),
        })
    }

    // ── accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &ClampConfig {
        &self.config
    }

    pub fn original_words(&self) -> &[String] {
        &self.original_words
    }

    /// The original snapshot joined by single spaces.
    pub fn original_text(&self) -> String {
        self.original_words.join(" ")
    }

    pub fn watch_state(&self) -> WatchState {
        self.watch
    }

    pub fn is_watching(&self) -> bool {
        matches!(self.watch, WatchState::Watching { .. })
    }

    pub fn last_pass(&self) -> &PassReport {
        &self.last_pass
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Host-side access to the surface. Writes made here while watching are
    /// observed and picked up by the next [`pump`](Self::pump).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Stops watching and hands the collaborators back.
    pub fn into_parts(mut self) -> (S, N) {
        self.unwatch();
        (self.surface, self.notifier)
    }

    // ── signals ────────────────────────────────────────────────────────────

    pub fn on_soft_clamp(&mut self, mut handler: impl FnMut() + 'static) -> &mut Self {
        self.observers
            .register(Some(ClampEvent::SoftClampAttempted), move |_| handler());
        self
    }

    pub fn on_hard_clamp(&mut self, mut handler: impl FnMut() + 'static) -> &mut Self {
        self.observers
            .register(Some(ClampEvent::HardClampApplied), move |_| handler());
        self
    }

    pub fn on_clamp_complete(&mut self, mut handler: impl FnMut() + 'static) -> &mut Self {
        self.observers
            .register(Some(ClampEvent::ClampCompleted), move |_| handler());
        self
    }

    /// Receives every signal.
    pub fn on_event(&mut self, handler: impl FnMut(ClampEvent) + 'static) -> &mut Self {
        self.observers.register(None, handler);
        self
    }

    fn emit(&mut self, event: ClampEvent) {
        debug!(?event, "clamp signal");
        self.last_pass.events.push(event);
        self.observers.emit(event);
    }

    // ── watch lifecycle ────────────────────────────────────────────────────

    /// Subscribes to surface mutations and viewport resizes. When
    /// `clamp_first` is set, one pass runs before subscribing. No-op if
    /// already watching.
    pub fn watch(&mut self, clamp_first: bool) -> &mut Self {
        if self.is_watching() {
            return self;
        }
        if clamp_first {
            self.clamp();
        }
        let resize = self.notifier.subscribe_resize();
        self.surface.observe_mutations(MutationObserverInit::all());
        self.watch = WatchState::Watching { resize };
        self
    }

    /// Drops both subscriptions and any undelivered notifications. No-op if idle.
    pub fn unwatch(&mut self) -> &mut Self {
        self.carried = Carried::default();
        self.detach();
        self
    }

    fn detach(&mut self) {
        if let WatchState::Watching { resize } = self.watch {
            self.notifier.unsubscribe_resize(resize);
            self.surface.disconnect_mutations();
            self.watch = WatchState::Idle;
        }
    }

    /// Runs `f` with watching suspended, restoring the prior state afterwards
    /// without triggering a pass. Host notifications pending at suspension are
    /// kept for the next [`pump`](Self::pump).
    fn suspended<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let WatchState::Watching { resize } = self.watch else {
            return f(self);
        };
        let records = self.surface.take_mutation_records();
        let resizes = self.notifier.take_resize_events(resize);
        self.detach();

        let out = f(self);

        self.watch(false);
        self.carried.records.extend(records);
        self.carried.resizes += resizes;
        out
    }

    /// A viewport resize. Runs one pass if watching.
    pub fn on_resize(&mut self) -> &mut Self {
        if self.is_watching() {
            debug!("viewport resized");
            self.clamp();
        }
        self
    }

    /// One batch of mutation records. Runs one pass if watching and the batch
    /// is non-empty.
    pub fn on_mutations(&mut self, records: &[MutationRecord]) -> &mut Self {
        if self.is_watching() && !records.is_empty() {
            debug!(records = records.len(), "surface mutated");
            self.clamp();
        }
        self
    }

    /// Drains pending notifications: one pass for the pending mutation batch,
    /// one per pending resize. Returns the number of passes run.
    pub fn pump(&mut self) -> usize {
        let WatchState::Watching { resize } = self.watch else {
            return 0;
        };
        let carried = std::mem::take(&mut self.carried);
        let mut records = carried.records;
        records.extend(self.surface.take_mutation_records());
        let resizes = carried.resizes + self.notifier.take_resize_events(resize);

        let mut passes = 0;
        if !records.is_empty() {
            self.on_mutations(&records);
            passes += 1;
        }
        for _ in 0..resizes {
            self.on_resize();
            passes += 1;
        }
        passes
    }

    // ── measurement and decision ───────────────────────────────────────────

    pub fn measure(&mut self) -> Measurement {
        let max_lines = self.config.max_lines;
        self.suspended(|this| measure::measure(&mut this.surface, max_lines))
    }

    /// True when the current rendering exceeds the line budget.
    ///
    /// Strict mode divides by the freshly measured line height; otherwise by
    /// the basis line height captured at construction. Overflow of less than
    /// a thousandth of a line counts as fitting.
    pub fn should_clamp(&mut self) -> bool {
        let measurement = self.measure();
        let line_height = if self.config.strict {
            measurement.line_height
        } else {
            self.config.basis_line_height
        };
        measurement.lines_at(line_height) - self.config.max_lines as f32 > LINE_EPSILON
    }

    // ── remediation ────────────────────────────────────────────────────────

    /// Runs one remediation pass. No-op while the surface has no rendered
    /// height.
    pub fn clamp(&mut self) -> &mut Self {
        self.last_pass = PassReport::default();
        if self.surface.offset_height() <= 0.0 {
            debug!("surface not rendered, skipping clamp");
            return self;
        }

        self.suspended(|this| {
            if this.config.use_soft_clamp {
                this.soft_clamp();
            } else {
                this.hard_clamp();
            }
        });

        self.last_pass.font_size = self
            .surface
            .style_property("font-size")
            .and_then(|v| v.parse::<Length>().ok())
            .map(Length::as_px);
        self.last_pass.truncated = split_words(&self.surface.text_content()) != self.original_words;
        self
    }

    /// Re-renders the original text at the stylesheet font size.
    pub fn restore(&mut self) -> &mut Self {
        let text = self.original_text();
        self.suspended(|this| {
            this.surface.set_text_content(&text);
            this.surface.set_style_property("font-size", "");
        });
        self
    }

    /// Largest font size in `[min_font_size, max_font_size]`, stepping down
    /// 1px at a time and always ending on `min_font_size`, that removes the
    /// overflow. Falls back to the hard clamp at `min_font_size` when none does.
    fn soft_clamp(&mut self) {
        self.surface.set_style_property("font-size", "");
        if !self.should_clamp() {
            return;
        }

        let mut fitted = None;
        for size in font_size_candidates(self.config.min_font_size, self.config.max_font_size) {
            self.surface.set_style_property("font-size", &format!("{size}px"));
            if !self.should_clamp() {
                fitted = Some(size);
                break;
            }
        }

        self.emit(ClampEvent::SoftClampAttempted);
        match fitted {
            Some(font_size) => {
                info!(font_size, "soft clamp fitted text");
                self.emit(ClampEvent::ClampCompleted);
            }
            None => {
                debug!(
                    min_font_size = self.config.min_font_size,
                    "font-size search exhausted"
                );
                self.hard_clamp();
            }
        }
    }

    /// Truncates the original words (plus ellipsis) to fit, then clears any
    /// `min-height` reservation whether or not truncation was needed.
    fn hard_clamp(&mut self) {
        if self.should_clamp() {
            let fits = self.truncate();
            self.emit(ClampEvent::HardClampApplied);
            if fits {
                self.emit(ClampEvent::ClampCompleted);
            }
        }
        self.surface.set_style_property("min-height", "");
    }

    /// Word phase: find the first prefix of the original words that overflows.
    /// Character phase: drop trailing characters of that prefix, rendering it
    /// with the ellipsis, until it fits or nothing is left.
    ///
    /// Returns whether the final rendering fits.
    fn truncate(&mut self) -> bool {
        let mut overflowing = None;
        for len in 0..=self.original_words.len() {
            let candidate = self.original_words[..len].join(" ");
            self.surface.set_text_content(&candidate);
            if self.should_clamp() {
                overflowing = Some(candidate);
                break;
            }
        }
        let Some(mut text) = overflowing else {
            return true;
        };

        loop {
            text.pop();
            let rendered = format!("{text}{}", self.config.ellipsis);
            self.surface.set_text_content(&rendered);
            if !self.should_clamp() {
                info!(text = %rendered, "hard clamp truncated text");
                return true;
            }
            if text.is_empty() {
                warn!(text = %rendered, "text exhausted before fitting line budget");
                return false;
            }
        }
    }
}

/// `max, max - 1, ...` down to `min`, with `min` itself appended when the 1px
/// steps overshoot it. Empty when `min > max`.
fn font_size_candidates(min: f32, max: f32) -> impl Iterator<Item = f32> {
    let steps = if max >= min { (max - min).floor() as u32 + 1 } else { 0 };
    let last = max - steps.saturating_sub(1) as f32;
    let tail = (steps > 0 && last > min).then_some(min);
    (0..steps).map(move |step| max - step as f32).chain(tail)
}
