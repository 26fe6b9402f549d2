//! Timer options and callback registry
//!
//! Options are a closed set: the tick interval plus one callback slot per
//! lifecycle event. Event names coming in as strings are resolved through a
//! fixed lookup table; anything the table does not know is ignored.

use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use phf::phf_map;

/// Default seconds between tick notifications
pub const DEFAULT_TICK_SECS: f64 = 1.0;

/// Option key for the tick interval
pub const TICK_KEY: &str = "tick";

// ═══════════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════════

/// Lifecycle events a callback can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// Countdown entered `started` (receives remaining ms)
    Start,
    /// Periodic notification while started (receives remaining ms)
    Tick,
    Pause,
    Stop,
    /// Countdown ran out on its own
    End,
}

static EVENT_KEYS: phf::Map<&'static str, Event> = phf_map! {
    "onstart" => Event::Start,
    "ontick" => Event::Tick,
    "onpause" => Event::Pause,
    "onstop" => Event::Stop,
    "onend" => Event::End,
};

impl Event {
    pub const ALL: [Event; 5] = [
        Event::Start,
        Event::Tick,
        Event::Pause,
        Event::Stop,
        Event::End,
    ];

    /// Option key of this event's callback slot
    pub fn key(self) -> &'static str {
        match self {
            Event::Start => "onstart",
            Event::Tick => "ontick",
            Event::Pause => "onpause",
            Event::Stop => "onstop",
            Event::End => "onend",
        }
    }

    /// Resolve an exact option key (`onstart`, `ontick`, ...)
    pub fn from_key(key: &str) -> Option<Event> {
        EVENT_KEYS.get(key).copied()
    }

    /// Resolve a name passed to `on`.
    ///
    /// `on` is prepended unless the name already starts with it. Case is kept,
    /// so `"Start"` resolves to nothing.
    pub fn from_on_name(name: &str) -> Option<Event> {
        Self::from_key(&with_on_prefix(name))
    }

    /// Resolve a name passed to `off`: lower-cased, then prefixed like `on`
    pub fn from_off_name(name: &str) -> Option<Event> {
        Self::from_key(&with_on_prefix(&name.to_lowercase()))
    }

    fn slot(self) -> usize {
        self as usize
    }
}

fn with_on_prefix(name: &str) -> Cow<'_, str> {
    if name.starts_with("on") {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("on{name}"))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Callbacks
// ═══════════════════════════════════════════════════════════════════════════

/// A user callback.
///
/// Either form can be attached to any event. `Remaining` callbacks receive the
/// remaining duration in milliseconds at the moment of the event (0 for stop
/// and end, the frozen remainder for pause).
///
/// A callback that triggers its own event again (an `onstart` that restarts
/// the timer, say) is not re-entered: the nested invocation is skipped.
#[derive(Clone)]
pub enum Callback {
    Remaining(Rc<RefCell<dyn FnMut(u64)>>),
    Notify(Rc<RefCell<dyn FnMut()>>),
}

impl Callback {
    pub fn remaining(f: impl FnMut(u64) + 'static) -> Self {
        Callback::Remaining(Rc::new(RefCell::new(f)))
    }

    pub fn notify(f: impl FnMut() + 'static) -> Self {
        Callback::Notify(Rc::new(RefCell::new(f)))
    }

    /// Run the callback. Returns false if it was already running.
    pub(crate) fn invoke(&self, remaining_ms: u64) -> bool {
        let ran = match self {
            Callback::Remaining(f) => f
                .try_borrow_mut()
                .map(|mut f| (&mut *f)(remaining_ms))
                .is_ok(),
            Callback::Notify(f) => f.try_borrow_mut().map(|mut f| (&mut *f)()).is_ok(),
        };
        if !ran {
            tracing::trace!(callback = ?self, "callback skipped: already running");
        }
        ran
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Remaining(_) => f.write_str("Callback::Remaining(..)"),
            Callback::Notify(_) => f.write_str("Callback::Notify(..)"),
        }
    }
}

/// Value for a single keyed option
#[derive(Debug, Clone)]
pub enum OptionValue {
    /// Tick interval in seconds (only valid for `tick`)
    Tick(f64),
    /// Callback (only valid for `on*` keys)
    Callback(Callback),
    /// Clear a callback slot
    Unset,
}

// ═══════════════════════════════════════════════════════════════════════════
// Option bag
// ═══════════════════════════════════════════════════════════════════════════

/// Bag of options to merge into a timer.
///
/// Only fields that are set override the timer's configuration.
#[derive(Debug, Clone, Default)]
pub struct TimerOptions {
    /// Seconds between tick callbacks
    pub tick: Option<f64>,
    pub on_start: Option<Callback>,
    pub on_tick: Option<Callback>,
    pub on_pause: Option<Callback>,
    pub on_stop: Option<Callback>,
    pub on_end: Option<Callback>,
}

impl TimerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(mut self, secs: f64) -> Self {
        self.tick = Some(secs);
        self
    }

    /// Set the callback for `event`
    pub fn with(mut self, event: Event, callback: Callback) -> Self {
        *self.slot_mut(event) = Some(callback);
        self
    }

    pub fn on_start(self, f: impl FnMut(u64) + 'static) -> Self {
        self.with(Event::Start, Callback::remaining(f))
    }

    pub fn on_tick(self, f: impl FnMut(u64) + 'static) -> Self {
        self.with(Event::Tick, Callback::remaining(f))
    }

    pub fn on_pause(self, f: impl FnMut() + 'static) -> Self {
        self.with(Event::Pause, Callback::notify(f))
    }

    pub fn on_stop(self, f: impl FnMut() + 'static) -> Self {
        self.with(Event::Stop, Callback::notify(f))
    }

    pub fn on_end(self, f: impl FnMut() + 'static) -> Self {
        self.with(Event::End, Callback::notify(f))
    }

    fn slot_mut(&mut self, event: Event) -> &mut Option<Callback> {
        match event {
            Event::Start => &mut self.on_start,
            Event::Tick => &mut self.on_tick,
            Event::Pause => &mut self.on_pause,
            Event::Stop => &mut self.on_stop,
            Event::End => &mut self.on_end,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Per-instance configuration
// ═══════════════════════════════════════════════════════════════════════════

/// Resolved configuration owned by one timer instance.
///
/// Always built fresh from `Default`; instances never share it.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    tick_ms: u64,
    callbacks: [Option<Callback>; 5],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_ms: secs_to_tick_ms(DEFAULT_TICK_SECS).unwrap_or(1000),
            callbacks: Default::default(),
        }
    }
}

/// Convert a tick interval, rejecting values that cannot drive a repeating timer
fn secs_to_tick_ms(secs: f64) -> Option<u64> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Some(((secs * 1000.0).round() as u64).max(1))
}

impl Config {
    pub(crate) fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Returns false (and keeps the old interval) for unusable values
    pub(crate) fn set_tick(&mut self, secs: f64) -> bool {
        match secs_to_tick_ms(secs) {
            Some(ms) => {
                self.tick_ms = ms;
                true
            }
            None => false,
        }
    }

    pub(crate) fn callback(&self, event: Event) -> Option<Callback> {
        self.callbacks[event.slot()].clone()
    }

    pub(crate) fn has_callback(&self, event: Event) -> bool {
        self.callbacks[event.slot()].is_some()
    }

    pub(crate) fn set_callback(&mut self, event: Event, callback: Option<Callback>) {
        self.callbacks[event.slot()] = callback;
    }

    pub(crate) fn clear_callbacks(&mut self) {
        self.callbacks = Default::default();
    }

    /// Merge a bag; unset fields leave the current values alone
    pub(crate) fn merge(&mut self, options: TimerOptions) {
        let TimerOptions {
            tick,
            on_start,
            on_tick,
            on_pause,
            on_stop,
            on_end,
        } = options;

        if let Some(secs) = tick {
            if !self.set_tick(secs) {
                tracing::trace!(secs, "ignoring unusable tick interval");
            }
        }

        for (event, callback) in [
            (Event::Start, on_start),
            (Event::Tick, on_tick),
            (Event::Pause, on_pause),
            (Event::Stop, on_stop),
            (Event::End, on_end),
        ] {
            if callback.is_some() {
                self.set_callback(event, callback);
            }
        }
    }

    /// Apply a single keyed option. Returns whether anything changed.
    pub(crate) fn apply(&mut self, key: &str, value: OptionValue) -> bool {
        if key == TICK_KEY {
            return match value {
                OptionValue::Tick(secs) => self.set_tick(secs),
                _ => false,
            };
        }

        let Some(event) = Event::from_key(key) else {
            return false;
        };
        match value {
            OptionValue::Callback(callback) => {
                self.set_callback(event, Some(callback));
                true
            }
            OptionValue::Unset => {
                self.set_callback(event, None);
                true
            }
            OptionValue::Tick(_) => false,
        }
    }
}
