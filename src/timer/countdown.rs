//! Countdown state machine
//!
//! A `Timer` counts a duration down to zero against its host's clock.
//!
//! # Lifecycle
//!
//! ```text
//! initialized ──start──▶ started ──pause──▶ paused
//!                          ▲  │               │
//!                          │  └──stop/end──▶ stopped ◀──stop──┘
//!                          └──────start───────┘
//! ```
//!
//! While `started` the timer owns one deadline task and, when a tick
//! callback was registered at start, one repeating tick task. Every exit from
//! `started` cancels both before the status changes.
//!
//! Callbacks run synchronously with no internal borrow held, so they are free
//! to call back into the timer that fired them. A callback is never re-entered:
//! if it causes its own event to fire again, that nested firing is skipped.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::host::{Host, Task, TaskId};

use super::measure::MeasureRegistry;
use super::options::{Callback, Config, Event, OptionValue, TimerOptions};
use super::status::Status;

/// Countdown timer with lifecycle callbacks and labeled stopwatches.
///
/// Cloning yields another handle to the same timer. Mutating methods return
/// `&Self` so calls can be chained.
pub struct Timer<H: Host> {
    state: Rc<RefCell<State<H>>>,
}

struct State<H: Host> {
    host: H,
    status: Status,

    /// Time left; frozen while paused
    remaining_ms: u64,

    /// Clock reading when the timer last entered `started`
    started_at_ms: u64,

    config: Config,

    deadline: Option<TaskId>,
    ticker: Option<TaskId>,

    measures: MeasureRegistry,
}

impl<H: Host> State<H> {
    /// Cancel both host tasks, optionally discarding the remainder
    fn clear(&mut self, reset_remaining: bool) {
        if let Some(id) = self.deadline.take() {
            self.host.cancel(id);
        }
        if let Some(id) = self.ticker.take() {
            self.host.cancel(id);
        }
        if reset_remaining {
            self.remaining_ms = 0;
        }
    }

    fn duration(&self) -> u64 {
        match self.status {
            Status::Started => {
                let elapsed = self.host.now_ms().saturating_sub(self.started_at_ms);
                self.remaining_ms.saturating_sub(elapsed)
            }
            Status::Paused => self.remaining_ms,
            Status::Initialized | Status::Stopped => 0,
        }
    }
}

impl<H: Host> Drop for State<H> {
    fn drop(&mut self) {
        self.clear(false);
    }
}

/// Convert a requested countdown length; unusable values count as absent
fn requested_ms(seconds: Option<f64>) -> Option<u64> {
    let seconds = seconds?;
    if !seconds.is_finite() {
        return None;
    }
    let ms = (seconds * 1000.0).round();
    (ms >= 1.0).then_some(ms as u64)
}

fn fire(callback: Option<Callback>, remaining_ms: u64) {
    if let Some(callback) = callback {
        callback.invoke(remaining_ms);
    }
}

impl<H: Host + Clone + 'static> Timer<H> {
    pub fn new(host: H, options: TimerOptions) -> Self {
        let mut config = Config::default();
        config.merge(options);

        Self {
            state: Rc::new(RefCell::new(State {
                host,
                status: Status::Initialized,
                remaining_ms: 0,
                started_at_ms: 0,
                config,
                deadline: None,
                ticker: None,
                measures: MeasureRegistry::new(),
            })),
        }
    }

    /// Timer with default options
    pub fn with_host(host: H) -> Self {
        Self::new(host, TimerOptions::default())
    }

    pub fn host(&self) -> H {
        self.state.borrow().host.clone()
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Start, resume or restart the countdown.
    ///
    /// - `Some(secs)` sets a new length (replacing any paused remainder)
    /// - `None`, zero, negative or non-finite values resume the remainder
    /// - With nothing to resume, or while already started, this does nothing
    pub fn start(&self, seconds: Option<f64>) -> &Self {
        let requested = requested_ms(seconds);

        let (callback, remaining) = {
            let mut state = self.state.borrow_mut();
            if requested.is_none() && state.remaining_ms == 0 {
                tracing::trace!(?seconds, "start ignored: no duration");
                return self;
            }
            if state.status == Status::Started {
                tracing::trace!(?seconds, "start ignored: already started");
                return self;
            }

            if let Some(ms) = requested {
                state.remaining_ms = ms;
            }

            let deadline = state
                .host
                .schedule_once(state.remaining_ms, self.task(Self::end));
            state.deadline = Some(deadline);

            if state.config.has_callback(Event::Tick) {
                let interval = state.config.tick_ms();
                let ticker = state
                    .host
                    .schedule_repeating(interval, self.task(Self::tick));
                state.ticker = Some(ticker);
            }

            state.started_at_ms = state.host.now_ms();
            state.status = Status::Started;
            tracing::debug!(
                remaining_ms = state.remaining_ms,
                ticking = state.ticker.is_some(),
                "countdown started"
            );

            (state.config.callback(Event::Start), state.duration())
        };

        fire(callback, remaining);
        self
    }

    /// Same as `start(None)`
    pub fn resume(&self) -> &Self {
        self.start(None)
    }

    /// Freeze the remaining time. Only acts while started.
    ///
    /// Pausing at or past the deadline, before the host has run the deadline
    /// task, ends the countdown instead.
    pub fn pause(&self) -> &Self {
        let (event, callback, remaining) = {
            let mut state = self.state.borrow_mut();
            if state.status != Status::Started {
                tracing::trace!(status = %state.status, "pause ignored");
                return self;
            }

            let remaining = state.duration();
            if remaining == 0 {
                state.clear(true);
                state.status = Status::Stopped;
                tracing::debug!("countdown ended on pause");
                (Event::End, state.config.callback(Event::End), 0)
            } else {
                state.remaining_ms = remaining;
                state.clear(false);
                state.status = Status::Paused;
                tracing::debug!(remaining_ms = remaining, "countdown paused");
                (Event::Pause, state.config.callback(Event::Pause), remaining)
            }
        };

        tracing::trace!(%event, "firing");
        fire(callback, remaining);
        self
    }

    /// Abandon the countdown. Only acts while started or paused.
    pub fn stop(&self) -> &Self {
        let callback = {
            let mut state = self.state.borrow_mut();
            if !state.status.is_active() {
                tracing::trace!(status = %state.status, "stop ignored");
                return self;
            }

            state.clear(true);
            state.status = Status::Stopped;
            tracing::debug!("countdown stopped");

            state.config.callback(Event::Stop)
        };

        fire(callback, 0);
        self
    }

    /// Deadline reached
    fn end(&self) {
        let callback = {
            let mut state = self.state.borrow_mut();
            if state.status != Status::Started {
                return;
            }

            state.clear(true);
            state.status = Status::Stopped;
            tracing::debug!("countdown ended");

            state.config.callback(Event::End)
        };

        fire(callback, 0);
    }

    fn tick(&self) {
        let (callback, remaining) = {
            let state = self.state.borrow();
            if state.status != Status::Started {
                return;
            }
            let remaining = state.duration();
            tracing::trace!(remaining_ms = remaining, "tick");
            (state.config.callback(Event::Tick), remaining)
        };

        fire(callback, remaining);
    }

    /// Wrap a timer method as a host task.
    ///
    /// The task holds a weak handle: a dropped timer never fires.
    fn task(&self, run: fn(&Timer<H>)) -> Task {
        let weak = self.downgrade();
        Box::new(move || {
            if let Some(timer) = weak.upgrade() {
                run(&timer);
            }
        })
    }

    /// Handle that does not keep the timer alive.
    ///
    /// Callbacks that drive their own timer should capture this rather than a
    /// clone, which would form a reference cycle through the callback slot.
    pub fn downgrade(&self) -> WeakTimer<H> {
        WeakTimer {
            state: Rc::downgrade(&self.state),
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn status(&self) -> Status {
        self.state.borrow().status
    }

    /// Remaining milliseconds: live while started, frozen while paused, else 0
    pub fn duration(&self) -> u64 {
        self.state.borrow().duration()
    }

    /// Current tick interval in milliseconds
    pub fn tick_interval_ms(&self) -> u64 {
        self.state.borrow().config.tick_ms()
    }

    // ─── Options & callbacks ────────────────────────────────────────────────

    /// Merge a bag of options; fields left unset are untouched
    pub fn options(&self, options: TimerOptions) -> &Self {
        self.state.borrow_mut().config.merge(options);
        self
    }

    /// Set one option by key (`tick`, `onstart`, `ontick`, ...)
    pub fn option(&self, key: &str, value: OptionValue) -> &Self {
        if !self.state.borrow_mut().config.apply(key, value) {
            tracing::trace!(key, "option ignored");
        }
        self
    }

    /// Attach a callback by event name, with or without the `on` prefix
    pub fn on(&self, name: &str, callback: Callback) -> &Self {
        match Event::from_on_name(name) {
            Some(event) => self.on_event(event, callback),
            None => {
                tracing::trace!(name, "on ignored: unknown event");
                self
            }
        }
    }

    pub fn on_event(&self, event: Event, callback: Callback) -> &Self {
        self.state
            .borrow_mut()
            .config
            .set_callback(event, Some(callback));
        self
    }

    /// Detach a callback by event name, or every callback with `"all"`
    pub fn off(&self, name: &str) -> &Self {
        if name.eq_ignore_ascii_case("all") {
            return self.off_all();
        }
        match Event::from_off_name(name) {
            Some(event) => self.off_event(event),
            None => {
                tracing::trace!(name, "off ignored: unknown event");
                self
            }
        }
    }

    pub fn off_event(&self, event: Event) -> &Self {
        self.state.borrow_mut().config.set_callback(event, None);
        self
    }

    /// Detach every callback. The tick interval is kept.
    pub fn off_all(&self) -> &Self {
        self.state.borrow_mut().config.clear_callbacks();
        self
    }

    // ─── Measurements ───────────────────────────────────────────────────────

    /// Begin or resume the stopwatch for `label`
    pub fn measure_start(&self, label: &str) -> &Self {
        let mut state = self.state.borrow_mut();
        let now = state.host.now_ms();
        state.measures.start(label, now);
        self
    }

    /// Pause `label` and return its accumulated milliseconds (0 if unknown)
    pub fn measure_pause(&self, label: &str) -> u64 {
        let mut state = self.state.borrow_mut();
        let now = state.host.now_ms();
        state.measures.pause(label, now)
    }

    /// Milliseconds since `label` last resumed; `None` if unknown
    pub fn measure_lap(&self, label: &str) -> Option<u64> {
        let state = self.state.borrow();
        state.measures.lap(label, state.host.now_ms())
    }

    /// Finish `label`, returning its total; `None` if unknown
    pub fn measure_stop(&self, label: &str) -> Option<u64> {
        let mut state = self.state.borrow_mut();
        let now = state.host.now_ms();
        state.measures.stop(label, now)
    }

    /// Labels with a live measurement
    pub fn measure_labels(&self) -> Vec<String> {
        self.state
            .borrow()
            .measures
            .labels()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

/// Weak counterpart of [`Timer`]
pub struct WeakTimer<H: Host> {
    state: Weak<RefCell<State<H>>>,
}

impl<H: Host> WeakTimer<H> {
    /// The timer, if any strong handle is still alive
    pub fn upgrade(&self) -> Option<Timer<H>> {
        self.state.upgrade().map(|state| Timer { state })
    }
}

impl<H: Host> Clone for WeakTimer<H> {
    fn clone(&self) -> Self {
        Self {
            state: Weak::clone(&self.state),
        }
    }
}

impl<H: Host> Clone for Timer<H> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<H: Host> fmt::Debug for Timer<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => f
                .debug_struct("Timer")
                .field("status", &state.status)
                .field("remaining_ms", &state.remaining_ms)
                .field("measures", &state.measures.len())
                .finish(),
            Err(_) => f.write_str("Timer { <busy> }"),
        }
    }
}
