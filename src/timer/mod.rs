//! Countdown timer
//!
//! This module provides:
//! - **Timer**: the countdown state machine (start/pause/stop/end)
//! - **Options**: tick interval and per-event callback registry
//! - **Measurements**: independent labeled stopwatches
//! - **Config**: TOML file form of the non-callback options
//!
//! # Events
//!
//! Callbacks can be attached for:
//! - `start`: countdown entered `started` (receives remaining ms)
//! - `tick`: periodic notification while started (receives remaining ms)
//! - `pause`, `stop`: explicit transitions
//! - `end`: countdown reached zero on its own

mod config;
mod countdown;
mod error;
mod measure;
mod options;
mod status;


pub use config::TimerConfig;
pub use countdown::{Timer, WeakTimer};
pub use error::ConfigError;
pub use measure::{DEFAULT_LABEL, Measure, MeasureRegistry};
pub use options::{Callback, DEFAULT_TICK_SECS, Event, OptionValue, TICK_KEY, TimerOptions};
pub use status::Status;
