//! Interactive driver for a single timer
//!
//! Each input line is split shell-style and parsed as a subcommand. The
//! session prints callback activity the same way for every host, so the
//! command handling can be exercised against a virtual clock.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::host::Host;
use crate::timer::{DEFAULT_LABEL, Timer, TimerConfig, TimerOptions};

#[derive(Parser, Debug)]
#[command(about = "countdown session commands")]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Start, resume (no argument) or restart the countdown
    Start {
        #[arg(allow_negative_numbers = true)]
        seconds: Option<f64>,
    },
    Pause,
    Stop,
    Status,
    /// Remaining time
    Duration,
    /// Seconds between ticks (applies from the next start)
    Tick {
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
    },
    /// Labeled stopwatches
    Measure {
        #[command(subcommand)]
        action: MeasureAction,
    },
    Exit,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum MeasureAction {
    Start { label: Option<String> },
    Pause { label: Option<String> },
    Lap { label: Option<String> },
    Stop { label: Option<String> },
}

/// Parse one input line
pub fn parse_line(line: &str) -> Result<Command, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "countdown".to_string());
    let line = Line::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(line.command)
}

/// Rounded whole seconds for display
fn as_secs(ms: u64) -> u64 {
    (ms + 500) / 1000
}

/// Callbacks printing countdown activity to stdout
pub fn printing_options() -> TimerOptions {
    TimerOptions::new()
        .on_start(|ms| println!("{}", as_secs(ms)))
        .on_tick(|ms| println!("{}", as_secs(ms)))
        .on_pause(|| println!("pause"))
        .on_stop(|| println!("stop"))
        .on_end(|| println!("end"))
}

/// Settings persisted between runs (stored with confy)
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplConfig {
    /// TOML timer config loaded when `--config` is not given
    #[serde(default)]
    pub timer_config: Option<PathBuf>,

    /// Countdown length for a bare `start` when the timer config has none
    #[serde(default)]
    pub default_duration_secs: Option<f64>,
}

impl ReplConfig {
    /// Timer config file to load, preferring an explicit path
    pub fn timer_config_path(&self, explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit.or_else(|| self.timer_config.clone())
    }

    /// Fill in defaults the timer config leaves unset
    pub fn apply_to(&self, config: &mut TimerConfig) {
        if config.default_duration_secs.is_none() {
            config.default_duration_secs = self.default_duration_secs;
        }
    }
}

/// A timer plus the defaults used to drive it
pub struct Session<H: Host> {
    timer: Timer<H>,
    default_duration_secs: Option<f64>,
}

impl<H: Host + Clone + 'static> Session<H> {
    pub fn new(timer: Timer<H>, config: &TimerConfig) -> Self {
        timer.options(config.to_options());
        Self {
            timer,
            default_duration_secs: config.default_duration_secs,
        }
    }

    pub fn timer(&self) -> &Timer<H> {
        &self.timer
    }

    /// Run one command. Returns `true` when the session should end.
    pub fn execute(&self, command: Command, out: &mut impl Write) -> io::Result<bool> {
        match command {
            Command::Start { seconds } => {
                // a bare start resumes a paused countdown, otherwise uses the default
                let seconds = match seconds {
                    Some(secs) => Some(secs),
                    None if self.timer.status().is_active() => None,
                    None => self.default_duration_secs,
                };
                self.timer.start(seconds);
            }
            Command::Pause => {
                self.timer.pause();
            }
            Command::Stop => {
                self.timer.stop();
            }
            Command::Status => writeln!(out, "{}", self.timer.status())?,
            Command::Duration => {
                let ms = self.timer.duration();
                writeln!(out, "{ms}ms ({}s)", as_secs(ms))?;
            }
            Command::Tick { seconds } => {
                self.timer.options(TimerOptions::new().tick(seconds));
                writeln!(out, "tick every {}ms", self.timer.tick_interval_ms())?;
            }
            Command::Measure { action } => self.measure(action, out)?,
            Command::Exit => {
                writeln!(out, "quitting...")?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn measure(&self, action: MeasureAction, out: &mut impl Write) -> io::Result<()> {
        match action {
            MeasureAction::Start { label } => {
                self.timer
                    .measure_start(label.as_deref().unwrap_or(DEFAULT_LABEL));
            }
            MeasureAction::Pause { label } => {
                let total = self
                    .timer
                    .measure_pause(label.as_deref().unwrap_or(DEFAULT_LABEL));
                writeln!(out, "{total}ms")?;
            }
            MeasureAction::Lap { label } => {
                match self.timer.measure_lap(label.as_deref().unwrap_or(DEFAULT_LABEL)) {
                    Some(ms) => writeln!(out, "{ms}ms")?,
                    None => writeln!(out, "no such measurement")?,
                }
            }
            MeasureAction::Stop { label } => {
                match self.timer.measure_stop(label.as_deref().unwrap_or(DEFAULT_LABEL)) {
                    Some(ms) => writeln!(out, "{ms}ms")?,
                    None => writeln!(out, "no such measurement")?,
                }
            }
        }
        Ok(())
    }
}
