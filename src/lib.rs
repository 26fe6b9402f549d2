pub mod host;
pub mod logging;
pub mod repl;
pub mod timer;

pub use host::{Host, ManualHost, TaskId, TokioHost};
pub use timer::{Callback, Event, OptionValue, Status, Timer, TimerConfig, TimerOptions, WeakTimer};
