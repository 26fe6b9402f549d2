//! Host timer primitives
//!
//! A countdown never sleeps on its own. It asks its host for:
//! - **A wall clock**: monotonically increasing milliseconds
//! - **One-shot tasks**: used for the deadline that ends a countdown
//! - **Repeating tasks**: used for periodic tick notifications
//!
//! Two hosts ship with the crate:
//! - [`ManualHost`]: virtual clock advanced explicitly (tests, embedded loops)
//! - [`TokioHost`]: real time on a tokio `LocalSet`

mod manual;
mod runtime;

pub use manual::ManualHost;
pub use runtime::TokioHost;

/// Handle identifying a task scheduled on a host.
///
/// Handles are never reused by the host that issued them, so cancelling a
/// stale handle is always harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

/// Deferred work run by a host when a scheduled task fires
pub type Task = Box<dyn FnMut()>;

/// Clock and scheduling primitives provided by the embedding environment.
///
/// All methods take `&self`; hosts are cheap handles over shared state and are
/// cloned into every timer that uses them. Scheduling never runs the task
/// synchronously.
pub trait Host {
    /// Current time in milliseconds
    fn now_ms(&self) -> u64;

    /// Run `task` once after `delay_ms`
    fn schedule_once(&self, delay_ms: u64, task: Task) -> TaskId;

    /// Run `task` every `interval_ms`, first firing one interval from now
    fn schedule_repeating(&self, interval_ms: u64, task: Task) -> TaskId;

    /// Cancel a scheduled task. Unknown or already fired handles are ignored.
    fn cancel(&self, id: TaskId);
}
