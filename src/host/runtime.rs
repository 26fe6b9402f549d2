//! Real-time host on the tokio runtime
//!
//! Tasks are spawned with `spawn_local`, so every timer using this host must
//! live inside a `tokio::task::LocalSet`. The clock is `tokio::time::Instant`,
//! which lets tests run against paused time.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use hashbrown::HashMap;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{Host, Task, TaskId};

/// Host backed by tokio timers
#[derive(Clone)]
pub struct TokioHost {
    /// Clock origin; `now_ms` counts from here
    epoch: Instant,

    next_id: Rc<Cell<u64>>,

    handles: Rc<RefCell<HashMap<TaskId, JoinHandle<()>>>>,
}

impl TokioHost {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            next_id: Rc::new(Cell::new(0)),
            handles: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    fn issue_id(&self) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TaskId(id)
    }

    /// Number of tasks that have been scheduled and not yet finished or cancelled
    pub fn pending(&self) -> usize {
        self.handles.borrow().len()
    }
}

impl Default for TokioHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for TokioHost {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn schedule_once(&self, delay_ms: u64, mut task: Task) -> TaskId {
        let id = self.issue_id();
        let handles = Rc::downgrade(&self.handles);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            if let Some(handles) = handles.upgrade() {
                handles.borrow_mut().remove(&id);
            }
            task();
        });
        self.handles.borrow_mut().insert(id, handle);
        id
    }

    fn schedule_repeating(&self, interval_ms: u64, mut task: Task) -> TaskId {
        let id = self.issue_id();
        let period = Duration::from_millis(interval_ms.max(1));
        let handle = tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task();
            }
        });
        self.handles.borrow_mut().insert(id, handle);
        id
    }

    fn cancel(&self, id: TaskId) {
        if let Some(handle) = self.handles.borrow_mut().remove(&id) {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for TokioHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioHost")
            .field("now_ms", &self.now_ms())
            .field("pending", &self.pending())
            .finish()
    }
}
