//! Virtual clock host
//!
//! Time only moves when [`ManualHost::advance`] is called. Every task that
//! comes due inside the advanced window runs in order of due time, ties broken
//! by registration order, with the clock set to the task's due time while it
//! runs. This makes countdown behavior fully deterministic.

use std::cell::RefCell;
use std::rc::Rc;

use hashbrown::HashMap;

use super::{Host, Task, TaskId};

/// Host backed by a virtual millisecond clock
#[derive(Clone, Default)]
pub struct ManualHost {
    schedule: Rc<RefCell<Schedule>>,
}

#[derive(Default)]
struct Schedule {
    /// Current virtual time
    now: u64,

    /// Next handle to issue (doubles as registration order)
    next_id: u64,

    tasks: HashMap<TaskId, Entry>,
}

struct Entry {
    due: u64,

    /// Re-arm period for repeating tasks
    period: Option<u64>,

    task: Rc<RefCell<Task>>,
}

impl Schedule {
    fn insert(&mut self, due: u64, period: Option<u64>, task: Task) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(
            id,
            Entry {
                due,
                period,
                task: Rc::new(RefCell::new(task)),
            },
        );
        id
    }

    /// Take the earliest task due at or before `limit`, re-arming it if it repeats
    fn pop_due(&mut self, limit: u64) -> Option<Rc<RefCell<Task>>> {
        let (id, due) = self
            .tasks
            .iter()
            .filter(|(_, entry)| entry.due <= limit)
            .map(|(id, entry)| (*id, entry.due))
            .min_by_key(|&(id, due)| (due, id))?;

        self.now = self.now.max(due);
        let mut entry = self.tasks.remove(&id)?;
        let task = Rc::clone(&entry.task);
        if let Some(period) = entry.period {
            entry.due = due + period;
            self.tasks.insert(id, entry);
        }
        Some(task)
    }
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host whose clock starts at `now_ms`
    pub fn starting_at(now_ms: u64) -> Self {
        let host = Self::new();
        host.set_time(now_ms);
        host
    }

    /// Move the clock forward by `ms`, running every task that comes due
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms().saturating_add(ms);
        self.run_until(target);
    }

    /// Run every task due at or before `target`, then set the clock to `target`
    pub fn run_until(&self, target: u64) {
        loop {
            // The schedule borrow must end before the task runs: tasks schedule
            // and cancel on this same host.
            let next = self.schedule.borrow_mut().pop_due(target);
            let Some(task) = next else { break };
            let mut run = task.borrow_mut();
            (&mut *run)();
        }

        let mut schedule = self.schedule.borrow_mut();
        schedule.now = schedule.now.max(target);
    }

    /// Set the clock without running anything
    pub fn set_time(&self, now_ms: u64) {
        self.schedule.borrow_mut().now = now_ms;
    }

    /// Number of scheduled tasks (one-shot and repeating)
    pub fn pending(&self) -> usize {
        self.schedule.borrow().tasks.len()
    }

    /// Check whether a handle is still scheduled
    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.schedule.borrow().tasks.contains_key(&id)
    }
}

impl Host for ManualHost {
    fn now_ms(&self) -> u64 {
        self.schedule.borrow().now
    }

    fn schedule_once(&self, delay_ms: u64, task: Task) -> TaskId {
        let mut schedule = self.schedule.borrow_mut();
        let due = schedule.now.saturating_add(delay_ms);
        schedule.insert(due, None, task)
    }

    fn schedule_repeating(&self, interval_ms: u64, task: Task) -> TaskId {
        let period = interval_ms.max(1);
        let mut schedule = self.schedule.borrow_mut();
        let due = schedule.now.saturating_add(period);
        schedule.insert(due, Some(period), task)
    }

    fn cancel(&self, id: TaskId) {
        self.schedule.borrow_mut().tasks.remove(&id);
    }
}

impl std::fmt::Debug for ManualHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let schedule = self.schedule.borrow();
        f.debug_struct("ManualHost")
            .field("now", &schedule.now)
            .field("pending", &schedule.tasks.len())
            .finish()
    }
}
