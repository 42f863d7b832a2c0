//! Fixed-tick scheduler

use std::ops::ControlFlow;

/// Handle to a scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

type Callback = Box<dyn FnMut(f64) -> ControlFlow<()> + Send>;

struct Task {
    id: TaskId,
    interval: Option<f64>,
    due: f64,
    last_run: f64,
    callback: Callback,
}

/// Runs callbacks on simulated time.
///
/// Time only moves through [`advance`](Self::advance); callbacks receive
/// the time elapsed since they were scheduled or last ran. An interval
/// callback stops by returning [`ControlFlow::Break`].
#[derive(Default)]
pub struct Scheduler {
    now: f64,
    next_id: u64,
    tasks: Vec<Task>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds elapsed since the scheduler was created.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of pending callbacks.
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// Run `callback` every `interval` seconds until it breaks.
    pub fn schedule_interval<F>(&mut self, interval: f64, callback: F) -> TaskId
    where
        F: FnMut(f64) -> ControlFlow<()> + Send + 'static,
    {
        let interval = interval.max(0.0);
        self.push(Some(interval), interval, Box::new(callback))
    }

    /// Run `callback` once, `delay` seconds from now.
    pub fn schedule_once<F>(&mut self, delay: f64, callback: F) -> TaskId
    where
        F: FnOnce(f64) + Send + 'static,
    {
        let mut callback = Some(callback);
        self.push(
            None,
            delay.max(0.0),
            Box::new(move |dt| {
                if let Some(callback) = callback.take() {
                    callback(dt);
                }
                ControlFlow::Break(())
            }),
        )
    }

    /// Drop a pending callback. Returns false if it had already finished.
    pub fn unschedule(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Move time forward and run whatever fell due.
    ///
    /// Each callback runs at most once per call, so a long step never
    /// triggers a burst of catch-up runs.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }
        let now = self.now;

        self.tasks.retain_mut(|task| {
            if task.due > now {
                return true;
            }

            let elapsed = now - task.last_run;
            task.last_run = now;
            let flow = (task.callback)(elapsed);

            match (flow, task.interval) {
                (ControlFlow::Continue(()), Some(interval)) => {
                    task.due += interval;
                    if task.due <= now {
                        task.due = now + interval;
                    }
                    true
                }
                _ => false,
            }
        });
    }

    fn push(&mut self, interval: Option<f64>, delay: f64, callback: Callback) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            interval,
            due: self.now + delay,
            last_run: self.now,
            callback,
        });
        id
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("now", &self.now)
            .field("pending", &self.tasks.len())
            .finish()
    }
}
