//! # scheduler
//!
//! The two timer sources the simulator needs, behind one [`Scheduler`] trait:
//!
//! * a **repeating** source driving the price tick;
//! * a **one-shot delayed** source resolving non-market orders.
//!
//! [`TokioScheduler`] runs tasks on the Tokio runtime against the wall
//! clock.  [`ManualScheduler`] keeps a virtual clock that only moves when a
//! test calls [`ManualScheduler::advance`], so timer-driven behaviour can be
//! asserted without sleeping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

pub type Task = Box<dyn FnOnce() + Send + 'static>;
pub type RepeatingTask = Box<dyn FnMut() + Send + 'static>;

// ─── Trait ────────────────────────────────────────────────────────────────────

pub trait Scheduler: Send + Sync {
    /// Current time as seen by this scheduler.
    fn now(&self) -> DateTime<Utc>;

    /// Runs `task` once, `delay` from now.  Not cancellable.
    fn schedule_once(&self, delay: Duration, task: Task);

    /// Runs `task` every `period`, first after one full period.
    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TaskHandle;
}

// ─── TaskHandle ───────────────────────────────────────────────────────────────

/// Cancels a repeating task.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
    abort:     Option<AbortHandle>,
}

impl TaskHandle {
    fn new(abort: Option<AbortHandle>) -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)), abort }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

// ─── TokioScheduler ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
}

impl TokioScheduler {
    /// Binds to the runtime of the calling context.
    ///
    /// # Panics
    /// Outside a Tokio runtime.
    pub fn current() -> Self {
        Self { runtime: Handle::current() }
    }
}

impl Scheduler for TokioScheduler {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn schedule_once(&self, delay: Duration, task: Task) {
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }

    fn schedule_repeating(&self, period: Duration, mut task: RepeatingTask) -> TaskHandle {
        let period = period.max(Duration::from_millis(1));
        let join = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                task();
            }
        });
        TaskHandle::new(Some(join.abort_handle()))
    }
}

// ─── ManualScheduler ──────────────────────────────────────────────────────────

enum JobKind {
    Once(Task),
    Every { period: Duration, task: RepeatingTask },
}

struct Job {
    due:    Duration,
    seq:    u64,
    handle: TaskHandle,
    kind:   JobKind,
}

struct ManualInner {
    elapsed: Duration,
    seq:     u64,
    jobs:    Vec<Job>,
}

impl ManualInner {
    fn push(&mut self, due: Duration, handle: TaskHandle, kind: JobKind) {
        let seq = self.seq;
        self.seq += 1;
        self.jobs.push(Job { due, seq, handle, kind });
    }

    /// Removes the earliest job due at or before `limit`.
    fn pop_due(&mut self, limit: Duration) -> Option<Job> {
        let idx = self
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| job.due <= limit)
            .min_by_key(|(_, job)| (job.due, job.seq))
            .map(|(idx, _)| idx)?;
        Some(self.jobs.swap_remove(idx))
    }
}

/// Deterministic virtual-time scheduler.
pub struct ManualScheduler {
    epoch: DateTime<Utc>,
    inner: Mutex<ManualInner>,
}

impl ManualScheduler {
    /// Starts the virtual clock at `epoch`.
    pub fn starting_at(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            inner: Mutex::new(ManualInner { elapsed: Duration::ZERO, seq: 0, jobs: Vec::new() }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Virtual time elapsed since the epoch.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Jobs still queued, including repeating ones.
    pub fn pending(&self) -> usize {
        self.lock().jobs.iter().filter(|job| !job.handle.is_cancelled()).count()
    }

    /// Moves the clock forward by `by`, running every job that falls due on
    /// the way in due-time order.  Jobs scheduled by a running job are run too
    /// if they fall inside the window.  Returns the number of jobs run.
    pub fn advance(&self, by: Duration) -> usize {
        let limit = self.lock().elapsed + by;
        let mut ran = 0;

        loop {
            // The lock is released while a job runs so it can schedule more.
            let job = {
                let mut inner = self.lock();
                match inner.pop_due(limit) {
                    Some(job) => {
                        inner.elapsed = inner.elapsed.max(job.due);
                        job
                    }
                    None => {
                        inner.elapsed = limit;
                        break;
                    }
                }
            };

            if job.handle.is_cancelled() {
                continue;
            }
            ran += 1;

            match job.kind {
                JobKind::Once(task) => task(),
                JobKind::Every { period, mut task } => {
                    task();
                    let mut inner = self.lock();
                    inner.push(job.due + period, job.handle, JobKind::Every { period, task });
                }
            }
        }
        ran
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        let epoch = Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).single().unwrap_or_default();
        Self::starting_at(epoch)
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = self.elapsed();
        self.epoch + chrono::Duration::milliseconds(elapsed.as_millis() as i64)
    }

    fn schedule_once(&self, delay: Duration, task: Task) {
        let mut inner = self.lock();
        let due = inner.elapsed + delay;
        inner.push(due, TaskHandle::new(None), JobKind::Once(task));
    }

    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TaskHandle {
        let period = period.max(Duration::from_millis(1));
        let handle = TaskHandle::new(None);
        let mut inner = self.lock();
        let due = inner.elapsed + period;
        inner.push(due, handle.clone(), JobKind::Every { period, task });
        handle
    }
}
