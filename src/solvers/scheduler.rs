//! Deferred, cancellable execution of traversal steps.
//!
//! A [`Scheduler`] runs a continuation after a delay. Every continuation gets
//! a [`TaskHandle`]; cancelling the handle before the delay elapses means the
//! continuation never runs. Schedulers keep no record of what they hand out,
//! whoever receives the handles owns them.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub trait Scheduler: Clone + Send + 'static {
    /// Runs `task` once `delay` has passed, unless `handle` was cancelled.
    fn schedule(&self, delay: Duration, handle: TaskHandle, task: Task);
}

struct Pending {
    handle: TaskHandle,
    delay: Duration,
    task: Task,
}

/// Queues continuations until the host asks for them, ignoring delays.
///
/// Suited to frame-driven hosts that advance one step per redraw, and to
/// tests that want every step under their control.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    pending: Arc<Mutex<VecDeque<Pending>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Continuations that are queued and not cancelled.
    pub fn pending(&self) -> usize {
        self.queue()
            .iter()
            .filter(|p| !p.handle.is_cancelled())
            .count()
    }

    /// Delay requested by the oldest live continuation.
    pub fn next_delay(&self) -> Option<Duration> {
        self.queue()
            .iter()
            .find(|p| !p.handle.is_cancelled())
            .map(|p| p.delay)
    }

    /// Runs the oldest live continuation, returning false when none is left.
    pub fn run_next(&self) -> bool {
        loop {
            // the lock must be released before the task schedules its successor
            let next = self.queue().pop_front();
            match next {
                None => return false,
                Some(pending) if pending.handle.is_cancelled() => {
                    debug!("dropping cancelled step");
                }
                Some(pending) => {
                    (pending.task)();
                    return true;
                }
            }
        }
    }

    /// Runs continuations, including ones they schedule, until the queue is empty.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, handle: TaskHandle, task: Task) {
        self.queue().push_back(Pending {
            handle,
            delay,
            task,
        });
    }
}

/// Sleeps on the tokio timer before each continuation.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: tokio::runtime::Handle,
}

impl TokioScheduler {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }

    /// Binds to the runtime of the calling context, if there is one.
    pub fn current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, handle: TaskHandle, task: Task) {
        self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if handle.is_cancelled() {
                debug!("dropping cancelled step");
                return;
            }
            task();
        });
    }
}

/// Caller side bookkeeping of every handle a traversal reported.
#[derive(Debug, Default)]
pub struct PendingSteps {
    handles: Vec<TaskHandle>,
}

impl PendingSteps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: TaskHandle) {
        self.handles.push(handle);
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancels and forgets every handle seen so far.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.handles.len();
        for handle in self.handles.drain(..) {
            handle.cancel();
        }
        debug!("cancelled {} pending steps", count);
        count
    }
}
