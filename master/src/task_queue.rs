// master/src/task_queue.rs

use mr_common::TaskDescriptor;
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};
use tokio::sync::Notify;

#[derive(Default)]
struct QueueState {
    pending: VecDeque<TaskDescriptor>,
    closed: bool,
}

/// Tasks waiting for a worker during one scheduling call.
///
/// `pop` waits while the queue is empty and returns `None` once the queue has
/// been closed and drained.
#[derive(Default)]
pub struct TaskQueue {
    state: Mutex<QueueState>,
    available: Notify,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, task: TaskDescriptor) {
        self.lock().pending.push_back(task);
        self.available.notify_one();
    }

    pub async fn pop(&self) -> Option<TaskDescriptor> {
        loop {
            // registered before looking at the state, so a push or close that
            // lands in between still wakes us
            let notified = self.available.notified();
            {
                let mut state = self.lock();
                if let Some(task) = state.pending.pop_front() {
                    if !state.pending.is_empty() {
                        self.available.notify_one();
                    }
                    return Some(task);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Wakes every waiting `pop`; pending tasks can still be drained.
    pub fn close(&self) {
        self.lock().closed = true;
        self.available.notify_waiters();
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }
}

/// Counts successful tasks and lets the scheduler wait for a target.
#[derive(Default)]
pub struct CompletionTracker {
    done: AtomicUsize,
    changed: Notify,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one success and returns the new total.
    pub fn record_success(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        self.changed.notify_waiters();
        done
    }

    pub fn completed(&self) -> usize {
        self.done.load(Ordering::SeqCst)
    }

    pub async fn wait_for(&self, target: usize) {
        loop {
            let notified = self.changed.notified();
            if self.completed() >= target {
                return;
            }
            notified.await;
        }
    }
}
