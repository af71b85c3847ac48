//! The statement pipeline decoupling parsing from evaluation.
//!
//! A bounded FIFO is shared between the parser (producer) and exactly one
//! evaluator worker (consumer). Statements are enqueued and dequeued in
//! source order and the worker processes them sequentially, so the emitted
//! lines match a single-threaded run. For trivial inputs the queueing
//! overhead outweighs the overlap; validation skips the pipeline entirely.

use crate::ast::{GraphLabel, Statement};
use crate::eval::Evaluator;
use crate::prolog::Prolog;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Condvar, Mutex};

/// Maximum queue depth before the producer blocks.
pub const QUEUE_CAPACITY: usize = 1024;
/// Queue depth at which the producer wakes the worker.
pub const WAKE_THRESHOLD: usize = 20;

/// One unit of work: a statement with the resolution state it was parsed
/// under.
///
/// Owned by the queue between enqueue and dequeue, then by whoever
/// evaluates it.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Snapshot of the prefix table and base path at enqueue time.
    pub prolog: Arc<Prolog>,
    /// Graph the statement belongs to, if any.
    pub graph: Option<GraphLabel>,
    /// The statement to evaluate.
    pub statement: Statement,
}

#[derive(Debug, Default)]
struct QueueState {
    entries: VecDeque<Entry>,
    shutdown: bool,
}

/// The FIFO shared between producer and worker.
///
/// Enqueue, dequeue and length inspection all run under the one mutex. The
/// worker blocks on `work_ready` while the queue is empty, the producer on
/// `space_free` while it is full.
#[derive(Debug, Default)]
pub struct StatementQueue {
    state: Mutex<QueueState>,
    work_ready: Condvar,
    space_free: Condvar,
}

impl StatementQueue {
    /// A new, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues an entry.
    ///
    /// The worker is only signalled once the queue is deep enough to be
    /// worth waking; the shutdown signal catches whatever remains below the
    /// threshold.
    pub fn push(&self, entry: Entry) {
        let mut state = self.state.lock().expect("statement queue poisoned");
        while state.entries.len() >= QUEUE_CAPACITY && !state.shutdown {
            state = self
                .space_free
                .wait(state)
                .expect("statement queue poisoned");
        }
        state.entries.push_back(entry);
        if state.entries.len() >= WAKE_THRESHOLD {
            self.work_ready.notify_one();
        }
    }

    /// Signals end of input.
    ///
    /// The worker stops once it observes the flag; entries it has not
    /// dequeued by then are left for the producer's synchronous drain.
    pub fn shutdown(&self) {
        let mut state = self.state.lock().expect("statement queue poisoned");
        state.shutdown = true;
        self.work_ready.notify_one();
        self.space_free.notify_all();
    }

    /// Worker side: blocks until an entry is available or the queue shuts
    /// down. `None` means shutdown.
    fn pop_or_wait(&self) -> Option<Entry> {
        let mut state = self.state.lock().expect("statement queue poisoned");
        loop {
            if state.shutdown {
                return None;
            }
            if let Some(entry) = state.entries.pop_front() {
                self.space_free.notify_one();
                return Some(entry);
            }
            state = self
                .work_ready
                .wait(state)
                .expect("statement queue poisoned");
        }
    }

    /// Removes the next entry without blocking. Used for the tail drain
    /// after the worker has been joined.
    pub fn drain_next(&self) -> Option<Entry> {
        self.state
            .lock()
            .expect("statement queue poisoned")
            .entries
            .pop_front()
    }
}

/// Runs the consumer side: dequeue, evaluate, accumulate the triple count.
///
/// Returns the evaluator with its blank-node state so the producer can
/// drain the queue's tail, plus the count or the I/O error that stopped
/// evaluation. On error the queue is shut down so the producer never blocks
/// on a dead consumer.
pub fn worker<W: Write>(
    queue: &StatementQueue,
    mut evaluator: Evaluator<W>,
) -> (Evaluator<W>, io::Result<u64>) {
    let mut count = 0u64;
    while let Some(entry) = queue.pop_or_wait() {
        match evaluator.eval(&entry) {
            Ok(emitted) => count += emitted,
            Err(err) => {
                queue.shutdown();
                return (evaluator, Err(err));
            }
        }
    }
    tracing::debug!(triples = count, "evaluator worker finished");
    (evaluator, Ok(count))
}
