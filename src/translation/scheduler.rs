/*!
 * Priority worker pool for paragraph tasks.
 *
 * A fixed number of tokio workers pull jobs from a shared max-heap. Jobs
 * with a higher priority run first; equal priorities run in submission
 * order. The pool is sized from the requests-per-second budget so that the
 * backend's rate limit is kept busy without unbounded bursts.
 */

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Priority of a paragraph with no tokens; costlier paragraphs rank lower
pub const PRIORITY_BASE: i64 = 1_048_576;

/// Scheduling priority for a paragraph of `token_count` tokens.
pub fn priority_for(token_count: usize) -> i64 {
    PRIORITY_BASE - i64::try_from(token_count).unwrap_or(i64::MAX)
}

/// Worker count for a requests-per-second budget: `min(2*qps, qps+5)`.
pub fn worker_count(qps: usize) -> usize {
    (qps * 2).min(qps + 5).max(1)
}

struct QueuedJob {
    priority: i64,
    seq: u64,
    job: BoxFuture<'static, ()>,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Earlier submissions win ties
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Default)]
struct Shared {
    queue: Mutex<BinaryHeap<QueuedJob>>,
    notify: Notify,
    closed: AtomicBool,
    next_seq: AtomicU64,
}

/// Bounded pool of workers executing jobs by priority.
pub struct PriorityWorkerPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl PriorityWorkerPool {
    /// Spawn `workers` workers on the current tokio runtime.
    pub fn new(workers: usize) -> Self {
        let shared = Arc::new(Shared::default());
        let workers = (0..workers.max(1))
            .map(|_| tokio::spawn(worker_loop(Arc::clone(&shared))))
            .collect();
        Self { shared, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job; higher `priority` runs earlier.
    pub fn submit<F>(&self, priority: i64, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let seq = self.shared.next_seq.fetch_add(1, Ordering::SeqCst);
        self.shared.queue.lock().push(QueuedJob {
            priority,
            seq,
            job: Box::pin(job),
        });
        self.shared.notify.notify_one();
    }

    /// Stop accepting work, run everything already queued and wait for the workers.
    pub async fn join(self) {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.notify.notify_waiters();
        for worker in self.workers {
            if let Err(e) = worker.await {
                log::error!("Worker task failed: {}", e);
            }
        }
    }
}

async fn worker_loop(shared: Arc<Shared>) {
    loop {
        let notified = shared.notify.notified();
        tokio::pin!(notified);
        // Register before looking at the queue so a wakeup cannot be missed
        notified.as_mut().enable();

        let next = shared.queue.lock().pop();
        match next {
            Some(queued) => {
                // A panicking job must not take the worker down with it
                if let Err(panic) = AssertUnwindSafe(queued.job).catch_unwind().await {
                    log::error!("Job panicked: {}", panic_message(panic.as_ref()));
                }
            }
            None if shared.closed.load(Ordering::SeqCst) => return,
            None => notified.await,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
