//! Bounded-concurrency work queue.
//!
//! A single dispatcher takes submitted tasks in order and starts each one as
//! soon as a semaphore permit is free, so tasks start in submission order and
//! never more than `max_concurrency` run at once. The per-task timeout starts
//! when the task starts, not while it waits for a slot.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::{debug, warn};

use crate::metrics::set_queue_depth;

type Job = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Why a queued task did not produce a value.
#[derive(Debug, Error)]
pub enum TaskError<E> {
    #[error("{0}")]
    Failed(E),

    #[error("Task timed out after {0:?}")]
    Timeout(Duration),

    /// The task panicked or was dropped before reporting.
    #[error("Task aborted before completion")]
    Aborted,
}

struct Counters {
    in_flight: AtomicUsize,
    pending: AtomicUsize,
}

impl Counters {
    fn publish(&self) {
        set_queue_depth(
            self.in_flight.load(Ordering::SeqCst),
            self.pending.load(Ordering::SeqCst),
        );
    }
}

/// Decrements the in-flight count when a task ends, including by panic.
struct InFlightGuard(Arc<Counters>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.0.publish();
    }
}

/// Process-wide task queue. Cloning shares the same queue.
#[derive(Clone)]
pub struct WorkQueue {
    sender: mpsc::UnboundedSender<Job>,
    counters: Arc<Counters>,
    max_concurrency: usize,
    task_timeout: Duration,
}

impl WorkQueue {
    /// Create a queue and spawn its dispatcher.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(max_concurrency: usize, task_timeout: Duration) -> Self {
        let max_concurrency = max_concurrency.max(1);
        let (sender, receiver) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters {
            in_flight: AtomicUsize::new(0),
            pending: AtomicUsize::new(0),
        });

        tokio::spawn(dispatch(
            receiver,
            Arc::new(Semaphore::new(max_concurrency)),
            Arc::clone(&counters),
        ));

        debug!(max_concurrency, ?task_timeout, "Work queue started");

        Self {
            sender,
            counters,
            max_concurrency,
            task_timeout,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn task_timeout(&self) -> Duration {
        self.task_timeout
    }

    /// Tasks currently running.
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Tasks waiting for a slot.
    pub fn pending(&self) -> usize {
        self.counters.pending.load(Ordering::SeqCst)
    }

    /// Queue a task. The returned handle resolves with its outcome.
    pub fn submit<F, T, E>(&self, task: F) -> TaskHandle<T, E>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let timeout = self.task_timeout;

        let job: Job = Box::pin(async move {
            let outcome = match tokio::time::timeout(timeout, task).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(TaskError::Failed(err)),
                Err(_) => Err(TaskError::Timeout(timeout)),
            };
            // The submitter may have stopped waiting.
            let _ = tx.send(outcome);
        });

        self.counters.pending.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(job).is_err() {
            // Dispatcher is gone; the dropped job resolves the handle as aborted.
            self.counters.pending.fetch_sub(1, Ordering::SeqCst);
            warn!("Work queue dispatcher stopped, task rejected");
        }
        self.counters.publish();

        TaskHandle { rx }
    }

    /// Run tasks through the queue and wait for every one to settle.
    ///
    /// Outcomes are returned in input order.
    pub async fn run_all<I, F, T, E>(&self, tasks: I) -> Vec<Result<T, TaskError<E>>>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let handles: Vec<_> = tasks.into_iter().map(|task| self.submit(task)).collect();
        join_all(handles).await
    }
}

async fn dispatch(
    mut receiver: mpsc::UnboundedReceiver<Job>,
    semaphore: Arc<Semaphore>,
    counters: Arc<Counters>,
) {
    while let Some(job) = receiver.recv().await {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };

        counters.pending.fetch_sub(1, Ordering::SeqCst);
        counters.in_flight.fetch_add(1, Ordering::SeqCst);
        counters.publish();

        let guard = InFlightGuard(Arc::clone(&counters));
        tokio::spawn(async move {
            let _permit = permit;
            let _guard = guard;
            job.await;
        });
    }
    debug!("Work queue dispatcher stopped");
}

/// Outcome of a submitted task.
pub struct TaskHandle<T, E> {
    rx: oneshot::Receiver<Result<T, TaskError<E>>>,
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = Result<T, TaskError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(TaskError::Aborted)))
    }
}
