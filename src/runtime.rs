//! Dedicated worker that drives async work for synchronous callers.
//!
//! Synchronous callers (a UI event handler, a blocking tool callback) hand a
//! future to [`BackgroundExecutor::block_on`] and wait on a reply channel
//! while the worker thread's own Tokio runtime polls it. The caller never
//! enters the worker's runtime, so calling from inside another runtime is
//! fine. Nested calls made from the worker itself run on a short-lived
//! thread with its own runtime.

use std::future::Future;
use std::sync::mpsc as std_mpsc;
use std::thread::{self, ThreadId};

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::error::BridgeError;

type Job = BoxFuture<'static, ()>;

/// Owns one OS thread running a current-thread Tokio runtime.
///
/// Dropping the executor closes the job queue; the worker exits once the
/// queue drains and any still-running jobs are cancelled with its runtime.
pub struct BackgroundExecutor {
    jobs: mpsc::UnboundedSender<Job>,
    worker_id: ThreadId,
}

impl BackgroundExecutor {
    pub fn new() -> Result<Self, BridgeError> {
        Self::named("genie-bridge-worker")
    }

    pub fn named(name: impl Into<String>) -> Result<Self, BridgeError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();

        let worker = thread::Builder::new().name(name.into()).spawn(move || {
            runtime.block_on(async move {
                while let Some(job) = queue.recv().await {
                    tokio::spawn(job);
                }
            });
            tracing::debug!("Background worker stopped");
        })?;

        Ok(Self {
            jobs,
            worker_id: worker.thread().id(),
        })
    }

    /// Run `future` on the worker and block the current thread until it
    /// completes. From the worker thread itself, the future runs on a fresh
    /// thread instead, since the worker is busy with the caller.
    pub fn block_on<F>(&self, future: F) -> Result<F::Output, BridgeError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        if thread::current().id() == self.worker_id {
            tracing::debug!("Nested block_on, running on a dedicated thread");
            return run_on_fresh_thread(future);
        }

        let (reply, answer) = std_mpsc::sync_channel(1);
        let job: Job = Box::pin(async move {
            let _ = reply.send(future.await);
        });

        self.jobs
            .send(job)
            .map_err(|_| BridgeError::WorkerUnavailable("worker has stopped".into()))?;
        answer
            .recv()
            .map_err(|_| BridgeError::WorkerUnavailable("job dropped before completing".into()))
    }
}

/// Drive `future` to completion on a new thread with its own current-thread
/// runtime and join it.
fn run_on_fresh_thread<F>(future: F) -> Result<F::Output, BridgeError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let nested = thread::Builder::new()
        .name("genie-bridge-nested".into())
        .spawn(move || -> Result<F::Output, BridgeError> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            Ok(runtime.block_on(future))
        })?;

    nested
        .join()
        .map_err(|_| BridgeError::WorkerUnavailable("nested worker thread panicked".into()))?
}

impl std::fmt::Debug for BackgroundExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundExecutor")
            .field("worker_id", &self.worker_id)
            .field("closed", &self.jobs.is_closed())
            .finish()
    }
}
