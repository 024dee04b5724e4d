//! This module contains the ThreadPool trait, the shared queue
//! worker pool that backs every parallel operation, and the
//! handles used to collect results from it.

use crate::Result;

/// ThreadPool trait that describes
/// the functionality of a thread pool capable of
/// spawning and managing threads to perform tasks
pub trait ThreadPool: Send + Sync + Sized {
    /// create a new instance with `threads` live workers
    fn new(threads: usize) -> Result<Self>;

    /// number of live workers
    fn size(&self) -> usize;

    /// Stop every current worker, discard queued jobs and start `threads`
    /// fresh workers. Jobs already running are allowed to finish first.
    fn resize(&self, threads: usize) -> Result<()>;

    /// Stop and join every worker, discarding jobs that have not started.
    /// The pool is left with size 0.
    fn clear(&self);

    /// Queue a job, failing if the pool has no workers.
    ///
    /// A rejected job should be dropped. A dispatch waits for every job it
    /// handed out to run or be dropped, so one the pool keeps but never
    /// runs blocks that dispatch.
    fn execute(&self, job: Job) -> Result<()>;

    /// run `f` on the pool without waiting for it
    fn spawn<F: FnOnce() + Send + 'static>(&self, f: F) -> Result<()> {
        self.execute(Box::new(f))
    }

    /// run `f` on the pool and get a handle to its result
    fn submit<F, T>(&self, f: F) -> Result<TaskHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (job, handle) = task::bind(f);
        self.execute(job)?;
        Ok(handle)
    }
}

mod shared_queue;
pub(crate) mod task;

pub use shared_queue::SharedQueueThreadPool;
pub use task::{Job, TaskHandle};
