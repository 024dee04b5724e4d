use super::{task, Job, ThreadPool};
use crate::{ParmatErrorKind, Result};
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace};

struct State {
    queue: VecDeque<Job>,
    // workers accepting jobs, 0 while the pool is stopping
    size: usize,
    shutdown: bool,
}

struct Shared {
    state: Mutex<State>,
    // signaled on enqueue and on shutdown
    available: Condvar,
    // worker threads that have not exited yet
    live: AtomicUsize,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        // jobs never run while the lock is held, so the queue stays consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until a job is queued. Returns None once the pool is stopping.
    fn next_job(&self) -> Option<Job> {
        let mut state = self.lock();
        loop {
            if state.shutdown {
                return None;
            }
            if let Some(job) = state.queue.pop_front() {
                return Some(job);
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(id: usize, shared: Arc<Shared>) -> Result<Self> {
        shared.live.fetch_add(1, Ordering::SeqCst);
        let worker_shared = Arc::clone(&shared);
        let spawned = thread::Builder::new()
            .name(format!("parmat-worker-{}", id))
            .spawn(move || {
                run(id, &worker_shared);
                worker_shared.live.fetch_sub(1, Ordering::SeqCst);
            });

        match spawned {
            Ok(handle) => Ok(Self {
                id,
                handle: Some(handle),
            }),
            Err(error) => {
                shared.live.fetch_sub(1, Ordering::SeqCst);
                Err(error.into())
            }
        }
    }
}

fn run(id: usize, shared: &Shared) {
    trace!("Worker {} started", id);
    while let Some(job) = shared.next_job() {
        // catch panics so that the worker can continue running other jobs
        if let Err(payload) = catch_unwind(AssertUnwindSafe(job)) {
            let error = task::panic_error(payload);
            error!("Worker: {}, Error: {}", id, error_chain(&error));
        }
    }
    trace!("Worker {} stopped", id);
}

fn error_chain(error: &crate::ParmatError) -> String {
    use failure::Fail;
    match error.cause() {
        Some(cause) => format!("{}: {}", error, cause),
        None => error.to_string(),
    }
}

/// Shared Queue ThreadPool
/// It maintains a fixed number of workers draining one FIFO queue guarded
/// by a mutex and a condition variable.
///
/// Resizing always stops the current workers and starts fresh ones.
/// Stopping lets every running job finish, drops every job still waiting in
/// the queue (their handles resolve to `TaskAbandoned`) and joins the
/// worker threads.
///
/// # Note:
/// Stopping blocks until every worker has finished its current job, so
/// a job must not call `resize` or `clear` on the pool running it, nor run
/// forever.
///
/// # Example:
///
/// ```
/// use parmat::thread_pool::{ThreadPool, SharedQueueThreadPool};
///
/// let pool = SharedQueueThreadPool::new(4).unwrap();
///
/// let handles: Vec<_> = (0..8u64)
///     .map(|i| pool.submit(move || i * i).unwrap())
///     .collect();
///
/// let squares: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
/// assert_eq!(vec![0, 1, 4, 9, 16, 25, 36, 49], squares);
///
/// // shrinking restarts the pool
/// pool.resize(2).unwrap();
/// assert_eq!(2, pool.size());
/// ```
pub struct SharedQueueThreadPool {
    shared: Arc<Shared>,
    // also serializes resize and clear against each other
    workers: Mutex<Vec<Worker>>,
}

impl SharedQueueThreadPool {
    /// A pool with no workers. Jobs are rejected until it is resized.
    pub fn idle() -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                size: 0,
                shutdown: false,
            }),
            available: Condvar::new(),
            live: AtomicUsize::new(0),
        });

        Self {
            shared,
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Number of worker threads that are still running, including workers
    /// that have been told to stop but have not exited yet.
    pub fn live_workers(&self) -> usize {
        self.shared.live.load(Ordering::SeqCst)
    }

    fn workers(&self) -> MutexGuard<'_, Vec<Worker>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self, workers: &mut Vec<Worker>) {
        let discarded: Vec<Job> = {
            let mut state = self.shared.lock();
            state.shutdown = true;
            state.size = 0;
            state.queue.drain(..).collect()
        };
        self.shared.available.notify_all();

        // dropping a job disconnects its handle
        if !discarded.is_empty() {
            debug!("Discarding {} queued jobs", discarded.len());
        }
        drop(discarded);

        for worker in workers.iter_mut() {
            trace!("Dropping Worker {}", worker.id);
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    error!("Worker {} terminated abnormally", worker.id);
                }
            }
        }
        workers.clear();

        self.shared.lock().shutdown = false;
    }

    fn start(&self, workers: &mut Vec<Worker>, threads: usize) -> Result<()> {
        for id in 0..threads {
            match Worker::spawn(id, Arc::clone(&self.shared)) {
                Ok(worker) => workers.push(worker),
                Err(error) => {
                    self.stop(workers);
                    return Err(error);
                }
            }
        }

        self.shared.lock().size = threads;
        Ok(())
    }
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: usize) -> Result<Self> {
        let pool = Self::idle();
        {
            let mut workers = pool.workers();
            pool.start(&mut workers, threads)?;
        }
        Ok(pool)
    }

    fn size(&self) -> usize {
        self.shared.lock().size
    }

    fn resize(&self, threads: usize) -> Result<()> {
        let mut workers = self.workers();
        debug!("Resizing pool from {} to {} workers", workers.len(), threads);
        self.stop(&mut workers);
        self.start(&mut workers, threads)
    }

    fn clear(&self) {
        let mut workers = self.workers();
        if !workers.is_empty() {
            debug!("Stopping {} workers", workers.len());
        }
        self.stop(&mut workers);
    }

    fn execute(&self, job: Job) -> Result<()> {
        let mut state = self.shared.lock();
        if state.size == 0 {
            return Err(ParmatErrorKind::EmptyPool.into());
        }
        state.queue.push_back(job);
        drop(state);

        self.shared.available.notify_one();
        Ok(())
    }
}

impl Drop for SharedQueueThreadPool {
    fn drop(&mut self) {
        self.clear();
    }
}
