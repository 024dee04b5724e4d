//! Fork-join execution of flat index workloads.
//!
//! A [`Dispatcher`] owns a worker pool and the [`Config`] that decides how
//! each workload is split. Every call partitions `[0, total)`, queues all
//! chunks but the last on the pool, runs the last chunk on the calling
//! thread and waits for every queued chunk before returning, so closures
//! are free to borrow from the caller.

mod partition;

pub use partition::Partition;

use crate::thread_pool::{task, SharedQueueThreadPool, ThreadPool};
use crate::{Config, ParmatError, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use tracing::{debug, trace};

/// Splits workloads over a worker pool according to its [`Config`].
///
/// A dispatcher can be shared between threads. Reconfiguring waits for
/// dispatches that are in flight, and dispatches started afterwards see
/// the new configuration.
///
/// Chunks must not dispatch on, or reconfigure, the dispatcher running
/// them: the outer call holds a pool worker while it waits.
///
/// ```
/// use parmat::{Config, Dispatcher};
///
/// let dispatcher = Dispatcher::new(Config::default().with_threads(3).with_limit(10)).unwrap();
///
/// let input: Vec<u64> = (0..1000).collect();
/// let mut output = vec![0; input.len()];
/// dispatcher
///     .dispatch_mut(&mut output, |start, chunk| {
///         for (offset, value) in chunk.iter_mut().enumerate() {
///             *value = input[start + offset] * 2;
///         }
///     })
///     .unwrap();
/// assert!(output.iter().enumerate().all(|(i, &v)| v == 2 * i as u64));
///
/// let sums = dispatcher
///     .dispatch(input.len(), |start, len| input[start..start + len].iter().sum::<u64>())
///     .unwrap();
/// assert_eq!(input.iter().sum::<u64>(), sums.iter().sum::<u64>());
/// ```
pub struct Dispatcher<P = SharedQueueThreadPool> {
    pool: P,
    config: RwLock<Config>,
}

impl Dispatcher<SharedQueueThreadPool> {
    /// create a dispatcher with its own pool of `config.threads` workers
    pub fn new(config: Config) -> Result<Self> {
        let config = config.normalized();
        let pool = SharedQueueThreadPool::new(config.threads)?;
        Ok(Self {
            pool,
            config: RwLock::new(config),
        })
    }

    /// A dispatcher without workers: every workload runs on the calling
    /// thread until it is reconfigured.
    pub fn sequential() -> Self {
        Self {
            pool: SharedQueueThreadPool::idle(),
            config: RwLock::new(Config::default()),
        }
    }
}

impl<P: ThreadPool> Dispatcher<P> {
    /// create a dispatcher on top of an existing pool, resizing it to `config.threads`
    pub fn with_pool(pool: P, config: Config) -> Result<Self> {
        let config = config.normalized();
        if pool.size() != config.threads {
            pool.resize(config.threads)?;
        }
        Ok(Self {
            pool,
            config: RwLock::new(config),
        })
    }

    /// Replace the configuration, resizing the pool if the thread count
    /// changed.
    ///
    /// If the pool cannot be resized the dispatcher falls back to
    /// sequential execution and the error is returned.
    pub fn configure(&self, config: Config) -> Result<()> {
        let mut config = config.normalized();
        let mut current = self
            .config
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut outcome = Ok(());
        if current.threads != config.threads || self.pool.size() != config.threads {
            if let Err(error) = self.pool.resize(config.threads) {
                config.threads = 0;
                outcome = Err(error);
            }
        }

        debug!(
            "Configured dispatcher: threads {}, limit {}, epsilon {}",
            config.threads, config.limit, config.epsilon
        );
        *current = config;
        outcome
    }

    /// current configuration
    pub fn config(&self) -> Config {
        *self.read_config()
    }

    /// number of pool workers
    pub fn thread_count(&self) -> usize {
        self.read_config().threads
    }

    /// minimum chunk size
    pub fn chunk_floor(&self) -> usize {
        self.read_config().limit
    }

    /// floating point comparison tolerance
    pub fn epsilon(&self) -> f64 {
        self.read_config().epsilon
    }

    /// the underlying pool
    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// how a workload of `total` elements would be split right now
    pub fn partition(&self, total: usize) -> Partition {
        let config = self.read_config();
        Partition::new(total, config.threads, config.limit)
    }

    /// Run `f(start, len)` over chunks tiling `[0, total)` and collect the
    /// chunk results in index order.
    ///
    /// A chunk that panics does not stop the others. Once every chunk has
    /// finished, the first failure in index order is returned.
    pub fn dispatch<F, R>(&self, total: usize, f: F) -> Result<Vec<R>>
    where
        F: Fn(usize, usize) -> R + Sync,
        R: Send,
    {
        self.dispatch_with_config(total, |_, start, len| f(start, len))
    }

    /// Like [`dispatch`](Self::dispatch), but every chunk also sees the
    /// configuration the workload was partitioned with.
    pub fn dispatch_with_config<F, R>(&self, total: usize, f: F) -> Result<Vec<R>>
    where
        F: Fn(&Config, usize, usize) -> R + Sync,
        R: Send,
    {
        let config = self.read_config();
        let partition = Partition::new(total, config.threads, config.limit);
        let (f, config) = (&f, &*config);
        let chunks = partition
            .ranges()
            .map(move |range| move || f(config, range.start, range.len()))
            .collect();

        self.run(&partition, chunks)
    }

    /// Split `out` into disjoint chunks and run `f(start, chunk)` on each,
    /// where `start` is the index of `chunk[0]` within `out`.
    pub fn dispatch_mut<T, F>(&self, out: &mut [T], f: F) -> Result<()>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        let config = self.read_config();
        let partition = Partition::new(out.len(), config.threads, config.limit);
        let f = &f;

        let mut rest = out;
        let mut chunks = Vec::with_capacity(partition.chunk_count());
        for range in partition.ranges() {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len());
            rest = tail;
            chunks.push(move || f(range.start, chunk));
        }

        self.run(&partition, chunks).map(|_| ())
    }

    /// `true` if `f` holds for every chunk
    pub fn dispatch_all<F>(&self, total: usize, f: F) -> Result<bool>
    where
        F: Fn(usize, usize) -> bool + Sync,
    {
        Ok(self.dispatch(total, f)?.into_iter().all(|holds| holds))
    }

    /// `true` if `f` holds for at least one chunk
    pub fn dispatch_any<F>(&self, total: usize, f: F) -> Result<bool>
    where
        F: Fn(usize, usize) -> bool + Sync,
    {
        Ok(self.dispatch(total, f)?.into_iter().any(|holds| holds))
    }

    fn read_config(&self) -> RwLockReadGuard<'_, Config> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    // The caller keeps its config read guard alive for the whole run, which
    // keeps `configure` from resizing the pool underneath it.
    fn run<'env, C, R>(&self, partition: &Partition, mut chunks: Vec<C>) -> Result<Vec<R>>
    where
        C: FnOnce() -> R + Send + 'env,
        R: Send + 'env,
    {
        let local = match chunks.pop() {
            Some(local) => local,
            None => return Ok(Vec::new()),
        };

        trace!(
            "Dispatching {} elements as {} chunks of {}",
            partition.total(),
            partition.chunk_count(),
            partition.chunk_size()
        );

        let mut handles = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let (job, handle) = task::bind(chunk);
            // SAFETY: every handle is joined below, including the handles of
            // jobs the pool rejected, and nothing between here and there is
            // allowed to unwind. A handle only resolves once its job has run
            // or been dropped, so the borrows captured by the job outlive it
            // whatever the pool does with it.
            let job = unsafe { task::erase_lifetime(job) };
            let queued = panic::catch_unwind(AssertUnwindSafe(|| self.pool.execute(job)))
                .unwrap_or_else(|payload| Err(task::panic_error(payload)));
            handles.push((queued, handle));
        }

        let own = panic::catch_unwind(AssertUnwindSafe(local)).map_err(task::panic_error);

        let mut results = Vec::with_capacity(handles.len() + 1);
        let mut failure: Option<ParmatError> = None;
        for (queued, handle) in handles {
            let joined = handle.join();
            match queued.and(joined) {
                Ok(result) => results.push(result),
                Err(error) => {
                    failure.get_or_insert(error);
                }
            }
        }

        match own {
            Ok(result) => results.push(result),
            Err(error) => {
                failure.get_or_insert(error);
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(results),
        }
    }
}
