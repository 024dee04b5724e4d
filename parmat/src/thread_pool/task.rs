use crate::{ParmatError, ParmatErrorKind, Result};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use tracing::debug;

/// A unit of work as it sits in a pool's queue
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Same as [`Job`] but allowed to borrow from the submitting stack frame
pub(crate) type ScopedJob<'env> = Box<dyn FnOnce() + Send + 'env>;

/// Caller side of a submitted unit of work.
///
/// The result slot is a one-shot channel. The sending half travels with
/// the job, so a job that is dropped from the queue without running
/// disconnects the channel and the handle resolves to
/// [`ParmatErrorKind::TaskAbandoned`] instead of blocking forever.
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: Receiver<thread::Result<T>>,
}

impl<T> TaskHandle<T> {
    /// block until the task has run (or was discarded) and take its result
    pub fn join(self) -> Result<T> {
        let outcome = self.receiver.recv()?;
        outcome.map_err(panic_error)
    }

    /// Take the result if it is ready, otherwise hand the handle back.
    pub fn try_join(self) -> std::result::Result<Result<T>, Self> {
        match self.receiver.try_recv() {
            Ok(outcome) => Ok(outcome.map_err(panic_error)),
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Disconnected) => Ok(Err(ParmatErrorKind::TaskAbandoned.into())),
        }
    }
}

/// Wrap `f` so that its return value, or the panic it raised, lands in the
/// returned handle.
pub(crate) fn bind<'env, F, T>(f: F) -> (ScopedJob<'env>, TaskHandle<T>)
where
    F: FnOnce() -> T + Send + 'env,
    T: Send + 'env,
{
    let (sender, receiver) = channel::bounded(1);
    let bound = Bound { f, sender };
    let job: ScopedJob<'env> = Box::new(move || {
        let Bound { f, sender } = bound;
        let outcome = panic::catch_unwind(AssertUnwindSafe(f));
        if sender.send(outcome).is_err() {
            debug!("Receiving End is dropped");
        }
    });

    (job, TaskHandle { receiver })
}

// Fields drop in declaration order: an unexecuted job releases its
// closure before the sender disconnects and wakes the handle.
struct Bound<F, T> {
    f: F,
    sender: Sender<thread::Result<T>>,
}

/// Extend a scoped job's lifetime so it can be queued on a pool.
///
/// # Safety
///
/// Everything the job borrows must outlive the job: the caller may not leave
/// the `'env` scope until the job has either finished running or been dropped
/// unexecuted. Waiting on the [`TaskHandle`] produced by [`bind`] establishes
/// exactly that, because the handle only resolves once the job's sender has
/// been consumed or dropped.
pub(crate) unsafe fn erase_lifetime(job: ScopedJob<'_>) -> Job {
    std::mem::transmute::<ScopedJob<'_>, Job>(job)
}

/// Turn a caught panic payload into a `TaskPanic` error carrying its message
pub(crate) fn panic_error(payload: Box<dyn Any + Send>) -> ParmatError {
    let message = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    };

    failure::err_msg(message)
        .context(ParmatErrorKind::TaskPanic)
        .into()
}
