use failure::{Backtrace, Context, Fail};
use std::fmt;
use std::io;

/// Error Type for the parmat crate
#[derive(Debug)]
pub struct ParmatError {
    inner: Context<ParmatErrorKind>,
}

/// Kinds of possible Errors in parmat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Fail)]
pub enum ParmatErrorKind {
    /// Submitting work to a pool that has no worker threads
    #[fail(display = "ThreadPool has no workers")]
    EmptyPool,
    /// The task was discarded from the queue before any worker ran it
    #[fail(display = "Task abandoned before execution")]
    TaskAbandoned,
    /// A unit of work panicked while running
    #[fail(display = "Task panicked")]
    TaskPanic,
    /// Operand shapes do not agree for the requested operation
    #[fail(display = "Matrix shape mismatch")]
    ShapeMismatch,
    /// The operation requires a square matrix
    #[fail(display = "Matrix is not square")]
    NotSquare,
    /// IoError triggered by thread spawning or config file reads
    #[fail(display = "Io Error")]
    IoError,
    /// Serialization/Deserialization Error triggered by serde
    #[fail(display = "Json parsing error")]
    JsonError,
}

impl ParmatError {
    /// get the kind of the error
    pub fn kind(&self) -> ParmatErrorKind {
        *self.inner.get_context()
    }
}

impl Fail for ParmatError {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl fmt::Display for ParmatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl From<ParmatErrorKind> for ParmatError {
    fn from(kind: ParmatErrorKind) -> ParmatError {
        ParmatError {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<ParmatErrorKind>> for ParmatError {
    fn from(context: Context<ParmatErrorKind>) -> ParmatError {
        ParmatError { inner: context }
    }
}

impl From<io::Error> for ParmatError {
    fn from(error: io::Error) -> ParmatError {
        error.context(ParmatErrorKind::IoError).into()
    }
}

impl From<serde_json::Error> for ParmatError {
    fn from(error: serde_json::Error) -> ParmatError {
        error.context(ParmatErrorKind::JsonError).into()
    }
}

impl From<crossbeam::channel::RecvError> for ParmatError {
    fn from(error: crossbeam::channel::RecvError) -> ParmatError {
        error.context(ParmatErrorKind::TaskAbandoned).into()
    }
}
