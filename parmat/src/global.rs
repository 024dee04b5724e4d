//! Process-wide dispatcher.
//!
//! Matrix operations take an explicit [`Dispatcher`]; this module keeps one
//! around for callers that want a single configuration shared by the whole
//! process. It starts out sequential.

use crate::{Config, Dispatcher, Result};
use std::sync::OnceLock;

static GLOBAL: OnceLock<Dispatcher> = OnceLock::new();

/// the process-wide dispatcher, created sequential on first use
pub fn global() -> &'static Dispatcher {
    GLOBAL.get_or_init(Dispatcher::sequential)
}

/// Reconfigure the process-wide dispatcher.
///
/// ```
/// use parmat::Config;
///
/// parmat::configure(Config::default().with_threads(2).with_limit(0)).unwrap();
/// assert_eq!(2, parmat::thread_count());
/// assert_eq!(1, parmat::chunk_floor());
/// ```
pub fn configure(config: Config) -> Result<()> {
    global().configure(config)
}

/// worker threads of the process-wide dispatcher
pub fn thread_count() -> usize {
    global().thread_count()
}

/// minimum chunk size of the process-wide dispatcher
pub fn chunk_floor() -> usize {
    global().chunk_floor()
}

/// comparison tolerance of the process-wide dispatcher
pub fn epsilon() -> f64 {
    global().epsilon()
}
