#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

//! This crate provides a dense matrix type whose elementwise
//! operations are split into chunks and run on a reusable
//! pool of worker threads, with the calling thread taking
//! the last chunk itself.

mod config;
mod dispatch;
mod error;
mod global;
mod matrix;
pub mod thread_pool;

#[macro_use]
extern crate failure;
pub use config::{Config, DEFAULT_EPSILON, DEFAULT_LIMIT};
pub use dispatch::{Dispatcher, Partition};
pub use error::{ParmatError, ParmatErrorKind};
pub use global::{chunk_floor, configure, epsilon, global, thread_count};
pub use matrix::{Element, Matrix};

/// Result type used by this crate
pub type Result<T> = core::result::Result<T, ParmatError>;
