#![doc = include_str!("../README.md")]

mod error;
mod group;
mod guarded;
mod pool;
mod queue;
mod runner;

pub use crate::error::*;
pub use crate::group::*;
pub use crate::guarded::*;
pub use crate::pool::*;
pub use crate::queue::*;
pub use crate::runner::*;
