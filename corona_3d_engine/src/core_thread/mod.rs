//! Core thread module
//!
//! The core thread is the single thread that owns the graphics device.
//! Producer threads never touch core-owned state directly: they package
//! work into commands and hand them to [`CoreThread`], which drains them
//! in order on the core thread.

mod async_op;
mod command;
mod core_thread;
mod queue_flags;
mod release_queue;

pub use async_op::AsyncOp;
pub use core_thread::{CoreThread, CoreThreadConfig};
pub use queue_flags::CoreThreadQueueFlags;
pub(crate) use release_queue::defer_release;
