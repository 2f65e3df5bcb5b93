//! Background Tasks Module
//!
//! Contains background tasks that run alongside a cache manager.
//!
//! # Tasks
//! - Reset: clears the store at a configured interval

mod reset;

pub use reset::spawn_reset_task;
