//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry sweep: drops expired cache entries and elapsed rate-limit windows

mod sweep;

pub use sweep::spawn_sweep_task;
