//! Shared utilities: timing, formatting and logging setup

pub mod fast_time;
pub mod logging;
pub mod time;
