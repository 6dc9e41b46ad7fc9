//! Shared utilities: buffers, clocks, unit formatting and interrupt handling

pub mod buffer;
pub mod signal;
pub mod time;
pub mod units;
