//! Shared utilities for the MorphoScope workspace.

pub mod buffer3;
pub mod log_setup;
pub mod output;

pub use buffer3::Buffer3;
