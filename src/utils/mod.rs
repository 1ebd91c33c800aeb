//! Shared utilities used across report commands.
//!
//! - [`concurrent`] - all-settled joins for fan-out downloads
//! - [`format`] - number formatting for table output
//! - [`progress`] - download progress bars
//! - [`reader`] - local log file reading with automatic decompression

pub mod concurrent;
pub mod format;
pub mod progress;
pub mod reader;
