//! Isolated script execution and the diagnostic channel out of it.

pub mod channel;
pub mod document;
pub mod host;
