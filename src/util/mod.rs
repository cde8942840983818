//! Utility modules: polling for long-running remote operations.

pub mod poll;
