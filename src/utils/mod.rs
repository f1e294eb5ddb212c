// src/utils/mod.rs
//! Common utilities
//!
//! - **errors**: Codec error types and result alias
//! - **clock**: Monotonic tick source for event timestamps

pub mod clock;
pub mod errors;

pub use errors::{CodecError, Result};
