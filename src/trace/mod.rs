// src/trace/mod.rs
//! Trace file assembly on top of the codec
//!
//! - **file**: Trace file lifecycle and the backpatched event count
//! - **event**: Captured event records and their field layout
//! - **stack**: Fixed-capacity call-stack snapshots

pub mod event;
pub mod file;
pub mod stack;

pub use event::{EventRecord, EventType, ThreadInfo};
pub use file::TraceFile;
pub use stack::{StackSnapshot, MAX_STACK_DEPTH};
