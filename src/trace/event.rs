// src/trace/event.rs
//! Captured trace events awaiting serialization
//!
//! An [`EventRecord`] references its event type and producing thread, borrows
//! its payload buffer (never copies it), and captures a tick timestamp at
//! construction. The record knows how to emit its own fields through the
//! serializer's tagged framing.

use crate::codec::serializer::{Serializable, Serializer};
use crate::trace::stack::StackSnapshot;
use crate::utils::clock;

/// Identity of an event schema, as supplied by the event-metadata registry.
#[derive(Debug, Clone)]
pub struct EventType {
    id: u32,
    version: u32,
    name: String,
}

impl EventType {
    pub fn new(id: u32, version: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            version,
            name: name.into(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Producing-thread context for an event.
#[derive(Debug, Clone, Copy)]
pub struct ThreadInfo {
    id: u64,
}

impl ThreadInfo {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// One captured trace event.
///
/// The payload is borrowed from the caller and must outlive the write; the
/// lifetime parameter enforces that contract.
pub struct EventRecord<'a> {
    event_type: &'a EventType,
    thread: &'a ThreadInfo,
    payload: &'a [u8],
    timestamp: u64,
    stack: StackSnapshot,
}

impl<'a> EventRecord<'a> {
    /// Bind an event type, producing thread, and payload; the capture
    /// timestamp is taken here.
    pub fn new(event_type: &'a EventType, thread: &'a ThreadInfo, payload: &'a [u8]) -> Self {
        Self {
            event_type,
            thread,
            payload,
            timestamp: clock::timestamp_ticks(),
            stack: StackSnapshot::new(),
        }
    }

    pub fn event_type(&self) -> &EventType {
        self.event_type
    }

    pub fn thread(&self) -> &ThreadInfo {
        self.thread
    }

    pub fn payload(&self) -> &[u8] {
        self.payload
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn stack(&self) -> &StackSnapshot {
        &self.stack
    }

    /// Mutable handle for an external stack-walker to populate before the
    /// record is serialized.
    pub fn stack_mut(&mut self) -> &mut StackSnapshot {
        &mut self.stack
    }
}

impl Serializable for EventRecord<'_> {
    fn type_name(&self) -> &str {
        "Tracepipe.EventRecord"
    }

    // Field layout, version 1: fixed-order little-endian scalars, then
    // length-prefixed variable data. Layout changes bump object_version.
    fn serialize(&self, serializer: &mut Serializer) {
        serializer.write_buffer(&self.event_type.id().to_le_bytes());
        serializer.write_buffer(&self.event_type.version().to_le_bytes());
        serializer.write_buffer(&self.thread.id().to_le_bytes());
        serializer.write_buffer(&self.timestamp.to_le_bytes());
        serializer.write_string(self.payload);

        let frames = self.stack.frames();
        serializer.write_buffer(&(frames.len() as i32).to_le_bytes());
        for frame in frames {
            serializer.write_buffer(&frame.to_le_bytes());
        }
    }
}
