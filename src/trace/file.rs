// src/trace/file.rs
//! Trace file lifecycle: open, append events, backpatch the count, close
//!
//! A [`TraceFile`] is the entry object for one serialized trace. At creation
//! it reserves a fixed-width field right after the entry frame and writes a
//! placeholder there; every [`TraceFile::write_event`] appends one event
//! frame; close backpatches the reserved field with the final event count and
//! emits the root `EndObject`.

use crate::codec::serializer::{Serializable, Serializer, StreamLabel};
use crate::codec::sink::ByteSink;
use crate::trace::event::EventRecord;
use crate::utils::clock;
use std::path::Path;
use tracing::debug;

/// Writer for one trace file
pub struct TraceFile {
    serializer: Serializer,

    /// Tick when the file was opened; the time origin for readers computing
    /// event-relative timestamps.
    open_timestamp: u64,

    /// Running count of appended events.
    events_written: u32,

    /// Position of the reserved event-count field, backpatched on close.
    events_written_label: StreamLabel,

    finished: bool,
}

impl TraceFile {
    /// Open a trace file at `path`.
    ///
    /// Never fails: if the destination cannot be opened the file is inert and
    /// every operation (including close) is a silent no-op.
    pub fn create<P: AsRef<Path>>(path: P) -> Self {
        let mut file = Self::unbound();
        let serializer = Serializer::create(path.as_ref(), &file);
        file.bind(serializer);
        file
    }

    /// Open a trace over a caller-supplied sink.
    pub fn from_sink(sink: Box<dyn ByteSink>) -> Self {
        let mut file = Self::unbound();
        let serializer = Serializer::with_sink(sink, &file);
        file.bind(serializer);
        file
    }

    fn unbound() -> Self {
        Self {
            serializer: Serializer::detached(),
            open_timestamp: clock::timestamp_ticks(),
            events_written: 0,
            events_written_label: StreamLabel::default(),
            finished: false,
        }
    }

    fn bind(&mut self, serializer: Serializer) {
        self.serializer = serializer;

        // Reserve space for the final event count.
        self.events_written_label = self.serializer.current_label();
        self.serializer
            .write_buffer(&self.events_written.to_le_bytes());

        debug!(
            "Trace file open, event count reserved at offset {}",
            self.events_written_label.position()
        );
    }

    /// Append one event frame. Single-writer: callers must not invoke this
    /// concurrently on the same instance.
    pub fn write_event(&mut self, record: &EventRecord<'_>) {
        self.serializer.write_object(record);
        self.events_written += 1;
    }

    /// Events appended so far (counted even while the sink is faulted).
    pub fn events_written(&self) -> u32 {
        self.events_written
    }

    /// Tick captured when the file was opened.
    pub fn open_timestamp(&self) -> u64 {
        self.open_timestamp
    }

    /// Backpatch the reserved count and close the serializer. Also runs on
    /// drop; explicit close just makes the intent readable.
    pub fn close(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        debug!("Closing trace file after {} events", self.events_written);

        // The backpatch is always attempted; on a faulted sink the reserved
        // field simply keeps its placeholder value.
        self.serializer
            .patch_buffer(self.events_written_label, &self.events_written.to_le_bytes());
        self.serializer.close();
    }
}

impl Drop for TraceFile {
    fn drop(&mut self) {
        self.finish();
    }
}

impl Serializable for TraceFile {
    fn type_name(&self) -> &str {
        "Tracepipe.TraceFile"
    }

    fn serialize(&self, _serializer: &mut Serializer) {
        // The trace file is the entry object: its frame is opened at creation
        // and closed by the serializer, never through the generic object path.
        debug_assert!(false, "TraceFile::serialize must never be called");
    }
}
