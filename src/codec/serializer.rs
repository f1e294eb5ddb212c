// src/codec/serializer.rs
//! Tagged-frame serializer for the FastSerialization stream format
//!
//! The serializer owns the byte sink, tracks the logical stream offset, and
//! emits the file header, tagged frames, length-prefixed strings, and
//! versioned type descriptors. A single entry (root) object is bound at
//! construction: its `BeginObject` frame is written eagerly and stays open
//! until the serializer is closed.
//!
//! # Failure model
//!
//! I/O failures never propagate past this type. If the sink cannot be opened
//! the serializer is permanently inert; if a write or seek fails (or the sink
//! accepts fewer bytes than requested) a sticky latch turns every later
//! operation into a silent no-op. The only observable symptom is a truncated
//! trace file. Tracing must degrade, never destabilize its host.

use crate::codec::sink::{ByteSink, FileSink};
use crate::codec::tag::Tag;
use std::path::Path;
use tracing::{debug, warn};

/// File signature written as the length-prefixed stream header.
pub const SIGNATURE: &str = "!FastSerialization.1";

/// Opaque bookmark for a byte position in the stream.
///
/// Labels count every byte accepted through [`Serializer::write_buffer`],
/// including the file header. Seeking never moves a label: the logical offset
/// is independent of the sink's physical cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamLabel(u32);

impl StreamLabel {
    /// Byte position this label refers to.
    pub fn position(self) -> u32 {
        self.0
    }
}

/// Capability to emit oneself into a serializer.
///
/// Every object write re-emits the full type descriptor built from these
/// methods; descriptors are intentionally not interned.
pub trait Serializable {
    /// Stable, namespaced name recorded in the type descriptor.
    fn type_name(&self) -> &str;

    /// Format version of this object's field layout.
    fn object_version(&self) -> i32 {
        1
    }

    /// Oldest reader version able to decode this layout.
    fn min_reader_version(&self) -> i32 {
        1
    }

    /// Emit this object's fields. May recurse into the serializer to write
    /// nested objects, strings, or raw buffers.
    fn serialize(&self, serializer: &mut Serializer);
}

/// Streaming writer for one trace file
pub struct Serializer {
    /// `None` once closed, or from construction when the sink failed to open.
    sink: Option<Box<dyn ByteSink>>,

    /// Logical stream offset; advances only on buffered writes, never on seek.
    offset: u32,

    /// Sticky write-error latch.
    write_error: bool,

    closed: bool,
}

impl Serializer {
    /// Open `path` for writing and emit the stream header plus the entry
    /// object's opening frame.
    ///
    /// Never fails: if the sink cannot be opened the serializer comes back
    /// permanently inert and every operation is a silent no-op.
    pub fn create<P: AsRef<Path>>(path: P, entry: &dyn Serializable) -> Self {
        match FileSink::create(path.as_ref()) {
            Ok(sink) => Self::with_sink(Box::new(sink), entry),
            Err(e) => {
                warn!("Trace serializer disabled: {}", e);
                Self::detached()
            }
        }
    }

    /// Emit the stream header and entry frame over a caller-supplied sink.
    pub fn with_sink(sink: Box<dyn ByteSink>, entry: &dyn Serializable) -> Self {
        let mut serializer = Self {
            sink: Some(sink),
            offset: 0,
            write_error: false,
            closed: false,
        };

        serializer.write_file_header();

        // Open the entry object's frame. The matching EndObject is deferred
        // until close, so this frame spans the whole file.
        serializer.write_tag(Tag::BeginObject, None);
        serializer.write_serialization_type(entry);

        debug!(
            "Trace serializer ready, entry object {:?} open at offset {}",
            entry.type_name(),
            serializer.offset
        );

        serializer
    }

    /// Serializer with no sink; every operation is a no-op.
    pub(crate) fn detached() -> Self {
        Self {
            sink: None,
            offset: 0,
            write_error: false,
            closed: false,
        }
    }

    fn write_file_header(&mut self) {
        self.write_string(SIGNATURE.as_bytes());
    }

    /// Write a complete object frame: `BeginObject`, type descriptor, the
    /// object's own fields, `EndObject`.
    pub fn write_object(&mut self, object: &dyn Serializable) {
        self.write_tag(Tag::BeginObject, None);
        self.write_serialization_type(object);
        object.serialize(self);
        self.write_tag(Tag::EndObject, None);
    }

    /// Type descriptor block: a nested object frame whose own type is the
    /// null reference, carrying the version pair and the type name.
    fn write_serialization_type(&mut self, object: &dyn Serializable) {
        self.write_tag(Tag::BeginObject, None);
        self.write_tag(Tag::NullReference, None);
        self.write_buffer(&object.object_version().to_le_bytes());
        self.write_buffer(&object.min_reader_version().to_le_bytes());
        self.write_string(object.type_name().as_bytes());
        self.write_tag(Tag::EndObject, None);
    }

    /// Append raw bytes and advance the logical offset by however many bytes
    /// the sink actually accepted.
    pub fn write_buffer(&mut self, bytes: &[u8]) {
        let accepted = self.sink_write(bytes);
        self.offset += accepted as u32;
    }

    /// Length-prefixed byte string: `i32` length, then the bytes verbatim.
    ///
    /// The format does not negotiate a character encoding; callers pass raw
    /// bytes (type names arrive as UTF-8 because they come from `&str`).
    pub fn write_string(&mut self, bytes: &[u8]) {
        self.write_buffer(&(bytes.len() as i32).to_le_bytes());
        self.write_buffer(bytes);
    }

    /// One tag byte, then an optional raw payload.
    pub fn write_tag(&mut self, tag: Tag, payload: Option<&[u8]>) {
        debug_assert!(
            payload.map_or(true, |p| !p.is_empty()),
            "tag payload must be non-empty when supplied"
        );

        self.write_buffer(&[tag.as_u8()]);
        if let Some(payload) = payload {
            self.write_buffer(payload);
        }
    }

    /// Current logical offset. O(1), no I/O.
    pub fn current_label(&self) -> StreamLabel {
        StreamLabel(self.offset)
    }

    /// Move the sink's physical cursor to `label`.
    ///
    /// The logical offset is deliberately left alone: callers must seek back
    /// to a saved label before resuming sequential writes, or use
    /// [`Serializer::patch_buffer`] which does the pairing itself.
    pub fn seek_to_label(&mut self, label: StreamLabel) {
        if self.write_error {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        if let Err(e) = sink.seek(u64::from(label.0)) {
            warn!("Trace sink seek failed, disabling writes: {}", e);
            self.write_error = true;
        }
    }

    /// Overwrite previously reserved bytes at `label`, then restore the
    /// cursor to the current end of stream. The logical offset is unchanged.
    pub fn patch_buffer(&mut self, label: StreamLabel, bytes: &[u8]) {
        let resume = self.current_label();
        self.seek_to_label(label);
        self.sink_write(bytes);
        self.seek_to_label(resume);
    }

    /// Close the entry object's frame and release the sink. Idempotent; also
    /// runs on drop. This is the only path that closes the underlying file.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        self.write_tag(Tag::EndObject, None);

        if self.sink.take().is_some() {
            debug!("Trace serializer closed at offset {}", self.offset);
        }
    }

    /// Raw sink write shared by the sequential and backpatch paths; does not
    /// touch the logical offset. Any failure or short write trips the latch.
    fn sink_write(&mut self, bytes: &[u8]) -> usize {
        if self.write_error {
            return 0;
        }
        let Some(sink) = self.sink.as_mut() else {
            return 0;
        };

        match sink.write(bytes) {
            Ok(accepted) => {
                if accepted != bytes.len() {
                    // The file stays open until close so this layer never
                    // needs a lock; writes simply stop.
                    warn!(
                        "Trace sink accepted {} of {} bytes, disabling writes",
                        accepted,
                        bytes.len()
                    );
                    self.write_error = true;
                }
                accepted
            }
            Err(e) => {
                warn!("Trace sink write failed, disabling writes: {}", e);
                self.write_error = true;
                0
            }
        }
    }
}

impl Drop for Serializer {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::sink::testing::{ErrorSink, MemorySink, SharedBuffer, ShortSink};
    use crate::codec::wire::Reader;
    use proptest::prelude::*;

    struct TestMessage {
        text: String,
    }

    impl TestMessage {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
            }
        }
    }

    impl Serializable for TestMessage {
        fn type_name(&self) -> &str {
            "Tracepipe.TestMessage"
        }

        fn serialize(&self, serializer: &mut Serializer) {
            serializer.write_string(self.text.as_bytes());
        }
    }

    struct Envelope {
        label: String,
        inner: TestMessage,
    }

    impl Serializable for Envelope {
        fn type_name(&self) -> &str {
            "Tracepipe.Envelope"
        }

        fn serialize(&self, serializer: &mut Serializer) {
            serializer.write_string(self.label.as_bytes());
            serializer.write_object(&self.inner);
        }
    }

    /// Parses one object frame of the test types above, checking that every
    /// BeginObject is closed by its own EndObject in nesting order.
    fn read_known_object(reader: &mut Reader<'_>) {
        reader.expect_tag(Tag::BeginObject);
        let (version, min_version, name) = reader.read_type_descriptor();
        assert_eq!(version, 1);
        assert_eq!(min_version, 1);
        match name.as_slice() {
            b"Tracepipe.TestMessage" => {
                reader.read_string();
            }
            b"Tracepipe.Envelope" => {
                reader.read_string();
                read_known_object(reader);
            }
            other => panic!("unexpected type name {:?}", other),
        }
        reader.expect_tag(Tag::EndObject);
    }

    fn memory_serializer(buffer: &SharedBuffer, entry: &dyn Serializable) -> Serializer {
        Serializer::with_sink(Box::new(MemorySink::new(buffer.clone())), entry)
    }

    #[test]
    fn test_header_and_entry_frame() {
        let buffer = SharedBuffer::new();
        let mut serializer = memory_serializer(&buffer, &TestMessage::new("entry"));
        serializer.close();

        let bytes = buffer.bytes();
        let mut reader = Reader::new(&bytes);

        assert_eq!(reader.read_header(), SIGNATURE.as_bytes());
        reader.expect_tag(Tag::BeginObject);
        let (_, _, name) = reader.read_type_descriptor();
        assert_eq!(name, b"Tracepipe.TestMessage");
        reader.expect_tag(Tag::EndObject);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_label_counts_header_bytes() {
        let buffer = SharedBuffer::new();
        let serializer = memory_serializer(&buffer, &TestMessage::new("entry"));

        // 4-byte length prefix + 20 signature bytes, then the entry frame.
        let label = serializer.current_label();
        assert!(label.position() > 24);
        assert_eq!(label.position() as usize, buffer.len());
    }

    #[test]
    fn test_write_object_emits_balanced_nested_frames() {
        let buffer = SharedBuffer::new();
        let mut serializer = memory_serializer(&buffer, &TestMessage::new("entry"));

        let envelope = Envelope {
            label: "outer".to_string(),
            inner: TestMessage::new("inner"),
        };
        serializer.write_object(&envelope);
        serializer.write_object(&TestMessage::new("tail"));
        serializer.close();

        let bytes = buffer.bytes();
        let mut reader = Reader::new(&bytes);
        reader.read_header();
        reader.expect_tag(Tag::BeginObject);
        reader.read_type_descriptor();

        read_known_object(&mut reader);
        read_known_object(&mut reader);

        reader.expect_tag(Tag::EndObject);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_write_string_empty_and_nonempty() {
        let buffer = SharedBuffer::new();
        let mut serializer = memory_serializer(&buffer, &TestMessage::new("entry"));

        let start = buffer.len();
        serializer.write_string(b"");
        serializer.write_string(b"frame data");

        let bytes = buffer.bytes();
        let mut reader = Reader::new(&bytes[start..]);
        assert_eq!(reader.read_string(), b"");
        assert_eq!(reader.read_string(), b"frame data");
    }

    #[test]
    fn test_write_tag_with_payload() {
        let buffer = SharedBuffer::new();
        let mut serializer = memory_serializer(&buffer, &TestMessage::new("entry"));

        let start = buffer.len();
        serializer.write_tag(Tag::ForwardReference, Some(&[0xAA, 0xBB]));

        let bytes = buffer.bytes();
        assert_eq!(&bytes[start..], &[Tag::ForwardReference.as_u8(), 0xAA, 0xBB]);
    }

    #[test]
    fn test_seek_does_not_move_label() {
        let buffer = SharedBuffer::new();
        let mut serializer = memory_serializer(&buffer, &TestMessage::new("entry"));

        let before = serializer.current_label();
        serializer.seek_to_label(StreamLabel(4));
        assert_eq!(serializer.current_label(), before);
        serializer.seek_to_label(before);
    }

    #[test]
    fn test_patch_buffer_overwrites_in_place() {
        let buffer = SharedBuffer::new();
        let mut serializer = memory_serializer(&buffer, &TestMessage::new("entry"));

        let reserved = serializer.current_label();
        serializer.write_buffer(&0u32.to_le_bytes());
        serializer.write_buffer(b"after");
        let end = serializer.current_label();

        serializer.patch_buffer(reserved, &7u32.to_le_bytes());

        // The logical offset is untouched and later writes still append.
        assert_eq!(serializer.current_label(), end);
        serializer.write_buffer(b"!");

        let bytes = buffer.bytes();
        let patched = reserved.position() as usize;
        assert_eq!(&bytes[patched..patched + 4], &7u32.to_le_bytes());
        assert_eq!(&bytes[patched + 4..], b"after!");
    }

    #[test]
    fn test_short_write_latches_and_freezes_stream() {
        let buffer = SharedBuffer::new();
        let budget = 80;
        let mut serializer = Serializer::with_sink(
            Box::new(ShortSink::new(buffer.clone(), budget)),
            &TestMessage::new("entry"),
        );

        // Burn through the remaining budget; the short write trips the latch.
        serializer.write_buffer(&[0u8; 128]);
        assert_eq!(buffer.len(), budget);
        let frozen = serializer.current_label();

        // Every subsequent operation must be a byte-for-byte no-op.
        serializer.write_buffer(b"more");
        serializer.write_string(b"string");
        serializer.write_tag(Tag::BeginObject, None);
        serializer.write_object(&TestMessage::new("object"));
        serializer.close();

        assert_eq!(buffer.len(), budget);
        assert_eq!(serializer.current_label(), frozen);
    }

    #[test]
    fn test_failing_sink_latches_during_construction() {
        let mut serializer =
            Serializer::with_sink(Box::new(ErrorSink), &TestMessage::new("entry"));

        serializer.write_object(&TestMessage::new("ignored"));
        serializer.close();

        assert_eq!(serializer.current_label().position(), 0);
    }

    #[test]
    fn test_create_with_unwritable_path_is_inert() {
        let mut serializer = Serializer::create(
            "/definitely/not/a/real/dir/trace.bin",
            &TestMessage::new("entry"),
        );

        serializer.write_object(&TestMessage::new("ignored"));
        serializer.write_buffer(b"bytes");
        serializer.close();

        assert_eq!(serializer.current_label().position(), 0);
    }

    #[test]
    fn test_close_is_idempotent() {
        let buffer = SharedBuffer::new();
        let mut serializer = memory_serializer(&buffer, &TestMessage::new("entry"));

        serializer.close();
        let len = buffer.len();
        serializer.close();
        drop(serializer);

        // The second close and the drop must not emit another EndObject.
        assert_eq!(buffer.len(), len);
        assert_eq!(buffer.bytes()[len - 1], Tag::EndObject.as_u8());
    }

    proptest! {
        #[test]
        fn prop_write_string_round_trips(payload in proptest::collection::vec(any::<u8>(), 0..256)) {
            let buffer = SharedBuffer::new();
            let mut serializer = memory_serializer(&buffer, &TestMessage::new("entry"));

            let start = buffer.len();
            serializer.write_string(&payload);

            let bytes = buffer.bytes();
            let mut reader = Reader::new(&bytes[start..]);
            prop_assert_eq!(reader.read_string(), payload.as_slice());
            prop_assert_eq!(reader.remaining(), 0);
        }
    }
}
