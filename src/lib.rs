// src/lib.rs
//! Tracepipe: streaming binary trace-event codec
//!
//! Persists a sequence of runtime trace events to a file as they occur,
//! without buffering the whole trace in memory and without letting I/O
//! failures reach the producing threads.
//!
//! # Architecture
//!
//! - **codec**: Tagged binary framing (serializer, tags, byte sinks)
//! - **trace**: Trace files and event records built on the codec
//! - **utils**: Errors and the monotonic clock
//!
//! # Example
//!
//! ```no_run
//! use tracepipe::{EventRecord, EventType, ThreadInfo, TraceFile};
//!
//! let event_type = EventType::new(1, 1, "MyProvider.Request");
//! let thread = ThreadInfo::new(42);
//!
//! let mut file = TraceFile::create("/tmp/app.trace");
//! let payload = [0x01, 0x02];
//! let mut record = EventRecord::new(&event_type, &thread, &payload);
//! record.stack_mut().push_frame(0xDEAD_BEEF);
//! file.write_event(&record);
//! file.close();
//! ```

// Public module exports
pub mod codec;
pub mod trace;
pub mod utils;

// Re-export commonly used types
pub use codec::serializer::{Serializable, Serializer, StreamLabel, SIGNATURE};
pub use codec::sink::{ByteSink, FileSink};
pub use codec::tag::Tag;
pub use trace::event::{EventRecord, EventType, ThreadInfo};
pub use trace::file::TraceFile;
pub use trace::stack::{StackSnapshot, MAX_STACK_DEPTH};
pub use utils::errors::{CodecError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_signature_literal() {
        assert_eq!(SIGNATURE, "!FastSerialization.1");
        assert_eq!(SIGNATURE.len(), 20);
    }
}
