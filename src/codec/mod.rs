// src/codec/mod.rs
//! FastSerialization framing protocol (writer side)
//!
//! This module implements the tagged, self-describing binary framing used to
//! persist trace streams:
//!
//! - **tag**: One-byte frame tags
//! - **sink**: Byte sink abstraction and the file-backed implementation
//! - **serializer**: Frame writer, type descriptors, stream labels, backpatch
//!
//! The crate only ships the writer; decoding exists solely as test support.

pub mod serializer;
pub mod sink;
pub mod tag;

pub use serializer::{Serializable, Serializer, StreamLabel, SIGNATURE};
pub use sink::{ByteSink, FileSink};
pub use tag::Tag;
