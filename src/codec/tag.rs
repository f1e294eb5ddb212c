// src/codec/tag.rs
//! Frame tags for the FastSerialization wire format
//!
//! A tag is a single byte identifying the kind of the frame that follows it.
//! Only `NullReference`, `BeginObject`, and `EndObject` are exercised by the
//! writer; the remaining values reserve protocol numbering for future frame
//! kinds.

/// Frame tag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    /// Invalid frame
    Error = 0,

    /// A reference to nothing
    NullReference = 1,

    /// A reference to a previously written object
    ObjectReference = 2,

    /// A reference to an object not yet written
    ForwardReference = 3,

    /// Opens an object frame; a type descriptor follows
    BeginObject = 4,

    /// Opens an object frame that is not externally referenceable
    BeginPrivateObject = 5,

    /// Closes the innermost open object frame
    EndObject = 6,
}

impl Tag {
    /// Wire representation of this tag.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a tag byte; `None` for values outside the known range.
    pub fn from_u8(value: u8) -> Option<Tag> {
        match value {
            0 => Some(Tag::Error),
            1 => Some(Tag::NullReference),
            2 => Some(Tag::ObjectReference),
            3 => Some(Tag::ForwardReference),
            4 => Some(Tag::BeginObject),
            5 => Some(Tag::BeginPrivateObject),
            6 => Some(Tag::EndObject),
            _ => None,
        }
    }
}
