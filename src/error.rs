//! Error types for token construction, canonical id decoding and the registry
//!
//! Every condition here is recoverable. Nothing in the crate panics or aborts
//! on bad sensor input or bad stored data.

use thiserror::Error;

/// Problems with a raw reading delivered by the sensor driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// Reading is longer than a token can hold and the policy forbids truncation
    #[error("identifier of {len} bytes exceeds the token capacity")]
    IdentifierTooLong { len: usize },

    /// Driver reported more valid bytes than it actually delivered
    #[error("reader reported {reported} bytes but delivered {available}")]
    ShortReading { reported: usize, available: usize },
}

/// A stored canonical id that does not parse under its declared encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("{count} segments exceed the token capacity")]
    TooManySegments { count: usize },

    #[error("segment {position} is empty")]
    EmptySegment { position: usize },

    #[error("segment {position} is not a valid byte for this encoding")]
    InvalidSegment { position: usize },
}

/// Registry operation failures
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An empty token means "nothing was read"; it cannot be bound
    #[error("cannot bind an empty credential")]
    EmptyCredential,

    #[error("no registry entry at index {index}")]
    NoSuchEntry { index: usize },

    /// The credential is already bound to another entry
    #[error("credential already bound to entry {index}")]
    AlreadyBound { index: usize },

    /// A stored id failed to decode during load or migration
    #[error("entry {index} holds a malformed identifier")]
    CorruptEntry {
        index: usize,
        #[source]
        source: CodecError,
    },

    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u8),

    #[error("snapshot codec failed: {0}")]
    Snapshot(postcard::Error),
}
