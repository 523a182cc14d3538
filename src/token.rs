//! Identity tokens
//!
//! An `IdentityToken` holds the raw identifier a proximity reader scanned
//! from a tag: up to [`MAX_LENGTH`] bytes in scan order, stored inline with
//! no heap allocation.
//!
//! # Truncation
//!
//! Readings longer than [`MAX_LENGTH`] are cut down to their first
//! [`MAX_LENGTH`] bytes unless the caller asks for
//! [`OversizePolicy::Reject`]. Two physically different tags sharing a
//! [`MAX_LENGTH`]-byte prefix are then indistinguishable. Deployed registries
//! depend on this behaviour, so truncation stays the default.
//!
//! The bytes are wiped when the token is dropped.

use core::fmt;

use heapless::Vec;
use log::warn;
use zeroize::Zeroize;

use crate::config::OversizePolicy;
use crate::encoding::{Canonical, CanonicalId, Encoding};
use crate::error::IdentityError;

/// Maximum number of identifier bytes a token holds
pub const MAX_LENGTH: usize = 10;

/// Raw identifier scanned from a proximity tag
#[derive(Clone)]
pub struct IdentityToken {
    bytes: Vec<u8, MAX_LENGTH>,
}

impl IdentityToken {
    /// Token for "nothing was read"
    pub fn empty() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Build a token from scanned bytes, truncating to [`MAX_LENGTH`]
    pub fn new(bytes: &[u8]) -> Self {
        if bytes.len() > MAX_LENGTH {
            warn!(
                "Identifier of {} bytes truncated to {}",
                bytes.len(),
                MAX_LENGTH
            );
        }
        Self::from_prefix(bytes)
    }

    /// Build a token, refusing readings that do not fit
    pub fn try_new(bytes: &[u8]) -> Result<Self, IdentityError> {
        if bytes.len() > MAX_LENGTH {
            return Err(IdentityError::IdentifierTooLong { len: bytes.len() });
        }
        Ok(Self::from_prefix(bytes))
    }

    /// Build a token from a reader buffer and the count of valid bytes the
    /// driver reported
    ///
    /// Drivers usually hand over a fixed-size buffer, so `raw` may be longer
    /// than `reported_len`. Only the reported bytes are used. A reported
    /// length above [`MAX_LENGTH`] is handled according to `policy`.
    pub fn from_reading(
        raw: &[u8],
        reported_len: usize,
        policy: OversizePolicy,
    ) -> Result<Self, IdentityError> {
        if reported_len > MAX_LENGTH && policy == OversizePolicy::Reject {
            return Err(IdentityError::IdentifierTooLong { len: reported_len });
        }

        let needed = reported_len.min(MAX_LENGTH);
        if raw.len() < needed {
            return Err(IdentityError::ShortReading {
                reported: reported_len,
                available: raw.len(),
            });
        }

        if reported_len > MAX_LENGTH {
            warn!(
                "Reader reported {} bytes, keeping the first {}",
                reported_len, MAX_LENGTH
            );
        }

        Ok(Self::from_prefix(&raw[..needed]))
    }

    fn from_prefix(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.iter().take(MAX_LENGTH).copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte-level equality: same length, same bytes in scan order
    pub fn equals_token(&self, other: &IdentityToken) -> bool {
        self.as_bytes() == other.as_bytes()
    }

    /// Compare against a stored canonical id produced with `encoding`
    ///
    /// Equivalent to rendering this token with `encoding` and comparing
    /// strings. A string produced with a different encoding does not match
    /// even when it describes the same tag.
    pub fn equals_canonical_string(&self, canonical: &str, encoding: Encoding) -> bool {
        self.canonical(encoding).as_str() == canonical
    }

    /// Render the canonical id for storage and comparison
    pub fn canonical(&self, encoding: Encoding) -> CanonicalId {
        encoding.render(self)
    }

    /// Display adapter writing the canonical id without an intermediate buffer
    pub fn display(&self, encoding: Encoding) -> Canonical<'_> {
        Canonical::new(self, encoding)
    }
}

impl PartialEq for IdentityToken {
    fn eq(&self, other: &Self) -> bool {
        self.equals_token(other)
    }
}

impl Eq for IdentityToken {}

// Keep raw credential bytes out of logs
impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityToken")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Drop for IdentityToken {
    fn drop(&mut self) {
        self.bytes.as_mut_slice().zeroize();
    }
}
