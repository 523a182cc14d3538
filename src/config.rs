//! Deployment policy
//!
//! Compile-time defaults for how readings become tokens and how new
//! registries store them. Hosts pick one of the constants or build their own.

use crate::encoding::Encoding;
use crate::error::IdentityError;
use crate::registry::Registry;
use crate::token::IdentityToken;

/// What to do with a reading longer than a token can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversizePolicy {
    /// Keep the leading bytes and drop the rest (deployed behaviour)
    #[default]
    Truncate,
    /// Surface `IdentityError::IdentifierTooLong` to the caller
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub oversize: OversizePolicy,
    /// Encoding for newly created registries
    pub storage_encoding: Encoding,
}

impl Policy {
    pub const DEFAULT: Policy = Policy {
        oversize: OversizePolicy::Truncate,
        storage_encoding: Encoding::UniformHex,
    };

    pub const STRICT: Policy = Policy {
        oversize: OversizePolicy::Reject,
        storage_encoding: Encoding::UniformHex,
    };

    /// Turn a reader buffer into a token under this policy
    pub fn token_from_reading(
        &self,
        raw: &[u8],
        reported_len: usize,
    ) -> Result<IdentityToken, IdentityError> {
        IdentityToken::from_reading(raw, reported_len, self.oversize)
    }

    pub fn new_registry(&self) -> Registry {
        Registry::new(self.storage_encoding)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::DEFAULT
    }
}
