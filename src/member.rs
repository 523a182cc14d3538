//! Registry entries
//!
//! A `Member` pairs a display name with the canonical id of the credential
//! bound to it. An empty id marks an unbound slot: enrollment may create the
//! named slot first and bind a scanned tag to it later.

use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;
use crate::token::IdentityToken;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    name: String,
    canonical_id: String,
}

impl Member {
    /// Unbound slot
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            canonical_id: String::new(),
        }
    }

    /// Entry bound at creation
    pub fn with_id(name: impl Into<String>, canonical_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            canonical_id: canonical_id.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn canonical_id(&self) -> &str {
        &self.canonical_id
    }

    pub fn is_bound(&self) -> bool {
        !self.canonical_id.is_empty()
    }

    /// Plain mutation; uniqueness across entries is the registry's concern
    pub fn set_canonical_id(&mut self, canonical_id: impl Into<String>) {
        self.canonical_id = canonical_id.into();
    }

    pub fn unbind(&mut self) {
        self.canonical_id.clear();
    }

    /// Whether a presented token opens this entry
    ///
    /// Empty tokens and unbound slots never match, even each other.
    pub fn matches(&self, token: &IdentityToken, encoding: Encoding) -> bool {
        self.is_bound()
            && !token.is_empty()
            && token.equals_canonical_string(&self.canonical_id, encoding)
    }
}
