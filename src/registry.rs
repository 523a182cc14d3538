//! Credential allow-list
//!
//! An ordered list of [`Member`]s whose ids were all written with one
//! [`Encoding`]. The registry enforces what a bare `Member` cannot:
//!
//! - an empty token is never bound and never grants access
//! - a credential is bound to at most one entry
//! - stored ids loaded from a snapshot parse under the declared encoding and
//!   are rewritten in their canonical form
//!
//! The registry is a plain owned value. Hosts sharing it between threads
//! serialize access themselves (a `Mutex` around it is enough).
//!
//! # Migration
//!
//! Registries written by older firmware carry legacy ids. [`Registry::migrate`]
//! re-renders every id under a new encoding in one pass. Comparing a token
//! against a registry declared with the wrong encoding silently denies.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;
use crate::error::RegistryError;
use crate::member::Member;
use crate::token::IdentityToken;

/// Snapshot format version
const SNAPSHOT_VERSION: u8 = 1;

/// Outcome of presenting a token to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Token matches the bound entry at `index`
    Granted { index: usize },
    /// Token was read but is not enrolled
    Denied,
    /// Nothing was read
    NoCredential,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    encoding: Encoding,
    members: Vec<Member>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u8,
    encoding: Encoding,
    members: &'a [Member],
}

/// Everything after the version byte, version 1 layout
#[derive(Deserialize)]
struct SnapshotBody {
    encoding: Encoding,
    members: Vec<Member>,
}

impl Registry {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            members: Vec::new(),
        }
    }

    /// Build a registry from stored entries
    ///
    /// Every bound id must decode under `encoding`; ids are normalized to
    /// their canonical rendering. The same credential bound twice is rejected.
    pub fn from_members(encoding: Encoding, members: Vec<Member>) -> Result<Self, RegistryError> {
        let mut registry = Self::new(encoding);
        for (index, mut member) in members.into_iter().enumerate() {
            if member.is_bound() {
                let token = encoding
                    .decode(member.canonical_id())
                    .map_err(|source| RegistryError::CorruptEntry { index, source })?;
                let canonical = token.canonical(encoding);
                if let Some(other) = registry.position_of(&canonical) {
                    return Err(RegistryError::AlreadyBound { index: other });
                }
                member.set_canonical_id(canonical.as_str());
            }
            registry.members.push(member);
        }
        Ok(registry)
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn get(&self, index: usize) -> Option<&Member> {
        self.members.get(index)
    }

    /// Index of the first entry with this display name
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|member| member.name() == name)
    }

    fn position_of(&self, canonical: &str) -> Option<usize> {
        self.members
            .iter()
            .position(|member| member.is_bound() && member.canonical_id() == canonical)
    }

    /// Create an unbound named slot, returning its index
    pub fn add_slot(&mut self, name: impl Into<String>) -> usize {
        self.members.push(Member::new(name));
        let index = self.members.len() - 1;
        info!("Added slot {} ({})", index, self.members[index].name());
        index
    }

    /// Create an entry bound to `token` in one step
    pub fn enroll(
        &mut self,
        name: impl Into<String>,
        token: &IdentityToken,
    ) -> Result<usize, RegistryError> {
        if token.is_empty() {
            return Err(RegistryError::EmptyCredential);
        }
        let canonical = token.canonical(self.encoding);
        if let Some(other) = self.position_of(&canonical) {
            return Err(RegistryError::AlreadyBound { index: other });
        }

        self.members.push(Member::with_id(name, canonical.as_str()));
        let index = self.members.len() - 1;
        info!(
            "Enrolled {}-byte credential as entry {} ({})",
            token.len(),
            index,
            self.members[index].name()
        );
        Ok(index)
    }

    /// Bind `token` to an existing slot
    ///
    /// Rebinding an entry to the credential it already holds is a no-op.
    pub fn bind(&mut self, index: usize, token: &IdentityToken) -> Result<(), RegistryError> {
        if token.is_empty() {
            return Err(RegistryError::EmptyCredential);
        }
        if index >= self.members.len() {
            return Err(RegistryError::NoSuchEntry { index });
        }
        let canonical = token.canonical(self.encoding);
        if let Some(other) = self.position_of(&canonical) {
            if other != index {
                return Err(RegistryError::AlreadyBound { index: other });
            }
        }

        let member = &mut self.members[index];
        member.set_canonical_id(canonical.as_str());
        info!(
            "Bound {}-byte credential to entry {} ({})",
            token.len(),
            index,
            member.name()
        );
        Ok(())
    }

    pub fn unbind(&mut self, index: usize) -> Result<(), RegistryError> {
        let member = self
            .members
            .get_mut(index)
            .ok_or(RegistryError::NoSuchEntry { index })?;
        member.unbind();
        info!("Unbound entry {} ({})", index, member.name());
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Member, RegistryError> {
        if index >= self.members.len() {
            return Err(RegistryError::NoSuchEntry { index });
        }
        let member = self.members.remove(index);
        info!("Removed entry {} ({})", index, member.name());
        Ok(member)
    }

    /// Decide whether a presented token opens the lock
    pub fn check(&self, token: &IdentityToken) -> AccessDecision {
        if token.is_empty() {
            debug!("No credential read");
            return AccessDecision::NoCredential;
        }

        match self
            .members
            .iter()
            .position(|member| member.matches(token, self.encoding))
        {
            Some(index) => {
                info!("Access granted to entry {} ({})", index, self.members[index].name());
                AccessDecision::Granted { index }
            }
            None => {
                warn!("Access denied for unknown {}-byte credential", token.len());
                AccessDecision::Denied
            }
        }
    }

    /// Re-render every bound id under `target`
    pub fn migrate(&self, target: Encoding) -> Result<Registry, RegistryError> {
        let mut members = self.members.clone();
        for (index, member) in members.iter_mut().enumerate() {
            if !member.is_bound() {
                continue;
            }
            let token = self
                .encoding
                .decode(member.canonical_id())
                .map_err(|source| RegistryError::CorruptEntry { index, source })?;
            member.set_canonical_id(target.render(&token).as_str());
        }

        info!(
            "Migrated {} entries from {} to {}",
            members.len(),
            self.encoding,
            target
        );
        Ok(Registry {
            encoding: target,
            members,
        })
    }

    /// Serialize for persistence
    pub fn to_bytes(&self) -> Result<Vec<u8>, RegistryError> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            encoding: self.encoding,
            members: &self.members,
        };
        postcard::to_allocvec(&snapshot).map_err(RegistryError::Snapshot)
    }

    /// Load a snapshot written by [`Registry::to_bytes`] or older firmware
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RegistryError> {
        let (version, body) =
            postcard::take_from_bytes::<u8>(bytes).map_err(RegistryError::Snapshot)?;
        if version != SNAPSHOT_VERSION {
            return Err(RegistryError::UnsupportedVersion(version));
        }
        let snapshot: SnapshotBody = postcard::from_bytes(body).map_err(RegistryError::Snapshot)?;
        let registry = Self::from_members(snapshot.encoding, snapshot.members)?;
        debug!(
            "Loaded {} entries ({} encoding)",
            registry.len(),
            registry.encoding
        );
        Ok(registry)
    }
}
