//! doorkey - credential identity for RFID door locks
//!
//! A proximity reader hands over a short byte string for each tag it scans.
//! This crate turns that reading into:
//! 1. an [`IdentityToken`] (fixed-capacity, wiped on drop)
//! 2. a canonical id string for display and storage ([`Encoding`])
//! 3. an access decision against an allow-list ([`Registry`])
//!
//! Nothing here authenticates the tag. A cloned UID opens the door just like
//! the original; the crate only normalizes and compares identifiers.
//!
//! ```
//! use doorkey::{AccessDecision, IdentityToken, Policy};
//!
//! let policy = Policy::DEFAULT;
//! let mut registry = policy.new_registry();
//!
//! let card = policy.token_from_reading(&[4, 58, 255], 3).unwrap();
//! let index = registry.enroll("Alice", &card).unwrap();
//! assert_eq!(registry.members()[index].canonical_id(), "04-3a-ff");
//!
//! let presented = IdentityToken::new(&[4, 58, 255]);
//! assert_eq!(registry.check(&presented), AccessDecision::Granted { index });
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod member;
pub mod registry;
pub mod token;

pub use config::{OversizePolicy, Policy};
pub use encoding::{CanonicalId, Encoding};
pub use error::{CodecError, IdentityError, RegistryError};
pub use member::Member;
pub use registry::{AccessDecision, Registry};
pub use token::{IdentityToken, MAX_LENGTH};
