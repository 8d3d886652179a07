//! `materialtrace-core`: foundation types shared by every fulfillment crate.
//!
//! Pure domain primitives only: no storage, no transport, no logging setup.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ItemKey, PoId, TrackingId, ITEM_KEY_SEPARATOR};
