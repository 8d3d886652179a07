//! `materialtrace-auth`: caller identity and command authorization.
//!
//! Decoupled from transport and storage: callers arrive already
//! authenticated with an MSP id, and this crate only decides whether that
//! organization may run a given command.

pub mod authorize;
pub mod context;
pub mod roles;

pub use authorize::{AuthzError, CommandAuthorization, authorize};
pub use context::InvocationContext;
pub use roles::Role;
