//! `materialtrace-events`: event contract and publish/subscribe mechanics.
//!
//! Domain crates implement [`Event`]; infrastructure wraps events in an
//! [`EventEnvelope`] and hands them to an [`EventBus`].

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
