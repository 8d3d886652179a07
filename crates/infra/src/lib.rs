//! `materialtrace-infra`: storage, orchestration and command routing.
//!
//! The domain crate decides what an operation does to the partitions; this
//! crate loads them from a [`ledger::KvStore`], runs the operation, writes
//! the results in saga order and publishes events.

pub mod config;
pub mod ledger;
pub mod lifecycle;
pub mod partition_store;
pub mod queries;
pub mod router;
pub mod saga;


pub use config::{ConfigError, FulfillmentConfig};
pub use ledger::{InMemoryKvStore, KvStore, Namespace, StoreError};
pub use lifecycle::{Applied, OrderLifecycle};
pub use partition_store::PartitionStore;
pub use queries::{FulfillmentQueries, Selector};
pub use router::{Command, CommandRouter, InvocationError, Outcome};
pub use saga::{DegradedWrite, WriteSaga};
