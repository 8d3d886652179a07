//! `materialtrace-fulfillment`: purchase-order fulfillment across five
//! organizations.
//!
//! Pure domain logic: wire records, lifecycle, pricing splits, progress
//! aggregation and view composition. Nothing here reads or writes a store;
//! `materialtrace-infra` loads partitions, calls into [`workflow`] and
//! persists what comes back.

pub mod events;
pub mod geofence;
pub mod model;
pub mod partition;
pub mod pricing;
pub mod progress;
pub mod state;
pub mod strategy;
pub mod view;
pub mod workflow;

pub use events::{DeliveryEvent, FulfillmentEvent, OrderEvent};
pub use geofence::Geofence;
pub use partition::Partition;
pub use pricing::{DiscountTable, ManufacturerDiscount};
pub use progress::{ProgressMode, ProgressUpdate};
pub use state::{ItemStatus, ProgressLog, Status};
pub use strategy::{RoleStrategy, ShipmentOrigin, strategy_for};
pub use view::PartitionSet;
