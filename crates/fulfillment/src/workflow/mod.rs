//! Order workflow transitions.
//!
//! Every function here is pure: it takes the partition records an operation
//! reads, mutates or rebuilds them, and returns what must be written and
//! published. Loading, write ordering and failure handling belong to the
//! caller, which must re-read the latest records before every call.

mod acceptance;
mod acknowledgment;
mod creation;
mod delivery;
mod logistics;
mod receipt;
mod seed;
mod shipment;

pub use acceptance::{AcceptanceOutcome, AcceptanceRequest, AcceptedOrder, accept_or_reject, accepted_event};
pub use acknowledgment::{Acknowledgment, acknowledge, acknowledgment_event, propagate_acknowledgment};
pub use creation::{CreatedOrder, OrderDefaults, create_order, created_event};
pub use delivery::{
    TelemetryOutcome, delivery_event, mark_logistics_delivered, mirror_distributor_telemetry,
    notify_item_delivered, record_distributor_telemetry, record_manufacturer_telemetry,
};
pub use logistics::{dispatch, shipment_accepted_event};
pub use receipt::{AdvanceOutcome, advance_in_transit, verify_receipt};
pub use seed::{DEFAULT_SEED_COMPANY, seed_orders};
pub use shipment::{
    ShipmentNotice, ShipmentRecord, mirror_stock_shipment, on_logistics_shipment,
    on_manufacturer_shipment, ship_from_stock, ship_manufacturer_share,
};

use std::collections::HashMap;

use materialtrace_core::ItemKey;

use crate::model::LineItem;

/// Caller-supplied lines keyed by item key. Later duplicates win.
fn by_item_key(lines: &[LineItem]) -> HashMap<&ItemKey, &LineItem> {
    lines.iter().map(|l| (&l.item_key, l)).collect()
}

/// Caller-supplied lines keyed by line number. Later duplicates win.
fn by_line_number(lines: &[LineItem]) -> HashMap<u32, &LineItem> {
    lines.iter().map(|l| (l.line_number, l)).collect()
}
