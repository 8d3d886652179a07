//! Line and order-request lifecycle.
//!
//! ```text
//! open ─► accepted ─► wip ─► shipped ─► in-transit ─► delivered ─► received ─► verified
//!   └──► rejected (order level, terminal)
//! ```
//!
//! Stock requests start at `wip`; manufacturer requests start at `open` and
//! move on when the manufacturer acknowledges. A split line reads the status
//! of its least-advanced order request.
//!
//! The graph is not strictly linear: geofence detection marks a line
//! `delivered` on the fulfiller's side while the customer leg records
//! `received` and finally `verified`. Logistics lines additionally accept
//! `readyforshipment` as a pre-dispatch state.
//!
//! Progress logs are append-only. An entry repeating the last one (same
//! owner, same status) is not appended again, so re-driven commands stay
//! idempotent. Carrier dispatch and receipt verification change status
//! without logging an entry.

use serde::{Deserialize, Serialize};

use crate::model::{LineItem, LineItemPricing, OrderRequest, SharedLineDetail, ShippingLineItem};

/// Status of an order, line, order request or shipping line.
///
/// Statuses come from clients as free-form strings; known values get their
/// own variant and anything else is kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Unset,
    Open,
    Rejected,
    Wip,
    Accepted,
    Shipped,
    ReadyForShipment,
    InTransit,
    Delivered,
    Received,
    Verified,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Unset => "",
            Status::Open => "open",
            Status::Rejected => "rejected",
            Status::Wip => "wip",
            Status::Accepted => "accepted",
            Status::Shipped => "shipped",
            Status::ReadyForShipment => "readyforshipment",
            Status::InTransit => "in-transit",
            Status::Delivered => "delivered",
            Status::Received => "received",
            Status::Verified => "verified",
            Status::Other(s) => s,
        }
    }

    /// Goods have left the origin.
    pub fn has_shipped(&self) -> bool {
        matches!(
            self,
            Status::Shipped | Status::InTransit | Status::Delivered | Status::Received | Status::Verified
        )
    }

    /// Goods reached the destination; geofence detection must not fire again.
    pub fn has_arrived(&self) -> bool {
        matches!(self, Status::Delivered | Status::Received | Status::Verified)
    }

    /// A fulfiller may still acknowledge its order request.
    pub fn is_acknowledgeable(&self) -> bool {
        !self.has_shipped() && *self != Status::Rejected
    }

    /// A logistics line the carrier may pick up.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, Status::Open | Status::ReadyForShipment)
    }

    /// Position along the lifecycle graph. Unknown, unset and rejected
    /// statuses rank lowest.
    pub fn progress_rank(&self) -> u8 {
        match self {
            Status::Unset | Status::Rejected | Status::Other(_) => 0,
            Status::Open => 1,
            Status::Accepted => 2,
            Status::Wip => 3,
            Status::ReadyForShipment => 4,
            Status::Shipped => 5,
            Status::InTransit => 6,
            Status::Delivered => 7,
            Status::Received => 8,
            Status::Verified => 9,
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => Status::Unset,
            "open" => Status::Open,
            "rejected" => Status::Rejected,
            "wip" => Status::Wip,
            "accepted" => Status::Accepted,
            "shipped" => Status::Shipped,
            "readyforshipment" => Status::ReadyForShipment,
            "in-transit" => Status::InTransit,
            "delivered" => Status::Delivered,
            "received" => Status::Received,
            "verified" => Status::Verified,
            _ => Status::Other(value),
        }
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        Status::from(value.to_string())
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress log entry: who moved the item to which status, and when.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemStatus {
    pub owner: String,
    pub status: Status,
    pub time_stamp: i64,
}

impl ItemStatus {
    pub fn new(owner: impl Into<String>, status: Status, time_stamp: i64) -> Self {
        Self {
            owner: owner.into(),
            status,
            time_stamp,
        }
    }

    /// Same entry with a different status.
    pub fn with_status(&self, status: Status) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    fn repeats(&self, other: &ItemStatus) -> bool {
        self.owner == other.owner && self.status == other.status
    }
}

/// Append `entry` unless it repeats the last entry. Returns whether it was
/// appended.
pub fn append_progress(log: &mut Vec<ItemStatus>, entry: &ItemStatus) -> bool {
    if log.last().is_some_and(|last| last.repeats(entry)) {
        tracing::debug!(owner = %entry.owner, status = %entry.status, "duplicate progress entry skipped");
        return false;
    }
    log.push(entry.clone());
    true
}

/// Anything carrying an append-only progress log.
pub trait ProgressLog {
    fn progress_log(&self) -> &[ItemStatus];

    fn progress_log_mut(&mut self) -> &mut Vec<ItemStatus>;

    fn record(&mut self, entry: &ItemStatus) -> bool {
        append_progress(self.progress_log_mut(), entry)
    }

    /// First entry with `status`, oldest first.
    fn first_with_status(&self, status: &Status) -> Option<&ItemStatus> {
        self.progress_log().iter().find(|e| e.status == *status)
    }
}

macro_rules! impl_progress_log {
    ($($t:ty),+ $(,)?) => {
        $(
            impl ProgressLog for $t {
                fn progress_log(&self) -> &[ItemStatus] {
                    &self.progress_status
                }

                fn progress_log_mut(&mut self) -> &mut Vec<ItemStatus> {
                    &mut self.progress_status
                }
            }
        )+
    };
}

impl_progress_log!(LineItem, LineItemPricing, OrderRequest, ShippingLineItem, SharedLineDetail);
