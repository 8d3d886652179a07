//! Per-partition projections of an order.
//!
//! Every record is keyed by the purchase order id inside its partition and
//! carries only the fields the organizations sharing that partition may see.

use serde::{Deserialize, Serialize};

use materialtrace_core::{ItemKey, PoId};

use super::{Company, IotProperty, LineItem, Mtr, nullable};
use crate::partition::Partition;
use crate::state::{ItemStatus, Status};

/// Customer line items (customer + distributor). Source of truth for the
/// line list of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerLineItems {
    #[serde(rename = "docType")]
    pub doc_type: String,
    pub po_id: PoId,
    #[serde(deserialize_with = "nullable")]
    pub line_items: Vec<LineItem>,
}

impl CustomerLineItems {
    pub fn new(po_id: PoId, line_items: Vec<LineItem>) -> Self {
        Self {
            doc_type: Partition::CustomerLineItems.collection_name().to_string(),
            po_id,
            line_items,
        }
    }
}

/// Fulfiller-specific pricing record, stored in the customer-distributor
/// partition and in each distributor-manufacturer partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingDetails {
    #[serde(rename = "docType")]
    pub doc_type: String,
    pub po_id: PoId,
    #[serde(deserialize_with = "nullable")]
    pub line_items: Vec<LineItemPricing>,
}

impl PricingDetails {
    pub fn new(partition: Partition, po_id: PoId) -> Self {
        Self {
            doc_type: partition.collection_name().to_string(),
            po_id,
            line_items: Vec::new(),
        }
    }
}

/// A line (or a share of it) as priced for one fulfiller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItemPricing {
    pub po_id: PoId,
    pub po_number: u32,
    pub line_number: u32,
    pub material_id: String,
    pub material_group: String,
    pub item_key: ItemKey,
    pub description: String,
    pub manufacturer: String,
    pub quantity: u32,
    pub unit_of_measure: String,
    pub unit_price: f64,
    pub currency: String,
    pub subtotal: f64,
    pub ship_to_location: Company,
    pub status: Status,
    pub assigned_to: String,
    pub project_id: String,
    pub delivery_date: String,
    #[serde(deserialize_with = "nullable")]
    pub material_certificate: Vec<Mtr>,
    pub iot_tracking_code: String,
    #[serde(deserialize_with = "nullable")]
    pub iot_properties: Vec<IotProperty>,
    pub acknowledged_time_stamp: i64,
    pub time_shipped: i64,
    #[serde(deserialize_with = "nullable")]
    pub progress_status: Vec<ItemStatus>,
}

/// Logistics view of an order: only what the carrier needs to move goods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingPrivateDetails {
    #[serde(rename = "docType")]
    pub doc_type: String,
    pub po_id: PoId,
    #[serde(deserialize_with = "nullable")]
    pub line_items: Vec<ShippingLineItem>,
}

impl ShippingPrivateDetails {
    pub fn new(po_id: PoId) -> Self {
        Self {
            doc_type: Partition::Logistics.collection_name().to_string(),
            po_id,
            line_items: Vec::new(),
        }
    }
}

/// One shipment request line. Logistics never sees item keys, so lines are
/// correlated with other partitions by line number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingLineItem {
    pub po_id: PoId,
    pub po_number: u32,
    pub line_number: u32,
    pub quantity: u32,
    pub unit_of_measure: String,
    pub shipping_request_number: i64,
    pub material_id: String,
    pub description: String,
    pub requested_by: String,
    pub iot_tracking_code: String,
    pub ship_to_location: Company,
    pub status: Status,
    pub delivery_date: String,
    pub time_requested: i64,
    pub time_shipped: i64,
    #[serde(deserialize_with = "nullable")]
    pub progress_status: Vec<ItemStatus>,
}

/// Progress visible to every organization taking part in an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharedProgressReport {
    #[serde(rename = "docType")]
    pub doc_type: String,
    pub po_id: PoId,
    #[serde(deserialize_with = "nullable")]
    pub line_items: Vec<SharedLineDetail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharedLineDetail {
    pub po_number: u32,
    pub line_number: u32,
    pub item_key: ItemKey,
    pub assigned_to: String,
    #[serde(deserialize_with = "nullable")]
    pub material_certificate: Vec<Mtr>,
    pub iot_tracking_code: String,
    #[serde(deserialize_with = "nullable")]
    pub iot_properties: Vec<IotProperty>,
    pub time_shipped: i64,
    pub time_received: i64,
    pub shipping_request_number: i64,
    #[serde(deserialize_with = "nullable")]
    pub progress_status: Vec<ItemStatus>,
}
