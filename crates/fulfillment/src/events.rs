//! Events published after fulfillment operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use materialtrace_core::{ItemKey, PoId};
use materialtrace_events::Event;

use crate::model::{IotProperty, LineItem, ShippingLineItem};
use crate::state::{ItemStatus, Status};

pub const PO_CREATED: &str = "pocreated";
pub const PO_ACCEPTED: &str = "poaccepted";
pub const SHIPMENT_ACCEPTED: &str = "shipmentaccepted";

/// Order-level notification: creation, acceptance, acknowledgment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub description: String,
    pub id: PoId,
    pub po_number: u32,
    pub status: Status,
    pub custodian: String,
    pub line_items: Vec<LineItem>,
    pub time_stamp: i64,
}

/// Shipment and delivery notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub status: Status,
    pub skip_distributor: bool,
    pub po_id: PoId,
    pub iot_tracking_code: String,
    pub item_map: BTreeMap<ItemKey, Vec<IotProperty>>,
    pub shipping_request_number: i64,
    pub shipped_line_items: Vec<ShippingLineItem>,
    pub progress_status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FulfillmentEvent {
    Order(OrderEvent),
    Delivery(DeliveryEvent),
}

impl Event for FulfillmentEvent {
    fn event_type(&self) -> &str {
        match self {
            FulfillmentEvent::Order(e) => &e.event_type,
            FulfillmentEvent::Delivery(e) => &e.event_type,
        }
    }

    fn po_id(&self) -> &PoId {
        match self {
            FulfillmentEvent::Order(e) => &e.id,
            FulfillmentEvent::Delivery(e) => &e.po_id,
        }
    }
}

impl From<OrderEvent> for FulfillmentEvent {
    fn from(event: OrderEvent) -> Self {
        FulfillmentEvent::Order(event)
    }
}

impl From<DeliveryEvent> for FulfillmentEvent {
    fn from(event: DeliveryEvent) -> Self {
        FulfillmentEvent::Delivery(event)
    }
}
