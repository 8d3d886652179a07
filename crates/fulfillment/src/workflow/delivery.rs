//! Telemetry ingestion and delivery propagation.
//!
//! A fulfiller feeds IoT samples for the lines it ships. Each sample is
//! appended to every line carrying its tracking code until the geofence
//! reports arrival; after that the line ignores further samples.

use std::collections::BTreeMap;

use materialtrace_core::{ItemKey, PoId};

use crate::events::DeliveryEvent;
use crate::geofence::Geofence;
use crate::model::{Company, CustomerLineItems, IotProperty, PricingDetails, ShippingPrivateDetails};
use crate::progress::{LineProgress, ProgressMode, ProgressUpdate};
use crate::state::{ItemStatus, ProgressLog, Status};

/// Result of feeding one sample into a partition.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryOutcome {
    pub tracking_code: String,
    /// Sample history per line number, for every line that took the sample.
    pub samples: BTreeMap<u32, Vec<IotProperty>>,
    /// Sample history per item key; becomes the delivery event's item map.
    pub item_map: BTreeMap<ItemKey, Vec<IotProperty>>,
    /// Line numbers that arrived with this sample.
    pub arrived: Vec<u32>,
    /// Shared-progress update for the arrived lines.
    pub progress: ProgressUpdate,
}

impl TelemetryOutcome {
    fn new(sample: &IotProperty, status: &ItemStatus) -> Self {
        Self {
            tracking_code: sample.tracking_code.clone(),
            samples: BTreeMap::new(),
            item_map: BTreeMap::new(),
            arrived: Vec::new(),
            progress: ProgressUpdate::new(ProgressMode::Delivered, status.clone()),
        }
    }

    pub fn has_arrivals(&self) -> bool {
        !self.arrived.is_empty()
    }

    pub fn touched(&self) -> usize {
        self.samples.len()
    }

    fn take(&mut self, line: TelemetryLine<'_>, arrived: bool, received_at: i64) {
        self.samples.insert(line.line_number, line.history.to_vec());
        self.item_map.insert(line.item_key.clone(), line.history.to_vec());
        if arrived {
            self.arrived.push(line.line_number);
            self.progress.insert(
                line.line_number,
                LineProgress {
                    iot_properties: line.history.to_vec(),
                    time_received: received_at,
                    ..LineProgress::default()
                },
            );
        }
    }
}

struct TelemetryLine<'a> {
    line_number: u32,
    item_key: &'a ItemKey,
    history: &'a [IotProperty],
}

/// Append `sample` to a line's history and test the geofence. `None` when
/// the line does not take the sample.
fn ingest(
    takes: bool,
    ship_to: &Company,
    history: &mut Vec<IotProperty>,
    sample: &IotProperty,
    geofence: &Geofence,
) -> Option<bool> {
    if !takes {
        return None;
    }
    history.push(sample.clone());
    Some(geofence.has_arrived(ship_to, sample))
}

/// Manufacturer path: lines in the manufacturer's pricing partition become
/// `delivered` on arrival.
pub fn record_manufacturer_telemetry(
    pricing: &mut PricingDetails,
    sample: &IotProperty,
    status: &ItemStatus,
    geofence: &Geofence,
) -> TelemetryOutcome {
    let mut outcome = TelemetryOutcome::new(sample, status);
    for line in &mut pricing.line_items {
        let takes = line.iot_tracking_code == sample.tracking_code && !line.status.has_arrived();
        let Some(arrived) = ingest(takes, &line.ship_to_location, &mut line.iot_properties, sample, geofence) else {
            continue;
        };
        if arrived {
            line.status = Status::Delivered;
            line.record(status);
        }
        outcome.take(
            TelemetryLine { line_number: line.line_number, item_key: &line.item_key, history: &line.iot_properties },
            arrived,
            status.time_stamp,
        );
    }
    tracing::info!(
        po_id = %pricing.po_id,
        tracking_code = %sample.tracking_code,
        touched = outcome.touched(),
        arrived = outcome.arrived.len(),
        "manufacturer telemetry recorded"
    );
    outcome
}

/// Distributor path: a customer line takes samples for its own tracking
/// code and for every order request's code. On arrival the matching requests
/// become `received`; the line follows once all of its shares have arrived.
pub fn record_distributor_telemetry(
    customer: &mut CustomerLineItems,
    sample: &IotProperty,
    status: &ItemStatus,
    geofence: &Geofence,
) -> TelemetryOutcome {
    let mut outcome = TelemetryOutcome::new(sample, status);
    for line in &mut customer.line_items {
        let takes = line.awaits(&sample.tracking_code);
        let Some(arrived) = ingest(takes, &line.ship_to_location, &mut line.iot_properties, sample, geofence) else {
            continue;
        };
        if arrived {
            line.settle_arrival(&sample.tracking_code, &Status::Received);
            line.record(status);
        }
        outcome.take(
            TelemetryLine { line_number: line.line_number, item_key: &line.item_key, history: &line.iot_properties },
            arrived,
            status.time_stamp,
        );
    }
    tracing::info!(
        po_id = %customer.po_id,
        tracking_code = %sample.tracking_code,
        touched = outcome.touched(),
        arrived = outcome.arrived.len(),
        "distributor telemetry recorded"
    );
    outcome
}

/// Copy the distributor's telemetry onto the customer-distributor pricing
/// record; arrived lines are marked `delivered` there.
pub fn mirror_distributor_telemetry(
    pricing: &mut PricingDetails,
    outcome: &TelemetryOutcome,
    status: &ItemStatus,
) -> usize {
    let mut mirrored = 0;
    for line in &mut pricing.line_items {
        let Some(history) = outcome.samples.get(&line.line_number) else {
            continue;
        };
        line.iot_properties = history.clone();
        line.iot_tracking_code = outcome.tracking_code.clone();
        if outcome.arrived.contains(&line.line_number) {
            line.status = Status::Delivered;
            line.record(status);
        }
        mirrored += 1;
    }
    mirrored
}

/// Mark every shipping request with `tracking_code` as delivered. Returns
/// the first matching request's number.
pub fn mark_logistics_delivered(
    logistics: &mut ShippingPrivateDetails,
    tracking_code: &str,
    status: &ItemStatus,
) -> Option<i64> {
    let mut first = None;
    for request in logistics
        .line_items
        .iter_mut()
        .filter(|r| r.iot_tracking_code == tracking_code)
    {
        request.status = Status::Delivered;
        request.record(status);
        first.get_or_insert(request.shipping_request_number);
    }
    first
}

/// Delivery notification under the caller's event key. Nothing is emitted
/// without an arrival or without a key.
pub fn delivery_event(
    event_key: &str,
    po_id: &PoId,
    outcome: &TelemetryOutcome,
    status: &ItemStatus,
    shipping_request_number: Option<i64>,
) -> Option<DeliveryEvent> {
    if event_key.is_empty() || !outcome.has_arrivals() {
        return None;
    }
    Some(DeliveryEvent {
        event_type: event_key.to_string(),
        status: Status::Delivered,
        skip_distributor: false,
        po_id: po_id.clone(),
        iot_tracking_code: outcome.tracking_code.clone(),
        item_map: outcome.item_map.clone(),
        shipping_request_number: shipping_request_number.unwrap_or_default(),
        shipped_line_items: Vec::new(),
        progress_status: status.clone(),
    })
}

/// The distributor learns that a manufacturer's shipment arrived.
///
/// Order requests carrying the event's tracking code take the event status.
/// Their line becomes `received` once every share has arrived. The first
/// receipt time sticks: `received_at` (or the entry's time stamp when the
/// caller sends none) only fills an unset `time_received`.
pub fn notify_item_delivered(
    customer: &mut CustomerLineItems,
    event: &DeliveryEvent,
    received_at: i64,
    status: &ItemStatus,
) -> usize {
    let mut updated = 0;
    for line in &mut customer.line_items {
        let carried = line
            .order_requests
            .iter()
            .any(|r| r.iot_tracking_code == event.iot_tracking_code);
        if !carried {
            continue;
        }
        line.settle_arrival(&event.iot_tracking_code, &event.status);
        line.record(status);
        if let Some(history) = event.item_map.get(&line.item_key) {
            line.iot_properties = history.clone();
        }
        if line.time_received == 0 {
            line.time_received = if received_at > 0 { received_at } else { status.time_stamp };
        }
        line.shipping_request_number = event.shipping_request_number;
        updated += 1;
    }
    tracing::info!(po_id = %customer.po_id, tracking_code = %event.iot_tracking_code, updated, "delivery propagated");
    updated
}
