use materialtrace_core::PoId;

use super::by_line_number;
use crate::events::{DeliveryEvent, SHIPMENT_ACCEPTED};
use crate::model::{LineItem, ShippingLineItem, ShippingPrivateDetails};
use crate::state::Status;

/// Carrier accepts shipping requests and takes them on the road.
///
/// Requests are matched by line number. Those still waiting for pickup go
/// in-transit with the caller's ship time; every matched request is returned
/// so the carrier sees the full set it touched.
pub fn dispatch(logistics: &mut ShippingPrivateDetails, lines: &[LineItem]) -> Vec<ShippingLineItem> {
    let wanted = by_line_number(lines);
    let mut matched = Vec::new();

    for request in &mut logistics.line_items {
        let Some(line) = wanted.get(&request.line_number).copied() else {
            continue;
        };
        if request.status.is_dispatchable() {
            request.status = Status::InTransit;
            request.time_shipped = line.time_shipped;
        }
        matched.push(request.clone());
    }

    tracing::info!(po_id = %logistics.po_id, matched = matched.len(), "shipping requests dispatched");
    matched
}

/// `shipmentaccepted` notification, or nothing when no request matched.
pub fn shipment_accepted_event(po_id: &PoId, shipped: Vec<ShippingLineItem>) -> Option<DeliveryEvent> {
    if shipped.is_empty() {
        return None;
    }
    Some(DeliveryEvent {
        event_type: SHIPMENT_ACCEPTED.to_string(),
        status: Status::Other("accepted".to_string()),
        po_id: po_id.clone(),
        shipped_line_items: shipped,
        ..DeliveryEvent::default()
    })
}
