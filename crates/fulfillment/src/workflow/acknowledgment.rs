use materialtrace_core::{ItemKey, PoId};

use super::by_item_key;
use crate::events::OrderEvent;
use crate::model::{CustomerLineItems, LineItem, PricingDetails};
use crate::progress::{LineProgress, ProgressMode, ProgressUpdate};
use crate::state::{ItemStatus, ProgressLog, Status};

/// Lines a manufacturer acknowledged, and the matching shared update.
#[derive(Debug, Clone, PartialEq)]
pub struct Acknowledgment {
    pub lines: Vec<(ItemKey, u32)>,
    pub progress: ProgressUpdate,
}

/// Acknowledge every open order request in a manufacturer's pricing record.
///
/// Lines already past acknowledgment (shipped, delivered, ...) are left as
/// they are.
pub fn acknowledge(pricing: &mut PricingDetails, status: &ItemStatus) -> Acknowledgment {
    let mut progress = ProgressUpdate::new(ProgressMode::ManufacturerAcknowledge, status.clone());
    let mut lines = Vec::new();

    for line in pricing.line_items.iter_mut().filter(|l| l.status.is_acknowledgeable()) {
        line.acknowledged_time_stamp = status.time_stamp;
        line.status = status.status.clone();
        line.record(status);
        lines.push((line.item_key.clone(), line.line_number));
        progress.insert(line.line_number, LineProgress::default());
    }

    tracing::debug!(po_id = %pricing.po_id, acknowledged = lines.len(), "order requests acknowledged");
    Acknowledgment { lines, progress }
}

/// Event telling the distributor which lines were acknowledged.
pub fn acknowledgment_event(
    event_type: &str,
    po_id: &PoId,
    custodian: &str,
    time_stamp: i64,
    lines: &[(ItemKey, u32)],
) -> OrderEvent {
    OrderEvent {
        event_type: event_type.to_string(),
        description: "Order Request Acknowledged".to_string(),
        id: po_id.clone(),
        status: Status::Wip,
        custodian: custodian.to_string(),
        time_stamp,
        line_items: lines
            .iter()
            .map(|(item_key, line_number)| LineItem {
                item_key: item_key.clone(),
                line_number: *line_number,
                ..LineItem::default()
            })
            .collect(),
        ..OrderEvent::default()
    }
}

/// Record a manufacturer's acknowledgment on the customer lines it names.
/// Returns how many lines were touched.
pub fn propagate_acknowledgment(customer: &mut CustomerLineItems, event: &OrderEvent) -> usize {
    let named = by_item_key(&event.line_items);
    let entry = ItemStatus::new(event.custodian.clone(), event.status.clone(), event.time_stamp);

    customer
        .line_items
        .iter_mut()
        .filter(|line| named.contains_key(&line.item_key))
        .map(|line| line.record(&entry))
        .filter(|appended| *appended)
        .count()
}
