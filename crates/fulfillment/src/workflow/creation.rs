use std::collections::BTreeSet;

use materialtrace_core::{DomainError, DomainResult, ItemKey, PoId};

use crate::events::{OrderEvent, PO_CREATED};
use crate::model::{CustomerLineItems, PurchaseOrder, SharedProgressReport};
use crate::pricing::subtotal;
use crate::progress::seed_report;
use crate::state::{ItemStatus, ProgressLog, Status};

/// Values filled into lines that leave them blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDefaults {
    pub currency: String,
    pub material_group: String,
    pub unit_of_measure: String,
}

impl Default for OrderDefaults {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            material_group: "pipe".to_string(),
            unit_of_measure: "each".to_string(),
        }
    }
}

/// Records produced by creating an order.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedOrder {
    /// Primary record, without line detail.
    pub primary: PurchaseOrder,
    pub customer: CustomerLineItems,
    pub progress: SharedProgressReport,
    /// The order as returned to the caller, lines included.
    pub view: PurchaseOrder,
}

/// Normalize a new order and split it into its primary and customer records.
///
/// The caller checks that the id is not taken yet.
pub fn create_order(
    mut order: PurchaseOrder,
    initial: &ItemStatus,
    defaults: &OrderDefaults,
) -> DomainResult<CreatedOrder> {
    let po_id = PoId::new(order.po_id.as_str())?;

    let mut seen = BTreeSet::new();
    if let Some(dup) = order.line_items.iter().find(|l| !seen.insert(l.line_number)) {
        return Err(DomainError::validation(format!(
            "duplicate line number {} in purchase order {po_id}",
            dup.line_number
        )));
    }

    order.po_status = Status::Open;
    for line in &mut order.line_items {
        if line.po_number == 0 {
            line.po_number = order.po_number;
        }
        line.item_key = ItemKey::derive(&po_id, line.line_number, &line.material_id);
        line.subtotal = subtotal(line.quantity, line.unit_price);
        fill_blank(&mut line.currency, &defaults.currency);
        fill_blank(&mut line.material_group, &defaults.material_group);
        fill_blank(&mut line.unit_of_measure, &defaults.unit_of_measure);
        if line.status == Status::Unset {
            line.status = Status::Open;
        }
        line.progress_status.clear();
        line.record(initial);
    }

    let customer = CustomerLineItems::new(po_id.clone(), order.line_items.clone());
    let progress = seed_report(po_id, &order.line_items);
    let view = order.clone();
    order.line_items.clear();

    Ok(CreatedOrder {
        primary: order,
        customer,
        progress,
        view,
    })
}

fn fill_blank(field: &mut String, default: &str) {
    if field.is_empty() {
        *field = default.to_string();
    }
}

pub fn created_event(view: &PurchaseOrder) -> OrderEvent {
    OrderEvent {
        event_type: PO_CREATED.to_string(),
        description: "Po Created".to_string(),
        id: view.po_id.clone(),
        po_number: view.po_number,
        status: view.po_status.clone(),
        line_items: view.line_items.clone(),
        time_stamp: view.created_time_stamp,
        ..OrderEvent::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineItem;

    fn order() -> PurchaseOrder {
        PurchaseOrder {
            po_id: PoId::new("po-new").unwrap(),
            po_number: 12,
            created_time_stamp: 100,
            line_items: vec![
                LineItem { line_number: 1, material_id: "12010".to_string(), quantity: 3, unit_price: 99.99, ..LineItem::default() },
                LineItem {
                    line_number: 2,
                    material_id: "12012".to_string(),
                    quantity: 1,
                    unit_price: 199.99,
                    currency: "CAD".to_string(),
                    ..LineItem::default()
                },
            ],
            ..PurchaseOrder::default()
        }
    }

    fn initial() -> ItemStatus {
        ItemStatus::new("Utility", Status::Open, 100)
    }

    #[test]
    fn primary_record_carries_no_lines() {
        let created = create_order(order(), &initial(), &OrderDefaults::default()).unwrap();
        assert!(created.primary.line_items.is_empty());
        assert_eq!(created.primary.po_status, Status::Open);
        assert_eq!(created.customer.line_items.len(), 2);
        assert_eq!(created.view.line_items, created.customer.line_items);
        assert_eq!(created.customer.doc_type, "collectionCustomerLineItems");
    }

    #[test]
    fn lines_get_keys_subtotals_defaults_and_one_progress_entry() {
        let created = create_order(order(), &initial(), &OrderDefaults::default()).unwrap();
        let first = &created.customer.line_items[0];
        assert_eq!(first.item_key.as_str(), "po-new|1|12010");
        assert_eq!(first.subtotal, 300.0);
        assert_eq!(first.currency, "USD");
        assert_eq!(first.material_group, "pipe");
        assert_eq!(first.unit_of_measure, "each");
        assert_eq!(first.po_number, 12);
        assert_eq!(first.progress_status, vec![initial()]);
        assert_eq!(created.customer.line_items[1].currency, "CAD");
        assert_eq!(created.progress.line_items.len(), 2);
    }

    #[test]
    fn duplicate_line_numbers_are_rejected() {
        let mut order = order();
        order.line_items[1].line_number = 1;
        match create_order(order, &initial(), &OrderDefaults::default()) {
            Err(DomainError::Validation(msg)) => assert!(msg.contains("duplicate line number 1")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn created_event_lists_the_lines() {
        let created = create_order(order(), &initial(), &OrderDefaults::default()).unwrap();
        let event = created_event(&created.view);
        assert_eq!(event.event_type, "pocreated");
        assert_eq!(event.status, Status::Open);
        assert_eq!(event.line_items.len(), 2);
    }
}
