//! Customer-side receipt: bulk advancement of shipped lines and final
//! verification against the carrier's records.

use std::collections::HashMap;

use super::by_item_key;
use crate::model::{CustomerLineItems, GoodReceipt, LineItem, ShippingPrivateDetails};
use crate::state::{ItemStatus, ProgressLog, Status};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// Customer lines moved from `shipped` to `received`.
    pub received: usize,
    /// Shipping requests that took the status entry.
    pub logistics: usize,
}

/// Move shipped customer lines to `received` and mirror the status entry onto
/// the carrier's requests for the same lines.
///
/// Lines are matched by item key; only `shipped` lines advance, and only
/// their shipping requests take the entry. Shipping requests are matched by
/// line number and must still be on the road.
pub fn advance_in_transit(
    customer: &mut CustomerLineItems,
    mut logistics: Option<&mut ShippingPrivateDetails>,
    lines: &[LineItem],
    status: &ItemStatus,
) -> AdvanceOutcome {
    let wanted = by_item_key(lines);
    let mut outcome = AdvanceOutcome::default();

    for line in &mut customer.line_items {
        let Some(incoming) = wanted.get(&line.item_key).copied() else {
            continue;
        };
        if line.status != Status::Shipped {
            tracing::debug!(
                po_id = %customer.po_id,
                line_number = line.line_number,
                status = %line.status,
                "line not shipped, left as is"
            );
            continue;
        }
        line.shipping_request_number = incoming.shipping_request_number;
        line.status = Status::Received;
        line.record(status);
        outcome.received += 1;

        let Some(logistics) = logistics.as_deref_mut() else {
            continue;
        };
        for request in logistics.line_items.iter_mut().filter(|r| {
            r.line_number == line.line_number && matches!(r.status, Status::InTransit | Status::Shipped)
        }) {
            request.status = status.status.clone();
            request.record(status);
            outcome.logistics += 1;
        }
    }

    tracing::info!(
        po_id = %customer.po_id,
        received = outcome.received,
        logistics = outcome.logistics,
        "in-transit lines advanced"
    );
    outcome
}

/// Verify the lines of one shipping request.
///
/// Shipping lines with `shipping_request_number` are matched to customer
/// lines by line number. The customer line takes the request number and the
/// carrier's first `received` time when it has none yet, and becomes
/// `verified`. One good receipt is returned per verified shipping line.
///
/// The request number alone selects the lines: a line still `shipped` is
/// verified as well, the customer's confirmation standing in for the
/// receipt step.
pub fn verify_receipt(
    customer: &mut CustomerLineItems,
    logistics: &ShippingPrivateDetails,
    shipping_request_number: i64,
) -> Vec<GoodReceipt> {
    let index: HashMap<u32, usize> = customer
        .line_items
        .iter()
        .enumerate()
        .map(|(i, l)| (l.line_number, i))
        .collect();
    let mut receipts = Vec::new();

    for shipped in logistics
        .line_items
        .iter()
        .filter(|s| s.shipping_request_number == shipping_request_number)
    {
        let Some(&i) = index.get(&shipped.line_number) else {
            continue;
        };
        let line = &mut customer.line_items[i];
        if line.shipping_request_number == 0 {
            line.shipping_request_number = shipped.shipping_request_number;
        }
        if line.time_received == 0 {
            if let Some(received) = shipped.first_with_status(&Status::Received) {
                line.time_received = received.time_stamp;
            }
        }
        line.status = Status::Verified;
        receipts.push(GoodReceipt {
            material_certificate: line.material_certificate.clone(),
            shipped_line_item: shipped.clone(),
        });
    }

    tracing::info!(
        po_id = %customer.po_id,
        shipping_request_number,
        verified = receipts.len(),
        "receipt verified"
    );
    receipts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Mtr, ShippingLineItem};
    use materialtrace_core::{ItemKey, PoId};

    fn po_id() -> PoId {
        PoId::new("po-rcv").unwrap()
    }

    fn customer_line(line_number: u32, status: Status) -> LineItem {
        LineItem {
            line_number,
            item_key: ItemKey::derive(&po_id(), line_number, "m"),
            status,
            ..LineItem::default()
        }
    }

    fn shipping_line(line_number: u32, srn: i64, status: Status) -> ShippingLineItem {
        ShippingLineItem {
            po_id: po_id(),
            line_number,
            shipping_request_number: srn,
            status,
            ..ShippingLineItem::default()
        }
    }

    #[test]
    fn only_shipped_lines_are_advanced() {
        let mut customer = CustomerLineItems::new(
            po_id(),
            vec![customer_line(1, Status::Shipped), customer_line(2, Status::Wip), customer_line(3, Status::Shipped)],
        );
        let mut logistics = ShippingPrivateDetails {
            line_items: vec![shipping_line(1, 5, Status::InTransit), shipping_line(2, 5, Status::InTransit), shipping_line(1, 6, Status::Delivered)],
            ..ShippingPrivateDetails::new(po_id())
        };
        let mut incoming = customer_line(1, Status::Unset);
        incoming.shipping_request_number = 5;
        let status = ItemStatus::new("Utility", Status::Received, 900);

        let outcome = advance_in_transit(&mut customer, Some(&mut logistics), &[incoming, customer_line(2, Status::Unset)], &status);

        assert_eq!(outcome, AdvanceOutcome { received: 1, logistics: 1 });
        assert_eq!(customer.line_items[0].status, Status::Received);
        assert_eq!(customer.line_items[0].shipping_request_number, 5);
        assert_eq!(customer.line_items[1].status, Status::Wip);
        assert_eq!(customer.line_items[2].status, Status::Shipped);
        assert_eq!(logistics.line_items[0].status, Status::Received);
        assert_eq!(logistics.line_items[1].status, Status::InTransit);
        assert!(logistics.line_items[1].progress_status.is_empty());
        assert_eq!(logistics.line_items[2].status, Status::Delivered);
    }

    #[test]
    fn advancing_without_logistics_still_updates_customer() {
        let mut customer = CustomerLineItems::new(po_id(), vec![customer_line(1, Status::Shipped)]);
        let status = ItemStatus::new("Utility", Status::Received, 900);
        let outcome = advance_in_transit(&mut customer, None, &[customer_line(1, Status::Unset)], &status);
        assert_eq!(outcome.received, 1);
        assert_eq!(outcome.logistics, 0);
    }

    #[test]
    fn verification_backfills_and_returns_receipts() {
        let mut line = customer_line(1, Status::Received);
        line.material_certificate = vec![Mtr { name: "heat".to_string(), value: "H1".to_string() }];
        let mut customer = CustomerLineItems::new(po_id(), vec![line, customer_line(2, Status::Received)]);

        let mut received = shipping_line(1, 77, Status::Received);
        received.progress_status = vec![
            ItemStatus::new("Logistics", Status::InTransit, 100),
            ItemStatus::new("Utility", Status::Received, 200),
            ItemStatus::new("Utility", Status::Received, 300),
        ];
        let logistics = ShippingPrivateDetails {
            line_items: vec![received, shipping_line(2, 78, Status::Received)],
            ..ShippingPrivateDetails::new(po_id())
        };

        let receipts = verify_receipt(&mut customer, &logistics, 77);

        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].material_certificate.len(), 1);
        assert_eq!(receipts[0].shipped_line_item.line_number, 1);
        let line = &customer.line_items[0];
        assert_eq!(line.status, Status::Verified);
        assert_eq!(line.shipping_request_number, 77);
        assert_eq!(line.time_received, 200);
        assert_eq!(customer.line_items[1].status, Status::Received);
    }

    #[test]
    fn shipped_line_is_verified_without_a_receipt_step() {
        let mut customer = CustomerLineItems::new(po_id(), vec![customer_line(1, Status::Shipped)]);
        let logistics = ShippingPrivateDetails {
            line_items: vec![shipping_line(1, 55, Status::Open)],
            ..ShippingPrivateDetails::new(po_id())
        };

        let receipts = verify_receipt(&mut customer, &logistics, 55);

        assert_eq!(receipts.len(), 1);
        let line = &customer.line_items[0];
        assert_eq!(line.status, Status::Verified);
        assert_eq!(line.shipping_request_number, 55);
        assert_eq!(line.time_received, 0);
    }

    #[test]
    fn unknown_request_number_verifies_nothing() {
        let mut customer = CustomerLineItems::new(po_id(), vec![customer_line(1, Status::Received)]);
        let logistics = ShippingPrivateDetails {
            line_items: vec![shipping_line(1, 77, Status::Received)],
            ..ShippingPrivateDetails::new(po_id())
        };
        assert!(verify_receipt(&mut customer, &logistics, 1).is_empty());
        assert_eq!(customer.line_items[0].status, Status::Received);
    }
}
