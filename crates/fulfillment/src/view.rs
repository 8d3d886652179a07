//! Read-side composition of partition records.
//!
//! The primary record carries no line detail. A consolidated view is rebuilt
//! on every read: the customer partition supplies the line list, pricing
//! partitions are overlaid by `ItemKey`, and logistics (which never sees item
//! keys) is overlaid by line number. Each overlay is a pure function of the
//! records handed in, so a view only ever contains what the caller could read.

use std::collections::{BTreeMap, HashMap};

use materialtrace_core::ItemKey;

use crate::model::{
    CustomerLineItems, FieldOperatorReport, LineItem, LineItemPricing, OrderRequest, PmView,
    PricingDetails, PricingResults, PurchaseOrder, SharedProgressReport, ShippingPrivateDetails,
    ShippingRequestsResults,
};
use crate::partition::Partition;
use crate::state::{ProgressLog, Status};

/// Partition records of one order, as far as the caller may read them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionSet {
    pub customer: Option<CustomerLineItems>,
    pub distributor: Option<PricingDetails>,
    pub manufacturer1: Option<PricingDetails>,
    pub manufacturer2: Option<PricingDetails>,
    pub logistics: Option<ShippingPrivateDetails>,
    pub progress: Option<SharedProgressReport>,
}

impl PartitionSet {
    fn pricing(&self) -> [(Partition, Option<&PricingDetails>); 3] {
        [
            (Partition::CustomerDistributor, self.distributor.as_ref()),
            (Partition::DistributorManufacturer1, self.manufacturer1.as_ref()),
            (Partition::DistributorManufacturer2, self.manufacturer2.as_ref()),
        ]
    }
}

/// Rebuild the consolidated view of `po` from its partitions.
pub fn compose(mut po: PurchaseOrder, parts: &PartitionSet) -> PurchaseOrder {
    po.line_items = parts
        .customer
        .as_ref()
        .map(|c| c.line_items.clone())
        .unwrap_or_default();
    if po.line_items.is_empty() {
        return po;
    }

    let by_key: HashMap<ItemKey, usize> = po
        .line_items
        .iter()
        .enumerate()
        .map(|(i, l)| (l.item_key.clone(), i))
        .collect();

    for (partition, details) in parts.pricing() {
        let Some(details) = details else { continue };
        for pricing in &details.line_items {
            let Some(&index) = by_key.get(&pricing.item_key) else {
                continue;
            };
            overlay_pricing(&mut po.line_items[index], pricing, partition, po.acceptance_time_stamp);
        }
    }

    if let Some(logistics) = &parts.logistics {
        let by_line: HashMap<u32, usize> = po
            .line_items
            .iter()
            .enumerate()
            .map(|(i, l)| (l.line_number, i))
            .collect();
        for shipping in &logistics.line_items {
            let Some(&index) = by_line.get(&shipping.line_number) else {
                continue;
            };
            let line = &mut po.line_items[index];
            if line.shipping_request_number == 0 {
                line.shipping_request_number = shipping.shipping_request_number;
            }
            if line.time_received == 0 {
                if let Some(received) = shipping.first_with_status(&Status::Received) {
                    line.time_received = received.time_stamp;
                }
            }
        }
    }

    po
}

fn overlay_pricing(line: &mut LineItem, pricing: &LineItemPricing, partition: Partition, accepted_at: i64) {
    let from_distributor = partition == Partition::CustomerDistributor;
    if from_distributor && !line.is_split() {
        line.unit_price = pricing.unit_price;
        line.subtotal = pricing.subtotal;
        line.quantity = pricing.quantity;
    }
    line.material_certificate = pricing.material_certificate.clone();
    let tracked = !pricing.iot_tracking_code.is_empty();
    if tracked && (!line.is_split() || line.iot_tracking_code.is_empty()) {
        line.iot_tracking_code = pricing.iot_tracking_code.clone();
        line.iot_properties = pricing.iot_properties.clone();
    }

    let fulfiller = partition
        .fulfiller()
        .map(|r| r.organization_name())
        .unwrap_or_default();
    if let Some(request) = matching_request(&mut line.order_requests, fulfiller) {
        request.progress_status = pricing.progress_status.clone();
        request.acknowledged_time_stamp = if from_distributor {
            accepted_at
        } else {
            pricing.acknowledged_time_stamp
        };
        request.time_shipped = pricing.time_shipped;
        if tracked {
            request.iot_tracking_code = pricing.iot_tracking_code.clone();
        }
    }
}

fn matching_request<'a>(requests: &'a mut [OrderRequest], fulfiller: &str) -> Option<&'a mut OrderRequest> {
    let index = requests
        .iter()
        .position(|r| r.fulfilled_by.eq_ignore_ascii_case(fulfiller))
        .unwrap_or(0);
    requests.get_mut(index)
}

/// A pricing partition joined with its primary record.
pub fn pricing_results(po: &PurchaseOrder, pricing: PricingDetails) -> PricingResults {
    PricingResults {
        po_id: po.po_id.clone(),
        po_number: po.po_number,
        owner: po.owner.clone(),
        po_status: po.po_status.clone(),
        expected_delivery_date: po.expected_delivery_date.clone(),
        line_items: pricing.line_items,
    }
}

/// The logistics partition joined with its primary record.
pub fn shipping_results(po: &PurchaseOrder, shipping: ShippingPrivateDetails) -> ShippingRequestsResults {
    ShippingRequestsResults {
        po_id: po.po_id.clone(),
        po_number: po.po_number,
        po_status: po.po_status.clone(),
        owner: po.owner.clone(),
        expected_delivery_date: po.expected_delivery_date.clone(),
        line_items: shipping.line_items,
    }
}

/// Field-operator report for one order. `None` when the customer partition
/// is not available.
pub fn field_operator_report(
    shipping: &ShippingRequestsResults,
    po: Option<PurchaseOrder>,
    parts: &PartitionSet,
) -> Option<FieldOperatorReport> {
    let customer = parts.customer.as_ref()?;

    let mut report = FieldOperatorReport::default();
    for line in shipping.line_items.iter().filter(|l| l.status != Status::Open) {
        report.shipped_items_map.insert(line.line_number, line.clone());
        report
            .shipping_request_map
            .entry(line.shipping_request_number)
            .or_default()
            .push(line.clone());
    }

    report.pm_view_item = PmView {
        po_id: shipping.po_id.clone(),
        po_number: shipping.po_number,
        po_status: shipping.po_status.clone(),
        project_id: po.as_ref().map(|p| p.project_id.clone()).unwrap_or_default(),
        line_items: customer
            .line_items
            .iter()
            .filter_map(|line| {
                let shipped = report.shipped_items_map.get(&line.line_number)?;
                Some(LineItem {
                    shipping_request_number: shipped.shipping_request_number,
                    ..line.clone()
                })
            })
            .collect(),
    };

    report.distributor_line_item_map = by_line_number(parts.distributor.as_ref());
    report.manufacturer1_line_item_map = by_line_number(parts.manufacturer1.as_ref());
    report.manufacturer2_line_item_map = by_line_number(parts.manufacturer2.as_ref());
    report.progress_report_map = parts
        .progress
        .iter()
        .flat_map(|p| p.line_items.iter())
        .map(|l| (l.line_number, l.clone()))
        .collect();
    report.original_po = po.unwrap_or_default();

    Some(report)
}

fn by_line_number(details: Option<&PricingDetails>) -> BTreeMap<u32, LineItemPricing> {
    details
        .iter()
        .flat_map(|d| d.line_items.iter())
        .map(|l| (l.line_number, l.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShippingLineItem;
    use crate::state::ItemStatus;
    use materialtrace_core::PoId;

    fn po_id() -> PoId {
        PoId::new("po-view").unwrap()
    }

    fn key(line_number: u32) -> ItemKey {
        ItemKey::derive(&po_id(), line_number, "m")
    }

    fn primary() -> PurchaseOrder {
        PurchaseOrder {
            po_id: po_id(),
            po_number: 5,
            acceptance_time_stamp: 700,
            ..PurchaseOrder::default()
        }
    }

    fn customer_line(line_number: u32, requests: &[&str]) -> LineItem {
        LineItem {
            line_number,
            item_key: key(line_number),
            quantity: 3,
            unit_price: 100.0,
            order_requests: requests
                .iter()
                .map(|f| OrderRequest {
                    line_number,
                    fulfilled_by: f.to_string(),
                    ..OrderRequest::default()
                })
                .collect(),
            ..LineItem::default()
        }
    }

    fn pricing(line_number: u32, quantity: u32, unit_price: f64, owner: &str) -> LineItemPricing {
        LineItemPricing {
            line_number,
            item_key: key(line_number),
            quantity,
            unit_price,
            subtotal: (f64::from(quantity) * unit_price).round(),
            iot_tracking_code: format!("T-{owner}"),
            acknowledged_time_stamp: 800,
            time_shipped: 900,
            progress_status: vec![ItemStatus::new(owner, Status::Accepted, 1)],
            ..LineItemPricing::default()
        }
    }

    fn details(partition: Partition, lines: Vec<LineItemPricing>) -> PricingDetails {
        PricingDetails {
            line_items: lines,
            ..PricingDetails::new(partition, po_id())
        }
    }

    #[test]
    fn without_customer_partition_the_view_has_no_lines() {
        let po = compose(primary(), &PartitionSet::default());
        assert!(po.line_items.is_empty());
    }

    #[test]
    fn unsplit_line_takes_distributor_pricing() {
        let parts = PartitionSet {
            customer: Some(CustomerLineItems::new(po_id(), vec![customer_line(1, &["Distributor"])])),
            distributor: Some(details(Partition::CustomerDistributor, vec![pricing(1, 2, 95.0, "Distributor")])),
            ..PartitionSet::default()
        };
        let po = compose(primary(), &parts);
        let line = &po.line_items[0];
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, 95.0);
        assert_eq!(line.order_requests[0].acknowledged_time_stamp, 700);
        assert_eq!(line.order_requests[0].time_shipped, 900);
    }

    #[test]
    fn split_line_keeps_customer_quantity_and_routes_each_overlay_to_its_request() {
        let parts = PartitionSet {
            customer: Some(CustomerLineItems::new(
                po_id(),
                vec![customer_line(1, &["Distributor", "Manufacturer 1"])],
            )),
            distributor: Some(details(Partition::CustomerDistributor, vec![pricing(1, 1, 100.0, "Distributor")])),
            manufacturer1: Some(details(Partition::DistributorManufacturer1, vec![pricing(1, 2, 90.0, "Manufacturer 1")])),
            ..PartitionSet::default()
        };
        let po = compose(primary(), &parts);
        let line = &po.line_items[0];
        assert_eq!(line.quantity, 3);
        assert_eq!(line.unit_price, 100.0);
        assert_eq!(line.order_requests[0].acknowledged_time_stamp, 700);
        assert_eq!(line.order_requests[1].acknowledged_time_stamp, 800);
        assert_eq!(line.order_requests[1].progress_status[0].owner, "Manufacturer 1");
        assert_eq!(line.iot_tracking_code, "T-Distributor");
        assert_eq!(line.order_requests[0].iot_tracking_code, "T-Distributor");
        assert_eq!(line.order_requests[1].iot_tracking_code, "T-Manufacturer 1");
    }

    #[test]
    fn logistics_backfills_only_missing_fields() {
        let mut received = customer_line(1, &[]);
        received.shipping_request_number = 11;
        let parts = PartitionSet {
            customer: Some(CustomerLineItems::new(po_id(), vec![received, customer_line(2, &[])])),
            logistics: Some(ShippingPrivateDetails {
                line_items: vec![
                    ShippingLineItem {
                        line_number: 1,
                        shipping_request_number: 22,
                        progress_status: vec![ItemStatus::new("Logistics", Status::Received, 50)],
                        ..ShippingLineItem::default()
                    },
                    ShippingLineItem {
                        line_number: 2,
                        shipping_request_number: 33,
                        ..ShippingLineItem::default()
                    },
                ],
                ..ShippingPrivateDetails::new(po_id())
            }),
            ..PartitionSet::default()
        };
        let po = compose(primary(), &parts);
        assert_eq!(po.line_items[0].shipping_request_number, 11);
        assert_eq!(po.line_items[0].time_received, 50);
        assert_eq!(po.line_items[1].shipping_request_number, 33);
        assert_eq!(po.line_items[1].time_received, 0);
    }

    #[test]
    fn field_operator_report_lists_only_lines_that_left_the_origin() {
        let shipping = ShippingRequestsResults {
            po_id: po_id(),
            po_number: 5,
            line_items: vec![
                ShippingLineItem { line_number: 1, shipping_request_number: 7, status: Status::InTransit, ..ShippingLineItem::default() },
                ShippingLineItem { line_number: 2, shipping_request_number: 7, status: Status::Open, ..ShippingLineItem::default() },
            ],
            ..ShippingRequestsResults::default()
        };
        let parts = PartitionSet {
            customer: Some(CustomerLineItems::new(po_id(), vec![customer_line(1, &[]), customer_line(2, &[])])),
            ..PartitionSet::default()
        };

        let report = field_operator_report(&shipping, Some(primary()), &parts).unwrap();
        assert_eq!(report.shipped_items_map.len(), 1);
        assert_eq!(report.shipping_request_map[&7].len(), 1);
        assert_eq!(report.pm_view_item.line_items.len(), 1);
        assert_eq!(report.pm_view_item.line_items[0].shipping_request_number, 7);
        assert_eq!(report.original_po.po_number, 5);

        assert!(field_operator_report(&shipping, None, &PartitionSet::default()).is_none());
    }
}
