//! Shipment notification from a fulfiller, and the distributor-side
//! bookkeeping that follows it.

use materialtrace_auth::Role;
use materialtrace_core::PoId;

use super::{by_item_key, by_line_number};
use crate::model::{
    Company, CustomerLineItems, LineItem, LineItemPricing, PricingDetails, ShippingLineItem,
    ShippingPrivateDetails,
};
use crate::progress::{LineProgress, ProgressMode, ProgressUpdate};
use crate::state::{ItemStatus, ProgressLog, Status};

/// A fulfiller's request to ship some of its lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentNotice {
    /// Shipped lines as sent by the fulfiller: item key and line number
    /// identify the line, the rest carries tracking code, certificate and
    /// ship time.
    pub lines: Vec<LineItem>,
    pub shipping_request_number: i64,
    pub status: ItemStatus,
    /// Seed of every new logistics line's progress log.
    pub logistics_initial: Vec<ItemStatus>,
    pub requested_by: Role,
}

/// What a shipment notification produced besides the origin record.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentRecord {
    /// Notice lines that matched a stored line, with the request number set.
    pub shipped: Vec<LineItem>,
    pub logistics: ShippingPrivateDetails,
    pub progress: ProgressUpdate,
}

impl ShipmentRecord {
    fn new(po_id: &PoId, logistics: Option<ShippingPrivateDetails>, notice: &ShipmentNotice) -> Self {
        Self {
            shipped: Vec::new(),
            logistics: logistics.unwrap_or_else(|| ShippingPrivateDetails::new(po_id.clone())),
            progress: ProgressUpdate::new(ProgressMode::ItemShipped, notice.status.clone()),
        }
    }

    fn add(&mut self, notice: &ShipmentNotice, shipped: &LineItem, goods: Goods<'_>, initial: &[ItemStatus]) {
        let mut shipped = shipped.clone();
        shipped.shipping_request_number = notice.shipping_request_number;
        self.progress.insert(shipped.line_number, LineProgress::from(&shipped));

        let mut progress_status = initial.to_vec();
        progress_status.push(notice.status.clone());
        let request = ShippingLineItem {
            po_id: self.logistics.po_id.clone(),
            po_number: goods.po_number,
            line_number: shipped.line_number,
            quantity: goods.quantity,
            unit_of_measure: goods.unit_of_measure.to_string(),
            shipping_request_number: notice.shipping_request_number,
            material_id: goods.material_id.to_string(),
            description: goods.description.to_string(),
            requested_by: notice.requested_by.organization_name().to_string(),
            iot_tracking_code: shipped.iot_tracking_code.clone(),
            ship_to_location: goods.ship_to.clone(),
            status: Status::Open,
            delivery_date: goods.delivery_date.to_string(),
            time_requested: shipped.time_shipped,
            time_shipped: 0,
            progress_status,
        };
        upsert_shipping_line(&mut self.logistics, request);
        self.shipped.push(shipped);
    }
}

/// Stored fields a logistics line copies from the origin record.
struct Goods<'a> {
    po_number: u32,
    material_id: &'a str,
    description: &'a str,
    quantity: u32,
    unit_of_measure: &'a str,
    ship_to: &'a Company,
    delivery_date: &'a str,
}

impl<'a> From<&'a LineItem> for Goods<'a> {
    fn from(line: &'a LineItem) -> Self {
        Self {
            po_number: line.po_number,
            material_id: &line.material_id,
            description: &line.description,
            quantity: line.quantity,
            unit_of_measure: &line.unit_of_measure,
            ship_to: &line.ship_to_location,
            delivery_date: &line.delivery_date,
        }
    }
}

impl<'a> From<&'a LineItemPricing> for Goods<'a> {
    fn from(line: &'a LineItemPricing) -> Self {
        Self {
            po_number: line.po_number,
            material_id: &line.material_id,
            description: &line.description,
            quantity: line.quantity,
            unit_of_measure: &line.unit_of_measure,
            ship_to: &line.ship_to_location,
            delivery_date: &line.delivery_date,
        }
    }
}

/// A shipping request line is identified by line number, request number and
/// requester; re-sending the same shipment replaces it.
fn upsert_shipping_line(logistics: &mut ShippingPrivateDetails, line: ShippingLineItem) {
    let existing = logistics.line_items.iter_mut().find(|l| {
        l.line_number == line.line_number
            && l.shipping_request_number == line.shipping_request_number
            && l.requested_by == line.requested_by
    });
    match existing {
        Some(slot) => *slot = line,
        None => logistics.line_items.push(line),
    }
}

/// Distributor ships from stock: the customer partition is the origin.
pub fn ship_from_stock(
    customer: &mut CustomerLineItems,
    logistics: Option<ShippingPrivateDetails>,
    notice: &ShipmentNotice,
) -> ShipmentRecord {
    let wanted = by_item_key(&notice.lines);
    let requester = notice.requested_by.organization_name();
    let mut record = ShipmentRecord::new(&customer.po_id, logistics, notice);
    let mut initial = notice.logistics_initial.clone();

    for line in &mut customer.line_items {
        let Some(shipped) = wanted.get(&line.item_key).copied() else {
            continue;
        };
        if shipped.line_number != line.line_number {
            continue;
        }

        line.material_certificate = shipped.material_certificate.clone();
        line.time_shipped = shipped.time_shipped;
        line.iot_tracking_code = shipped.iot_tracking_code.clone();
        line.shipping_request_number = notice.shipping_request_number;
        line.record(&notice.status);

        if record.shipped.is_empty() {
            if let (Some(seed), Some(created)) = (initial.first_mut(), line.progress_status.first()) {
                seed.time_stamp = created.time_stamp;
            }
        }

        for request in line.requests_for(requester) {
            request.status = Status::Shipped;
            request.iot_tracking_code = shipped.iot_tracking_code.clone();
            request.time_shipped = shipped.time_shipped;
        }
        line.sync_status_with_requests();

        record.add(notice, shipped, Goods::from(&*line), &initial);
    }

    tracing::info!(po_id = %customer.po_id, shipped = record.shipped.len(), "stock shipment recorded");
    record
}

/// Mirror a stock shipment onto the customer-distributor pricing record.
pub fn mirror_stock_shipment(pricing: &mut PricingDetails, shipped: &[LineItem], status: &ItemStatus) -> usize {
    let wanted = by_item_key(shipped);
    let mut mirrored = 0;
    for line in &mut pricing.line_items {
        let Some(shipped) = wanted.get(&line.item_key).copied() else {
            continue;
        };
        if shipped.line_number != line.line_number {
            continue;
        }
        line.status = Status::Shipped;
        line.record(status);
        line.time_shipped = shipped.time_shipped;
        line.material_certificate = shipped.material_certificate.clone();
        mirrored += 1;
    }
    mirrored
}

/// A manufacturer ships its share: its pricing partition is the origin.
pub fn ship_manufacturer_share(
    pricing: &mut PricingDetails,
    logistics: Option<ShippingPrivateDetails>,
    notice: &ShipmentNotice,
) -> ShipmentRecord {
    let wanted = by_item_key(&notice.lines);
    let mut record = ShipmentRecord::new(&pricing.po_id, logistics, notice);

    for line in &mut pricing.line_items {
        let Some(shipped) = wanted.get(&line.item_key).copied() else {
            continue;
        };
        if shipped.line_number != line.line_number {
            continue;
        }

        line.status = notice.status.status.clone();
        line.record(&notice.status);
        line.iot_tracking_code = shipped.iot_tracking_code.clone();
        line.material_certificate = shipped.material_certificate.clone();
        line.time_shipped = shipped.time_shipped;

        record.add(notice, shipped, Goods::from(&*line), &notice.logistics_initial);
    }

    tracing::info!(po_id = %pricing.po_id, shipped = record.shipped.len(), "manufacturer shipment recorded");
    record
}

/// Reflect a manufacturer's shipment on the customer partition. Lines are
/// matched by line number. A split line keeps the tracking code it already
/// carries; the manufacturer's code lives on its order request.
pub fn on_manufacturer_shipment(customer: &mut CustomerLineItems, shipped: &[LineItem], status: &ItemStatus) -> usize {
    let wanted = by_line_number(shipped);
    let mut updated = 0;

    for line in &mut customer.line_items {
        let Some(shipped) = wanted.get(&line.line_number).copied() else {
            continue;
        };
        if line.po_number == 0 {
            line.po_number = shipped.po_number;
        }
        line.status = status.status.clone();
        if !line.is_split() || line.iot_tracking_code.is_empty() {
            line.iot_tracking_code = shipped.iot_tracking_code.clone();
        }
        line.material_certificate = shipped.material_certificate.clone();
        line.time_shipped = shipped.time_shipped;
        line.record(status);

        for request in &mut line.order_requests {
            let fulfiller = Role::from_organization_name(&request.fulfilled_by);
            if request.line_number == shipped.line_number && fulfiller.is_some_and(Role::is_manufacturer) {
                request.status = Status::Shipped;
                request.iot_tracking_code = shipped.iot_tracking_code.clone();
                request.time_shipped = shipped.time_shipped;
            }
        }
        line.sync_status_with_requests();
        updated += 1;
    }
    updated
}

/// Record the carrier's pickup on the customer partition. Lines are matched
/// by item key.
pub fn on_logistics_shipment(
    customer: &mut CustomerLineItems,
    shipped: &[LineItem],
    time_shipped: i64,
    status: &ItemStatus,
) -> usize {
    let wanted = by_item_key(shipped);
    let mut updated = 0;

    for line in &mut customer.line_items {
        let Some(shipped) = wanted.get(&line.item_key).copied() else {
            continue;
        };
        if shipped.line_number != line.line_number {
            continue;
        }
        line.iot_tracking_code = shipped.iot_tracking_code.clone();
        for request in line.order_requests.iter_mut().filter(|r| r.line_number == shipped.line_number) {
            request.status = Status::Shipped;
            request.iot_tracking_code = shipped.iot_tracking_code.clone();
            if request.time_shipped == 0 {
                request.time_shipped = time_shipped;
            }
        }
        line.record(status);
        updated += 1;
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Mtr, OrderRequest};
    use crate::partition::Partition;
    use materialtrace_core::ItemKey;

    fn po_id() -> PoId {
        PoId::new("po-ship").unwrap()
    }

    fn key(line_number: u32) -> ItemKey {
        ItemKey::derive(&po_id(), line_number, "m")
    }

    fn stored(line_number: u32, requests: &[&str]) -> LineItem {
        LineItem {
            po_number: 9,
            line_number,
            item_key: key(line_number),
            quantity: 3,
            description: "Pipe".to_string(),
            status: Status::Wip,
            progress_status: vec![ItemStatus::new("Utility", Status::Open, 5)],
            order_requests: requests
                .iter()
                .map(|f| OrderRequest {
                    line_number,
                    fulfilled_by: f.to_string(),
                    status: Status::Wip,
                    ..OrderRequest::default()
                })
                .collect(),
            ..LineItem::default()
        }
    }

    fn shipped(line_number: u32) -> LineItem {
        LineItem {
            line_number,
            item_key: key(line_number),
            iot_tracking_code: "T1".to_string(),
            time_shipped: 60,
            material_certificate: vec![Mtr { name: "heat".to_string(), value: "H1".to_string() }],
            ..LineItem::default()
        }
    }

    fn notice(requested_by: Role, lines: Vec<LineItem>) -> ShipmentNotice {
        ShipmentNotice {
            lines,
            shipping_request_number: 7001,
            status: ItemStatus::new(requested_by.organization_name(), Status::Shipped, 60),
            logistics_initial: vec![ItemStatus::new("Utility", Status::Open, 0)],
            requested_by,
        }
    }

    #[test]
    fn stock_shipment_updates_line_requests_and_logistics() {
        let mut customer = CustomerLineItems::new(po_id(), vec![stored(1, &["Distributor", "Manufacturer 1"]), stored(2, &["Distributor"])]);
        let record = ship_from_stock(&mut customer, None, &notice(Role::Distributor, vec![shipped(1)]));

        let line = &customer.line_items[0];
        assert_eq!(line.iot_tracking_code, "T1");
        assert_eq!(line.shipping_request_number, 7001);
        assert_eq!(line.order_requests[0].status, Status::Shipped);
        assert_eq!(line.order_requests[1].status, Status::Wip);
        assert_eq!(line.status, Status::Wip);
        assert_eq!(customer.line_items[1].status, Status::Wip);

        assert_eq!(record.logistics.line_items.len(), 1);
        let request = &record.logistics.line_items[0];
        assert_eq!(request.status, Status::Open);
        assert_eq!(request.requested_by, "Distributor");
        assert_eq!(request.quantity, 3);
        assert_eq!(request.time_requested, 60);
        assert_eq!(request.progress_status.len(), 2);
        assert_eq!(request.progress_status[0].time_stamp, 5);
        assert_eq!(record.progress.lines[&1].shipping_request_number, 7001);
    }

    #[test]
    fn resending_a_shipment_does_not_duplicate_logistics_lines() {
        let mut customer = CustomerLineItems::new(po_id(), vec![stored(1, &["Distributor"])]);
        let n = notice(Role::Distributor, vec![shipped(1)]);
        let first = ship_from_stock(&mut customer, None, &n);
        let again = ship_from_stock(&mut customer, Some(first.logistics), &n);
        assert_eq!(again.logistics.line_items.len(), 1);
        assert_eq!(customer.line_items[0].progress_status.len(), 2);
    }

    #[test]
    fn manufacturer_share_ships_from_pricing_partition() {
        let mut pricing = PricingDetails {
            line_items: vec![LineItemPricing {
                po_number: 9,
                line_number: 1,
                item_key: key(1),
                quantity: 2,
                status: Status::Accepted,
                ..LineItemPricing::default()
            }],
            ..PricingDetails::new(Partition::DistributorManufacturer1, po_id())
        };
        let record = ship_manufacturer_share(&mut pricing, None, &notice(Role::Manufacturer1, vec![shipped(1), shipped(4)]));

        assert_eq!(pricing.line_items[0].status, Status::Shipped);
        assert_eq!(pricing.line_items[0].iot_tracking_code, "T1");
        assert_eq!(record.shipped.len(), 1);
        assert_eq!(record.logistics.line_items[0].quantity, 2);
        assert_eq!(record.logistics.line_items[0].requested_by, "Manufacturer 1");
    }

    #[test]
    fn mirror_marks_distributor_pricing_shipped_once() {
        let mut pricing = PricingDetails {
            line_items: vec![LineItemPricing { line_number: 1, item_key: key(1), status: Status::Wip, ..LineItemPricing::default() }],
            ..PricingDetails::new(Partition::CustomerDistributor, po_id())
        };
        let status = ItemStatus::new("Distributor", Status::Shipped, 60);
        assert_eq!(mirror_stock_shipment(&mut pricing, &[shipped(1)], &status), 1);
        mirror_stock_shipment(&mut pricing, &[shipped(1)], &status);
        assert_eq!(pricing.line_items[0].status, Status::Shipped);
        assert_eq!(pricing.line_items[0].progress_status.len(), 1);
        assert_eq!(pricing.line_items[0].time_shipped, 60);
    }

    #[test]
    fn manufacturer_shipment_reaches_customer_by_line_number() {
        let mut line = stored(1, &["Manufacturer 2"]);
        line.po_number = 0;
        let mut customer = CustomerLineItems::new(po_id(), vec![line]);
        let mut incoming = shipped(1);
        incoming.item_key = ItemKey::default();
        incoming.po_number = 9;

        let status = ItemStatus::new("Manufacturer 2", Status::Shipped, 70);
        assert_eq!(on_manufacturer_shipment(&mut customer, &[incoming], &status), 1);
        let line = &customer.line_items[0];
        assert_eq!(line.po_number, 9);
        assert_eq!(line.order_requests[0].status, Status::Shipped);
        assert_eq!(line.status, Status::Shipped);
        assert_eq!(line.material_certificate.len(), 1);
    }

    #[test]
    fn split_line_ships_only_when_both_shares_have_shipped() {
        let mut customer = CustomerLineItems::new(po_id(), vec![stored(1, &["Distributor", "Manufacturer 1"])]);
        customer.line_items[0].order_requests[1].status = Status::Open;
        let mut stock = shipped(1);
        stock.iot_tracking_code = "TD".to_string();
        ship_from_stock(&mut customer, None, &notice(Role::Distributor, vec![stock]));
        assert_eq!(customer.line_items[0].status, Status::Open);

        let mut share = shipped(1);
        share.iot_tracking_code = "TM".to_string();
        let status = ItemStatus::new("Manufacturer 1", Status::Shipped, 70);
        on_manufacturer_shipment(&mut customer, &[share], &status);

        let line = &customer.line_items[0];
        assert_eq!(line.status, Status::Shipped);
        assert_eq!(line.iot_tracking_code, "TD");
        assert_eq!(line.order_requests[0].iot_tracking_code, "TD");
        assert_eq!(line.order_requests[1].iot_tracking_code, "TM");
        assert!(line.awaits("TD"));
        assert!(line.awaits("TM"));
    }

    #[test]
    fn carrier_pickup_sets_tracking_on_every_request_of_the_line() {
        let mut customer = CustomerLineItems::new(po_id(), vec![stored(1, &["Distributor", "Manufacturer 1"])]);
        let status = ItemStatus::new("Logistics", Status::InTransit, 80);
        assert_eq!(on_logistics_shipment(&mut customer, &[shipped(1)], 80, &status), 1);
        let line = &customer.line_items[0];
        assert!(line.order_requests.iter().all(|r| r.status == Status::Shipped && r.iot_tracking_code == "T1"));
        assert!(line.order_requests.iter().all(|r| r.time_shipped == 80));
        assert_eq!(line.progress_status.last(), Some(&status));
    }
}
