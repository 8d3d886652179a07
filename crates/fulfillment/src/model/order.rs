use serde::{Deserialize, Serialize};

use materialtrace_core::{ItemKey, PoId};

use super::{Company, IotProperty, Mtr, nullable};
use crate::state::{ItemStatus, Status};

/// The primary purchase order record.
///
/// Once the order is created the primary copy never carries line detail;
/// `line_items` is only populated on composed views and on the request
/// payloads clients send in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseOrder {
    #[serde(rename = "docType")]
    pub doc_type: String,
    pub po_id: PoId,
    pub po_number: u32,
    pub owner: Company,
    pub issued_to: Company,
    pub comment: String,
    pub po_status: Status,
    #[serde(deserialize_with = "nullable")]
    pub line_items: Vec<LineItem>,
    pub is_finalized: bool,
    pub acceptance_time_stamp: i64,
    pub created_time_stamp: i64,
    pub expected_delivery_date: String,
    pub client_user_agent: String,
    pub project_id: String,
}

/// A line of a purchase order as the customer sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineItem {
    pub po_number: u32,
    pub line_number: u32,
    pub material_id: String,
    pub material_group: String,
    pub item_key: ItemKey,
    pub description: String,
    pub quantity: u32,
    pub unit_of_measure: String,
    pub unit_price: f64,
    pub currency: String,
    pub subtotal: f64,
    pub ship_to_location: Company,
    pub project_id: String,
    pub delivery_date: String,
    pub assigned_to: String,
    pub status: Status,
    pub assigned_qty: u32,
    pub mfr_unit_price: f64,
    #[serde(deserialize_with = "nullable")]
    pub order_requests: Vec<OrderRequest>,
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
    pub acknowledged_time_stamp: i64,
}

impl LineItem {
    /// Whether the line's quantity was divided between several fulfillers.
    pub fn is_split(&self) -> bool {
        self.order_requests.len() > 1
    }

    /// Order requests of this line handled by `fulfiller` (organization name).
    pub fn requests_for<'a>(
        &'a mut self,
        fulfiller: &'a str,
    ) -> impl Iterator<Item = &'a mut OrderRequest> + 'a {
        let line_number = self.line_number;
        self.order_requests.iter_mut().filter(move |r| {
            r.line_number == line_number && r.fulfilled_by.eq_ignore_ascii_case(fulfiller)
        })
    }

    /// Mirror the least-advanced order request's status onto the line, so a
    /// split line only reads `shipped` once every share has shipped.
    pub fn sync_status_with_requests(&mut self) {
        if let Some(slowest) = self.order_requests.iter().min_by_key(|r| r.status.progress_rank()) {
            self.status = slowest.status.clone();
        }
    }

    /// Whether a sample under `tracking_code` still belongs to this line: the
    /// line or one of its order requests ships under it and has not arrived.
    pub fn awaits(&self, tracking_code: &str) -> bool {
        if tracking_code.is_empty() || self.status.has_arrived() {
            return false;
        }
        let line_code = self.iot_tracking_code == tracking_code;
        let mut shipped_under = self
            .order_requests
            .iter()
            .filter(|r| ships_under(r, tracking_code, line_code))
            .peekable();
        if shipped_under.peek().is_none() {
            return line_code;
        }
        shipped_under.any(|r| !r.status.has_arrived())
    }

    /// The shipment under `tracking_code` arrived: its order requests take
    /// `arrived`. The line becomes `received` once no share is still under
    /// way, otherwise it keeps the least-advanced request's status.
    pub fn settle_arrival(&mut self, tracking_code: &str, arrived: &Status) {
        let line_code = self.iot_tracking_code == tracking_code;
        for request in self
            .order_requests
            .iter_mut()
            .filter(|r| ships_under(r, tracking_code, line_code))
        {
            request.status = arrived.clone();
        }
        if self.order_requests.iter().all(|r| r.status.has_arrived()) {
            self.status = Status::Received;
        } else {
            self.sync_status_with_requests();
        }
    }
}

/// A request without its own code travels under the line's.
fn ships_under(request: &OrderRequest, tracking_code: &str, line_code: bool) -> bool {
    request.iot_tracking_code == tracking_code || (line_code && request.iot_tracking_code.is_empty())
}

/// The share of a line's quantity assigned to exactly one fulfiller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderRequest {
    pub material_id: String,
    pub line_number: u32,
    pub quantity: u32,
    pub status: Status,
    pub fulfilled_by: String,
    pub iot_tracking_code: String,
    #[serde(deserialize_with = "nullable")]
    pub progress_status: Vec<ItemStatus>,
    pub acknowledged_time_stamp: i64,
    pub time_shipped: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(fulfilled_by: &str, status: Status, tracking: &str) -> OrderRequest {
        OrderRequest {
            line_number: 1,
            fulfilled_by: fulfilled_by.to_string(),
            status,
            iot_tracking_code: tracking.to_string(),
            ..OrderRequest::default()
        }
    }

    fn split_line(distributor: Status, manufacturer: Status) -> LineItem {
        LineItem {
            line_number: 1,
            order_requests: vec![
                request("Distributor", distributor, "TD"),
                request("Manufacturer 1", manufacturer, "TM"),
            ],
            ..LineItem::default()
        }
    }

    #[test]
    fn split_line_reads_its_slowest_share() {
        let mut line = split_line(Status::Shipped, Status::Open);
        line.sync_status_with_requests();
        assert_eq!(line.status, Status::Open);

        line.order_requests[1].status = Status::Shipped;
        line.sync_status_with_requests();
        assert_eq!(line.status, Status::Shipped);
    }

    #[test]
    fn line_without_requests_keeps_its_status() {
        let mut line = LineItem { status: Status::Wip, ..LineItem::default() };
        line.sync_status_with_requests();
        assert_eq!(line.status, Status::Wip);
    }

    #[test]
    fn every_request_code_is_awaited_until_it_arrives() {
        let mut line = split_line(Status::Shipped, Status::Shipped);
        line.iot_tracking_code = "TM".to_string();
        line.status = Status::Shipped;
        assert!(line.awaits("TD"));
        assert!(line.awaits("TM"));
        assert!(!line.awaits("TX"));
        assert!(!line.awaits(""));

        line.settle_arrival("TD", &Status::Received);
        assert_eq!(line.order_requests[0].status, Status::Received);
        assert_eq!(line.status, Status::Shipped);
        assert!(!line.awaits("TD"));
        assert!(line.awaits("TM"));

        line.settle_arrival("TM", &Status::Delivered);
        assert_eq!(line.status, Status::Received);
        assert!(!line.awaits("TM"));
    }

    #[test]
    fn line_code_covers_requests_without_their_own() {
        let mut line = LineItem {
            iot_tracking_code: "T1".to_string(),
            status: Status::Shipped,
            order_requests: vec![request("Distributor", Status::Shipped, "")],
            ..LineItem::default()
        };
        line.settle_arrival("T1", &Status::Received);
        assert_eq!(line.order_requests[0].status, Status::Received);
        assert_eq!(line.status, Status::Received);
    }
}
