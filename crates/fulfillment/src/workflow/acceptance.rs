use std::collections::BTreeMap;

use materialtrace_auth::Role;
use materialtrace_core::{DomainError, DomainResult};

use super::by_line_number;
use crate::events::{OrderEvent, PO_ACCEPTED};
use crate::model::{
    CustomerLineItems, LineItem, LineItemPricing, OrderRequest, PricingDetails, PurchaseOrder,
};
use crate::partition::Partition;
use crate::pricing::{DiscountTable, INVENTORY, LineSplit, SplitShare, plan_split};
use crate::progress::{LineProgress, ProgressMode, ProgressUpdate};
use crate::state::{ItemStatus, ProgressLog, Status};

/// The distributor's decision on an open order.
#[derive(Debug, Clone)]
pub struct AcceptanceRequest {
    /// Per-line assignment decisions (`assignedTo`, `assignedQty`,
    /// `deliveryDate`), matched to stored lines by line number.
    pub update: PurchaseOrder,
    pub accepted: bool,
    pub timestamp: i64,
    pub rejection_reason: String,
    pub discounts: DiscountTable,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcceptanceOutcome {
    /// Only the primary record changes.
    Rejected { primary: PurchaseOrder },
    Accepted(AcceptedOrder),
}

/// Records produced by accepting an order.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedOrder {
    /// Primary record, accepted, without line detail. Written last.
    pub primary: PurchaseOrder,
    pub customer: CustomerLineItems,
    /// Non-empty pricing partitions, in fulfiller order.
    pub pricing: Vec<(Partition, PricingDetails)>,
    pub progress: ProgressUpdate,
    pub view: PurchaseOrder,
}

/// Accept or reject an open order.
///
/// Every line is validated before any record is built, so a missing discount
/// or a bad assignment anywhere fails the whole acceptance.
pub fn accept_or_reject(
    mut po: PurchaseOrder,
    customer: Option<CustomerLineItems>,
    request: &AcceptanceRequest,
) -> DomainResult<AcceptanceOutcome> {
    if po.po_status != Status::Open {
        return Err(DomainError::conflict(format!(
            "purchase order {} is {}, only open orders can be accepted or rejected",
            po.po_id, po.po_status
        )));
    }

    if !request.accepted {
        if request.rejection_reason.trim().is_empty() {
            return Err(DomainError::validation("Rejection reason is required."));
        }
        po.po_status = Status::Rejected;
        po.comment = request.rejection_reason.clone();
        po.line_items.clear();
        return Ok(AcceptanceOutcome::Rejected { primary: po });
    }

    let mut customer = customer.ok_or_else(|| {
        DomainError::not_found(format!("private lineItems data not found for {}", po.po_id))
    })?;

    let decisions = by_line_number(&request.update.line_items);
    let missing = LineItem::default();
    let splits = customer
        .line_items
        .iter()
        .map(|line| {
            let decision = decisions.get(&line.line_number).copied().unwrap_or(&missing);
            plan_split(line, decision, &request.discounts).map(|split| (split, decision.delivery_date.clone()))
        })
        .collect::<DomainResult<Vec<_>>>()?;

    let status = &request.status;
    let utility_initial = ItemStatus::new(Role::Customer.organization_name(), Status::Open, po.created_time_stamp);
    let mut pricing: BTreeMap<Partition, PricingDetails> = BTreeMap::new();
    let mut progress = ProgressUpdate::new(ProgressMode::DistributorAccepts, status.clone());

    for (line, (split, delivery_date)) in customer.line_items.iter_mut().zip(splits) {
        if !delivery_date.is_empty() {
            line.delivery_date = delivery_date;
        }

        let requests: Vec<OrderRequest> = split
            .shares
            .iter()
            .map(|share| {
                let priced = price_share(line, &po, share, &utility_initial, status);
                let request = order_request(line, share, &priced, status);
                if let Some(partition) = Partition::pricing_for(share.fulfiller) {
                    pricing
                        .entry(partition)
                        .or_insert_with(|| PricingDetails::new(partition, po.po_id.clone()))
                        .line_items
                        .push(priced);
                }
                request
            })
            .collect();
        line.order_requests = requests;

        apply_split_to_line(line, &split, status);
        progress.insert(
            line.line_number,
            LineProgress {
                assigned_to: split.assignment.label().to_string(),
                ..LineProgress::default()
            },
        );
    }

    po.po_status = Status::Accepted;
    po.acceptance_time_stamp = request.timestamp;
    po.line_items.clear();
    let mut view = po.clone();
    view.line_items = customer.line_items.clone();
    customer.doc_type = Partition::CustomerLineItems.collection_name().to_string();

    tracing::info!(
        po_id = %po.po_id,
        lines = view.line_items.len(),
        partitions = pricing.len(),
        "order accepted"
    );

    Ok(AcceptanceOutcome::Accepted(AcceptedOrder {
        primary: po,
        customer,
        pricing: pricing.into_iter().collect(),
        progress,
        view,
    }))
}

fn price_share(
    line: &LineItem,
    po: &PurchaseOrder,
    share: &SplitShare,
    utility_initial: &ItemStatus,
    status: &ItemStatus,
) -> LineItemPricing {
    let from_stock = share.fulfiller == Role::Distributor;
    let (item_status, progress_status, assigned_to, manufacturer) = if from_stock {
        (
            Status::Wip,
            vec![utility_initial.clone(), status.with_status(Status::Wip)],
            INVENTORY.to_string(),
            String::new(),
        )
    } else {
        let name = share.fulfiller.organization_name().to_string();
        (Status::Open, vec![status.clone()], name.clone(), name)
    };

    LineItemPricing {
        po_id: po.po_id.clone(),
        po_number: po.po_number,
        line_number: line.line_number,
        material_id: line.material_id.clone(),
        material_group: line.material_group.clone(),
        item_key: line.item_key.clone(),
        description: line.description.clone(),
        manufacturer,
        quantity: share.quantity,
        unit_of_measure: line.unit_of_measure.clone(),
        unit_price: share.unit_price,
        currency: line.currency.clone(),
        subtotal: share.subtotal(),
        ship_to_location: line.ship_to_location.clone(),
        status: item_status,
        assigned_to,
        project_id: line.project_id.clone(),
        delivery_date: line.delivery_date.clone(),
        acknowledged_time_stamp: status.time_stamp,
        progress_status,
        ..LineItemPricing::default()
    }
}

fn order_request(line: &LineItem, share: &SplitShare, priced: &LineItemPricing, status: &ItemStatus) -> OrderRequest {
    let from_stock = share.fulfiller == Role::Distributor;
    OrderRequest {
        material_id: line.material_id.clone(),
        line_number: line.line_number,
        quantity: share.quantity,
        status: if from_stock { Status::Wip } else { Status::Open },
        fulfilled_by: share.fulfiller.organization_name().to_string(),
        progress_status: if from_stock {
            priced.progress_status.clone()
        } else {
            Vec::new()
        },
        acknowledged_time_stamp: status.time_stamp,
        ..OrderRequest::default()
    }
}

fn apply_split_to_line(line: &mut LineItem, split: &LineSplit, status: &ItemStatus) {
    line.acknowledged_time_stamp = status.time_stamp;
    line.record(status);
    line.assigned_qty = split.total_quantity();
    line.sync_status_with_requests();

    line.assigned_to = match (line.order_requests.as_slice(), split.assignment) {
        ([single], _) => single.fulfilled_by.clone(),
        (_, assignment) => assignment.label().to_string(),
    };
    line.mfr_unit_price = split
        .shares
        .iter()
        .find(|s| s.fulfiller.is_manufacturer())
        .map_or(0.0, |s| s.unit_price);
}

pub fn accepted_event(view: &PurchaseOrder) -> OrderEvent {
    OrderEvent {
        event_type: PO_ACCEPTED.to_string(),
        description: Status::Accepted.as_str().to_string(),
        id: view.po_id.clone(),
        po_number: view.po_number,
        status: view.po_status.clone(),
        line_items: view.line_items.clone(),
        time_stamp: view.acceptance_time_stamp,
        ..OrderEvent::default()
    }
}
