use serde::Serialize;

use materialtrace_auth::{InvocationContext, Role};
use materialtrace_core::{DomainResult, PoId};
use materialtrace_events::{EventBus, EventEnvelope};
use materialtrace_fulfillment::model::{CustomerLineItems, LineItem, PricingDetails, ShippingPrivateDetails};
use materialtrace_fulfillment::workflow::{
    ShipmentNotice, dispatch, mirror_stock_shipment, on_logistics_shipment, on_manufacturer_shipment,
    ship_from_stock, ship_manufacturer_share, shipment_accepted_event,
};
use materialtrace_fulfillment::{FulfillmentEvent, ItemStatus, Partition, ShipmentOrigin, strategy_for};

use super::{Applied, OrderLifecycle, unexpected_organization};
use crate::ledger::KvStore;
use crate::saga::WriteSaga;

/// A fulfiller's ship-to-customer request as received.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipmentInput {
    pub po_id: PoId,
    pub lines: Vec<LineItem>,
    pub shipping_request_number: i64,
    pub status: ItemStatus,
    pub logistics_initial: Vec<ItemStatus>,
}

/// The origin record after a shipment, whichever partition it lives in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShippedFrom {
    Stock(CustomerLineItems),
    Manufacturer(PricingDetails),
}

impl<S, B> OrderLifecycle<S, B>
where
    S: KvStore,
    B: EventBus<EventEnvelope<FulfillmentEvent>>,
{
    /// Record a shipment and open the matching shipping requests.
    ///
    /// Writes go origin partition, logistics, then the mirrors (the
    /// customer-distributor pricing record for stock shipments, and shared
    /// progress).
    pub fn notify_ship_to_customer(
        &self,
        ctx: &InvocationContext,
        input: ShipmentInput,
    ) -> DomainResult<Applied<ShippedFrom>> {
        let role = ctx.caller_role();
        let origin = strategy_for(role)
            .shipment_origin()
            .ok_or_else(|| unexpected_organization(role))?;
        let po_id = &input.po_id;
        let notice = ShipmentNotice {
            lines: input.lines,
            shipping_request_number: input.shipping_request_number,
            status: input.status,
            logistics_initial: input.logistics_initial,
            requested_by: role,
        };
        let logistics = self.store.logistics(po_id)?;
        let mut saga = WriteSaga::new(po_id.clone());

        let (shipped_from, record) = match origin {
            ShipmentOrigin::Distributor => {
                let mut customer = self.store.require_customer_lines(po_id)?;
                let record = ship_from_stock(&mut customer, logistics, &notice);
                saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&customer))?;
                (ShippedFrom::Stock(customer), record)
            }
            ShipmentOrigin::Manufacturer(partition) => {
                let mut pricing = self.store.require_pricing(partition, po_id)?;
                let record = ship_manufacturer_share(&mut pricing, logistics, &notice);
                saga.critical(partition.into(), || self.store.put_pricing(partition, &pricing))?;
                (ShippedFrom::Manufacturer(pricing), record)
            }
        };

        if !record.shipped.is_empty() {
            saga.critical(Partition::Logistics.into(), || self.store.put_logistics(&record.logistics))?;
        }
        if origin == ShipmentOrigin::Distributor && !record.shipped.is_empty() {
            let partition = Partition::CustomerDistributor;
            saga.best_effort(partition.into(), || -> DomainResult<u64> {
                let mut pricing = self.store.require_pricing(partition, po_id)?;
                mirror_stock_shipment(&mut pricing, &record.shipped, &notice.status);
                self.store.put_pricing(partition, &pricing)
            });
        }
        self.merge_progress(&mut saga, po_id, &record.progress);

        tracing::info!(
            %po_id,
            requested_by = %role,
            shipping_request_number = notice.shipping_request_number,
            shipped = record.shipped.len(),
            "ship-to-customer recorded"
        );
        Ok(Applied::new(shipped_from, saga))
    }

    /// The carrier picks up shipping requests and takes them on the road.
    pub fn logistics_accept_and_ship(
        &self,
        ctx: &InvocationContext,
        po_id: &PoId,
        lines: &[LineItem],
    ) -> DomainResult<Applied<ShippingPrivateDetails>> {
        if ctx.caller_role() != Role::Logistics {
            return Err(unexpected_organization(ctx.caller_role()));
        }
        let mut logistics = self.store.require_logistics(po_id)?;
        let matched = dispatch(&mut logistics, lines);

        let mut saga = WriteSaga::new(po_id.clone());
        saga.critical(Partition::Logistics.into(), || self.store.put_logistics(&logistics))?;
        if let Some(event) = shipment_accepted_event(po_id, matched) {
            self.publish(event)?;
        }
        Ok(Applied::new(logistics, saga))
    }

    /// The distributor reflects a manufacturer's shipment on the customer
    /// partition.
    pub fn notify_distributor_on_mfr_shipment(
        &self,
        _ctx: &InvocationContext,
        po_id: &PoId,
        lines: &[LineItem],
        status: &ItemStatus,
    ) -> DomainResult<Applied<CustomerLineItems>> {
        let mut customer = self.store.require_customer_lines(po_id)?;
        let updated = on_manufacturer_shipment(&mut customer, lines, status);

        let mut saga = WriteSaga::new(po_id.clone());
        saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&customer))?;
        tracing::info!(%po_id, updated, "manufacturer shipment reflected on customer lines");
        Ok(Applied::new(customer, saga))
    }

    /// The carrier's pickup is recorded on the customer partition.
    pub fn notify_distributor_on_logistics_shipment(
        &self,
        _ctx: &InvocationContext,
        po_id: &PoId,
        lines: &[LineItem],
        time_shipped: i64,
        status: &ItemStatus,
    ) -> DomainResult<Applied<CustomerLineItems>> {
        let mut customer = self.store.require_customer_lines(po_id)?;
        let updated = on_logistics_shipment(&mut customer, lines, time_shipped, status);

        let mut saga = WriteSaga::new(po_id.clone());
        saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&customer))?;
        tracing::info!(%po_id, updated, "carrier pickup reflected on customer lines");
        Ok(Applied::new(customer, saga))
    }
}
