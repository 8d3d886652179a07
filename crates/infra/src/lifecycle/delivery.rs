use serde::Serialize;

use materialtrace_auth::InvocationContext;
use materialtrace_core::{DomainResult, PoId};
use materialtrace_events::{EventBus, EventEnvelope};
use materialtrace_fulfillment::model::{CustomerLineItems, IotProperty};
use materialtrace_fulfillment::workflow::{
    TelemetryOutcome, delivery_event, mark_logistics_delivered, mirror_distributor_telemetry,
    notify_item_delivered, record_distributor_telemetry, record_manufacturer_telemetry,
};
use materialtrace_fulfillment::{DeliveryEvent, FulfillmentEvent, ItemStatus, Partition, ShipmentOrigin, strategy_for};

use super::{Applied, OrderLifecycle, unexpected_organization};
use crate::ledger::KvStore;
use crate::saga::WriteSaga;

/// What an IoT sample did to the order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryReceipt {
    pub sample: IotProperty,
    /// Line numbers that took the sample.
    pub touched: Vec<u32>,
    /// Line numbers that arrived with it.
    pub arrived: Vec<u32>,
    pub delivery: Option<DeliveryEvent>,
}

impl<S, B> OrderLifecycle<S, B>
where
    S: KvStore,
    B: EventBus<EventEnvelope<FulfillmentEvent>>,
{
    /// Feed one IoT sample into the caller's shipped lines.
    ///
    /// Manufacturers record it on their pricing partition, the distributor on
    /// the customer partition and its fulfillment mirror. On geofence arrival
    /// both paths update shared progress and the carrier's requests, then
    /// publish a delivery event under `event_key`.
    pub fn incoming_iot(
        &self,
        ctx: &InvocationContext,
        po_id: &PoId,
        sample: IotProperty,
        status: &ItemStatus,
        event_key: &str,
    ) -> DomainResult<Applied<TelemetryReceipt>> {
        let role = ctx.caller_role();
        let origin = strategy_for(role)
            .shipment_origin()
            .ok_or_else(|| unexpected_organization(role))?;
        let mut saga = WriteSaga::new(po_id.clone());

        let outcome = match origin {
            ShipmentOrigin::Manufacturer(partition) => {
                let mut pricing = self.store.require_pricing(partition, po_id)?;
                let outcome = record_manufacturer_telemetry(&mut pricing, &sample, status, &self.geofence);
                if outcome.touched() > 0 {
                    saga.critical(partition.into(), || self.store.put_pricing(partition, &pricing))?;
                }
                outcome
            }
            ShipmentOrigin::Distributor => {
                let mut customer = self.store.require_customer_lines(po_id)?;
                let outcome = record_distributor_telemetry(&mut customer, &sample, status, &self.geofence);
                if outcome.touched() > 0 {
                    saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&customer))?;
                    let mirror = Partition::CustomerDistributor;
                    saga.best_effort(mirror.into(), || -> DomainResult<u64> {
                        let mut pricing = self.store.require_pricing(mirror, po_id)?;
                        mirror_distributor_telemetry(&mut pricing, &outcome, status);
                        self.store.put_pricing(mirror, &pricing)
                    });
                }
                outcome
            }
        };

        let delivery = if outcome.has_arrivals() {
            self.record_arrival(&mut saga, po_id, &outcome, status, event_key)?
        } else {
            None
        };

        tracing::info!(
            %po_id,
            role = %role,
            tracking_code = %sample.tracking_code,
            touched = outcome.touched(),
            arrived = outcome.arrived.len(),
            "iot sample ingested"
        );
        let receipt = TelemetryReceipt {
            sample,
            touched: outcome.samples.keys().copied().collect(),
            arrived: outcome.arrived,
            delivery,
        };
        Ok(Applied::new(receipt, saga))
    }

    fn record_arrival(
        &self,
        saga: &mut WriteSaga,
        po_id: &PoId,
        outcome: &TelemetryOutcome,
        status: &ItemStatus,
        event_key: &str,
    ) -> DomainResult<Option<DeliveryEvent>> {
        self.merge_progress(saga, po_id, &outcome.progress);
        let shipping_request_number = saga
            .best_effort(Partition::Logistics.into(), || -> DomainResult<Option<i64>> {
                let Some(mut logistics) = self.store.logistics(po_id)? else {
                    return Ok(None);
                };
                let first = mark_logistics_delivered(&mut logistics, &outcome.tracking_code, status);
                if first.is_some() {
                    self.store.put_logistics(&logistics)?;
                }
                Ok(first)
            })
            .flatten();

        let event = delivery_event(event_key, po_id, outcome, status, shipping_request_number);
        if let Some(event) = &event {
            self.publish(event.clone())?;
        }
        Ok(event)
    }

    /// The distributor learns that a manufacturer's shipment arrived.
    /// `received_at` becomes the line's receipt time unless one is recorded.
    pub fn notify_item_delivered(
        &self,
        _ctx: &InvocationContext,
        event: DeliveryEvent,
        received_at: i64,
        status: &ItemStatus,
    ) -> DomainResult<Applied<DeliveryEvent>> {
        let po_id = event.po_id.clone();
        let mut customer: CustomerLineItems = self.store.require_customer_lines(&po_id)?;
        let updated = notify_item_delivered(&mut customer, &event, received_at, status);

        let mut saga = WriteSaga::new(po_id.clone());
        if updated > 0 {
            saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&customer))?;
        }
        tracing::info!(%po_id, received_at, updated, "item delivery recorded");
        Ok(Applied::new(event, saga))
    }
}
