use materialtrace_auth::InvocationContext;
use materialtrace_core::{DomainResult, PoId};
use materialtrace_events::{EventBus, EventEnvelope};
use materialtrace_fulfillment::model::{CustomerLineItems, PricingDetails};
use materialtrace_fulfillment::workflow::{acknowledge, acknowledgment_event, propagate_acknowledgment};
use materialtrace_fulfillment::{FulfillmentEvent, ItemStatus, OrderEvent, Partition};

use super::{Applied, OrderLifecycle, manufacturer_partition};
use crate::ledger::KvStore;
use crate::saga::WriteSaga;

impl<S, B> OrderLifecycle<S, B>
where
    S: KvStore,
    B: EventBus<EventEnvelope<FulfillmentEvent>>,
{
    /// A manufacturer acknowledges the order requests assigned to it.
    ///
    /// The event is only published under a non-empty `event_key`.
    pub fn acknowledge_order_request(
        &self,
        ctx: &InvocationContext,
        po_id: &PoId,
        acknowledged_at: i64,
        status: &ItemStatus,
        event_key: &str,
    ) -> DomainResult<Applied<PricingDetails>> {
        let partition = manufacturer_partition(ctx)?;
        let mut pricing = self.store.require_pricing(partition, po_id)?;
        let ack = acknowledge(&mut pricing, status);

        let mut saga = WriteSaga::new(po_id.clone());
        saga.critical(partition.into(), || self.store.put_pricing(partition, &pricing))?;
        self.merge_progress(&mut saga, po_id, &ack.progress);

        if !event_key.is_empty() {
            self.publish(acknowledgment_event(
                event_key,
                po_id,
                ctx.organization_name(),
                acknowledged_at,
                &ack.lines,
            ))?;
        }
        Ok(Applied::new(pricing, saga))
    }

    /// The distributor records a manufacturer's acknowledgment on the
    /// customer lines named by the event.
    pub fn propagate_manufacturer_ack(
        &self,
        _ctx: &InvocationContext,
        event: &OrderEvent,
    ) -> DomainResult<Applied<CustomerLineItems>> {
        let po_id = PoId::new(event.id.as_str())?;
        let mut customer = self.store.require_customer_lines(&po_id)?;
        let updated = propagate_acknowledgment(&mut customer, event);

        let mut saga = WriteSaga::new(po_id.clone());
        if updated > 0 {
            saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&customer))?;
        }
        tracing::info!(%po_id, custodian = %event.custodian, updated, "manufacturer acknowledgment propagated");
        Ok(Applied::new(customer, saga))
    }
}
