use std::collections::BTreeMap;

use serde::Serialize;

use materialtrace_auth::InvocationContext;
use materialtrace_core::{DomainResult, PoId};
use materialtrace_events::{EventBus, EventEnvelope};
use materialtrace_fulfillment::model::{GoodReceipt, LineItem};
use materialtrace_fulfillment::workflow::{advance_in_transit, verify_receipt};
use materialtrace_fulfillment::{FulfillmentEvent, ItemStatus, Partition};

use super::{Applied, OrderLifecycle};
use crate::ledger::KvStore;
use crate::saga::WriteSaga;

/// Good receipts for one shipping request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptVerification {
    pub po_id: PoId,
    pub shipping_request_number: i64,
    pub receipts: Vec<GoodReceipt>,
}

impl<S, B> OrderLifecycle<S, B>
where
    S: KvStore,
    B: EventBus<EventEnvelope<FulfillmentEvent>>,
{
    /// Bulk-advance shipped lines to `received` across orders.
    ///
    /// Orders without a customer partition are skipped. Returns the number of
    /// received lines per order.
    pub fn advance_in_transit(
        &self,
        _ctx: &InvocationContext,
        batch: &BTreeMap<PoId, Vec<LineItem>>,
        status: &ItemStatus,
    ) -> DomainResult<Applied<BTreeMap<PoId, usize>>> {
        let mut received = BTreeMap::new();
        let mut degraded = Vec::new();

        for (po_id, lines) in batch {
            let Some(mut customer) = self.store.customer_lines(po_id)? else {
                tracing::warn!(%po_id, "no customer lines, order skipped");
                continue;
            };
            let mut logistics = self.store.logistics(po_id)?;
            let outcome = advance_in_transit(&mut customer, logistics.as_mut(), lines, status);

            let mut saga = WriteSaga::new(po_id.clone());
            if outcome.received > 0 {
                saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&customer))?;
            }
            if let Some(logistics) = logistics.filter(|_| outcome.logistics > 0) {
                saga.best_effort(Partition::Logistics.into(), || self.store.put_logistics(&logistics));
            }
            degraded.extend(saga.finish());
            received.insert(po_id.clone(), outcome.received);
        }

        Ok(Applied { value: received, degraded })
    }

    /// The customer verifies the lines of one shipping request.
    pub fn verify_receipt(
        &self,
        _ctx: &InvocationContext,
        po_id: &PoId,
        shipping_request_number: i64,
    ) -> DomainResult<Applied<ReceiptVerification>> {
        let mut customer = self.store.require_customer_lines(po_id)?;
        let logistics = self.store.require_logistics(po_id)?;
        let receipts = verify_receipt(&mut customer, &logistics, shipping_request_number);

        let mut saga = WriteSaga::new(po_id.clone());
        if !receipts.is_empty() {
            saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&customer))?;
        }
        let verification = ReceiptVerification {
            po_id: po_id.clone(),
            shipping_request_number,
            receipts,
        };
        Ok(Applied::new(verification, saga))
    }
}
