use materialtrace_auth::{InvocationContext, Role};
use materialtrace_core::{DomainError, DomainResult, PoId};
use materialtrace_events::{EventBus, EventEnvelope};
use materialtrace_fulfillment::model::PurchaseOrder;
use materialtrace_fulfillment::workflow::{
    self, AcceptanceOutcome, AcceptanceRequest, DEFAULT_SEED_COMPANY, accepted_event, created_event,
};
use materialtrace_fulfillment::{
    DiscountTable, FulfillmentEvent, ItemStatus, ManufacturerDiscount, Partition, Status,
};

use super::{Applied, OrderLifecycle};
use crate::ledger::{KvStore, Namespace};
use crate::saga::WriteSaga;

/// The distributor's accept-or-reject decision as received.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptanceInput {
    /// The order with per-line assignment decisions.
    pub order: PurchaseOrder,
    pub accepted: bool,
    pub timestamp: i64,
    pub rejection_reason: String,
    pub discounts: Vec<ManufacturerDiscount>,
    pub status: ItemStatus,
}

impl<S, B> OrderLifecycle<S, B>
where
    S: KvStore,
    B: EventBus<EventEnvelope<FulfillmentEvent>>,
{
    /// Create an order: customer partition, then primary record, then the
    /// shared progress seed.
    pub fn create_order(
        &self,
        ctx: &InvocationContext,
        order: PurchaseOrder,
        initial: &ItemStatus,
    ) -> DomainResult<Applied<PurchaseOrder>> {
        let po_id = PoId::new(order.po_id.as_str())?;
        if self.store.purchase_order(&po_id)?.is_some() {
            return Err(DomainError::conflict(format!("purchase order {po_id} already exists")));
        }

        let created = workflow::create_order(order, initial, &self.config.order_defaults())?;
        let mut saga = WriteSaga::new(po_id.clone());
        saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&created.customer))?;
        saga.critical(Namespace::World, || self.store.put_purchase_order(&created.primary))?;
        saga.best_effort(Partition::GeneralProgress.into(), || self.store.put_progress(&created.progress));

        self.publish(created_event(&created.view))?;
        tracing::info!(
            %po_id,
            po_number = created.view.po_number,
            lines = created.view.line_items.len(),
            caller = ctx.caller_id(),
            "purchase order created"
        );
        Ok(Applied::new(created.view, saga))
    }

    /// Accept (splitting lines across pricing partitions) or reject an open
    /// order.
    ///
    /// Everything is validated before the first write. Writes go pricing
    /// partitions, customer partition, shared progress, and the primary
    /// record last: an order still open after a failure can be accepted
    /// again.
    pub fn accept_or_reject(
        &self,
        ctx: &InvocationContext,
        input: AcceptanceInput,
    ) -> DomainResult<Applied<PurchaseOrder>> {
        let discounts = DiscountTable::new(input.discounts, self.config.min_manufacturer_discounts)?;
        let po_id = PoId::new(input.order.po_id.as_str())?;
        let po = self.store.require_purchase_order(&po_id)?;
        let customer = self.store.customer_lines(&po_id)?;

        let request = AcceptanceRequest {
            update: input.order,
            accepted: input.accepted,
            timestamp: input.timestamp,
            rejection_reason: input.rejection_reason,
            discounts,
            status: input.status,
        };
        let mut saga = WriteSaga::new(po_id.clone());

        match workflow::accept_or_reject(po, customer, &request)? {
            AcceptanceOutcome::Rejected { primary } => {
                saga.critical(Namespace::World, || self.store.put_purchase_order(&primary))?;
                tracing::info!(%po_id, reason = %primary.comment, caller = ctx.caller_id(), "purchase order rejected");
                Ok(Applied::new(primary, saga))
            }
            AcceptanceOutcome::Accepted(accepted) => {
                for (partition, details) in &accepted.pricing {
                    saga.critical((*partition).into(), || self.store.put_pricing(*partition, details))?;
                }
                saga.critical(Partition::CustomerLineItems.into(), || self.store.put_customer_lines(&accepted.customer))?;
                self.merge_progress(&mut saga, &po_id, &accepted.progress);
                saga.critical(Namespace::World, || self.store.put_purchase_order(&accepted.primary))?;

                self.publish(accepted_event(&accepted.view))?;
                tracing::info!(
                    %po_id,
                    partitions = accepted.pricing.len(),
                    caller = ctx.caller_id(),
                    "purchase order accepted"
                );
                Ok(Applied::new(accepted.view, saga))
            }
        }
    }

    /// Seed the two sample orders. Orders that already exist are left alone.
    pub fn init_ledger(
        &self,
        ctx: &InvocationContext,
        created_time_stamp: i64,
        company: Option<&str>,
    ) -> DomainResult<Applied<Vec<PurchaseOrder>>> {
        let company = company.filter(|c| !c.trim().is_empty()).unwrap_or(DEFAULT_SEED_COMPANY);
        let initial = ItemStatus::new(Role::Customer.organization_name(), Status::Open, created_time_stamp);
        let mut created = Vec::new();
        let mut degraded = Vec::new();

        for order in workflow::seed_orders(created_time_stamp, company)? {
            if self.store.purchase_order(&order.po_id)?.is_some() {
                tracing::info!(po_id = %order.po_id, "sample order already present, skipped");
                continue;
            }
            let applied = self.create_order(ctx, order, &initial)?;
            degraded.extend(applied.degraded);
            created.push(applied.value);
        }
        Ok(Applied { value: created, degraded })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::FulfillmentConfig;
    use crate::ledger::InMemoryKvStore;
    use materialtrace_events::InMemoryEventBus;
    use materialtrace_fulfillment::model::LineItem;

    type Lifecycle = OrderLifecycle<Arc<InMemoryKvStore>, Arc<InMemoryEventBus<EventEnvelope<FulfillmentEvent>>>>;

    fn lifecycle() -> Lifecycle {
        OrderLifecycle::new(Arc::new(InMemoryKvStore::new()), Arc::new(InMemoryEventBus::new()), FulfillmentConfig::default())
    }

    fn customer() -> InvocationContext {
        InvocationContext::new(Role::Customer, "customer-user")
    }

    fn distributor() -> InvocationContext {
        InvocationContext::new(Role::Distributor, "distributor-user")
    }

    fn order(po_id: &str) -> PurchaseOrder {
        PurchaseOrder {
            po_id: PoId::new(po_id).unwrap(),
            po_number: 77,
            line_items: vec![LineItem { line_number: 1, material_id: "m1".to_string(), quantity: 2, unit_price: 10.0, ..LineItem::default() }],
            ..PurchaseOrder::default()
        }
    }

    fn discounts() -> Vec<ManufacturerDiscount> {
        ["Manufacturer 1", "Manufacturer 2"]
            .into_iter()
            .map(|name| ManufacturerDiscount { name: name.to_string(), discount: 10 })
            .collect()
    }

    #[test]
    fn duplicate_order_is_a_conflict() {
        let lifecycle = lifecycle();
        let initial = ItemStatus::new("Utility", Status::Open, 1);
        lifecycle.create_order(&customer(), order("po-dup"), &initial).unwrap();

        match lifecycle.create_order(&customer(), order("po-dup"), &initial).unwrap_err() {
            DomainError::Conflict(msg) => assert!(msg.contains("po-dup")),
            other => panic!("Expected Conflict error, got {other:?}"),
        }
    }

    #[test]
    fn too_few_discounts_fail_before_any_read() {
        let lifecycle = lifecycle();
        let input = AcceptanceInput {
            order: order("po-unknown"),
            accepted: true,
            timestamp: 5,
            rejection_reason: String::new(),
            discounts: discounts().into_iter().take(1).collect(),
            status: ItemStatus::new("Distributor", Status::Accepted, 5),
        };
        match lifecycle.accept_or_reject(&distributor(), input).unwrap_err() {
            DomainError::Validation(msg) => assert_eq!(msg, "At least 2 manufacturer discount objects expected."),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejection_only_rewrites_the_primary_record() {
        let lifecycle = lifecycle();
        lifecycle
            .create_order(&customer(), order("po-rej"), &ItemStatus::new("Utility", Status::Open, 1))
            .unwrap();
        let input = AcceptanceInput {
            order: order("po-rej"),
            accepted: false,
            timestamp: 5,
            rejection_reason: "price too high".to_string(),
            discounts: discounts(),
            status: ItemStatus::new("Distributor", Status::Rejected, 5),
        };
        let applied = lifecycle.accept_or_reject(&distributor(), input).unwrap();
        assert_eq!(applied.value.po_status, Status::Rejected);

        let po_id = PoId::new("po-rej").unwrap();
        let stored = lifecycle.store().require_purchase_order(&po_id).unwrap();
        assert_eq!(stored.comment, "price too high");
        assert!(lifecycle.store().pricing(Partition::CustomerDistributor, &po_id).unwrap().is_none());
    }

    #[test]
    fn init_ledger_is_idempotent() {
        let lifecycle = lifecycle();
        let first = lifecycle.init_ledger(&customer(), 1_550_000_000, None).unwrap();
        assert_eq!(first.value.len(), 2);
        assert_eq!(first.value[0].owner.name, DEFAULT_SEED_COMPANY);

        let second = lifecycle.init_ledger(&customer(), 1_550_000_000, Some("Other Energy")).unwrap();
        assert!(second.value.is_empty());
        assert_eq!(lifecycle.store().purchase_orders().unwrap().len(), 2);
    }
}
