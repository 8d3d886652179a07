//! Read-only queries over the partitions.
//!
//! Every merged view is composed from the records the caller's role may
//! read; nothing here writes.

use serde_json::{Map, Value as JsonValue};

use materialtrace_auth::InvocationContext;
use materialtrace_core::{DomainError, DomainResult, PoId};
use materialtrace_fulfillment::model::{
    FieldOperatorReport, KeyedRecord, MaterialCertificate, PricingResults, PurchaseOrder, SharedLineDetail,
    ShippingRequestsResults,
};
use materialtrace_fulfillment::view::{compose, field_operator_report, pricing_results, shipping_results};
use materialtrace_fulfillment::{Partition, strategy_for};

use crate::ledger::{KvStore, Versioned};
use crate::lifecycle::OrderLifecycle;
use crate::partition_store::PartitionStore;

/// Top-level field equality over a record's JSON form.
///
/// Accepts either `{"selector": {...}}` or the bare field map. A field value
/// is matched literally, or through `{"$eq": value}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selector {
    fields: Map<String, JsonValue>,
}

impl Selector {
    pub fn parse(text: &str) -> DomainResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }
        let value: JsonValue = serde_json::from_str(text)
            .map_err(|e| DomainError::validation(format!("Unable to parse query selector - {e}")))?;
        let JsonValue::Object(mut root) = value else {
            return Err(DomainError::validation("Query selector must be a JSON object"));
        };
        let fields = match root.remove("selector") {
            Some(JsonValue::Object(inner)) => inner,
            Some(_) => return Err(DomainError::validation("Query selector must be a JSON object")),
            None => root,
        };

        let mut normalized = Map::new();
        for (field, wanted) in fields {
            let wanted = match wanted {
                JsonValue::Object(mut op) if op.keys().any(|k| k.starts_with('$')) => match op.remove("$eq") {
                    Some(value) if op.is_empty() => value,
                    _ => {
                        return Err(DomainError::validation(format!(
                            "Unsupported selector operator on field '{field}'; only equality is supported"
                        )));
                    }
                },
                other => other,
            };
            normalized.insert(field, wanted);
        }
        Ok(Self { fields: normalized })
    }

    pub fn matches(&self, record: &JsonValue) -> bool {
        self.fields
            .iter()
            .all(|(field, wanted)| record.get(field) == Some(wanted))
    }
}

/// Query service bound to a partition store.
#[derive(Debug)]
pub struct FulfillmentQueries<'a, S> {
    store: &'a PartitionStore<S>,
}

impl<S, B> OrderLifecycle<S, B> {
    pub fn queries(&self) -> FulfillmentQueries<'_, S> {
        FulfillmentQueries { store: self.store() }
    }
}

impl<'a, S: KvStore> FulfillmentQueries<'a, S> {
    pub fn new(store: &'a PartitionStore<S>) -> Self {
        Self { store }
    }

    /// The caller's pricing partition joined with the primary records.
    pub fn open_order_requests(&self, ctx: &InvocationContext) -> DomainResult<Vec<PricingResults>> {
        let role = ctx.caller_role();
        let partition = strategy_for(role)
            .pricing_partition()
            .ok_or_else(|| DomainError::unauthorized(format!("{} has no order requests", role.organization_name())))?;

        let mut results = Vec::new();
        for keyed in self.store.pricing_records(partition)? {
            let Some(po) = self.store.purchase_order(&keyed.record.po_id)? else {
                tracing::debug!(po_id = %keyed.record.po_id, %partition, "pricing record without primary record");
                continue;
            };
            results.push(pricing_results(&po, keyed.record));
        }
        Ok(results)
    }

    /// Shipping requests joined with the primary records.
    pub fn shipping_requests(&self) -> DomainResult<Vec<ShippingRequestsResults>> {
        let mut results = Vec::new();
        for keyed in self.store.logistics_records()? {
            if let Some(po) = self.store.purchase_order(&keyed.record.po_id)? {
                results.push(shipping_results(&po, keyed.record));
            }
        }
        Ok(results)
    }

    /// One report per order with at least one shipping line past `open`.
    pub fn field_operator_list(&self, ctx: &InvocationContext) -> DomainResult<Vec<FieldOperatorReport>> {
        let mut reports = Vec::new();
        for shipping in self.shipping_requests()? {
            let po = self.store.purchase_order(&shipping.po_id)?;
            let parts = self.store.partition_set(ctx.caller_role(), &shipping.po_id)?;
            let Some(report) = field_operator_report(&shipping, po, &parts) else {
                continue;
            };
            if !report.shipped_items_map.is_empty() {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Merged view of every order.
    pub fn all_orders(&self, ctx: &InvocationContext) -> DomainResult<Vec<KeyedRecord<PurchaseOrder>>> {
        self.merged(ctx, |_| true)
    }

    /// Merged views of the primary records matching `selector`. Orders
    /// without a purchase order number are left out.
    pub fn query_po(&self, ctx: &InvocationContext, selector: &Selector) -> DomainResult<Vec<KeyedRecord<PurchaseOrder>>> {
        let views = self.merged(ctx, |po| {
            po.po_number != 0 && serde_json::to_value(po).is_ok_and(|json| selector.matches(&json))
        })?;
        tracing::debug!(matched = views.len(), "purchase order query");
        Ok(views)
    }

    fn merged(
        &self,
        ctx: &InvocationContext,
        keep: impl Fn(&PurchaseOrder) -> bool,
    ) -> DomainResult<Vec<KeyedRecord<PurchaseOrder>>> {
        let mut views = Vec::new();
        for keyed in self.store.purchase_orders()? {
            if !keep(&keyed.record) {
                continue;
            }
            let parts = self.store.partition_set(ctx.caller_role(), &keyed.record.po_id)?;
            views.push(KeyedRecord::new(keyed.key, compose(keyed.record, &parts)));
        }
        Ok(views)
    }

    /// Shared progress of one line. An empty record when none matches.
    pub fn line_item_progress_status(&self, po_number: u32, line_number: u32) -> DomainResult<SharedLineDetail> {
        for keyed in self.store.progress_records()? {
            if let Some(line) = keyed.record.line(po_number, line_number) {
                return Ok(line.clone());
            }
        }
        Ok(SharedLineDetail::default())
    }

    /// Every committed version of the primary record, oldest first.
    pub fn history(&self, po_id: &PoId) -> DomainResult<Vec<Versioned>> {
        Ok(self.store.purchase_order_history(po_id)?)
    }

    /// The certificate partition the caller lists.
    pub fn mtr_list(&self, ctx: &InvocationContext) -> DomainResult<Vec<KeyedRecord<MaterialCertificate>>> {
        let role = ctx.caller_role();
        let partition = strategy_for(role)
            .certificate_listing()
            .ok_or_else(|| DomainError::unauthorized(format!("{} lists no certificates", role.organization_name())))?;
        self.store.certificates(partition)
    }

    /// Raw listing of the customer partition or a certificate partition.
    pub fn private_collection(
        &self,
        ctx: &InvocationContext,
        collection: &str,
        selector: &Selector,
    ) -> DomainResult<Vec<KeyedRecord<JsonValue>>> {
        let partition = Partition::from_collection_name(collection)
            .filter(|p| *p == Partition::CustomerLineItems || p.is_certificate_store())
            .ok_or_else(|| DomainError::validation(format!("Unknown private collection - {collection}")))?;
        if !partition.is_visible_to(ctx.caller_role()) {
            return Err(DomainError::unauthorized(format!(
                "{} cannot read {partition}",
                ctx.caller_role().organization_name()
            )));
        }
        Ok(self
            .store
            .raw_records(partition)?
            .into_iter()
            .filter(|keyed| selector.matches(&keyed.record))
            .collect())
    }
}
