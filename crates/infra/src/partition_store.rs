//! Typed access to the role-scoped partitions of an order.
//!
//! Wraps a [`KvStore`]: primary records live in the world state keyed by
//! PoId, partition records in their private namespace keyed by PoId, and
//! certificates keyed by tracking id.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use materialtrace_auth::Role;
use materialtrace_core::{DomainError, DomainResult, PoId};
use materialtrace_fulfillment::model::{
    CustomerLineItems, KeyedRecord, MaterialCertificate, PricingDetails, PurchaseOrder,
    SharedProgressReport, ShippingPrivateDetails,
};
use materialtrace_fulfillment::{Partition, PartitionSet};

use crate::ledger::{KvStore, Namespace, StoreError, Versioned};

#[derive(Debug, Clone)]
pub struct PartitionStore<S> {
    store: S,
}

impl<S> PartitionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

impl<S: KvStore> PartitionStore<S> {
    fn read<T: DeserializeOwned>(&self, namespace: Namespace, key: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(namespace, key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, namespace: Namespace, key: &str, record: &T) -> Result<u64, StoreError> {
        let value = serde_json::to_value(record)?;
        let version = self.store.put(namespace, key, value)?;
        tracing::debug!(%namespace, key, version, "record written");
        Ok(version)
    }

    fn list<T: DeserializeOwned>(&self, namespace: Namespace) -> Result<Vec<KeyedRecord<T>>, StoreError> {
        self.store
            .scan(namespace)?
            .into_iter()
            .map(|(key, value)| Ok(KeyedRecord::new(key, serde_json::from_value(value)?)))
            .collect()
    }

    // primary records

    pub fn purchase_order(&self, po_id: &PoId) -> Result<Option<PurchaseOrder>, StoreError> {
        self.read(Namespace::World, po_id.as_str())
    }

    /// Like [`purchase_order`](Self::purchase_order), but a missing order is
    /// `NotFound`.
    pub fn require_purchase_order(&self, po_id: &PoId) -> DomainResult<PurchaseOrder> {
        self.purchase_order(po_id)?
            .ok_or_else(|| DomainError::not_found(format!("purchase order {po_id}")))
    }

    pub fn put_purchase_order(&self, po: &PurchaseOrder) -> Result<u64, StoreError> {
        self.write(Namespace::World, po.po_id.as_str(), po)
    }

    pub fn purchase_orders(&self) -> Result<Vec<KeyedRecord<PurchaseOrder>>, StoreError> {
        self.list(Namespace::World)
    }

    /// Every committed version of the primary record, oldest first.
    pub fn purchase_order_history(&self, po_id: &PoId) -> Result<Vec<Versioned>, StoreError> {
        self.store.history(Namespace::World, po_id.as_str())
    }

    // customer partition

    pub fn customer_lines(&self, po_id: &PoId) -> Result<Option<CustomerLineItems>, StoreError> {
        self.read(Partition::CustomerLineItems.into(), po_id.as_str())
    }

    pub fn require_customer_lines(&self, po_id: &PoId) -> DomainResult<CustomerLineItems> {
        self.customer_lines(po_id)?.ok_or_else(|| missing(Partition::CustomerLineItems, po_id))
    }

    pub fn put_customer_lines(&self, record: &CustomerLineItems) -> Result<u64, StoreError> {
        self.write(Partition::CustomerLineItems.into(), record.po_id.as_str(), record)
    }

    // pricing partitions

    pub fn pricing(&self, partition: Partition, po_id: &PoId) -> DomainResult<Option<PricingDetails>> {
        ensure_pricing(partition)?;
        Ok(self.read(partition.into(), po_id.as_str())?)
    }

    pub fn require_pricing(&self, partition: Partition, po_id: &PoId) -> DomainResult<PricingDetails> {
        self.pricing(partition, po_id)?.ok_or_else(|| missing(partition, po_id))
    }

    pub fn put_pricing(&self, partition: Partition, record: &PricingDetails) -> DomainResult<u64> {
        ensure_pricing(partition)?;
        Ok(self.write(partition.into(), record.po_id.as_str(), record)?)
    }

    pub fn pricing_records(&self, partition: Partition) -> DomainResult<Vec<KeyedRecord<PricingDetails>>> {
        ensure_pricing(partition)?;
        Ok(self.list(partition.into())?)
    }

    // logistics

    pub fn logistics(&self, po_id: &PoId) -> Result<Option<ShippingPrivateDetails>, StoreError> {
        self.read(Partition::Logistics.into(), po_id.as_str())
    }

    pub fn require_logistics(&self, po_id: &PoId) -> DomainResult<ShippingPrivateDetails> {
        self.logistics(po_id)?.ok_or_else(|| missing(Partition::Logistics, po_id))
    }

    pub fn put_logistics(&self, record: &ShippingPrivateDetails) -> Result<u64, StoreError> {
        self.write(Partition::Logistics.into(), record.po_id.as_str(), record)
    }

    pub fn logistics_records(&self) -> Result<Vec<KeyedRecord<ShippingPrivateDetails>>, StoreError> {
        self.list(Partition::Logistics.into())
    }

    // shared progress

    pub fn progress(&self, po_id: &PoId) -> Result<Option<SharedProgressReport>, StoreError> {
        self.read(Partition::GeneralProgress.into(), po_id.as_str())
    }

    pub fn put_progress(&self, record: &SharedProgressReport) -> Result<u64, StoreError> {
        self.write(Partition::GeneralProgress.into(), record.po_id.as_str(), record)
    }

    pub fn progress_records(&self) -> Result<Vec<KeyedRecord<SharedProgressReport>>, StoreError> {
        self.list(Partition::GeneralProgress.into())
    }

    // certificates

    pub fn put_certificate(&self, partition: Partition, certificate: &MaterialCertificate) -> DomainResult<u64> {
        ensure_certificates(partition)?;
        Ok(self.write(partition.into(), certificate.tracking_id.as_str(), certificate)?)
    }

    pub fn certificates(&self, partition: Partition) -> DomainResult<Vec<KeyedRecord<MaterialCertificate>>> {
        ensure_certificates(partition)?;
        Ok(self.list(partition.into())?)
    }

    /// Untyped listing of any partition.
    pub fn raw_records(&self, partition: Partition) -> Result<Vec<KeyedRecord<JsonValue>>, StoreError> {
        Ok(self
            .store
            .scan(partition.into())?
            .into_iter()
            .map(|(key, value)| KeyedRecord::new(key, value))
            .collect())
    }

    /// Every partition record of `po_id` that `role` may read.
    pub fn partition_set(&self, role: Role, po_id: &PoId) -> DomainResult<PartitionSet> {
        let visible = |p: Partition| p.is_visible_to(role);
        let pricing = |p: Partition| -> DomainResult<Option<PricingDetails>> {
            if visible(p) { self.pricing(p, po_id) } else { Ok(None) }
        };

        Ok(PartitionSet {
            customer: if visible(Partition::CustomerLineItems) { self.customer_lines(po_id)? } else { None },
            distributor: pricing(Partition::CustomerDistributor)?,
            manufacturer1: pricing(Partition::DistributorManufacturer1)?,
            manufacturer2: pricing(Partition::DistributorManufacturer2)?,
            logistics: if visible(Partition::Logistics) { self.logistics(po_id)? } else { None },
            progress: if visible(Partition::GeneralProgress) { self.progress(po_id)? } else { None },
        })
    }
}

fn missing(partition: Partition, po_id: &PoId) -> DomainError {
    DomainError::not_found(format!("{partition} record for purchase order {po_id}"))
}

fn ensure_pricing(partition: Partition) -> DomainResult<()> {
    if partition.fulfiller().is_none() {
        return Err(DomainError::invariant(format!("{partition} is not a pricing partition")));
    }
    Ok(())
}

fn ensure_certificates(partition: Partition) -> DomainResult<()> {
    if !partition.is_certificate_store() {
        return Err(DomainError::invariant(format!("{partition} is not a certificate partition")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryKvStore;
    use materialtrace_core::TrackingId;
    use materialtrace_fulfillment::model::LineItem;

    fn store() -> PartitionStore<InMemoryKvStore> {
        PartitionStore::new(InMemoryKvStore::new())
    }

    fn po_id() -> PoId {
        PoId::new("po-store").unwrap()
    }

    #[test]
    fn records_round_trip_through_their_partition() {
        let store = store();
        let customer = CustomerLineItems::new(po_id(), vec![LineItem { line_number: 1, ..LineItem::default() }]);
        store.put_customer_lines(&customer).unwrap();

        assert_eq!(store.customer_lines(&po_id()).unwrap(), Some(customer));
        assert!(store.logistics(&po_id()).unwrap().is_none());
    }

    #[test]
    fn missing_records_are_not_found() {
        let store = store();
        match store.require_purchase_order(&po_id()).unwrap_err() {
            DomainError::NotFound(msg) => assert!(msg.contains("po-store")),
            _ => panic!("Expected NotFound error"),
        }
        match store.require_pricing(Partition::DistributorManufacturer2, &po_id()).unwrap_err() {
            DomainError::NotFound(msg) => assert!(msg.contains("collectionDistributorManufacturer2")),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn pricing_and_certificate_access_is_checked_by_partition_kind() {
        let store = store();
        let record = PricingDetails::new(Partition::Logistics, po_id());
        assert!(matches!(
            store.put_pricing(Partition::Logistics, &record),
            Err(DomainError::InvariantViolation(_))
        ));

        let certificate = MaterialCertificate {
            tracking_id: TrackingId::new("TR-1").unwrap(),
            ..MaterialCertificate::default()
        };
        assert!(store.put_certificate(Partition::CustomerDistributor, &certificate).is_err());
        store.put_certificate(Partition::MtrManufacturer1, &certificate).unwrap();
        let listed = store.certificates(Partition::MtrManufacturer1).unwrap();
        assert_eq!(listed[0].key, "TR-1");
    }

    #[test]
    fn partition_set_only_holds_what_the_role_may_read() {
        let store = store();
        store.put_customer_lines(&CustomerLineItems::new(po_id(), Vec::new())).unwrap();
        store
            .put_pricing(Partition::DistributorManufacturer1, &PricingDetails::new(Partition::DistributorManufacturer1, po_id()))
            .unwrap();
        store.put_logistics(&ShippingPrivateDetails::new(po_id())).unwrap();

        let distributor = store.partition_set(Role::Distributor, &po_id()).unwrap();
        assert!(distributor.customer.is_some());
        assert!(distributor.manufacturer1.is_some());

        let manufacturer2 = store.partition_set(Role::Manufacturer2, &po_id()).unwrap();
        assert!(manufacturer2.customer.is_none());
        assert!(manufacturer2.manufacturer1.is_none());
        assert!(manufacturer2.logistics.is_some());
    }

    #[test]
    fn history_keeps_every_primary_version() {
        let store = store();
        let mut po = PurchaseOrder { po_id: po_id(), po_number: 1, ..PurchaseOrder::default() };
        store.put_purchase_order(&po).unwrap();
        po.comment = "second".to_string();
        store.put_purchase_order(&po).unwrap();

        let history = store.purchase_order_history(&po_id()).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].value["comment"], "second");
    }
}
