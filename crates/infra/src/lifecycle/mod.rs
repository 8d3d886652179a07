//! Order lifecycle manager.
//!
//! Every operation follows the same pipeline:
//!
//! ```text
//! re-read the partitions it needs (never cached across calls)
//!   ↓
//! run the pure workflow transition
//!   ↓
//! write the results as an ordered saga, mirrors last
//!   ↓
//! publish the resulting event, only after the writes
//! ```
//!
//! Authorization happens before any of this, in the command router. The
//! operations here still resolve the caller's role strategy and refuse
//! roles that have no partition to act on.

mod acknowledgment;
mod certificates;
mod delivery;
mod ordering;
mod receipt;
mod shipping;

pub use delivery::TelemetryReceipt;
pub use ordering::AcceptanceInput;
pub use receipt::ReceiptVerification;
pub use shipping::{ShipmentInput, ShippedFrom};

use materialtrace_auth::{InvocationContext, Role};
use materialtrace_core::{DomainError, DomainResult, PoId};
use materialtrace_events::{EventBus, EventEnvelope};
use materialtrace_fulfillment::model::SharedProgressReport;
use materialtrace_fulfillment::progress::seed_report;
use materialtrace_fulfillment::{FulfillmentEvent, Geofence, Partition, ProgressUpdate};

use crate::config::FulfillmentConfig;
use crate::ledger::KvStore;
use crate::partition_store::PartitionStore;
use crate::saga::{DegradedWrite, WriteSaga};

/// Result of a mutating operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub value: T,
    /// Best-effort writes that did not commit.
    pub degraded: Vec<DegradedWrite>,
}

impl<T> Applied<T> {
    fn new(value: T, saga: WriteSaga) -> Self {
        Self {
            value,
            degraded: saga.finish(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        Applied {
            value: f(self.value),
            degraded: self.degraded,
        }
    }
}

#[derive(Debug)]
pub struct OrderLifecycle<S, B> {
    store: PartitionStore<S>,
    bus: B,
    config: FulfillmentConfig,
    geofence: Geofence,
}

impl<S, B> OrderLifecycle<S, B> {
    pub fn new(store: S, bus: B, config: FulfillmentConfig) -> Self {
        let geofence = Geofence::new(config.geofence_radius_miles);
        Self {
            store: PartitionStore::new(store),
            bus,
            config,
            geofence,
        }
    }

    pub fn store(&self) -> &PartitionStore<S> {
        &self.store
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn config(&self) -> &FulfillmentConfig {
        &self.config
    }
}

impl<S, B> OrderLifecycle<S, B>
where
    S: KvStore,
    B: EventBus<EventEnvelope<FulfillmentEvent>>,
{
    /// Publish after the writes of an operation committed.
    ///
    /// A failure here leaves the writes in place; re-driving the command
    /// publishes again (at-least-once).
    fn publish(&self, event: impl Into<FulfillmentEvent>) -> DomainResult<()> {
        let envelope = EventEnvelope::wrap(event.into());
        let event_id = envelope.event_id();
        let event_type = envelope.event_type().to_string();
        let po_id = envelope.po_id().clone();
        self.bus.publish(envelope).map_err(|e| {
            tracing::error!(%po_id, %event_type, error = %e, "event publication failed after commit");
            DomainError::persistence(format!("event '{event_type}' for {po_id} not published: {e}"))
        })?;
        tracing::info!(%po_id, %event_type, %event_id, "event published");
        Ok(())
    }

    /// Merge an update into the shared progress report as a best-effort step.
    ///
    /// A missing report is re-seeded from the customer partition first.
    fn merge_progress(&self, saga: &mut WriteSaga, po_id: &PoId, update: &ProgressUpdate) {
        if update.is_empty() {
            return;
        }
        saga.best_effort(Partition::GeneralProgress.into(), || -> DomainResult<u64> {
            let mut report = match self.store.progress(po_id)? {
                Some(report) => report,
                None => self.reseed_progress(po_id)?,
            };
            report.apply(update);
            Ok(self.store.put_progress(&report)?)
        });
    }

    fn reseed_progress(&self, po_id: &PoId) -> DomainResult<SharedProgressReport> {
        let customer = self.store.require_customer_lines(po_id)?;
        tracing::warn!(%po_id, "shared progress record missing, re-seeding from customer lines");
        Ok(seed_report(po_id.clone(), &customer.line_items))
    }
}

/// The caller must be a manufacturer; returns its pricing partition.
fn manufacturer_partition(ctx: &InvocationContext) -> DomainResult<Partition> {
    let role = ctx.caller_role();
    match Partition::pricing_for(role) {
        Some(partition) if role.is_manufacturer() => Ok(partition),
        _ => Err(unexpected_organization(role)),
    }
}

fn unexpected_organization(role: Role) -> DomainError {
    DomainError::unauthorized(format!("Unexpected Organization Id - {}", role.msp_id()))
}
