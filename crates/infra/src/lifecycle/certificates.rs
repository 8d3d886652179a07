use materialtrace_auth::InvocationContext;
use materialtrace_core::{DomainError, DomainResult, TrackingId};
use materialtrace_events::{EventBus, EventEnvelope};
use materialtrace_fulfillment::model::MaterialCertificate;
use materialtrace_fulfillment::{FulfillmentEvent, strategy_for};

use super::{OrderLifecycle, unexpected_organization};
use crate::ledger::KvStore;

impl<S, B> OrderLifecycle<S, B>
where
    S: KvStore,
    B: EventBus<EventEnvelope<FulfillmentEvent>>,
{
    /// Store a manufacturer's certificate under its tracking id. The
    /// certificate's `docType` becomes the partition name.
    pub fn add_material_certificate(
        &self,
        ctx: &InvocationContext,
        mut certificate: MaterialCertificate,
    ) -> DomainResult<MaterialCertificate> {
        let partition = strategy_for(ctx.caller_role())
            .certificate_partition()
            .ok_or_else(|| unexpected_organization(ctx.caller_role()))?;
        let tracking_id = TrackingId::new(certificate.tracking_id.as_str())
            .map_err(|_| DomainError::validation("Material certificate requires a trackingId."))?;

        certificate.doc_type = partition.collection_name().to_string();
        self.store.put_certificate(partition, &certificate)?;
        tracing::info!(%tracking_id, %partition, "material certificate stored");
        Ok(certificate)
    }
}
