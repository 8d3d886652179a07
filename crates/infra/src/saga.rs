//! Ordered multi-partition writes.
//!
//! An invocation usually writes several partitions and the ledger gives no
//! atomicity across them. Each write is run as a saga step, in the order the
//! caller issues them:
//!
//! - a **critical** step writes a source-of-truth record; failure aborts the
//!   remaining steps and fails the invocation
//! - a **best-effort** step writes a mirror; failure is logged and reported
//!   as a [`DegradedWrite`], and the invocation carries on
//!
//! Every update is keyed by item key or line number and idempotent, so a
//! degraded or aborted invocation is repaired by re-driving it.

use serde::{Deserialize, Serialize};

use materialtrace_core::{DomainError, DomainResult, PoId};

use crate::ledger::Namespace;

/// A best-effort write that did not commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DegradedWrite {
    pub partition: String,
    pub po_id: PoId,
    pub reason: String,
}

#[derive(Debug)]
pub struct WriteSaga {
    po_id: PoId,
    committed: usize,
    degraded: Vec<DegradedWrite>,
}

impl WriteSaga {
    pub fn new(po_id: PoId) -> Self {
        Self {
            po_id,
            committed: 0,
            degraded: Vec::new(),
        }
    }

    /// Run a source-of-truth write.
    pub fn critical<T, E>(&mut self, namespace: Namespace, write: impl FnOnce() -> Result<T, E>) -> DomainResult<T>
    where
        E: Into<DomainError>,
    {
        match write() {
            Ok(value) => {
                self.committed += 1;
                Ok(value)
            }
            Err(err) => {
                let err = err.into();
                tracing::error!(
                    po_id = %self.po_id,
                    partition = %namespace,
                    committed = self.committed,
                    error = %err,
                    "critical write failed, remaining steps aborted"
                );
                Err(err)
            }
        }
    }

    /// Run a mirror write. Failure is recorded, not returned.
    pub fn best_effort<T, E>(&mut self, namespace: Namespace, write: impl FnOnce() -> Result<T, E>) -> Option<T>
    where
        E: Into<DomainError>,
    {
        match write() {
            Ok(value) => {
                self.committed += 1;
                Some(value)
            }
            Err(err) => {
                let err = err.into();
                tracing::warn!(
                    po_id = %self.po_id,
                    partition = %namespace,
                    error = %err,
                    "best-effort write failed, continuing"
                );
                self.degraded.push(DegradedWrite {
                    partition: namespace.to_string(),
                    po_id: self.po_id.clone(),
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    pub fn committed(&self) -> usize {
        self.committed
    }

    pub fn finish(self) -> Vec<DegradedWrite> {
        if !self.degraded.is_empty() {
            tracing::info!(po_id = %self.po_id, degraded = self.degraded.len(), "invocation completed with degraded writes");
        }
        self.degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::StoreError;
    use materialtrace_fulfillment::Partition;

    fn saga() -> WriteSaga {
        WriteSaga::new(PoId::new("po-saga").unwrap())
    }

    #[test]
    fn critical_failure_is_returned() {
        let mut saga = saga();
        let result: DomainResult<u64> = saga.critical(Namespace::World, || Err(StoreError::Poisoned));
        assert!(matches!(result, Err(DomainError::Persistence(_))));
        assert_eq!(saga.committed(), 0);
        assert!(saga.finish().is_empty());
    }

    #[test]
    fn best_effort_failure_is_recorded_and_later_steps_run() {
        let mut saga = saga();
        let progress = Namespace::Private(Partition::GeneralProgress);
        let skipped: Option<u64> =
            saga.best_effort(progress, || Err(StoreError::backend(progress, "disk full")));
        assert!(skipped.is_none());

        let written = saga.critical(Namespace::World, || Ok::<_, StoreError>(3)).unwrap();
        assert_eq!(written, 3);
        assert_eq!(saga.committed(), 1);

        let degraded = saga.finish();
        assert_eq!(degraded.len(), 1);
        assert_eq!(degraded[0].partition, "collectionGeneralProgress");
        assert!(degraded[0].reason.contains("disk full"));
    }
}
