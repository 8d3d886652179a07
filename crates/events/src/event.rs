use materialtrace_core::PoId;

/// A fact emitted by a fulfillment operation.
///
/// Events are immutable once published. The `event_type` is part of the
/// contract with off-ledger listeners, so some operations let the caller pick
/// it (an acknowledgment or delivery "message key").
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Event name as seen by listeners (e.g. "pocreated", "shipmentaccepted").
    fn event_type(&self) -> &str;

    /// Schema version of the payload.
    fn version(&self) -> u32 {
        1
    }

    /// Purchase order the event belongs to.
    fn po_id(&self) -> &PoId;
}
