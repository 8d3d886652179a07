use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use materialtrace_core::PoId;

use crate::event::Event;

/// Envelope for a published event.
///
/// Notes:
/// - `po_id` scopes the event to one order; listeners filter on it.
/// - `recorded_at` is the publish time, not the business timestamp carried in
///   the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    po_id: PoId,
    event_type: String,
    version: u32,
    recorded_at: DateTime<Utc>,
    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        po_id: PoId,
        event_type: impl Into<String>,
        version: u32,
        recorded_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            po_id,
            event_type: event_type.into(),
            version,
            recorded_at,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn po_id(&self) -> &PoId {
        &self.po_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }

    /// Transform the payload, keeping the metadata.
    pub fn map<F, T>(self, f: F) -> EventEnvelope<T>
    where
        F: FnOnce(E) -> T,
    {
        EventEnvelope {
            event_id: self.event_id,
            po_id: self.po_id,
            event_type: self.event_type,
            version: self.version,
            recorded_at: self.recorded_at,
            payload: f(self.payload),
        }
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap a domain event with a fresh UUIDv7 id and the current time.
    pub fn wrap(event: E) -> Self {
        Self::new(
            Uuid::now_v7(),
            event.po_id().clone(),
            event.event_type().to_string(),
            event.version(),
            Utc::now(),
            event,
        )
    }
}
