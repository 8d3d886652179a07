//! Wire shapes of the node's input and output lines.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use materialtrace_events::EventEnvelope;
use materialtrace_fulfillment::FulfillmentEvent;
use materialtrace_infra::{DegradedWrite, Outcome};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub msp_id: String,
    #[serde(default)]
    pub caller_id: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<JsonValue>,
}

impl Request {
    /// Arguments as the router takes them: strings verbatim, anything else
    /// as compact JSON text.
    pub fn positional_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| match arg {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub request_id: Uuid,
    pub command: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded_writes: Vec<DegradedWrite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn succeeded(request_id: Uuid, command: String, outcome: Outcome) -> Self {
        Self {
            request_id,
            command,
            ok: true,
            payload: Some(outcome.payload),
            degraded_writes: outcome.degraded_writes,
            error: None,
        }
    }

    pub fn failed(request_id: Uuid, command: String, error: ErrorBody) -> Self {
        Self {
            request_id,
            command,
            ok: false,
            payload: None,
            degraded_writes: Vec::new(),
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutputLine {
    Response(Response),
    Event(EventEnvelope<FulfillmentEvent>),
}
