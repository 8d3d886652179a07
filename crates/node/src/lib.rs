//! Newline-delimited JSON driver for the command router.
//!
//! Each input line is one invocation:
//!
//! ```text
//! {"mspId":"org1msp","callerId":"alice","command":"create-order","args":["{...}","{...}"]}
//! ```
//!
//! Arguments are positional strings as the router expects them; a JSON
//! object or number given in place of a string is passed on in its compact
//! text form. Every invocation produces one `response` line, followed by one
//! `event` line per event it published.

pub mod protocol;

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use uuid::Uuid;

use materialtrace_events::{EventBus, EventEnvelope, InMemoryEventBus, Subscription};
use materialtrace_fulfillment::FulfillmentEvent;
use materialtrace_infra::{CommandRouter, FulfillmentConfig, InMemoryKvStore, OrderLifecycle};

pub use protocol::{ErrorBody, OutputLine, Request, Response};

pub type Ledger = Arc<InMemoryKvStore>;
pub type Bus = Arc<InMemoryEventBus<EventEnvelope<FulfillmentEvent>>>;

/// Counters reported when the input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub invocations: usize,
    pub failures: usize,
    pub events: usize,
}

/// A single-process node: in-memory ledger, in-memory bus and the router on
/// top of them.
pub struct Node {
    router: CommandRouter<Ledger, Bus>,
    events: Subscription<EventEnvelope<FulfillmentEvent>>,
}

impl Node {
    pub fn new(config: FulfillmentConfig) -> Self {
        let store: Ledger = Arc::new(InMemoryKvStore::new());
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let events = bus.subscribe();
        let router = CommandRouter::new(OrderLifecycle::new(store, bus, config));
        Self { router, events }
    }

    pub fn router(&self) -> &CommandRouter<Ledger, Bus> {
        &self.router
    }

    /// Handle one input line. Returns `None` for blank lines.
    pub fn handle_line(&self, line: &str) -> Option<Vec<OutputLine>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let request_id = Uuid::now_v7();

        let request: Request = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(%request_id, error = %e, "malformed invocation line");
                let body = ErrorBody::new("bad_request", format!("malformed invocation: {e}"));
                return Some(vec![OutputLine::Response(Response::failed(request_id, String::new(), body))]);
            }
        };

        let args = request.positional_args();
        let response = match self.router.invoke_as(&request.msp_id, &request.caller_id, &request.command, &args) {
            Ok(outcome) => Response::succeeded(request_id, request.command, outcome),
            Err(e) => Response::failed(request_id, request.command, ErrorBody::new(e.kind(), e.to_string())),
        };

        let mut out = vec![OutputLine::Response(response)];
        out.extend(self.events.drain().into_iter().map(OutputLine::Event));
        Some(out)
    }

    /// Read invocations until EOF, writing one JSON document per line.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> anyhow::Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (n, line) in input.lines().enumerate() {
            let line = line.with_context(|| format!("reading input line {}", n + 1))?;
            let Some(out) = self.handle_line(&line) else {
                continue;
            };

            for item in &out {
                match item {
                    OutputLine::Response(response) => {
                        summary.invocations += 1;
                        if !response.ok {
                            summary.failures += 1;
                        }
                    }
                    OutputLine::Event(_) => summary.events += 1,
                }
                serde_json::to_writer(&mut output, item).context("encoding output line")?;
                output.write_all(b"\n").context("writing output line")?;
            }
            output.flush().context("flushing output")?;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value as JsonValue, json};

    fn node() -> Node {
        Node::new(FulfillmentConfig::default())
    }

    fn run(node: &Node, lines: &[JsonValue]) -> (RunSummary, Vec<JsonValue>) {
        let input = lines.iter().map(|l| l.to_string()).collect::<Vec<_>>().join("\n");
        let mut output = Vec::new();
        let summary = node.run(input.as_bytes(), &mut output).unwrap();
        let parsed = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (summary, parsed)
    }

    #[test]
    fn init_ledger_answers_and_streams_created_events() {
        let node = node();
        let (summary, out) = run(
            &node,
            &[json!({"mspId": "org1msp", "callerId": "u1", "command": "initledger", "args": ["1600000000"]})],
        );

        assert_eq!(summary, RunSummary { invocations: 1, failures: 0, events: 2 });
        assert_eq!(out[0]["type"], "response");
        assert_eq!(out[0]["ok"], true);
        assert_eq!(out[0]["command"], "initledger");
        assert!(out[0]["requestId"].is_string());
        assert!(out[0].get("error").is_none());

        for event in &out[1..] {
            assert_eq!(event["type"], "event");
            assert_eq!(event["event_type"], "pocreated");
        }
    }

    #[test]
    fn failures_carry_kind_and_message() {
        let node = node();
        let (summary, out) = run(
            &node,
            &[
                json!({"mspId": "org5msp", "command": "createpo", "args": ["{}", "{}"]}),
                json!({"mspId": "org1msp", "command": "frobnicate"}),
                json!({"mspId": "org9msp", "command": "getall"}),
            ],
        );

        assert_eq!(summary.invocations, 3);
        assert_eq!(summary.failures, 3);
        assert_eq!(out[0]["error"]["error"], "unauthorized");
        assert_eq!(out[1]["error"]["error"], "unknown_command");
        assert_eq!(out[1]["error"]["message"], "Unknown command 'frobnicate'");
        assert_eq!(out[2]["error"]["error"], "unauthorized");
    }

    #[test]
    fn malformed_and_blank_lines() {
        let node = node();
        let mut output = Vec::new();
        let input = "\n   \nnot json\n";
        let summary = node.run(input.as_bytes(), &mut output).unwrap();

        assert_eq!(summary.invocations, 1);
        assert_eq!(summary.failures, 1);
        let line: JsonValue = serde_json::from_slice(output.trim_ascii_end()).unwrap();
        assert_eq!(line["ok"], false);
        assert_eq!(line["error"]["error"], "bad_request");
    }

    #[test]
    fn object_arguments_are_passed_as_text() {
        let node = node();
        let order = json!({
            "poId": "node-po-1",
            "poNumber": 77,
            "lineItems": [{"lineNumber": 1, "materialId": "m1", "quantity": 2, "unitPrice": 10.0}]
        });
        let (summary, out) = run(
            &node,
            &[
                json!({"mspId": "org1msp", "callerId": "u1", "command": "create-order",
                       "args": [order, {"owner": "Utility", "status": "open", "timeStamp": 5}]}),
                json!({"mspId": "org1msp", "command": "history", "args": ["node-po-1"]}),
            ],
        );

        assert_eq!(summary.failures, 0);
        assert_eq!(out[0]["payload"]["poId"], "node-po-1");
        let history = out.iter().rfind(|l| l["type"] == "response").unwrap();
        assert_eq!(history["payload"].as_array().unwrap().len(), 1);
    }
}
