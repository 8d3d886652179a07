//! Command routing.
//!
//! Resolves a command name (case-insensitive, original names accepted as
//! aliases), checks the argument count, authorizes the caller's role, parses
//! the positional arguments and hands off to the lifecycle manager or the
//! query service. Nothing is read or written before all of that passed.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

use materialtrace_auth::{AuthzError, CommandAuthorization, InvocationContext, Role, authorize};
use materialtrace_core::{DomainError, PoId};
use materialtrace_events::{EventBus, EventEnvelope};
use materialtrace_fulfillment::model::{IotProperty, LineItem, MaterialCertificate, PurchaseOrder};
use materialtrace_fulfillment::{DeliveryEvent, FulfillmentEvent, ItemStatus, ManufacturerDiscount, OrderEvent};

use crate::ledger::{KvStore, StoreError};
use crate::lifecycle::{AcceptanceInput, Applied, OrderLifecycle, ShipmentInput};
use crate::queries::Selector;
use crate::saga::DegradedWrite;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// Wrong number of arguments.
    #[error("{0}")]
    Arguments(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Persistence(String),

    #[error("{0}")]
    InvariantViolation(String),
}

impl InvocationError {
    /// Stable machine-readable name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCommand(_) => "unknown_command",
            Self::Arguments(_) => "argument_error",
            Self::Validation(_) => "validation_error",
            Self::Authorization(_) => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Persistence(_) => "store_error",
            Self::InvariantViolation(_) => "invariant_violation",
        }
    }
}

impl From<DomainError> for InvocationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::Unauthorized(msg) => Self::Authorization(msg),
            DomainError::NotFound(msg) => Self::NotFound(msg),
            DomainError::Conflict(msg) => Self::Conflict(msg),
            DomainError::Persistence(msg) => Self::Persistence(msg),
            DomainError::InvariantViolation(msg) => Self::InvariantViolation(msg),
        }
    }
}

impl From<AuthzError> for InvocationError {
    fn from(value: AuthzError) -> Self {
        Self::Authorization(value.to_string())
    }
}

impl From<StoreError> for InvocationError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value.to_string())
    }
}

/// What a successful invocation returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub payload: JsonValue,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded_writes: Vec<DegradedWrite>,
}

impl Outcome {
    fn read<T: Serialize>(value: T) -> Result<Self, InvocationError> {
        Ok(Self {
            payload: to_payload(value)?,
            degraded_writes: Vec::new(),
        })
    }

    fn applied<T: Serialize>(applied: Applied<T>) -> Result<Self, InvocationError> {
        Ok(Self {
            payload: to_payload(applied.value)?,
            degraded_writes: applied.degraded,
        })
    }
}

fn to_payload<T: Serialize>(value: T) -> Result<JsonValue, InvocationError> {
    serde_json::to_value(value).map_err(|e| InvocationError::InvariantViolation(format!("response not serializable: {e}")))
}

const MANUFACTURERS: &[Role] = &[Role::Manufacturer1, Role::Manufacturer2];
const FULFILLERS: &[Role] = &[Role::Distributor, Role::Manufacturer1, Role::Manufacturer2];
const CUSTOMER_SIDE: &[Role] = &[Role::Customer, Role::Distributor];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    InitLedger,
    CreateOrder,
    AcceptOrder,
    AcknowledgeOrderRequest,
    NotifyShipToCustomer,
    LogisticsAcceptAndShip,
    IncomingIot,
    AdvanceInTransit,
    ReceiptVerification,
    AddMaterialCertificate,
    PropagateManufacturerAck,
    NotifyDistributorOnMfrShipment,
    NotifyDistributorOnLogisticsShipment,
    NotifyItemDelivered,
    OpenOrderRequests,
    LogisticsOrderRequests,
    ShippedItemsList,
    FieldOperatorList,
    ShippedToCustomer,
    GetAll,
    QueryPo,
    LineItemProgressStatus,
    History,
    MtrList,
    QueryPrivateCollection,
}

impl Command {
    pub const ALL: [Command; 25] = [
        Command::InitLedger,
        Command::CreateOrder,
        Command::AcceptOrder,
        Command::AcknowledgeOrderRequest,
        Command::NotifyShipToCustomer,
        Command::LogisticsAcceptAndShip,
        Command::IncomingIot,
        Command::AdvanceInTransit,
        Command::ReceiptVerification,
        Command::AddMaterialCertificate,
        Command::PropagateManufacturerAck,
        Command::NotifyDistributorOnMfrShipment,
        Command::NotifyDistributorOnLogisticsShipment,
        Command::NotifyItemDelivered,
        Command::OpenOrderRequests,
        Command::LogisticsOrderRequests,
        Command::ShippedItemsList,
        Command::FieldOperatorList,
        Command::ShippedToCustomer,
        Command::GetAll,
        Command::QueryPo,
        Command::LineItemProgressStatus,
        Command::History,
        Command::MtrList,
        Command::QueryPrivateCollection,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Command::InitLedger => "init-ledger",
            Command::CreateOrder => "create-order",
            Command::AcceptOrder => "accept-order",
            Command::AcknowledgeOrderRequest => "acknowledge-order-request",
            Command::NotifyShipToCustomer => "notify-ship-to-customer",
            Command::LogisticsAcceptAndShip => "logistics-accept-and-ship",
            Command::IncomingIot => "incoming-iot",
            Command::AdvanceInTransit => "advance-in-transit",
            Command::ReceiptVerification => "receipt-verification",
            Command::AddMaterialCertificate => "add-material-certificate",
            Command::PropagateManufacturerAck => "propagate-manufacturer-ack",
            Command::NotifyDistributorOnMfrShipment => "notify-distributor-on-mfr-shipment",
            Command::NotifyDistributorOnLogisticsShipment => "notify-distributor-on-logistics-shipment",
            Command::NotifyItemDelivered => "notify-item-delivered",
            Command::OpenOrderRequests => "open-order-requests",
            Command::LogisticsOrderRequests => "logistics-order-requests",
            Command::ShippedItemsList => "shipped-items-list",
            Command::FieldOperatorList => "field-operator-list",
            Command::ShippedToCustomer => "shipped-to-customer",
            Command::GetAll => "getall",
            Command::QueryPo => "query-po",
            Command::LineItemProgressStatus => "line-item-progress-status",
            Command::History => "history",
            Command::MtrList => "mtr-list",
            Command::QueryPrivateCollection => "query-private-collection",
        }
    }

    /// Legacy command names, still accepted.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Command::InitLedger => &["initledger"],
            Command::CreateOrder => &["createpo"],
            Command::AcceptOrder => &["acceptpo"],
            Command::NotifyShipToCustomer => &["notifyshiptocustomer"],
            Command::LogisticsAcceptAndShip => &["acceptandshiptocustomer"],
            Command::IncomingIot => &["incomingiot"],
            Command::AdvanceInTransit => &["advanceintransititems"],
            Command::ReceiptVerification => &["receiveditemsverified"],
            Command::AddMaterialCertificate => &["addmaterialcertificate"],
            Command::PropagateManufacturerAck => &["manufactureracknowledgment"],
            Command::NotifyDistributorOnMfrShipment => &["onmanufacturershipmentnotification"],
            Command::NotifyDistributorOnLogisticsShipment => &["onlogisticsacceptance"],
            Command::NotifyItemDelivered => &["notifyitemdelivered"],
            Command::ShippedItemsList => &["shippeditemslist"],
            Command::QueryPo => &["querypo"],
            Command::LineItemProgressStatus => &["lineitemprogressstatus"],
            Command::QueryPrivateCollection => &["queryprivatecollection"],
            _ => &[],
        }
    }

    /// Accepted positional argument counts.
    pub fn arity(self) -> RangeInclusive<usize> {
        match self {
            Command::InitLedger => 1..=2,
            Command::CreateOrder => 2..=2,
            Command::AcceptOrder => 6..=6,
            Command::AcknowledgeOrderRequest => 4..=4,
            Command::NotifyShipToCustomer => 5..=5,
            Command::LogisticsAcceptAndShip => 2..=2,
            Command::IncomingIot => 4..=4,
            Command::AdvanceInTransit => 2..=2,
            Command::ReceiptVerification => 2..=2,
            Command::AddMaterialCertificate => 1..=1,
            Command::PropagateManufacturerAck => 1..=1,
            Command::NotifyDistributorOnMfrShipment => 3..=3,
            Command::NotifyDistributorOnLogisticsShipment => 4..=4,
            Command::NotifyItemDelivered => 3..=3,
            // listings ignore a trailing query string
            Command::OpenOrderRequests
            | Command::LogisticsOrderRequests
            | Command::ShippedItemsList
            | Command::FieldOperatorList
            | Command::ShippedToCustomer
            | Command::GetAll
            | Command::MtrList => 0..=1,
            Command::QueryPo => 1..=1,
            Command::LineItemProgressStatus => 2..=2,
            Command::History => 1..=1,
            Command::QueryPrivateCollection => 2..=2,
        }
    }

    fn check_arity(self, args: &[String]) -> Result<(), InvocationError> {
        let arity = self.arity();
        if arity.contains(&args.len()) {
            return Ok(());
        }
        let expected = if arity.start() == arity.end() {
            arity.start().to_string()
        } else {
            format!("{} to {}", arity.start(), arity.end())
        };
        Err(InvocationError::Arguments(format!(
            "Incorrect number of arguments for '{}'. Expecting {expected}, found {}",
            self.name(),
            args.len()
        )))
    }
}

impl FromStr for Command {
    type Err = InvocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Command::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(wanted) || c.aliases().iter().any(|a| a.eq_ignore_ascii_case(wanted)))
            .ok_or_else(|| InvocationError::UnknownCommand(s.to_string()))
    }
}

impl CommandAuthorization for Command {
    fn command_name(&self) -> &str {
        self.name()
    }

    fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Command::InitLedger | Command::CreateOrder | Command::ReceiptVerification => Some(&[Role::Customer]),
            Command::AcceptOrder
            | Command::AdvanceInTransit
            | Command::PropagateManufacturerAck
            | Command::NotifyDistributorOnMfrShipment
            | Command::NotifyItemDelivered => Some(&[Role::Distributor]),
            Command::AcknowledgeOrderRequest | Command::AddMaterialCertificate => Some(MANUFACTURERS),
            Command::NotifyShipToCustomer
            | Command::IncomingIot
            | Command::NotifyDistributorOnLogisticsShipment
            | Command::OpenOrderRequests
            | Command::MtrList => Some(FULFILLERS),
            Command::LogisticsAcceptAndShip | Command::LogisticsOrderRequests => Some(&[Role::Logistics]),
            Command::FieldOperatorList | Command::ShippedToCustomer => Some(CUSTOMER_SIDE),
            Command::ShippedItemsList
            | Command::GetAll
            | Command::QueryPo
            | Command::LineItemProgressStatus
            | Command::History
            | Command::QueryPrivateCollection => None,
        }
    }
}

/// Entry point for invocations.
#[derive(Debug)]
pub struct CommandRouter<S, B> {
    lifecycle: OrderLifecycle<S, B>,
}

impl<S, B> CommandRouter<S, B> {
    pub fn new(lifecycle: OrderLifecycle<S, B>) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &OrderLifecycle<S, B> {
        &self.lifecycle
    }
}

impl<S, B> CommandRouter<S, B>
where
    S: KvStore,
    B: EventBus<EventEnvelope<FulfillmentEvent>>,
{
    /// Invoke as the organization behind `msp_id`.
    pub fn invoke_as(
        &self,
        msp_id: &str,
        caller_id: &str,
        command: &str,
        args: &[String],
    ) -> Result<Outcome, InvocationError> {
        let ctx = InvocationContext::from_msp_id(msp_id, caller_id).inspect_err(|e| {
            tracing::warn!(msp_id, command, error = %e, "invocation from unknown organization refused");
        })?;
        self.invoke(&ctx, command, args)
    }

    pub fn invoke(&self, ctx: &InvocationContext, command: &str, args: &[String]) -> Result<Outcome, InvocationError> {
        let command: Command = command.parse()?;
        let span = tracing::info_span!("invoke", command = command.name(), role = %ctx.caller_role());
        let _guard = span.enter();

        if let Err(e) = authorize(ctx, &command) {
            tracing::warn!(caller = ctx.caller_id(), error = %e, "authorization denied");
            return Err(e.into());
        }
        command.check_arity(args)?;

        let result = self.dispatch(ctx, command, args);
        match &result {
            Ok(outcome) if !outcome.degraded_writes.is_empty() => {
                tracing::warn!(degraded = outcome.degraded_writes.len(), "invocation completed with degraded writes");
            }
            Ok(_) => tracing::debug!("invocation completed"),
            Err(e) => tracing::info!(error = %e, "invocation failed"),
        }
        result
    }

    fn dispatch(&self, ctx: &InvocationContext, command: Command, args: &[String]) -> Result<Outcome, InvocationError> {
        let lifecycle = &self.lifecycle;
        let queries = lifecycle.queries();

        match command {
            Command::InitLedger => {
                let created = int(&args[0], "Unable to parse timestamp provided - {} Expecting a number.")?;
                let company = args.get(1).map(String::as_str);
                Outcome::applied(lifecycle.init_ledger(ctx, created, company)?)
            }
            Command::CreateOrder => {
                let order: PurchaseOrder = json(&args[0], "Unable to parse purchase order data provided - {}")?;
                let status = item_status(&args[1])?;
                Outcome::applied(lifecycle.create_order(ctx, order, &status)?)
            }
            Command::AcceptOrder => {
                let order: PurchaseOrder = json(&args[0], "Unable to parse purchase order data provided - {}")?;
                let accepted: bool = args[1].trim().parse().map_err(|_| {
                    InvocationError::Validation(format!("Expecting true or false value for second argument. Found: {}", args[1]))
                })?;
                let rejection_reason = args[3].clone();
                if !accepted && rejection_reason.is_empty() {
                    return Err(InvocationError::Validation("Rejection reason is required.".to_string()));
                }
                let timestamp = int(&args[2], "Unable to parse timestamp provided - {} Expecting a number.")?;
                let discounts: Vec<ManufacturerDiscount> =
                    json(&args[4], "Unable to parse manufacturer discounts provided - {}")?;
                let status = item_status(&args[5])?;
                let input = AcceptanceInput {
                    order,
                    accepted,
                    timestamp,
                    rejection_reason,
                    discounts,
                    status,
                };
                Outcome::applied(lifecycle.accept_or_reject(ctx, input)?)
            }
            Command::AcknowledgeOrderRequest => {
                let po_id = po_id(&args[0])?;
                let acknowledged_at = int(&args[1], "Unable to parse timestamp provided - {} Expecting a number.")?;
                let status = item_status(&args[2])?;
                Outcome::applied(lifecycle.acknowledge_order_request(ctx, &po_id, acknowledged_at, &status, &args[3])?)
            }
            Command::NotifyShipToCustomer => {
                let input = ShipmentInput {
                    po_id: po_id(&args[0])?,
                    lines: line_items(&args[1])?,
                    shipping_request_number: int(
                        &args[2],
                        "Unable to parse shippingRequestNumber provided - {} Expecting an int64 number.",
                    )?,
                    status: item_status(&args[3])?,
                    logistics_initial: json(&args[4], "Unable to parse progress status data provided - {}")?,
                };
                Outcome::applied(lifecycle.notify_ship_to_customer(ctx, input)?)
            }
            Command::LogisticsAcceptAndShip => {
                let po_id = po_id(&args[0])?;
                let lines = line_items(&args[1])?;
                Outcome::applied(lifecycle.logistics_accept_and_ship(ctx, &po_id, &lines)?)
            }
            Command::IncomingIot => {
                let po_id = po_id(&args[0])?;
                let sample: IotProperty = json(&args[1], "Unable to parse IOT data provided - {}")?;
                let status = item_status(&args[2])?;
                let applied = lifecycle.incoming_iot(ctx, &po_id, sample, &status, &args[3])?;
                Outcome::applied(applied.map(|receipt| receipt.sample))
            }
            Command::AdvanceInTransit => {
                let raw: BTreeMap<String, Vec<LineItem>> =
                    json(&args[0], "Unable to parse lineItem data provided - {}")?;
                let batch = raw
                    .into_iter()
                    .map(|(id, lines)| Ok((po_id(&id)?, lines)))
                    .collect::<Result<BTreeMap<_, _>, InvocationError>>()?;
                let status = item_status(&args[1])?;
                let applied = lifecycle.advance_in_transit(ctx, &batch, &status)?;
                Outcome::applied(applied.map(|_| "OK"))
            }
            Command::ReceiptVerification => {
                let po_id = po_id(&args[0])?;
                let srn = int(&args[1], "Invalid number format, expecting a number on argument 2")?;
                Outcome::applied(lifecycle.verify_receipt(ctx, &po_id, srn)?)
            }
            Command::AddMaterialCertificate => {
                let certificate: MaterialCertificate =
                    json(&args[0], "Unable to parse material certificate provided - {}")?;
                Outcome::read(lifecycle.add_material_certificate(ctx, certificate)?)
            }
            Command::PropagateManufacturerAck => {
                let event: OrderEvent = json(&args[0], "Unable to parse acknowledgment event provided - {}")?;
                Outcome::applied(lifecycle.propagate_manufacturer_ack(ctx, &event)?)
            }
            Command::NotifyDistributorOnMfrShipment => {
                let po_id = po_id(&args[0])?;
                let lines = line_items(&args[1])?;
                let status = item_status(&args[2])?;
                Outcome::applied(lifecycle.notify_distributor_on_mfr_shipment(ctx, &po_id, &lines, &status)?)
            }
            Command::NotifyDistributorOnLogisticsShipment => {
                let po_id = po_id(&args[0])?;
                let lines = line_items(&args[1])?;
                let time_shipped = int(&args[2], "Unable to parse timeShipped provided - {} Expecting a number.")?;
                let status = item_status(&args[3])?;
                Outcome::applied(lifecycle.notify_distributor_on_logistics_shipment(ctx, &po_id, &lines, time_shipped, &status)?)
            }
            Command::NotifyItemDelivered => {
                let event: DeliveryEvent = json(&args[0], "Unable to parse delivery event provided - {}")?;
                let received_at = int(&args[1], "Invalid number format, expecting a number on argument 2")?;
                let status = item_status(&args[2])?;
                Outcome::applied(lifecycle.notify_item_delivered(ctx, event, received_at, &status)?)
            }
            Command::OpenOrderRequests => Outcome::read(queries.open_order_requests(ctx)?),
            Command::LogisticsOrderRequests | Command::ShippedItemsList => Outcome::read(queries.shipping_requests()?),
            Command::FieldOperatorList => Outcome::read(queries.field_operator_list(ctx)?),
            Command::ShippedToCustomer | Command::GetAll => Outcome::read(queries.all_orders(ctx)?),
            Command::QueryPo => {
                let selector = Selector::parse(&args[0])?;
                Outcome::read(queries.query_po(ctx, &selector)?)
            }
            Command::LineItemProgressStatus => {
                let po_number = int(&args[0], "Invalid first argument, expected a number. Found: {}")?;
                let line_number = int(&args[1], "Invalid second argument, expected a number. Found: {}")?;
                Outcome::read(queries.line_item_progress_status(po_number, line_number)?)
            }
            Command::History => Outcome::read(queries.history(&po_id(&args[0])?)?),
            Command::MtrList => Outcome::read(queries.mtr_list(ctx)?),
            Command::QueryPrivateCollection => {
                let selector = Selector::parse(&args[1])?;
                Outcome::read(queries.private_collection(ctx, &args[0], &selector)?)
            }
        }
    }
}

fn invalid(template: &str, arg: &str) -> InvocationError {
    InvocationError::Validation(template.replacen("{}", arg, 1))
}

fn json<T: DeserializeOwned>(arg: &str, template: &str) -> Result<T, InvocationError> {
    serde_json::from_str(arg).map_err(|e| {
        tracing::debug!(error = %e, "argument is not valid JSON for its type");
        invalid(template, arg)
    })
}

fn int<T: FromStr>(arg: &str, template: &str) -> Result<T, InvocationError> {
    arg.trim().parse().map_err(|_| invalid(template, arg))
}

fn item_status(arg: &str) -> Result<ItemStatus, InvocationError> {
    json(arg, "Unable to parse progress status data provided - {}")
}

fn line_items(arg: &str) -> Result<Vec<LineItem>, InvocationError> {
    json(arg, "Unable to parse lineItem data provided - {}")
}

fn po_id(arg: &str) -> Result<PoId, InvocationError> {
    Ok(PoId::new(arg)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_aliases_resolve_case_insensitively() {
        assert_eq!("acceptpo".parse::<Command>().unwrap(), Command::AcceptOrder);
        assert_eq!("Accept-Order".parse::<Command>().unwrap(), Command::AcceptOrder);
        assert_eq!("RECEIVEDITEMSVERIFIED".parse::<Command>().unwrap(), Command::ReceiptVerification);
        assert_eq!(" getall ".parse::<Command>().unwrap(), Command::GetAll);

        match "customerorderrecevied".parse::<Command>().unwrap_err() {
            InvocationError::UnknownCommand(name) => assert_eq!(name, "customerorderrecevied"),
            other => panic!("Expected UnknownCommand error, got {other:?}"),
        }
    }

    #[test]
    fn every_name_is_unique() {
        let mut seen = std::collections::HashSet::new();
        for command in Command::ALL {
            assert!(seen.insert(command.name()), "duplicate name {}", command.name());
            for alias in command.aliases() {
                assert!(seen.insert(alias), "duplicate alias {alias}");
            }
        }
    }

    #[test]
    fn arity_is_checked_with_a_readable_message() {
        let args = vec!["only-one".to_string()];
        match Command::AcceptOrder.check_arity(&args).unwrap_err() {
            InvocationError::Arguments(msg) => {
                assert!(msg.contains("accept-order"));
                assert!(msg.contains("Expecting 6"));
            }
            other => panic!("Expected Arguments error, got {other:?}"),
        }
        assert!(Command::InitLedger.check_arity(&args).is_ok());
        assert!(Command::GetAll.check_arity(&[]).is_ok());
    }

    #[test]
    fn role_lists_follow_the_organizations() {
        assert_eq!(Command::AcceptOrder.allowed_roles(), Some(&[Role::Distributor][..]));
        assert_eq!(Command::LogisticsAcceptAndShip.allowed_roles(), Some(&[Role::Logistics][..]));
        assert_eq!(Command::History.allowed_roles(), None);
        assert!(Command::IncomingIot.allowed_roles().is_some_and(|r| !r.contains(&Role::Customer)));
    }

    #[test]
    fn parse_failures_echo_the_argument() {
        match int::<i64>("abc", "Unable to parse timestamp provided - {} Expecting a number.").unwrap_err() {
            InvocationError::Validation(msg) => {
                assert_eq!(msg, "Unable to parse timestamp provided - abc Expecting a number.")
            }
            other => panic!("Expected Validation error, got {other:?}"),
        }
        assert!(matches!(item_status("{not json"), Err(InvocationError::Validation(_))));
        assert!(matches!(po_id("a|b"), Err(InvocationError::Validation(_))));
    }
}
