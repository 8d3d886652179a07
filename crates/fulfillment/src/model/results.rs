//! Read-side result shapes returned by list and report queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use materialtrace_core::PoId;

use super::{
    Company, LineItem, LineItemPricing, Mtr, PurchaseOrder, SharedLineDetail, ShippingLineItem,
    nullable,
};
use crate::state::Status;

/// A pricing partition joined with its primary order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingResults {
    pub po_id: PoId,
    pub po_number: u32,
    pub owner: Company,
    pub po_status: Status,
    pub expected_delivery_date: String,
    #[serde(deserialize_with = "nullable")]
    pub line_items: Vec<LineItemPricing>,
}

/// The logistics partition joined with its primary order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingRequestsResults {
    pub po_id: PoId,
    pub po_number: u32,
    pub po_status: Status,
    pub owner: Company,
    pub expected_delivery_date: String,
    #[serde(deserialize_with = "nullable")]
    pub line_items: Vec<ShippingLineItem>,
}

/// Project-manager view: the customer lines that have left the origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PmView {
    pub po_id: PoId,
    pub po_number: u32,
    pub po_status: Status,
    pub project_id: String,
    #[serde(deserialize_with = "nullable")]
    pub line_items: Vec<LineItem>,
}

/// Everything a field operator needs about one shipped order.
///
/// Maps are keyed by line number, except `shipping_request_map` which groups
/// shipped lines by shipping request number. The `sippingRequestMap` spelling
/// is what deployed clients read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldOperatorReport {
    pub shipped_items_map: BTreeMap<u32, ShippingLineItem>,
    #[serde(rename = "sippingRequestMap")]
    pub shipping_request_map: BTreeMap<i64, Vec<ShippingLineItem>>,
    pub pm_view_item: PmView,
    #[serde(rename = "po")]
    pub original_po: PurchaseOrder,
    pub distributor_line_item_map: BTreeMap<u32, LineItemPricing>,
    pub manufacturer1_line_item_map: BTreeMap<u32, LineItemPricing>,
    pub manufacturer2_line_item_map: BTreeMap<u32, LineItemPricing>,
    #[serde(rename = "progressMap")]
    pub progress_report_map: BTreeMap<u32, SharedLineDetail>,
}

/// Goods receipt for one verified shipping line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoodReceipt {
    #[serde(deserialize_with = "nullable")]
    pub material_certificate: Vec<Mtr>,
    pub shipped_line_item: ShippingLineItem,
}

/// `{Key, Record}` pair returned by listing queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyedRecord<T> {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: T,
}

impl<T> KeyedRecord<T> {
    pub fn new(key: impl Into<String>, record: T) -> Self {
        Self {
            key: key.into(),
            record,
        }
    }
}
