//! Shared progress aggregation.
//!
//! Every organization taking part in an order sees one `SharedProgressReport`
//! per purchase order. Operations never rewrite it wholesale: they hand in a
//! [`ProgressUpdate`] naming the lines they touched, the status entry to log,
//! and the fields their mode owns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use materialtrace_core::PoId;

use crate::model::{IotProperty, LineItem, Mtr, SharedLineDetail, SharedProgressReport};
use crate::partition::Partition;
use crate::state::{ItemStatus, ProgressLog};

/// Which fields of a shared line an update owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressMode {
    #[serde(rename = "distributoraccepts")]
    DistributorAccepts,
    #[serde(rename = "manufactureracknowledge")]
    ManufacturerAcknowledge,
    #[serde(rename = "itemshipped")]
    ItemShipped,
    #[serde(rename = "delivered")]
    Delivered,
}

/// Cross-party visible fields of one line, as carried by an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineProgress {
    pub assigned_to: String,
    pub material_certificate: Vec<Mtr>,
    pub iot_tracking_code: String,
    pub iot_properties: Vec<IotProperty>,
    pub time_shipped: i64,
    pub time_received: i64,
    pub shipping_request_number: i64,
}

impl From<&LineItem> for LineProgress {
    fn from(line: &LineItem) -> Self {
        Self {
            assigned_to: line.assigned_to.clone(),
            material_certificate: line.material_certificate.clone(),
            iot_tracking_code: line.iot_tracking_code.clone(),
            iot_properties: line.iot_properties.clone(),
            time_shipped: line.time_shipped,
            time_received: line.time_received,
            shipping_request_number: line.shipping_request_number,
        }
    }
}

/// A batch of per-line changes to merge into a shared progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub mode: ProgressMode,
    pub entry: ItemStatus,
    pub lines: BTreeMap<u32, LineProgress>,
}

impl ProgressUpdate {
    pub fn new(mode: ProgressMode, entry: ItemStatus) -> Self {
        Self {
            mode,
            entry,
            lines: BTreeMap::new(),
        }
    }

    pub fn with_line(mut self, line_number: u32, progress: LineProgress) -> Self {
        self.lines.insert(line_number, progress);
        self
    }

    pub fn insert(&mut self, line_number: u32, progress: LineProgress) {
        self.lines.insert(line_number, progress);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Initial shared report for a freshly created order.
pub fn seed_report(po_id: PoId, lines: &[LineItem]) -> SharedProgressReport {
    SharedProgressReport {
        doc_type: Partition::GeneralProgress.collection_name().to_string(),
        po_id,
        line_items: lines.iter().map(seed_line).collect(),
    }
}

fn seed_line(line: &LineItem) -> SharedLineDetail {
    SharedLineDetail {
        po_number: line.po_number,
        line_number: line.line_number,
        item_key: line.item_key.clone(),
        assigned_to: line.assigned_to.clone(),
        shipping_request_number: line.shipping_request_number,
        time_shipped: line.time_shipped,
        time_received: line.time_received,
        progress_status: line.progress_status.clone(),
        ..SharedLineDetail::default()
    }
}

impl SharedProgressReport {
    /// Merge `update` into the report.
    ///
    /// For each line named by the update the status entry is appended (unless
    /// it repeats the last entry) and the fields owned by the update's mode
    /// are overwritten. Lines not named are left untouched. Returns the number
    /// of lines the update matched.
    pub fn apply(&mut self, update: &ProgressUpdate) -> usize {
        let mut matched = 0;
        for line in &mut self.line_items {
            let Some(progress) = update.lines.get(&line.line_number) else {
                continue;
            };
            matched += 1;
            line.record(&update.entry);
            match update.mode {
                ProgressMode::DistributorAccepts => {
                    line.assigned_to = progress.assigned_to.clone();
                }
                ProgressMode::ItemShipped => {
                    line.material_certificate = progress.material_certificate.clone();
                    line.time_shipped = progress.time_shipped;
                    line.iot_tracking_code = progress.iot_tracking_code.clone();
                    line.shipping_request_number = progress.shipping_request_number;
                }
                ProgressMode::Delivered => {
                    line.time_received = progress.time_received;
                    line.iot_properties = progress.iot_properties.clone();
                }
                ProgressMode::ManufacturerAcknowledge => {}
            }
        }
        tracing::debug!(po_id = %self.po_id, mode = ?update.mode, matched, "shared progress merged");
        matched
    }

    /// The shared detail of one line, looked up by order and line number.
    pub fn line(&self, po_number: u32, line_number: u32) -> Option<&SharedLineDetail> {
        self.line_items
            .iter()
            .find(|l| l.po_number == po_number && l.line_number == line_number)
    }
}
