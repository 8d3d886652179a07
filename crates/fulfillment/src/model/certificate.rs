use serde::{Deserialize, Serialize};

use materialtrace_core::TrackingId;

use super::nullable;

/// A name/value pair of a material test report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mtr {
    pub name: String,
    pub value: String,
}

/// A manufacturer's material certificate, stored under its tracking id.
///
/// Line items reference certificates by copying their `Mtr` pairs; the
/// certificate itself is owned by the issuing manufacturer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MaterialCertificate {
    #[serde(rename = "docType")]
    pub doc_type: String,
    pub tracking_id: TrackingId,
    pub material_group: String,
    #[serde(deserialize_with = "nullable")]
    pub data: Vec<Mtr>,
    #[serde(deserialize_with = "nullable")]
    pub referenced_by: Vec<String>,
}
