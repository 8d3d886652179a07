use serde::{Deserialize, Serialize};

/// One telemetry sample reported by a tracking device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IotProperty {
    pub tracking_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub humidity: f64,
    pub accelerometer: f64,
    pub temperature: f64,
    pub timestamp: i64,
}
