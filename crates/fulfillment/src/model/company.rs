use serde::{Deserialize, Serialize};

/// Static reference entity: a party or site with a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Company {
    pub company_id: String,
    pub company_type: String,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub zipcode: String,
    pub state: String,
    pub latitude: f64,
    pub longitude: f64,
}
