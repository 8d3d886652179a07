use serde::{Deserialize, Serialize};

use crate::authorize::AuthzError;

/// One of the five organizations taking part in an order.
///
/// Each organization authenticates with a membership service provider id
/// (`org1msp` ... `org5msp`) and is shown to other parties under a fixed
/// organization name. Both mappings are part of the stored data: progress
/// entries carry organization names, and manufacturer assignments on line
/// items are matched against them case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Distributor,
    Manufacturer1,
    Manufacturer2,
    Logistics,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Customer,
        Role::Distributor,
        Role::Manufacturer1,
        Role::Manufacturer2,
        Role::Logistics,
    ];

    pub const MANUFACTURERS: [Role; 2] = [Role::Manufacturer1, Role::Manufacturer2];

    pub fn msp_id(self) -> &'static str {
        match self {
            Role::Customer => "org1msp",
            Role::Distributor => "org2msp",
            Role::Manufacturer1 => "org3msp",
            Role::Manufacturer2 => "org4msp",
            Role::Logistics => "org5msp",
        }
    }

    /// Display name used in progress entries and assignments.
    pub fn organization_name(self) -> &'static str {
        match self {
            Role::Customer => "Utility",
            Role::Distributor => "Distributor",
            Role::Manufacturer1 => "Manufacturer 1",
            Role::Manufacturer2 => "Manufacturer 2",
            Role::Logistics => "Logistics",
        }
    }

    pub fn is_manufacturer(self) -> bool {
        matches!(self, Role::Manufacturer1 | Role::Manufacturer2)
    }

    /// Resolve an authenticated MSP id (case-insensitive).
    pub fn from_msp_id(msp_id: &str) -> Result<Self, AuthzError> {
        Self::ALL
            .into_iter()
            .find(|r| r.msp_id().eq_ignore_ascii_case(msp_id.trim()))
            .ok_or_else(|| AuthzError::UnknownOrganization(msp_id.to_string()))
    }

    /// Resolve an organization name as written by clients ("manufacturer 1").
    pub fn from_organization_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.organization_name().eq_ignore_ascii_case(name.trim()))
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.organization_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msp_ids_resolve_case_insensitively() {
        assert_eq!(Role::from_msp_id("Org3MSP").unwrap(), Role::Manufacturer1);
        assert_eq!(Role::from_msp_id("org5msp").unwrap(), Role::Logistics);
    }

    #[test]
    fn unknown_msp_is_an_error() {
        match Role::from_msp_id("org9msp").unwrap_err() {
            AuthzError::UnknownOrganization(id) => assert_eq!(id, "org9msp"),
            _ => panic!("Expected UnknownOrganization error"),
        }
    }

    #[test]
    fn organization_names_match_assignments() {
        assert_eq!(Role::from_organization_name("manufacturer 2"), Some(Role::Manufacturer2));
        assert_eq!(Role::from_organization_name("Inventory"), None);
        assert_eq!(Role::Customer.to_string(), "Utility");
    }
}
