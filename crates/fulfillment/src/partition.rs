use serde::{Deserialize, Serialize};

use materialtrace_auth::Role;

/// A role-scoped collection of order data.
///
/// Each partition is visible only to the organizations that share it, and
/// holds at most one record per purchase order (certificate partitions are
/// keyed by tracking id instead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Partition {
    #[serde(rename = "collectionCustomerLineItems")]
    CustomerLineItems,
    #[serde(rename = "collectionCustomerDistributor")]
    CustomerDistributor,
    #[serde(rename = "collectionDistributorManufacturer1")]
    DistributorManufacturer1,
    #[serde(rename = "collectionDistributorManufacturer2")]
    DistributorManufacturer2,
    #[serde(rename = "collectionLogistics")]
    Logistics,
    #[serde(rename = "collectionMtrManufacturer1")]
    MtrManufacturer1,
    #[serde(rename = "collectionMtrManufacturer2")]
    MtrManufacturer2,
    #[serde(rename = "collectionGeneralProgress")]
    GeneralProgress,
}

impl Partition {
    pub const ALL: [Partition; 8] = [
        Partition::CustomerLineItems,
        Partition::CustomerDistributor,
        Partition::DistributorManufacturer1,
        Partition::DistributorManufacturer2,
        Partition::Logistics,
        Partition::MtrManufacturer1,
        Partition::MtrManufacturer2,
        Partition::GeneralProgress,
    ];

    pub fn collection_name(self) -> &'static str {
        match self {
            Partition::CustomerLineItems => "collectionCustomerLineItems",
            Partition::CustomerDistributor => "collectionCustomerDistributor",
            Partition::DistributorManufacturer1 => "collectionDistributorManufacturer1",
            Partition::DistributorManufacturer2 => "collectionDistributorManufacturer2",
            Partition::Logistics => "collectionLogistics",
            Partition::MtrManufacturer1 => "collectionMtrManufacturer1",
            Partition::MtrManufacturer2 => "collectionMtrManufacturer2",
            Partition::GeneralProgress => "collectionGeneralProgress",
        }
    }

    pub fn from_collection_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.collection_name().eq_ignore_ascii_case(name.trim()))
    }

    /// Pricing partition holding the lines a fulfiller is responsible for.
    pub fn pricing_for(fulfiller: Role) -> Option<Self> {
        match fulfiller {
            Role::Distributor => Some(Partition::CustomerDistributor),
            Role::Manufacturer1 => Some(Partition::DistributorManufacturer1),
            Role::Manufacturer2 => Some(Partition::DistributorManufacturer2),
            Role::Customer | Role::Logistics => None,
        }
    }

    /// The organization whose share of the order a pricing partition holds.
    pub fn fulfiller(self) -> Option<Role> {
        match self {
            Partition::CustomerDistributor => Some(Role::Distributor),
            Partition::DistributorManufacturer1 => Some(Role::Manufacturer1),
            Partition::DistributorManufacturer2 => Some(Role::Manufacturer2),
            _ => None,
        }
    }

    /// Organizations allowed to read the partition.
    pub fn members(self) -> &'static [Role] {
        match self {
            Partition::CustomerLineItems | Partition::CustomerDistributor => {
                &[Role::Customer, Role::Distributor]
            }
            Partition::DistributorManufacturer1 | Partition::MtrManufacturer1 => {
                &[Role::Distributor, Role::Manufacturer1]
            }
            Partition::DistributorManufacturer2 | Partition::MtrManufacturer2 => {
                &[Role::Distributor, Role::Manufacturer2]
            }
            Partition::Logistics | Partition::GeneralProgress => &Role::ALL,
        }
    }

    pub fn is_visible_to(self, role: Role) -> bool {
        self.members().contains(&role)
    }

    pub fn is_certificate_store(self) -> bool {
        matches!(self, Partition::MtrManufacturer1 | Partition::MtrManufacturer2)
    }
}

impl core::fmt::Display for Partition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.collection_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_round_trip() {
        for p in Partition::ALL {
            assert_eq!(Partition::from_collection_name(p.collection_name()), Some(p));
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.collection_name()));
        }
        assert_eq!(Partition::from_collection_name("collectionWarehouse"), None);
    }

    #[test]
    fn manufacturers_cannot_see_each_other() {
        assert!(Partition::DistributorManufacturer1.is_visible_to(Role::Manufacturer1));
        assert!(!Partition::DistributorManufacturer1.is_visible_to(Role::Manufacturer2));
        assert!(!Partition::CustomerDistributor.is_visible_to(Role::Logistics));
        assert!(Partition::GeneralProgress.is_visible_to(Role::Logistics));
    }

    #[test]
    fn pricing_partitions_know_their_fulfiller() {
        for role in [Role::Distributor, Role::Manufacturer1, Role::Manufacturer2] {
            let p = Partition::pricing_for(role).unwrap();
            assert_eq!(p.fulfiller(), Some(role));
        }
        assert_eq!(Partition::pricing_for(Role::Logistics), None);
    }
}
