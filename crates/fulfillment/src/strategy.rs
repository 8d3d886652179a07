//! Per-organization behaviour, resolved once per invocation.

use materialtrace_auth::Role;

use crate::partition::Partition;

/// Where a shipment or telemetry sample is recorded first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentOrigin {
    /// Distributor ships from stock; its lines live in the customer partition.
    Distributor,
    /// A manufacturer ships its share; its lines live in its pricing partition.
    Manufacturer(Partition),
}

/// What an organization's role means for routing reads and writes.
pub trait RoleStrategy: Send + Sync {
    fn role(&self) -> Role;

    /// Pricing partition listing the caller's open order requests.
    fn pricing_partition(&self) -> Option<Partition> {
        Partition::pricing_for(self.role())
    }

    /// Where the caller's shipments and IOT samples land.
    fn shipment_origin(&self) -> Option<ShipmentOrigin> {
        None
    }

    /// Certificate partition the caller writes to.
    fn certificate_partition(&self) -> Option<Partition> {
        None
    }

    /// Certificate partition the caller lists.
    fn certificate_listing(&self) -> Option<Partition> {
        self.certificate_partition()
    }
}

#[derive(Debug)]
struct CustomerStrategy;

#[derive(Debug)]
struct DistributorStrategy;

#[derive(Debug)]
struct ManufacturerStrategy {
    role: Role,
    pricing: Partition,
    certificates: Partition,
}

#[derive(Debug)]
struct LogisticsStrategy;

impl RoleStrategy for CustomerStrategy {
    fn role(&self) -> Role {
        Role::Customer
    }
}

impl RoleStrategy for DistributorStrategy {
    fn role(&self) -> Role {
        Role::Distributor
    }

    fn shipment_origin(&self) -> Option<ShipmentOrigin> {
        Some(ShipmentOrigin::Distributor)
    }

    fn certificate_listing(&self) -> Option<Partition> {
        Some(Partition::MtrManufacturer1)
    }
}

impl RoleStrategy for ManufacturerStrategy {
    fn role(&self) -> Role {
        self.role
    }

    fn shipment_origin(&self) -> Option<ShipmentOrigin> {
        Some(ShipmentOrigin::Manufacturer(self.pricing))
    }

    fn certificate_partition(&self) -> Option<Partition> {
        Some(self.certificates)
    }
}

impl RoleStrategy for LogisticsStrategy {
    fn role(&self) -> Role {
        Role::Logistics
    }
}

static CUSTOMER: CustomerStrategy = CustomerStrategy;
static DISTRIBUTOR: DistributorStrategy = DistributorStrategy;
static MANUFACTURER1: ManufacturerStrategy = ManufacturerStrategy {
    role: Role::Manufacturer1,
    pricing: Partition::DistributorManufacturer1,
    certificates: Partition::MtrManufacturer1,
};
static MANUFACTURER2: ManufacturerStrategy = ManufacturerStrategy {
    role: Role::Manufacturer2,
    pricing: Partition::DistributorManufacturer2,
    certificates: Partition::MtrManufacturer2,
};
static LOGISTICS: LogisticsStrategy = LogisticsStrategy;

/// Strategy table lookup.
pub fn strategy_for(role: Role) -> &'static dyn RoleStrategy {
    match role {
        Role::Customer => &CUSTOMER,
        Role::Distributor => &DISTRIBUTOR,
        Role::Manufacturer1 => &MANUFACTURER1,
        Role::Manufacturer2 => &MANUFACTURER2,
        Role::Logistics => &LOGISTICS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_resolves_to_itself() {
        for role in Role::ALL {
            assert_eq!(strategy_for(role).role(), role);
        }
    }

    #[test]
    fn manufacturers_ship_from_their_own_pricing_partition() {
        assert_eq!(
            strategy_for(Role::Manufacturer2).shipment_origin(),
            Some(ShipmentOrigin::Manufacturer(Partition::DistributorManufacturer2))
        );
        assert_eq!(
            strategy_for(Role::Distributor).shipment_origin(),
            Some(ShipmentOrigin::Distributor)
        );
        assert_eq!(strategy_for(Role::Logistics).shipment_origin(), None);
    }

    #[test]
    fn certificate_listing_follows_the_caller() {
        assert_eq!(strategy_for(Role::Manufacturer2).certificate_listing(), Some(Partition::MtrManufacturer2));
        assert_eq!(strategy_for(Role::Manufacturer1).certificate_listing(), Some(Partition::MtrManufacturer1));
        assert_eq!(strategy_for(Role::Distributor).certificate_listing(), Some(Partition::MtrManufacturer1));
        assert_eq!(strategy_for(Role::Distributor).certificate_partition(), None);
        assert_eq!(strategy_for(Role::Customer).pricing_partition(), None);
    }
}
