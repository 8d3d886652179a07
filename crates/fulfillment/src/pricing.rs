//! Discount-based repricing and quantity splitting at acceptance.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use materialtrace_auth::Role;
use materialtrace_core::{DomainError, DomainResult};

use crate::model::LineItem;

/// Assignment value meaning "fulfilled by the distributor from stock".
pub const INVENTORY: &str = "Inventory";

/// Percentage discount a manufacturer grants the distributor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManufacturerDiscount {
    pub name: String,
    pub discount: i32,
}

/// Manufacturer discounts keyed by lower-cased organization name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountTable {
    by_name: HashMap<String, ManufacturerDiscount>,
}

impl DiscountTable {
    /// Build the table; fewer than `min_entries` discounts, or a discount
    /// outside 0..=100 percent, is a validation error.
    pub fn new(discounts: Vec<ManufacturerDiscount>, min_entries: usize) -> DomainResult<Self> {
        if discounts.len() < min_entries {
            return Err(DomainError::validation(format!(
                "At least {min_entries} manufacturer discount objects expected."
            )));
        }
        if let Some(bad) = discounts.iter().find(|d| !(0..=100).contains(&d.discount)) {
            return Err(DomainError::validation(format!(
                "Discount for {} must be between 0 and 100, got {}",
                bad.name, bad.discount
            )));
        }
        let by_name = discounts
            .into_iter()
            .map(|d| (d.name.trim().to_lowercase(), d))
            .collect();
        Ok(Self { by_name })
    }

    /// Usable discount for a manufacturer. A zero discount counts as missing.
    pub fn for_manufacturer(&self, manufacturer: Role) -> Option<i32> {
        self.by_name
            .get(&manufacturer.organization_name().to_lowercase())
            .map(|d| d.discount)
            .filter(|d| *d != 0)
    }
}

/// `quantity * unit_price`, rounded to a whole currency unit.
pub fn subtotal(quantity: u32, unit_price: f64) -> f64 {
    (f64::from(quantity) * unit_price).round()
}

/// `unit_price - discount% * unit_price`, rounded.
pub fn discounted_price(unit_price: f64, discount_percent: i32) -> f64 {
    (unit_price - f64::from(discount_percent) / 100.0 * unit_price).round()
}

/// Who a line is assigned to, as written by the distributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Inventory,
    Manufacturer(Role),
}

impl Assignment {
    /// `""` and `"inventory"` mean stock; otherwise a manufacturer name.
    pub fn parse(assigned_to: &str) -> DomainResult<Self> {
        let trimmed = assigned_to.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(INVENTORY) {
            return Ok(Assignment::Inventory);
        }
        match Role::from_organization_name(trimmed) {
            Some(role) if role.is_manufacturer() => Ok(Assignment::Manufacturer(role)),
            _ => Err(DomainError::validation(format!(
                "Unknown manufacturer assignment: {assigned_to}"
            ))),
        }
    }

    /// Value recorded as `assignedTo` on shared progress.
    pub fn label(self) -> &'static str {
        match self {
            Assignment::Inventory => INVENTORY,
            Assignment::Manufacturer(role) => role.organization_name(),
        }
    }
}

/// One fulfiller's part of a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitShare {
    pub fulfiller: Role,
    pub quantity: u32,
    pub unit_price: f64,
}

impl SplitShare {
    pub fn subtotal(&self) -> f64 {
        subtotal(self.quantity, self.unit_price)
    }
}

/// How a line's quantity is divided between fulfillers.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSplit {
    pub assignment: Assignment,
    pub shares: Vec<SplitShare>,
}

impl LineSplit {
    pub fn total_quantity(&self) -> u32 {
        self.shares.iter().map(|s| s.quantity).sum()
    }

    pub fn is_split(&self) -> bool {
        self.shares.len() > 1
    }
}

/// Decide the split for one line.
///
/// `stored` is the customer's line (quantity and price are taken from it);
/// `update` carries the distributor's decision (`assignedTo`, `assignedQty`).
/// A manufacturer receives `assignedQty` at its discounted price, and any
/// remainder stays with the distributor at the original price. An
/// `assignedQty` of zero hands the whole line to the manufacturer.
pub fn plan_split(stored: &LineItem, update: &LineItem, discounts: &DiscountTable) -> DomainResult<LineSplit> {
    let assignment = Assignment::parse(&update.assigned_to)?;
    let quantity = stored.quantity;

    let manufacturer = match assignment {
        Assignment::Inventory => {
            let shares = distributor_share(quantity, stored.unit_price).into_iter().collect();
            return Ok(LineSplit { assignment, shares });
        }
        Assignment::Manufacturer(role) => role,
    };

    let discount = discounts.for_manufacturer(manufacturer).ok_or_else(|| {
        DomainError::validation(format!(
            "Manufacturer discount missing for {}",
            update.assigned_to
        ))
    })?;

    if update.assigned_qty > quantity {
        return Err(DomainError::validation(format!(
            "line {}: assigned quantity {} exceeds ordered quantity {quantity}",
            stored.line_number, update.assigned_qty
        )));
    }
    let assigned = match update.assigned_qty {
        0 => quantity,
        n => n,
    };

    let mut shares: Vec<SplitShare> = distributor_share(quantity - assigned, stored.unit_price)
        .into_iter()
        .collect();
    shares.push(SplitShare {
        fulfiller: manufacturer,
        quantity: assigned,
        unit_price: discounted_price(stored.unit_price, discount),
    });

    Ok(LineSplit { assignment, shares })
}

fn distributor_share(quantity: u32, unit_price: f64) -> Option<SplitShare> {
    (quantity > 0).then_some(SplitShare {
        fulfiller: Role::Distributor,
        quantity,
        unit_price,
    })
}
