//! Wire records shared by every organization.
//!
//! Field names and nesting are part of the cross-organization contract, so
//! every record is `camelCase` on the wire and tolerates missing fields.
//! Arrays written as `null` by older clients read back as empty.

mod certificate;
mod company;
mod iot;
mod order;
mod partitions;
mod results;

pub use certificate::{MaterialCertificate, Mtr};
pub use company::Company;
pub use iot::IotProperty;
pub use order::{LineItem, OrderRequest, PurchaseOrder};
pub use partitions::{
    CustomerLineItems, LineItemPricing, PricingDetails, SharedLineDetail, SharedProgressReport,
    ShippingLineItem, ShippingPrivateDetails,
};
pub use results::{
    FieldOperatorReport, GoodReceipt, KeyedRecord, PmView, PricingResults, ShippingRequestsResults,
};

use serde::{Deserialize, Deserializer};

/// Read `null` as the type's default.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
