//! Sample orders used to initialize an empty ledger.

use materialtrace_core::{DomainResult, PoId};

use crate::model::{Company, LineItem, PurchaseOrder};

pub const DEFAULT_SEED_COMPANY: &str = "Element Energy";

const EXPECTED_DELIVERY: &str = "2019-02-28";
const UTILITY_SITE_ID: &str = "73a2e705-6e72-474d-9027-994f52ed2576";

/// The two sample orders (10001 and 10002), owned by `company`.
pub fn seed_orders(created_time_stamp: i64, company: &str) -> DomainResult<Vec<PurchaseOrder>> {
    let chicago_site = site(company, UTILITY_SITE_ID, "1 North Wacker", "Chicago", "IL", "60606", (41.8818, -87.6231));
    let new_york_site = site(company, "", "300 Madison", "New York", "NY", "10017", (40.440624, -79.995888));

    let first = PurchaseOrder {
        po_id: PoId::new("b0c00193-9dca-444f-9d1e-c3712307d5f1")?,
        po_number: 10001,
        expected_delivery_date: EXPECTED_DELIVERY.to_string(),
        created_time_stamp,
        owner: Company {
            company_id: "c-0001".to_string(),
            company_type: "customer".to_string(),
            state: "Il".to_string(),
            ..chicago_site.clone()
        },
        issued_to: distributor("c-44401"),
        line_items: vec![
            line(10001, 1, "12010", "Pipe 20in x 40ft", "project1", 3, 99.99, &chicago_site),
            line(10001, 2, "12012", "Pipe 22in x 40ft", "project1", 1, 199.99, &chicago_site),
        ],
        ..PurchaseOrder::default()
    };

    let second = PurchaseOrder {
        po_id: PoId::new("f9e7f1cd-595d-4be1-99b6-3e928366fe08")?,
        po_number: 10002,
        expected_delivery_date: EXPECTED_DELIVERY.to_string(),
        created_time_stamp,
        owner: Company {
            company_id: UTILITY_SITE_ID.to_string(),
            company_type: "customer".to_string(),
            city: "New York,".to_string(),
            latitude: 41.8818,
            longitude: -87.6231,
            ..new_york_site.clone()
        },
        issued_to: distributor("69559c68-f7c8-453e-a608-aebf589fc430"),
        line_items: vec![
            line(10002, 1, "13011", "Pipe 10in x 40ft", "project2", 3, 99.99, &new_york_site),
            line(
                10002,
                2,
                "14015",
                "Pipe 12in x 40ft",
                "project2",
                1,
                399.99,
                &Company {
                    company_id: "c-44401".to_string(),
                    ..new_york_site.clone()
                },
            ),
        ],
        ..PurchaseOrder::default()
    };

    Ok(vec![first, second])
}

fn site(name: &str, id: &str, street: &str, city: &str, state: &str, zip: &str, (lat, lon): (f64, f64)) -> Company {
    Company {
        company_id: id.to_string(),
        company_type: "utility".to_string(),
        name: name.to_string(),
        street_address: street.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        zipcode: zip.to_string(),
        latitude: lat,
        longitude: lon,
    }
}

fn distributor(id: &str) -> Company {
    Company {
        company_id: id.to_string(),
        company_type: "distributor".to_string(),
        name: "Distributor Inc.".to_string(),
        street_address: "600 Grant Street".to_string(),
        city: "Pittsburgh".to_string(),
        state: "PA".to_string(),
        zipcode: "15219".to_string(),
        latitude: 40.440624,
        longitude: -79.995888,
    }
}

#[allow(clippy::too_many_arguments)]
fn line(
    po_number: u32,
    line_number: u32,
    material_id: &str,
    description: &str,
    project_id: &str,
    quantity: u32,
    unit_price: f64,
    ship_to: &Company,
) -> LineItem {
    LineItem {
        po_number,
        line_number,
        material_id: material_id.to_string(),
        description: description.to_string(),
        project_id: project_id.to_string(),
        quantity,
        unit_price,
        ship_to_location: ship_to.clone(),
        ..LineItem::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_orders_with_two_lines_each() {
        let orders = seed_orders(1_550_000_000, DEFAULT_SEED_COMPANY).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].po_number, 10001);
        assert_eq!(orders[1].po_number, 10002);
        assert!(orders.iter().all(|o| o.line_items.len() == 2));
        assert_eq!(orders[0].line_items[0].ship_to_location.name, "Element Energy");
        assert_eq!(orders[1].line_items[1].ship_to_location.company_id, "c-44401");
    }

    #[test]
    fn company_name_is_configurable() {
        let orders = seed_orders(1, "Acme Power").unwrap();
        assert_eq!(orders[0].owner.name, "Acme Power");
        assert_eq!(orders[1].created_time_stamp, 1);
    }
}
