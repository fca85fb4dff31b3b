//! Starter menu, tables and staff loaded at boot.
//!
//! Everything lives in memory; edits are lost on restart.

use kaori_core::{Catalog, Modifier, Product, StaffRole, Table, Variant};

use crate::auth::{hash_pin, StaffDirectory, StaffUser};
use crate::error::ApiError;

fn variant(id: &str, name: &str, price_adjustment: i64) -> Variant {
    Variant {
        id: id.to_string(),
        name: name.to_string(),
        price_adjustment,
    }
}

fn modifier(id: &str, name: &str, price: i64, max_qty: u32) -> Modifier {
    Modifier {
        id: id.to_string(),
        name: name.to_string(),
        price,
        max_qty,
    }
}

fn extra_shot() -> Modifier {
    modifier("mod-1", "Extra Shot", 8_000, 3)
}

fn vanilla_syrup() -> Modifier {
    modifier("mod-2", "Vanilla Syrup", 5_000, 2)
}

fn hot_iced(hot: &str, iced: &str) -> Vec<Variant> {
    vec![variant(hot, "Hot", 0), variant(iced, "Iced", 3_000)]
}

struct ProductSeed {
    id: &'static str,
    category_id: &'static str,
    name: &'static str,
    description: &'static str,
    base_price: i64,
    is_available: bool,
}

impl ProductSeed {
    fn build(self, variants: Vec<Variant>, modifiers: Vec<Modifier>) -> Product {
        Product {
            id: self.id.to_string(),
            category_id: self.category_id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            base_price: self.base_price,
            is_available: self.is_available,
            variants,
            modifiers,
        }
    }
}

const fn seed(
    id: &'static str,
    category_id: &'static str,
    name: &'static str,
    description: &'static str,
    base_price: i64,
) -> ProductSeed {
    ProductSeed {
        id,
        category_id,
        name,
        description,
        base_price,
        is_available: true,
    }
}

/// Coffee-shop menu: cat-1 Coffee, cat-2 Non-Coffee, cat-3 Food, cat-4 Dessert.
pub fn seed_catalog() -> Catalog {
    let products = vec![
        seed("prod-1", "cat-1", "Espresso", "Strong Italian coffee", 18_000).build(
            vec![
                variant("var-1", "Single Shot", 0),
                variant("var-2", "Double Shot", 8_000),
            ],
            vec![extra_shot()],
        ),
        seed("prod-2", "cat-1", "Americano", "Espresso with hot water", 22_000)
            .build(hot_iced("var-3", "var-4"), vec![extra_shot(), vanilla_syrup()]),
        seed("prod-3", "cat-1", "Cappuccino", "Espresso with steamed milk foam", 28_000).build(
            vec![
                variant("var-5", "Regular", 0),
                variant("var-6", "Large", 8_000),
            ],
            vec![extra_shot(), modifier("mod-3", "Oat Milk", 8_000, 1)],
        ),
        seed("prod-4", "cat-1", "Latte", "Smooth espresso with milk", 28_000).build(
            hot_iced("var-7", "var-8"),
            vec![vanilla_syrup(), modifier("mod-4", "Caramel Syrup", 5_000, 2)],
        ),
        seed("prod-5", "cat-2", "Matcha Latte", "Japanese green tea latte", 32_000)
            .build(hot_iced("var-9", "var-10"), vec![]),
        seed("prod-6", "cat-2", "Chocolate", "Rich hot chocolate", 25_000).build(
            hot_iced("var-11", "var-12"),
            vec![modifier("mod-5", "Whipped Cream", 5_000, 1)],
        ),
        seed("prod-7", "cat-3", "Croissant", "Buttery French pastry", 25_000).build(vec![], vec![]),
        seed("prod-8", "cat-3", "Sandwich", "Grilled cheese sandwich", 35_000).build(
            vec![
                variant("var-13", "Cheese", 0),
                variant("var-14", "Ham & Cheese", 10_000),
            ],
            vec![],
        ),
        seed("prod-9", "cat-4", "Cheesecake", "New York style cheesecake", 38_000)
            .build(vec![], vec![]),
        ProductSeed {
            is_available: false,
            ..seed("prod-10", "cat-4", "Brownies", "Chocolate fudge brownies", 28_000)
        }
        .build(vec![], vec![]),
    ];

    let tables = [(1, 2), (2, 4), (3, 4), (4, 6), (5, 2)]
        .into_iter()
        .map(|(number, capacity)| Table {
            id: format!("table-{number}"),
            number,
            capacity,
            qr_code: format!("QR{number:03}"),
        })
        .collect();

    Catalog::new(products, tables)
}

/// Demo accounts, one per role.
///
/// | email              | role        | PIN  |
/// |--------------------|-------------|------|
/// | admin@kaori.pos    | super_admin | 1234 |
/// | store@kaori.pos    | store_admin | 5678 |
/// | cashier@kaori.pos  | cashier     | 1111 |
/// | kitchen@kaori.pos  | kitchen     | 2222 |
pub fn seed_staff() -> Result<StaffDirectory, ApiError> {
    let accounts = [
        ("1", "admin@kaori.pos", "Admin", StaffRole::SuperAdmin, "1234"),
        ("2", "store@kaori.pos", "Store Manager", StaffRole::StoreAdmin, "5678"),
        ("3", "cashier@kaori.pos", "John Cashier", StaffRole::Cashier, "1111"),
        ("4", "kitchen@kaori.pos", "Chef Mike", StaffRole::Kitchen, "2222"),
    ];

    let users = accounts
        .into_iter()
        .map(|(digit, email, name, role, pin)| {
            Ok(StaffUser {
                id: uuid_of_digit(digit),
                email: email.to_string(),
                name: name.to_string(),
                role,
                store_id: None,
                pin_hash: hash_pin(pin)?,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    Ok(StaffDirectory::new(users))
}

/// `"3"` → `33333333-3333-3333-3333-333333333333`.
fn uuid_of_digit(digit: &str) -> String {
    [8, 4, 4, 4, 12]
        .iter()
        .map(|len| digit.repeat(*len))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalog() {
        let catalog = seed_catalog();
        assert_eq!(catalog.products().len(), 10);
        assert_eq!(catalog.tables().len(), 5);

        let espresso = catalog.product("prod-1").unwrap();
        assert_eq!(espresso.base_price, 18_000);
        assert_eq!(espresso.modifier("mod-1").unwrap().max_qty, 3);
        assert_eq!(
            catalog.product("prod-4").unwrap().variant("var-8").unwrap().price_adjustment,
            3_000
        );
        assert!(!catalog.product("prod-10").unwrap().is_available);

        let table = catalog.table("table-4").unwrap();
        assert_eq!((table.number, table.capacity), (4, 6));
        assert_eq!(table.qr_code, "QR004");
    }

    #[test]
    fn test_uuid_of_digit() {
        assert_eq!(
            uuid_of_digit("3"),
            "33333333-3333-3333-3333-333333333333"
        );
    }

    #[test]
    fn test_seed_staff() {
        let staff = seed_staff().unwrap();
        assert_eq!(staff.len(), 4);
        let kitchen = staff.verify_pin("kitchen@kaori.pos", "2222").unwrap();
        assert_eq!(kitchen.role, StaffRole::Kitchen);
        assert_eq!(kitchen.name, "Chef Mike");
    }
}
