//! Cart lines as returned by `GET /api/cart`.

use grayshop_core::{CartLineId, Price, ProductId};
use serde::{Deserialize, Serialize};

use super::Product;

/// One product-quantity pairing in the shopper's cart.
///
/// The backend keeps one line per product per user, but nothing here relies
/// on that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "ID")]
    pub id: CartLineId,
    pub stock_id: ProductId,
    pub quantity: u32,
    /// The referenced product, preloaded by the server.
    pub stock: Product,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.stock.price.times(self.quantity)
    }

    /// Whether the line asks for more units than are in stock.
    #[must_use]
    pub fn exceeds_inventory(&self) -> bool {
        self.stock
            .inventory
            .is_some_and(|inventory| self.quantity > inventory)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(quantity: u32, inventory: Option<u32>) -> CartLine {
        CartLine {
            id: CartLineId::new(1),
            stock_id: ProductId::new(9),
            quantity,
            stock: Product {
                id: ProductId::new(9),
                name: "A".to_string(),
                category: String::new(),
                price: Price::from_minor(10000),
                inventory,
                description: String::new(),
                picture: String::new(),
                last_update: None,
            },
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(2, None).line_total(), Price::from_minor(20000));
    }

    #[test]
    fn test_exceeds_inventory() {
        assert!(line(3, Some(2)).exceeds_inventory());
        assert!(!line(2, Some(2)).exceeds_inventory());
        assert!(!line(99, None).exceeds_inventory());
    }

    #[test]
    fn test_deserialize_with_embedded_user_and_stock() {
        let json = r#"{
            "ID": 12, "user_id": 1, "stock_id": 4, "quantity": 2,
            "user": {"ID": 0, "username": ""},
            "stock": {"ID": 4, "name": "保温杯", "price": 8900, "inventory": 76}
        }"#;
        let line: CartLine = serde_json::from_str(json).unwrap();
        assert_eq!(line.id, CartLineId::new(12));
        assert_eq!(line.quantity, 2);
        assert_eq!(line.stock.name, "保温杯");
    }
}
