use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Dealer,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dealer {
    pub id: String,
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub store_name: String,
    pub gstn: String,
    pub location: String,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub new_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    // Opaque object-storage key, never a public URL. Resolved at read time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_features: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_to_use: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product: String,
    pub quantity: i32,
}

// One cart per user, one line per product. Quantities merge on repeat adds
// and never sit at zero: a line at quantity 1 is removed on decrement.
#[derive(Debug, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub user: String,
    pub products: Vec<LineItem>,
}

impl Cart {
    pub fn new(user: &str, product_id: &str, quantity: i32) -> Self {
        Cart {
            id: Uuid::new_v4().to_string(),
            user: user.to_string(),
            products: vec![LineItem {
                product: product_id.to_string(),
                quantity,
            }],
        }
    }

    pub fn add_item(&mut self, product_id: &str, quantity: i32) {
        if let Some(item) = self.products.iter_mut().find(|i| i.product == product_id) {
            item.quantity += quantity;
        } else {
            self.products.push(LineItem {
                product: product_id.to_string(),
                quantity,
            });
        }
    }

    // Removing a product that is not in the cart is a silent no-op.
    pub fn remove_item(&mut self, product_id: &str) {
        self.products.retain(|i| i.product != product_id);
    }

    // Returns false when the product is not in the cart.
    pub fn decrement_item(&mut self, product_id: &str) -> bool {
        let index = match self.products.iter().position(|i| i.product == product_id) {
            Some(index) => index,
            None => return false,
        };
        if self.products[index].quantity > 1 {
            self.products[index].quantity -= 1;
        } else {
            self.products.remove(index);
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Placed,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user: String,
    pub products: Vec<LineItem>,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    // Snapshots the cart's line items verbatim at placement time.
    pub fn from_cart(user: &str, items: Vec<LineItem>) -> Self {
        Order {
            id: Uuid::new_v4().to_string(),
            user: user.to_string(),
            products: items,
            order_status: OrderStatus::Open,
            created_at: Utc::now(),
        }
    }

    // Returns false when the product is not in the order.
    pub fn increase_item(&mut self, product_id: &str) -> bool {
        match self.products.iter_mut().find(|i| i.product == product_id) {
            Some(item) => {
                item.quantity += 1;
                true
            }
            None => false,
        }
    }

    // Order lines are pinned at a minimum of 1; unlike the cart, a line is
    // never removed by decreasing it.
    pub fn decrease_item(&mut self, product_id: &str) -> bool {
        match self.products.iter_mut().find(|i| i.product == product_id) {
            Some(item) => {
                if item.quantity > 1 {
                    item.quantity -= 1;
                }
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: String,
    pub product: String,
    pub user: String,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Request payloads. Validated fields stay Options so the handlers can answer
// with the API's own messages instead of a deserializer error.

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerRegisterInput {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub email: Option<String>,
    pub store_name: Option<String>,
    pub gstn: Option<String>,
    pub location: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DealerLoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartInput {
    pub product_id: String,
    pub quantity: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RateInput {
    pub rating: Option<i32>,
    pub review: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart_with(items: &[(&str, i32)]) -> Cart {
        Cart {
            id: "cart-1".into(),
            user: "user-1".into(),
            products: items
                .iter()
                .map(|(product, quantity)| LineItem {
                    product: product.to_string(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn repeat_adds_merge_into_one_line() {
        let mut cart = Cart::new("user-1", "p1", 2);
        cart.add_item("p1", 3);

        assert_eq!(cart.products.len(), 1);
        assert_eq!(cart.products[0].product, "p1");
        assert_eq!(cart.products[0].quantity, 5);
    }

    #[test]
    fn adding_a_different_product_appends_a_line() {
        let mut cart = Cart::new("user-1", "p1", 1);
        cart.add_item("p2", 4);

        assert_eq!(cart.products.len(), 2);
        assert_eq!(cart.products[1].product, "p2");
        assert_eq!(cart.products[1].quantity, 4);
    }

    #[test]
    fn decrement_above_one_keeps_the_line() {
        let mut cart = cart_with(&[("p1", 2)]);
        assert!(cart.decrement_item("p1"));
        assert_eq!(cart.products[0].quantity, 1);
    }

    #[test]
    fn decrement_at_one_removes_the_line() {
        let mut cart = cart_with(&[("p1", 1), ("p2", 3)]);
        assert!(cart.decrement_item("p1"));
        assert_eq!(cart.products.len(), 1);
        assert_eq!(cart.products[0].product, "p2");
    }

    #[test]
    fn decrement_of_a_missing_product_reports_false() {
        let mut cart = cart_with(&[("p1", 1)]);
        assert!(!cart.decrement_item("p9"));
        assert_eq!(cart.products.len(), 1);
    }

    #[test]
    fn remove_drops_the_line_and_ignores_missing_products() {
        let mut cart = cart_with(&[("p1", 2), ("p2", 1)]);
        cart.remove_item("p1");
        assert_eq!(cart.products.len(), 1);

        // unknown product: unchanged
        cart.remove_item("p9");
        assert_eq!(cart.products.len(), 1);
        assert_eq!(cart.products[0].product, "p2");
    }

    #[test]
    fn order_snapshots_cart_lines_verbatim() {
        let cart = cart_with(&[("p1", 2), ("p2", 1)]);
        let order = Order::from_cart(&cart.user, cart.products.clone());

        assert_eq!(order.user, "user-1");
        assert_eq!(order.order_status, OrderStatus::Open);
        assert_eq!(order.products.len(), 2);
        assert_eq!(order.products[0].product, "p1");
        assert_eq!(order.products[0].quantity, 2);
        assert_eq!(order.products[1].product, "p2");
        assert_eq!(order.products[1].quantity, 1);
    }

    #[test]
    fn order_decrease_never_goes_below_one() {
        let cart = cart_with(&[("p1", 2)]);
        let mut order = Order::from_cart("user-1", cart.products);

        assert!(order.decrease_item("p1"));
        assert_eq!(order.products[0].quantity, 1);

        // at 1 the line stays, still at 1
        assert!(order.decrease_item("p1"));
        assert_eq!(order.products.len(), 1);
        assert_eq!(order.products[0].quantity, 1);
    }

    #[test]
    fn order_mutations_of_missing_products_report_false() {
        let mut order = Order::from_cart("user-1", vec![]);
        assert!(!order.increase_item("p1"));
        assert!(!order.decrease_item("p1"));
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Dealer).unwrap(), "\"dealer\"");
        assert_eq!(serde_json::from_str::<Role>("\"user\"").unwrap(), Role::User);
    }

    #[test]
    fn order_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Placed).unwrap(),
            "\"placed\""
        );
    }
}
