use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::order_status::OrderStatus;

/// One order document as stored by the backend. Field names follow the
/// store's camelCase schema; coordinates are stringified decimal degrees and
/// must be parsed before use (`utils::parse_point`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub restaurant_address: String,
    pub user_first_name: String,
    pub user_last_name: String,
    pub user_address: String,
    pub user_latitude: String,
    pub user_longitude: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn customer_name(&self) -> String {
        format!("{} {}", self.user_first_name, self.user_last_name)
    }
}

impl Eq for OrderRecord {}

impl PartialEq for OrderRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// One restaurant document; looked up once per session for its coordinate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRecord {
    pub id: String,
    pub restaurant_name: String,
    pub restaurant_address: String,
    pub restaurant_latitude: String,
    pub restaurant_longitude: String,
}

/// One dish document from the menu collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishRecord {
    pub id: String,
    pub name: String,
}

/// One line item linking an order to a dish. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRecord {
    pub order_id: String,
    pub dish_id: String,
    pub quantity: u32,
}

/// A resolved line item ready for display. Transient UI state, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishDisplay {
    pub name: String,
    pub line: String,
}

impl DishDisplay {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        let name = name.into();
        let line = format!("{} x {}", name, quantity);
        Self { name, line }
    }
}
