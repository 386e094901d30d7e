use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: String,
    pub item_name: String,
    pub category: Option<String>,
    pub quantity: u32,
    pub price_minor: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub transaction_id: String,
    pub value_minor: i64,
    pub currency: String,
    pub items: Vec<LineItem>,
    pub recorded_at: DateTime<Utc>,
}
