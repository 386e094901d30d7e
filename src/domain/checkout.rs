use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedFile {
    pub file_id: String,
    pub name: String,
    pub price_minor: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub order_id: String,
    /// 2-decimal string on the wire, e.g. "500.00".
    pub amount: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub customer_city: Option<String>,
    #[serde(default)]
    pub customer_postcode: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub package_name: Option<String>,
    #[serde(default)]
    pub files: Vec<PurchasedFile>,
    #[serde(default)]
    pub new_window: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectMode {
    SameWindow,
    NewWindow,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub transaction_id: String,
    pub merchant_transaction_id: String,
    pub redirect_url: String,
    pub redirect_mode: RedirectMode,
}
