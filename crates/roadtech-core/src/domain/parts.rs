use serde::{Deserialize, Serialize};

/// A spare part in a provider's inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: i64,
    pub provider_id: i64,
    pub shop_name: String,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub stock: u32,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
}

/// A parts shop, discoverable by proximity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartsProvider {
    pub id: i64,
    pub shop_name: String,
    pub address: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_open: bool,
    pub rating: Option<f64>,
    pub opening_time: Option<String>,
    pub closing_time: Option<String>,
}
