use serde::Deserialize;

/// Body for create and update; the full record is returned on the way out.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
}
