use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub customer_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub order_date: OffsetDateTime,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}
