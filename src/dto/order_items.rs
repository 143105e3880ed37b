use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::OrderItem;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderItemRequest {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    /// Defaults to the product's current price.
    #[schema(value_type = Option<String>)]
    pub price_at_purchase: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderItemRequest {
    pub quantity: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price_at_purchase: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderItemList {
    #[schema(value_type = Vec<OrderItem>)]
    pub items: Vec<OrderItem>,
}
