use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem, OrderStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub shipping_address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: i32,
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    pub status: Option<OrderStatus>,
    pub shipping_address: String,
    pub currency_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    #[schema(value_type = Option<String>)]
    pub total_amount: Option<Decimal>,
    pub status: Option<OrderStatus>,
    pub shipping_address: Option<String>,
    pub currency_id: Option<i32>,
    /// Detaches the row from its currency; cannot be combined with `currency_id`.
    #[serde(default)]
    pub clear_currency: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Order>)]
    pub items: Vec<Order>,
}
