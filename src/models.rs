use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::{
        audit_logs, cart, cart_items, categories, currencies, inventory, order_items, orders,
        products, transaction_logs, users,
    },
    error::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(AppError::BadRequest(format!("Invalid role {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(AppError::BadRequest("Invalid order status".into())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Php,
    Usd,
    Krw,
}

impl CurrencyCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::Php => "PHP",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Krw => "KRW",
        }
    }

    /// The only symbol accepted for each code.
    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Php => "₱",
            CurrencyCode::Usd => "$",
            CurrencyCode::Krw => "₩",
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PHP" => Ok(CurrencyCode::Php),
            "USD" => Ok(CurrencyCode::Usd),
            "KRW" => Ok(CurrencyCode::Krw),
            _ => Err(AppError::BadRequest(format!("Unsupported currency {s}"))),
        }
    }
}

/// Public view of a user; the password hash never leaves the service layer.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            user_id: model.user_id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            address: model.address,
            phone_number: model.phone_number,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub category_id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            category_id: model.category_id,
            name: model.name,
            description: model.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub product_id: i32,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "999.99")]
    pub price: Decimal,
    pub category_id: i32,
    pub image_url: Option<String>,
    pub brand: Option<String>,
    pub currency_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            product_id: model.product_id,
            name: model.name,
            description: model.description,
            price: model.price,
            category_id: model.category_id,
            image_url: model.image_url,
            brand: model.brand,
            currency_id: model.currency_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InventoryItem {
    pub inventory_id: i32,
    pub product_id: i32,
    pub stock_quantity: i32,
    pub last_updated: DateTime<Utc>,
}

impl From<inventory::Model> for InventoryItem {
    fn from(model: inventory::Model) -> Self {
        Self {
            inventory_id: model.inventory_id,
            product_id: model.product_id,
            stock_quantity: model.stock_quantity,
            last_updated: model.last_updated,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Cart {
    pub cart_id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<cart::Model> for Cart {
    fn from(model: cart::Model) -> Self {
        Self {
            cart_id: model.cart_id,
            user_id: model.user_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub cart_item_id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

impl From<cart_items::Model> for CartItem {
    fn from(model: cart_items::Model) -> Self {
        Self {
            cart_item_id: model.cart_item_id,
            cart_id: model.cart_id,
            product_id: model.product_id,
            quantity: model.quantity,
            added_at: model.added_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub order_id: i32,
    pub user_id: i32,
    pub order_date: DateTime<Utc>,
    #[schema(value_type = String, example = "1299.99")]
    pub total_amount: Decimal,
    pub status: String,
    pub shipping_address: String,
    pub currency_id: Option<i32>,
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            order_id: model.order_id,
            user_id: model.user_id,
            order_date: model.order_date,
            total_amount: model.total_amount,
            status: model.status,
            shipping_address: model.shipping_address,
            currency_id: model.currency_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub order_item_id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    #[schema(value_type = String, example = "149.99")]
    pub price_at_purchase: Decimal,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            order_item_id: model.order_item_id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            price_at_purchase: model.price_at_purchase,
        }
    }
}

/// Row shape shared by transaction logs and audit logs.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogEntry {
    pub log_id: i32,
    pub user_id: Option<i32>,
    pub action_type: String,
    pub table_name: String,
    pub record_id: i32,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub action_timestamp: DateTime<Utc>,
}

impl From<transaction_logs::Model> for LogEntry {
    fn from(model: transaction_logs::Model) -> Self {
        Self {
            log_id: model.log_id,
            user_id: model.user_id,
            action_type: model.action_type,
            table_name: model.table_name,
            record_id: model.record_id,
            old_value: model.old_value,
            new_value: model.new_value,
            action_timestamp: model.action_timestamp,
        }
    }
}

impl From<audit_logs::Model> for LogEntry {
    fn from(model: audit_logs::Model) -> Self {
        Self {
            log_id: model.log_id,
            user_id: model.user_id,
            action_type: model.action_type,
            table_name: model.table_name,
            record_id: model.record_id,
            old_value: model.old_value,
            new_value: model.new_value,
            action_timestamp: model.action_timestamp,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Currency {
    pub currency_id: i32,
    pub currency_code: String,
    pub symbol: String,
    #[schema(value_type = String, example = "0.0175")]
    pub exchange_rate_to_usd: Decimal,
}

impl From<currencies::Model> for Currency {
    fn from(model: currencies::Model) -> Self {
        Self {
            currency_id: model.currency_id,
            currency_code: model.currency_code,
            symbol: model.symbol,
            exchange_rate_to_usd: model.exchange_rate_to_usd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles_and_rejects_others() {
        assert_eq!("staff".parse::<Role>().unwrap(), Role::Staff);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn order_status_round_trips_through_str() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("paid".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn currency_codes_are_case_insensitive_and_carry_their_symbol() {
        let code = "krw".parse::<CurrencyCode>().unwrap();
        assert_eq!(code, CurrencyCode::Krw);
        assert_eq!(code.symbol(), "₩");
        assert!("EUR".parse::<CurrencyCode>().is_err());
    }
}
