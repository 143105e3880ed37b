use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{InventoryItem, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String, example = "999.99")]
    pub price: Decimal,
    pub category_id: i32,
    pub image_url: Option<String>,
    pub brand: Option<String>,
    pub currency_id: Option<i32>,
    /// Creates the inventory row together with the product.
    pub initial_stock: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub category_id: Option<i32>,
    pub image_url: Option<String>,
    pub brand: Option<String>,
    pub currency_id: Option<i32>,
    /// Detaches the row from its currency; cannot be combined with `currency_id`.
    #[serde(default)]
    pub clear_currency: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithStock {
    #[serde(flatten)]
    pub product: Product,
    pub inventory: Option<InventoryItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
