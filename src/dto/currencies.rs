use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{Currency, CurrencyCode};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCurrencyRequest {
    pub currency_code: CurrencyCode,
    /// Defaults to the code's own symbol.
    pub symbol: Option<String>,
    #[schema(value_type = String, example = "0.0175")]
    pub exchange_rate_to_usd: Decimal,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCurrencyRequest {
    pub symbol: Option<String>,
    #[schema(value_type = Option<String>)]
    pub exchange_rate_to_usd: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConvertQuery {
    #[param(value_type = String)]
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Conversion {
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub from: String,
    pub to: String,
    #[schema(value_type = String)]
    pub converted: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CurrencyList {
    #[schema(value_type = Vec<Currency>)]
    pub items: Vec<Currency>,
}
