use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

use crate::{
    audit::{AuditEntry, log_audit_or_warn},
    dto::currencies::{
        Conversion, ConvertQuery, CreateCurrencyRequest, CurrencyList, UpdateCurrencyRequest,
    },
    entity::{
        Orders, Products,
        currencies::{self, ActiveModel, Column, Entity as Currencies},
        orders, products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Currency, CurrencyCode},
    response::{self, ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

fn validate_rate(rate: Decimal) -> AppResult<Decimal> {
    if rate <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "exchange_rate_to_usd must be greater than 0".into(),
        ));
    }
    Ok(rate.round_dp(4))
}

fn validate_symbol(code: CurrencyCode, symbol: Option<&str>) -> AppResult<String> {
    match symbol.map(str::trim) {
        None => Ok(code.symbol().to_string()),
        Some(s) if s == code.symbol() => Ok(s.to_string()),
        Some(s) => Err(AppError::BadRequest(format!(
            "Symbol {s} does not match currency {}",
            code.as_str()
        ))),
    }
}

/// Converts through USD and rounds half away from zero to cents.
/// Each rate is the USD value of one unit of its currency.
pub fn convert_amount(amount: Decimal, from_rate: Decimal, to_rate: Decimal) -> AppResult<Decimal> {
    let converted = amount
        .checked_mul(from_rate)
        .and_then(|usd| usd.checked_div(to_rate))
        .ok_or_else(|| AppError::BadRequest("Amount cannot be converted".into()))?;
    Ok(converted.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

async fn find_by_code(state: &AppState, code: &str) -> AppResult<currencies::Model> {
    let found = Currencies::find()
        .filter(Column::CurrencyCode.eq(code.trim().to_ascii_uppercase()))
        .one(&state.orm)
        .await?;
    match found {
        Some(c) => Ok(c),
        None => Err(AppError::NotFound),
    }
}

pub async fn list_currencies(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<CurrencyList>> {
    let page = pagination.normalize();
    let finder = Currencies::find().order_by_asc(Column::CurrencyCode);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Currency::from)
        .collect();

    Ok(ApiResponse::paged(
        "Currencies",
        CurrencyList { items },
        &page,
        total,
    ))
}

pub async fn get_currency(state: &AppState, id: i32) -> AppResult<ApiResponse<Currency>> {
    let found = Currencies::find_by_id(id).one(&state.orm).await?;
    let found = match found {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Currency", Currency::from(found), None))
}

pub async fn convert(state: &AppState, query: ConvertQuery) -> AppResult<ApiResponse<Conversion>> {
    let from = find_by_code(state, &query.from).await?;
    let to = find_by_code(state, &query.to).await?;
    let converted = convert_amount(
        query.amount,
        from.exchange_rate_to_usd,
        to.exchange_rate_to_usd,
    )?;

    Ok(ApiResponse::success(
        "Converted",
        Conversion {
            amount: query.amount,
            from: from.currency_code,
            to: to.currency_code,
            converted,
        },
        None,
    ))
}

pub async fn create_currency(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCurrencyRequest,
) -> AppResult<ApiResponse<Currency>> {
    ensure_admin(user)?;
    let code = payload.currency_code;
    let symbol = validate_symbol(code, payload.symbol.as_deref())?;
    let rate = validate_rate(payload.exchange_rate_to_usd)?;

    let taken = Currencies::find()
        .filter(Column::CurrencyCode.eq(code.as_str()))
        .count(&state.orm)
        .await?;
    if taken > 0 {
        return Err(AppError::BadRequest(format!(
            "Currency {} already exists",
            code.as_str()
        )));
    }

    let currency = ActiveModel {
        currency_id: NotSet,
        currency_code: Set(code.as_str().to_string()),
        symbol: Set(symbol),
        exchange_rate_to_usd: Set(rate),
    }
    .insert(&state.orm)
    .await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "currency_create",
            "currencies",
            currency.currency_id,
        )
        .new_value(serde_json::json!({
            "currency_code": currency.currency_code,
            "exchange_rate_to_usd": currency.exchange_rate_to_usd,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Currency created",
        Currency::from(currency),
        Some(Meta::empty()),
    ))
}

pub async fn update_currency(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateCurrencyRequest,
) -> AppResult<ApiResponse<Currency>> {
    ensure_admin(user)?;
    let existing = Currencies::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let code: CurrencyCode = existing.currency_code.parse()?;
    let old_rate = existing.exchange_rate_to_usd;
    let mut active: ActiveModel = existing.into();
    if let Some(symbol) = payload.symbol.as_deref() {
        active.symbol = Set(validate_symbol(code, Some(symbol))?);
    }
    if let Some(rate) = payload.exchange_rate_to_usd {
        active.exchange_rate_to_usd = Set(validate_rate(rate)?);
    }

    let currency = active.update(&state.orm).await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "currency_update",
            "currencies",
            currency.currency_id,
        )
        .old(serde_json::json!({ "exchange_rate_to_usd": old_rate }))
        .new_value(serde_json::json!({ "exchange_rate_to_usd": currency.exchange_rate_to_usd })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Currency::from(currency),
        Some(Meta::empty()),
    ))
}

/// Deletes a currency and detaches it from products and orders.
pub async fn delete_currency(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;

    Products::update_many()
        .col_expr(products::Column::CurrencyId, Expr::value(Option::<i32>::None))
        .filter(products::Column::CurrencyId.eq(id))
        .exec(&txn)
        .await?;
    Orders::update_many()
        .col_expr(orders::Column::CurrencyId, Expr::value(Option::<i32>::None))
        .filter(orders::Column::CurrencyId.eq(id))
        .exec(&txn)
        .await?;

    let result = Currencies::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "currency_delete", "currencies", id),
    )
    .await;

    Ok(response::deleted("Deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn converts_through_usd() {
        // 1000 PHP at 0.0175 USD each is 17.50 USD
        assert_eq!(
            convert_amount(dec("1000"), dec("0.0175"), dec("1")).unwrap(),
            dec("17.50")
        );
        // 10 USD into PHP
        assert_eq!(
            convert_amount(dec("10"), dec("1"), dec("0.0175")).unwrap(),
            dec("571.43")
        );
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(
            convert_amount(dec("0.125"), dec("1"), dec("1")).unwrap(),
            dec("0.13")
        );
        assert_eq!(
            convert_amount(dec("-0.125"), dec("1"), dec("1")).unwrap(),
            dec("-0.13")
        );
    }

    #[test]
    fn symbol_must_belong_to_the_code() {
        assert_eq!(validate_symbol(CurrencyCode::Krw, None).unwrap(), "₩");
        assert_eq!(validate_symbol(CurrencyCode::Php, Some("₱")).unwrap(), "₱");
        assert!(validate_symbol(CurrencyCode::Usd, Some("₱")).is_err());
    }

    #[test]
    fn rate_must_be_positive() {
        assert!(validate_rate(Decimal::ZERO).is_err());
        assert!(validate_rate(dec("-1")).is_err());
        assert_eq!(validate_rate(dec("0.00071")).unwrap(), dec("0.0007"));
    }
}
