mod common;

use sea_orm::EntityTrait;
use technest_api::{
    dto::{
        currencies::{ConvertQuery, CreateCurrencyRequest, UpdateCurrencyRequest},
        products::UpdateProductRequest,
    },
    entity::Products,
    error::AppError,
    middleware::auth::AuthUser,
    models::{CurrencyCode, Role},
    routes::params::Pagination,
    services::{currency_service, product_service},
    state::AppState,
};

async fn currency(state: &AppState, admin: &AuthUser, code: CurrencyCode, rate: &str) -> i32 {
    currency_service::create_currency(
        state,
        admin,
        CreateCurrencyRequest {
            currency_code: code,
            symbol: None,
            exchange_rate_to_usd: common::dec(rate),
        },
    )
    .await
    .expect("create currency")
    .data
    .unwrap()
    .currency_id
}

fn convert_query(amount: &str, from: &str, to: &str) -> ConvertQuery {
    ConvertQuery {
        amount: common::dec(amount),
        from: from.into(),
        to: to.into(),
    }
}

#[tokio::test]
async fn only_admins_manage_currencies() {
    let state = common::test_state().await;
    let admin = common::user_with_role(&state, "admin_user", Role::Admin).await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;

    let by_staff = currency_service::create_currency(
        &state,
        &staff,
        CreateCurrencyRequest {
            currency_code: CurrencyCode::Usd,
            symbol: None,
            exchange_rate_to_usd: common::dec("1"),
        },
    )
    .await;
    assert!(matches!(by_staff, Err(AppError::Forbidden)));

    let usd = currency_service::create_currency(
        &state,
        &admin,
        CreateCurrencyRequest {
            currency_code: CurrencyCode::Usd,
            symbol: None,
            exchange_rate_to_usd: common::dec("1"),
        },
    )
    .await
    .expect("usd")
    .data
    .unwrap();
    assert_eq!(usd.currency_code, "USD");
    assert_eq!(usd.symbol, "$");

    let duplicate = currency_service::create_currency(
        &state,
        &admin,
        CreateCurrencyRequest {
            currency_code: CurrencyCode::Usd,
            symbol: Some("$".into()),
            exchange_rate_to_usd: common::dec("1"),
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::BadRequest(_))));

    let wrong_symbol = currency_service::create_currency(
        &state,
        &admin,
        CreateCurrencyRequest {
            currency_code: CurrencyCode::Php,
            symbol: Some("$".into()),
            exchange_rate_to_usd: common::dec("0.0175"),
        },
    )
    .await;
    assert!(matches!(wrong_symbol, Err(AppError::BadRequest(_))));

    let zero_rate = currency_service::create_currency(
        &state,
        &admin,
        CreateCurrencyRequest {
            currency_code: CurrencyCode::Krw,
            symbol: None,
            exchange_rate_to_usd: common::dec("0"),
        },
    )
    .await;
    assert!(matches!(zero_rate, Err(AppError::BadRequest(_))));

    let listed = currency_service::list_currencies(&state, Pagination::default())
        .await
        .unwrap();
    assert_eq!(listed.data.unwrap().items.len(), 1);
}

#[tokio::test]
async fn converts_through_usd_with_half_away_rounding() {
    let state = common::test_state().await;
    let admin = common::user_with_role(&state, "admin_user", Role::Admin).await;
    currency(&state, &admin, CurrencyCode::Usd, "1").await;
    currency(&state, &admin, CurrencyCode::Php, "0.25").await;
    currency(&state, &admin, CurrencyCode::Krw, "0.5").await;

    let php_to_usd = currency_service::convert(&state, convert_query("10", "PHP", "USD"))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(php_to_usd.from, "PHP");
    assert_eq!(php_to_usd.to, "USD");
    assert_eq!(php_to_usd.converted, common::dec("2.50"));

    let usd_to_krw = currency_service::convert(&state, convert_query("3", "usd", "krw"))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(usd_to_krw.converted, common::dec("6"));

    let half_cent = currency_service::convert(&state, convert_query("0.01", "KRW", "USD"))
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(half_cent.converted, common::dec("0.01"));

    let unknown = currency_service::convert(&state, convert_query("1", "EUR", "USD")).await;
    assert!(matches!(unknown, Err(AppError::NotFound)));
}

#[tokio::test]
async fn rate_updates_and_deletion_detach_products() {
    let state = common::test_state().await;
    let admin = common::user_with_role(&state, "admin_user", Role::Admin).await;
    let php = currency(&state, &admin, CurrencyCode::Php, "0.0175").await;

    let updated = currency_service::update_currency(
        &state,
        &admin,
        php,
        UpdateCurrencyRequest {
            exchange_rate_to_usd: Some(common::dec("0.5")),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(updated.exchange_rate_to_usd, common::dec("0.5"));

    let bad_symbol = currency_service::update_currency(
        &state,
        &admin,
        php,
        UpdateCurrencyRequest {
            symbol: Some("₩".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_symbol, Err(AppError::BadRequest(_))));

    let audio = common::category(&state, &admin, "Audio").await;
    let buds =
        common::product_in_currency(&state, &admin, audio, "SoundWave Buds", "500.00", 3, Some(php))
            .await;

    currency_service::delete_currency(&state, &admin, php)
        .await
        .expect("delete currency");

    let product = Products::find_by_id(buds)
        .one(&state.orm)
        .await
        .unwrap()
        .expect("product survives");
    assert_eq!(product.currency_id, None);

    assert!(matches!(
        currency_service::get_currency(&state, php).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        currency_service::delete_currency(&state, &admin, php).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn product_currency_can_be_detached_explicitly() {
    let state = common::test_state().await;
    let admin = common::user_with_role(&state, "admin_user", Role::Admin).await;
    let usd = currency(&state, &admin, CurrencyCode::Usd, "1").await;
    let audio = common::category(&state, &admin, "Audio").await;
    let buds =
        common::product_in_currency(&state, &admin, audio, "SoundWave Buds", "149.50", 3, Some(usd))
            .await;

    let conflicting = product_service::update_product(
        &state,
        &admin,
        buds,
        UpdateProductRequest {
            currency_id: Some(usd),
            clear_currency: true,
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(conflicting, Err(AppError::BadRequest(_))));

    let untouched = product_service::update_product(
        &state,
        &admin,
        buds,
        UpdateProductRequest {
            brand: Some("SoundWave".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(untouched.currency_id, Some(usd));

    let detached = product_service::update_product(
        &state,
        &admin,
        buds,
        UpdateProductRequest {
            clear_currency: true,
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(detached.currency_id, None);
}
