#![allow(dead_code)]

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use technest_api::{
    config::AuthConfig,
    dto::{categories::CreateCategoryRequest, products::CreateProductRequest},
    middleware::auth::AuthUser,
    migration::Migrator,
    models::Role,
    services::{
        category_service, product_service,
        user_service::{NewUser, insert_user},
    },
    state::AppState,
};

pub const PASSWORD: &str = "secret123";

/// Fresh in-memory database with every migration applied.
pub async fn test_state() -> AppState {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(opts).await.expect("connect sqlite");
    Migrator::up(&orm, None).await.expect("run migrations");

    AppState {
        orm,
        auth: AuthConfig::new("test-secret"),
    }
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("decimal literal")
}

pub async fn user_with_role(state: &AppState, username: &str, role: Role) -> AuthUser {
    let user = insert_user(
        &state.orm,
        NewUser {
            username: username.to_string(),
            email: format!("{username}@technest.test"),
            password: PASSWORD.to_string(),
            first_name: None,
            last_name: None,
            address: None,
            phone_number: None,
            role,
        },
    )
    .await
    .expect("insert user");

    AuthUser {
        user_id: user.user_id,
        username: user.username,
        role,
    }
}

pub async fn category(state: &AppState, staff: &AuthUser, name: &str) -> i32 {
    let resp = category_service::create_category(
        state,
        staff,
        CreateCategoryRequest {
            name: name.to_string(),
            description: None,
        },
    )
    .await
    .expect("create category");
    resp.data.expect("category").category_id
}

/// Creates a product with an inventory row and returns its id.
pub async fn product(
    state: &AppState,
    staff: &AuthUser,
    category_id: i32,
    name: &str,
    price: &str,
    stock: i32,
) -> i32 {
    product_in_currency(state, staff, category_id, name, price, stock, None).await
}

pub async fn product_in_currency(
    state: &AppState,
    staff: &AuthUser,
    category_id: i32,
    name: &str,
    price: &str,
    stock: i32,
    currency_id: Option<i32>,
) -> i32 {
    let resp = product_service::create_product(
        state,
        staff,
        CreateProductRequest {
            name: name.to_string(),
            description: Some(format!("{name} for tests")),
            price: dec(price),
            category_id,
            image_url: None,
            brand: Some("TechBrand".into()),
            currency_id,
            initial_stock: Some(stock),
        },
    )
    .await
    .expect("create product");
    resp.data.expect("product").product.product_id
}
