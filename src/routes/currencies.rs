use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::currencies::{
        Conversion, ConvertQuery, CreateCurrencyRequest, CurrencyList, UpdateCurrencyRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Currency,
    response::ApiResponse,
    routes::params::Pagination,
    services::currency_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_currencies).post(create_currency))
        .route("/convert", get(convert))
        .route(
            "/{id}",
            get(get_currency)
                .patch(update_currency)
                .delete(delete_currency),
        )
}

#[utoipa::path(
    get,
    path = "/api/currencies",
    params(Pagination),
    responses(
        (status = 200, description = "List currencies", body = ApiResponse<CurrencyList>)
    ),
    tag = "Currencies"
)]
pub async fn list_currencies(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CurrencyList>>> {
    let resp = currency_service::list_currencies(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/currencies/convert",
    params(ConvertQuery),
    responses(
        (status = 200, description = "Converted amount, rounded to cents", body = ApiResponse<Conversion>),
        (status = 404, description = "Unknown currency code")
    ),
    tag = "Currencies"
)]
pub async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> AppResult<Json<ApiResponse<Conversion>>> {
    let resp = currency_service::convert(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/currencies/{id}",
    params(("id" = i32, Path, description = "Currency ID")),
    responses(
        (status = 200, description = "Get currency", body = ApiResponse<Currency>),
        (status = 404, description = "Currency not found")
    ),
    tag = "Currencies"
)]
pub async fn get_currency(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Currency>>> {
    let resp = currency_service::get_currency(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/currencies",
    request_body = CreateCurrencyRequest,
    responses(
        (status = 201, description = "Create currency", body = ApiResponse<Currency>),
        (status = 400, description = "Duplicate code, wrong symbol or non-positive rate")
    ),
    security(("bearer_auth" = [])),
    tag = "Currencies"
)]
pub async fn create_currency(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCurrencyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Currency>>)> {
    let resp = currency_service::create_currency(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/currencies/{id}",
    params(("id" = i32, Path, description = "Currency ID")),
    request_body = UpdateCurrencyRequest,
    responses(
        (status = 200, description = "Updated currency", body = ApiResponse<Currency>),
        (status = 404, description = "Currency not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Currencies"
)]
pub async fn update_currency(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCurrencyRequest>,
) -> AppResult<Json<ApiResponse<Currency>>> {
    let resp = currency_service::update_currency(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/currencies/{id}",
    params(("id" = i32, Path, description = "Currency ID")),
    responses(
        (status = 200, description = "Deleted currency; products and orders lose the reference", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Currency not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Currencies"
)]
pub async fn delete_currency(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = currency_service::delete_currency(&state, &user, id).await?;
    Ok(Json(resp))
}
