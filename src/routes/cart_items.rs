use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::cart_items::{CartItemList, CreateCartItemRequest, UpdateCartItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartItem,
    response::ApiResponse,
    routes::params::Pagination,
    services::cart_item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cart_items).post(add_cart_item))
        .route(
            "/{id}",
            get(get_cart_item)
                .patch(update_cart_item)
                .delete(delete_cart_item),
        )
}

#[utoipa::path(
    get,
    path = "/api/cart-items",
    params(Pagination),
    responses(
        (status = 200, description = "List cart items", body = ApiResponse<CartItemList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart items"
)]
pub async fn list_cart_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CartItemList>>> {
    let resp = cart_item_service::list_cart_items(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/cart-items/{id}",
    params(("id" = i32, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "Get cart item", body = ApiResponse<CartItem>),
        (status = 404, description = "Cart item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart items"
)]
pub async fn get_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_item_service::get_cart_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart-items",
    request_body = CreateCartItemRequest,
    responses(
        (status = 201, description = "Add to cart; an existing line has its quantity increased", body = ApiResponse<CartItem>),
        (status = 400, description = "Unknown product or invalid quantity")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart items"
)]
pub async fn add_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCartItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CartItem>>)> {
    let resp = cart_item_service::add_cart_item(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/cart-items/{id}",
    params(("id" = i32, Path, description = "Cart item ID")),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated cart item", body = ApiResponse<CartItem>),
        (status = 404, description = "Cart item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart items"
)]
pub async fn update_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_item_service::update_cart_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart-items/{id}",
    params(("id" = i32, Path, description = "Cart item ID")),
    responses(
        (status = 200, description = "Deleted cart item", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Cart items"
)]
pub async fn delete_cart_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_item_service::delete_cart_item(&state, &user, id).await?;
    Ok(Json(resp))
}
