use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::order_items::{CreateOrderItemRequest, OrderItemList, UpdateOrderItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::OrderItem,
    response::ApiResponse,
    routes::params::OrderItemQuery,
    services::order_item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_order_items).post(create_order_item))
        .route(
            "/{id}",
            get(get_order_item)
                .patch(update_order_item)
                .delete(delete_order_item),
        )
}

#[utoipa::path(
    get,
    path = "/api/order-items",
    params(OrderItemQuery),
    responses(
        (status = 200, description = "List order items", body = ApiResponse<OrderItemList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn list_order_items(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderItemQuery>,
) -> AppResult<Json<ApiResponse<OrderItemList>>> {
    let resp = order_item_service::list_order_items(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/order-items/{id}",
    params(("id" = i32, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Get order item", body = ApiResponse<OrderItem>),
        (status = 404, description = "Order item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn get_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = order_item_service::get_order_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/order-items",
    request_body = CreateOrderItemRequest,
    responses(
        (status = 201, description = "Create order item", body = ApiResponse<OrderItem>),
        (status = 400, description = "Unknown order or product")
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn create_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderItem>>)> {
    let resp = order_item_service::create_order_item(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/order-items/{id}",
    params(("id" = i32, Path, description = "Order item ID")),
    request_body = UpdateOrderItemRequest,
    responses(
        (status = 200, description = "Updated order item", body = ApiResponse<OrderItem>),
        (status = 404, description = "Order item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn update_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOrderItemRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = order_item_service::update_order_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/order-items/{id}",
    params(("id" = i32, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Deleted order item", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Order item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn delete_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_item_service::delete_order_item(&state, &user, id).await?;
    Ok(Json(resp))
}
