use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::logs::{CreateTransactionLogRequest, LogList, UpdateTransactionLogRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::LogEntry,
    response::ApiResponse,
    routes::params::LogQuery,
    services::transaction_log_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_transaction_logs).post(create_transaction_log),
        )
        .route(
            "/{id}",
            get(get_transaction_log)
                .patch(update_transaction_log)
                .delete(delete_transaction_log),
        )
}

#[utoipa::path(
    get,
    path = "/api/transaction-logs",
    params(LogQuery),
    responses(
        (status = 200, description = "List transaction logs, newest first", body = ApiResponse<LogList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction logs"
)]
pub async fn list_transaction_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<ApiResponse<LogList>>> {
    let resp = transaction_log_service::list_transaction_logs(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/transaction-logs/{id}",
    params(("id" = i32, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Get transaction log", body = ApiResponse<LogEntry>),
        (status = 404, description = "Log not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction logs"
)]
pub async fn get_transaction_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<LogEntry>>> {
    let resp = transaction_log_service::get_transaction_log(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/transaction-logs",
    request_body = CreateTransactionLogRequest,
    responses(
        (status = 201, description = "Create transaction log", body = ApiResponse<LogEntry>)
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction logs"
)]
pub async fn create_transaction_log(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTransactionLogRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<LogEntry>>)> {
    let resp = transaction_log_service::create_transaction_log(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    patch,
    path = "/api/transaction-logs/{id}",
    params(("id" = i32, Path, description = "Log ID")),
    request_body = UpdateTransactionLogRequest,
    responses(
        (status = 200, description = "Updated transaction log", body = ApiResponse<LogEntry>),
        (status = 404, description = "Log not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction logs"
)]
pub async fn update_transaction_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTransactionLogRequest>,
) -> AppResult<Json<ApiResponse<LogEntry>>> {
    let resp = transaction_log_service::update_transaction_log(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/transaction-logs/{id}",
    params(("id" = i32, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Deleted transaction log", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Log not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transaction logs"
)]
pub async fn delete_transaction_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = transaction_log_service::delete_transaction_log(&state, &user, id).await?;
    Ok(Json(resp))
}
