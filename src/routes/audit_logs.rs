use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};

use crate::{
    dto::logs::LogList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::LogEntry,
    response::ApiResponse,
    routes::params::LogQuery,
    services::audit_log_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_audit_logs))
        .route("/{id}", get(get_audit_log))
}

#[utoipa::path(
    get,
    path = "/api/audit-logs",
    params(LogQuery),
    responses(
        (status = 200, description = "Audit trail, newest first", body = ApiResponse<LogList>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Audit logs"
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<ApiResponse<LogList>>> {
    let resp = audit_log_service::list_audit_logs(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/audit-logs/{id}",
    params(("id" = i32, Path, description = "Log ID")),
    responses(
        (status = 200, description = "Get audit entry", body = ApiResponse<LogEntry>),
        (status = 404, description = "Log not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Audit logs"
)]
pub async fn get_audit_log(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<LogEntry>>> {
    let resp = audit_log_service::get_audit_log(&state, &user, id).await?;
    Ok(Json(resp))
}
