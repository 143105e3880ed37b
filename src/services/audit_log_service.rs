use sea_orm::{ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    dto::logs::LogList,
    entity::audit_logs::{Column, Entity as AuditLogs},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::LogEntry,
    response::ApiResponse,
    routes::params::LogQuery,
    state::AppState,
};

pub async fn list_audit_logs(
    state: &AppState,
    user: &AuthUser,
    query: LogQuery,
) -> AppResult<ApiResponse<LogList>> {
    ensure_admin(user)?;
    let page = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(table_name) = query.table_name.as_deref().filter(|t| !t.is_empty()) {
        condition = condition.add(Column::TableName.eq(table_name));
    }
    if let Some(user_id) = query.user_id {
        condition = condition.add(Column::UserId.eq(user_id));
    }

    let finder = AuditLogs::find().filter(condition).order_by_desc(Column::LogId);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(LogEntry::from)
        .collect();

    Ok(ApiResponse::paged("Audit logs", LogList { items }, &page, total))
}

pub async fn get_audit_log(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<LogEntry>> {
    ensure_admin(user)?;
    let found = AuditLogs::find_by_id(id).one(&state.orm).await?;
    let found = match found {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Audit log", LogEntry::from(found), None))
}
