use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::Value;

use crate::{
    dto::logs::{CreateTransactionLogRequest, LogList, UpdateTransactionLogRequest},
    entity::transaction_logs::{self, ActiveModel, Column, Entity as TransactionLogs},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::LogEntry,
    response::{self, ApiResponse, Meta},
    routes::params::LogQuery,
    services::{optional_text, require_text},
    state::AppState,
};

/// Appends a transaction log row on `conn`, which is usually the open
/// transaction of the operation being recorded.
pub async fn log_transaction<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<i32>,
    action_type: &str,
    table_name: &str,
    record_id: i32,
    old_value: Option<Value>,
    new_value: Option<Value>,
) -> AppResult<transaction_logs::Model> {
    let row = ActiveModel {
        log_id: NotSet,
        user_id: Set(user_id),
        action_type: Set(action_type.to_string()),
        table_name: Set(table_name.to_string()),
        record_id: Set(record_id),
        old_value: Set(old_value.map(|v| v.to_string())),
        new_value: Set(new_value.map(|v| v.to_string())),
        action_timestamp: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    Ok(row)
}

pub async fn list_transaction_logs(
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

    let finder = TransactionLogs::find()
        .filter(condition)
        .order_by_desc(Column::LogId);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(LogEntry::from)
        .collect();

    Ok(ApiResponse::paged(
        "Transaction logs",
        LogList { items },
        &page,
        total,
    ))
}

pub async fn get_transaction_log(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<LogEntry>> {
    ensure_admin(user)?;
    let found = TransactionLogs::find_by_id(id).one(&state.orm).await?;
    let found = match found {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Transaction log",
        LogEntry::from(found),
        None,
    ))
}

pub async fn create_transaction_log(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTransactionLogRequest,
) -> AppResult<ApiResponse<LogEntry>> {
    ensure_admin(user)?;
    let action_type = require_text(&payload.action_type, "action_type")?;
    let table_name = require_text(&payload.table_name, "table_name")?;

    let row = ActiveModel {
        log_id: NotSet,
        user_id: Set(payload.user_id),
        action_type: Set(action_type),
        table_name: Set(table_name),
        record_id: Set(payload.record_id),
        old_value: Set(optional_text(payload.old_value)),
        new_value: Set(optional_text(payload.new_value)),
        action_timestamp: Set(Utc::now()),
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Transaction log created",
        LogEntry::from(row),
        Some(Meta::empty()),
    ))
}

pub async fn update_transaction_log(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateTransactionLogRequest,
) -> AppResult<ApiResponse<LogEntry>> {
    ensure_admin(user)?;
    let existing = TransactionLogs::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(l) => l,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(user_id) = payload.user_id {
        active.user_id = Set(Some(user_id));
    }
    if let Some(action_type) = payload.action_type {
        active.action_type = Set(require_text(&action_type, "action_type")?);
    }
    if let Some(table_name) = payload.table_name {
        active.table_name = Set(require_text(&table_name, "table_name")?);
    }
    if let Some(record_id) = payload.record_id {
        active.record_id = Set(record_id);
    }
    if payload.old_value.is_some() {
        active.old_value = Set(optional_text(payload.old_value));
    }
    if payload.new_value.is_some() {
        active.new_value = Set(optional_text(payload.new_value));
    }

    let row = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Updated",
        LogEntry::from(row),
        Some(Meta::empty()),
    ))
}

pub async fn delete_transaction_log(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = TransactionLogs::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(response::deleted("Deleted"))
}
