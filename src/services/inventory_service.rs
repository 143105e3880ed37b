use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::LockType,
};

use crate::{
    audit::{AuditEntry, log_audit_or_warn},
    dto::inventory::{
        CreateInventoryRequest, InventoryAdjustRequest, InventoryList, UpdateInventoryRequest,
    },
    entity::{
        Products,
        inventory::{self, ActiveModel, Column, Entity as Inventory},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::InventoryItem,
    response::{self, ApiResponse, Meta},
    routes::params::{LowStockQuery, Pagination},
    services::transaction_log_service::log_transaction,
    state::AppState,
};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

fn validate_quantity(quantity: i32) -> AppResult<i32> {
    if quantity < 0 {
        return Err(AppError::BadRequest(
            "stock_quantity must not be negative".into(),
        ));
    }
    Ok(quantity)
}

async fn ensure_product<C: ConnectionTrait>(conn: &C, product_id: i32) -> AppResult<()> {
    if Products::find_by_id(product_id).one(conn).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Product {product_id} does not exist"
        )));
    }
    Ok(())
}

async fn ensure_untracked<C: ConnectionTrait>(conn: &C, product_id: i32) -> AppResult<()> {
    let tracked = Inventory::find()
        .filter(Column::ProductId.eq(product_id))
        .count(conn)
        .await?;
    if tracked > 0 {
        return Err(AppError::BadRequest(format!(
            "Product {product_id} already has an inventory record"
        )));
    }
    Ok(())
}

/// Sets the absolute stock of a product and records the change as a
/// `STOCK_UPDATE` transaction log. The inventory row is locked for the
/// rest of the caller's transaction.
pub async fn update_stock<C: ConnectionTrait>(
    conn: &C,
    user_id: Option<i32>,
    product_id: i32,
    quantity: i32,
) -> AppResult<inventory::Model> {
    let quantity = validate_quantity(quantity)?;
    let row = Inventory::find()
        .filter(Column::ProductId.eq(product_id))
        .lock(LockType::Update)
        .one(conn)
        .await?;
    let row = match row {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let old_quantity = row.stock_quantity;
    let mut active: ActiveModel = row.into();
    active.stock_quantity = Set(quantity);
    active.last_updated = Set(Utc::now());
    let updated = active.update(conn).await?;

    log_transaction(
        conn,
        user_id,
        "STOCK_UPDATE",
        "inventory",
        updated.inventory_id,
        Some(serde_json::json!({ "product_id": product_id, "stock_quantity": old_quantity })),
        Some(serde_json::json!({ "product_id": product_id, "stock_quantity": quantity })),
    )
    .await?;

    tracing::info!(product_id, old_quantity, quantity, "stock updated");
    Ok(updated)
}

pub async fn list_inventory(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<InventoryList>> {
    ensure_staff(user)?;
    let page = pagination.normalize();

    let finder = Inventory::find().order_by_asc(Column::InventoryId);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(InventoryItem::from)
        .collect();

    Ok(ApiResponse::paged(
        "Inventory",
        InventoryList { items },
        &page,
        total,
    ))
}

pub async fn low_stock(
    state: &AppState,
    user: &AuthUser,
    query: LowStockQuery,
) -> AppResult<ApiResponse<InventoryList>> {
    ensure_staff(user)?;
    let page = query.pagination().normalize();
    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);

    let finder = Inventory::find()
        .filter(Column::StockQuantity.lte(threshold))
        .order_by_asc(Column::StockQuantity)
        .order_by_asc(Column::InventoryId);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(InventoryItem::from)
        .collect();

    Ok(ApiResponse::paged(
        "Low stock",
        InventoryList { items },
        &page,
        total,
    ))
}

pub async fn get_inventory(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<InventoryItem>> {
    ensure_staff(user)?;
    let found = Inventory::find_by_id(id).one(&state.orm).await?;
    let found = match found {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Inventory",
        InventoryItem::from(found),
        None,
    ))
}

pub async fn create_inventory(
    state: &AppState,
    user: &AuthUser,
    payload: CreateInventoryRequest,
) -> AppResult<ApiResponse<InventoryItem>> {
    ensure_staff(user)?;
    let quantity = validate_quantity(payload.stock_quantity)?;
    ensure_product(&state.orm, payload.product_id).await?;
    ensure_untracked(&state.orm, payload.product_id).await?;

    let row = ActiveModel {
        inventory_id: NotSet,
        product_id: Set(payload.product_id),
        stock_quantity: Set(quantity),
        last_updated: Set(Utc::now()),
    }
    .insert(&state.orm)
    .await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "inventory_create",
            "inventory",
            row.inventory_id,
        )
        .new_value(serde_json::json!({
            "product_id": row.product_id,
            "stock_quantity": row.stock_quantity,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Inventory created",
        InventoryItem::from(row),
        Some(Meta::empty()),
    ))
}

pub async fn update_inventory(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateInventoryRequest,
) -> AppResult<ApiResponse<InventoryItem>> {
    ensure_staff(user)?;
    let txn = state.orm.begin().await?;

    let existing = Inventory::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let mut row = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    if let Some(product_id) = payload.product_id.filter(|p| *p != row.product_id) {
        ensure_product(&txn, product_id).await?;
        ensure_untracked(&txn, product_id).await?;
        let mut active: ActiveModel = row.into();
        active.product_id = Set(product_id);
        active.last_updated = Set(Utc::now());
        row = active.update(&txn).await?;
    }

    if let Some(quantity) = payload.stock_quantity {
        row = update_stock(&txn, Some(user.user_id), row.product_id, quantity).await?;
    }

    txn.commit().await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "inventory_update",
            "inventory",
            row.inventory_id,
        )
        .new_value(serde_json::json!({
            "product_id": row.product_id,
            "stock_quantity": row.stock_quantity,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        InventoryItem::from(row),
        Some(Meta::empty()),
    ))
}

pub async fn adjust_inventory(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: InventoryAdjustRequest,
) -> AppResult<ApiResponse<InventoryItem>> {
    ensure_staff(user)?;
    if payload.delta == 0 {
        return Err(AppError::BadRequest("delta must not be zero".into()));
    }

    let txn = state.orm.begin().await?;
    let existing = Inventory::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let row = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let quantity = match row.stock_quantity.checked_add(payload.delta) {
        Some(q) if q >= 0 => q,
        _ => {
            return Err(AppError::BadRequest(format!(
                "Cannot adjust stock of {} by {}",
                row.stock_quantity, payload.delta
            )));
        }
    };

    let row = update_stock(&txn, Some(user.user_id), row.product_id, quantity).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Adjusted",
        InventoryItem::from(row),
        Some(Meta::empty()),
    ))
}

pub async fn delete_inventory(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = Inventory::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "inventory_delete", "inventory", id),
    )
    .await;

    Ok(response::deleted("Deleted"))
}
