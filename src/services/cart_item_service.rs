use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit::{AuditEntry, log_audit_or_warn},
    dto::cart_items::{CartItemList, CreateCartItemRequest, UpdateCartItemRequest},
    entity::{
        Cart as Carts, Products, cart,
        cart_items::{self, ActiveModel, Column, Entity as CartItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    response::{self, ApiResponse, Meta},
    routes::params::Pagination,
    services::{
        cart_service::{cart_for_user, owned_cart},
        require_positive,
    },
    state::AppState,
};

async fn owned_item<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    id: i32,
) -> AppResult<cart_items::Model> {
    let found = CartItems::find_by_id(id).one(conn).await?;
    let found = match found {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };
    owned_cart(conn, user, found.cart_id).await?;
    Ok(found)
}

pub async fn list_cart_items(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartItemList>> {
    let page = pagination.normalize();

    let mut finder = CartItems::find().order_by_asc(Column::CartItemId);
    if !user.is_staff() {
        finder = finder
            .inner_join(Carts)
            .filter(cart::Column::UserId.eq(user.user_id));
    }

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(CartItem::from)
        .collect();

    Ok(ApiResponse::paged(
        "Cart items",
        CartItemList { items },
        &page,
        total,
    ))
}

pub async fn get_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<CartItem>> {
    let found = owned_item(&state.orm, user, id).await?;
    Ok(ApiResponse::success("Cart item", CartItem::from(found), None))
}

/// Adds a product to a cart. A product already in the cart has its
/// quantity increased instead of getting a second row.
pub async fn add_cart_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let quantity = require_positive(payload.quantity, "quantity")?;

    let txn = state.orm.begin().await?;

    let target = match payload.cart_id {
        Some(cart_id) => owned_cart(&txn, user, cart_id).await?,
        None => cart_for_user(&txn, user.user_id).await?,
    };

    if Products::find_by_id(payload.product_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(format!(
            "Product {} does not exist",
            payload.product_id
        )));
    }

    let existing = CartItems::find()
        .filter(Column::CartId.eq(target.cart_id))
        .filter(Column::ProductId.eq(payload.product_id))
        .one(&txn)
        .await?;

    let (item, merged) = match existing {
        Some(line) => {
            let total = line.quantity.checked_add(quantity).ok_or_else(|| {
                AppError::BadRequest("quantity is too large".into())
            })?;
            let mut active: ActiveModel = line.into();
            active.quantity = Set(total);
            (active.update(&txn).await?, true)
        }
        None => {
            let inserted = ActiveModel {
                cart_item_id: NotSet,
                cart_id: Set(target.cart_id),
                product_id: Set(payload.product_id),
                quantity: Set(quantity),
                added_at: Set(Utc::now()),
            }
            .insert(&txn)
            .await?;
            (inserted, false)
        }
    };

    let mut touched: cart::ActiveModel = target.into();
    touched.updated_at = Set(Utc::now());
    touched.update(&txn).await?;

    txn.commit().await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            if merged { "cart_item_merge" } else { "cart_item_create" },
            "cart_items",
            item.cart_item_id,
        )
        .new_value(serde_json::json!({
            "product_id": item.product_id,
            "quantity": item.quantity,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Cart item saved",
        CartItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let quantity = require_positive(payload.quantity, "quantity")?;
    let existing = owned_item(&state.orm, user, id).await?;

    let old_quantity = existing.quantity;
    let mut active: ActiveModel = existing.into();
    active.quantity = Set(quantity);
    let item = active.update(&state.orm).await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "cart_item_update",
            "cart_items",
            item.cart_item_id,
        )
        .old(serde_json::json!({ "quantity": old_quantity }))
        .new_value(serde_json::json!({ "quantity": item.quantity })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        CartItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    owned_item(&state.orm, user, id).await?;
    let result = CartItems::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "cart_item_delete", "cart_items", id),
    )
    .await;

    Ok(response::deleted("Deleted"))
}
