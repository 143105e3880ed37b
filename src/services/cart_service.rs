use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::{
    audit::{AuditEntry, log_audit_or_warn},
    dto::cart::{CartLine, CartList, CartWithItems, CreateCartRequest, UpdateCartRequest},
    entity::{
        Products, Users,
        cart::{self, ActiveModel, Column, Entity as Carts},
        cart_items::{Column as ItemCol, Entity as CartItems},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner_or_staff, ensure_staff},
    models::{Cart, CartItem, Product},
    response::{self, ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

/// Loads a cart that the caller is allowed to touch.
pub(crate) async fn owned_cart<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    cart_id: i32,
) -> AppResult<cart::Model> {
    let found = Carts::find_by_id(cart_id).one(conn).await?;
    let found = match found {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    ensure_owner_or_staff(user, found.user_id)?;
    Ok(found)
}

/// Returns the user's cart, creating an empty one on first use.
pub(crate) async fn cart_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
) -> AppResult<cart::Model> {
    let existing = Carts::find()
        .filter(Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    if let Some(found) = existing {
        return Ok(found);
    }

    let now = Utc::now();
    let created = ActiveModel {
        cart_id: NotSet,
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;
    Ok(created)
}

async fn with_items<C: ConnectionTrait>(conn: &C, found: cart::Model) -> AppResult<CartWithItems> {
    let rows = CartItems::find()
        .filter(ItemCol::CartId.eq(found.cart_id))
        .order_by_asc(ItemCol::CartItemId)
        .find_also_related(Products)
        .all(conn)
        .await?;

    let items = rows
        .into_iter()
        .filter_map(|(item, product)| {
            product.map(|product| CartLine {
                item: CartItem::from(item),
                product: Product::from(product),
            })
        })
        .collect();

    Ok(CartWithItems {
        cart: Cart::from(found),
        items,
    })
}

pub async fn my_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartWithItems>> {
    let found = cart_for_user(&state.orm, user.user_id).await?;
    let data = with_items(&state.orm, found).await?;
    Ok(ApiResponse::success("Cart", data, None))
}

pub async fn list_carts(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    let page = pagination.normalize();

    let mut finder = Carts::find().order_by_asc(Column::CartId);
    if !user.is_staff() {
        finder = finder.filter(Column::UserId.eq(user.user_id));
    }

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Cart::from)
        .collect();

    Ok(ApiResponse::paged("Carts", CartList { items }, &page, total))
}

pub async fn get_cart(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<CartWithItems>> {
    let found = owned_cart(&state.orm, user, id).await?;
    let data = with_items(&state.orm, found).await?;
    Ok(ApiResponse::success("Cart", data, None))
}

pub async fn create_cart(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCartRequest,
) -> AppResult<ApiResponse<Cart>> {
    ensure_owner_or_staff(user, payload.user_id)?;
    if Users::find_by_id(payload.user_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(format!(
            "User {} does not exist",
            payload.user_id
        )));
    }

    let existing = Carts::find()
        .filter(Column::UserId.eq(payload.user_id))
        .count(&state.orm)
        .await?;
    if existing > 0 {
        return Err(AppError::BadRequest("User already has a cart".into()));
    }

    let created = cart_for_user(&state.orm, payload.user_id).await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "cart_create", "cart", created.cart_id)
            .new_value(serde_json::json!({ "user_id": created.user_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Cart created",
        Cart::from(created),
        Some(Meta::empty()),
    ))
}

pub async fn update_cart(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateCartRequest,
) -> AppResult<ApiResponse<Cart>> {
    ensure_staff(user)?;
    let existing = Carts::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let old_owner = existing.user_id;
    let mut active: ActiveModel = existing.into();
    if let Some(user_id) = payload.user_id.filter(|u| *u != old_owner) {
        if Users::find_by_id(user_id).one(&state.orm).await?.is_none() {
            return Err(AppError::BadRequest(format!(
                "User {user_id} does not exist"
            )));
        }
        let taken = Carts::find()
            .filter(Column::UserId.eq(user_id))
            .count(&state.orm)
            .await?;
        if taken > 0 {
            return Err(AppError::BadRequest("User already has a cart".into()));
        }
        active.user_id = Set(user_id);
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.orm).await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "cart_update", "cart", updated.cart_id)
            .old(serde_json::json!({ "user_id": old_owner }))
            .new_value(serde_json::json!({ "user_id": updated.user_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Cart::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_cart(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    owned_cart(&state.orm, user, id).await?;
    let result = Carts::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "cart_delete", "cart", id),
    )
    .await;

    Ok(response::deleted("Deleted"))
}
