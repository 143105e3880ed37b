use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::{
    audit::{AuditEntry, log_audit_or_warn},
    dto::order_items::{CreateOrderItemRequest, OrderItemList, UpdateOrderItemRequest},
    entity::{
        Orders, Products,
        order_items::{ActiveModel, Column, Entity as OrderItems},
        orders,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::OrderItem,
    response::{self, ApiResponse, Meta},
    routes::params::OrderItemQuery,
    services::{order_service::visible_order, require_positive},
    state::AppState,
};

fn validate_price(price: Decimal) -> AppResult<Decimal> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest(
            "price_at_purchase must not be negative".into(),
        ));
    }
    Ok(price.round_dp(2))
}

pub async fn list_order_items(
    state: &AppState,
    user: &AuthUser,
    query: OrderItemQuery,
) -> AppResult<ApiResponse<OrderItemList>> {
    let page = query.pagination().normalize();

    let mut finder = OrderItems::find().order_by_asc(Column::OrderItemId);
    if let Some(order_id) = query.order_id {
        finder = finder.filter(Column::OrderId.eq(order_id));
    }
    if !user.is_staff() {
        finder = finder
            .inner_join(Orders)
            .filter(orders::Column::UserId.eq(user.user_id));
    }

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::paged(
        "Order items",
        OrderItemList { items },
        &page,
        total,
    ))
}

pub async fn get_order_item(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<OrderItem>> {
    let found = OrderItems::find_by_id(id).one(&state.orm).await?;
    let found = match found {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };
    visible_order(&state.orm, user, found.order_id).await?;
    Ok(ApiResponse::success("Order item", OrderItem::from(found), None))
}

pub async fn create_order_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderItemRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    ensure_staff(user)?;
    let quantity = require_positive(payload.quantity, "quantity")?;

    if Orders::find_by_id(payload.order_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(format!(
            "Order {} does not exist",
            payload.order_id
        )));
    }
    let product = Products::find_by_id(payload.product_id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => {
            return Err(AppError::BadRequest(format!(
                "Product {} does not exist",
                payload.product_id
            )));
        }
    };
    let price = validate_price(payload.price_at_purchase.unwrap_or(product.price))?;

    let item = ActiveModel {
        order_item_id: NotSet,
        order_id: Set(payload.order_id),
        product_id: Set(product.product_id),
        quantity: Set(quantity),
        price_at_purchase: Set(price),
    }
    .insert(&state.orm)
    .await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "order_item_create",
            "order_items",
            item.order_item_id,
        )
        .new_value(serde_json::json!({
            "order_id": item.order_id,
            "product_id": item.product_id,
            "quantity": item.quantity,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order item created",
        OrderItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_order_item(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateOrderItemRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    ensure_staff(user)?;
    let existing = OrderItems::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(require_positive(quantity, "quantity")?);
    }
    if let Some(price) = payload.price_at_purchase {
        active.price_at_purchase = Set(validate_price(price)?);
    }

    let item = active.update(&state.orm).await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "order_item_update",
            "order_items",
            item.order_item_id,
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        OrderItem::from(item),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order_item(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let result = OrderItems::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "order_item_delete", "order_items", id),
    )
    .await;

    Ok(response::deleted("Deleted"))
}
