use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, LockType},
};

use crate::{
    audit::{AuditEntry, log_audit_or_warn},
    dto::orders::{
        CheckoutRequest, CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderRequest,
    },
    entity::{
        Currencies, Products, Users,
        cart::{Column as CartCol, Entity as Carts},
        cart_items::{Column as CartItemCol, Entity as CartItems},
        inventory::{Column as InvCol, Entity as Inventory},
        order_items::{self, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, ActiveModel, Column, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner_or_staff, ensure_role, ensure_staff},
    models::{Order, OrderItem, OrderStatus, Role},
    response::{self, ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{require_text, transaction_log_service::log_transaction},
    state::AppState,
};

/// Loads an order the caller may read.
pub(crate) async fn visible_order<C: ConnectionTrait>(
    conn: &C,
    user: &AuthUser,
    order_id: i32,
) -> AppResult<orders::Model> {
    let found = Orders::find_by_id(order_id).one(conn).await?;
    let found = match found {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };
    ensure_owner_or_staff(user, found.user_id)?;
    Ok(found)
}

fn validate_total(total: Decimal) -> AppResult<Decimal> {
    if total.is_sign_negative() {
        return Err(AppError::BadRequest(
            "total_amount must not be negative".into(),
        ));
    }
    Ok(total.round_dp(2))
}

async fn ensure_currency<C: ConnectionTrait>(conn: &C, currency_id: i32) -> AppResult<()> {
    if Currencies::find_by_id(currency_id).one(conn).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Currency {currency_id} does not exist"
        )));
    }
    Ok(())
}

async fn items_of<C: ConnectionTrait>(conn: &C, order_id: i32) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::OrderItemId)
        .all(conn)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(items)
}

/// Turns the caller's cart into a pending order. Stock is checked and
/// decremented under row locks, the cart is emptied and a `CHECKOUT`
/// transaction log is written; all of it commits or none of it does.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_role(user, Role::Customer)?;
    let shipping_address = require_text(&payload.shipping_address, "shipping_address")?;

    let txn = state.orm.begin().await?;

    // Locking the cart first serialises concurrent checkouts of the same cart.
    let cart = Carts::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let cart = match cart {
        Some(c) => c,
        None => return Err(AppError::BadRequest("Cart is empty".into())),
    };

    let lines: Vec<_> = CartItems::find()
        .filter(CartItemCol::CartId.eq(cart.cart_id))
        .order_by_asc(CartItemCol::CartItemId)
        .find_also_related(Products)
        .all(&txn)
        .await?
        .into_iter()
        .filter_map(|(item, product)| product.map(|p| (item, p)))
        .collect();

    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let mut currency_id: Option<Option<i32>> = None;
    let mut wanted: BTreeMap<i32, i32> = BTreeMap::new();
    let mut total_amount = Decimal::ZERO;
    for (item, product) in &lines {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        match currency_id {
            None => currency_id = Some(product.currency_id),
            Some(current) if current != product.currency_id => {
                return Err(AppError::BadRequest(
                    "Cart mixes products priced in different currencies".into(),
                ));
            }
            Some(_) => {}
        }
        *wanted.entry(product.product_id).or_insert(0) += item.quantity;
        total_amount += product.price * Decimal::from(item.quantity);
    }

    let stock: HashMap<i32, i32> = Inventory::find()
        .filter(InvCol::ProductId.is_in(wanted.keys().copied()))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|row| (row.product_id, row.stock_quantity))
        .collect();

    for (product_id, quantity) in &wanted {
        let available = stock.get(product_id).copied().unwrap_or(0);
        if available < *quantity {
            let name = lines
                .iter()
                .find(|(_, p)| p.product_id == *product_id)
                .map(|(_, p)| p.name.as_str())
                .unwrap_or_default();
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for product {name} (available {available}, requested {quantity})"
            )));
        }
    }

    let order = ActiveModel {
        order_id: NotSet,
        user_id: Set(user.user_id),
        order_date: Set(Utc::now()),
        total_amount: Set(total_amount.round_dp(2)),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        shipping_address: Set(shipping_address),
        currency_id: Set(currency_id.flatten()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (item, product) in &lines {
        let inserted = order_items::ActiveModel {
            order_item_id: NotSet,
            order_id: Set(order.order_id),
            product_id: Set(product.product_id),
            quantity: Set(item.quantity),
            price_at_purchase: Set(product.price),
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(inserted));
    }

    let now = Utc::now();
    for (product_id, quantity) in &wanted {
        Inventory::update_many()
            .col_expr(
                InvCol::StockQuantity,
                Expr::col(InvCol::StockQuantity).sub(*quantity),
            )
            .col_expr(InvCol::LastUpdated, Expr::value(now))
            .filter(InvCol::ProductId.eq(*product_id))
            .exec(&txn)
            .await?;
    }

    CartItems::delete_many()
        .filter(CartItemCol::CartId.eq(cart.cart_id))
        .exec(&txn)
        .await?;

    log_transaction(
        &txn,
        Some(user.user_id),
        "CHECKOUT",
        "orders",
        order.order_id,
        None,
        Some(serde_json::json!({
            "total_amount": order.total_amount,
            "currency_id": order.currency_id,
            "items": items.len(),
        })),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = order.order_id,
        user_id = user.user_id,
        username = %user.username,
        total = %order.total_amount,
        "checkout completed"
    );

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "checkout", "orders", order.order_id),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let page = query.pagination().normalize();

    let mut finder = Orders::find();
    if !user.is_staff() {
        finder = finder.filter(Column::UserId.eq(user.user_id));
    }
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty()) {
        let status: OrderStatus = status.parse()?;
        finder = finder.filter(Column::Status.eq(status.as_str()));
    }
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(Column::OrderDate),
        SortOrder::Desc => finder.order_by_desc(Column::OrderDate),
    };
    finder = finder.order_by_desc(Column::OrderId);

    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    Ok(ApiResponse::paged("Orders", OrderList { items }, &page, total))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = visible_order(&state.orm, user, id).await?;
    let items = items_of(&state.orm, order.order_id).await?;
    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        None,
    ))
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;
    let shipping_address = require_text(&payload.shipping_address, "shipping_address")?;
    let total_amount = validate_total(payload.total_amount.unwrap_or(Decimal::ZERO))?;

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
    if let Some(currency_id) = payload.currency_id {
        ensure_currency(&state.orm, currency_id).await?;
    }

    let order = ActiveModel {
        order_id: NotSet,
        user_id: Set(payload.user_id),
        order_date: Set(Utc::now()),
        total_amount: Set(total_amount),
        status: Set(payload
            .status
            .unwrap_or(OrderStatus::Pending)
            .as_str()
            .to_string()),
        shipping_address: Set(shipping_address),
        currency_id: Set(payload.currency_id),
    }
    .insert(&state.orm)
    .await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "order_create", "orders", order.order_id)
            .new_value(serde_json::json!({
                "user_id": order.user_id,
                "total_amount": order.total_amount,
                "status": order.status,
            })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff(user)?;
    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let old_status = existing.status.clone();
    let mut active: ActiveModel = existing.into();
    if let Some(status) = payload.status {
        active.status = Set(status.as_str().to_string());
    }
    if let Some(address) = payload.shipping_address {
        active.shipping_address = Set(require_text(&address, "shipping_address")?);
    }
    if let Some(total) = payload.total_amount {
        active.total_amount = Set(validate_total(total)?);
    }
    match (payload.currency_id, payload.clear_currency) {
        (Some(_), true) => {
            return Err(AppError::BadRequest(
                "currency_id and clear_currency are mutually exclusive".into(),
            ));
        }
        (Some(currency_id), false) => {
            ensure_currency(&state.orm, currency_id).await?;
            active.currency_id = Set(Some(currency_id));
        }
        (None, true) => active.currency_id = Set(None),
        (None, false) => {}
    }

    let order = active.update(&state.orm).await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "order_update", "orders", order.order_id)
            .old(serde_json::json!({ "status": old_status }))
            .new_value(serde_json::json!({ "status": order.status })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Order::from(order),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let txn = state.orm.begin().await?;
    OrderItems::delete_many()
        .filter(OrderItemCol::OrderId.eq(id))
        .exec(&txn)
        .await?;
    let result = Orders::delete_by_id(id).exec(&txn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "order_delete", "orders", id),
    )
    .await;

    Ok(response::deleted("Deleted"))
}
