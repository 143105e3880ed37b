use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit::{AuditEntry, log_audit_or_warn},
    dto::products::{CreateProductRequest, ProductList, ProductWithStock, UpdateProductRequest},
    entity::{
        Categories, Currencies, Inventory, OrderItems, inventory,
        order_items::Column as OrderItemCol,
        products::{ActiveModel, Column, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{InventoryItem, Product},
    response::{self, ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::{optional_text, require_text},
    state::AppState,
};

fn validate_price(price: Decimal) -> AppResult<Decimal> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    Ok(price.round_dp(2))
}

async fn ensure_category<C: ConnectionTrait>(conn: &C, category_id: i32) -> AppResult<()> {
    if Categories::find_by_id(category_id).one(conn).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Category {category_id} does not exist"
        )));
    }
    Ok(())
}

async fn ensure_currency<C: ConnectionTrait>(conn: &C, currency_id: i32) -> AppResult<()> {
    if Currencies::find_by_id(currency_id).one(conn).await?.is_none() {
        return Err(AppError::BadRequest(format!(
            "Currency {currency_id} does not exist"
        )));
    }
    Ok(())
}

fn filter_condition(query: &ProductQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(Column::Name.contains(search))
                .add(Column::Description.contains(search)),
        );
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(brand) = query.brand.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Brand.eq(brand));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    condition
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let page = query.pagination().normalize();

    let sort_by = query.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(filter_condition(&query));
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };
    finder = finder.order_by_asc(Column::ProductId);

    let total = finder.clone().count(&state.orm).await?;

    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::paged("Products", ProductList { items }, &page, total))
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<ProductWithStock>> {
    let result = Products::find_by_id(id)
        .find_also_related(Inventory)
        .one(&state.orm)
        .await?;
    let (product, stock) = match result {
        Some(row) => row,
        None => return Err(AppError::NotFound),
    };

    let data = ProductWithStock {
        product: Product::from(product),
        inventory: stock.map(InventoryItem::from),
    };
    Ok(ApiResponse::success("Product", data, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductWithStock>> {
    ensure_staff(user)?;
    let name = require_text(&payload.name, "name")?;
    let price = validate_price(payload.price)?;
    if let Some(stock) = payload.initial_stock {
        if stock < 0 {
            return Err(AppError::BadRequest(
                "initial_stock must not be negative".into(),
            ));
        }
    }

    let txn = state.orm.begin().await?;

    ensure_category(&txn, payload.category_id).await?;
    if let Some(currency_id) = payload.currency_id {
        ensure_currency(&txn, currency_id).await?;
    }

    let now = Utc::now();
    let product = ActiveModel {
        product_id: NotSet,
        name: Set(name),
        description: Set(optional_text(payload.description)),
        price: Set(price),
        category_id: Set(payload.category_id),
        image_url: Set(optional_text(payload.image_url)),
        brand: Set(optional_text(payload.brand)),
        currency_id: Set(payload.currency_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let stock = match payload.initial_stock {
        Some(quantity) => Some(
            inventory::ActiveModel {
                inventory_id: NotSet,
                product_id: Set(product.product_id),
                stock_quantity: Set(quantity),
                last_updated: Set(now),
            }
            .insert(&txn)
            .await?,
        ),
        None => None,
    };

    txn.commit().await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "product_create",
            "products",
            product.product_id,
        )
        .new_value(serde_json::json!({
            "name": product.name,
            "price": product.price,
            "initial_stock": payload.initial_stock,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        ProductWithStock {
            product: Product::from(product),
            inventory: stock.map(InventoryItem::from),
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_staff(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let old_price = existing.price;
    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(require_text(&name, "name")?);
    }
    if payload.description.is_some() {
        active.description = Set(optional_text(payload.description));
    }
    if let Some(price) = payload.price {
        active.price = Set(validate_price(price)?);
    }
    if let Some(category_id) = payload.category_id {
        ensure_category(&state.orm, category_id).await?;
        active.category_id = Set(category_id);
    }
    if payload.image_url.is_some() {
        active.image_url = Set(optional_text(payload.image_url));
    }
    if payload.brand.is_some() {
        active.brand = Set(optional_text(payload.brand));
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
    active.updated_at = Set(Utc::now());

    let product = active.update(&state.orm).await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "product_update",
            "products",
            product.product_id,
        )
        .old(serde_json::json!({ "price": old_price }))
        .new_value(serde_json::json!({ "price": product.price })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let ordered = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::BadRequest(
            "Product has been ordered and cannot be removed".into(),
        ));
    }

    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "product_delete", "products", id),
    )
    .await;

    Ok(response::deleted("Deleted"))
}
