use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::{
    audit::{AuditEntry, log_audit_or_warn},
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    entity::{
        categories::{ActiveModel, Column, Entity as Categories},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::Category,
    response::{self, ApiResponse, Meta},
    routes::params::Pagination,
    services::{optional_text, require_text},
    state::AppState,
};

async fn ensure_name_free(state: &AppState, name: &str, except: Option<i32>) -> AppResult<()> {
    let mut finder = Categories::find().filter(Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(Column::CategoryId.ne(id));
    }
    if finder.count(&state.orm).await? > 0 {
        return Err(AppError::BadRequest(format!(
            "Category {name} already exists"
        )));
    }
    Ok(())
}

pub async fn list_categories(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<CategoryList>> {
    let page = pagination.normalize();
    let finder = Categories::find().order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();

    Ok(ApiResponse::paged(
        "Categories",
        CategoryList { items },
        &page,
        total,
    ))
}

pub async fn get_category(state: &AppState, id: i32) -> AppResult<ApiResponse<Category>> {
    let result = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(Category::from);
    let result = match result {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Category", result, None))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_staff(user)?;
    let name = require_text(&payload.name, "name")?;
    ensure_name_free(state, &name, None).await?;

    let category = ActiveModel {
        category_id: NotSet,
        name: Set(name),
        description: Set(optional_text(payload.description)),
    }
    .insert(&state.orm)
    .await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "category_create",
            "categories",
            category.category_id,
        )
        .new_value(serde_json::json!({ "name": category.name })),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_staff(user)?;
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let old_name = existing.name.clone();
    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = require_text(&name, "name")?;
        ensure_name_free(state, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if payload.description.is_some() {
        active.description = Set(optional_text(payload.description));
    }

    let category = active.update(&state.orm).await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(
            Some(user.user_id),
            "category_update",
            "categories",
            category.category_id,
        )
        .old(serde_json::json!({ "name": old_name }))
        .new_value(serde_json::json!({ "name": category.name })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Category::from(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff(user)?;
    let in_use = Products::find()
        .filter(ProductCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if in_use > 0 {
        return Err(AppError::BadRequest(format!(
            "Category is still used by {in_use} product(s)"
        )));
    }

    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "category_delete", "categories", id),
    )
    .await;

    Ok(response::deleted("Deleted"))
}
