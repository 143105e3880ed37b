use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::{
    audit::{AuditEntry, log_audit_or_warn},
    dto::users::{CreateUserRequest, UpdateUserRequest, UserList},
    entity::users::{self, ActiveModel, Column, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Role, User},
    response::{self, ApiResponse, Meta},
    routes::params::Pagination,
    services::{auth_service::hash_password, optional_text, require_text},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 6;

/// Validated input shared by self-registration and admin user creation.
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub role: Role,
}

fn validate_email(email: &str) -> AppResult<String> {
    let email = require_text(email, "email")?;
    if !email.contains('@') {
        return Err(AppError::BadRequest("email must be a valid address".into()));
    }
    Ok(email)
}

fn validate_password(password: &str) -> AppResult<&str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(password)
}

/// Rejects a username or email already held by another user.
async fn ensure_identity_free<C: ConnectionTrait>(
    conn: &C,
    username: Option<&str>,
    email: Option<&str>,
    except: Option<i32>,
) -> AppResult<()> {
    let mut identity = Condition::any();
    if let Some(username) = username {
        identity = identity.add(Column::Username.eq(username));
    }
    if let Some(email) = email {
        identity = identity.add(Column::Email.eq(email));
    }
    if identity.is_empty() {
        return Ok(());
    }

    let mut condition = Condition::all().add(identity);
    if let Some(id) = except {
        condition = condition.add(Column::UserId.ne(id));
    }

    let taken = Users::find().filter(condition).count(conn).await?;
    if taken > 0 {
        return Err(AppError::BadRequest(
            "User with this username or email already exists".into(),
        ));
    }
    Ok(())
}

pub async fn insert_user<C: ConnectionTrait>(conn: &C, new: NewUser) -> AppResult<users::Model> {
    let username = require_text(&new.username, "username")?;
    let email = validate_email(&new.email)?;
    let password = validate_password(&new.password)?;

    ensure_identity_free(conn, Some(&username), Some(&email), None).await?;

    let now = Utc::now();
    let active = ActiveModel {
        user_id: NotSet,
        username: Set(username),
        email: Set(email),
        password_hash: Set(hash_password(password)?),
        first_name: Set(optional_text(new.first_name)),
        last_name: Set(optional_text(new.last_name)),
        address: Set(optional_text(new.address)),
        phone_number: Set(optional_text(new.phone_number)),
        role: Set(new.role.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Ok(active.insert(conn).await?)
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let page = pagination.normalize();

    let finder = Users::find().order_by_asc(Column::UserId);
    let total = finder.clone().count(&state.orm).await?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(ApiResponse::paged("Users", UserList { items }, &page, total))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<User>> {
    if user.user_id != id {
        ensure_admin(user)?;
    }
    let found = Users::find_by_id(id).one(&state.orm).await?;
    let found = match found {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("User", User::from(found), None))
}

pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let created = insert_user(
        &state.orm,
        NewUser {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            address: payload.address,
            phone_number: payload.phone_number,
            role: payload.role.unwrap_or(Role::Customer),
        },
    )
    .await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "user_create", "users", created.user_id).new_value(
            serde_json::json!({ "username": created.username, "role": created.role }),
        ),
    )
    .await;

    Ok(ApiResponse::success(
        "User created",
        User::from(created),
        Some(Meta::empty()),
    ))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;
    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let username = match payload.username {
        Some(name) => Some(require_text(&name, "username")?),
        None => None,
    };
    let email = match payload.email {
        Some(email) => Some(validate_email(&email)?),
        None => None,
    };
    ensure_identity_free(&state.orm, username.as_deref(), email.as_deref(), Some(id)).await?;

    let old_role = existing.role.clone();
    let mut active: ActiveModel = existing.into();
    if let Some(username) = username {
        active.username = Set(username);
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(password) = payload.password {
        active.password_hash = Set(hash_password(validate_password(&password)?)?);
    }
    if payload.first_name.is_some() {
        active.first_name = Set(optional_text(payload.first_name));
    }
    if payload.last_name.is_some() {
        active.last_name = Set(optional_text(payload.last_name));
    }
    if payload.address.is_some() {
        active.address = Set(optional_text(payload.address));
    }
    if payload.phone_number.is_some() {
        active.phone_number = Set(optional_text(payload.phone_number));
    }
    if let Some(role) = payload.role {
        active.role = Set(role.as_str().to_string());
    }
    active.updated_at = Set(Utc::now());

    let updated = active.update(&state.orm).await?;

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "user_update", "users", updated.user_id)
            .old(serde_json::json!({ "role": old_role }))
            .new_value(serde_json::json!({ "role": updated.role })),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        User::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Users::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    log_audit_or_warn(
        &state.orm,
        AuditEntry::new(Some(user.user_id), "user_delete", "users", id),
    )
    .await;

    Ok(response::deleted("Deleted"))
}
