mod common;

use technest_api::{
    dto::{
        auth::LoginRequest,
        logs::{CreateTransactionLogRequest, UpdateTransactionLogRequest},
        users::{CreateUserRequest, UpdateUserRequest},
    },
    error::AppError,
    models::Role,
    routes::params::{LogQuery, Pagination},
    services::{audit_log_service, auth_service, transaction_log_service, user_service},
    state::AppState,
};

async fn can_login(state: &AppState, email: &str, password: &str) -> bool {
    auth_service::login_user(
        state,
        LoginRequest {
            email: email.into(),
            password: password.into(),
        },
    )
    .await
    .is_ok()
}

#[tokio::test]
async fn admin_manages_users() {
    let state = common::test_state().await;
    let admin = common::user_with_role(&state, "admin_user", Role::Admin).await;

    let staff = user_service::create_user(
        &state,
        &admin,
        CreateUserRequest {
            username: "staff_user".into(),
            email: "staff@technest.test".into(),
            password: "staff123".into(),
            first_name: Some("Sam".into()),
            last_name: None,
            address: None,
            phone_number: None,
            role: Some(Role::Staff),
        },
    )
    .await
    .expect("create user")
    .data
    .unwrap();
    assert_eq!(staff.role, "staff");
    assert!(can_login(&state, "staff@technest.test", "staff123").await);

    let updated = user_service::update_user(
        &state,
        &admin,
        staff.user_id,
        UpdateUserRequest {
            password: Some("fresh-secret".into()),
            ..Default::default()
        },
    )
    .await
    .expect("update password")
    .data
    .unwrap();
    assert_eq!(updated.username, "staff_user");
    assert!(!can_login(&state, "staff@technest.test", "staff123").await);
    assert!(can_login(&state, "staff@technest.test", "fresh-secret").await);

    let taken_email = user_service::update_user(
        &state,
        &admin,
        staff.user_id,
        UpdateUserRequest {
            email: Some("admin_user@technest.test".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(taken_email, Err(AppError::BadRequest(_))));

    let listed = user_service::list_users(&state, &admin, Pagination::default())
        .await
        .unwrap();
    assert_eq!(listed.meta.and_then(|m| m.total), Some(2));

    user_service::delete_user(&state, &admin, staff.user_id)
        .await
        .expect("delete user");
    assert!(matches!(
        user_service::delete_user(&state, &admin, staff.user_id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn users_read_only_themselves() {
    let state = common::test_state().await;
    let john = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let jane = common::user_with_role(&state, "janesmith", Role::Customer).await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;

    let own = user_service::get_user(&state, &john, john.user_id)
        .await
        .expect("own profile")
        .data
        .unwrap();
    assert_eq!(own.email, "johndoe@technest.test");

    assert!(matches!(
        user_service::get_user(&state, &john, jane.user_id).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        user_service::list_users(&state, &staff, Pagination::default()).await,
        Err(AppError::Forbidden)
    ));
    assert!(matches!(
        user_service::update_user(&state, &staff, john.user_id, UpdateUserRequest::default())
            .await,
        Err(AppError::Forbidden)
    ));
}

#[tokio::test]
async fn transaction_logs_are_admin_crud() {
    let state = common::test_state().await;
    let admin = common::user_with_role(&state, "admin_user", Role::Admin).await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;

    let created = transaction_log_service::create_transaction_log(
        &state,
        &admin,
        CreateTransactionLogRequest {
            user_id: Some(admin.user_id),
            action_type: "MANUAL_FIX".into(),
            table_name: "orders".into(),
            record_id: 42,
            old_value: None,
            new_value: Some(r#"{"status":"shipped"}"#.into()),
        },
    )
    .await
    .expect("create log")
    .data
    .unwrap();
    assert_eq!(created.action_type, "MANUAL_FIX");

    let blank = transaction_log_service::create_transaction_log(
        &state,
        &admin,
        CreateTransactionLogRequest {
            user_id: None,
            action_type: "  ".into(),
            table_name: "orders".into(),
            record_id: 1,
            old_value: None,
            new_value: None,
        },
    )
    .await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    transaction_log_service::create_transaction_log(
        &state,
        &admin,
        CreateTransactionLogRequest {
            user_id: None,
            action_type: "STOCK_UPDATE".into(),
            table_name: "inventory".into(),
            record_id: 7,
            old_value: None,
            new_value: None,
        },
    )
    .await
    .unwrap();

    let orders_only = transaction_log_service::list_transaction_logs(
        &state,
        &admin,
        LogQuery {
            table_name: Some("orders".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let items = orders_only.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].log_id, created.log_id);

    let updated = transaction_log_service::update_transaction_log(
        &state,
        &admin,
        created.log_id,
        UpdateTransactionLogRequest {
            record_id: Some(43),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(updated.record_id, 43);

    assert!(matches!(
        transaction_log_service::get_transaction_log(&state, &staff, created.log_id).await,
        Err(AppError::Forbidden)
    ));

    transaction_log_service::delete_transaction_log(&state, &admin, created.log_id)
        .await
        .expect("delete log");
    assert!(matches!(
        transaction_log_service::get_transaction_log(&state, &admin, created.log_id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn mutations_leave_an_audit_trail() {
    let state = common::test_state().await;
    let admin = common::user_with_role(&state, "admin_user", Role::Admin).await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;

    let audio = common::category(&state, &staff, "Audio").await;
    common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 5).await;
    user_service::update_user(
        &state,
        &admin,
        staff.user_id,
        UpdateUserRequest {
            first_name: Some("Sam".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let by_staff = audit_log_service::list_audit_logs(
        &state,
        &admin,
        LogQuery {
            user_id: Some(staff.user_id),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap()
    .items;
    let tables: Vec<&str> = by_staff.iter().map(|e| e.table_name.as_str()).collect();
    assert!(tables.contains(&"categories"));
    assert!(tables.contains(&"products"));
    assert!(by_staff.iter().all(|e| e.user_id == Some(staff.user_id)));

    let user_changes = audit_log_service::list_audit_logs(
        &state,
        &admin,
        LogQuery {
            table_name: Some("users".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap()
    .items;
    assert_eq!(user_changes.len(), 1);
    assert_eq!(user_changes[0].action_type, "user_update");
    assert_eq!(user_changes[0].record_id, staff.user_id);

    let entry = audit_log_service::get_audit_log(&state, &admin, user_changes[0].log_id)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(entry.user_id, Some(admin.user_id));

    assert!(matches!(
        audit_log_service::list_audit_logs(&state, &staff, LogQuery::default()).await,
        Err(AppError::Forbidden)
    ));
}
