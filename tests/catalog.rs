mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use technest_api::{
    dto::{
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        inventory::{CreateInventoryRequest, InventoryAdjustRequest, UpdateInventoryRequest},
        products::UpdateProductRequest,
    },
    entity::{AuditLogs, TransactionLogs, transaction_logs},
    error::AppError,
    models::Role,
    routes::params::{LowStockQuery, ProductQuery, ProductSortBy, SortOrder},
    services::{category_service, inventory_service, product_service},
};

#[tokio::test]
async fn duplicate_category_name_is_rejected() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;

    common::category(&state, &staff, "Laptops").await;
    let again = category_service::create_category(
        &state,
        &staff,
        CreateCategoryRequest {
            name: "  Laptops ".into(),
            description: None,
        },
    )
    .await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    let audits = AuditLogs::find().count(&state.orm).await.unwrap();
    assert_eq!(audits, 1);
}

#[tokio::test]
async fn customers_cannot_manage_categories() {
    let state = common::test_state().await;
    let customer = common::user_with_role(&state, "johndoe", Role::Customer).await;

    let result = category_service::create_category(
        &state,
        &customer,
        CreateCategoryRequest {
            name: "Audio".into(),
            description: None,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn category_delete_rules() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;

    let missing = category_service::delete_category(&state, &staff, 999).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let used = common::category(&state, &staff, "Audio").await;
    common::product(&state, &staff, used, "SoundWave Buds", "149.50", 10).await;
    let in_use = category_service::delete_category(&state, &staff, used).await;
    assert!(matches!(in_use, Err(AppError::BadRequest(_))));

    let empty = common::category(&state, &staff, "Accessories").await;
    category_service::update_category(
        &state,
        &staff,
        empty,
        UpdateCategoryRequest {
            description: Some("Chargers and cases".into()),
            ..Default::default()
        },
    )
    .await
    .expect("update");
    category_service::delete_category(&state, &staff, empty)
        .await
        .expect("delete unused category");
    let gone = category_service::get_category(&state, empty).await;
    assert!(matches!(gone, Err(AppError::NotFound)));
}

#[tokio::test]
async fn product_create_requires_known_category_and_tracks_initial_stock() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let phones = common::category(&state, &staff, "Smartphones").await;

    let id = common::product(&state, &staff, phones, "TechPhone 12", "999.50", 100).await;
    let found = product_service::get_product(&state, id)
        .await
        .expect("get")
        .data
        .expect("product");
    assert_eq!(found.product.name, "TechPhone 12");
    assert_eq!(found.inventory.expect("stock").stock_quantity, 100);

    let orphan = product_service::create_product(
        &state,
        &staff,
        technest_api::dto::products::CreateProductRequest {
            name: "Ghost".into(),
            description: None,
            price: common::dec("1.00"),
            category_id: 4242,
            image_url: None,
            brand: None,
            currency_id: None,
            initial_stock: Some(1),
        },
    )
    .await;
    assert!(matches!(orphan, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn product_list_filters_and_sorts() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let phones = common::category(&state, &staff, "Smartphones").await;
    let gaming = common::category(&state, &staff, "Gaming Peripherals").await;

    common::product(&state, &staff, phones, "TechPhone 12", "999.50", 5).await;
    common::product(&state, &staff, gaming, "GamerKey Pro", "119.50", 5).await;
    common::product(&state, &staff, gaming, "Stealth Mouse", "89.25", 5).await;

    let gaming_by_price = product_service::list_products(
        &state,
        ProductQuery {
            category_id: Some(gaming),
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        },
    )
    .await
    .expect("list");
    let names: Vec<_> = gaming_by_price
        .data
        .expect("items")
        .items
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["Stealth Mouse", "GamerKey Pro"]);
    assert_eq!(gaming_by_price.meta.and_then(|m| m.total), Some(2));

    let search = product_service::list_products(
        &state,
        ProductQuery {
            q: Some("phone".into()),
            ..Default::default()
        },
    )
    .await
    .expect("search");
    assert_eq!(search.data.expect("items").items.len(), 1);

    let price_band = product_service::list_products(
        &state,
        ProductQuery {
            min_price: Some(common::dec("100")),
            max_price: Some(common::dec("500")),
            ..Default::default()
        },
    )
    .await
    .expect("band");
    let band = price_band.data.expect("items").items;
    assert_eq!(band.len(), 1);
    assert_eq!(band[0].name, "GamerKey Pro");
}

#[tokio::test]
async fn product_update_and_delete() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let audio = common::category(&state, &staff, "Audio").await;
    let id = common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 3).await;

    let updated = product_service::update_product(
        &state,
        &staff,
        id,
        UpdateProductRequest {
            price: Some(common::dec("129.75")),
            ..Default::default()
        },
    )
    .await
    .expect("update")
    .data
    .expect("product");
    assert_eq!(updated.price, common::dec("129.75"));
    assert_eq!(updated.name, "SoundWave Buds");

    let negative = product_service::update_product(
        &state,
        &staff,
        id,
        UpdateProductRequest {
            price: Some(common::dec("-1")),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(negative, Err(AppError::BadRequest(_))));

    product_service::delete_product(&state, &staff, id)
        .await
        .expect("delete");
    assert!(matches!(
        product_service::delete_product(&state, &staff, id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn stock_updates_are_logged_as_transactions() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let audio = common::category(&state, &staff, "Audio").await;
    let id = common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 10).await;

    let row = product_service::get_product(&state, id)
        .await
        .unwrap()
        .data
        .unwrap()
        .inventory
        .unwrap();

    let updated = inventory_service::update_inventory(
        &state,
        &staff,
        row.inventory_id,
        UpdateInventoryRequest {
            stock_quantity: Some(4),
            ..Default::default()
        },
    )
    .await
    .expect("update stock")
    .data
    .unwrap();
    assert_eq!(updated.stock_quantity, 4);

    let logs = TransactionLogs::find()
        .filter(transaction_logs::Column::ActionType.eq("STOCK_UPDATE"))
        .all(&state.orm)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].record_id, row.inventory_id);
    assert_eq!(logs[0].user_id, Some(staff.user_id));

    let negative = inventory_service::update_inventory(
        &state,
        &staff,
        row.inventory_id,
        UpdateInventoryRequest {
            stock_quantity: Some(-1),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(negative, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn adjust_and_low_stock() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let gaming = common::category(&state, &staff, "Gaming Peripherals").await;
    let keyboard = common::product(&state, &staff, gaming, "GamerKey Pro", "119.50", 8).await;
    common::product(&state, &staff, gaming, "Stealth Mouse", "89.25", 50).await;

    let inventory_id = product_service::get_product(&state, keyboard)
        .await
        .unwrap()
        .data
        .unwrap()
        .inventory
        .unwrap()
        .inventory_id;

    let adjusted = inventory_service::adjust_inventory(
        &state,
        &staff,
        inventory_id,
        InventoryAdjustRequest { delta: -6 },
    )
    .await
    .expect("adjust")
    .data
    .unwrap();
    assert_eq!(adjusted.stock_quantity, 2);

    let too_far = inventory_service::adjust_inventory(
        &state,
        &staff,
        inventory_id,
        InventoryAdjustRequest { delta: -3 },
    )
    .await;
    assert!(matches!(too_far, Err(AppError::BadRequest(_))));

    let low = inventory_service::low_stock(&state, &staff, LowStockQuery::default())
        .await
        .expect("low stock")
        .data
        .unwrap()
        .items;
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].product_id, keyboard);
}

#[tokio::test]
async fn inventory_create_rejects_unknown_or_tracked_products() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let audio = common::category(&state, &staff, "Audio").await;
    let tracked = common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 1).await;

    let unknown = inventory_service::create_inventory(
        &state,
        &staff,
        CreateInventoryRequest {
            product_id: 777,
            stock_quantity: 1,
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));

    let twice = inventory_service::create_inventory(
        &state,
        &staff,
        CreateInventoryRequest {
            product_id: tracked,
            stock_quantity: 1,
        },
    )
    .await;
    assert!(matches!(twice, Err(AppError::BadRequest(_))));

    let customer = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let forbidden = inventory_service::get_inventory(&state, &customer, 1).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));
}
