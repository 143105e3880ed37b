mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use technest_api::{
    dto::{
        cart_items::{CreateCartItemRequest, UpdateCartItemRequest},
        currencies::CreateCurrencyRequest,
        order_items::{CreateOrderItemRequest, UpdateOrderItemRequest},
        orders::{CheckoutRequest, UpdateOrderRequest},
    },
    entity::{CartItems, Inventory, Orders, TransactionLogs, inventory, transaction_logs},
    error::AppError,
    middleware::auth::AuthUser,
    models::{CurrencyCode, OrderStatus, Role},
    routes::params::{OrderItemQuery, OrderListQuery},
    services::{
        cart_item_service, cart_service, currency_service, order_item_service, order_service,
    },
    state::AppState,
};

async fn add(state: &AppState, user: &AuthUser, product_id: i32, quantity: i32) {
    cart_item_service::add_cart_item(
        state,
        user,
        CreateCartItemRequest {
            cart_id: None,
            product_id,
            quantity,
        },
    )
    .await
    .expect("add to cart");
}

async fn stock_of(state: &AppState, product_id: i32) -> i32 {
    Inventory::find()
        .filter(inventory::Column::ProductId.eq(product_id))
        .one(&state.orm)
        .await
        .unwrap()
        .expect("inventory row")
        .stock_quantity
}

fn checkout_to(address: &str) -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: address.to_string(),
    }
}

#[tokio::test]
async fn adding_the_same_product_twice_merges_quantities() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let customer = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let audio = common::category(&state, &staff, "Audio").await;
    let buds = common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 20).await;

    add(&state, &customer, buds, 2).await;
    add(&state, &customer, buds, 3).await;

    let cart = cart_service::my_cart(&state, &customer)
        .await
        .expect("cart")
        .data
        .unwrap();
    assert_eq!(cart.cart.user_id, customer.user_id);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].item.quantity, 5);
    assert_eq!(cart.items[0].product.name, "SoundWave Buds");

    let zero = cart_item_service::add_cart_item(
        &state,
        &customer,
        CreateCartItemRequest {
            cart_id: None,
            product_id: buds,
            quantity: 0,
        },
    )
    .await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));

    let unknown = cart_item_service::add_cart_item(
        &state,
        &customer,
        CreateCartItemRequest {
            cart_id: None,
            product_id: 9999,
            quantity: 1,
        },
    )
    .await;
    assert!(matches!(unknown, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn customers_cannot_touch_other_carts() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let john = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let jane = common::user_with_role(&state, "janesmith", Role::Customer).await;
    let audio = common::category(&state, &staff, "Audio").await;
    let buds = common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 20).await;

    add(&state, &john, buds, 1).await;
    let johns_cart = cart_service::my_cart(&state, &john).await.unwrap().data.unwrap();
    let line_id = johns_cart.items[0].item.cart_item_id;

    let peek = cart_service::get_cart(&state, &jane, johns_cart.cart.cart_id).await;
    assert!(matches!(peek, Err(AppError::Forbidden)));

    let tamper = cart_item_service::update_cart_item(
        &state,
        &jane,
        line_id,
        UpdateCartItemRequest { quantity: 9 },
    )
    .await;
    assert!(matches!(tamper, Err(AppError::Forbidden)));

    let staff_view = cart_service::get_cart(&state, &staff, johns_cart.cart.cart_id).await;
    assert!(staff_view.is_ok());
}

#[tokio::test]
async fn checkout_turns_cart_into_order() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let customer = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let gaming = common::category(&state, &staff, "Gaming Peripherals").await;
    let keyboard = common::product(&state, &staff, gaming, "GamerKey Pro", "12.50", 10).await;
    let mouse = common::product(&state, &staff, gaming, "Stealth Mouse", "3.25", 4).await;

    add(&state, &customer, keyboard, 2).await;
    add(&state, &customer, mouse, 4).await;

    let placed = order_service::checkout(&state, &customer, checkout_to("123 Maple Street"))
        .await
        .expect("checkout")
        .data
        .unwrap();

    assert_eq!(placed.order.user_id, customer.user_id);
    assert_eq!(placed.order.status, OrderStatus::Pending.as_str());
    assert_eq!(placed.order.total_amount, common::dec("38.00"));
    assert_eq!(placed.order.shipping_address, "123 Maple Street");
    assert_eq!(placed.items.len(), 2);
    let keyboard_line = placed
        .items
        .iter()
        .find(|i| i.product_id == keyboard)
        .expect("keyboard line");
    assert_eq!(keyboard_line.quantity, 2);
    assert_eq!(keyboard_line.price_at_purchase, common::dec("12.50"));

    assert_eq!(stock_of(&state, keyboard).await, 8);
    assert_eq!(stock_of(&state, mouse).await, 0);

    assert_eq!(CartItems::find().count(&state.orm).await.unwrap(), 0);

    let logs = TransactionLogs::find()
        .filter(transaction_logs::Column::ActionType.eq("CHECKOUT"))
        .all(&state.orm)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].table_name, "orders");
    assert_eq!(logs[0].record_id, placed.order.order_id);

    let fetched = order_service::get_order(&state, &customer, placed.order.order_id)
        .await
        .expect("owner reads order")
        .data
        .unwrap();
    assert_eq!(fetched.items.len(), 2);
}

#[tokio::test]
async fn checkout_with_insufficient_stock_changes_nothing() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let customer = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let laptops = common::category(&state, &staff, "Laptops").await;
    let accessories = common::category(&state, &staff, "Accessories").await;
    let laptop = common::product(&state, &staff, laptops, "ProBook X", "1299.50", 1).await;
    let charger = common::product(&state, &staff, accessories, "PowerUp Charger", "29.50", 50).await;

    add(&state, &customer, charger, 3).await;
    add(&state, &customer, laptop, 2).await;

    let result = order_service::checkout(&state, &customer, checkout_to("1 Main St")).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    assert_eq!(Orders::find().count(&state.orm).await.unwrap(), 0);
    assert_eq!(CartItems::find().count(&state.orm).await.unwrap(), 2);
    assert_eq!(stock_of(&state, charger).await, 50);
    assert_eq!(stock_of(&state, laptop).await, 1);
    assert_eq!(TransactionLogs::find().count(&state.orm).await.unwrap(), 0);
}

#[tokio::test]
async fn checkout_rejects_empty_cart_blank_address_and_non_customers() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let customer = common::user_with_role(&state, "johndoe", Role::Customer).await;

    let no_cart = order_service::checkout(&state, &customer, checkout_to("1 Main St")).await;
    assert!(matches!(no_cart, Err(AppError::BadRequest(_))));

    cart_service::my_cart(&state, &customer).await.expect("creates cart");
    let empty = order_service::checkout(&state, &customer, checkout_to("1 Main St")).await;
    assert!(matches!(empty, Err(AppError::BadRequest(_))));

    let audio = common::category(&state, &staff, "Audio").await;
    let buds = common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 5).await;
    add(&state, &customer, buds, 1).await;
    let blank = order_service::checkout(&state, &customer, checkout_to("   ")).await;
    assert!(matches!(blank, Err(AppError::BadRequest(_))));

    let staff_checkout = order_service::checkout(&state, &staff, checkout_to("HQ")).await;
    assert!(matches!(staff_checkout, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn checkout_rejects_mixed_currencies_and_carries_a_single_one() {
    let state = common::test_state().await;
    let admin = common::user_with_role(&state, "admin_user", Role::Admin).await;
    let customer = common::user_with_role(&state, "johndoe", Role::Customer).await;

    let mut currency_ids = Vec::new();
    for (code, rate) in [(CurrencyCode::Usd, "1"), (CurrencyCode::Php, "0.0175")] {
        let created = currency_service::create_currency(
            &state,
            &admin,
            CreateCurrencyRequest {
                currency_code: code,
                symbol: None,
                exchange_rate_to_usd: common::dec(rate),
            },
        )
        .await
        .expect("currency")
        .data
        .unwrap();
        currency_ids.push(created.currency_id);
    }

    let audio = common::category(&state, &admin, "Audio").await;
    let usd_buds = common::product_in_currency(
        &state, &admin, audio, "Buds USD", "10.50", 5, Some(currency_ids[0]),
    )
    .await;
    let php_buds = common::product_in_currency(
        &state, &admin, audio, "Buds PHP", "500.00", 5, Some(currency_ids[1]),
    )
    .await;

    add(&state, &customer, usd_buds, 1).await;
    add(&state, &customer, php_buds, 1).await;
    let mixed = order_service::checkout(&state, &customer, checkout_to("1 Main St")).await;
    assert!(matches!(mixed, Err(AppError::BadRequest(_))));

    let cart = cart_service::my_cart(&state, &customer).await.unwrap().data.unwrap();
    let php_line = cart
        .items
        .iter()
        .find(|l| l.product.product_id == php_buds)
        .unwrap()
        .item
        .cart_item_id;
    cart_item_service::delete_cart_item(&state, &customer, php_line)
        .await
        .expect("remove line");

    let placed = order_service::checkout(&state, &customer, checkout_to("1 Main St"))
        .await
        .expect("single currency checkout")
        .data
        .unwrap();
    assert_eq!(placed.order.currency_id, Some(currency_ids[0]));
}

#[tokio::test]
async fn order_visibility_and_staff_updates() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let john = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let jane = common::user_with_role(&state, "janesmith", Role::Customer).await;
    let audio = common::category(&state, &staff, "Audio").await;
    let buds = common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 10).await;

    add(&state, &john, buds, 1).await;
    let johns = order_service::checkout(&state, &john, checkout_to("123 Maple Street"))
        .await
        .unwrap()
        .data
        .unwrap()
        .order;
    add(&state, &jane, buds, 2).await;
    order_service::checkout(&state, &jane, checkout_to("456 Oak Avenue"))
        .await
        .unwrap();

    let janes_view = order_service::list_orders(&state, &jane, OrderListQuery::default())
        .await
        .unwrap();
    assert_eq!(janes_view.meta.and_then(|m| m.total), Some(1));

    let staff_view = order_service::list_orders(&state, &staff, OrderListQuery::default())
        .await
        .unwrap();
    assert_eq!(staff_view.meta.and_then(|m| m.total), Some(2));

    let snoop = order_service::get_order(&state, &jane, johns.order_id).await;
    assert!(matches!(snoop, Err(AppError::Forbidden)));

    let customer_update = order_service::update_order(
        &state,
        &john,
        johns.order_id,
        UpdateOrderRequest {
            status: Some(OrderStatus::Cancelled),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(customer_update, Err(AppError::Forbidden)));

    let shipped = order_service::update_order(
        &state,
        &staff,
        johns.order_id,
        UpdateOrderRequest {
            status: Some(OrderStatus::Shipped),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(shipped.status, "shipped");

    let only_shipped = order_service::list_orders(
        &state,
        &staff,
        OrderListQuery {
            status: Some("shipped".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(only_shipped.data.unwrap().items.len(), 1);

    let bad_status = order_service::list_orders(
        &state,
        &staff,
        OrderListQuery {
            status: Some("teleported".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(bad_status, Err(AppError::BadRequest(_))));

    order_service::delete_order(&state, &staff, johns.order_id)
        .await
        .expect("delete order");
    assert!(matches!(
        order_service::get_order(&state, &staff, johns.order_id).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn a_cart_is_converted_into_a_single_order() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let customer = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let audio = common::category(&state, &staff, "Audio").await;
    let buds = common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 10).await;

    add(&state, &customer, buds, 2).await;
    order_service::checkout(&state, &customer, checkout_to("123 Maple Street"))
        .await
        .expect("first checkout");

    let again = order_service::checkout(&state, &customer, checkout_to("123 Maple Street")).await;
    assert!(matches!(again, Err(AppError::BadRequest(_))));

    assert_eq!(Orders::find().count(&state.orm).await.unwrap(), 1);
    assert_eq!(stock_of(&state, buds).await, 8);
}

#[tokio::test]
async fn staff_can_detach_an_order_from_its_currency() {
    let state = common::test_state().await;
    let admin = common::user_with_role(&state, "admin_user", Role::Admin).await;
    let customer = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let usd = currency_service::create_currency(
        &state,
        &admin,
        CreateCurrencyRequest {
            currency_code: CurrencyCode::Usd,
            symbol: None,
            exchange_rate_to_usd: common::dec("1"),
        },
    )
    .await
    .unwrap()
    .data
    .unwrap()
    .currency_id;
    let audio = common::category(&state, &admin, "Audio").await;
    let buds =
        common::product_in_currency(&state, &admin, audio, "SoundWave Buds", "10.50", 5, Some(usd))
            .await;

    add(&state, &customer, buds, 1).await;
    let order = order_service::checkout(&state, &customer, checkout_to("1 Main St"))
        .await
        .unwrap()
        .data
        .unwrap()
        .order;
    assert_eq!(order.currency_id, Some(usd));

    let detached = order_service::update_order(
        &state,
        &admin,
        order.order_id,
        UpdateOrderRequest {
            clear_currency: true,
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(detached.currency_id, None);
}

#[tokio::test]
async fn staff_maintain_order_items_and_owners_read_them() {
    let state = common::test_state().await;
    let staff = common::user_with_role(&state, "staff_user", Role::Staff).await;
    let john = common::user_with_role(&state, "johndoe", Role::Customer).await;
    let jane = common::user_with_role(&state, "janesmith", Role::Customer).await;
    let audio = common::category(&state, &staff, "Audio").await;
    let buds = common::product(&state, &staff, audio, "SoundWave Buds", "149.50", 10).await;
    let cable = common::product(&state, &staff, audio, "Braided Cable", "9.25", 10).await;

    add(&state, &john, buds, 1).await;
    let johns = order_service::checkout(&state, &john, checkout_to("123 Maple Street"))
        .await
        .unwrap()
        .data
        .unwrap()
        .order;
    add(&state, &jane, buds, 1).await;
    order_service::checkout(&state, &jane, checkout_to("456 Oak Avenue"))
        .await
        .unwrap();

    let by_customer = order_item_service::create_order_item(
        &state,
        &john,
        CreateOrderItemRequest {
            order_id: johns.order_id,
            product_id: cable,
            quantity: 1,
            price_at_purchase: None,
        },
    )
    .await;
    assert!(matches!(by_customer, Err(AppError::Forbidden)));

    let unknown_order = order_item_service::create_order_item(
        &state,
        &staff,
        CreateOrderItemRequest {
            order_id: 9999,
            product_id: cable,
            quantity: 1,
            price_at_purchase: None,
        },
    )
    .await;
    assert!(matches!(unknown_order, Err(AppError::BadRequest(_))));

    let added = order_item_service::create_order_item(
        &state,
        &staff,
        CreateOrderItemRequest {
            order_id: johns.order_id,
            product_id: cable,
            quantity: 2,
            price_at_purchase: None,
        },
    )
    .await
    .expect("staff adds a line")
    .data
    .unwrap();
    assert_eq!(added.price_at_purchase, common::dec("9.25"));

    let johns_lines = order_item_service::list_order_items(
        &state,
        &staff,
        OrderItemQuery {
            order_id: Some(johns.order_id),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(johns_lines.data.unwrap().items.len(), 2);

    let all_for_staff = order_item_service::list_order_items(&state, &staff, OrderItemQuery::default())
        .await
        .unwrap();
    assert_eq!(all_for_staff.meta.and_then(|m| m.total), Some(3));

    let janes_view = order_item_service::list_order_items(&state, &jane, OrderItemQuery::default())
        .await
        .unwrap();
    assert_eq!(janes_view.meta.and_then(|m| m.total), Some(1));

    assert!(order_item_service::get_order_item(&state, &john, added.order_item_id)
        .await
        .is_ok());
    assert!(matches!(
        order_item_service::get_order_item(&state, &jane, added.order_item_id).await,
        Err(AppError::Forbidden)
    ));

    let updated = order_item_service::update_order_item(
        &state,
        &staff,
        added.order_item_id,
        UpdateOrderItemRequest {
            quantity: Some(3),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(updated.quantity, 3);

    let zero = order_item_service::update_order_item(
        &state,
        &staff,
        added.order_item_id,
        UpdateOrderItemRequest {
            quantity: Some(0),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(zero, Err(AppError::BadRequest(_))));

    order_item_service::delete_order_item(&state, &staff, added.order_item_id)
        .await
        .expect("delete line");
    assert!(matches!(
        order_item_service::get_order_item(&state, &staff, added.order_item_id).await,
        Err(AppError::NotFound)
    ));
}
