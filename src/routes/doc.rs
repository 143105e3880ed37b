use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{CartLine, CartList, CartWithItems, CreateCartRequest, UpdateCartRequest},
        cart_items::{CartItemList, CreateCartItemRequest, UpdateCartItemRequest},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        currencies::{Conversion, CreateCurrencyRequest, CurrencyList, UpdateCurrencyRequest},
        inventory::{
            CreateInventoryRequest, InventoryAdjustRequest, InventoryList, UpdateInventoryRequest,
        },
        logs::{CreateTransactionLogRequest, LogList, UpdateTransactionLogRequest},
        order_items::{CreateOrderItemRequest, OrderItemList, UpdateOrderItemRequest},
        orders::{
            CheckoutRequest, CreateOrderRequest, OrderList, OrderWithItems, UpdateOrderRequest,
        },
        products::{CreateProductRequest, ProductList, ProductWithStock, UpdateProductRequest},
        users::{CreateUserRequest, UpdateUserRequest, UserList},
    },
    models::{
        Cart, CartItem, Category, Currency, CurrencyCode, InventoryItem, LogEntry, Order,
        OrderItem, OrderStatus, Product, Role, User,
    },
    response::Meta,
    routes::{
        audit_logs, auth, cart, cart_items, categories, currencies, health, inventory,
        order_items, orders, params, products, transaction_logs, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        inventory::list_inventory,
        inventory::low_stock,
        inventory::get_inventory,
        inventory::create_inventory,
        inventory::update_inventory,
        inventory::adjust_inventory,
        inventory::delete_inventory,
        cart::my_cart,
        cart::list_carts,
        cart::get_cart,
        cart::create_cart,
        cart::update_cart,
        cart::delete_cart,
        cart_items::list_cart_items,
        cart_items::get_cart_item,
        cart_items::add_cart_item,
        cart_items::update_cart_item,
        cart_items::delete_cart_item,
        orders::checkout,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
        order_items::list_order_items,
        order_items::get_order_item,
        order_items::create_order_item,
        order_items::update_order_item,
        order_items::delete_order_item,
        transaction_logs::list_transaction_logs,
        transaction_logs::get_transaction_log,
        transaction_logs::create_transaction_log,
        transaction_logs::update_transaction_log,
        transaction_logs::delete_transaction_log,
        audit_logs::list_audit_logs,
        audit_logs::get_audit_log,
        currencies::list_currencies,
        currencies::convert,
        currencies::get_currency,
        currencies::create_currency,
        currencies::update_currency,
        currencies::delete_currency
    ),
    components(
        schemas(
            Role,
            OrderStatus,
            CurrencyCode,
            User,
            Category,
            Product,
            InventoryItem,
            Cart,
            CartItem,
            Order,
            OrderItem,
            LogEntry,
            Currency,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductWithStock,
            ProductList,
            CreateInventoryRequest,
            UpdateInventoryRequest,
            InventoryAdjustRequest,
            InventoryList,
            CreateCartRequest,
            UpdateCartRequest,
            CartLine,
            CartWithItems,
            CartList,
            CreateCartItemRequest,
            UpdateCartItemRequest,
            CartItemList,
            CheckoutRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderWithItems,
            OrderList,
            CreateOrderItemRequest,
            UpdateOrderItemRequest,
            OrderItemList,
            CreateTransactionLogRequest,
            UpdateTransactionLogRequest,
            LogList,
            CreateCurrencyRequest,
            UpdateCurrencyRequest,
            Conversion,
            CurrencyList,
            params::SortOrder,
            params::ProductSortBy,
            Meta
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and session cookie"),
        (name = "Users", description = "User administration"),
        (name = "Categories", description = "Product categories"),
        (name = "Products", description = "Product catalog"),
        (name = "Inventory", description = "Stock levels"),
        (name = "Cart", description = "Shopping carts"),
        (name = "Cart items", description = "Cart lines"),
        (name = "Orders", description = "Checkout and order management"),
        (name = "Order items", description = "Order lines"),
        (name = "Transaction logs", description = "Stock and checkout ledger"),
        (name = "Audit logs", description = "Mutation audit trail"),
        (name = "Currencies", description = "Currencies and conversion"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
