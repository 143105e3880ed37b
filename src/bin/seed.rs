use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Set,
};
use technest_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Cart, Categories, Currencies, Orders, Products, Users,
        cart, cart_items, categories, currencies, inventory, order_items, orders, products, users,
    },
    models::{CurrencyCode, OrderStatus, Role},
    services::auth_service::hash_password,
};

struct SeedUser {
    username: &'static str,
    email: &'static str,
    password: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    address: &'static str,
    phone_number: &'static str,
    role: Role,
}

const USERS: &[SeedUser] = &[
    SeedUser {
        username: "admin_user",
        email: "admin@technest.com",
        password: "admin123",
        first_name: "Admin",
        last_name: "User",
        address: "1 Admin Way",
        phone_number: "111-222-3333",
        role: Role::Admin,
    },
    SeedUser {
        username: "staff_user",
        email: "staff@technest.com",
        password: "staff123",
        first_name: "Staff",
        last_name: "Person",
        address: "2 Staff St",
        phone_number: "444-555-6666",
        role: Role::Staff,
    },
    SeedUser {
        username: "johndoe",
        email: "john.doe@email.com",
        password: "customer123",
        first_name: "John",
        last_name: "Doe",
        address: "123 Maple Street",
        phone_number: "123-456-7890",
        role: Role::Customer,
    },
    SeedUser {
        username: "janesmith",
        email: "jane.smith@email.com",
        password: "customer123",
        first_name: "Jane",
        last_name: "Smith",
        address: "456 Oak Avenue",
        phone_number: "987-654-3210",
        role: Role::Customer,
    },
];

const CATEGORIES: &[(&str, &str)] = &[
    ("Smartphones", "The latest and greatest smartphones from top brands."),
    ("Laptops", "Powerful laptops for work, gaming, and everyday use."),
    ("Audio", "Headphones, earbuds, and speakers for immersive sound."),
    (
        "Gaming Peripherals",
        "Mice, keyboards, and headsets for the ultimate gaming experience.",
    ),
    ("Accessories", "Chargers, cases, and other essential tech accessories."),
];

const CURRENCIES: &[(CurrencyCode, &str)] = &[
    (CurrencyCode::Usd, "1.0000"),
    (CurrencyCode::Php, "0.0175"),
    (CurrencyCode::Krw, "0.0007"),
];

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: &'static str,
    category: &'static str,
    image_url: &'static str,
    brand: &'static str,
    stock: i32,
}

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "TechPhone 12",
        description: "A flagship smartphone with a stunning display and pro-grade camera.",
        price: "999.99",
        category: "Smartphones",
        image_url: "/images/techphone12.jpg",
        brand: "TechBrand",
        stock: 100,
    },
    SeedProduct {
        name: "ProBook X",
        description: "An ultrathin laptop with exceptional performance and all-day battery life.",
        price: "1299.99",
        category: "Laptops",
        image_url: "/images/probookx.jpg",
        brand: "TechBrand",
        stock: 50,
    },
    SeedProduct {
        name: "SoundWave Buds",
        description: "True wireless earbuds with active noise cancellation and rich audio.",
        price: "149.99",
        category: "Audio",
        image_url: "/images/soundwavebuds.jpg",
        brand: "AudioPhile",
        stock: 200,
    },
    SeedProduct {
        name: "GamerKey Pro",
        description: "A mechanical gaming keyboard with customizable RGB lighting.",
        price: "119.99",
        category: "Gaming Peripherals",
        image_url: "/images/gamerkeypro.jpg",
        brand: "GamerGear",
        stock: 75,
    },
    SeedProduct {
        name: "PowerUp Charger",
        description: "A fast-charging wall adapter for all your devices.",
        price: "29.99",
        category: "Accessories",
        image_url: "/images/powerupcharger.jpg",
        brand: "TechBrand",
        stock: 500,
    },
    SeedProduct {
        name: "Stealth Mouse",
        description: "A high-precision wireless gaming mouse with an ergonomic design.",
        price: "89.99",
        category: "Gaming Peripherals",
        image_url: "/images/stealthmouse.jpg",
        brand: "GamerGear",
        stock: 120,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let conn = create_orm_conn(&config.database_url).await?;
    run_migrations(&conn).await?;

    let mut user_ids = Vec::with_capacity(USERS.len());
    for user in USERS {
        user_ids.push(ensure_user(&conn, user).await?);
    }
    for (name, description) in CATEGORIES {
        ensure_category(&conn, name, description).await?;
    }
    for (code, rate) in CURRENCIES {
        ensure_currency(&conn, *code, rate).await?;
    }
    let mut product_ids = Vec::with_capacity(PRODUCTS.len());
    for product in PRODUCTS {
        product_ids.push(ensure_product(&conn, product).await?);
    }

    // johndoe: TechPhone 12 + GamerKey Pro, janesmith: 2x SoundWave Buds
    ensure_cart(&conn, user_ids[2], &[(product_ids[0], 1), (product_ids[3], 1)]).await?;
    ensure_cart(&conn, user_ids[3], &[(product_ids[2], 2)]).await?;
    ensure_past_order(&conn, user_ids[2], product_ids[5]).await?;

    println!("Seed completed.");
    Ok(())
}

async fn ensure_user(conn: &DatabaseConnection, seed: &SeedUser) -> anyhow::Result<i32> {
    if let Some(existing) = Users::find()
        .filter(users::Column::Email.eq(seed.email))
        .one(conn)
        .await?
    {
        return Ok(existing.user_id);
    }

    let now = Utc::now();
    let user = users::ActiveModel {
        user_id: NotSet,
        username: Set(seed.username.to_string()),
        email: Set(seed.email.to_string()),
        password_hash: Set(hash_password(seed.password)?),
        first_name: Set(Some(seed.first_name.to_string())),
        last_name: Set(Some(seed.last_name.to_string())),
        address: Set(Some(seed.address.to_string())),
        phone_number: Set(Some(seed.phone_number.to_string())),
        role: Set(seed.role.as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    println!("Ensured user {} (role={})", user.username, user.role);
    Ok(user.user_id)
}

async fn ensure_category(
    conn: &DatabaseConnection,
    name: &str,
    description: &str,
) -> anyhow::Result<i32> {
    if let Some(existing) = Categories::find()
        .filter(categories::Column::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(existing.category_id);
    }

    let category = categories::ActiveModel {
        category_id: NotSet,
        name: Set(name.to_string()),
        description: Set(Some(description.to_string())),
    }
    .insert(conn)
    .await?;
    Ok(category.category_id)
}

async fn ensure_currency(
    conn: &DatabaseConnection,
    code: CurrencyCode,
    rate: &str,
) -> anyhow::Result<()> {
    let exists = Currencies::find()
        .filter(currencies::Column::CurrencyCode.eq(code.as_str()))
        .count(conn)
        .await?;
    if exists > 0 {
        return Ok(());
    }

    currencies::ActiveModel {
        currency_id: NotSet,
        currency_code: Set(code.as_str().to_string()),
        symbol: Set(code.symbol().to_string()),
        exchange_rate_to_usd: Set(Decimal::from_str(rate)?),
    }
    .insert(conn)
    .await?;
    Ok(())
}

async fn ensure_product(conn: &DatabaseConnection, seed: &SeedProduct) -> anyhow::Result<i32> {
    if let Some(existing) = Products::find()
        .filter(products::Column::Name.eq(seed.name))
        .one(conn)
        .await?
    {
        return Ok(existing.product_id);
    }

    let category_id = ensure_category(conn, seed.category, "").await?;
    let usd = Currencies::find()
        .filter(currencies::Column::CurrencyCode.eq(CurrencyCode::Usd.as_str()))
        .one(conn)
        .await?
        .map(|c| c.currency_id);

    let now = Utc::now();
    let product = products::ActiveModel {
        product_id: NotSet,
        name: Set(seed.name.to_string()),
        description: Set(Some(seed.description.to_string())),
        price: Set(Decimal::from_str(seed.price)?),
        category_id: Set(category_id),
        image_url: Set(Some(seed.image_url.to_string())),
        brand: Set(Some(seed.brand.to_string())),
        currency_id: Set(usd),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    inventory::ActiveModel {
        inventory_id: NotSet,
        product_id: Set(product.product_id),
        stock_quantity: Set(seed.stock),
        last_updated: Set(now),
    }
    .insert(conn)
    .await?;

    println!("Ensured product {} (stock={})", product.name, seed.stock);
    Ok(product.product_id)
}

async fn ensure_cart(
    conn: &DatabaseConnection,
    user_id: i32,
    lines: &[(i32, i32)],
) -> anyhow::Result<()> {
    let exists = Cart::find()
        .filter(cart::Column::UserId.eq(user_id))
        .count(conn)
        .await?;
    if exists > 0 {
        return Ok(());
    }

    let now = Utc::now();
    let created = cart::ActiveModel {
        cart_id: NotSet,
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    for (product_id, quantity) in lines {
        cart_items::ActiveModel {
            cart_item_id: NotSet,
            cart_id: Set(created.cart_id),
            product_id: Set(*product_id),
            quantity: Set(*quantity),
            added_at: Set(now),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

async fn ensure_past_order(
    conn: &DatabaseConnection,
    user_id: i32,
    product_id: i32,
) -> anyhow::Result<()> {
    let exists = Orders::find()
        .filter(orders::Column::UserId.eq(user_id))
        .count(conn)
        .await?;
    if exists > 0 {
        return Ok(());
    }

    let product = Products::find_by_id(product_id)
        .one(conn)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {product_id} missing"))?;

    let order = orders::ActiveModel {
        order_id: NotSet,
        user_id: Set(user_id),
        order_date: Set(Utc::now()),
        total_amount: Set(product.price),
        status: Set(OrderStatus::Delivered.as_str().to_string()),
        shipping_address: Set("123 Maple Street".to_string()),
        currency_id: Set(product.currency_id),
    }
    .insert(conn)
    .await?;

    order_items::ActiveModel {
        order_item_id: NotSet,
        order_id: Set(order.order_id),
        product_id: Set(product.product_id),
        quantity: Set(1),
        price_at_purchase: Set(product.price),
    }
    .insert(conn)
    .await?;
    Ok(())
}
