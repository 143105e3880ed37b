pub mod auth;
pub mod cart;
pub mod cart_items;
pub mod categories;
pub mod currencies;
pub mod inventory;
pub mod logs;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod users;
