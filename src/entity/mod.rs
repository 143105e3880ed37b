pub mod audit_logs;
pub mod cart;
pub mod cart_items;
pub mod categories;
pub mod currencies;
pub mod inventory;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod transaction_logs;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart::Entity as Cart;
pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use currencies::Entity as Currencies;
pub use inventory::Entity as Inventory;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use transaction_logs::Entity as TransactionLogs;
pub use users::Entity as Users;
