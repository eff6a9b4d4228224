//! Domain models mirroring the hosted backend's tables.

pub mod order;
pub mod product;

pub use order::{Order, OrderItem, OrderProductInfo, OrderStatus};
pub use product::{NewProduct, Product, ProductPatch};
