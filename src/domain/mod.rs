pub mod entities;
pub mod errors;
pub mod timestamps;
pub mod value_objects;

pub use entities::{Cart, CatalogProduct, LineItem, Order};
pub use value_objects::{Currency, Money};
