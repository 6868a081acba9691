pub mod adapters;
pub mod config;

pub use adapters::{HttpStorefrontApi, InMemoryCartStorage, JsonFileCartStorage};
pub use config::StorefrontConfig;
