pub mod http_storefront_api;
pub mod in_memory_cart_storage;
pub mod json_file_cart_storage;

pub use http_storefront_api::HttpStorefrontApi;
pub use in_memory_cart_storage::InMemoryCartStorage;
pub use json_file_cart_storage::JsonFileCartStorage;
