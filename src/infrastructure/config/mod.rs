pub mod storefront_config;

pub use storefront_config::StorefrontConfig;
