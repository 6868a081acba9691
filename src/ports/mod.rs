pub mod cart_storage_port;
pub mod storefront_api_port;

#[cfg(test)]
pub mod testing;

pub use cart_storage_port::CartStoragePort;
pub use storefront_api_port::{
    CheckoutItem, CheckoutRequest, CheckoutSession, ProductDraft, StorefrontApiPort,
};
