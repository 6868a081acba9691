pub mod admin_catalog_service;
pub mod cart_store;
pub mod catalog_service;
pub mod checkout_service;
pub mod dto;
pub mod order_reconciliation;

pub use admin_catalog_service::{AdminCatalogService, ResyncOutcome};
pub use cart_store::CartStore;
pub use catalog_service::CatalogService;
pub use checkout_service::{CheckoutOutcome, CheckoutService};
pub use dto::{
    AddItemRequest, AdminProductRow, CartView, ErrorResponse, ResyncResponse,
    SetQuantityRequest,
};
pub use order_reconciliation::{OrderReconciler, ReconciliationOutcome, ReturnRoute};
