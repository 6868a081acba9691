use crate::domain::errors::DomainResult;
use crate::domain::{Cart, LineItem};
use crate::ports::CartStoragePort;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// 购物车持久化使用的固定键
pub const CART_STORAGE_KEY: &str = "cart";

/// 购物车引擎
///
/// 创建时读取一次持久化数据；之后每次修改都先写入存储，写入成功才提交到内存，
/// 因此内存状态与持久化文档始终一致。
pub struct CartStore<S: CartStoragePort> {
    storage: Arc<S>,
    cart: Mutex<Cart>,
}

impl<S: CartStoragePort> CartStore<S> {
    /// 从存储恢复购物车，数据缺失或损坏时退化为空购物车
    pub fn open(storage: Arc<S>) -> Self {
        let cart = match storage.load(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => {
                    info!("Cart restored with {} line items", cart.items().len());
                    cart
                }
                Err(e) => {
                    warn!("Discarding malformed persisted cart: {}", e);
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!("Failed to read persisted cart, starting empty: {}", e);
                Cart::new()
            }
        };

        Self {
            storage,
            cart: Mutex::new(cart),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate(&self, op: impl FnOnce(&mut Cart) -> DomainResult<()>) -> DomainResult<()> {
        let mut current = self.lock();
        let mut next = current.clone();
        op(&mut next)?;

        let raw = serde_json::to_string(&next)?;
        self.storage.store(CART_STORAGE_KEY, &raw)?;
        *current = next;
        Ok(())
    }

    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    pub fn add_item(&self, item: LineItem) -> DomainResult<()> {
        debug!("Adding {} x product {} to cart", item.quantity, item.product_id);
        self.mutate(|cart| cart.add_item(item))
    }

    pub fn set_quantity(&self, product_id: i64, quantity: i64) -> DomainResult<()> {
        debug!("Setting product {} quantity to {}", product_id, quantity);
        self.mutate(|cart| {
            cart.set_quantity(product_id, quantity);
            Ok(())
        })
    }

    pub fn remove_item(&self, product_id: i64) -> DomainResult<()> {
        debug!("Removing product {} from cart", product_id);
        self.mutate(|cart| {
            cart.remove_item(product_id);
            Ok(())
        })
    }

    pub fn clear(&self) -> DomainResult<()> {
        info!("Clearing cart");
        self.mutate(|cart| {
            cart.clear();
            Ok(())
        })
    }

    #[cfg(test)]
    pub fn total(&self) -> i64 {
        self.lock().total()
    }

    #[cfg(test)]
    pub fn item_count(&self) -> u64 {
        self.lock().item_count()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fixtures::line_item;
    use crate::domain::errors::DomainError;
    use crate::infrastructure::InMemoryCartStorage;

    struct ReadOnlyStorage;

    impl CartStoragePort for ReadOnlyStorage {
        fn load(&self, _key: &str) -> DomainResult<Option<String>> {
            Ok(None)
        }

        fn store(&self, _key: &str, _value: &str) -> DomainResult<()> {
            Err(DomainError::StorageError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn persisted(storage: &InMemoryCartStorage) -> Cart {
        let raw = storage.load(CART_STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_every_mutation_is_written_through() {
        let storage = Arc::new(InMemoryCartStorage::new());
        let store = CartStore::open(storage.clone());

        store.add_item(line_item(1, 2, 1500)).unwrap();
        assert_eq!(persisted(&storage), store.snapshot());

        store.set_quantity(1, 5).unwrap();
        assert_eq!(persisted(&storage).get(1).unwrap().quantity, 5);

        store.remove_item(1).unwrap();
        assert!(persisted(&storage).is_empty());
    }

    #[test]
    fn test_rehydrates_identical_items() {
        let storage = Arc::new(InMemoryCartStorage::new());
        let store = CartStore::open(storage.clone());
        store.add_item(line_item(3, 1, 333)).unwrap();
        store.add_item(line_item(1, 2, 1500)).unwrap();
        let mut no_image = line_item(2, 4, 99);
        no_image.display_image = None;
        store.add_item(no_image).unwrap();

        let reopened = CartStore::open(storage);
        assert_eq!(reopened.snapshot(), store.snapshot());
        assert_eq!(reopened.total(), 333 + 3000 + 396);
        assert_eq!(reopened.item_count(), 7);
    }

    #[test]
    fn test_malformed_or_invalid_document_degrades_to_empty() {
        for raw in [
            "not json",
            r#"{"items": 3}"#,
            r#"[{"product_id": 1, "quantity": 0, "unit_price_minor": 1, "currency": "usd", "display_title": "x"}]"#,
        ] {
            let storage = Arc::new(InMemoryCartStorage::with_entry(CART_STORAGE_KEY, raw));
            let store = CartStore::open(storage);
            assert!(store.is_empty(), "expected empty cart for {}", raw);
        }
    }

    #[test]
    fn test_zero_quantity_add_is_rejected_before_write() {
        let storage = Arc::new(InMemoryCartStorage::new());
        let store = CartStore::open(storage.clone());
        store.add_item(line_item(1, 2, 1500)).unwrap();

        let mut zero = line_item(2, 1, 700);
        zero.quantity = 0;
        let result = store.add_item(zero);

        assert!(matches!(result, Err(DomainError::ValidationError(_))));
        let reopened = CartStore::open(storage);
        assert_eq!(reopened.snapshot(), store.snapshot());
        assert_eq!(reopened.item_count(), 2);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let storage = Arc::new(InMemoryCartStorage::new());
        let store = CartStore::open(storage.clone());
        store.add_item(line_item(1, 1, 100)).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();

        assert!(store.is_empty());
        assert_eq!(storage.load(CART_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let store = CartStore::open(Arc::new(ReadOnlyStorage));

        let result = store.add_item(line_item(1, 1, 100));

        assert!(matches!(result, Err(DomainError::StorageError(_))));
        assert!(store.is_empty());
    }
}
