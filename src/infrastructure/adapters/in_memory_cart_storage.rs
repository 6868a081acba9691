use crate::domain::errors::DomainResult;
use crate::ports::cart_storage_port::CartStoragePort;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// 内存购物车存储（进程退出即丢失）
#[derive(Debug, Default)]
pub struct InMemoryCartStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryCartStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一份已持久化的文档
    #[cfg(test)]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        storage
    }
}

impl CartStoragePort for InMemoryCartStorage {
    fn load(&self, key: &str) -> DomainResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn store(&self, key: &str, value: &str) -> DomainResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
