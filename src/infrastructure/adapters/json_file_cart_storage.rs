use crate::domain::errors::{DomainError, DomainResult};
use crate::ports::cart_storage_port::CartStoragePort;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 文件购物车存储：每个键对应目录下的一个 `<key>.json` 文件
#[derive(Debug, Clone)]
pub struct JsonFileCartStorage {
    dir: PathBuf,
}

impl JsonFileCartStorage {
    pub fn new(dir: impl Into<PathBuf>) -> DomainResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> DomainResult<PathBuf> {
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(DomainError::ValidationError(format!(
                "Invalid storage key: {}",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl CartStoragePort for JsonFileCartStorage {
    fn load(&self, key: &str) -> DomainResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // 先写临时文件再重命名，避免中途崩溃留下半份文档
    fn store(&self, key: &str, value: &str) -> DomainResult<()> {
        let path = self.path_for(key)?;
        let tmp = tmp_path(&path);

        let mut file = fs::File::create(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;

        debug!("Cart document written: {}", path.display());
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
