use crate::domain::errors::DomainResult;

/// 购物车本地持久化端口
///
/// 按固定键读写一份序列化文档。读写都是同步的，
/// 写入与触发它的状态变更保持顺序一致。
pub trait CartStoragePort: Send + Sync + 'static {
    /// 读取键对应的文档，不存在时返回 None
    fn load(&self, key: &str) -> DomainResult<Option<String>>;

    /// 覆盖写入键对应的文档
    fn store(&self, key: &str, value: &str) -> DomainResult<()>;
}
