use {crate::models::BlockId, thiserror::Error};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockServerError {
    #[error("Block {0} does not exist")]
    BlockNonExistent(BlockId),
    #[error("Block {0} has no remaining references")]
    BlockDeleted(BlockId),
    #[error("Block {0} is archived")]
    BlockArchived(BlockId),
    #[error("Block {0} belongs to a different folder")]
    WrongFolder(BlockId),
    #[error("Block {0} was put again with different contents")]
    PayloadMismatch(BlockId),
    #[error("Permission denied")]
    NoPermission,
    #[error("Quota exceeded: {used} of {limit} bytes")]
    OverQuota { used: i64, limit: i64 },
    #[error("Request throttled by block server")]
    Throttle,
    #[error("Request deadline exceeded")]
    DeadlineExceeded,
    #[error("Block server has been shut down")]
    Shutdown,
    #[error("Block server unavailable: {0}")]
    Unavailable(String),
}
