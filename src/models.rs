use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::{collections::HashMap, fmt},
    uuid::Uuid,
};

/// Content hash identifying a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub [u8; 32]);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Top-level folder a block belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TlfId(pub Uuid);

impl TlfId {
    pub fn new_random() -> Self {
        TlfId(Uuid::new_v4())
    }
}

impl fmt::Display for TlfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Distinguishes the references held on a single block. Zero is the
/// reference created by the initial put.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefNonce(pub u64);

impl RefNonce {
    pub const ZERO: RefNonce = RefNonce(0);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockContext {
    pub creator: Uuid,
    pub writer: Uuid,
    pub ref_nonce: RefNonce,
}

impl BlockContext {
    pub fn new(creator: Uuid, writer: Uuid, ref_nonce: RefNonce) -> Self {
        BlockContext {
            creator,
            writer,
            ref_nonce,
        }
    }

    /// Context of the first reference, created and written by the same user.
    pub fn first_ref(creator: Uuid) -> Self {
        Self::new(creator, creator, RefNonce::ZERO)
    }
}

/// Server-side half of a block's encryption key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCryptKeyServerHalf(pub [u8; 32]);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuotaInfo {
    /// Bytes stored per folder.
    pub folders: HashMap<TlfId, i64>,
    pub total_bytes: i64,
    pub limit_bytes: i64,
}

/// Per-call context handed through to the block server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub deadline: Option<DateTime<Utc>>,
}

impl Default for RequestContext {
    fn default() -> Self {
        RequestContext {
            request_id: Uuid::new_v4(),
            deadline: None,
        }
    }
}

impl RequestContext {
    pub fn with_deadline(deadline: DateTime<Utc>) -> Self {
        RequestContext {
            deadline: Some(deadline),
            ..Default::default()
        }
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Utc::now() >= deadline)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::Duration};

    #[test]
    fn test_block_id_display_is_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let id = BlockId(bytes);
        let text = id.to_string();

        assert_eq!(text.len(), 64);
        assert!(text.starts_with("ab00"));
        assert!(text.ends_with("01"));
    }

    #[test]
    fn test_request_context_deadline() {
        let past = RequestContext::with_deadline(Utc::now() - Duration::seconds(1));
        let future = RequestContext::with_deadline(Utc::now() + Duration::hours(1));

        assert!(past.is_expired());
        assert!(!future.is_expired());
        assert!(!RequestContext::default().is_expired());
    }
}
