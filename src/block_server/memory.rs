//! In-memory block server for tests and local runs.

use {
    crate::{
        block_server::{error::BlockServerError, interface::BlockServer},
        models::{
            BlockContext, BlockCryptKeyServerHalf, BlockId, RefNonce, RequestContext, TlfId,
            UserQuotaInfo,
        },
    },
    async_trait::async_trait,
    dashmap::{DashMap, DashSet, mapref::entry::Entry},
    std::{
        collections::HashMap,
        sync::atomic::{AtomicBool, AtomicI64, Ordering},
    },
    tracing::{debug, info},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefStatus {
    Live,
    Archived,
}

#[derive(Debug, Clone)]
struct BlockEntry {
    tlf_id: TlfId,
    data: Vec<u8>,
    server_half: BlockCryptKeyServerHalf,
    refs: HashMap<RefNonce, RefStatus>,
}

impl BlockEntry {
    fn all_archived(&self) -> bool {
        !self.refs.is_empty() && self.refs.values().all(|s| *s == RefStatus::Archived)
    }
}

pub struct BlockServerMemory {
    blocks: DashMap<BlockId, BlockEntry>,
    // Ids whose last reference was removed; cleared again by a fresh put.
    deleted: DashSet<BlockId>,
    used_bytes: AtomicI64,
    quota_limit_bytes: i64,
    shut_down: AtomicBool,
}

impl Default for BlockServerMemory {
    fn default() -> Self {
        Self::new(i64::MAX)
    }
}

impl BlockServerMemory {
    pub fn new(quota_limit_bytes: i64) -> Self {
        BlockServerMemory {
            blocks: DashMap::new(),
            deleted: DashSet::new(),
            used_bytes: AtomicI64::new(0),
            quota_limit_bytes,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn check_request(&self, ctx: &RequestContext) -> Result<(), BlockServerError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(BlockServerError::Shutdown);
        }
        if ctx.is_expired() {
            return Err(BlockServerError::DeadlineExceeded);
        }
        Ok(())
    }

    fn missing(&self, id: BlockId) -> BlockServerError {
        if self.deleted.contains(&id) {
            BlockServerError::BlockDeleted(id)
        } else {
            BlockServerError::BlockNonExistent(id)
        }
    }

    /// Reserves quota for `size` more bytes, or fails without reserving.
    fn reserve(&self, size: i64) -> Result<(), BlockServerError> {
        let previous = self.used_bytes.fetch_add(size, Ordering::AcqRel);
        let used = previous.saturating_add(size);
        if used > self.quota_limit_bytes {
            self.used_bytes.fetch_sub(size, Ordering::AcqRel);
            return Err(BlockServerError::OverQuota {
                used,
                limit: self.quota_limit_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BlockServer for BlockServerMemory {
    async fn get(
        &self,
        ctx: &RequestContext,
        id: BlockId,
        tlf_id: TlfId,
        _context: &BlockContext,
    ) -> Result<(Vec<u8>, BlockCryptKeyServerHalf), BlockServerError> {
        self.check_request(ctx)?;

        let Some(entry) = self.blocks.get(&id) else {
            return Err(self.missing(id));
        };
        if entry.tlf_id != tlf_id {
            return Err(BlockServerError::WrongFolder(id));
        }

        Ok((entry.data.clone(), entry.server_half))
    }

    async fn put(
        &self,
        ctx: &RequestContext,
        id: BlockId,
        tlf_id: TlfId,
        context: &BlockContext,
        buf: Vec<u8>,
        server_half: BlockCryptKeyServerHalf,
    ) -> Result<(), BlockServerError> {
        self.check_request(ctx)?;

        match self.blocks.entry(id) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.tlf_id != tlf_id {
                    return Err(BlockServerError::WrongFolder(id));
                }
                if entry.data != buf {
                    return Err(BlockServerError::PayloadMismatch(id));
                }
                entry.refs.entry(context.ref_nonce).or_insert(RefStatus::Live);
            }
            Entry::Vacant(vacant) => {
                self.reserve(buf.len() as i64)?;
                debug!("Storing block {} ({} bytes) in folder {}", id, buf.len(), tlf_id);
                self.deleted.remove(&id);
                vacant.insert(BlockEntry {
                    tlf_id,
                    data: buf,
                    server_half,
                    refs: HashMap::from([(context.ref_nonce, RefStatus::Live)]),
                });
            }
        }

        Ok(())
    }

    async fn add_block_reference(
        &self,
        ctx: &RequestContext,
        id: BlockId,
        tlf_id: TlfId,
        context: &BlockContext,
    ) -> Result<(), BlockServerError> {
        self.check_request(ctx)?;

        let Some(mut entry) = self.blocks.get_mut(&id) else {
            return Err(self.missing(id));
        };
        if entry.tlf_id != tlf_id {
            return Err(BlockServerError::WrongFolder(id));
        }
        if entry.all_archived() {
            return Err(BlockServerError::BlockArchived(id));
        }

        match entry.refs.get(&context.ref_nonce) {
            Some(RefStatus::Archived) => Err(BlockServerError::BlockArchived(id)),
            Some(RefStatus::Live) => Ok(()),
            None => {
                entry.refs.insert(context.ref_nonce, RefStatus::Live);
                Ok(())
            }
        }
    }

    async fn remove_block_reference(
        &self,
        ctx: &RequestContext,
        tlf_id: TlfId,
        contexts: HashMap<BlockId, Vec<BlockContext>>,
    ) -> Result<HashMap<BlockId, usize>, BlockServerError> {
        self.check_request(ctx)?;

        let mut live_counts = HashMap::with_capacity(contexts.len());

        for (id, block_contexts) in contexts {
            let remaining = {
                let Some(mut entry) = self.blocks.get_mut(&id) else {
                    live_counts.insert(id, 0);
                    continue;
                };

                if entry.tlf_id != tlf_id {
                    return Err(BlockServerError::WrongFolder(id));
                }
                for context in &block_contexts {
                    entry.refs.remove(&context.ref_nonce);
                }
                entry.refs.len()
            };

            if remaining == 0 {
                if let Some((_, entry)) = self.blocks.remove_if(&id, |_, entry| entry.refs.is_empty()) {
                    debug!("Deleting unreferenced block {}", id);
                    self.used_bytes.fetch_sub(entry.data.len() as i64, Ordering::AcqRel);
                    self.deleted.insert(id);
                }
            }
            live_counts.insert(id, remaining);
        }

        Ok(live_counts)
    }

    async fn archive_block_references(
        &self,
        ctx: &RequestContext,
        tlf_id: TlfId,
        contexts: HashMap<BlockId, Vec<BlockContext>>,
    ) -> Result<(), BlockServerError> {
        self.check_request(ctx)?;

        // Every reference is checked before any is archived, so a failed call
        // leaves the store untouched.
        for (id, block_contexts) in &contexts {
            let Some(entry) = self.blocks.get(id) else {
                return Err(self.missing(*id));
            };
            if entry.tlf_id != tlf_id {
                return Err(BlockServerError::WrongFolder(*id));
            }
            if block_contexts
                .iter()
                .any(|context| !entry.refs.contains_key(&context.ref_nonce))
            {
                return Err(BlockServerError::BlockNonExistent(*id));
            }
        }

        for (id, block_contexts) in contexts {
            if let Some(mut entry) = self.blocks.get_mut(&id) {
                for context in &block_contexts {
                    if let Some(status) = entry.refs.get_mut(&context.ref_nonce) {
                        *status = RefStatus::Archived;
                    }
                }
            }
        }

        Ok(())
    }

    fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::AcqRel) {
            info!("Shutting down in-memory block server with {} blocks", self.blocks.len());
            self.blocks.clear();
            self.deleted.clear();
            self.used_bytes.store(0, Ordering::Release);
        }
    }

    async fn refresh_auth_token(&self, ctx: &RequestContext) {
        debug!("Auth token refresh requested ({}); nothing to refresh", ctx.request_id);
    }

    async fn get_user_quota_info(
        &self,
        ctx: &RequestContext,
    ) -> Result<UserQuotaInfo, BlockServerError> {
        self.check_request(ctx)?;

        let mut info = UserQuotaInfo {
            limit_bytes: self.quota_limit_bytes,
            ..Default::default()
        };
        for entry in self.blocks.iter() {
            let size = entry.data.len() as i64;
            *info.folders.entry(entry.tlf_id).or_insert(0) += size;
            info.total_bytes += size;
        }

        Ok(info)
    }
}
