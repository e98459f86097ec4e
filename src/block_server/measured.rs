//! Block server decorator that records call latency per operation.

use {
    crate::{
        block_server::{error::BlockServerError, interface::BlockServer},
        measure,
        metrics::{MetricsRegistry, Timer},
        models::{BlockContext, BlockCryptKeyServerHalf, BlockId, RequestContext, TlfId, UserQuotaInfo},
    },
    async_trait::async_trait,
    std::{collections::HashMap, sync::Arc},
};

pub const DEFAULT_SERVICE_NAME: &str = "BlockServer";

/// Delegates to another [`BlockServer`] and times every data operation.
///
/// Results and errors are handed back exactly as the delegate produced them.
/// `shutdown`, `refresh_auth_token` and `get_user_quota_info` are forwarded
/// without timing.
#[derive(Clone)]
pub struct BlockServerMeasured {
    delegate: Arc<dyn BlockServer>,
    get_timer: Timer,
    put_timer: Timer,
    add_block_reference_timer: Timer,
    remove_block_reference_timer: Timer,
    archive_block_references_timer: Timer,
}

impl BlockServerMeasured {
    pub fn new(delegate: Arc<dyn BlockServer>, registry: &MetricsRegistry) -> Self {
        Self::with_service_name(delegate, registry, DEFAULT_SERVICE_NAME)
    }

    /// Registers the timers as `<service_name>.<Operation>`.
    pub fn with_service_name(
        delegate: Arc<dyn BlockServer>,
        registry: &MetricsRegistry,
        service_name: &str,
    ) -> Self {
        let timer = |operation: &str| {
            registry.get_or_register_timer(&format!("{service_name}.{operation}"))
        };

        BlockServerMeasured {
            delegate,
            get_timer: timer("Get"),
            put_timer: timer("Put"),
            add_block_reference_timer: timer("AddBlockReference"),
            remove_block_reference_timer: timer("RemoveBlockReference"),
            archive_block_references_timer: timer("ArchiveBlockReferences"),
        }
    }
}

#[async_trait]
impl BlockServer for BlockServerMeasured {
    async fn get(
        &self,
        ctx: &RequestContext,
        id: BlockId,
        tlf_id: TlfId,
        context: &BlockContext,
    ) -> Result<(Vec<u8>, BlockCryptKeyServerHalf), BlockServerError> {
        measure!(self.get_timer, {
            self.delegate.get(ctx, id, tlf_id, context).await
        })
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
        measure!(self.put_timer, {
            self.delegate.put(ctx, id, tlf_id, context, buf, server_half).await
        })
    }

    async fn add_block_reference(
        &self,
        ctx: &RequestContext,
        id: BlockId,
        tlf_id: TlfId,
        context: &BlockContext,
    ) -> Result<(), BlockServerError> {
        measure!(self.add_block_reference_timer, {
            self.delegate.add_block_reference(ctx, id, tlf_id, context).await
        })
    }

    async fn remove_block_reference(
        &self,
        ctx: &RequestContext,
        tlf_id: TlfId,
        contexts: HashMap<BlockId, Vec<BlockContext>>,
    ) -> Result<HashMap<BlockId, usize>, BlockServerError> {
        measure!(self.remove_block_reference_timer, {
            self.delegate.remove_block_reference(ctx, tlf_id, contexts).await
        })
    }

    async fn archive_block_references(
        &self,
        ctx: &RequestContext,
        tlf_id: TlfId,
        contexts: HashMap<BlockId, Vec<BlockContext>>,
    ) -> Result<(), BlockServerError> {
        measure!(self.archive_block_references_timer, {
            self.delegate.archive_block_references(ctx, tlf_id, contexts).await
        })
    }

    fn shutdown(&self) {
        self.delegate.shutdown();
    }

    async fn refresh_auth_token(&self, ctx: &RequestContext) {
        self.delegate.refresh_auth_token(ctx).await;
    }

    async fn get_user_quota_info(
        &self,
        ctx: &RequestContext,
    ) -> Result<UserQuotaInfo, BlockServerError> {
        self.delegate.get_user_quota_info(ctx).await
    }
}
