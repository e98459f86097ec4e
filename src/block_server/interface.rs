use {
    crate::{
        block_server::error::BlockServerError,
        models::{BlockContext, BlockCryptKeyServerHalf, BlockId, RequestContext, TlfId, UserQuotaInfo},
    },
    async_trait::async_trait,
    std::collections::HashMap,
};

/// Operations offered by a block server. Implementations are expected to be
/// usable behind an `Arc<dyn BlockServer>` so they can be layered.
#[async_trait]
pub trait BlockServer: Send + Sync {
    /// Fetches a block's contents together with its server-side key half.
    async fn get(
        &self,
        ctx: &RequestContext,
        id: BlockId,
        tlf_id: TlfId,
        context: &BlockContext,
    ) -> Result<(Vec<u8>, BlockCryptKeyServerHalf), BlockServerError>;

    /// Stores a block under the reference described by `context`.
    async fn put(
        &self,
        ctx: &RequestContext,
        id: BlockId,
        tlf_id: TlfId,
        context: &BlockContext,
        buf: Vec<u8>,
        server_half: BlockCryptKeyServerHalf,
    ) -> Result<(), BlockServerError>;

    /// Adds a new reference to an existing block.
    async fn add_block_reference(
        &self,
        ctx: &RequestContext,
        id: BlockId,
        tlf_id: TlfId,
        context: &BlockContext,
    ) -> Result<(), BlockServerError>;

    /// Removes references and returns how many remain for each block.
    async fn remove_block_reference(
        &self,
        ctx: &RequestContext,
        tlf_id: TlfId,
        contexts: HashMap<BlockId, Vec<BlockContext>>,
    ) -> Result<HashMap<BlockId, usize>, BlockServerError>;

    /// Marks references as archived; archived references still count as live.
    async fn archive_block_references(
        &self,
        ctx: &RequestContext,
        tlf_id: TlfId,
        contexts: HashMap<BlockId, Vec<BlockContext>>,
    ) -> Result<(), BlockServerError>;

    fn shutdown(&self);

    async fn refresh_auth_token(&self, ctx: &RequestContext);

    async fn get_user_quota_info(
        &self,
        ctx: &RequestContext,
    ) -> Result<UserQuotaInfo, BlockServerError>;
}
