//! Asset Banner Use Case
//!
//! Best-effort lookup shown above the quote table. A failed lookup is logged
//! and skipped; the poller stays the authority on unknown symbols. A shutdown
//! request abandons the lookup immediately.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::ports::AssetPort;

/// Looks up the asset banner for a symbol.
pub struct AssetBannerUseCase<A>
where
    A: AssetPort,
{
    assets: Arc<A>,
}

impl<A> AssetBannerUseCase<A>
where
    A: AssetPort,
{
    /// Create a new `AssetBannerUseCase`.
    pub const fn new(assets: Arc<A>) -> Self {
        Self { assets }
    }

    /// The banner line, or `None` when the lookup fails or `cancel` fires first.
    pub async fn execute(&self, symbol: &str, cancel: &CancellationToken) -> Option<String> {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(symbol, "Asset lookup abandoned on shutdown");
                return None;
            }
            result = self.assets.asset(symbol) => result,
        };

        match result {
            Ok(asset) => Some(asset.banner()),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "Asset lookup failed, skipping banner");
                None
            }
        }
    }
}
