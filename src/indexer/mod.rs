// Shared trait + filters for the upstream indexer

use crate::model::{LoanRecord, MarketRecord, PositionEntry};

pub mod error;
pub mod ponder;
pub mod ponder_types;

pub use error::{IndexerError, IndexerResult};
pub use ponder::PonderClient;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarketFilter {
    pub chain_id: Option<u64>,
    pub limit: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub account: String,
    pub chain_id: Option<u64>,
    pub limit: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanFilter {
    pub account: String,
    pub chain_id: Option<u64>,
    pub open_only: bool,
    pub limit: usize,
}

/// Read-only view of the indexed lending state. The HTTP layer only talks to
/// this trait so tests can swap the Ponder client out.
#[async_trait::async_trait]
pub trait Indexer: Send + Sync {
    async fn markets(&self, filter: &MarketFilter) -> IndexerResult<Vec<MarketRecord>>;
    async fn positions(&self, filter: &AccountFilter) -> IndexerResult<Vec<PositionEntry>>;
    async fn loans(&self, filter: &LoanFilter) -> IndexerResult<Vec<LoanRecord>>;
}
