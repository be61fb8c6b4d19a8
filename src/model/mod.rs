// Data-transfer records shared by the indexer client and the aggregator
pub mod network;
pub mod types;

pub use network::{network_name, Network};
pub use types::{LoanRecord, LoanStatus, MarketRecord, PositionEntry, PositionKind, Token};
