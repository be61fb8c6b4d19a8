// UI-ready views built from indexer records
pub mod loans;      // loan rows with simple-interest accrual
pub mod markets;    // market rows with rates as percent strings
pub mod positions;  // per-market position rows + portfolio summary

pub use loans::{loan_history, LoanView};
pub use markets::MarketView;
pub use positions::{aggregate_portfolio, Portfolio, PortfolioSummary, PositionView};
