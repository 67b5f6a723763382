pub use amounts::{apply_bps_discount, bps_of, parse_amount, proportional_share};
pub use orchestrator::{LiquidityError, LiquidityOrchestrator, RemovalResult, RemovalTarget, TxOutcome};

mod amounts;
mod orchestrator;
