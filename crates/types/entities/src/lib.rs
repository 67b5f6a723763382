pub use chain::{is_supported_chain, supported_chains, BASE_MAINNET_CHAIN_ID, BASE_SEPOLIA_CHAIN_ID, POOL_ADDRESS_PENDING};
pub use created_token::{CreatedToken, PLACEHOLDER_NAME, PLACEHOLDER_SYMBOL};
pub use liquidity_pool::{make_pool_id, LiquidityPool};
pub use lp_token::LpToken;
pub use tx_step::{TxStep, VerificationStatus};

mod chain;
mod created_token;
mod liquidity_pool;
mod lp_token;
mod tx_step;
