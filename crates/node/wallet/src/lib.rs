pub use alloy_client::AlloyWalletClient;
pub use client::{ReceiptLog, TxReceipt, WalletClient};
pub use error::{classify_for_display, WalletError, WalletErrorKind};
pub use reads::{
    erc20_allowance, erc20_balance_of, erc20_decimals, erc20_name, erc20_symbol, erc20_total_supply, factory_get_pair,
    pair_token0, pair_token1,
};

mod alloy_client;
mod client;
mod error;
pub mod mock;
mod reads;
