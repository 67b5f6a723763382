use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::chain::POOL_ADDRESS_PENDING;

/// Local primary key for a pool record: owner + token + creation timestamp.
pub fn make_pool_id(owner: &str, token_address: &str, created_at: i64) -> String {
    format!("{}-{}-{}", owner.to_lowercase(), token_address.to_lowercase(), created_at)
}

/// A liquidity position created through the app, as persisted in the local
/// registry. Created on a confirmed add, deleted on a confirmed remove.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPool {
    pub id: String,
    pub token_address: String,
    pub token_name: String,
    pub token_symbol: String,
    /// User-supplied amounts, kept as entered for display.
    pub token_amount: String,
    pub eth_amount: String,
    /// LP pair address. May be the zero address or [`POOL_ADDRESS_PENDING`]
    /// on historical records that predate pair resolution; such records are
    /// resolved against the factory before a removal can proceed.
    pub pool_address: String,
    pub owner: String,
    pub created_at: i64,
    pub tx_hash: String,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquidity_tokens: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LiquidityPool {
    pub fn matches_owner(&self, owner: &str) -> bool {
        self.owner.eq_ignore_ascii_case(owner)
    }

    /// True when `pool_address` does not hold a usable pair address yet.
    pub fn needs_pool_resolution(&self) -> bool {
        if self.pool_address.is_empty() || self.pool_address == POOL_ADDRESS_PENDING {
            return true;
        }
        match self.pool_address.parse::<Address>() {
            Ok(address) => address == Address::ZERO,
            Err(_) => true,
        }
    }
}
