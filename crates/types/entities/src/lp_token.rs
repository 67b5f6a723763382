use serde::{Deserialize, Serialize};

/// An LP pair tracked so it can be picked as an input token later. Written
/// alongside every [`crate::LiquidityPool`] record; never deleted
/// automatically, so orphaned entries may outlive their pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LpToken {
    /// The LP pair address.
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub pool_address: String,
    pub token_a: String,
    pub token_b: String,
    pub token_a_symbol: String,
    pub token_b_symbol: String,
    pub created_at: i64,
    #[serde(default)]
    pub chain_id: Option<u64>,
    pub user_address: String,
    pub tx_hash: String,
}

impl LpToken {
    /// De-duplication key: one record per `(address, user)`.
    pub fn is_same_position(&self, other: &LpToken) -> bool {
        self.address.eq_ignore_ascii_case(&other.address)
            && self.user_address.eq_ignore_ascii_case(&other.user_address)
    }

    pub fn matches_owner(&self, owner: &str) -> bool {
        self.user_address.eq_ignore_ascii_case(owner)
    }
}
