use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

/// Name written into a token record immediately after the deploy receipt is
/// confirmed, before the contract's real metadata has been read back.
pub const PLACEHOLDER_NAME: &str = "Loading...";
pub const PLACEHOLDER_SYMBOL: &str = "LOADING";

/// A token deployed through the creator, as persisted in the local registry.
///
/// Identity is `(address, chain_id)`. Records are never deleted: token
/// creation is irreversible on-chain, so the local record persists until the
/// store itself is cleared.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreatedToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Human-readable decimal string, as entered by the creator.
    pub total_supply: String,
    pub creator: String,
    pub created_at: i64,
    pub tx_hash: String,
    /// Absent on records written before chain tracking was added; back-filled
    /// with the active chain on the next registry load.
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CreatedToken {
    /// Record written right after the deploy transaction confirms. Real
    /// metadata replaces the placeholder fields once the contract is
    /// readable.
    pub fn placeholder(
        address: Address,
        total_supply: &str,
        creator: Address,
        tx_hash: TxHash,
        chain_id: u64,
        created_at: i64,
    ) -> Self {
        Self {
            address: format!("{address:?}"),
            name: PLACEHOLDER_NAME.to_string(),
            symbol: PLACEHOLDER_SYMBOL.to_string(),
            decimals: 18,
            total_supply: total_supply.to_string(),
            creator: format!("{creator:?}"),
            created_at,
            tx_hash: format!("{tx_hash:?}"),
            chain_id: Some(chain_id),
            image_url: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER_NAME && self.symbol == PLACEHOLDER_SYMBOL
    }

    /// Owner comparison is case-insensitive: stored records may carry
    /// checksummed addresses.
    pub fn matches_owner(&self, owner: &str) -> bool {
        self.creator.eq_ignore_ascii_case(owner)
    }

    pub fn matches_address(&self, address: &str, chain_id: u64) -> bool {
        self.address.eq_ignore_ascii_case(address) && self.chain_id == Some(chain_id)
    }
}
