/// Base mainnet chain id
pub const BASE_MAINNET_CHAIN_ID: u64 = 8453;

/// Base Sepolia chain id. Tokens can be deployed here, but the Uniswap V2
/// router/factory pair we target is not, so liquidity operations are refused.
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

/// Sentinel stored in `LiquidityPool::pool_address` while the real pair
/// address is still unknown and must be resolved against the factory.
pub const POOL_ADDRESS_PENDING: &str = "pending";

pub fn supported_chains() -> [u64; 2] {
    [BASE_MAINNET_CHAIN_ID, BASE_SEPOLIA_CHAIN_ID]
}

pub fn is_supported_chain(chain_id: u64) -> bool {
    chain_id == BASE_MAINNET_CHAIN_ID || chain_id == BASE_SEPOLIA_CHAIN_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_chains() {
        assert!(is_supported_chain(BASE_MAINNET_CHAIN_ID));
        assert!(is_supported_chain(BASE_SEPOLIA_CHAIN_ID));
        assert!(!is_supported_chain(1));
        assert!(!is_supported_chain(0));
    }
}
