use alloy_primitives::Address;
use tracing::debug;

use basemint_node_wallet::{erc20_decimals, erc20_name, erc20_symbol, WalletClient, WalletError};

/// A token the user added by address rather than picking from their own
/// created tokens. Metadata comes from read-only contract calls.
#[derive(Clone, Debug, PartialEq)]
pub struct CustomToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl CustomToken {
    pub fn matches_address(&self, address: &str) -> bool {
        self.address.eq_ignore_ascii_case(address)
    }
}

/// Look up name/symbol/decimals for an arbitrary ERC20. Fails when the
/// address is not a readable token contract.
pub async fn resolve_custom_token(wallet: &dyn WalletClient, address: Address) -> Result<CustomToken, WalletError> {
    let name = erc20_name(wallet, address).await?;
    let symbol = erc20_symbol(wallet, address).await?;
    let decimals = erc20_decimals(wallet, address).await?;
    debug!("resolved custom token {} as {} ({})", address, name, symbol);
    Ok(CustomToken { address: format!("{address:?}"), name, symbol, decimals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolCall;
    use basemint_defi_abi::IERC20;
    use basemint_node_wallet::mock::{ret_string, ret_u8, MockWalletClient};

    #[tokio::test]
    async fn test_resolve_custom_token() {
        let token = Address::repeat_byte(0x11);
        let mock = MockWalletClient::new(Address::repeat_byte(0xaa), 8453);
        mock.set_call_response(token, IERC20::nameCall::SELECTOR, ret_string("Degen"));
        mock.set_call_response(token, IERC20::symbolCall::SELECTOR, ret_string("DEGEN"));
        mock.set_call_response(token, IERC20::decimalsCall::SELECTOR, ret_u8(18));

        let resolved = resolve_custom_token(&mock, token).await.unwrap();
        assert_eq!(resolved.name, "Degen");
        assert_eq!(resolved.symbol, "DEGEN");
        assert_eq!(resolved.decimals, 18);
        assert!(resolved.matches_address(&format!("{token:?}").to_uppercase().replace("0X", "0x")));
    }

    #[tokio::test]
    async fn test_resolve_fails_for_non_token() {
        let mock = MockWalletClient::new(Address::repeat_byte(0xaa), 8453);
        assert!(resolve_custom_token(&mock, Address::repeat_byte(0x11)).await.is_err());
    }
}
