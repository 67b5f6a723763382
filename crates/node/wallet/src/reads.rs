use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;

use basemint_defi_abi::{IUniswapV2Factory, IUniswapV2Pair, IERC20};

use crate::client::WalletClient;
use crate::error::{WalletError, WalletErrorKind};

fn decode_error(what: &str) -> WalletError {
    WalletError::new(WalletErrorKind::Other, format!("failed to decode {what} return data"))
}

pub async fn erc20_name(client: &dyn WalletClient, token: Address) -> Result<String, WalletError> {
    let data = client.call(token, IERC20::nameCall {}.abi_encode().into()).await?;
    let ret = IERC20::nameCall::abi_decode_returns(&data, true).map_err(|_| decode_error("name"))?;
    Ok(ret._0)
}

pub async fn erc20_symbol(client: &dyn WalletClient, token: Address) -> Result<String, WalletError> {
    let data = client.call(token, IERC20::symbolCall {}.abi_encode().into()).await?;
    let ret = IERC20::symbolCall::abi_decode_returns(&data, true).map_err(|_| decode_error("symbol"))?;
    Ok(ret._0)
}

pub async fn erc20_decimals(client: &dyn WalletClient, token: Address) -> Result<u8, WalletError> {
    let data = client.call(token, IERC20::decimalsCall {}.abi_encode().into()).await?;
    let ret = IERC20::decimalsCall::abi_decode_returns(&data, true).map_err(|_| decode_error("decimals"))?;
    Ok(ret._0)
}

pub async fn erc20_total_supply(client: &dyn WalletClient, token: Address) -> Result<U256, WalletError> {
    let data = client.call(token, IERC20::totalSupplyCall {}.abi_encode().into()).await?;
    let ret = IERC20::totalSupplyCall::abi_decode_returns(&data, true).map_err(|_| decode_error("totalSupply"))?;
    Ok(ret._0)
}

pub async fn erc20_balance_of(client: &dyn WalletClient, token: Address, owner: Address) -> Result<U256, WalletError> {
    let data = client.call(token, IERC20::balanceOfCall { owner }.abi_encode().into()).await?;
    let ret = IERC20::balanceOfCall::abi_decode_returns(&data, true).map_err(|_| decode_error("balanceOf"))?;
    Ok(ret._0)
}

pub async fn erc20_allowance(
    client: &dyn WalletClient,
    token: Address,
    owner: Address,
    spender: Address,
) -> Result<U256, WalletError> {
    let data = client.call(token, IERC20::allowanceCall { owner, spender }.abi_encode().into()).await?;
    let ret = IERC20::allowanceCall::abi_decode_returns(&data, true).map_err(|_| decode_error("allowance"))?;
    Ok(ret._0)
}

pub async fn factory_get_pair(
    client: &dyn WalletClient,
    factory: Address,
    token_a: Address,
    token_b: Address,
) -> Result<Address, WalletError> {
    let data = client.call(factory, IUniswapV2Factory::getPairCall { tokenA: token_a, tokenB: token_b }.abi_encode().into()).await?;
    let ret = IUniswapV2Factory::getPairCall::abi_decode_returns(&data, true).map_err(|_| decode_error("getPair"))?;
    Ok(ret.pair)
}

pub async fn pair_token0(client: &dyn WalletClient, pair: Address) -> Result<Address, WalletError> {
    let data = client.call(pair, IUniswapV2Pair::token0Call {}.abi_encode().into()).await?;
    let ret = IUniswapV2Pair::token0Call::abi_decode_returns(&data, true).map_err(|_| decode_error("token0"))?;
    Ok(ret._0)
}

pub async fn pair_token1(client: &dyn WalletClient, pair: Address) -> Result<Address, WalletError> {
    let data = client.call(pair, IUniswapV2Pair::token1Call {}.abi_encode().into()).await?;
    let ret = IUniswapV2Pair::token1Call::abi_decode_returns(&data, true).map_err(|_| decode_error("token1"))?;
    Ok(ret._0)
}
