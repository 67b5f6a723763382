use alloy_primitives::B256;
use alloy_sol_macro::sol;
use alloy_sol_types::SolEvent;

use crate::erc20::IERC20;

sol! {
    #[allow(missing_docs)]
    interface IUniswapV2Router02 {
        function factory() external view returns (address);
        function WETH() external view returns (address);

        function addLiquidityETH(
            address token,
            uint256 amountTokenDesired,
            uint256 amountTokenMin,
            uint256 amountETHMin,
            address to,
            uint256 deadline
        ) external payable returns (uint256 amountToken, uint256 amountETH, uint256 liquidity);

        function removeLiquidityETH(
            address token,
            uint256 liquidity,
            uint256 amountTokenMin,
            uint256 amountETHMin,
            address to,
            uint256 deadline
        ) external returns (uint256 amountToken, uint256 amountETH);
    }

    #[allow(missing_docs)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
        function createPair(address tokenA, address tokenB) external returns (address pair);
    }

    #[allow(missing_docs)]
    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function totalSupply() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }
}

/// True for a `Transfer(0x0, _, _)` log, i.e. an LP-token mint. The emitting
/// contract is the freshly created pair, which is how the add-liquidity flow
/// recovers the pair address from a receipt.
pub fn is_lp_mint_log(topics: &[B256]) -> bool {
    topics.len() >= 3 && topics[0] == IERC20::Transfer::SIGNATURE_HASH && topics[1] == B256::ZERO
}
