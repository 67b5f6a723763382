pub use creator_token::{
    creator_token_bytecode, encode_constructor_args, encode_deploy_payload, CREATOR_TOKEN_COMPILER_VERSION,
    CREATOR_TOKEN_CONTRACT_NAME, CREATOR_TOKEN_SOURCE,
};
pub use erc20::IERC20;
pub use uniswap_v2::{is_lp_mint_log, IUniswapV2Factory, IUniswapV2Pair, IUniswapV2Router02};

mod creator_token;
mod erc20;
mod uniswap_v2;
