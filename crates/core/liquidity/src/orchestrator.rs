use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use chrono::Utc;
use eyre::{eyre, Result};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use basemint_core_topology::AppConfig;
use basemint_defi_abi::{is_lp_mint_log, IUniswapV2Pair, IUniswapV2Router02, IERC20};
use basemint_node_wallet::{
    classify_for_display, erc20_allowance, erc20_balance_of, erc20_decimals, erc20_total_supply, factory_get_pair,
    pair_token0, pair_token1, TxReceipt, WalletClient, WalletError, WalletErrorKind,
};
use basemint_storage_registry::TokenRegistry;
use basemint_types_entities::{make_pool_id, LiquidityPool, LpToken, TxStep, POOL_ADDRESS_PENDING};

#[derive(Debug, Error)]
pub enum LiquidityError {
    #[error("wallet not connected")]
    NotConnected,
    #[error("liquidity is not available on this network")]
    UnavailableNetwork,
    #[error("{0}")]
    InvalidInput(String),
    #[error("no stored pool with id {0}")]
    PoolNotFound(String),
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// How a withdrawal names its position: a raw LP pair address (nothing was
/// ever persisted for it) or a pool record stored by a previous add.
#[derive(Clone, Debug)]
pub enum RemovalTarget {
    LpAddress { address: Address, amount: Option<String> },
    StoredPool { id: String, amount: Option<String> },
}

#[derive(Clone, Debug)]
pub struct RemovalResult {
    pub lp_address: Address,
    pub token: Address,
    pub lp_amount: U256,
    /// Set for stored-pool withdrawals. The record is deleted only when the
    /// withdrawal empties the position.
    pub pool_id: Option<String>,
    pub tx_hash: TxHash,
}

/// How a finished operation ended. `Cancelled` is a wallet rejection (an
/// expected outcome, no error surfaced); `Stale` means a confirmation arrived
/// for a hash other than the tracked one and was discarded without touching
/// orchestrator state or the registry.
#[derive(Clone, Debug)]
pub enum TxOutcome<T> {
    Completed(T),
    Cancelled,
    Stale,
}

impl<T> TxOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            TxOutcome::Completed(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Default)]
struct TransientState {
    step: TxStep,
    tracked_hash: Option<TxHash>,
    error: Option<String>,
    preparing: bool,
    last_pool: Option<LiquidityPool>,
    last_removal: Option<RemovalResult>,
}

/// Sequences the approve/act transaction pairs for adding and removing
/// Uniswap V2 liquidity.
///
/// One operation is in flight at a time; each non-idle [`TxStep`] tracks
/// exactly one transaction hash and a confirmation is acted on only when its
/// hash matches the tracked one.
pub struct LiquidityOrchestrator {
    wallet: Arc<dyn WalletClient>,
    registry: Arc<TokenRegistry>,
    config: Arc<AppConfig>,
    state: RwLock<TransientState>,
    op_guard: Mutex<()>,
    decimals_cache: RwLock<HashMap<Address, u8>>,
}

impl LiquidityOrchestrator {
    pub fn new(wallet: Arc<dyn WalletClient>, registry: Arc<TokenRegistry>, config: Arc<AppConfig>) -> Self {
        Self {
            wallet,
            registry,
            config,
            state: RwLock::new(TransientState::default()),
            op_guard: Mutex::new(()),
            decimals_cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn step(&self) -> TxStep {
        self.state.read().await.step
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn is_preparing(&self) -> bool {
        self.state.read().await.preparing
    }

    pub async fn last_pool(&self) -> Option<LiquidityPool> {
        self.state.read().await.last_pool.clone()
    }

    pub async fn last_removal(&self) -> Option<RemovalResult> {
        self.state.read().await.last_removal.clone()
    }

    /// Force everything back to idle, whatever was in flight. Used when a
    /// progress dialog is dismissed mid-operation.
    pub async fn reset_loading_states(&self) {
        let mut state = self.state.write().await;
        state.step = TxStep::Idle;
        state.tracked_hash = None;
        state.preparing = false;
        state.error = None;
    }

    /// Add `token_amount` of `token` plus `eth_amount` of native currency to
    /// the token's V2 pool, approving the router first when needed.
    pub async fn add_liquidity(
        &self,
        token: Address,
        token_name: &str,
        token_symbol: &str,
        token_amount: &str,
        eth_amount: &str,
    ) -> Result<TxOutcome<LiquidityPool>> {
        let _guard = self.op_guard.lock().await;
        self.begin().await;
        let result = self.add_liquidity_inner(token, token_name, token_symbol, token_amount, eth_amount).await;
        self.conclude(result).await
    }

    /// Redeem an LP position for the underlying token and ETH, approving the
    /// router for the LP token first when needed.
    pub async fn remove_liquidity(&self, target: RemovalTarget) -> Result<TxOutcome<RemovalResult>> {
        let _guard = self.op_guard.lock().await;
        self.begin().await;
        let result = self.remove_liquidity_inner(target).await;
        self.conclude(result).await
    }

    async fn add_liquidity_inner(
        &self,
        token: Address,
        token_name: &str,
        token_symbol: &str,
        token_amount: &str,
        eth_amount: &str,
    ) -> std::result::Result<TxOutcome<LiquidityPool>, LiquidityError> {
        let owner = self.wallet.address().ok_or(LiquidityError::NotConnected)?;
        let (chain_id, router, factory, weth) = self.liquidity_chain().await?;

        let decimals = self.token_decimals(token).await?;
        let desired = crate::amounts::parse_amount(token_amount, decimals)
            .ok_or_else(|| LiquidityError::InvalidInput(format!("invalid token amount: {token_amount}")))?;
        let eth_wei = crate::amounts::parse_amount(eth_amount, 18)
            .ok_or_else(|| LiquidityError::InvalidInput(format!("invalid ETH amount: {eth_amount}")))?;

        let allowance = erc20_allowance(self.wallet.as_ref(), token, owner, router).await?;
        if allowance < desired {
            debug!("allowance {} below desired {}, approving router", allowance, desired);
            self.enter_step(TxStep::Approve).await;
            let data = IERC20::approveCall { spender: router, value: desired }.abi_encode();
            let hash = self.wallet.send(token, data.into(), U256::ZERO).await?;
            self.track(hash).await;
            if self.confirm(hash).await?.is_none() {
                return Ok(TxOutcome::Stale);
            }
            // the next confirmation must not be matched against this hash
            self.clear_tracked().await;
        } else {
            debug!("allowance {} covers desired {}, skipping approval", allowance, desired);
        }

        self.enter_step(TxStep::Add).await;
        let slippage = self.config.slippage_bps();
        let call = IUniswapV2Router02::addLiquidityETHCall {
            token,
            amountTokenDesired: desired,
            amountTokenMin: crate::amounts::apply_bps_discount(desired, slippage),
            amountETHMin: crate::amounts::apply_bps_discount(eth_wei, slippage),
            to: owner,
            deadline: self.deadline(),
        };
        let hash = self.wallet.send(router, call.abi_encode().into(), eth_wei).await?;
        self.track(hash).await;
        let Some(receipt) = self.confirm(hash).await? else {
            return Ok(TxOutcome::Stale);
        };

        let (pair, minted) = self.recover_pair(&receipt, factory, token, weth).await;
        let created_at = Utc::now().timestamp_millis();
        let owner_str = format!("{owner:?}");
        let pool_address = match pair {
            Some(address) => format!("{address:?}"),
            None => POOL_ADDRESS_PENDING.to_string(),
        };

        let pool = LiquidityPool {
            id: make_pool_id(&owner_str, &format!("{token:?}"), created_at),
            token_address: format!("{token:?}"),
            token_name: token_name.to_string(),
            token_symbol: token_symbol.to_string(),
            token_amount: token_amount.to_string(),
            eth_amount: eth_amount.to_string(),
            pool_address: pool_address.clone(),
            owner: owner_str.clone(),
            created_at,
            tx_hash: format!("{:?}", receipt.transaction_hash),
            chain_id: Some(chain_id),
            liquidity_tokens: minted.map(|v| v.to_string()),
            image_url: None,
        };
        self.registry.append_pool(pool.clone());

        if let Some(pair) = pair {
            self.registry.append_lp_token(LpToken {
                address: format!("{pair:?}"),
                name: format!("{token_symbol}/ETH LP"),
                symbol: "UNI-V2".to_string(),
                pool_address,
                token_a: format!("{token:?}"),
                token_b: format!("{weth:?}"),
                token_a_symbol: token_symbol.to_string(),
                token_b_symbol: "WETH".to_string(),
                created_at,
                chain_id: Some(chain_id),
                user_address: owner_str,
                tx_hash: format!("{:?}", receipt.transaction_hash),
            });
        }

        info!("liquidity added for {}: pool {}", token_symbol, pool.pool_address);
        self.state.write().await.last_pool = Some(pool.clone());
        Ok(TxOutcome::Completed(pool))
    }

    async fn remove_liquidity_inner(
        &self,
        target: RemovalTarget,
    ) -> std::result::Result<TxOutcome<RemovalResult>, LiquidityError> {
        let owner = self.wallet.address().ok_or(LiquidityError::NotConnected)?;
        let (_chain_id, router, factory, weth) = self.liquidity_chain().await?;

        let (lp_address, token, requested_amount, pool_id) = match &target {
            RemovalTarget::LpAddress { address, amount } => {
                // introspect the pair live; no local record is involved
                let token0 = pair_token0(self.wallet.as_ref(), *address).await?;
                let token1 = pair_token1(self.wallet.as_ref(), *address).await?;
                let token = if token0 == weth { token1 } else { token0 };
                (*address, token, amount.clone(), None)
            }
            RemovalTarget::StoredPool { id, amount } => {
                let pool = self.registry.find_pool(id).ok_or_else(|| LiquidityError::PoolNotFound(id.clone()))?;
                let token: Address = pool
                    .token_address
                    .parse()
                    .map_err(|_| LiquidityError::InvalidInput(format!("stored token address is invalid: {}", pool.token_address)))?;
                let lp_address = if pool.needs_pool_resolution() {
                    let pair = factory_get_pair(self.wallet.as_ref(), factory, token, weth).await?;
                    if pair == Address::ZERO {
                        return Err(LiquidityError::InvalidInput("liquidity pool could not be located on-chain".to_string()));
                    }
                    self.registry.resolve_pool_address(id, &format!("{pair:?}"));
                    pair
                } else {
                    pool.pool_address
                        .parse()
                        .map_err(|_| LiquidityError::InvalidInput(format!("stored pool address is invalid: {}", pool.pool_address)))?
                };
                (lp_address, token, amount.clone(), Some(id.clone()))
            }
        };

        let balance = erc20_balance_of(self.wallet.as_ref(), lp_address, owner).await?;
        let lp_amount = match requested_amount {
            Some(amount) => crate::amounts::parse_amount(&amount, 18)
                .ok_or_else(|| LiquidityError::InvalidInput(format!("invalid LP amount: {amount}")))?,
            None => balance,
        };
        if lp_amount.is_zero() {
            return Err(LiquidityError::InvalidInput("no liquidity to withdraw".to_string()));
        }
        if lp_amount > balance {
            return Err(LiquidityError::InvalidInput(format!(
                "requested {lp_amount} LP but the balance is {balance}"
            )));
        }

        let allowance = erc20_allowance(self.wallet.as_ref(), lp_address, owner, router).await?;
        if allowance < lp_amount {
            debug!("LP allowance {} below amount {}, approving router", allowance, lp_amount);
            self.enter_step(TxStep::RemoveApprove).await;
            let data = IUniswapV2Pair::approveCall { spender: router, value: lp_amount }.abi_encode();
            let hash = self.wallet.send(lp_address, data.into(), U256::ZERO).await?;
            self.track(hash).await;
            if self.confirm(hash).await?.is_none() {
                return Ok(TxOutcome::Stale);
            }
            self.clear_tracked().await;
        }

        self.enter_step(TxStep::RemoveLiquidity).await;
        let (min_token, min_eth) = self.removal_guards(lp_address, token, weth, lp_amount).await;
        let call = IUniswapV2Router02::removeLiquidityETHCall {
            token,
            liquidity: lp_amount,
            amountTokenMin: min_token,
            amountETHMin: min_eth,
            to: owner,
            deadline: self.deadline(),
        };
        let hash = self.wallet.send(router, call.abi_encode().into(), U256::ZERO).await?;
        self.track(hash).await;
        let Some(receipt) = self.confirm(hash).await? else {
            return Ok(TxOutcome::Stale);
        };

        if let Some(id) = &pool_id {
            if lp_amount == balance {
                if self.registry.remove_pool(id) {
                    debug!("dropped stored pool record {}", id);
                }
            } else {
                debug!("partial withdrawal, keeping stored pool record {}", id);
            }
        }

        let result = RemovalResult { lp_address, token, lp_amount, pool_id, tx_hash: receipt.transaction_hash };
        info!("liquidity removed from pair {}", lp_address);
        self.state.write().await.last_removal = Some(result.clone());
        Ok(TxOutcome::Completed(result))
    }

    /// Resolve the active chain and require the V2 contracts to be deployed
    /// on it. The secondary test chain has no router/factory, so removals and
    /// adds are refused there before any transaction is issued.
    async fn liquidity_chain(&self) -> std::result::Result<(u64, Address, Address, Address), LiquidityError> {
        let chain_id = self.wallet.chain_id().await?;
        let chain = self.config.chain(chain_id).ok_or(LiquidityError::UnavailableNetwork)?;
        match (chain.router, chain.factory, chain.weth) {
            (Some(router), Some(factory), Some(weth)) => Ok((chain_id, router, factory, weth)),
            _ => Err(LiquidityError::UnavailableNetwork),
        }
    }

    /// Decimals from the cache, falling back to a direct read with bounded
    /// retries when the cache has no answer yet.
    async fn token_decimals(&self, token: Address) -> std::result::Result<u8, WalletError> {
        if let Some(decimals) = self.decimals_cache.read().await.get(&token) {
            return Ok(*decimals);
        }
        let mut attempt = 0u32;
        loop {
            match erc20_decimals(self.wallet.as_ref(), token).await {
                Ok(decimals) => {
                    self.decimals_cache.write().await.insert(token, decimals);
                    return Ok(decimals);
                }
                Err(e) if attempt + 1 < self.config.read_retries() => {
                    attempt += 1;
                    warn!("decimals read for {} failed (attempt {}): {}", token, attempt, e);
                    tokio::time::sleep(self.config.read_retry_delay()).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Pair address after a confirmed add: preferably from the LP mint log in
    /// the receipt (the emitting contract is the pair), otherwise from the
    /// factory. Returns the minted LP amount when the log carried one.
    async fn recover_pair(
        &self,
        receipt: &TxReceipt,
        factory: Address,
        token: Address,
        weth: Address,
    ) -> (Option<Address>, Option<U256>) {
        if let Some(log) = receipt.logs.iter().find(|log| is_lp_mint_log(&log.topics)) {
            let minted = (log.data.len() == 32).then(|| U256::from_be_slice(&log.data));
            return (Some(log.address), minted);
        }
        match factory_get_pair(self.wallet.as_ref(), factory, token, weth).await {
            Ok(pair) if pair != Address::ZERO => (Some(pair), None),
            Ok(_) => {
                warn!("factory has no pair for {} yet", token);
                (None, None)
            }
            Err(e) => {
                warn!("pair lookup failed after confirmed add: {}", e);
                (None, None)
            }
        }
    }

    /// Minimum outputs for a removal: the proportional share of the pair's
    /// reserves discounted by the slippage tolerance, or a small fixed
    /// fraction of the LP amount when the share cannot be computed.
    async fn removal_guards(&self, lp_address: Address, token: Address, weth: Address, lp_amount: U256) -> (U256, U256) {
        let fallback = crate::amounts::bps_of(lp_amount, self.config.removal_fallback_bps());
        let slippage = self.config.slippage_bps();

        let total_supply = match erc20_total_supply(self.wallet.as_ref(), lp_address).await {
            Ok(total) => total,
            Err(e) => {
                warn!("LP total supply read failed, using fallback guards: {}", e);
                return (fallback, fallback);
            }
        };
        let token_reserve = erc20_balance_of(self.wallet.as_ref(), token, lp_address).await.unwrap_or(U256::ZERO);
        let eth_reserve = erc20_balance_of(self.wallet.as_ref(), weth, lp_address).await.unwrap_or(U256::ZERO);

        let min_token = crate::amounts::proportional_share(lp_amount, token_reserve, total_supply)
            .map(|share| crate::amounts::apply_bps_discount(share, slippage))
            .unwrap_or(fallback);
        let min_eth = crate::amounts::proportional_share(lp_amount, eth_reserve, total_supply)
            .map(|share| crate::amounts::apply_bps_discount(share, slippage))
            .unwrap_or(fallback);
        (min_token, min_eth)
    }

    fn deadline(&self) -> U256 {
        U256::from(Utc::now().timestamp() as u64 + self.config.deadline().as_secs())
    }

    /// Wait for the hash's receipt and apply the tracked-hash guard: a
    /// confirmation for any other hash is discarded without acting on it.
    async fn confirm(&self, hash: TxHash) -> std::result::Result<Option<TxReceipt>, WalletError> {
        let receipt = self.wallet.wait_for_receipt(hash).await?;
        let tracked = self.state.read().await.tracked_hash;
        if tracked != Some(receipt.transaction_hash) {
            debug!("discarding receipt {} while tracking {:?}", receipt.transaction_hash, tracked);
            return Ok(None);
        }
        if !receipt.status {
            return Err(WalletError::new(WalletErrorKind::ContractRevert, "transaction reverted"));
        }
        Ok(Some(receipt))
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.preparing = true;
        state.error = None;
    }

    async fn enter_step(&self, step: TxStep) {
        self.state.write().await.step = step;
    }

    async fn track(&self, hash: TxHash) {
        self.state.write().await.tracked_hash = Some(hash);
    }

    async fn clear_tracked(&self) {
        self.state.write().await.tracked_hash = None;
    }

    async fn reset_transient(&self, error: Option<String>) {
        let mut state = self.state.write().await;
        state.step = TxStep::Idle;
        state.tracked_hash = None;
        state.preparing = false;
        state.error = error;
    }

    /// Map an operation's result into the exposed outcome:
    /// completion and rejection both reset to idle (rejection silently), a
    /// stale confirmation leaves all state untouched, and everything else
    /// lands in the error slot.
    async fn conclude<T>(
        &self,
        result: std::result::Result<TxOutcome<T>, LiquidityError>,
    ) -> Result<TxOutcome<T>> {
        match result {
            Ok(TxOutcome::Completed(value)) => {
                self.reset_transient(None).await;
                Ok(TxOutcome::Completed(value))
            }
            Ok(TxOutcome::Cancelled) => {
                self.reset_transient(None).await;
                Ok(TxOutcome::Cancelled)
            }
            Ok(TxOutcome::Stale) => Ok(TxOutcome::Stale),
            Err(LiquidityError::Wallet(e)) if e.is_rejection() => {
                debug!("wallet rejected the request, resetting silently");
                self.reset_transient(None).await;
                Ok(TxOutcome::Cancelled)
            }
            Err(LiquidityError::Wallet(e)) => {
                let message = classify_for_display(&e).unwrap_or_else(|| e.message.clone());
                self.reset_transient(Some(message.clone())).await;
                Err(eyre!(message))
            }
            Err(e) => {
                let message = e.to_string();
                self.reset_transient(Some(message.clone())).await;
                Err(eyre!(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Bytes, B256};
    use alloy_sol_types::SolEvent;
    use basemint_node_wallet::mock::{ret_address, ret_u8, ret_uint, MockWalletClient};
    use basemint_node_wallet::ReceiptLog;
    use basemint_storage_registry::MemoryStore;
    use basemint_types_entities::BASE_MAINNET_CHAIN_ID;

    const OWNER: Address = Address::repeat_byte(0xaa);
    const TOKEN: Address = Address::repeat_byte(0x11);
    const PAIR: Address = Address::repeat_byte(0x22);

    struct Harness {
        wallet: Arc<MockWalletClient>,
        registry: Arc<TokenRegistry>,
        orchestrator: LiquidityOrchestrator,
        router: Address,
        factory: Address,
        weth: Address,
    }

    fn harness(chain_id: u64) -> Harness {
        let config = Arc::new(AppConfig::base_defaults());
        let chain = config.chain(BASE_MAINNET_CHAIN_ID).unwrap();
        let (router, factory, weth) = (chain.router.unwrap(), chain.factory.unwrap(), chain.weth.unwrap());
        let wallet = Arc::new(MockWalletClient::new(OWNER, chain_id));
        let registry = Arc::new(TokenRegistry::new(Arc::new(MemoryStore::new())));
        let orchestrator = LiquidityOrchestrator::new(wallet.clone(), registry.clone(), config);
        Harness { wallet, registry, orchestrator, router, factory, weth }
    }

    fn owner_str() -> String {
        format!("{OWNER:?}")
    }

    fn mint_log(minted: U256) -> ReceiptLog {
        let mut to_topic = [0u8; 32];
        to_topic[12..].copy_from_slice(OWNER.as_slice());
        ReceiptLog {
            address: PAIR,
            topics: vec![IERC20::Transfer::SIGNATURE_HASH, B256::ZERO, B256::from(to_topic)],
            data: Bytes::from(minted.to_be_bytes::<32>().to_vec()),
        }
    }

    fn units(amount: u64) -> U256 {
        U256::from(amount) * U256::from(10u64).pow(U256::from(18))
    }

    #[tokio::test]
    async fn test_add_liquidity_approve_then_add() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        h.wallet.set_call_response(TOKEN, IERC20::decimalsCall::SELECTOR, ret_u8(18));
        h.wallet.set_call_response(TOKEN, IERC20::allowanceCall::SELECTOR, ret_uint(U256::ZERO));
        h.wallet.push_receipt_logs(vec![]); // approve receipt
        h.wallet.push_receipt_logs(vec![mint_log(units(21))]); // add receipt carries the mint

        let outcome = h.orchestrator.add_liquidity(TOKEN, "Test", "TST", "1000", "0.5").await.unwrap();
        let pool = outcome.completed().expect("add should complete");

        let sent = h.wallet.sent_transactions();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].selector(), IERC20::approveCall::SELECTOR);
        assert_eq!(sent[0].to, Some(TOKEN));
        assert_eq!(sent[1].selector(), IUniswapV2Router02::addLiquidityETHCall::SELECTOR);
        assert_eq!(sent[1].to, Some(h.router));

        let approve = IERC20::approveCall::abi_decode(&sent[0].data, true).unwrap();
        assert_eq!(approve.spender, h.router);
        assert_eq!(approve.value, units(1000));

        let add = IUniswapV2Router02::addLiquidityETHCall::abi_decode(&sent[1].data, true).unwrap();
        assert_eq!(add.amountTokenDesired, units(1000));
        // 95% of the desired amounts at the default 5% tolerance
        assert_eq!(add.amountTokenMin, units(950));
        assert_eq!(add.amountETHMin, U256::from(475_000_000_000_000_000u64));
        assert_eq!(sent[1].value, U256::from(500_000_000_000_000_000u64));
        assert!(add.deadline > U256::ZERO);

        // pair recovered from the mint log, record persisted
        assert_eq!(pool.pool_address, format!("{PAIR:?}"));
        assert_eq!(pool.token_amount, "1000");
        assert_eq!(pool.eth_amount, "0.5");
        assert_eq!(pool.liquidity_tokens, Some(units(21).to_string()));
        assert_eq!(h.registry.load_pools(&owner_str(), BASE_MAINNET_CHAIN_ID).len(), 1);
        assert_eq!(h.registry.load_lp_tokens(&owner_str(), BASE_MAINNET_CHAIN_ID).len(), 1);

        assert_eq!(h.orchestrator.step().await, TxStep::Idle);
        assert_eq!(h.orchestrator.last_error().await, None);
        assert!(!h.orchestrator.is_preparing().await);
        assert!(h.orchestrator.last_pool().await.is_some());
    }

    #[tokio::test]
    async fn test_add_liquidity_skips_approve_when_allowance_sufficient() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        h.wallet.set_call_response(TOKEN, IERC20::decimalsCall::SELECTOR, ret_u8(18));
        h.wallet.set_call_response(TOKEN, IERC20::allowanceCall::SELECTOR, ret_uint(U256::MAX));
        h.wallet.push_receipt_logs(vec![mint_log(units(5))]);

        let outcome = h.orchestrator.add_liquidity(TOKEN, "Test", "TST", "10", "0.1").await.unwrap();
        assert!(outcome.completed().is_some());

        let sent = h.wallet.sent_transactions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].selector(), IUniswapV2Router02::addLiquidityETHCall::SELECTOR);
    }

    #[tokio::test]
    async fn test_add_liquidity_falls_back_to_factory_for_pair() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        h.wallet.set_call_response(TOKEN, IERC20::decimalsCall::SELECTOR, ret_u8(18));
        h.wallet.set_call_response(TOKEN, IERC20::allowanceCall::SELECTOR, ret_uint(U256::MAX));
        h.wallet.set_call_response(h.factory, basemint_defi_abi::IUniswapV2Factory::getPairCall::SELECTOR, ret_address(PAIR));
        // no mint log in the receipt

        let outcome = h.orchestrator.add_liquidity(TOKEN, "Test", "TST", "10", "0.1").await.unwrap();
        let pool = outcome.completed().unwrap();
        assert_eq!(pool.pool_address, format!("{PAIR:?}"));
        assert_eq!(pool.liquidity_tokens, None);
    }

    #[tokio::test]
    async fn test_add_liquidity_rejected_resets_silently() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        h.wallet.set_call_response(TOKEN, IERC20::decimalsCall::SELECTOR, ret_u8(18));
        h.wallet.set_call_response(TOKEN, IERC20::allowanceCall::SELECTOR, ret_uint(U256::ZERO));
        h.wallet.fail_next_send(WalletError::rejected());

        let outcome = h.orchestrator.add_liquidity(TOKEN, "Test", "TST", "1000", "0.5").await.unwrap();
        assert!(matches!(outcome, TxOutcome::Cancelled));

        // no user-visible error, no partial record, back to idle
        assert_eq!(h.orchestrator.last_error().await, None);
        assert_eq!(h.orchestrator.step().await, TxStep::Idle);
        assert!(!h.orchestrator.is_preparing().await);
        assert!(h.registry.load_pools(&owner_str(), BASE_MAINNET_CHAIN_ID).is_empty());
    }

    #[tokio::test]
    async fn test_add_liquidity_unavailable_network_issues_no_transaction() {
        let h = harness(84532);
        let err = h.orchestrator.add_liquidity(TOKEN, "Test", "TST", "1000", "0.5").await.unwrap_err();
        assert!(err.to_string().contains("not available on this network"));
        assert!(h.wallet.sent_transactions().is_empty());
        assert_eq!(h.orchestrator.last_error().await.unwrap(), err.to_string());
        assert_eq!(h.orchestrator.step().await, TxStep::Idle);
    }

    #[tokio::test]
    async fn test_stale_receipt_is_discarded_without_side_effects() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        h.wallet.set_call_response(TOKEN, IERC20::decimalsCall::SELECTOR, ret_u8(18));
        h.wallet.set_call_response(TOKEN, IERC20::allowanceCall::SELECTOR, ret_uint(U256::MAX));
        // confirmation for some other transaction entirely
        h.wallet.override_next_receipt(TxReceipt::success(B256::repeat_byte(0x99)));

        let outcome = h.orchestrator.add_liquidity(TOKEN, "Test", "TST", "1000", "0.5").await.unwrap();
        assert!(matches!(outcome, TxOutcome::Stale));

        // no registry mutation, no state transition
        assert!(h.registry.load_pools(&owner_str(), BASE_MAINNET_CHAIN_ID).is_empty());
        assert_eq!(h.orchestrator.step().await, TxStep::Add);
        assert_eq!(h.orchestrator.last_error().await, None);

        h.orchestrator.reset_loading_states().await;
        assert_eq!(h.orchestrator.step().await, TxStep::Idle);
    }

    #[tokio::test]
    async fn test_add_liquidity_failure_populates_error_slot() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        h.wallet.set_call_response(TOKEN, IERC20::decimalsCall::SELECTOR, ret_u8(18));
        h.wallet.set_call_response(TOKEN, IERC20::allowanceCall::SELECTOR, ret_uint(U256::ZERO));
        h.wallet.fail_next_send(WalletError::from_raw("insufficient funds for gas * price + value"));

        let err = h.orchestrator.add_liquidity(TOKEN, "Test", "TST", "1000", "0.5").await.unwrap_err();
        assert!(err.to_string().contains("Insufficient funds"));
        assert_eq!(h.orchestrator.last_error().await.unwrap(), err.to_string());
        assert_eq!(h.orchestrator.step().await, TxStep::Idle);
    }

    fn seed_pool(h: &Harness, pool_address: &str) -> LiquidityPool {
        let pool = LiquidityPool {
            id: make_pool_id(&owner_str(), &format!("{TOKEN:?}"), 42),
            token_address: format!("{TOKEN:?}"),
            token_name: "Test".to_string(),
            token_symbol: "TST".to_string(),
            token_amount: "1000".to_string(),
            eth_amount: "0.5".to_string(),
            pool_address: pool_address.to_string(),
            owner: owner_str(),
            created_at: 42,
            tx_hash: "0xseed".to_string(),
            chain_id: Some(BASE_MAINNET_CHAIN_ID),
            liquidity_tokens: None,
            image_url: None,
        };
        h.registry.append_pool(pool.clone());
        pool
    }

    #[tokio::test]
    async fn test_remove_liquidity_from_stored_pool_deletes_record() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        let pool = seed_pool(&h, &format!("{PAIR:?}"));

        // full-balance withdrawal with an approval first
        h.wallet.set_call_response(PAIR, IERC20::balanceOfCall::SELECTOR, ret_uint(units(100)));
        h.wallet.set_call_response(PAIR, IERC20::allowanceCall::SELECTOR, ret_uint(U256::ZERO));
        h.wallet.set_call_response(PAIR, IERC20::totalSupplyCall::SELECTOR, ret_uint(units(1000)));
        h.wallet.set_call_response(TOKEN, IERC20::balanceOfCall::SELECTOR, ret_uint(units(5000)));
        h.wallet.set_call_response(h.weth, IERC20::balanceOfCall::SELECTOR, ret_uint(units(2)));

        let outcome = h
            .orchestrator
            .remove_liquidity(RemovalTarget::StoredPool { id: pool.id.clone(), amount: None })
            .await
            .unwrap();
        let result = outcome.completed().expect("removal should complete");
        assert_eq!(result.pool_id.as_deref(), Some(pool.id.as_str()));
        assert_eq!(result.lp_amount, units(100));

        let sent = h.wallet.sent_transactions();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].selector(), IERC20::approveCall::SELECTOR);
        assert_eq!(sent[0].to, Some(PAIR));
        assert_eq!(sent[1].selector(), IUniswapV2Router02::removeLiquidityETHCall::SELECTOR);

        let remove = IUniswapV2Router02::removeLiquidityETHCall::abi_decode(&sent[1].data, true).unwrap();
        assert_eq!(remove.liquidity, units(100));
        // 10% share of the reserves, discounted 5%
        assert_eq!(remove.amountTokenMin, units(475));
        assert_eq!(remove.amountETHMin, U256::from(190_000_000_000_000_000u64));

        assert!(h.registry.find_pool(&pool.id).is_none());
        assert_eq!(h.orchestrator.step().await, TxStep::Idle);
    }

    #[tokio::test]
    async fn test_remove_liquidity_partial_from_stored_pool_keeps_record() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        let pool = seed_pool(&h, &format!("{PAIR:?}"));

        h.wallet.set_call_response(PAIR, IERC20::balanceOfCall::SELECTOR, ret_uint(units(100)));
        h.wallet.set_call_response(PAIR, IERC20::allowanceCall::SELECTOR, ret_uint(U256::MAX));
        h.wallet.set_call_response(PAIR, IERC20::totalSupplyCall::SELECTOR, ret_uint(units(1000)));
        h.wallet.set_call_response(TOKEN, IERC20::balanceOfCall::SELECTOR, ret_uint(units(5000)));
        h.wallet.set_call_response(h.weth, IERC20::balanceOfCall::SELECTOR, ret_uint(units(2)));

        let outcome = h
            .orchestrator
            .remove_liquidity(RemovalTarget::StoredPool { id: pool.id.clone(), amount: Some("40".to_string()) })
            .await
            .unwrap();
        let result = outcome.completed().expect("partial removal should complete");
        assert_eq!(result.lp_amount, units(40));

        let sent = h.wallet.sent_transactions();
        let remove = IUniswapV2Router02::removeLiquidityETHCall::abi_decode(&sent[0].data, true).unwrap();
        assert_eq!(remove.liquidity, units(40));

        // the position still exists on-chain, so the record survives
        assert!(h.registry.find_pool(&pool.id).is_some());
        assert_eq!(h.orchestrator.step().await, TxStep::Idle);
    }

    #[tokio::test]
    async fn test_remove_liquidity_rejects_amount_above_balance() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        let pool = seed_pool(&h, &format!("{PAIR:?}"));
        h.wallet.set_call_response(PAIR, IERC20::balanceOfCall::SELECTOR, ret_uint(units(100)));

        let err = h
            .orchestrator
            .remove_liquidity(RemovalTarget::StoredPool { id: pool.id, amount: Some("101".to_string()) })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("balance"));
        assert!(h.wallet.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_remove_liquidity_direct_address_never_persists() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        h.wallet.set_call_response(PAIR, IUniswapV2Pair::token0Call::SELECTOR, ret_address(h.weth));
        h.wallet.set_call_response(PAIR, IUniswapV2Pair::token1Call::SELECTOR, ret_address(TOKEN));
        h.wallet.set_call_response(PAIR, IERC20::balanceOfCall::SELECTOR, ret_uint(units(50)));
        h.wallet.set_call_response(PAIR, IERC20::allowanceCall::SELECTOR, ret_uint(U256::MAX));
        // total-supply lookup fails: the fixed fallback guard applies
        h.wallet.fail_call(PAIR, IERC20::totalSupplyCall::SELECTOR, WalletError::from_raw("execution reverted"));

        let outcome = h
            .orchestrator
            .remove_liquidity(RemovalTarget::LpAddress { address: PAIR, amount: Some("10".to_string()) })
            .await
            .unwrap();
        let result = outcome.completed().unwrap();
        assert_eq!(result.pool_id, None);
        assert_eq!(result.token, TOKEN);

        let sent = h.wallet.sent_transactions();
        assert_eq!(sent.len(), 1);
        let remove = IUniswapV2Router02::removeLiquidityETHCall::abi_decode(&sent[0].data, true).unwrap();
        assert_eq!(remove.liquidity, units(10));
        // 0.1% of the LP amount
        assert_eq!(remove.amountTokenMin, U256::from(10_000_000_000_000_000u64));
        assert_eq!(remove.amountETHMin, U256::from(10_000_000_000_000_000u64));

        assert!(h.registry.load_pools(&owner_str(), BASE_MAINNET_CHAIN_ID).is_empty());
    }

    #[tokio::test]
    async fn test_remove_liquidity_resolves_placeholder_pool_address() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        let pool = seed_pool(&h, POOL_ADDRESS_PENDING);

        h.wallet.set_call_response(h.factory, basemint_defi_abi::IUniswapV2Factory::getPairCall::SELECTOR, ret_address(PAIR));
        h.wallet.set_call_response(PAIR, IERC20::balanceOfCall::SELECTOR, ret_uint(units(7)));
        h.wallet.set_call_response(PAIR, IERC20::allowanceCall::SELECTOR, ret_uint(U256::MAX));
        h.wallet.set_call_response(PAIR, IERC20::totalSupplyCall::SELECTOR, ret_uint(units(70)));
        h.wallet.set_call_response(TOKEN, IERC20::balanceOfCall::SELECTOR, ret_uint(units(700)));
        h.wallet.set_call_response(h.weth, IERC20::balanceOfCall::SELECTOR, ret_uint(units(7)));

        let outcome = h
            .orchestrator
            .remove_liquidity(RemovalTarget::StoredPool { id: pool.id.clone(), amount: None })
            .await
            .unwrap();
        let result = outcome.completed().unwrap();
        assert_eq!(result.lp_address, PAIR);
        // record deleted after the confirmed removal
        assert!(h.registry.find_pool(&pool.id).is_none());
    }

    #[tokio::test]
    async fn test_remove_liquidity_zero_balance_is_invalid() {
        let h = harness(BASE_MAINNET_CHAIN_ID);
        h.wallet.set_call_response(PAIR, IUniswapV2Pair::token0Call::SELECTOR, ret_address(h.weth));
        h.wallet.set_call_response(PAIR, IUniswapV2Pair::token1Call::SELECTOR, ret_address(TOKEN));
        h.wallet.set_call_response(PAIR, IERC20::balanceOfCall::SELECTOR, ret_uint(U256::ZERO));

        let err = h
            .orchestrator
            .remove_liquidity(RemovalTarget::LpAddress { address: PAIR, amount: None })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no liquidity to withdraw"));
        assert!(h.wallet.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_not_connected() {
        let config = Arc::new(AppConfig::base_defaults());
        let wallet = Arc::new(MockWalletClient::disconnected());
        let registry = Arc::new(TokenRegistry::new(Arc::new(MemoryStore::new())));
        let orchestrator = LiquidityOrchestrator::new(wallet, registry, config);

        let err = orchestrator.add_liquidity(TOKEN, "Test", "TST", "1", "0.1").await.unwrap_err();
        assert!(err.to_string().contains("wallet not connected"));
    }
}
