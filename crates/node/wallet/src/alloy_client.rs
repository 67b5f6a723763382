use std::collections::HashMap;
use std::time::Duration;

use alloy::network::TransactionBuilder;
use alloy::providers::Provider;
use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::client::{ReceiptLog, TxReceipt, WalletClient};
use crate::error::{WalletError, WalletErrorKind};

const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(300);
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// [`WalletClient`] backed by alloy providers, one per configured chain.
///
/// Chain switching re-points the active provider; signing, gas and nonce
/// handling are expected to come from the provider's filler stack.
pub struct AlloyWalletClient<P> {
    providers: HashMap<u64, P>,
    active_chain: RwLock<u64>,
    account: Address,
    receipt_timeout: Duration,
}

impl<P> AlloyWalletClient<P>
where
    P: Provider + Send + Sync,
{
    pub fn new(providers: HashMap<u64, P>, initial_chain: u64, account: Address) -> Self {
        Self { providers, active_chain: RwLock::new(initial_chain), account, receipt_timeout: DEFAULT_RECEIPT_TIMEOUT }
    }

    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.receipt_timeout = timeout;
        self
    }

    async fn provider(&self) -> Result<&P, WalletError> {
        let chain_id = *self.active_chain.read().await;
        self.providers
            .get(&chain_id)
            .ok_or_else(|| WalletError::new(WalletErrorKind::UnsupportedChain, format!("no endpoint for chain {chain_id}")))
    }
}

#[async_trait]
impl<P> WalletClient for AlloyWalletClient<P>
where
    P: Provider + Send + Sync,
{
    fn address(&self) -> Option<Address> {
        Some(self.account)
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(*self.active_chain.read().await)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        if !self.providers.contains_key(&chain_id) {
            return Err(WalletError::new(WalletErrorKind::UnsupportedChain, format!("no endpoint for chain {chain_id}")));
        }
        *self.active_chain.write().await = chain_id;
        debug!("switched active chain to {}", chain_id);
        Ok(())
    }

    async fn deploy(&self, code: Bytes, value: U256) -> Result<TxHash, WalletError> {
        let provider = self.provider().await?;
        let request = TransactionRequest::default().with_from(self.account).with_deploy_code(code).with_value(value);
        let pending = provider.send_transaction(request).await.map_err(|e| WalletError::from_raw(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn send(&self, to: Address, data: Bytes, value: U256) -> Result<TxHash, WalletError> {
        let provider = self.provider().await?;
        let request = TransactionRequest::default().with_from(self.account).with_to(to).with_input(data).with_value(value);
        let pending = provider.send_transaction(request).await.map_err(|e| WalletError::from_raw(e.to_string()))?;
        Ok(*pending.tx_hash())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError> {
        let provider = self.provider().await?;
        let request = TransactionRequest::default().with_to(to).with_input(data);
        provider.call(&request).await.map_err(|e| WalletError::from_raw(e.to_string()))
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, WalletError> {
        let provider = self.provider().await?;
        let started = tokio::time::Instant::now();

        loop {
            match provider.get_transaction_receipt(hash).await {
                Ok(Some(receipt)) => {
                    let logs = receipt
                        .inner
                        .logs()
                        .iter()
                        .map(|log| ReceiptLog {
                            address: log.address(),
                            topics: log.topics().to_vec(),
                            data: log.data().data.clone(),
                        })
                        .collect();
                    return Ok(TxReceipt {
                        transaction_hash: receipt.transaction_hash,
                        status: receipt.status(),
                        contract_address: receipt.contract_address,
                        logs,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    // transient RPC hiccups are retried until the timeout
                    warn!("receipt poll for {} failed: {}", hash, e);
                }
            }

            if started.elapsed() >= self.receipt_timeout {
                return Err(WalletError::new(
                    WalletErrorKind::Timeout,
                    format!("no receipt for {hash} after {}s", self.receipt_timeout.as_secs()),
                ));
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}
