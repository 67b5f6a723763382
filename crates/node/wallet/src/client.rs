use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use async_trait::async_trait;

use crate::error::WalletError;

/// One log entry from a confirmed transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceiptLog {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// The slice of a transaction receipt the orchestrators consume.
#[derive(Clone, Debug, PartialEq)]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    pub status: bool,
    pub contract_address: Option<Address>,
    pub logs: Vec<ReceiptLog>,
}

impl TxReceipt {
    pub fn success(transaction_hash: TxHash) -> Self {
        Self { transaction_hash, status: true, contract_address: None, logs: Vec::new() }
    }
}

/// The wallet/chain-client boundary. Everything the orchestrators need from
/// the underlying provider library: connected account, active chain, chain
/// switching, deploys, reads, writes and receipt waiting. Implementations own
/// signing, gas and nonce handling.
#[async_trait]
pub trait WalletClient: Send + Sync {
    /// Connected account, if any.
    fn address(&self) -> Option<Address>;

    async fn chain_id(&self) -> Result<u64, WalletError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    /// Submit a contract-creation transaction.
    async fn deploy(&self, code: Bytes, value: U256) -> Result<TxHash, WalletError>;

    /// Submit a state-mutating call.
    async fn send(&self, to: Address, data: Bytes, value: U256) -> Result<TxHash, WalletError>;

    /// Read-only call.
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError>;

    /// Wait until the transaction is included, with the implementation's
    /// bounded polling (5 minutes by default).
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, WalletError>;
}
