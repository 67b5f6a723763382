//! Scripted in-memory [`WalletClient`] used as the injected fake in unit
//! tests across the workspace.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use alloy_primitives::{Address, Bytes, TxHash, B256, U256};
use async_trait::async_trait;

use crate::client::{ReceiptLog, TxReceipt, WalletClient};
use crate::error::{WalletError, WalletErrorKind};

/// Record of a submitted transaction, for assertions on call ordering.
#[derive(Clone, Debug)]
pub struct SentTx {
    pub to: Option<Address>,
    pub data: Bytes,
    pub value: U256,
    pub hash: TxHash,
}

impl SentTx {
    pub fn selector(&self) -> [u8; 4] {
        let mut selector = [0u8; 4];
        if self.data.len() >= 4 {
            selector.copy_from_slice(&self.data[..4]);
        }
        selector
    }
}

#[derive(Default)]
pub struct MockWalletClient {
    account: Option<Address>,
    chain_id: Mutex<u64>,
    switchable_chains: Vec<u64>,
    call_responses: Mutex<HashMap<(Address, [u8; 4]), Bytes>>,
    call_failures: Mutex<HashMap<(Address, [u8; 4]), WalletError>>,
    send_failures: Mutex<VecDeque<WalletError>>,
    receipt_overrides: Mutex<VecDeque<TxReceipt>>,
    receipt_logs: Mutex<VecDeque<Vec<ReceiptLog>>>,
    sent: Mutex<Vec<SentTx>>,
    hash_counter: Mutex<u64>,
}

impl MockWalletClient {
    pub fn new(account: Address, chain_id: u64) -> Self {
        Self { account: Some(account), chain_id: Mutex::new(chain_id), ..Default::default() }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Chains `switch_chain` is allowed to move to.
    pub fn with_switchable_chains(mut self, chains: Vec<u64>) -> Self {
        self.switchable_chains = chains;
        self
    }

    /// Script the return data of a read-only call, keyed by target address
    /// and 4-byte selector.
    pub fn set_call_response(&self, to: Address, selector: [u8; 4], ret: impl Into<Bytes>) {
        self.call_responses.lock().unwrap().insert((to, selector), ret.into());
    }

    pub fn fail_call(&self, to: Address, selector: [u8; 4], error: WalletError) {
        self.call_failures.lock().unwrap().insert((to, selector), error);
    }

    /// Make the next `send`/`deploy` fail with `error`.
    pub fn fail_next_send(&self, error: WalletError) {
        self.send_failures.lock().unwrap().push_back(error);
    }

    /// Replace the next `wait_for_receipt` result wholesale, regardless of
    /// the hash asked for. Used to simulate stale receipts.
    pub fn override_next_receipt(&self, receipt: TxReceipt) {
        self.receipt_overrides.lock().unwrap().push_back(receipt);
    }

    /// Attach logs to the next default (matching-hash) receipt.
    pub fn push_receipt_logs(&self, logs: Vec<ReceiptLog>) {
        self.receipt_logs.lock().unwrap().push_back(logs);
    }

    pub fn sent_transactions(&self) -> Vec<SentTx> {
        self.sent.lock().unwrap().clone()
    }

    fn next_hash(&self) -> TxHash {
        let mut counter = self.hash_counter.lock().unwrap();
        *counter += 1;
        B256::from(U256::from(*counter))
    }

    fn submit(&self, to: Option<Address>, data: Bytes, value: U256) -> Result<TxHash, WalletError> {
        if let Some(error) = self.send_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        let hash = self.next_hash();
        self.sent.lock().unwrap().push(SentTx { to, data, value, hash });
        Ok(hash)
    }
}

#[async_trait]
impl WalletClient for MockWalletClient {
    fn address(&self) -> Option<Address> {
        self.account
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        if !self.switchable_chains.contains(&chain_id) {
            return Err(WalletError::new(WalletErrorKind::UnsupportedChain, format!("cannot switch to chain {chain_id}")));
        }
        *self.chain_id.lock().unwrap() = chain_id;
        Ok(())
    }

    async fn deploy(&self, code: Bytes, value: U256) -> Result<TxHash, WalletError> {
        self.submit(None, code, value)
    }

    async fn send(&self, to: Address, data: Bytes, value: U256) -> Result<TxHash, WalletError> {
        self.submit(Some(to), data, value)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, WalletError> {
        let mut selector = [0u8; 4];
        if data.len() >= 4 {
            selector.copy_from_slice(&data[..4]);
        }
        if let Some(error) = self.call_failures.lock().unwrap().get(&(to, selector)) {
            return Err(error.clone());
        }
        match self.call_responses.lock().unwrap().get(&(to, selector)) {
            Some(ret) => Ok(ret.clone()),
            None => Err(WalletError::new(
                WalletErrorKind::Other,
                format!("unscripted call to {to} selector 0x{}", hex::encode(selector)),
            )),
        }
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, WalletError> {
        if let Some(receipt) = self.receipt_overrides.lock().unwrap().pop_front() {
            return Ok(receipt);
        }
        let logs = self.receipt_logs.lock().unwrap().pop_front().unwrap_or_default();
        Ok(TxReceipt { transaction_hash: hash, status: true, contract_address: None, logs })
    }
}

/// ABI-encode a single word return value for scripted calls.
pub fn ret_uint(value: U256) -> Bytes {
    value.to_be_bytes::<32>().to_vec().into()
}

pub fn ret_u8(value: u8) -> Bytes {
    ret_uint(U256::from(value))
}

pub fn ret_bool(value: bool) -> Bytes {
    ret_uint(U256::from(value as u8))
}

pub fn ret_address(value: Address) -> Bytes {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(value.as_slice());
    word.to_vec().into()
}

/// ABI-encode a dynamic string return value (offset, length, padded data).
pub fn ret_string(value: &str) -> Bytes {
    let mut out = Vec::with_capacity(96);
    out.extend_from_slice(&U256::from(32u64).to_be_bytes::<32>());
    out.extend_from_slice(&U256::from(value.len() as u64).to_be_bytes::<32>());
    out.extend_from_slice(value.as_bytes());
    let pad = (32 - value.len() % 32) % 32;
    out.extend(std::iter::repeat(0u8).take(pad));
    out.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reads::{erc20_decimals, erc20_name};
    use alloy_sol_types::SolCall;
    use basemint_defi_abi::IERC20;

    #[tokio::test]
    async fn test_scripted_reads_decode() {
        let token = Address::repeat_byte(0x11);
        let mock = MockWalletClient::new(Address::repeat_byte(0xaa), 8453);
        mock.set_call_response(token, IERC20::decimalsCall::SELECTOR, ret_u8(6));
        mock.set_call_response(token, IERC20::nameCall::SELECTOR, ret_string("Mock Token"));

        assert_eq!(erc20_decimals(&mock, token).await.unwrap(), 6);
        assert_eq!(erc20_name(&mock, token).await.unwrap(), "Mock Token");
    }

    #[tokio::test]
    async fn test_unscripted_call_errors() {
        let mock = MockWalletClient::new(Address::repeat_byte(0xaa), 8453);
        let err = erc20_decimals(&mock, Address::repeat_byte(0x11)).await.unwrap_err();
        assert_eq!(err.kind, WalletErrorKind::Other);
    }

    #[tokio::test]
    async fn test_send_records_hashes_in_order() {
        let mock = MockWalletClient::new(Address::repeat_byte(0xaa), 8453);
        let h1 = mock.send(Address::repeat_byte(0x01), Bytes::new(), U256::ZERO).await.unwrap();
        let h2 = mock.send(Address::repeat_byte(0x02), Bytes::new(), U256::ZERO).await.unwrap();
        assert_ne!(h1, h2);
        assert_eq!(mock.sent_transactions().len(), 2);

        let receipt = mock.wait_for_receipt(h2).await.unwrap();
        assert_eq!(receipt.transaction_hash, h2);
        assert!(receipt.status);
    }
}
