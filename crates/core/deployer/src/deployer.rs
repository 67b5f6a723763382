use std::sync::Arc;

use alloy_primitives::{
    utils::{format_units, parse_units, ParseUnits},
    Address, U256,
};
use chrono::Utc;
use eyre::{eyre, Result};
use thiserror::Error;
use tracing::{debug, info, warn};

use basemint_core_topology::AppConfig;
use basemint_defi_abi::{
    encode_constructor_args, encode_deploy_payload, CREATOR_TOKEN_COMPILER_VERSION, CREATOR_TOKEN_CONTRACT_NAME,
    CREATOR_TOKEN_SOURCE,
};
use basemint_node_wallet::{
    classify_for_display, erc20_decimals, erc20_name, erc20_symbol, erc20_total_supply, WalletClient, WalletError,
};
use basemint_storage_registry::TokenRegistry;
use basemint_types_entities::{
    is_supported_chain, CreatedToken, VerificationStatus, BASE_MAINNET_CHAIN_ID, BASE_SEPOLIA_CHAIN_ID,
};

use crate::verify::{ExplorerClient, VerificationRequest};

#[derive(Clone, Debug)]
pub struct CreateTokenParams {
    pub name: String,
    pub symbol: String,
    /// Initial supply in whole tokens; the contract mints with 18 decimals.
    pub total_supply: String,
}

#[derive(Clone, Debug)]
pub enum DeployOutcome {
    Completed(CreatedToken),
    /// The user declined the signature request. Not an error.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("wallet not connected")]
    NotConnected,
    #[error("{0}")]
    InvalidInput(String),
    #[error("deploy artifact is unusable: {0}")]
    Artifact(String),
    #[error("deploy confirmed but the receipt carries no contract address")]
    NoContractAddress,
    #[error("deploy transaction reverted")]
    Reverted,
    #[error(transparent)]
    Wallet(#[from] WalletError),
}

/// Human-readable supply string for a raw on-chain amount, with trailing
/// zeros stripped.
pub fn format_supply(value: U256, decimals: u8) -> String {
    match format_units(value, decimals) {
        Ok(text) => {
            let trimmed = text.trim_end_matches('0').trim_end_matches('.');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(_) => value.to_string(),
    }
}

fn parse_supply(total_supply: &str) -> Option<U256> {
    let trimmed = total_supply.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_units(trimmed, 18).ok().map(ParseUnits::get_absolute).filter(|value| !value.is_zero())
}

/// Deploys creator tokens and keeps the local registry in sync.
///
/// A confirmed deploy immediately writes a placeholder record; the real
/// name/symbol/supply are read back from the contract afterwards, once the
/// node has indexed it. Explorer source verification is best effort and never
/// gates anything.
pub struct TokenDeployer {
    wallet: Arc<dyn WalletClient>,
    registry: Arc<TokenRegistry>,
    config: Arc<AppConfig>,
}

impl TokenDeployer {
    pub fn new(wallet: Arc<dyn WalletClient>, registry: Arc<TokenRegistry>, config: Arc<AppConfig>) -> Self {
        Self { wallet, registry, config }
    }

    /// Deploy a new token with the flat creation fee attached and record it
    /// locally. Returns `Cancelled` when the wallet rejects the signature.
    pub async fn create_token(&self, params: &CreateTokenParams) -> Result<DeployOutcome> {
        match self.create_token_inner(params).await {
            Ok(token) => Ok(DeployOutcome::Completed(token)),
            Err(DeployError::Wallet(e)) if e.is_rejection() => {
                debug!("deploy request rejected in the wallet");
                Ok(DeployOutcome::Cancelled)
            }
            Err(DeployError::Wallet(e)) => Err(eyre!(classify_for_display(&e).unwrap_or_else(|| e.message.clone()))),
            Err(e) => Err(eyre!(e.to_string())),
        }
    }

    async fn create_token_inner(&self, params: &CreateTokenParams) -> std::result::Result<CreatedToken, DeployError> {
        let owner = self.wallet.address().ok_or(DeployError::NotConnected)?;

        let name = params.name.trim();
        let symbol = params.symbol.trim();
        if name.is_empty() || symbol.is_empty() {
            return Err(DeployError::InvalidInput("token name and symbol are required".to_string()));
        }
        let supply_wei = parse_supply(&params.total_supply)
            .ok_or_else(|| DeployError::InvalidInput(format!("invalid total supply: {}", params.total_supply)))?;

        let chain_id = self.ensure_supported_chain().await?;

        let payload = encode_deploy_payload(name, symbol, supply_wei, self.config.fee_recipient())
            .map_err(|e| DeployError::Artifact(e.to_string()))?;
        let fee = self.config.creation_fee_wei();
        info!("deploying {} ({}) on chain {} with fee {} wei", name, symbol, chain_id, fee);

        let hash = self.wallet.deploy(payload, fee).await?;
        let receipt = self.wallet.wait_for_receipt(hash).await?;
        if !receipt.status {
            return Err(DeployError::Reverted);
        }
        let address = receipt.contract_address.ok_or(DeployError::NoContractAddress)?;

        let token = CreatedToken::placeholder(
            address,
            params.total_supply.trim(),
            owner,
            receipt.transaction_hash,
            chain_id,
            Utc::now().timestamp_millis(),
        );
        self.registry.append_token(token.clone());
        info!("token deployed at {}", address);
        Ok(token)
    }

    /// Move the wallet onto a supported chain, preferring mainnet and falling
    /// back to the testnet when the mainnet switch is refused.
    async fn ensure_supported_chain(&self) -> std::result::Result<u64, DeployError> {
        let chain_id = self.wallet.chain_id().await?;
        if is_supported_chain(chain_id) {
            return Ok(chain_id);
        }
        info!("chain {} is not supported, switching to Base", chain_id);
        match self.wallet.switch_chain(BASE_MAINNET_CHAIN_ID).await {
            Ok(()) => Ok(BASE_MAINNET_CHAIN_ID),
            Err(e) => {
                warn!("switch to Base mainnet refused ({}), trying Base Sepolia", e);
                self.wallet.switch_chain(BASE_SEPOLIA_CHAIN_ID).await?;
                Ok(BASE_SEPOLIA_CHAIN_ID)
            }
        }
    }

    /// Replace a placeholder record's metadata with the values the contract
    /// actually reports. Waits out the node's indexing lag first, then reads
    /// with bounded retries. Returns false when the record could not be
    /// updated.
    pub async fn hydrate_metadata(&self, address: Address, chain_id: u64) -> bool {
        tokio::time::sleep(self.config.indexing_delay()).await;
        let retries = self.config.read_retries().max(1);
        for attempt in 1..=retries {
            match self.read_metadata(address).await {
                Ok((name, symbol, decimals, supply)) => {
                    let updated = self.registry.update_token(&format!("{address:?}"), chain_id, |token| {
                        token.name = name.clone();
                        token.symbol = symbol.clone();
                        token.decimals = decimals;
                        token.total_supply = format_supply(supply, decimals);
                    });
                    if !updated {
                        warn!("no stored record for {} on chain {}", address, chain_id);
                    }
                    return updated;
                }
                Err(e) => {
                    warn!("metadata read for {} failed (attempt {}/{}): {}", address, attempt, retries, e);
                    if attempt < retries {
                        tokio::time::sleep(self.config.read_retry_delay()).await;
                    }
                }
            }
        }
        false
    }

    async fn read_metadata(&self, address: Address) -> std::result::Result<(String, String, u8, U256), WalletError> {
        let name = erc20_name(self.wallet.as_ref(), address).await?;
        let symbol = erc20_symbol(self.wallet.as_ref(), address).await?;
        let decimals = erc20_decimals(self.wallet.as_ref(), address).await?;
        let supply = erc20_total_supply(self.wallet.as_ref(), address).await?;
        Ok((name, symbol, decimals, supply))
    }

    /// Submit the contract source to the chain's block explorer and poll for
    /// the result. Failures are reported, never propagated. `None` means no
    /// explorer API is configured for the chain and nothing was submitted.
    pub async fn verify_contract(
        &self,
        params: &CreateTokenParams,
        address: Address,
        chain_id: u64,
    ) -> Option<VerificationStatus> {
        let api_url = match self.config.chain(chain_id).and_then(|c| c.explorer_api_url.clone()) {
            Some(url) => url,
            None => {
                debug!("no explorer API configured for chain {}, skipping verification", chain_id);
                return None;
            }
        };
        let api_key = self.config.chain(chain_id).and_then(|c| c.explorer_api_key.clone());

        let supply_wei = match parse_supply(&params.total_supply) {
            Some(value) => value,
            None => return Some(VerificationStatus::Failed),
        };
        let args = encode_constructor_args(
            params.name.trim(),
            params.symbol.trim(),
            supply_wei,
            self.config.fee_recipient(),
        );
        let request = VerificationRequest {
            contract_address: address,
            contract_name: CREATOR_TOKEN_CONTRACT_NAME.to_string(),
            source_code: CREATOR_TOKEN_SOURCE.to_string(),
            compiler_version: CREATOR_TOKEN_COMPILER_VERSION.to_string(),
            constructor_args_hex: alloy_primitives::hex::encode(args),
        };

        let client = ExplorerClient::new(api_url, api_key);
        match client.submit(&request).await {
            Ok(guid) => {
                info!("verification submitted for {}, guid {}", address, guid);
                Some(client.wait_for_verification(&guid, 10, self.config.read_retry_delay()).await)
            }
            Err(e) => {
                warn!("verification submission for {} failed: {}", address, e);
                Some(VerificationStatus::Failed)
            }
        }
    }
}
