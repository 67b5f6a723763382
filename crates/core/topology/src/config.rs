use std::time::Duration;

use alloy_primitives::{
    utils::{parse_units, ParseUnits},
    Address, U256,
};
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::info;

use basemint_types_entities::{BASE_MAINNET_CHAIN_ID, BASE_SEPOLIA_CHAIN_ID};

/// Top-level application configuration, loaded from TOML. All tuning knobs
/// are optional with accessors supplying the defaults.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AppConfig {
    data_dir: Option<String>,
    fee: Option<FeeConfig>,
    defaults: Option<TuningConfig>,
    #[serde(default)]
    chains: Vec<ChainConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FeeConfig {
    /// Flat creation fee in ether, e.g. "0.02".
    amount_eth: Option<String>,
    recipient: Option<Address>,
}

/// Slippage/min-out guards are risk tuning, not protocol guarantees, so they
/// are configuration rather than constants.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TuningConfig {
    slippage_bps: Option<u64>,
    removal_fallback_bps: Option<u64>,
    deadline_secs: Option<u64>,
    receipt_timeout_secs: Option<u64>,
    indexing_delay_secs: Option<u64>,
    read_retries: Option<u32>,
    read_retry_delay_ms: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    /// Uniswap V2 router. Absent on chains where the protocol is not
    /// deployed; liquidity operations are refused there.
    pub router: Option<Address>,
    pub factory: Option<Address>,
    pub weth: Option<Address>,
    pub explorer_api_url: Option<String>,
    pub explorer_api_key: Option<String>,
}

impl ChainConfig {
    pub fn liquidity_available(&self) -> bool {
        self.router.is_some() && self.factory.is_some() && self.weth.is_some()
    }
}

impl AppConfig {
    pub fn load_from_file(file_name: String) -> Result<AppConfig> {
        let contents = std::fs::read_to_string(&file_name)?;
        let config: AppConfig = toml::from_str(&contents).map_err(|e| eyre!("failed to parse {file_name}: {e}"))?;
        info!("loaded configuration from {} ({} chains)", file_name, config.chains.len());
        Ok(config)
    }

    /// Built-in Base mainnet + Base Sepolia topology, used when no config
    /// file is given.
    pub fn base_defaults() -> AppConfig {
        AppConfig {
            data_dir: None,
            fee: None,
            defaults: None,
            chains: vec![
                ChainConfig {
                    chain_id: BASE_MAINNET_CHAIN_ID,
                    rpc_url: "https://mainnet.base.org".to_string(),
                    router: Some("0x4752ba5DBc23f44D87826276BF6Fd6b1C372aD24".parse().unwrap()),
                    factory: Some("0x8909Dc15e40173Ff4699343b6eB8132c65e18eC6".parse().unwrap()),
                    weth: Some("0x4200000000000000000000000000000000000006".parse().unwrap()),
                    explorer_api_url: Some("https://api.basescan.org/api".to_string()),
                    explorer_api_key: None,
                },
                ChainConfig {
                    chain_id: BASE_SEPOLIA_CHAIN_ID,
                    rpc_url: "https://sepolia.base.org".to_string(),
                    router: None,
                    factory: None,
                    weth: None,
                    explorer_api_url: Some("https://api-sepolia.basescan.org/api".to_string()),
                    explorer_api_key: None,
                },
            ],
        }
    }

    pub fn data_dir(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "basemint-data".to_string())
    }

    pub fn chains(&self) -> &[ChainConfig] {
        &self.chains
    }

    pub fn chain(&self, chain_id: u64) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// Flat token-creation fee in wei. 0.02 ETH unless configured otherwise.
    pub fn creation_fee_wei(&self) -> U256 {
        let amount = self.fee.as_ref().and_then(|f| f.amount_eth.clone()).unwrap_or_else(|| "0.02".to_string());
        parse_units(&amount, "ether").map(ParseUnits::get_absolute).unwrap_or_else(|_| {
            parse_units("0.02", "ether").map(ParseUnits::get_absolute).unwrap_or_default()
        })
    }

    pub fn fee_recipient(&self) -> Address {
        self.fee.as_ref().and_then(|f| f.recipient).unwrap_or(Address::ZERO)
    }

    fn tuning(&self) -> TuningConfig {
        self.defaults.clone().unwrap_or_default()
    }

    /// Min-out guard for both flows: desired amount reduced by this many
    /// basis points. Default 500 (5% slippage tolerance).
    pub fn slippage_bps(&self) -> u64 {
        self.tuning().slippage_bps.unwrap_or(500)
    }

    /// Fallback min-out for removals when the proportional-share calculation
    /// cannot be performed: this many basis points of the LP amount.
    /// Default 10 (0.1%).
    pub fn removal_fallback_bps(&self) -> u64 {
        self.tuning().removal_fallback_bps.unwrap_or(10)
    }

    /// On-chain deadline attached to router calls. Default 20 minutes.
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.tuning().deadline_secs.unwrap_or(20 * 60))
    }

    /// How long to wait for a transaction receipt. Default 5 minutes.
    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.tuning().receipt_timeout_secs.unwrap_or(5 * 60))
    }

    /// Pause before reading back freshly deployed contract metadata, giving
    /// the node time to index the new contract.
    pub fn indexing_delay(&self) -> Duration {
        Duration::from_secs(self.tuning().indexing_delay_secs.unwrap_or(5))
    }

    pub fn read_retries(&self) -> u32 {
        self.tuning().read_retries.unwrap_or(3)
    }

    pub fn read_retry_delay(&self) -> Duration {
        Duration::from_millis(self.tuning().read_retry_delay_ms.unwrap_or(2000))
    }
}
