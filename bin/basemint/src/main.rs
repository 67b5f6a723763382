use std::collections::HashMap;
use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::providers::ProviderBuilder;
use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use clap::{Parser, Subcommand};
use eyre::{eyre, Result};
use tracing::{info, warn};

use basemint_core_deployer::{CreateTokenParams, DeployOutcome, TokenDeployer};
use basemint_core_liquidity::{LiquidityOrchestrator, RemovalTarget, TxOutcome};
use basemint_core_selection::resolve_custom_token;
use basemint_core_topology::AppConfig;
use basemint_node_wallet::{AlloyWalletClient, WalletClient};
use basemint_storage_registry::{FileStore, TokenRegistry};

#[derive(Parser)]
#[command(name = "basemint", about = "Deploy tokens on Base and manage Uniswap V2 liquidity")]
struct Cli {
    /// Configuration file. Built-in Base defaults apply when it is absent.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Hex-encoded signing key.
    #[arg(long, env = "BASEMINT_PRIVATE_KEY", hide_env_values = true)]
    private_key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deploy a new token with the flat creation fee and record it locally.
    CreateToken {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        /// Initial supply in whole tokens.
        #[arg(long)]
        supply: String,
        /// Skip explorer source verification.
        #[arg(long)]
        no_verify: bool,
    },
    /// Pair a token with ETH on Uniswap V2, approving the router first when
    /// needed.
    AddLiquidity {
        #[arg(long)]
        token: Address,
        #[arg(long)]
        token_amount: String,
        #[arg(long)]
        eth_amount: String,
    },
    /// Redeem an LP position for the underlying token and ETH.
    RemoveLiquidity {
        /// Stored pool id, as printed by list-pools.
        #[arg(long, conflicts_with = "lp_address")]
        pool_id: Option<String>,
        /// LP pair address, for positions without a stored record.
        #[arg(long)]
        lp_address: Option<Address>,
        /// LP amount to redeem; the full balance when omitted.
        #[arg(long)]
        amount: Option<String>,
    },
    /// Tokens created by this account on the active chain.
    ListTokens,
    /// Liquidity positions recorded for this account on the active chain.
    ListPools,
}

fn report_hydration(updated: bool) {
    if updated {
        info!("token metadata read back from the contract");
    } else {
        warn!("metadata read-back failed; the record keeps placeholder values for now");
    }
}

fn initialize_logging() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,alloy_rpc_client=off,hyper=off,reqwest=off"),
    )
    .format_timestamp_micros()
    .init();
}

fn load_configuration(path: &str) -> Result<AppConfig> {
    if std::path::Path::new(path).exists() {
        AppConfig::load_from_file(path.to_string())
    } else {
        info!("{} not found, using built-in Base defaults", path);
        Ok(AppConfig::base_defaults())
    }
}

fn build_wallet(config: &AppConfig, private_key: &str) -> Result<(Arc<dyn WalletClient>, Address)> {
    let signer: PrivateKeySigner = private_key.trim().parse().map_err(|_| eyre!("invalid private key"))?;
    let account = signer.address();
    let signing_wallet = EthereumWallet::from(signer);

    let mut providers = HashMap::new();
    for chain in config.chains() {
        let url: url::Url = chain.rpc_url.parse()?;
        providers.insert(chain.chain_id, ProviderBuilder::new().wallet(signing_wallet.clone()).on_http(url));
    }
    let initial_chain = config.chains().first().map(|c| c.chain_id).ok_or_else(|| eyre!("no chains configured"))?;

    let client = AlloyWalletClient::new(providers, initial_chain, account).with_receipt_timeout(config.receipt_timeout());
    Ok((Arc::new(client), account))
}

#[tokio::main]
async fn main() -> Result<()> {
    initialize_logging();

    let cli = Cli::parse();
    let config = Arc::new(load_configuration(&cli.config)?);
    let (wallet, account) = build_wallet(&config, &cli.private_key)?;
    let store = FileStore::new(config.data_dir())?;
    let registry = Arc::new(TokenRegistry::new(Arc::new(store)));

    let owner = format!("{account:?}");
    info!("connected as {} on chain {}", owner, wallet.chain_id().await?);

    match cli.command {
        Command::CreateToken { name, symbol, supply, no_verify } => {
            let deployer = TokenDeployer::new(wallet.clone(), registry.clone(), config.clone());
            let params = CreateTokenParams { name, symbol, total_supply: supply };
            match deployer.create_token(&params).await? {
                DeployOutcome::Cancelled => info!("token creation cancelled in the wallet"),
                DeployOutcome::Completed(token) => {
                    println!("token deployed at {} (tx {})", token.address, token.tx_hash);
                    let address: Address = token.address.parse()?;
                    let chain_id = token.chain_id.ok_or_else(|| eyre!("deployed record is missing its chain"))?;

                    // metadata read-back and explorer verification are
                    // independent; run them concurrently
                    let hydrate = deployer.hydrate_metadata(address, chain_id);
                    if no_verify {
                        report_hydration(hydrate.await);
                    } else {
                        let (hydrated, status) =
                            tokio::join!(hydrate, deployer.verify_contract(&params, address, chain_id));
                        report_hydration(hydrated);
                        match status {
                            Some(status) => println!("explorer verification: {status}"),
                            None => info!("no explorer API configured for this chain, verification skipped"),
                        }
                    }
                }
            }
        }
        Command::AddLiquidity { token, token_amount, eth_amount } => {
            let chain_id = wallet.chain_id().await?;
            let (name, symbol) = match registry
                .load_tokens(&owner, chain_id)
                .into_iter()
                .find(|t| t.matches_address(&format!("{token:?}"), chain_id))
            {
                Some(stored) => (stored.name, stored.symbol),
                None => {
                    let resolved = resolve_custom_token(wallet.as_ref(), token).await?;
                    (resolved.name, resolved.symbol)
                }
            };

            let orchestrator = LiquidityOrchestrator::new(wallet, registry, config);
            match orchestrator.add_liquidity(token, &name, &symbol, &token_amount, &eth_amount).await? {
                TxOutcome::Completed(pool) => {
                    println!("liquidity added: pool {} (id {})", pool.pool_address, pool.id);
                }
                TxOutcome::Cancelled => info!("liquidity add cancelled in the wallet"),
                TxOutcome::Stale => warn!("discarded a confirmation for an untracked transaction; check the explorer"),
            }
        }
        Command::RemoveLiquidity { pool_id, lp_address, amount } => {
            let target = match (pool_id, lp_address) {
                (Some(id), None) => RemovalTarget::StoredPool { id, amount },
                (None, Some(address)) => RemovalTarget::LpAddress { address, amount },
                _ => return Err(eyre!("pass exactly one of --pool-id or --lp-address")),
            };

            let orchestrator = LiquidityOrchestrator::new(wallet, registry, config);
            match orchestrator.remove_liquidity(target).await? {
                TxOutcome::Completed(result) => {
                    println!("removed {} LP from {} (tx {:?})", result.lp_amount, result.lp_address, result.tx_hash);
                }
                TxOutcome::Cancelled => info!("liquidity removal cancelled in the wallet"),
                TxOutcome::Stale => warn!("discarded a confirmation for an untracked transaction; check the explorer"),
            }
        }
        Command::ListTokens => {
            let chain_id = wallet.chain_id().await?;
            let tokens = registry.load_tokens(&owner, chain_id);
            if tokens.is_empty() {
                println!("no tokens recorded for {owner} on chain {chain_id}");
            }
            for token in tokens {
                println!("{}  {} ({})  supply {}  created {}", token.address, token.name, token.symbol, token.total_supply, token.created_at);
            }
        }
        Command::ListPools => {
            let chain_id = wallet.chain_id().await?;
            let pools = registry.load_pools(&owner, chain_id);
            if pools.is_empty() {
                println!("no pools recorded for {owner} on chain {chain_id}");
            }
            for pool in pools {
                println!(
                    "{}  {} ({})  {} + {} ETH  pool {}",
                    pool.id, pool.token_name, pool.token_symbol, pool.token_amount, pool.eth_amount, pool.pool_address
                );
            }
        }
    }

    Ok(())
}
