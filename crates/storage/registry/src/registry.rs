use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use basemint_types_entities::{CreatedToken, LiquidityPool, LpToken};

use crate::store::LocalStore;

pub const CREATED_TOKENS_KEY: &str = "created_tokens";
pub const LIQUIDITY_POOLS_KEY: &str = "liquidity_pools";
pub const LP_TOKENS_KEY: &str = "lp_tokens";

/// Local registry of user-created tokens, liquidity pools and LP positions.
///
/// Each record type lives as one flat JSON array holding every owner's and
/// every chain's records; `load_*` filters client-side. Constructed once and
/// handed to the orchestrators.
pub struct TokenRegistry {
    store: Arc<dyn LocalStore>,
}

impl TokenRegistry {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Decode a stored list. A payload that is not a well-formed array is
    /// discarded and replaced with an empty list; this never surfaces to the
    /// caller.
    fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(payload) = self.store.get(key) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<T>>(&payload) {
            Ok(records) => records,
            Err(e) => {
                warn!("store key {} holds malformed data ({}), resetting to empty", key, e);
                if let Err(e) = self.store.set(key, "[]") {
                    warn!("failed to reset store key {}: {}", key, e);
                }
                Vec::new()
            }
        }
    }

    fn write_list<T: Serialize>(&self, key: &str, records: &[T]) {
        match serde_json::to_string(records) {
            Ok(payload) => {
                if let Err(e) = self.store.set(key, &payload) {
                    warn!("failed to persist store key {}: {}", key, e);
                }
            }
            Err(e) => warn!("failed to encode store key {}: {}", key, e),
        }
    }

    /// All tokens created by `owner` on `chain_id`. Runs the one-time
    /// migration first: records lacking a chain id are assumed to belong to
    /// the active chain and persisted back-filled, so a second load is a
    /// no-op.
    pub fn load_tokens(&self, owner: &str, chain_id: u64) -> Vec<CreatedToken> {
        let mut records: Vec<CreatedToken> = self.read_list(CREATED_TOKENS_KEY);
        let mut migrated = 0usize;
        for record in records.iter_mut() {
            if record.chain_id.is_none() {
                record.chain_id = Some(chain_id);
                migrated += 1;
            }
        }
        if migrated > 0 {
            debug!("back-filled chain id on {} token records", migrated);
            self.write_list(CREATED_TOKENS_KEY, &records);
        }
        records.into_iter().filter(|t| t.matches_owner(owner) && t.chain_id == Some(chain_id)).collect()
    }

    pub fn load_pools(&self, owner: &str, chain_id: u64) -> Vec<LiquidityPool> {
        let mut records: Vec<LiquidityPool> = self.read_list(LIQUIDITY_POOLS_KEY);
        let mut migrated = 0usize;
        for record in records.iter_mut() {
            if record.chain_id.is_none() {
                record.chain_id = Some(chain_id);
                migrated += 1;
            }
        }
        if migrated > 0 {
            debug!("back-filled chain id on {} pool records", migrated);
            self.write_list(LIQUIDITY_POOLS_KEY, &records);
        }
        records.into_iter().filter(|p| p.matches_owner(owner) && p.chain_id == Some(chain_id)).collect()
    }

    pub fn load_lp_tokens(&self, owner: &str, chain_id: u64) -> Vec<LpToken> {
        let mut records: Vec<LpToken> = self.read_list(LP_TOKENS_KEY);
        let mut migrated = 0usize;
        for record in records.iter_mut() {
            if record.chain_id.is_none() {
                record.chain_id = Some(chain_id);
                migrated += 1;
            }
        }
        if migrated > 0 {
            self.write_list(LP_TOKENS_KEY, &records);
        }
        records.into_iter().filter(|t| t.matches_owner(owner) && t.chain_id == Some(chain_id)).collect()
    }

    pub fn append_token(&self, token: CreatedToken) {
        let mut records: Vec<CreatedToken> = self.read_list(CREATED_TOKENS_KEY);
        records.push(token);
        self.write_list(CREATED_TOKENS_KEY, &records);
    }

    /// Overwrite a token record in place, e.g. replacing placeholder metadata
    /// once the deployed contract is readable. Returns false when no record
    /// matches.
    pub fn update_token(&self, address: &str, chain_id: u64, update: impl FnOnce(&mut CreatedToken)) -> bool {
        let mut records: Vec<CreatedToken> = self.read_list(CREATED_TOKENS_KEY);
        let Some(record) = records.iter_mut().find(|t| t.matches_address(address, chain_id)) else {
            return false;
        };
        update(record);
        self.write_list(CREATED_TOKENS_KEY, &records);
        true
    }

    pub fn append_pool(&self, pool: LiquidityPool) {
        let mut records: Vec<LiquidityPool> = self.read_list(LIQUIDITY_POOLS_KEY);
        records.push(pool);
        self.write_list(LIQUIDITY_POOLS_KEY, &records);
    }

    pub fn find_pool(&self, id: &str) -> Option<LiquidityPool> {
        self.read_list::<LiquidityPool>(LIQUIDITY_POOLS_KEY).into_iter().find(|p| p.id == id)
    }

    /// Drop a pool record after its liquidity has been withdrawn. Returns
    /// false when no record matches.
    pub fn remove_pool(&self, id: &str) -> bool {
        let mut records: Vec<LiquidityPool> = self.read_list(LIQUIDITY_POOLS_KEY);
        let before = records.len();
        records.retain(|p| p.id != id);
        if records.len() == before {
            return false;
        }
        self.write_list(LIQUIDITY_POOLS_KEY, &records);
        true
    }

    /// Fill in the real pair address on a historical record that was stored
    /// with a placeholder.
    pub fn resolve_pool_address(&self, id: &str, pool_address: &str) -> bool {
        let mut records: Vec<LiquidityPool> = self.read_list(LIQUIDITY_POOLS_KEY);
        let Some(record) = records.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        record.pool_address = pool_address.to_string();
        self.write_list(LIQUIDITY_POOLS_KEY, &records);
        true
    }

    /// Insert an LP record unless one already exists for the same
    /// `(address, user)` pair.
    pub fn append_lp_token(&self, lp_token: LpToken) {
        let mut records: Vec<LpToken> = self.read_list(LP_TOKENS_KEY);
        if records.iter().any(|existing| existing.is_same_position(&lp_token)) {
            debug!("lp token {} already tracked for {}", lp_token.address, lp_token.user_address);
            return;
        }
        records.push(lp_token);
        self.write_list(LP_TOKENS_KEY, &records);
    }
}
