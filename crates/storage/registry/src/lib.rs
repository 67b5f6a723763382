pub use registry::{TokenRegistry, CREATED_TOKENS_KEY, LIQUIDITY_POOLS_KEY, LP_TOKENS_KEY};
pub use store::{FileStore, LocalStore, MemoryStore};

mod registry;
mod store;
