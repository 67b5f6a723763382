pub use config::{AppConfig, ChainConfig, FeeConfig, TuningConfig};

mod config;
