pub use deployer::{format_supply, CreateTokenParams, DeployError, DeployOutcome, TokenDeployer};
pub use verify::{ExplorerClient, VerificationRequest};

mod deployer;
mod verify;
