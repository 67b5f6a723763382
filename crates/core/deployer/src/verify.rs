use std::time::Duration;

use alloy_primitives::Address;
use eyre::{eyre, Result};
use serde::Deserialize;
use tracing::{debug, warn};

use basemint_types_entities::VerificationStatus;

/// Etherscan-family verification API client (Basescan uses the same
/// protocol). Submissions return a GUID which is then polled for the result.
pub struct ExplorerClient {
    http: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

/// Everything the explorer needs to recompile and match the contract.
pub struct VerificationRequest {
    pub contract_address: Address,
    pub contract_name: String,
    pub source_code: String,
    pub compiler_version: String,
    /// ABI-encoded constructor arguments, hex without the 0x prefix.
    pub constructor_args_hex: String,
}

#[derive(Debug, Deserialize)]
struct ExplorerResponse {
    status: String,
    #[allow(dead_code)]
    message: String,
    result: String,
}

impl ExplorerClient {
    pub fn new(api_url: String, api_key: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), api_url, api_key }
    }

    /// Submit the source for verification. Returns the polling GUID.
    pub async fn submit(&self, request: &VerificationRequest) -> Result<String> {
        let mut form = vec![
            ("module".to_string(), "contract".to_string()),
            ("action".to_string(), "verifysourcecode".to_string()),
            ("contractaddress".to_string(), format!("{:?}", request.contract_address)),
            ("sourceCode".to_string(), request.source_code.clone()),
            ("codeformat".to_string(), "solidity-single-file".to_string()),
            ("contractname".to_string(), request.contract_name.clone()),
            ("compilerversion".to_string(), request.compiler_version.clone()),
            ("optimizationUsed".to_string(), "1".to_string()),
            ("runs".to_string(), "200".to_string()),
            // the API's own spelling of this field
            ("constructorArguements".to_string(), request.constructor_args_hex.clone()),
            ("evmversion".to_string(), "paris".to_string()),
            ("licenseType".to_string(), "3".to_string()),
        ];
        if let Some(key) = &self.api_key {
            form.push(("apikey".to_string(), key.clone()));
        }

        let response: ExplorerResponse =
            self.http.post(&self.api_url).form(&form).send().await?.error_for_status()?.json().await?;
        if response.status == "1" {
            Ok(response.result)
        } else {
            Err(eyre!("explorer refused the submission: {}", response.result))
        }
    }

    /// One status poll for a previously submitted GUID.
    pub async fn check(&self, guid: &str) -> Result<VerificationStatus> {
        let mut form = vec![
            ("module".to_string(), "contract".to_string()),
            ("action".to_string(), "checkverifystatus".to_string()),
            ("guid".to_string(), guid.to_string()),
        ];
        if let Some(key) = &self.api_key {
            form.push(("apikey".to_string(), key.clone()));
        }

        let response: ExplorerResponse =
            self.http.post(&self.api_url).form(&form).send().await?.error_for_status()?.json().await?;
        if response.result.contains("Pending in queue") {
            return Ok(VerificationStatus::Pending);
        }
        if response.status == "1" {
            Ok(VerificationStatus::Success)
        } else {
            debug!("verification failed: {}", response.result);
            Ok(VerificationStatus::Failed)
        }
    }

    /// Poll until the explorer reports a terminal status or `attempts` polls
    /// have gone by. A still-pending result after the last poll is reported
    /// as pending, not failed.
    pub async fn wait_for_verification(&self, guid: &str, attempts: u32, delay: Duration) -> VerificationStatus {
        for attempt in 1..=attempts {
            tokio::time::sleep(delay).await;
            match self.check(guid).await {
                Ok(VerificationStatus::Pending) => {
                    debug!("verification still pending (poll {}/{})", attempt, attempts);
                }
                Ok(status) => return status,
                Err(e) => {
                    warn!("verification status poll failed: {}", e);
                }
            }
        }
        VerificationStatus::Pending
    }
}
