//! Vendor directory client
//!
//! Looks up seller profiles (GMV tier) from the vendor directory service.
//! The directory is an opaque collaborator: unknown vendors and transport
//! failures both resolve to the Bronze default so ticket intake never
//! blocks on it.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use shared::{GmvTier, Vendor};

use crate::config::VendorDirectoryConfig;

/// Vendor directory API client
#[derive(Clone)]
pub struct VendorDirectoryClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// Directory response for a vendor profile lookup
#[derive(Debug, Deserialize)]
struct VendorProfileResponse {
    handle: String,
    gmv_tier: String,
}

impl VendorDirectoryClient {
    /// Create a client from configuration
    pub fn new(config: &VendorDirectoryConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Fetch a vendor's profile. Returns the Bronze-tier default when the
    /// vendor is unknown or the directory is unreachable.
    pub async fn get_vendor(&self, handle: &str) -> Vendor {
        match self.fetch_profile(handle).await {
            Ok(Some(profile)) => Vendor {
                handle: profile.handle,
                gmv_tier: GmvTier::parse(&profile.gmv_tier),
            },
            Ok(None) => {
                tracing::debug!("Vendor {} not in directory, defaulting to bronze", handle);
                Vendor {
                    handle: handle.to_string(),
                    gmv_tier: GmvTier::Bronze,
                }
            }
            Err(e) => {
                tracing::warn!("Vendor directory lookup failed for {}: {}", handle, e);
                Vendor {
                    handle: handle.to_string(),
                    gmv_tier: GmvTier::Bronze,
                }
            }
        }
    }

    async fn fetch_profile(
        &self,
        handle: &str,
    ) -> Result<Option<VendorProfileResponse>, reqwest::Error> {
        let url = format!("{}/v1/vendors/{}", self.base_url, handle);

        let response = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let profile = response.error_for_status()?.json().await?;
        Ok(Some(profile))
    }
}
