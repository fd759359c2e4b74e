/*
[INPUT]:  Mint requests (PKP and capacity credits)
[OUTPUT]: Confirmed mint results polled from the relay
[POS]:    HTTP layer - relay surface for key-management contract writes
[UPDATE]: When relay endpoints or the mint confirmation flow change
*/

use std::time::Duration;

use tracing::debug;

use crate::http::{NetworkClient, PkpAuthError, Result};
use crate::types::{
    MintCapacityResponse, MintPkpRequest, RateLimitConfig, RelayMintResponse, RelayMintStatus,
    RelayStatusResponse,
};

const MINT_POLL_INTERVAL: Duration = Duration::from_millis(500);
const MINT_POLL_ATTEMPTS: usize = 30;

impl NetworkClient {
    /// Submit a PKP mint transaction through the relay and poll until it
    /// confirms.
    ///
    /// POST {relay}/mint-next-and-add-auth-methods, then
    /// GET {relay}/auth/status/{requestId}
    pub async fn relay_mint_pkp(&self, request: &MintPkpRequest) -> Result<RelayStatusResponse> {
        let relay = self.config().relay_url.trim_end_matches('/').to_string();
        let url = format!("{relay}/mint-next-and-add-auth-methods");
        let accepted: RelayMintResponse =
            self.send_json(self.http().post(&url).json(request)).await?;
        debug!(request_id = %accepted.request_id, "mint transaction accepted by relay");

        let status_url = format!("{relay}/auth/status/{}", accepted.request_id);
        for attempt in 0..MINT_POLL_ATTEMPTS {
            let status: RelayStatusResponse =
                self.send_json(self.http().get(&status_url)).await?;
            match status.status {
                RelayMintStatus::Succeeded => return Ok(status),
                RelayMintStatus::Failed => {
                    return Err(PkpAuthError::InvalidResponse(format!(
                        "relay reported mint failure: {}",
                        status.error.unwrap_or_else(|| "unknown".to_string())
                    )));
                }
                RelayMintStatus::InProgress => {
                    debug!(attempt, "mint still in progress");
                    tokio::time::sleep(MINT_POLL_INTERVAL).await;
                }
            }
        }

        Err(PkpAuthError::Timeout {
            duration: (MINT_POLL_INTERVAL * MINT_POLL_ATTEMPTS as u32).as_secs(),
        })
    }

    /// Mint a rate-limited capacity credit through the relay.
    ///
    /// POST {relay}/mint-capacity-credits
    pub async fn relay_mint_capacity(&self, config: &RateLimitConfig) -> Result<String> {
        let relay = self.config().relay_url.trim_end_matches('/').to_string();
        let url = format!("{relay}/mint-capacity-credits");
        let response: MintCapacityResponse =
            self.send_json(self.http().post(&url).json(config)).await?;

        if response.capacity_token_id.is_empty() {
            return Err(PkpAuthError::InvalidResponse(
                "relay returned an empty capacity token id".to_string(),
            ));
        }
        Ok(response.capacity_token_id)
    }
}
