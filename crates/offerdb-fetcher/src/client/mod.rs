//! HTTP client for the promotional-offers `specials` endpoint.

use std::time::Duration;

use offerdb_core::RegionCode;
use reqwest::{Client, Url};

use crate::error::FetchError;
use crate::types::{OffersResponse, RawOffer};

/// Query parameter carrying the region code.
const REGION_QUERY_PARAM: &str = "zipCode";

/// HTTP client for the `specials` endpoint.
///
/// One `GET` per region, no retries. Non-2xx responses surface as
/// [`FetchError::Remote`] with the raw body attached.
#[derive(Debug, Clone)]
pub struct OffersClient {
    pub(super) client: Client,
    pub(super) endpoint: Url,
}

impl OffersClient {
    /// Creates an `OffersClient` with a per-request timeout and a fixed
    /// `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidEndpoint`] if `endpoint` is not an
    /// absolute http(s) URL, or [`FetchError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(endpoint: &str, user_agent: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let endpoint = Self::parse_endpoint(endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Fetches the current offers for one region.
    ///
    /// A 2xx body without an `Offers` key yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Remote`] for any non-2xx status.
    /// - [`FetchError::Http`] for network, TLS, or timeout failures.
    /// - [`FetchError::Deserialize`] if a 2xx body is not the expected JSON.
    pub async fn fetch_offers(&self, region: &RegionCode) -> Result<Vec<RawOffer>, FetchError> {
        let url = self.offers_url(region);
        tracing::debug!(region = %region, url = %url, "fetching offers");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Remote {
                region: region.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let parsed =
            serde_json::from_str::<OffersResponse>(&body).map_err(|e| FetchError::Deserialize {
                context: format!("offers for region {region}"),
                source: e,
            })?;

        tracing::debug!(region = %region, count = parsed.offers.len(), "offers fetched");
        Ok(parsed.offers)
    }

    /// Builds `{endpoint}?zipCode={region}`, keeping any query the endpoint
    /// already carries.
    pub(super) fn offers_url(&self, region: &RegionCode) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(REGION_QUERY_PARAM, region.as_str());
        url
    }

    fn parse_endpoint(endpoint: &str) -> Result<Url, FetchError> {
        let url = Url::parse(endpoint).map_err(|e| FetchError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidEndpoint {
                endpoint: endpoint.to_owned(),
                reason: format!("unsupported scheme \"{}\"", url.scheme()),
            });
        }
        Ok(url)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
