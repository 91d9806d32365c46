use crate::core::CompanyDirectory;
use crate::domain::company::Company;
use crate::utils::error::{LookupError, SetupResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// HTTP client for the seller service, which owns company records and their managers.
#[derive(Debug, Clone)]
pub struct SellerServiceClient {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl SellerServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> SetupResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("loyalty-service/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, timeout))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            timeout,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn company_url(&self, company_id: i64) -> String {
        format!("{}/api/v1/companies/{}", self.base_url, company_id)
    }
}

#[async_trait]
impl CompanyDirectory for SellerServiceClient {
    async fn get_company(&self, company_id: i64) -> Result<Company, LookupError> {
        let url = self.company_url(company_id);
        tracing::debug!("Requesting company from seller service: {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;

        tracing::debug!("Seller service response status: {}", response.status());

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => return Err(LookupError::CompanyNotFound),
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(LookupError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                });
            }
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<Company>(&body).map_err(|e| LookupError::InvalidResponse {
            message: e.to_string(),
        })
    }
}
