use anyhow::Result;
use reqwest::Client;
use wsfl_models::{ErrorShape, HealthReport};

pub struct ServiceClient {
    client: Client,
    base_url: String,
}

impl ServiceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn index(&self) -> Result<String> {
        let response = self.client.get(&self.base_url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Index request failed with status {}", response.status());
        }

        Ok(response.text().await?)
    }

    pub async fn healthz(&self) -> Result<HealthReport> {
        let response = self
            .client
            .get(format!("{}/healthz", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Health check failed: {}", error_text);
        }

        Ok(response.json().await?)
    }

    pub async fn metrics(&self) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/metrics", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Metrics request failed with status {}", response.status());
        }

        Ok(response.text().await?)
    }

    /// GETs a path expected to fail and returns its status and error body.
    pub async fn get_error(&self, path: &str) -> Result<(u16, ErrorShape)> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;

        let status = response.status().as_u16();
        Ok((status, response.json().await?))
    }
}
