use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Path of the generation endpoint, relative to the backend root
pub const GENERATE_PATH: &str = "/api/generate-recipe";
pub const HEALTH_PATH: &str = "/health";

/// Model generation routinely takes over a minute on modest hardware.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    ingredients: &'a [String],
}

#[derive(Deserialize)]
struct GenerateResponse {
    recipe: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: String,
}

/// Body of `GET /health`. Every field is optional; a bare 200 is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackendHealth {
    pub status: Option<String>,
    pub model: Option<String>,
}

/// Body of `GET /`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackendInfo {
    pub message: Option<String>,
    pub model: Option<String>,
    pub status: Option<String>,
}

/// Accept either the backend root or the full generation endpoint URL.
pub fn normalize_backend_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix(GENERATE_PATH)
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: normalize_backend_url(base_url),
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: normalize_backend_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<BackendHealth> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        debug!(%url, "checking backend health");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Health check failed with status: {}", response.status()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    pub async fn is_available(&self) -> bool {
        match self.health().await {
            Ok(health) => {
                debug!(model = ?health.model, "backend is available");
                true
            }
            Err(e) => {
                warn!(base_url = %self.base_url, error = %e, "backend is unavailable");
                false
            }
        }
    }

    pub async fn info(&self) -> Result<BackendInfo> {
        let url = format!("{}/", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Backend info request failed with status: {}", response.status()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    pub async fn generate_recipe(&self, ingredients: &[String]) -> Result<String> {
        let url = format!("{}{}", self.base_url, GENERATE_PATH);
        debug!(%url, count = ingredients.len(), "requesting recipe");

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest { ingredients })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.detail)
                .unwrap_or(text);
            warn!(%status, %detail, "recipe request rejected");
            return Err(anyhow!("Recipe request failed with status {}: {}", status, detail));
        }

        let generated: GenerateResponse = response.json().await?;
        debug!(chars = generated.recipe.len(), "recipe received");
        Ok(generated.recipe)
    }
}
