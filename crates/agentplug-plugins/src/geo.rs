//! Place name to coordinates via the open-meteo geocoding API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use agentplug_core::config::GeoConfig;
use agentplug_core::parse_args;
use agentplug_core::traits::FunctionHandler;
use agentplug_core::types::FunctionDescriptor;

pub const FUNCTION_NAME: &str = "get_geo_coordinates";

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoding service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed geocoding response: {0}")]
    Malformed(String),

    #[error("no coordinates found for '{0}'")]
    NotFound(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeoLocation>,
}

#[derive(Deserialize)]
struct GeoArgs {
    location: String,
}

pub struct GeoPlugin {
    client: reqwest::Client,
    base_url: String,
}

impl GeoPlugin {
    pub fn new(config: &GeoConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    pub async fn lookup(&self, location: &str) -> Result<GeoLocation, GeoError> {
        let response = self
            .client
            .get(format!("{}/v1/search", self.base_url))
            .query(&[("name", location), ("count", "1"), ("format", "json")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeoError::Status { status: status.as_u16(), body });
        }
        let body = response.text().await?;
        let parsed: GeocodingResponse = serde_json::from_str(&body).map_err(|e| GeoError::Malformed(e.to_string()))?;
        parsed.results.into_iter().next().ok_or_else(|| GeoError::NotFound(location.to_string()))
    }

    pub fn descriptor() -> FunctionDescriptor {
        FunctionDescriptor::new(
            FUNCTION_NAME,
            "Get the latitude and longitude of a city or place name",
            json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string", "description": "city or place name" }
                },
                "required": ["location"]
            }),
        )
        .with_returns("Returns the matched place name, country, latitude and longitude")
    }
}

#[async_trait]
impl FunctionHandler for GeoPlugin {
    async fn invoke(&self, args: Value) -> anyhow::Result<Value> {
        let args: GeoArgs = parse_args(FUNCTION_NAME, args)?;
        let location = self.lookup(&args.location).await?;
        Ok(serde_json::to_value(location)?)
    }
}
