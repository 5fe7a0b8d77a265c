//! Current weather from the open-meteo forecast API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use agentplug_core::config::{DisplayZone, WeatherConfig};
use agentplug_core::parse_args;
use agentplug_core::traits::FunctionHandler;
use agentplug_core::types::FunctionDescriptor;

use crate::zone_offset;

pub const FUNCTION_NAME: &str = "get_weather_forecast";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("weather service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed weather response: {0}")]
    Malformed(String),
}

pub struct WeatherPlugin {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
    zone: DisplayZone,
}

#[derive(Deserialize)]
struct WeatherArgs {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeather,
}

#[derive(Deserialize)]
struct CurrentWeather {
    time: String,
    temperature: Value,
    windspeed: Value,
    winddirection: Value,
    weathercode: Value,
}

impl WeatherPlugin {
    pub fn new(config: &WeatherConfig, zone: DisplayZone) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self::with_client(client, config, zone))
    }

    pub fn with_client(client: reqwest::Client, config: &WeatherConfig, zone: DisplayZone) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            zone,
        }
    }

    pub async fn forecast(&self, latitude: f64, longitude: f64) -> Result<String, WeatherError> {
        debug!(latitude, longitude, "fetching current weather");
        let response = self
            .client
            .get(format!("{}/v1/forecast", self.base_url))
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WeatherError::Status { status: status.as_u16(), body });
        }
        let body = response.text().await?;
        let parsed: ForecastResponse = serde_json::from_str(&body).map_err(|e| WeatherError::Malformed(e.to_string()))?;
        self.render(&parsed.current_weather)
    }

    fn render(&self, current: &CurrentWeather) -> Result<String, WeatherError> {
        let utc = parse_utc(&current.time)?;
        let local = utc.and_utc().with_timezone(&zone_offset(&self.zone));
        let code = value_text(&current.weathercode);
        Ok(format!(
            "At {} {}, weather: {}°C, {}, wind {} km/h from {}°.",
            local.format("%Y-%m-%d %H:%M"),
            self.zone.label,
            value_text(&current.temperature),
            describe_weather_code(&code),
            value_text(&current.windspeed),
            value_text(&current.winddirection),
        ))
    }

    pub fn descriptor() -> FunctionDescriptor {
        FunctionDescriptor::new(
            FUNCTION_NAME,
            "Get the current weather for a given latitude and longitude in the configured display time zone",
            json!({
                "type": "object",
                "properties": {
                    "latitude": { "type": "number", "description": "latitude in decimal degrees" },
                    "longitude": { "type": "number", "description": "longitude in decimal degrees" }
                },
                "required": ["latitude", "longitude"]
            }),
        )
        .with_returns("Returns formatted weather string including temperature, wind, and condition")
    }
}

fn parse_utc(raw: &str) -> Result<NaiveDateTime, WeatherError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| WeatherError::Malformed(format!("bad time '{raw}': {e}")))
}

/// Numbers keep their JSON text, strings lose their quotes.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// WMO weather interpretation code to a short description.
pub fn describe_weather_code(code: &str) -> &'static str {
    match code {
        "0" => "Clear sky",
        "1" => "Mainly clear",
        "2" => "Partly cloudy",
        "3" => "Overcast",
        "45" => "Fog",
        "48" => "Rime fog",
        "51" => "Light drizzle",
        "61" => "Light rain",
        "71" => "Light snow",
        _ => "Unknown condition",
    }
}

#[async_trait]
impl FunctionHandler for WeatherPlugin {
    async fn invoke(&self, args: Value) -> anyhow::Result<Value> {
        let args: WeatherArgs = parse_args(FUNCTION_NAME, args)?;
        let text = self.forecast(args.latitude, args.longitude).await?;
        Ok(Value::String(text))
    }
}
