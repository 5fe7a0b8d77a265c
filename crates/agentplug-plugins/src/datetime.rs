use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use agentplug_core::config::DisplayZone;
use agentplug_core::traits::FunctionHandler;
use agentplug_core::types::{empty_object_schema, FunctionDescriptor};

use crate::zone_offset;

pub const FUNCTION_NAME: &str = "get_current_datetime";

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct DateTimePlugin {
    zone: DisplayZone,
    clock: Clock,
}

impl DateTimePlugin {
    pub fn new(zone: DisplayZone) -> Self {
        Self::with_clock(zone, Arc::new(Utc::now))
    }

    pub fn with_clock(zone: DisplayZone, clock: Clock) -> Self {
        Self { zone, clock }
    }

    pub fn now(&self) -> Value {
        let utc = (self.clock)();
        let local = utc.with_timezone(&zone_offset(&self.zone));
        json!({
            "utc": utc.to_rfc3339(),
            "local": local.format("%Y-%m-%d %H:%M").to_string(),
            "weekday": local.format("%A").to_string(),
            "zone": self.zone.label,
        })
    }

    pub fn descriptor() -> FunctionDescriptor {
        FunctionDescriptor::new(FUNCTION_NAME, "Get the current date and time", empty_object_schema())
            .with_returns("Returns the current UTC timestamp and the local date, time and weekday")
    }
}

#[async_trait]
impl FunctionHandler for DateTimePlugin {
    async fn invoke(&self, _args: Value) -> anyhow::Result<Value> {
        Ok(self.now())
    }
}
