//! agentplug-plugins
//!
//! Built-in functions offered to the chat model. Each plugin carries its own
//! [`FunctionDescriptor`](agentplug_core::types::FunctionDescriptor) and
//! implements [`FunctionHandler`](agentplug_core::traits::FunctionHandler);
//! [`register_builtin`] wires them into a registry at startup.
use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};

use agentplug_core::config::{AppConfig, DisplayZone};
use agentplug_core::traits::{Embedder, VectorIndex};
use agentplug_core::FunctionRegistry;

pub mod contoso;
pub mod datetime;
pub mod geo;
pub mod weather;

pub use contoso::{ContosoSearch, RetrievalError};
pub use datetime::DateTimePlugin;
pub use geo::GeoPlugin;
pub use weather::WeatherPlugin;

/// Register every built-in plugin.
pub fn register_builtin(
    registry: &mut FunctionRegistry,
    app: &AppConfig,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
) -> anyhow::Result<()> {
    registry.register(DateTimePlugin::descriptor(), Arc::new(DateTimePlugin::new(app.display_zone.clone())))?;
    registry.register(WeatherPlugin::descriptor(), Arc::new(WeatherPlugin::new(&app.weather, app.display_zone.clone())?))?;
    registry.register(GeoPlugin::descriptor(), Arc::new(GeoPlugin::new(&app.geo)?))?;
    registry.register(ContosoSearch::descriptor(), Arc::new(ContosoSearch::new(embedder, index)))?;
    Ok(())
}

/// Offset for a display zone; out-of-range offsets fall back to UTC.
pub(crate) fn zone_offset(zone: &DisplayZone) -> FixedOffset {
    FixedOffset::east_opt(zone.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
}
