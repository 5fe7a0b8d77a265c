//! Explicit function registry.
//!
//! Functions are registered at startup as `(descriptor, handler)` pairs keyed
//! by name. The chat layer reads the descriptors to advertise tools and calls
//! [`FunctionRegistry::invoke`] when the model selects one.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::ToolError;
use crate::traits::FunctionHandler;
use crate::types::FunctionDescriptor;

#[derive(Clone)]
struct RegisteredFunction {
    descriptor: FunctionDescriptor,
    handler: Arc<dyn FunctionHandler>,
}

#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, RegisteredFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register(&mut self, descriptor: FunctionDescriptor, handler: Arc<dyn FunctionHandler>) -> Result<(), ToolError> {
        if self.functions.contains_key(&descriptor.name) {
            return Err(ToolError::Duplicate(descriptor.name));
        }
        debug!(function = %descriptor.name, "registered function");
        self.functions.insert(descriptor.name.clone(), RegisteredFunction { descriptor, handler });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool { self.functions.contains_key(name) }

    pub fn descriptor(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name).map(|f| &f.descriptor)
    }

    /// Descriptors in name order.
    pub fn descriptors(&self) -> Vec<&FunctionDescriptor> {
        self.functions.values().map(|f| &f.descriptor).collect()
    }

    pub fn len(&self) -> usize { self.functions.len() }

    pub fn is_empty(&self) -> bool { self.functions.is_empty() }

    /// Invoke a function by name. Handler errors are returned as-is.
    pub async fn invoke(&self, name: &str, args: Value) -> anyhow::Result<Value> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| ToolError::UnknownFunction(name.to_string()))?;
        debug!(function = name, "invoking function");
        function.handler.invoke(args).await
    }
}

/// Decode a handler's argument object. `null` is treated as `{}`.
pub fn parse_args<T: DeserializeOwned>(function: &str, args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() { Value::Object(serde_json::Map::new()) } else { args };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        function: function.to_string(),
        reason: e.to_string(),
    })
}
