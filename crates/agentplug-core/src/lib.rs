//! agentplug-core
//!
//! Shared configuration, error taxonomy, service traits and wire types for
//! the plugin-augmented chat agent, plus the explicit function registry.
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

pub use registry::{parse_args, FunctionRegistry};
