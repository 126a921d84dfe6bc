//! Unit tests for configuration loading and validation.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `field_resolution`: Environment fallbacks of individual settings
//! - `pipeline_config`: Conversion into the orchestrator's value object
//! - `loading`: End-to-end loading from arguments and environment

mod helpers;
mod loading;
mod pipeline_config;
