//! CLI command implementations.

pub mod analyze;
pub mod common;
pub mod flavors;
pub mod params;
pub mod presets;
pub mod process;
