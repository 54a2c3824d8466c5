//! Driver for the TSL2591 ambient light sensor, plus the configuration used by the `tsl2591`
//! polling tool.
pub mod config;
pub mod tsl2591;
