//! Boot configuration
//!
//! The configuration is `pump.toml`, embedded at build time and already
//! checked by `build.rs`. It is parsed again here with the core's no_std
//! parser and validated before the controller is built.

use defmt::*;

use cardiopulse_core::config::{parse_config, MachineConfig};

/// Embedded configuration (compiled into firmware)
/// Edit pump.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../pump.toml");

/// Parse and validate the embedded configuration
///
/// Falls back to the built-in defaults if either step fails.
pub fn load_config() -> MachineConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse pump.toml: {:?}", e);
            warn!("Using built-in default configuration");
            return MachineConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("Invalid pump.toml: {:?}", e);
            warn!("Using built-in default configuration");
            MachineConfig::default()
        }
    }
}
