//! Configuration loading and management for the engine.
//!
//! This module provides functionality to load the engine configuration from
//! YAML files: the standard working day, the night window, the calendar range,
//! holiday rules and the shift type / change reason reference data.
//!
//! # Example
//!
//! ```no_run
//! use worktrack_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/worktrack").unwrap();
//! println!("Shift types: {}", config.config().shift_types().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CalendarRange, ChangeReasonsConfig, EngineConfig, EngineSettings, NightWindow,
    ShiftTypesConfig,
};
