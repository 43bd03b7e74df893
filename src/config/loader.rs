//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::calendar::HolidayRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{ShiftType, ShiftTypeId};

use super::types::{ChangeReasonsConfig, EngineConfig, EngineSettings, ShiftTypesConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/worktrack/
/// ├── engine.yaml          # Standard hours, night window, calendar range
/// ├── holidays.yaml        # Fixed-date and Easter-relative holidays
/// ├── shift_types.yaml     # Shift type reference data
/// └── change_reasons.yaml  # Change reason reference data
/// ```
///
/// # Example
///
/// ```no_run
/// use worktrack_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/worktrack").unwrap();
/// println!("Standard day: {}h", loader.config().standard_hours_per_day());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The parsed configuration is inconsistent
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let holidays = Self::load_yaml::<HolidayRules>(&path.join("holidays.yaml"))?;
        let shift_types = Self::load_yaml::<ShiftTypesConfig>(&path.join("shift_types.yaml"))?;
        let change_reasons =
            Self::load_yaml::<ChangeReasonsConfig>(&path.join("change_reasons.yaml"))?;

        let config = EngineConfig::new(
            settings,
            holidays,
            shift_types.shift_types,
            change_reasons.change_reasons,
        )?;

        debug!(
            path = %path.display(),
            shift_types = config.shift_types().len(),
            "Loaded engine configuration"
        );

        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    /// Gets a shift type by its id.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use worktrack_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/worktrack")?;
    /// let night = loader.get_shift_type(20)?;
    /// println!("Shift type: {}", night.name);
    /// # Ok::<(), worktrack_engine::error::EngineError>(())
    /// ```
    pub fn get_shift_type(&self, id: ShiftTypeId) -> EngineResult<&ShiftType> {
        self.config.shift_type(id)
    }
}
