use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optimization presets; individual flags can still be overridden
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptimizationLevel {
    #[default]
    #[serde(rename = "0")]
    O0,
    #[serde(rename = "1")]
    O1,
    #[serde(rename = "2")]
    O2,
    #[serde(rename = "3")]
    O3,
}

impl OptimizationLevel {
    pub fn parse(level: &str) -> Option<Self> {
        match level.trim_start_matches(['O', 'o']) {
            "0" => Some(OptimizationLevel::O0),
            "1" => Some(OptimizationLevel::O1),
            "2" => Some(OptimizationLevel::O2),
            "3" => Some(OptimizationLevel::O3),
            _ => None,
        }
    }
}

/// Options recognized by the analyzer passes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    /// Alias resolved placeholder reads into locals and check filter staleness
    pub cache_resolved_placeholders: bool,

    /// Collect warnings in the report instead of discarding them
    pub enable_warnings: bool,

    /// Abort analysis on the first warning
    pub warnings_as_errors: bool,

    /// Reject placeholder reads that are neither global nor definitely assigned
    pub static_analysis: bool,

    /// Lower reads of definitely assigned variables to direct local access
    pub directly_access_defined_variables: bool,

    /// Move aliases computed identically in both branches above the conditional
    pub hoist_conditional_aliases: bool,

    /// Also cache the filtered value of aliased placeholders
    pub cache_filtered_placeholders: bool,
}

impl AnalyzerOptions {
    pub fn for_level(level: OptimizationLevel) -> Self {
        let mut options = AnalyzerOptions::default();
        if level >= OptimizationLevel::O1 {
            options.directly_access_defined_variables = true;
        }
        if level >= OptimizationLevel::O2 {
            options.cache_resolved_placeholders = true;
        }
        if level >= OptimizationLevel::O3 {
            options.cache_filtered_placeholders = true;
            options.hoist_conditional_aliases = true;
        }
        options
    }

    /// Load options from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Write the options for `level` to `path` as YAML
    pub fn init_file(path: &Path, level: OptimizationLevel) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(&AnalyzerOptions::for_level(level))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn apply(&mut self, overrides: &OptionOverrides) {
        let fields = [
            (&mut self.cache_resolved_placeholders, overrides.cache_resolved_placeholders),
            (&mut self.enable_warnings, overrides.enable_warnings),
            (&mut self.warnings_as_errors, overrides.warnings_as_errors),
            (&mut self.static_analysis, overrides.static_analysis),
            (
                &mut self.directly_access_defined_variables,
                overrides.directly_access_defined_variables,
            ),
            (&mut self.hoist_conditional_aliases, overrides.hoist_conditional_aliases),
            (&mut self.cache_filtered_placeholders, overrides.cache_filtered_placeholders),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                *field = value;
            }
        }
    }

    /// Filter caching needs a resolved alias to key on
    pub fn caches_filters(&self) -> bool {
        self.cache_resolved_placeholders && self.cache_filtered_placeholders
    }
}

/// Per-flag overrides layered on top of file or preset options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionOverrides {
    pub cache_resolved_placeholders: Option<bool>,
    pub enable_warnings: Option<bool>,
    pub warnings_as_errors: Option<bool>,
    pub static_analysis: Option<bool>,
    pub directly_access_defined_variables: Option<bool>,
    pub hoist_conditional_aliases: Option<bool>,
    pub cache_filtered_placeholders: Option<bool>,
}
