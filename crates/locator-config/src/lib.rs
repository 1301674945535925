//! Configuration module for the dependency locator.
//!
//! This module describes which setup modules bootstrap a locator and under
//! which default scope key. Configuration is loaded from TOML files and
//! validated before use.
//!
//! ## Modular Configuration Support
//!
//! Configurations can be split into multiple files for better organization:
//! - Use `include = ["file1.toml", "file2.toml"]` to include other config files
//! - Each top-level section must be unique across all files, except
//!   `dependencies`, whose entries are appended in include order

mod loader;

#[cfg(any(test, feature = "testing"))]
pub mod builders;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Characters not allowed in scope keys, module names and prefixes.
const INVALID_CHARACTERS: &str = "~!@#$%^&*()[]{}/;'\"|\\";

/// Maximum length of the default scope key.
const MAX_KEY_LENGTH: usize = 60;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for bootstrapping a locator.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
	/// Locator-wide settings.
	#[serde(default)]
	pub locator: LocatorConfig,
	/// Setup modules to apply, in order.
	#[serde(default)]
	pub dependencies: Vec<DependencyConfig>,
}

/// Locator-wide settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocatorConfig {
	/// Scope key used when a registration or request names none.
	#[serde(default = "default_scope_key")]
	pub default_key: String,
}

impl Default for LocatorConfig {
	fn default() -> Self {
		Self {
			default_key: default_scope_key(),
		}
	}
}

/// Returns the default scope key.
fn default_scope_key() -> String {
	"default".to_string()
}

/// One setup module to apply to the locator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DependencyConfig {
	/// Name the module is registered under.
	pub module: String,
	/// Named-instance prefix handed to the module.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub prefix: Option<String>,
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input is limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let var_name = var_name.as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

/// Checks a configured name against the character rules.
fn validate_name(what: &str, value: &str, max_len: Option<usize>) -> Result<(), ConfigError> {
	if value.is_empty() {
		return Err(ConfigError::Validation(format!("{} cannot be empty", what)));
	}
	if let Some(max_len) = max_len {
		let len = value.chars().count();
		if len > max_len {
			return Err(ConfigError::Validation(format!(
				"{} '{}' is {} characters long (max: {})",
				what, value, len, max_len
			)));
		}
	}
	if let Some(invalid) = value.chars().find(|c| INVALID_CHARACTERS.contains(*c)) {
		return Err(ConfigError::Validation(format!(
			"{} '{}' contains invalid character '{}'",
			what, value, invalid
		)));
	}
	Ok(())
}

impl Config {
	/// Loads configuration from a file with environment variable resolution.
	///
	/// This method supports modular configuration through include directives:
	/// - `include = ["file1.toml", "file2.toml"]` - Include specific files
	///
	/// Each top-level section must be unique across all configuration files,
	/// except `dependencies`.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name)
	}

	/// Validates the configuration.
	///
	/// - The default key is 1 to 60 characters without invalid characters
	/// - Module names and prefixes are non-empty without invalid characters
	/// - No module is listed twice with the same prefix
	fn validate(&self) -> Result<(), ConfigError> {
		validate_name(
			"Default key",
			&self.locator.default_key,
			Some(MAX_KEY_LENGTH),
		)?;

		let mut seen = HashSet::new();
		for dependency in &self.dependencies {
			validate_name("Module name", &dependency.module, None)?;
			if let Some(prefix) = &dependency.prefix {
				validate_name("Prefix", prefix, None)?;
			}

			if !seen.insert((dependency.module.as_str(), dependency.prefix.as_deref())) {
				return Err(ConfigError::Validation(match &dependency.prefix {
					Some(prefix) => format!(
						"Module '{}' is listed more than once with prefix '{}'",
						dependency.module, prefix
					),
					None => format!(
						"Module '{}' is listed more than once without a prefix",
						dependency.module
					),
				}));
			}
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// This allows configuration to be parsed from TOML strings using the standard
/// string parsing interface. Environment variables are resolved and the
/// configuration is automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_env_var_resolution() {
		// Set up test environment variables
		std::env::set_var("TEST_LOCATOR_HOST", "localhost");
		std::env::set_var("TEST_LOCATOR_PORT", "5432");

		let input = "host = \"${TEST_LOCATOR_HOST}:${TEST_LOCATOR_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		// Clean up
		std::env::remove_var("TEST_LOCATOR_HOST");
		std::env::remove_var("TEST_LOCATOR_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_LOCATOR_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_LOCATOR_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_LOCATOR_VAR"));
	}

	#[test]
	fn test_empty_config_uses_defaults() {
		let config: Config = "".parse().unwrap();
		assert_eq!(config.locator.default_key, "default");
		assert!(config.dependencies.is_empty());
	}

	#[test]
	fn test_config_with_env_vars() {
		std::env::set_var("TEST_LOCATOR_KEY", "production");

		let config_str = r#"
[locator]
default_key = "${TEST_LOCATOR_KEY}"

[[dependencies]]
module = "servers"

[[dependencies]]
module = "servers"
prefix = "${TEST_LOCATOR_PREFIX:-backup}"
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.locator.default_key, "production");
		assert_eq!(config.dependencies.len(), 2);
		assert_eq!(config.dependencies[0].prefix, None);
		assert_eq!(config.dependencies[1].prefix.as_deref(), Some("backup"));

		// Clean up
		std::env::remove_var("TEST_LOCATOR_KEY");
	}

	#[test]
	fn test_default_key_rules() {
		let too_long = format!("[locator]\ndefault_key = \"{}\"\n", "k".repeat(61));
		let result = too_long.parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Validation(_))));

		let exact = format!("[locator]\ndefault_key = \"{}\"\n", "k".repeat(60));
		assert!(exact.parse::<Config>().is_ok());

		let empty = "[locator]\ndefault_key = \"\"\n".parse::<Config>();
		assert!(matches!(empty, Err(ConfigError::Validation(_))));

		let invalid = "[locator]\ndefault_key = \"main/east\"\n".parse::<Config>();
		let error_msg = invalid.unwrap_err().to_string();
		assert!(error_msg.contains("invalid character '/'"));
	}

	#[test]
	fn test_module_name_rules() {
		let config_str = r#"
[[dependencies]]
module = "servers;drop"
"#;
		let result = config_str.parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Validation(_))));

		let config_str = r#"
[[dependencies]]
module = "servers"
prefix = "east|west"
"#;
		let result = config_str.parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_duplicate_module_rejected() {
		let config_str = r#"
[[dependencies]]
module = "servers"
prefix = "east"

[[dependencies]]
module = "servers"
prefix = "east"
"#;
		let error_msg = config_str.parse::<Config>().unwrap_err().to_string();
		assert!(error_msg.contains("listed more than once with prefix 'east'"));

		let config_str = r#"
[[dependencies]]
module = "servers"

[[dependencies]]
module = "servers"
prefix = "east"
"#;
		assert!(config_str.parse::<Config>().is_ok());
	}

	#[test]
	fn test_missing_module_is_parse_error() {
		let config_str = r#"
[[dependencies]]
prefix = "east"
"#;
		let result = config_str.parse::<Config>();
		assert!(matches!(result, Err(ConfigError::Parse(_))));
	}
}
