//! Configuration builder for creating test and development configurations.
//!
//! This module provides utilities for constructing Config instances with
//! sensible defaults, particularly useful for testing scenarios.

use crate::{Config, DependencyConfig, LocatorConfig};

/// Builder for creating `Config` instances with a fluent API.
///
/// The built configuration is not validated, so tests can exercise
/// configurations a file would be rejected for.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	default_key: String,
	dependencies: Vec<DependencyConfig>,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a new `ConfigBuilder` with the default scope key and no modules.
	pub fn new() -> Self {
		Self {
			default_key: LocatorConfig::default().default_key,
			dependencies: Vec::new(),
		}
	}

	/// Sets the default scope key.
	pub fn default_key(mut self, key: String) -> Self {
		self.default_key = key;
		self
	}

	/// Appends a setup module with an optional named-instance prefix.
	pub fn dependency(mut self, module: &str, prefix: Option<&str>) -> Self {
		self.dependencies.push(DependencyConfig {
			module: module.to_string(),
			prefix: prefix.map(str::to_string),
		});
		self
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		Config {
			locator: LocatorConfig {
				default_key: self.default_key,
			},
			dependencies: self.dependencies,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_defaults() {
		let config = ConfigBuilder::new().build();
		assert_eq!(config.locator.default_key, "default");
		assert!(config.dependencies.is_empty());
	}

	#[test]
	fn test_builder_keeps_module_order() {
		let config = ConfigBuilder::new()
			.default_key("main".to_string())
			.dependency("servers", None)
			.dependency("servers", Some("east"))
			.build();

		assert_eq!(config.locator.default_key, "main");
		assert_eq!(config.dependencies[1].prefix.as_deref(), Some("east"));
	}
}
