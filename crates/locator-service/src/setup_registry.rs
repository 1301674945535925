//! Registry of setup modules available to the locator binary.
//!
//! Configuration names modules by string; this registry maps those names to
//! the factories of the modules compiled into the binary.

use crate::modules;
use locator_core::SetupFactory;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Global registry of setup module factories.
pub struct SetupModuleRegistry {
	pub setups: HashMap<String, SetupFactory>,
}

impl SetupModuleRegistry {
	/// Create a new empty registry
	pub fn new() -> Self {
		Self {
			setups: HashMap::new(),
		}
	}

	/// Register a setup module
	pub fn register_setup(&mut self, name: impl Into<String>, factory: SetupFactory) {
		self.setups.insert(name.into(), factory);
	}
}

impl Default for SetupModuleRegistry {
	fn default() -> Self {
		Self::new()
	}
}

// Global registry instance
static REGISTRY: OnceLock<SetupModuleRegistry> = OnceLock::new();

/// Initialize the global registry with all available setup modules
pub fn initialize_registry() -> &'static SetupModuleRegistry {
	REGISTRY.get_or_init(|| {
		let mut registry = SetupModuleRegistry::new();

		for (name, factory) in modules::get_all_implementations() {
			tracing::debug!("Registering setup module: {}", name);
			registry.register_setup(name, factory);
		}

		registry
	})
}

/// Get the global setup module registry
pub fn get_registry() -> &'static SetupModuleRegistry {
	initialize_registry()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_registry_contains_builtin_modules() {
		let registry = get_registry();
		assert!(registry.setups.contains_key("servers"));
	}

	#[test]
	fn test_registry_is_initialized_once() {
		let first = get_registry() as *const SetupModuleRegistry;
		let second = initialize_registry() as *const SetupModuleRegistry;
		assert_eq!(first, second);
	}
}
