//! Bootstrap boundary between configuration and the locator.
//!
//! A setup module is a named unit that registers types, singletons and
//! configuration values into a locator. The [`DependencyLoader`] reads the
//! list of modules from configuration, looks each one up in a registry of
//! factories and runs it against the locator's registration surface.

use crate::{DependencyConfigurator, LocatorError};
use locator_config::Config;
use locator_types::{ImplementationRegistry, TypeTable};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while bootstrapping a locator from configuration.
#[derive(Debug, Error)]
pub enum LoaderError {
	/// A configured module has no registered factory.
	#[error("Unknown setup module '{name}'. Available modules: {}", .available.join(", "))]
	UnknownModule { name: String, available: Vec<String> },
	/// A setup module failed to register its dependencies.
	#[error("Setup module '{module}' failed: {source}")]
	Setup {
		module: String,
		#[source]
		source: LocatorError,
	},
}

/// A unit of registrations applied to a locator.
pub trait DependencySetup: Send + Sync {
	/// Registers this module's dependencies.
	///
	/// `prefix` is the module's named-instance prefix including the trailing
	/// dot, or empty. `default_key` is the scope key configured for the run.
	fn setup_dependencies(
		&self,
		configurator: &dyn DependencyConfigurator,
		prefix: &str,
		default_key: &str,
	) -> Result<(), LocatorError>;
}

/// Builds a setup module. The table is where the module declares or finds
/// the types it registers.
pub type SetupFactory = fn(&TypeTable) -> Box<dyn DependencySetup>;

/// Registry trait for setup modules.
///
/// This trait extends the base ImplementationRegistry to specify that
/// setup modules must provide a SetupFactory.
pub trait SetupRegistry: ImplementationRegistry<Factory = SetupFactory> {}

/// Applies the setup modules listed in configuration to a locator.
pub struct DependencyLoader {
	config: Config,
}

impl DependencyLoader {
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Runs every configured module, in order, against `configurator`.
	///
	/// All module names are checked before anything is registered, so an
	/// unknown module leaves the locator untouched. Returns the number of
	/// modules applied.
	pub fn load(
		&self,
		configurator: &dyn DependencyConfigurator,
		table: &TypeTable,
		factories: &HashMap<String, SetupFactory>,
	) -> Result<usize, LoaderError> {
		let mut modules = Vec::with_capacity(self.config.dependencies.len());
		for entry in &self.config.dependencies {
			let factory = factories.get(&entry.module).ok_or_else(|| {
				let mut available: Vec<String> = factories.keys().cloned().collect();
				available.sort();
				LoaderError::UnknownModule {
					name: entry.module.clone(),
					available,
				}
			})?;
			modules.push((entry, *factory));
		}

		let default_key = self.config.locator.default_key.clone();
		configurator.set_default_key(Some(default_key.clone()));

		for (entry, factory) in &modules {
			let prefix = entry
				.prefix
				.as_deref()
				.map(|prefix| format!("{}.", prefix))
				.unwrap_or_default();

			let setup = factory(table);
			setup
				.setup_dependencies(configurator, &prefix, &default_key)
				.map_err(|source| LoaderError::Setup {
					module: entry.module.clone(),
					source,
				})?;
			tracing::info!(module = %entry.module, prefix = %prefix, "Loaded setup module");
		}

		Ok(modules.len())
	}
}
