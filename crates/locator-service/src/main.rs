//! Main entry point for the locator service.
//!
//! This binary bootstraps a dependency locator from a configuration file.
//! Configured setup modules are looked up in the built-in setup registry and
//! applied in order; the resulting registrations are printed and, on
//! request, resolved.

use clap::Parser;
use locator_config::Config;
use locator_core::{DependencyConfigurator, DependencyLoader, DependencyLocator, DependencyProvider};
use locator_types::TypeTable;
use std::path::PathBuf;
use std::sync::Arc;

mod modules;
mod report;
mod setup_registry;

/// Command-line arguments for the locator service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Type to build after loading, e.g. `IServer` or `IRepository<String>`
	#[arg(short, long)]
	resolve: Vec<String>,

	/// Scope key to resolve under instead of the configured default key
	#[arg(short, long)]
	key: Option<String>,
}

/// Main entry point for the locator service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Applies the configured setup modules to a fresh locator
/// 5. Prints the registrations and resolves the requested types
fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	// Create env filter with default from args
	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started locator");

	// Load configuration
	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Invalid configuration path: {}", args.config.display()))?;
	let config = Config::from_file(config_path)?;
	tracing::info!(
		default_key = %config.locator.default_key,
		modules = config.dependencies.len(),
		"Loaded configuration"
	);

	let table = Arc::new(TypeTable::new());
	let locator = bootstrap(config, &table)?;

	print!("{}", report::render_snapshot(&locator.snapshot()));

	let key = args.key.unwrap_or_else(|| locator.default_key());
	let mut failures = 0;
	for name in &args.resolve {
		match resolve(&locator, &table, name, &key) {
			Ok(concrete) => println!("{} [{}] -> {}", name, key, concrete),
			Err(e) => {
				failures += 1;
				println!("{} [{}] failed: {}", name, key, e);
			},
		}
	}

	locator.release_all();
	tracing::info!("Stopped locator");

	if failures > 0 {
		return Err(format!("{} of {} types failed to resolve", failures, args.resolve.len()).into());
	}
	Ok(())
}

/// Builds a locator and applies every configured setup module to it.
fn bootstrap(
	config: Config,
	table: &Arc<TypeTable>,
) -> Result<DependencyLocator, Box<dyn std::error::Error>> {
	let registry = setup_registry::get_registry();
	let locator = DependencyLocator::new(table.clone());

	let loaded = DependencyLoader::new(config).load(&locator, table, &registry.setups)?;
	tracing::info!(modules = loaded, "Bootstrapped locator");
	Ok(locator)
}

/// Builds `name` under `key` with no arguments and returns the concrete type name.
fn resolve(
	locator: &DependencyLocator,
	table: &TypeTable,
	name: &str,
	key: &str,
) -> Result<String, Box<dyn std::error::Error>> {
	let ty = report::parse_type_name(table, name)?;
	let instance = locator.create_named(&ty, key, &[])?;
	Ok(instance.type_descriptor().to_string())
}

#[cfg(test)]
mod tests {
	use super::*;
	use locator_config::builders::config::ConfigBuilder;
	use std::fs;
	use tempfile::TempDir;

	#[test]
	fn test_args_parsing() {
		let args = Args::parse_from([
			"locator",
			"--config",
			"locator.toml",
			"--resolve",
			"IServer",
			"--resolve",
			"IRepository<String>",
		]);
		assert_eq!(args.config, PathBuf::from("locator.toml"));
		assert_eq!(args.log_level, "info");
		assert_eq!(args.resolve, vec!["IServer", "IRepository<String>"]);
		assert!(args.key.is_none());
	}

	#[test]
	fn test_bootstrap_and_resolve() {
		let config = ConfigBuilder::new()
			.default_key("main".to_string())
			.dependency("servers", None)
			.dependency("servers", Some("east"))
			.build();
		let table = Arc::new(TypeTable::new());
		let locator = bootstrap(config, &table).unwrap();

		assert_eq!(locator.default_key(), "main");
		assert_eq!(
			resolve(&locator, &table, "IServer", "main").unwrap(),
			"ConcreteServer"
		);
		assert_eq!(
			resolve(&locator, &table, "IRepository<String>", "east.main").unwrap(),
			"MemoryRepository<String>"
		);
		assert!(resolve(&locator, &table, "IServer", "west.main").is_err());
		assert!(resolve(&locator, &table, "Unknown", "main").is_err());
	}

	#[test]
	fn test_bootstrap_rejects_unknown_module() {
		let config = ConfigBuilder::new().dependency("clients", None).build();
		let table = Arc::new(TypeTable::new());

		let err = bootstrap(config, &table).err().unwrap();
		assert!(err.to_string().contains("Unknown setup module 'clients'"));
		assert!(err.to_string().contains("servers"));
	}

	#[test]
	fn test_bootstrap_from_file() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("locator.toml");
		fs::write(
			&config_path,
			"[locator]\ndefault_key = \"main\"\n\n[[dependencies]]\nmodule = \"servers\"\n",
		)
		.unwrap();

		let config = Config::from_file(config_path.to_str().unwrap()).unwrap();
		let table = Arc::new(TypeTable::new());
		let locator = bootstrap(config, &table).unwrap();

		let rendered = report::render_snapshot(&locator.snapshot());
		assert!(rendered.starts_with("[main]\n"));
	}
}
