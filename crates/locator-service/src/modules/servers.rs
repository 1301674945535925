//! Demo setup module registering a server and a generic repository.
//!
//! Registrations land under `<prefix><default_key>`, so the module can be
//! listed several times with different prefixes to create named instances.

use locator_core::{
	DependencyConfigurator, DependencySetup, LocatorError, Provision, SetupFactory, SetupRegistry,
};
use locator_types::{
	argument, AnyValue, ConstructorSpec, ImplementationRegistry, Instance, TypeDescriptor,
	TypeTable,
};
use std::sync::Arc;

/// Port used when a server is built without one.
pub const DEFAULT_PORT: u16 = 8080;

/// A configured server endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
	pub host: String,
	pub port: u16,
}

/// Placeholder repository produced for every closed `MemoryRepository<T>`.
#[derive(Debug)]
pub struct MemoryRepository {
	pub element_type: String,
	pub seed: Option<Instance>,
}

/// Descriptors this module registers.
pub struct ServerTypes {
	pub string: TypeDescriptor,
	pub iserver: TypeDescriptor,
	pub concrete_server: TypeDescriptor,
	pub irepository: TypeDescriptor,
	pub memory_repository: TypeDescriptor,
}

impl ServerTypes {
	/// Declares the module's types, reusing any already in `table`.
	pub fn declare(table: &TypeTable) -> Self {
		let string = table.find("String").unwrap_or_else(|| {
			let string = table.define("String").declare();
			table.register_value::<String>(&string);
			string
		});

		let iserver = table
			.find("IServer")
			.unwrap_or_else(|| table.define("IServer").abstract_type().declare());
		let concrete_server = table.find("ConcreteServer").unwrap_or_else(|| {
			table
				.define("ConcreteServer")
				.extends(&iserver)
				.constructor(vec![], |_| {
					Ok(Arc::new(Server {
						host: "localhost".to_string(),
						port: DEFAULT_PORT,
					}) as AnyValue)
				})
				.constructor(vec![string.clone()], |args| {
					let host = argument::<String>(args, 0)?;
					Ok(Arc::new(Server {
						host: host.as_ref().clone(),
						port: DEFAULT_PORT,
					}) as AnyValue)
				})
				.declare()
		});

		let irepository = table
			.find("IRepository")
			.unwrap_or_else(|| table.define_template("IRepository", 1).abstract_type().declare());
		let memory_repository = table.find("MemoryRepository").unwrap_or_else(|| {
			table
				.define_template("MemoryRepository", 1)
				.extends(&irepository)
				.generic_constructors(|args| {
					let Some(element) = args.first() else {
						return Vec::new();
					};
					let element_type = element.name().to_string();
					let seeded = element_type.clone();
					vec![
						ConstructorSpec::new(vec![], move |_| {
							Ok(Arc::new(MemoryRepository {
								element_type: element_type.clone(),
								seed: None,
							}) as AnyValue)
						}),
						ConstructorSpec::new(vec![element.clone()], move |args| {
							Ok(Arc::new(MemoryRepository {
								element_type: seeded.clone(),
								seed: args.first().cloned(),
							}) as AnyValue)
						}),
					]
				})
				.declare()
		});

		Self {
			string,
			iserver,
			concrete_server,
			irepository,
			memory_repository,
		}
	}
}

/// Setup registering the server types.
pub struct ServerSetup {
	types: ServerTypes,
}

impl ServerSetup {
	pub fn new(types: ServerTypes) -> Self {
		Self { types }
	}
}

impl DependencySetup for ServerSetup {
	fn setup_dependencies(
		&self,
		configurator: &dyn DependencyConfigurator,
		prefix: &str,
		default_key: &str,
	) -> Result<(), LocatorError> {
		let key = format!("{}{}", prefix, default_key);
		let types = &self.types;

		configurator.register_type(&types.concrete_server, &types.iserver, Some(&key))?;
		configurator.register_type(&types.memory_repository, &types.irepository, Some(&key))?;

		let host = if prefix.is_empty() {
			"localhost".to_string()
		} else {
			format!("{}localhost", prefix)
		};
		configurator.register_singleton(
			&types.iserver,
			Provision::lazy({
				let concrete = types.concrete_server.clone();
				move || {
					Ok(Instance::new(
						concrete.clone(),
						Server {
							host: host.clone(),
							port: DEFAULT_PORT,
						},
					))
				}
			}),
			Some(&key),
		)?;
		configurator.set_config(
			&format!("{}servers.port", prefix),
			Provision::value(Arc::new(DEFAULT_PORT) as AnyValue),
		)?;

		tracing::debug!(key = %key, "Registered server types");
		Ok(())
	}
}

/// Factory function to create the server setup module.
pub fn create_setup(table: &TypeTable) -> Box<dyn DependencySetup> {
	Box::new(ServerSetup::new(ServerTypes::declare(table)))
}

/// Registry for the server setup module.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "servers";
	type Factory = SetupFactory;

	fn factory() -> Self::Factory {
		create_setup
	}
}

impl SetupRegistry for Registry {}
