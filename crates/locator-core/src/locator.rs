//! The resolution orchestrator.
//!
//! [`DependencyLocator`] owns the scoped registries of constructor sets and
//! generic bindings, the cache of materialized closed generics, and the
//! singleton and configuration stores. Each collection is its own lock
//! domain. Locks are always taken in the order constructors, generic cache,
//! bindings, singletons, config. Factories, suppliers and constructor
//! generators run with no registry lock held so they may call back into the
//! locator.

use crate::slot::Slot;
use crate::snapshot::{BindingRegistration, RegistrySnapshot, SingletonRegistration, TypeRegistration};
use crate::{
	ConstructorSet, DependencyConfigurator, DependencyProvider, GenericBinding, LocatorError,
	Provision,
};
use locator_types::{argument_types, AnyValue, Instance, TypeDescriptor, TypeIntrospector};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Scope key used when neither the caller nor the configuration names one.
pub const DEFAULT_KEY: &str = "default";

/// A type registered under a scope key.
type Scoped = (TypeDescriptor, String);

/// A closed generic bound under one key, materialized on first use.
struct Materialization {
	binding: GenericBinding,
	set: OnceCell<Arc<ConstructorSet>>,
}

/// Service locator resolving abstract types to instances by scope key.
pub struct DependencyLocator {
	introspector: Arc<dyn TypeIntrospector>,
	default_key: RwLock<Option<String>>,
	constructors: RwLock<HashMap<Scoped, Arc<ConstructorSet>>>,
	generic_cache: RwLock<HashMap<Scoped, Arc<Materialization>>>,
	/// Keyed by abstract template.
	bindings: RwLock<HashMap<Scoped, GenericBinding>>,
	singletons: RwLock<HashMap<Scoped, Arc<Slot<Instance>>>>,
	config: RwLock<HashMap<String, Arc<Slot<AnyValue>>>>,
}

impl DependencyLocator {
	/// Creates an empty locator backed by `introspector`.
	pub fn new(introspector: Arc<dyn TypeIntrospector>) -> Self {
		Self {
			introspector,
			default_key: RwLock::new(None),
			constructors: RwLock::new(HashMap::new()),
			generic_cache: RwLock::new(HashMap::new()),
			bindings: RwLock::new(HashMap::new()),
			singletons: RwLock::new(HashMap::new()),
			config: RwLock::new(HashMap::new()),
		}
	}

	pub fn introspector(&self) -> &Arc<dyn TypeIntrospector> {
		&self.introspector
	}

	fn scope_key(&self, key: Option<&str>) -> String {
		match key {
			Some(key) => key.to_string(),
			None => self.default_key(),
		}
	}

	/// Reads a configuration value as a `T`.
	pub fn get_config_as<T: Any + Send + Sync>(&self, key: &str) -> Result<Arc<T>, LocatorError> {
		self.get_config(key)?
			.downcast::<T>()
			.map_err(|_| LocatorError::TypeMismatch {
				key: key.to_string(),
				expected: std::any::type_name::<T>().to_string(),
			})
	}

	/// Captures every registration, taking all read locks at once.
	pub fn snapshot(&self) -> RegistrySnapshot {
		let constructors = self.constructors.read();
		let cache = self.generic_cache.read();
		let bindings = self.bindings.read();
		let singletons = self.singletons.read();
		let config = self.config.read();

		let mut snapshot = RegistrySnapshot::default();
		for ((_, key), set) in constructors.iter() {
			snapshot.scope_mut(key).types.push(registration(set));
		}
		for ((_, key), entry) in cache.iter() {
			if let Some(set) = entry.set.get() {
				snapshot.scope_mut(key).materialized.push(registration(set));
			}
		}
		for ((_, key), binding) in bindings.iter() {
			snapshot.scope_mut(key).bindings.push(BindingRegistration {
				abstract_template: binding.abstract_template().clone(),
				concrete_template: binding.concrete_template().clone(),
			});
		}
		for ((ty, key), slot) in singletons.iter() {
			snapshot.scope_mut(key).singletons.push(SingletonRegistration {
				abstract_type: ty.clone(),
				evaluated: slot.is_evaluated(),
			});
		}
		snapshot.config_keys = config.keys().cloned().collect();
		snapshot.sort();
		snapshot
	}

	/// Finds the constructor set serving `(abstract_type, key)`.
	///
	/// Concrete registrations win over cached generic instantiations, which
	/// win over materializing a generic binding. Each closed type gets one
	/// cache entry per key whose cell is filled at most once; materialization
	/// runs on that cell with no registry lock held.
	fn constructor_set(
		&self,
		abstract_type: &TypeDescriptor,
		key: &str,
	) -> Result<Arc<ConstructorSet>, LocatorError> {
		let scoped = (abstract_type.clone(), key.to_string());

		if let Some(set) = self.constructors.read().get(&scoped) {
			return Ok(set.clone());
		}

		let Some(template) = abstract_type.template() else {
			return Err(LocatorError::not_registered(abstract_type, key));
		};

		let cached = self.generic_cache.read().get(&scoped).cloned();
		let entry = match cached {
			Some(entry) => entry,
			None => {
				let mut cache = self.generic_cache.write();
				match cache.get(&scoped) {
					Some(entry) => entry.clone(),
					None => {
						let binding = self
							.bindings
							.read()
							.get(&(template.clone(), key.to_string()))
							.filter(|binding| binding.can_satisfy(abstract_type))
							.cloned()
							.ok_or_else(|| LocatorError::not_registered(abstract_type, key))?;
						let entry = Arc::new(Materialization {
							binding,
							set: OnceCell::new(),
						});
						cache.insert(scoped, entry.clone());
						entry
					},
				}
			},
		};

		if let Some(set) = entry.set.get() {
			tracing::trace!(ty = %abstract_type, key = %key, "Generic cache hit");
			return Ok(set.clone());
		}

		let set = entry.set.get_or_try_init(|| {
			let set = entry
				.binding
				.materialize(abstract_type, self.introspector.as_ref())?;
			tracing::debug!(ty = %abstract_type, key = %key, "Cached generic instantiation");
			Ok::<_, LocatorError>(Arc::new(set))
		})?;
		Ok(set.clone())
	}

	fn register_generic(
		&self,
		concrete_template: &TypeDescriptor,
		abstract_template: &TypeDescriptor,
		key: String,
	) -> Result<(), LocatorError> {
		let binding = GenericBinding::new(abstract_template, concrete_template)?;

		let mut cache = self.generic_cache.write();
		let mut bindings = self.bindings.write();

		// Instantiations cached from a previous binding would shadow the new one.
		cache.retain(|(ty, scope), _| !(scope == &key && ty.is_closed_instance_of(abstract_template)));

		if let Some(previous) = bindings.insert((abstract_template.clone(), key.clone()), binding) {
			tracing::warn!(
				abstract_template = %abstract_template,
				previous = %previous.concrete_template(),
				key = %key,
				"Replaced generic binding"
			);
		}
		tracing::debug!(
			abstract_template = %abstract_template,
			concrete_template = %concrete_template,
			key = %key,
			"Registered generic binding"
		);
		Ok(())
	}
}

fn registration(set: &ConstructorSet) -> TypeRegistration {
	TypeRegistration {
		abstract_type: set.abstract_type().clone(),
		concrete_type: set.concrete_type().clone(),
		signatures: set.signatures().cloned().collect(),
	}
}

impl DependencyConfigurator for DependencyLocator {
	fn register_type(
		&self,
		concrete_type: &TypeDescriptor,
		abstract_type: &TypeDescriptor,
		key: Option<&str>,
	) -> Result<(), LocatorError> {
		let key = self.scope_key(key);
		if concrete_type.is_template() {
			return self.register_generic(concrete_type, abstract_type, key);
		}

		let set = ConstructorSet::build(abstract_type, concrete_type, self.introspector.as_ref())?;
		let previous = self
			.constructors
			.write()
			.insert((abstract_type.clone(), key.clone()), Arc::new(set));

		if let Some(previous) = previous {
			tracing::warn!(
				abstract_type = %abstract_type,
				previous = %previous.concrete_type(),
				key = %key,
				"Replaced concrete registration"
			);
		}
		tracing::debug!(
			abstract_type = %abstract_type,
			concrete_type = %concrete_type,
			key = %key,
			"Registered type"
		);
		Ok(())
	}

	fn register_singleton(
		&self,
		abstract_type: &TypeDescriptor,
		provision: Provision<Instance>,
		key: Option<&str>,
	) -> Result<(), LocatorError> {
		let key = self.scope_key(key);
		if let Provision::Value(instance) = &provision {
			let actual = instance.type_descriptor();
			if !self.introspector.is_assignable(abstract_type, actual) {
				return Err(LocatorError::invalid_binding(
					actual,
					abstract_type,
					"singleton does not implement the abstract type",
				));
			}
		}

		let mut singletons = self.singletons.write();
		let scoped = (abstract_type.clone(), key);
		if singletons.contains_key(&scoped) {
			return Err(LocatorError::DuplicateSingleton {
				ty: abstract_type.to_string(),
				key: scoped.1,
			});
		}
		tracing::debug!(abstract_type = %abstract_type, key = %scoped.1, "Registered singleton");
		singletons.insert(scoped, Arc::new(Slot::new(provision)));
		Ok(())
	}

	fn set_config(&self, key: &str, provision: Provision<AnyValue>) -> Result<(), LocatorError> {
		let mut config = self.config.write();
		if config.contains_key(key) {
			return Err(LocatorError::DuplicateConfigKey(key.to_string()));
		}
		config.insert(key.to_string(), Arc::new(Slot::new(provision)));
		tracing::debug!(key = %key, "Set configuration value");
		Ok(())
	}

	fn release_all(&self) {
		let mut constructors = self.constructors.write();
		let mut cache = self.generic_cache.write();
		let mut bindings = self.bindings.write();
		let mut singletons = self.singletons.write();
		let mut config = self.config.write();

		constructors.clear();
		cache.clear();
		bindings.clear();
		singletons.clear();
		config.clear();
		tracing::debug!("Released all registrations");
	}

	fn default_key(&self) -> String {
		self.default_key
			.read()
			.clone()
			.unwrap_or_else(|| DEFAULT_KEY.to_string())
	}

	fn set_default_key(&self, key: Option<String>) {
		*self.default_key.write() = key;
	}
}

impl DependencyProvider for DependencyLocator {
	fn create_named(
		&self,
		abstract_type: &TypeDescriptor,
		key: &str,
		args: &[Instance],
	) -> Result<Instance, LocatorError> {
		let arg_types = argument_types(args);
		let set = self.constructor_set(abstract_type, key)?;
		let constructor = set
			.resolve(&arg_types)
			.ok_or_else(|| LocatorError::constructor_not_found(abstract_type, key, &arg_types))?;

		constructor
			.invoke(args)
			.map_err(|source| LocatorError::invocation(constructor.owner(), source))
	}

	fn create(&self, abstract_type: &TypeDescriptor, args: &[Instance]) -> Result<Instance, LocatorError> {
		let key = self.default_key();
		self.create_named(abstract_type, &key, args)
	}

	fn get_singleton(
		&self,
		abstract_type: &TypeDescriptor,
		key: Option<&str>,
	) -> Result<Instance, LocatorError> {
		let key = self.scope_key(key);
		let slot = self
			.singletons
			.read()
			.get(&(abstract_type.clone(), key.clone()))
			.cloned()
			.ok_or_else(|| LocatorError::SingletonNotRegistered {
				ty: abstract_type.to_string(),
				key: key.clone(),
			})?;

		slot.get_or_try_init(|supplier| {
			let instance = supplier().map_err(|source| LocatorError::invocation(abstract_type, source))?;
			let actual = instance.type_descriptor();
			if !self.introspector.is_assignable(abstract_type, actual) {
				return Err(LocatorError::invalid_binding(
					actual,
					abstract_type,
					"lazily supplied singleton does not implement the abstract type",
				));
			}
			tracing::debug!(abstract_type = %abstract_type, key = %key, "Evaluated lazy singleton");
			Ok(instance)
		})
	}

	fn get_config(&self, key: &str) -> Result<AnyValue, LocatorError> {
		let slot = self
			.config
			.read()
			.get(key)
			.cloned()
			.ok_or_else(|| LocatorError::ConfigNotSet(key.to_string()))?;

		slot.get_or_try_init(|supplier| {
			supplier().map_err(|source| LocatorError::Invocation {
				ty: format!("configuration value '{}'", key),
				source,
			})
		})
	}
}
