//! Resolution engine for the dependency locator.
//!
//! Components register how abstract types are constructed, either by a
//! concrete implementation or by a parametric template implementation, and
//! callers later request instances, singletons or configuration values by
//! abstract type plus an optional scope key.
//!
//! The engine is split into:
//! - [`ConstructorSet`]: constructors of one concrete type indexed by signature
//! - [`GenericBinding`]: an abstract template bound to a concrete template
//! - [`DependencyLocator`]: scoped registries, the generic instantiation cache
//!   and the singleton and configuration stores
//! - [`setup`]: the boundary through which configured setup modules populate
//!   a locator

use locator_types::{AnyValue, Instance, TypeDescriptor};

pub mod constructors;
pub mod error;
pub mod generic;
pub mod locator;
pub mod setup;
pub mod slot;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod stubs;

pub use constructors::ConstructorSet;
pub use error::LocatorError;
pub use generic::GenericBinding;
pub use locator::{DependencyLocator, DEFAULT_KEY};
pub use setup::{DependencyLoader, DependencySetup, LoaderError, SetupFactory, SetupRegistry};
pub use slot::{Provision, Supplier};
pub use snapshot::{
	BindingRegistration, RegistrySnapshot, ScopeSnapshot, SingletonRegistration, TypeRegistration,
};

/// Registration surface of a locator.
///
/// This is everything a setup module sees: it can register types,
/// singletons and configuration values, clear the locator and read or change
/// the default scope key. A `None` key means the current default key.
pub trait DependencyConfigurator: Send + Sync {
	/// Binds `concrete_type` to `abstract_type` under `key`.
	///
	/// A parametric `concrete_type` creates or replaces a generic binding for
	/// the abstract template; any other type has its constructors indexed
	/// right away. Concrete and generic registrations for the same type
	/// coexist, with the concrete one taking priority on lookup.
	fn register_type(
		&self,
		concrete_type: &TypeDescriptor,
		abstract_type: &TypeDescriptor,
		key: Option<&str>,
	) -> Result<(), LocatorError>;

	/// Stores a singleton for `(abstract_type, key)`. Lazy provisions are
	/// evaluated on first access, not here.
	fn register_singleton(
		&self,
		abstract_type: &TypeDescriptor,
		provision: Provision<Instance>,
		key: Option<&str>,
	) -> Result<(), LocatorError>;

	/// Stores a configuration value. Keys can be set only once.
	fn set_config(&self, key: &str, provision: Provision<AnyValue>) -> Result<(), LocatorError>;

	/// Clears every registration, binding, cache entry, singleton and
	/// configuration value. The default key is kept.
	fn release_all(&self);

	/// The key used when a call does not name one.
	fn default_key(&self) -> String;

	/// Replaces the default key; `None` restores [`DEFAULT_KEY`].
	fn set_default_key(&self, key: Option<String>);
}

/// Resolution surface of a locator.
pub trait DependencyProvider: Send + Sync {
	/// Builds an instance of `abstract_type` under the default key, choosing
	/// the constructor by the runtime types of `args`.
	fn create(&self, abstract_type: &TypeDescriptor, args: &[Instance]) -> Result<Instance, LocatorError>;

	/// Builds an instance of `abstract_type` under `key`.
	fn create_named(
		&self,
		abstract_type: &TypeDescriptor,
		key: &str,
		args: &[Instance],
	) -> Result<Instance, LocatorError>;

	/// Returns the singleton for `(abstract_type, key)`, evaluating a lazy
	/// supplier at most once.
	fn get_singleton(
		&self,
		abstract_type: &TypeDescriptor,
		key: Option<&str>,
	) -> Result<Instance, LocatorError>;

	/// Returns the configuration value for `key`, evaluating a lazy supplier
	/// at most once.
	fn get_config(&self, key: &str) -> Result<AnyValue, LocatorError>;
}
