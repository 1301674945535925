//! Read-only view of a locator's registrations.

use locator_types::{ParameterSignature, TypeDescriptor};
use std::collections::BTreeMap;

/// Registrations of a locator at one point in time, grouped by scope key.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
	pub scopes: BTreeMap<String, ScopeSnapshot>,
	/// Configuration keys, sorted.
	pub config_keys: Vec<String>,
}

/// Registrations under one scope key. Every list is sorted by type name.
#[derive(Debug, Clone, Default)]
pub struct ScopeSnapshot {
	/// Concrete registrations.
	pub types: Vec<TypeRegistration>,
	/// Generic template bindings.
	pub bindings: Vec<BindingRegistration>,
	/// Closed generic types materialized so far.
	pub materialized: Vec<TypeRegistration>,
	pub singletons: Vec<SingletonRegistration>,
}

#[derive(Debug, Clone)]
pub struct TypeRegistration {
	pub abstract_type: TypeDescriptor,
	pub concrete_type: TypeDescriptor,
	pub signatures: Vec<ParameterSignature>,
}

#[derive(Debug, Clone)]
pub struct BindingRegistration {
	pub abstract_template: TypeDescriptor,
	pub concrete_template: TypeDescriptor,
}

#[derive(Debug, Clone)]
pub struct SingletonRegistration {
	pub abstract_type: TypeDescriptor,
	/// False while a lazy supplier has not run yet.
	pub evaluated: bool,
}

impl RegistrySnapshot {
	pub fn is_empty(&self) -> bool {
		self.scopes.is_empty() && self.config_keys.is_empty()
	}

	pub fn scope(&self, key: &str) -> Option<&ScopeSnapshot> {
		self.scopes.get(key)
	}

	pub(crate) fn scope_mut(&mut self, key: &str) -> &mut ScopeSnapshot {
		self.scopes.entry(key.to_string()).or_default()
	}

	pub(crate) fn sort(&mut self) {
		for scope in self.scopes.values_mut() {
			scope
				.types
				.sort_by(|a, b| a.abstract_type.name().cmp(b.abstract_type.name()));
			scope
				.bindings
				.sort_by(|a, b| a.abstract_template.name().cmp(b.abstract_template.name()));
			scope
				.materialized
				.sort_by(|a, b| a.abstract_type.name().cmp(b.abstract_type.name()));
			scope
				.singletons
				.sort_by(|a, b| a.abstract_type.name().cmp(b.abstract_type.name()));
		}
		self.config_keys.sort();
	}
}
