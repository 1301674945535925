//! Per-abstract-type constructor index.
//!
//! A [`ConstructorSet`] binds one concrete type to one abstract type and
//! indexes every constructor of the concrete type by its parameter
//! signature, answering constructor-selection queries for argument lists.

use crate::LocatorError;
use locator_types::{Constructor, ParameterSignature, TypeDescriptor, TypeIntrospector};

/// Constructors of one concrete type, registered for one abstract type.
#[derive(Debug)]
pub struct ConstructorSet {
	abstract_type: TypeDescriptor,
	concrete_type: TypeDescriptor,
	/// Registration order; at most one entry per signature.
	constructors: Vec<Constructor>,
}

impl ConstructorSet {
	/// Introspects `concrete_type` and indexes its constructors.
	///
	/// Fails with [`LocatorError::InvalidBinding`] if the concrete type is
	/// abstract, an open template, or not assignable to `abstract_type`.
	/// When two constructors share a signature the later one replaces the
	/// earlier, keeping the earlier one's position.
	pub fn build(
		abstract_type: &TypeDescriptor,
		concrete_type: &TypeDescriptor,
		introspector: &dyn TypeIntrospector,
	) -> Result<Self, LocatorError> {
		if concrete_type.is_template() {
			return Err(LocatorError::invalid_binding(
				concrete_type,
				abstract_type,
				"open templates cannot be constructed",
			));
		}
		if concrete_type.is_abstract() {
			return Err(LocatorError::invalid_binding(
				concrete_type,
				abstract_type,
				"concrete type is abstract",
			));
		}
		if !introspector.is_assignable(abstract_type, concrete_type) {
			return Err(LocatorError::invalid_binding(
				concrete_type,
				abstract_type,
				"concrete type does not implement the abstract type",
			));
		}

		let mut constructors: Vec<Constructor> = Vec::new();
		for constructor in introspector.constructors(concrete_type)? {
			match constructors
				.iter_mut()
				.find(|existing| existing.signature() == constructor.signature())
			{
				Some(existing) => *existing = constructor,
				None => constructors.push(constructor),
			}
		}

		tracing::debug!(
			abstract_type = %abstract_type,
			concrete_type = %concrete_type,
			constructors = constructors.len(),
			"Indexed constructors"
		);

		Ok(Self {
			abstract_type: abstract_type.clone(),
			concrete_type: concrete_type.clone(),
			constructors,
		})
	}

	pub fn abstract_type(&self) -> &TypeDescriptor {
		&self.abstract_type
	}

	pub fn concrete_type(&self) -> &TypeDescriptor {
		&self.concrete_type
	}

	/// Indexed signatures in registration order.
	pub fn signatures(&self) -> impl Iterator<Item = &ParameterSignature> {
		self.constructors.iter().map(Constructor::signature)
	}

	/// Selects a constructor accepting arguments of `arg_types`.
	///
	/// When several signatures match, the first in registration order wins;
	/// no attempt is made to favour the most specific overload. `None` means
	/// no constructor accepts the arguments.
	pub fn resolve(&self, arg_types: &[TypeDescriptor]) -> Option<&Constructor> {
		self.constructors
			.iter()
			.find(|constructor| constructor.signature().matches(arg_types))
	}
}
