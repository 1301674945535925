//! Bindings from abstract parametric templates to concrete templates.

use crate::{ConstructorSet, LocatorError};
use locator_types::{derives_from_template, TypeDescriptor, TypeIntrospector};

/// Binds one abstract template to the concrete template that satisfies it.
///
/// The binding is stateless apart from the pair; caching of materialized
/// constructor sets belongs to the locator.
#[derive(Debug, Clone)]
pub struct GenericBinding {
	abstract_template: TypeDescriptor,
	concrete_template: TypeDescriptor,
}

impl GenericBinding {
	/// Validates and creates a binding.
	///
	/// Both types must be templates of the same arity, the concrete one must
	/// not be abstract, and its instantiations must be assignable to the
	/// abstract template's instantiations.
	pub fn new(
		abstract_template: &TypeDescriptor,
		concrete_template: &TypeDescriptor,
	) -> Result<Self, LocatorError> {
		let invalid = |reason: &str| {
			LocatorError::invalid_binding(concrete_template, abstract_template, reason)
		};

		if !abstract_template.is_template() {
			return Err(invalid("abstract type is not a template"));
		}
		if !concrete_template.is_template() {
			return Err(invalid("concrete type is not a template"));
		}
		if concrete_template.is_abstract() {
			return Err(invalid("concrete template is abstract"));
		}
		if concrete_template.arity() != abstract_template.arity() {
			return Err(invalid("templates differ in arity"));
		}
		if !derives_from_template(concrete_template, abstract_template) {
			return Err(invalid(
				"concrete template neither implements nor derives from the abstract template",
			));
		}

		Ok(Self {
			abstract_template: abstract_template.clone(),
			concrete_template: concrete_template.clone(),
		})
	}

	pub fn abstract_template(&self) -> &TypeDescriptor {
		&self.abstract_template
	}

	pub fn concrete_template(&self) -> &TypeDescriptor {
		&self.concrete_template
	}

	/// Returns true iff `requested` is a closed instantiation of the abstract template.
	pub fn can_satisfy(&self, requested: &TypeDescriptor) -> bool {
		!requested.is_template()
			&& requested.is_closed_instance_of(&self.abstract_template)
			&& requested.arity() == self.abstract_template.arity()
	}

	/// Closes the concrete template over `requested`'s type arguments and
	/// indexes the resulting type's constructors.
	pub fn materialize(
		&self,
		requested: &TypeDescriptor,
		introspector: &dyn TypeIntrospector,
	) -> Result<ConstructorSet, LocatorError> {
		if !self.can_satisfy(requested) {
			return Err(LocatorError::InvalidGenericRequest {
				requested: requested.to_string(),
				template: self.abstract_template.to_string(),
			});
		}

		let concrete = introspector.instantiate(&self.concrete_template, requested.type_args())?;
		tracing::debug!(
			requested = %requested,
			concrete = %concrete,
			"Materializing generic binding"
		);
		ConstructorSet::build(requested, &concrete, introspector)
	}
}
