//! The type-introspection primitive consumed by the resolution engine.
//!
//! The engine never inspects Rust types itself. Everything it needs to know
//! about constructors, instantiation of templates and assignability comes
//! through [`TypeIntrospector`].

use crate::{accepts, AnyValue, Instance, ParameterSignature, TypeDescriptor};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by the introspection primitive.
#[derive(Debug, Error)]
pub enum IntrospectionError {
	/// The descriptor was not minted by this introspector.
	#[error("Type {0} is not known to the introspector")]
	UnknownType(String),
	/// Instantiation was requested for something that is not a template.
	#[error("Type {0} is not a parametric template")]
	NotATemplate(String),
	/// The type-argument list does not fit the template.
	#[error("Template {template} expects {expected} type arguments, got {actual}")]
	ArityMismatch {
		template: String,
		expected: usize,
		actual: usize,
	},
	/// Constructors were requested for an abstract type.
	#[error("Type {0} is abstract and has no constructors")]
	Abstract(String),
	/// Constructors were requested for a template with unbound parameters.
	#[error("Type {0} is an open template and cannot be constructed")]
	OpenTemplate(String),
}

/// Errors raised while invoking a factory or a lazy supplier.
#[derive(Debug, Error)]
pub enum InvocationError {
	#[error("Argument {index} expected {expected}, got {actual}")]
	ArgumentMismatch {
		index: usize,
		expected: String,
		actual: String,
	},
	#[error("{0}")]
	Failed(String),
}

impl InvocationError {
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}
}

/// Callable bound to one concrete constructor.
pub type Factory = Arc<dyn Fn(&[Instance]) -> Result<AnyValue, InvocationError> + Send + Sync>;

/// One constructor of a concrete type.
#[derive(Clone)]
pub struct Constructor {
	owner: TypeDescriptor,
	signature: ParameterSignature,
	factory: Factory,
}

impl Constructor {
	pub fn new(owner: TypeDescriptor, signature: ParameterSignature, factory: Factory) -> Self {
		Self {
			owner,
			signature,
			factory,
		}
	}

	/// The concrete type this constructor builds.
	pub fn owner(&self) -> &TypeDescriptor {
		&self.owner
	}

	pub fn signature(&self) -> &ParameterSignature {
		&self.signature
	}

	/// Invokes the factory and tags the result with the owning type.
	pub fn invoke(&self, args: &[Instance]) -> Result<Instance, InvocationError> {
		let value = (self.factory)(args)?;
		Ok(Instance::from_value(self.owner.clone(), value))
	}
}

impl fmt::Debug for Constructor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.owner, self.signature)
	}
}

/// Capability the engine relies on to reason about and build types.
pub trait TypeIntrospector: Send + Sync {
	/// Enumerates the constructors of a concrete or closed type.
	fn constructors(&self, ty: &TypeDescriptor) -> Result<Vec<Constructor>, IntrospectionError>;

	/// Closes `template` over `args`.
	///
	/// Repeated calls with the same inputs must return the identical descriptor.
	fn instantiate(
		&self,
		template: &TypeDescriptor,
		args: &[TypeDescriptor],
	) -> Result<TypeDescriptor, IntrospectionError>;

	/// Returns true if a value of `source` may be used where `target` is expected.
	fn is_assignable(&self, target: &TypeDescriptor, source: &TypeDescriptor) -> bool {
		accepts(target, source)
	}
}

/// Extracts argument `index` as a `T`, for use inside factories.
pub fn argument<T: Any + Send + Sync>(
	args: &[Instance],
	index: usize,
) -> Result<Arc<T>, InvocationError> {
	let arg = args.get(index).ok_or_else(|| InvocationError::ArgumentMismatch {
		index,
		expected: std::any::type_name::<T>().to_string(),
		actual: "nothing".to_string(),
	})?;

	arg.downcast::<T>()
		.ok_or_else(|| InvocationError::ArgumentMismatch {
			index,
			expected: std::any::type_name::<T>().to_string(),
			actual: arg.type_descriptor().to_string(),
		})
}
