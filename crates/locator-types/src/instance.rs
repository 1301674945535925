//! Runtime values passed to and produced by constructors.

use crate::TypeDescriptor;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased shared value.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// A runtime value tagged with its runtime type.
///
/// The tag drives constructor selection: argument lists are matched against
/// constructor signatures by the tags of the passed instances.
#[derive(Clone)]
pub struct Instance {
	ty: TypeDescriptor,
	value: AnyValue,
}

impl Instance {
	pub fn new<T: Any + Send + Sync>(ty: TypeDescriptor, value: T) -> Self {
		Self {
			ty,
			value: Arc::new(value),
		}
	}

	pub fn from_value(ty: TypeDescriptor, value: AnyValue) -> Self {
		Self { ty, value }
	}

	/// Runtime type of the value.
	pub fn type_descriptor(&self) -> &TypeDescriptor {
		&self.ty
	}

	pub fn value(&self) -> &AnyValue {
		&self.value
	}

	pub fn into_value(self) -> AnyValue {
		self.value
	}

	/// Recovers the concrete Rust value, if it is a `T`.
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.value.clone().downcast::<T>().ok()
	}

	/// Returns true if both instances share the same allocation.
	pub fn ptr_eq(&self, other: &Instance) -> bool {
		Arc::ptr_eq(&self.value, &other.value)
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Instance").field("ty", &self.ty).finish()
	}
}

/// Runtime types of an argument list, in order.
pub fn argument_types(args: &[Instance]) -> Vec<TypeDescriptor> {
	args.iter().map(|arg| arg.ty.clone()).collect()
}
