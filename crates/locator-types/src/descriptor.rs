//! Type descriptors for the locator's type system.
//!
//! A descriptor is an opaque, cheaply clonable handle to immutable type
//! metadata. Descriptors are minted by a [`TypeTable`](crate::TypeTable) and
//! compared by identity, never by name.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Shape of a described type.
#[derive(Debug, Clone)]
pub enum TypeKind {
	/// An instantiable type with invocable constructors.
	Concrete,
	/// An interface or abstract base that can only be requested, never built.
	Abstract,
	/// A parametric template with `arity` unbound type parameters.
	Template { arity: usize, is_abstract: bool },
	/// A closed instantiation of `template` with concrete type arguments.
	Closed {
		template: TypeDescriptor,
		args: Vec<TypeDescriptor>,
		is_abstract: bool,
	},
}

#[derive(Debug)]
struct TypeInfo {
	id: u64,
	name: String,
	kind: TypeKind,
	supertypes: Vec<TypeDescriptor>,
}

/// Handle to a type known to the introspection primitive.
#[derive(Clone)]
pub struct TypeDescriptor(Arc<TypeInfo>);

impl TypeDescriptor {
	pub(crate) fn new(
		id: u64,
		name: impl Into<String>,
		kind: TypeKind,
		supertypes: Vec<TypeDescriptor>,
	) -> Self {
		Self(Arc::new(TypeInfo {
			id,
			name: name.into(),
			kind,
			supertypes,
		}))
	}

	/// Identity of the descriptor within its table.
	pub fn id(&self) -> u64 {
		self.0.id
	}

	pub fn name(&self) -> &str {
		&self.0.name
	}

	pub fn kind(&self) -> &TypeKind {
		&self.0.kind
	}

	/// Direct supertypes (base types and implemented interfaces).
	pub fn supertypes(&self) -> &[TypeDescriptor] {
		&self.0.supertypes
	}

	/// Returns true for a bare parametric template such as `Box<T>`.
	pub fn is_template(&self) -> bool {
		matches!(self.0.kind, TypeKind::Template { .. })
	}

	/// Returns true for a closed instantiation such as `Box<String>`.
	pub fn is_closed(&self) -> bool {
		matches!(self.0.kind, TypeKind::Closed { .. })
	}

	/// Returns true when the type cannot be constructed directly.
	pub fn is_abstract(&self) -> bool {
		match &self.0.kind {
			TypeKind::Concrete => false,
			TypeKind::Abstract => true,
			TypeKind::Template { is_abstract, .. } | TypeKind::Closed { is_abstract, .. } => {
				*is_abstract
			}
		}
	}

	/// Number of type parameters of a template or closed instantiation.
	pub fn arity(&self) -> usize {
		match &self.0.kind {
			TypeKind::Template { arity, .. } => *arity,
			TypeKind::Closed { args, .. } => args.len(),
			_ => 0,
		}
	}

	/// The originating template of a closed instantiation.
	pub fn template(&self) -> Option<&TypeDescriptor> {
		match &self.0.kind {
			TypeKind::Closed { template, .. } => Some(template),
			_ => None,
		}
	}

	/// Type arguments of a closed instantiation, empty otherwise.
	pub fn type_args(&self) -> &[TypeDescriptor] {
		match &self.0.kind {
			TypeKind::Closed { args, .. } => args,
			_ => &[],
		}
	}

	/// Returns true if this is a closed instantiation of `template`.
	pub fn is_closed_instance_of(&self, template: &TypeDescriptor) -> bool {
		self.template().is_some_and(|own| own == template)
	}
}

impl PartialEq for TypeDescriptor {
	fn eq(&self, other: &Self) -> bool {
		self.0.id == other.0.id
	}
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.0.id.hash(state);
	}
}

impl fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0.name)
	}
}

impl fmt::Debug for TypeDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}#{}", self.0.name, self.0.id)
	}
}
