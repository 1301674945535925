//! Type-compatibility predicate and constructor signatures.
//!
//! These functions are pure over descriptor metadata: they walk the
//! supertype graph recorded on each [`TypeDescriptor`] and never consult a
//! table or take a lock.

use crate::TypeDescriptor;
use std::collections::HashSet;
use std::fmt;

/// Ordered list of declared parameter types of one constructor.
///
/// Two signatures are equal iff they have the same length and identical
/// elements. An arity-0 constructor has the empty signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParameterSignature(Vec<TypeDescriptor>);

impl ParameterSignature {
	pub fn new(params: Vec<TypeDescriptor>) -> Self {
		Self(params)
	}

	pub fn empty() -> Self {
		Self(Vec::new())
	}

	pub fn params(&self) -> &[TypeDescriptor] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns true if arguments of `arg_types` may be passed to this signature.
	pub fn matches(&self, arg_types: &[TypeDescriptor]) -> bool {
		signature_matches(self, arg_types)
	}
}

impl From<Vec<TypeDescriptor>> for ParameterSignature {
	fn from(params: Vec<TypeDescriptor>) -> Self {
		Self(params)
	}
}

impl fmt::Display for ParameterSignature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("(")?;
		for (i, param) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{}", param)?;
		}
		f.write_str(")")
	}
}

/// Returns true iff a value of `actual` may be passed where `declared` is expected.
///
/// Holds on exact match or when `actual` transitively derives from or
/// implements `declared`.
pub fn accepts(declared: &TypeDescriptor, actual: &TypeDescriptor) -> bool {
	declared == actual || is_subtype(actual, declared)
}

/// Same length and [`accepts`] pairwise, in order.
pub fn signature_matches(signature: &ParameterSignature, arg_types: &[TypeDescriptor]) -> bool {
	signature.len() == arg_types.len()
		&& signature
			.params()
			.iter()
			.zip(arg_types)
			.all(|(declared, actual)| accepts(declared, actual))
}

/// Returns true if `ancestor` is reachable from `ty` through supertype edges.
pub fn is_subtype(ty: &TypeDescriptor, ancestor: &TypeDescriptor) -> bool {
	let mut visited = HashSet::new();
	let mut pending: Vec<&TypeDescriptor> = ty.supertypes().iter().collect();

	while let Some(current) = pending.pop() {
		if current == ancestor {
			return true;
		}
		if visited.insert(current.id()) {
			pending.extend(current.supertypes());
		}
	}

	false
}

/// Returns true if instantiations of `template` are assignable to
/// instantiations of `base_template` given the same argument list.
///
/// The relation holds when `base_template` is the template itself or appears
/// among its transitive open-template supertypes. A closed supertype such as
/// `IBox<String>` fixes the arguments and does not count.
pub fn derives_from_template(template: &TypeDescriptor, base_template: &TypeDescriptor) -> bool {
	if template == base_template {
		return true;
	}

	let mut visited = HashSet::new();
	let mut pending: Vec<&TypeDescriptor> = template
		.supertypes()
		.iter()
		.filter(|parent| parent.is_template())
		.collect();

	while let Some(current) = pending.pop() {
		if current == base_template {
			return true;
		}
		if visited.insert(current.id()) {
			pending.extend(current.supertypes().iter().filter(|parent| parent.is_template()));
		}
	}

	false
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::introspection::TypeIntrospector;
	use crate::TypeTable;

	fn hierarchy() -> (TypeTable, TypeDescriptor, TypeDescriptor, TypeDescriptor) {
		let table = TypeTable::new();
		let base = table.define("IStubDependency").abstract_type().declare();
		let concrete = table
			.define("ConcreteStubDependency")
			.extends(&base)
			.declare();
		let inherited = table
			.define("InheritedStubDependency")
			.extends(&concrete)
			.declare();
		(table, base, concrete, inherited)
	}

	#[test]
	fn test_accepts_exact_and_transitive_subtypes() {
		let (_table, base, concrete, inherited) = hierarchy();

		assert!(accepts(&base, &base));
		assert!(accepts(&base, &concrete));
		assert!(accepts(&base, &inherited));
		assert!(accepts(&concrete, &inherited));
		assert!(!accepts(&inherited, &concrete));
		assert!(!accepts(&concrete, &base));
	}

	#[test]
	fn test_signature_matches_requires_same_length() {
		let (table, base, concrete, _) = hierarchy();
		let string = table.define("String").declare();

		let signature = ParameterSignature::new(vec![base.clone(), string.clone()]);
		assert!(signature.matches(&[concrete.clone(), string.clone()]));
		assert!(!signature.matches(&[concrete.clone()]));
		assert!(!signature.matches(&[string.clone(), concrete.clone()]));
		assert!(ParameterSignature::empty().matches(&[]));
		assert!(!ParameterSignature::empty().matches(&[string]));
	}

	#[test]
	fn test_signature_equality_and_display() {
		let (table, base, concrete, _) = hierarchy();
		let int = table.define("i32").declare();

		let a = ParameterSignature::new(vec![base.clone(), int.clone()]);
		let b = ParameterSignature::from(vec![base.clone(), int.clone()]);
		let c = ParameterSignature::new(vec![concrete, int]);
		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_eq!(a.to_string(), "(IStubDependency, i32)");
		assert_eq!(ParameterSignature::empty().to_string(), "()");
	}

	#[test]
	fn test_derives_from_template_through_base_template() {
		let table = TypeTable::new();
		let igeneric = table.define_template("IGeneric", 1).abstract_type().declare();
		let base = table
			.define_template("BaseGeneric", 1)
			.abstract_type()
			.extends(&igeneric)
			.declare();
		let generic = table.define_template("Generic", 1).extends(&base).declare();
		let unrelated = table.define_template("Unrelated", 1).declare();

		assert!(derives_from_template(&generic, &igeneric));
		assert!(derives_from_template(&generic, &base));
		assert!(derives_from_template(&generic, &generic));
		assert!(!derives_from_template(&unrelated, &igeneric));
		assert!(!derives_from_template(&igeneric, &generic));
	}

	#[test]
	fn test_closed_supertype_does_not_derive_from_template() {
		let table = TypeTable::new();
		let string = table.define("String").declare();
		let ibox = table.define_template("IBox", 1).abstract_type().declare();
		let string_box = table.instantiate(&ibox, &[string]).unwrap();
		let fixed = table.define_template("FixedBox", 1).extends(&string_box).declare();
		let wrapper = table.define_template("WrapperBox", 1).extends(&fixed).declare();

		assert!(!derives_from_template(&fixed, &ibox));
		assert!(!derives_from_template(&wrapper, &ibox));
		assert!(derives_from_template(&wrapper, &fixed));
	}
}
