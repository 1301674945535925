//! Hand-built type table implementing [`TypeIntrospector`].
//!
//! Types are declared up front with their supertypes and constructors.
//! Templates declare constructor generators that are called with the
//! type-argument list of each closed instantiation.

use crate::{
	AnyValue, Constructor, Factory, Instance, IntrospectionError, InvocationError,
	ParameterSignature, TypeDescriptor, TypeIntrospector, TypeKind,
};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Type ids are unique across every table in the process.
static NEXT_TYPE_ID: AtomicU64 = AtomicU64::new(1);

/// Produces the constructors of one closed instantiation of a template.
pub type ConstructorGenerator =
	Arc<dyn Fn(&[TypeDescriptor]) -> Vec<ConstructorSpec> + Send + Sync>;

/// A constructor before it is bound to its owning type.
#[derive(Clone)]
pub struct ConstructorSpec {
	params: Vec<TypeDescriptor>,
	factory: Factory,
}

impl ConstructorSpec {
	pub fn new<F>(params: Vec<TypeDescriptor>, factory: F) -> Self
	where
		F: Fn(&[Instance]) -> Result<AnyValue, InvocationError> + Send + Sync + 'static,
	{
		Self {
			params,
			factory: Arc::new(factory),
		}
	}

	fn bind(self, owner: &TypeDescriptor) -> Constructor {
		Constructor::new(
			owner.clone(),
			ParameterSignature::new(self.params),
			self.factory,
		)
	}
}

#[derive(Clone, Default)]
struct ConstructorEntry {
	fixed: Vec<ConstructorSpec>,
	generator: Option<ConstructorGenerator>,
}

#[derive(Default)]
struct TableInner {
	by_name: HashMap<String, TypeDescriptor>,
	entries: HashMap<u64, ConstructorEntry>,
	closed: HashMap<(u64, Vec<u64>), TypeDescriptor>,
	values: HashMap<TypeId, TypeDescriptor>,
}

impl TableInner {
	fn mint(&self, name: String, kind: TypeKind, supertypes: Vec<TypeDescriptor>) -> TypeDescriptor {
		let id = NEXT_TYPE_ID.fetch_add(1, Ordering::Relaxed);
		TypeDescriptor::new(id, name, kind, supertypes)
	}

	fn instantiate(
		&mut self,
		template: &TypeDescriptor,
		args: &[TypeDescriptor],
	) -> Result<TypeDescriptor, IntrospectionError> {
		let TypeKind::Template { arity, is_abstract } = template.kind() else {
			return Err(IntrospectionError::NotATemplate(template.to_string()));
		};
		if !self.entries.contains_key(&template.id()) {
			return Err(IntrospectionError::UnknownType(template.to_string()));
		}
		if *arity != args.len() {
			return Err(IntrospectionError::ArityMismatch {
				template: template.to_string(),
				expected: *arity,
				actual: args.len(),
			});
		}

		let key: (u64, Vec<u64>) = (template.id(), args.iter().map(TypeDescriptor::id).collect());
		if let Some(existing) = self.closed.get(&key) {
			return Ok(existing.clone());
		}

		let mut supertypes = Vec::with_capacity(template.supertypes().len());
		for parent in template.supertypes() {
			if parent.is_template() {
				supertypes.push(self.instantiate(parent, args)?);
			} else {
				supertypes.push(parent.clone());
			}
		}

		let arg_names: Vec<&str> = args.iter().map(TypeDescriptor::name).collect();
		let name = format!("{}<{}>", template.name(), arg_names.join(", "));
		let kind = TypeKind::Closed {
			template: template.clone(),
			args: args.to_vec(),
			is_abstract: *is_abstract,
		};
		let closed = self.mint(name, kind, supertypes);
		self.closed.insert(key, closed.clone());
		Ok(closed)
	}
}

/// In-memory type table.
#[derive(Default)]
pub struct TypeTable {
	inner: RwLock<TableInner>,
}

impl TypeTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts declaring a non-parametric type.
	pub fn define(&self, name: impl Into<String>) -> TypeBuilder<'_> {
		TypeBuilder::new(self, name.into(), None)
	}

	/// Starts declaring a parametric template with `arity` type parameters.
	pub fn define_template(&self, name: impl Into<String>, arity: usize) -> TypeBuilder<'_> {
		TypeBuilder::new(self, name.into(), Some(arity))
	}

	/// Looks up a declared type by name. The latest declaration wins.
	pub fn find(&self, name: &str) -> Option<TypeDescriptor> {
		self.inner.read().by_name.get(name).cloned()
	}

	/// Associates the Rust type `T` with `ty` so plain values can be tagged.
	pub fn register_value<T: Any>(&self, ty: &TypeDescriptor) {
		self.inner.write().values.insert(TypeId::of::<T>(), ty.clone());
	}

	/// Descriptor previously associated with `T`.
	pub fn descriptor_of<T: Any>(&self) -> Option<TypeDescriptor> {
		self.inner.read().values.get(&TypeId::of::<T>()).cloned()
	}

	/// Tags `value` with the descriptor registered for its Rust type.
	pub fn instance<T: Any + Send + Sync>(&self, value: T) -> Result<Instance, IntrospectionError> {
		let ty = self
			.descriptor_of::<T>()
			.ok_or_else(|| IntrospectionError::UnknownType(std::any::type_name::<T>().to_string()))?;
		Ok(Instance::new(ty, value))
	}

	fn declare(&self, builder: TypeBuilder<'_>) -> TypeDescriptor {
		let kind = match builder.arity {
			Some(arity) => TypeKind::Template {
				arity,
				is_abstract: builder.is_abstract,
			},
			None if builder.is_abstract => TypeKind::Abstract,
			None => TypeKind::Concrete,
		};

		let mut inner = self.inner.write();
		let ty = inner.mint(builder.name.clone(), kind, builder.supertypes);
		inner.entries.insert(
			ty.id(),
			ConstructorEntry {
				fixed: builder.constructors,
				generator: builder.generator,
			},
		);
		inner.by_name.insert(builder.name, ty.clone());
		ty
	}
}

impl TypeIntrospector for TypeTable {
	fn constructors(&self, ty: &TypeDescriptor) -> Result<Vec<Constructor>, IntrospectionError> {
		if ty.is_template() {
			return Err(IntrospectionError::OpenTemplate(ty.to_string()));
		}
		if ty.is_abstract() {
			return Err(IntrospectionError::Abstract(ty.to_string()));
		}

		let origin = ty.template().unwrap_or(ty);
		let entry = self
			.inner
			.read()
			.entries
			.get(&origin.id())
			.cloned()
			.ok_or_else(|| IntrospectionError::UnknownType(ty.to_string()))?;

		// Generators run outside the lock.
		let mut specs = entry.fixed;
		if let Some(generator) = entry.generator {
			specs.extend(generator(ty.type_args()));
		}

		Ok(specs.into_iter().map(|spec| spec.bind(ty)).collect())
	}

	fn instantiate(
		&self,
		template: &TypeDescriptor,
		args: &[TypeDescriptor],
	) -> Result<TypeDescriptor, IntrospectionError> {
		self.inner.write().instantiate(template, args)
	}
}

/// Builder returned by [`TypeTable::define`] and [`TypeTable::define_template`].
pub struct TypeBuilder<'a> {
	table: &'a TypeTable,
	name: String,
	arity: Option<usize>,
	is_abstract: bool,
	supertypes: Vec<TypeDescriptor>,
	constructors: Vec<ConstructorSpec>,
	generator: Option<ConstructorGenerator>,
}

impl<'a> TypeBuilder<'a> {
	fn new(table: &'a TypeTable, name: String, arity: Option<usize>) -> Self {
		Self {
			table,
			name,
			arity,
			is_abstract: false,
			supertypes: Vec::new(),
			constructors: Vec::new(),
			generator: None,
		}
	}

	/// Marks the type as an interface or abstract base.
	pub fn abstract_type(mut self) -> Self {
		self.is_abstract = true;
		self
	}

	/// Adds a direct supertype. For templates, a template supertype is
	/// instantiated with the same argument list as the subtype.
	pub fn extends(mut self, parent: &TypeDescriptor) -> Self {
		self.supertypes.push(parent.clone());
		self
	}

	/// Adds a constructor with fixed parameter types.
	pub fn constructor<F>(mut self, params: Vec<TypeDescriptor>, factory: F) -> Self
	where
		F: Fn(&[Instance]) -> Result<AnyValue, InvocationError> + Send + Sync + 'static,
	{
		self.constructors.push(ConstructorSpec::new(params, factory));
		self
	}

	/// Adds constructors that depend on the type arguments of a template.
	pub fn generic_constructors<G>(mut self, generator: G) -> Self
	where
		G: Fn(&[TypeDescriptor]) -> Vec<ConstructorSpec> + Send + Sync + 'static,
	{
		self.generator = Some(Arc::new(generator));
		self
	}

	pub fn declare(self) -> TypeDescriptor {
		let table = self.table;
		table.declare(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::argument;

	struct Holder(Option<Arc<String>>);

	fn box_table() -> (TypeTable, TypeDescriptor, TypeDescriptor, TypeDescriptor) {
		let table = TypeTable::new();
		let string = table.define("String").declare();
		table.register_value::<String>(&string);
		let ibox = table.define_template("IBox", 1).abstract_type().declare();
		let boxed = table
			.define_template("Box", 1)
			.extends(&ibox)
			.generic_constructors(|args| {
				vec![
					ConstructorSpec::new(vec![], |_| Ok(Arc::new(Holder(None)) as AnyValue)),
					ConstructorSpec::new(vec![args[0].clone()], |args| {
						let value = argument::<String>(args, 0)?;
						Ok(Arc::new(Holder(Some(value))) as AnyValue)
					}),
				]
			})
			.declare();
		(table, string, ibox, boxed)
	}

	#[test]
	fn test_instantiate_interns_closed_types() {
		let (table, string, ibox, _) = box_table();

		let first = table.instantiate(&ibox, &[string.clone()]).unwrap();
		let second = table.instantiate(&ibox, &[string.clone()]).unwrap();
		assert_eq!(first, second);
		assert_eq!(first.to_string(), "IBox<String>");
		assert!(first.is_abstract());
	}

	#[test]
	fn test_closed_supertypes_follow_template() {
		let (table, string, ibox, boxed) = box_table();

		let closed_box = table.instantiate(&boxed, &[string.clone()]).unwrap();
		let closed_ibox = table.instantiate(&ibox, &[string.clone()]).unwrap();
		assert!(table.is_assignable(&closed_ibox, &closed_box));
		assert!(!table.is_assignable(&closed_box, &closed_ibox));
	}

	#[test]
	fn test_instantiate_rejects_bad_requests() {
		let (table, string, _, _) = box_table();
		let pair = table.define_template("Pair", 2).declare();

		assert!(matches!(
			table.instantiate(&string, &[string.clone()]),
			Err(IntrospectionError::NotATemplate(_))
		));
		assert!(matches!(
			table.instantiate(&pair, &[string.clone()]),
			Err(IntrospectionError::ArityMismatch {
				expected: 2,
				actual: 1,
				..
			})
		));
	}

	#[test]
	fn test_generated_constructors_bind_closed_owner() {
		let (table, string, _, boxed) = box_table();
		let closed = table.instantiate(&boxed, &[string.clone()]).unwrap();

		let ctors = table.constructors(&closed).unwrap();
		assert_eq!(ctors.len(), 2);
		assert!(ctors.iter().all(|ctor| ctor.owner() == &closed));

		let arg = table.instance("payload".to_string()).unwrap();
		let built = ctors[1].invoke(&[arg]).unwrap();
		assert_eq!(built.type_descriptor(), &closed);
		let holder = built.downcast::<Holder>().unwrap();
		assert_eq!(holder.0.as_deref().map(String::as_str), Some("payload"));
	}

	#[test]
	fn test_constructors_refuse_abstract_and_open_types() {
		let (table, _, ibox, boxed) = box_table();
		let iface = table.define("IFoo").abstract_type().declare();

		assert!(matches!(
			table.constructors(&iface),
			Err(IntrospectionError::Abstract(_))
		));
		assert!(matches!(
			table.constructors(&boxed),
			Err(IntrospectionError::OpenTemplate(_))
		));
		assert!(matches!(
			table.constructors(&ibox),
			Err(IntrospectionError::OpenTemplate(_))
		));
	}

	#[test]
	fn test_foreign_descriptor_is_unknown() {
		let (table, ..) = box_table();
		let stranger = TypeDescriptor::new(u64::MAX, "Stranger", TypeKind::Concrete, vec![]);

		assert!(matches!(
			table.constructors(&stranger),
			Err(IntrospectionError::UnknownType(_))
		));
	}

	#[test]
	fn test_instance_requires_registered_value_type() {
		let (table, string, ..) = box_table();

		let tagged = table.instance("x".to_string()).unwrap();
		assert_eq!(tagged.type_descriptor(), &string);
		assert!(matches!(
			table.instance(1_i32),
			Err(IntrospectionError::UnknownType(_))
		));
		assert_eq!(table.find("String"), Some(string));
		assert_eq!(table.find("Missing"), None);
	}

	#[test]
	fn test_type_ids_are_unique_across_tables() {
		let first = TypeTable::new();
		let second = TypeTable::new();
		let ifoo = first.define("IFoo").abstract_type().declare();
		let ibar = second.define("IBar").abstract_type().declare();

		assert_ne!(ifoo, ibar);
		assert_ne!(ifoo.id(), ibar.id());
	}
}
