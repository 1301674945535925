//! Stub type tables shared by the engine's unit tests.

use locator_types::{
	argument, AnyValue, Constructor, ConstructorSpec, Instance, IntrospectionError, TypeDescriptor,
	TypeIntrospector, TypeTable,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct FooValue {
	pub data: String,
}

#[derive(Debug)]
pub(crate) struct DependencyValue {
	pub text: String,
	pub number: i32,
}

pub(crate) struct ConstructorableValue {
	pub dependency: Instance,
	pub inner: Option<Instance>,
}

pub(crate) struct GenericValue {
	pub item: Option<Instance>,
}

pub(crate) struct Stubs {
	pub table: Arc<TypeTable>,
	pub string: TypeDescriptor,
	pub int: TypeDescriptor,
	pub ifoo: TypeDescriptor,
	pub foo: TypeDescriptor,
	pub idependency: TypeDescriptor,
	pub concrete_dependency: TypeDescriptor,
	pub inherited_dependency: TypeDescriptor,
	pub iconstructorable: TypeDescriptor,
	pub constructorable: TypeDescriptor,
	pub igeneric: TypeDescriptor,
	pub base_generic: TypeDescriptor,
	pub generic: TypeDescriptor,
	pub unrelated_generic: TypeDescriptor,
	pub ibox: TypeDescriptor,
}

impl Stubs {
	pub fn new() -> Self {
		let table = Arc::new(TypeTable::new());

		let string = table.define("String").declare();
		table.register_value::<String>(&string);
		let int = table.define("Int32").declare();
		table.register_value::<i32>(&int);

		let ifoo = table.define("IFoo").abstract_type().declare();
		let foo = table
			.define("Foo")
			.extends(&ifoo)
			.constructor(vec![], |_| {
				Ok(Arc::new(FooValue {
					data: "default".to_string(),
				}) as AnyValue)
			})
			.constructor(vec![string.clone()], |args| {
				let data = argument::<String>(args, 0)?;
				Ok(Arc::new(FooValue {
					data: data.as_ref().clone(),
				}) as AnyValue)
			})
			.declare();

		let idependency = table.define("IStubDependency").abstract_type().declare();
		let concrete_dependency = table
			.define("ConcreteStubDependency")
			.extends(&idependency)
			.constructor(vec![], |_| Ok(dependency(String::new(), 0)))
			.constructor(vec![string.clone()], |args| {
				let text = argument::<String>(args, 0)?;
				Ok(dependency(text.as_ref().clone(), 0))
			})
			.constructor(vec![string.clone(), int.clone(), string.clone()], |args| {
				let head = argument::<String>(args, 0)?;
				let number = argument::<i32>(args, 1)?;
				let tail = argument::<String>(args, 2)?;
				Ok(dependency(format!("{}{}", head, tail), *number))
			})
			.declare();
		let inherited_dependency = table
			.define("InheritedStubDependency")
			.extends(&concrete_dependency)
			.constructor(vec![], |_| Ok(dependency("inherited".to_string(), 1)))
			.declare();

		let iconstructorable = table.define("IConstructorable").abstract_type().declare();
		let constructorable = table
			.define("Constructorable")
			.extends(&iconstructorable)
			.constructor(vec![idependency.clone()], |args| {
				Ok(Arc::new(ConstructorableValue {
					dependency: args[0].clone(),
					inner: None,
				}) as AnyValue)
			})
			.constructor(
				vec![idependency.clone(), iconstructorable.clone()],
				|args| {
					Ok(Arc::new(ConstructorableValue {
						dependency: args[0].clone(),
						inner: Some(args[1].clone()),
					}) as AnyValue)
				},
			)
			.declare();

		let igeneric = table.define_template("IGeneric", 1).abstract_type().declare();
		let base_generic = table
			.define_template("BaseGeneric", 1)
			.abstract_type()
			.extends(&igeneric)
			.declare();
		let generic = table
			.define_template("Generic", 1)
			.extends(&base_generic)
			.generic_constructors(|args| {
				vec![
					ConstructorSpec::new(vec![], |_| Ok(Arc::new(GenericValue { item: None }) as AnyValue)),
					ConstructorSpec::new(vec![args[0].clone()], |args| {
						Ok(Arc::new(GenericValue {
							item: Some(args[0].clone()),
						}) as AnyValue)
					}),
				]
			})
			.declare();
		let unrelated_generic = table
			.define_template("UnrelatedGeneric", 1)
			.generic_constructors(|_| {
				vec![ConstructorSpec::new(vec![], |_| {
					Ok(Arc::new(GenericValue { item: None }) as AnyValue)
				})]
			})
			.declare();
		let ibox = table.define_template("IBox", 1).abstract_type().declare();

		Self {
			table,
			string,
			int,
			ifoo,
			foo,
			idependency,
			concrete_dependency,
			inherited_dependency,
			iconstructorable,
			constructorable,
			igeneric,
			base_generic,
			generic,
			unrelated_generic,
			ibox,
		}
	}

	pub fn text(&self, value: &str) -> Instance {
		Instance::new(self.string.clone(), value.to_string())
	}

	pub fn number(&self, value: i32) -> Instance {
		Instance::new(self.int.clone(), value)
	}

	/// `template<String>`.
	pub fn closed(&self, template: &TypeDescriptor) -> TypeDescriptor {
		self.table
			.instantiate(template, &[self.string.clone()])
			.expect("stub templates take one argument")
	}
}

fn dependency(text: String, number: i32) -> AnyValue {
	Arc::new(DependencyValue { text, number })
}

/// Introspector that counts how often the engine asks for constructors.
pub(crate) struct CountingIntrospector {
	inner: Arc<TypeTable>,
	constructors: AtomicUsize,
}

impl CountingIntrospector {
	pub fn new(inner: Arc<TypeTable>) -> Self {
		Self {
			inner,
			constructors: AtomicUsize::new(0),
		}
	}

	pub fn constructor_calls(&self) -> usize {
		self.constructors.load(Ordering::SeqCst)
	}
}

impl TypeIntrospector for CountingIntrospector {
	fn constructors(&self, ty: &TypeDescriptor) -> Result<Vec<Constructor>, IntrospectionError> {
		self.constructors.fetch_add(1, Ordering::SeqCst);
		self.inner.constructors(ty)
	}

	fn instantiate(
		&self,
		template: &TypeDescriptor,
		args: &[TypeDescriptor],
	) -> Result<TypeDescriptor, IntrospectionError> {
		self.inner.instantiate(template, args)
	}
}
