//! Common types for the dependency locator.
//!
//! This crate defines the vocabulary shared by the resolution engine and
//! its collaborators: type descriptors, constructor signatures, the
//! type-compatibility predicate, runtime instances and the injected
//! type-introspection primitive together with a hand-built implementation.

/// Type descriptors and their kinds.
pub mod descriptor;
/// Runtime values tagged with their type.
pub mod instance;
/// The introspection capability consumed by the engine.
pub mod introspection;
/// Registry trait for named setup modules.
pub mod registry;
/// Signatures and the type-compatibility predicate.
pub mod signature;
/// Hand-built type table.
pub mod table;

pub use descriptor::{TypeDescriptor, TypeKind};
pub use instance::{argument_types, AnyValue, Instance};
pub use introspection::{
	argument, Constructor, Factory, IntrospectionError, InvocationError, TypeIntrospector,
};
pub use registry::ImplementationRegistry;
pub use signature::{accepts, derives_from_template, is_subtype, signature_matches, ParameterSignature};
pub use table::{ConstructorGenerator, ConstructorSpec, TypeBuilder, TypeTable};
