//! Registry trait for self-registering implementations.
//!
//! Setup modules implement this trait to declare the name they are
//! referenced by in configuration files together with their factory.

/// Base trait for implementation registries.
///
/// Each module that contributes registrations to a locator provides a
/// Registry struct implementing this trait, so the bootstrap loader can map
/// configured module names to factories without knowing the modules.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the `module` value of a `[[dependencies]]` entry,
	/// for example "servers" for `module = "servers"`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
