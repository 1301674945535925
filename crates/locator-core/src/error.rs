//! Error taxonomy of the resolution engine.
//!
//! Every variant is recoverable by the caller. Registration errors are
//! returned synchronously from the registration call so misconfiguration is
//! caught at startup rather than at first use.

use locator_types::{IntrospectionError, InvocationError, TypeDescriptor};
use thiserror::Error;

/// Errors that can occur while configuring or resolving dependencies.
#[derive(Debug, Error)]
pub enum LocatorError {
	/// The concrete type cannot satisfy the abstract type.
	#[error("Invalid binding of {concrete} to {target}: {reason}")]
	InvalidBinding {
		concrete: String,
		target: String,
		reason: String,
	},
	/// A generic binding was asked for a type it cannot close over.
	#[error("Generic binding for {template} cannot satisfy {requested}")]
	InvalidGenericRequest { requested: String, template: String },
	/// No concrete registration, cached instantiation or generic binding exists.
	#[error("Type {ty} is not registered under key '{key}'")]
	NotRegistered { ty: String, key: String },
	/// A binding exists but none of its constructors accepts the arguments.
	#[error("No constructor of {ty} under key '{key}' accepts {}", format_arguments(.args))]
	ConstructorNotFound {
		ty: String,
		key: String,
		args: Vec<String>,
	},
	#[error("Type {ty} has no singleton registered under key '{key}'")]
	SingletonNotRegistered { ty: String, key: String },
	#[error("Type {ty} already has a singleton registered under key '{key}'")]
	DuplicateSingleton { ty: String, key: String },
	#[error("Configuration value for '{0}' not set")]
	ConfigNotSet(String),
	#[error("Configuration value for '{0}' already set")]
	DuplicateConfigKey(String),
	/// A stored value is not of the type the caller asked for.
	#[error("Value for '{key}' is not a {expected}")]
	TypeMismatch { key: String, expected: String },
	/// A factory or lazy supplier failed.
	#[error("Failed to build {ty}: {source}")]
	Invocation {
		ty: String,
		#[source]
		source: InvocationError,
	},
	#[error("Introspection error: {0}")]
	Introspection(#[from] IntrospectionError),
}

impl LocatorError {
	pub(crate) fn invalid_binding(
		concrete: &TypeDescriptor,
		target: &TypeDescriptor,
		reason: impl Into<String>,
	) -> Self {
		Self::InvalidBinding {
			concrete: concrete.to_string(),
			target: target.to_string(),
			reason: reason.into(),
		}
	}

	pub(crate) fn not_registered(ty: &TypeDescriptor, key: &str) -> Self {
		Self::NotRegistered {
			ty: ty.to_string(),
			key: key.to_string(),
		}
	}

	pub(crate) fn constructor_not_found(
		ty: &TypeDescriptor,
		key: &str,
		arg_types: &[TypeDescriptor],
	) -> Self {
		Self::ConstructorNotFound {
			ty: ty.to_string(),
			key: key.to_string(),
			args: arg_types.iter().map(ToString::to_string).collect(),
		}
	}

	pub(crate) fn invocation(ty: &TypeDescriptor, source: InvocationError) -> Self {
		Self::Invocation {
			ty: ty.to_string(),
			source,
		}
	}
}

fn format_arguments(args: &[String]) -> String {
	if args.is_empty() {
		"no arguments".to_string()
	} else {
		format!("arguments ({})", args.join(", "))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_constructor_not_found_lists_argument_types() {
		let err = LocatorError::ConstructorNotFound {
			ty: "IFoo".into(),
			key: "default".into(),
			args: vec!["i32".into(), "i32".into()],
		};
		assert_eq!(
			err.to_string(),
			"No constructor of IFoo under key 'default' accepts arguments (i32, i32)"
		);

		let err = LocatorError::ConstructorNotFound {
			ty: "IFoo".into(),
			key: "default".into(),
			args: vec![],
		};
		assert!(err.to_string().ends_with("accepts no arguments"));
	}
}
