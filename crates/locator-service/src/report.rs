//! Textual reporting for the locator binary.
//!
//! Renders registry snapshots and turns type names given on the command
//! line, including closed generics such as `IRepository<String>`, into
//! descriptors.

use locator_core::RegistrySnapshot;
use locator_types::{IntrospectionError, TypeDescriptor, TypeIntrospector, TypeTable};
use std::fmt::Write;
use thiserror::Error;

/// Errors that can occur while parsing a type name.
#[derive(Debug, Error)]
pub enum TypeNameError {
	#[error("Unknown type '{0}'")]
	UnknownType(String),
	#[error("Malformed type name '{0}'")]
	Malformed(String),
	#[error(transparent)]
	Introspection(#[from] IntrospectionError),
}

/// Parses `name`, instantiating templates for `Template<Arg, ...>` forms.
pub fn parse_type_name(table: &TypeTable, name: &str) -> Result<TypeDescriptor, TypeNameError> {
	let name = name.trim();
	let Some(open) = name.find('<') else {
		if name.is_empty() || name.contains('>') || name.contains(',') {
			return Err(TypeNameError::Malformed(name.to_string()));
		}
		return table
			.find(name)
			.ok_or_else(|| TypeNameError::UnknownType(name.to_string()));
	};

	let inner = name[open + 1..]
		.strip_suffix('>')
		.ok_or_else(|| TypeNameError::Malformed(name.to_string()))?;
	let template = table
		.find(name[..open].trim())
		.ok_or_else(|| TypeNameError::UnknownType(name[..open].trim().to_string()))?;

	let mut args = Vec::new();
	for arg in split_arguments(inner).ok_or_else(|| TypeNameError::Malformed(name.to_string()))? {
		args.push(parse_type_name(table, arg)?);
	}
	Ok(table.instantiate(&template, &args)?)
}

/// Splits a type-argument list on its top-level commas.
fn split_arguments(list: &str) -> Option<Vec<&str>> {
	let mut parts = Vec::new();
	let mut depth = 0usize;
	let mut start = 0;
	for (index, c) in list.char_indices() {
		match c {
			'<' => depth += 1,
			'>' => depth = depth.checked_sub(1)?,
			',' if depth == 0 => {
				parts.push(&list[start..index]);
				start = index + 1;
			},
			_ => {},
		}
	}
	if depth != 0 {
		return None;
	}
	parts.push(&list[start..]);
	Some(parts)
}

/// Renders a snapshot as an indented listing, one scope key per block.
pub fn render_snapshot(snapshot: &RegistrySnapshot) -> String {
	let mut out = String::new();
	if snapshot.is_empty() {
		out.push_str("No registrations\n");
		return out;
	}

	for (key, scope) in &snapshot.scopes {
		let _ = writeln!(out, "[{}]", key);
		for registration in &scope.types {
			let signatures: Vec<String> =
				registration.signatures.iter().map(ToString::to_string).collect();
			let _ = writeln!(
				out,
				"  {} -> {} {}",
				registration.abstract_type,
				registration.concrete_type,
				signatures.join(" ")
			);
		}
		for binding in &scope.bindings {
			let _ = writeln!(
				out,
				"  {} -> {} (generic)",
				binding.abstract_template, binding.concrete_template
			);
		}
		for registration in &scope.materialized {
			let _ = writeln!(
				out,
				"  {} -> {} (materialized)",
				registration.abstract_type, registration.concrete_type
			);
		}
		for singleton in &scope.singletons {
			let state = if singleton.evaluated { "ready" } else { "lazy" };
			let _ = writeln!(out, "  singleton {} ({})", singleton.abstract_type, state);
		}
	}

	if !snapshot.config_keys.is_empty() {
		let _ = writeln!(out, "config: {}", snapshot.config_keys.join(", "));
	}
	out
}
