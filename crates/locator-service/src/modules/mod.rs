//! Setup modules built into the locator binary.

pub mod servers;

use locator_core::SetupFactory;
use locator_types::ImplementationRegistry;

/// Get all registered setup modules.
///
/// Returns a vector of (name, factory) tuples for all available setup
/// modules. This is used by the setup registry for automatic registration.
pub fn get_all_implementations() -> Vec<(&'static str, SetupFactory)> {
	vec![(servers::Registry::NAME, servers::Registry::factory())]
}
