//! Eager and lazily evaluated store entries.

use locator_types::InvocationError;
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Deferred producer of a stored value.
pub type Supplier<V> = Arc<dyn Fn() -> Result<V, InvocationError> + Send + Sync>;

/// Either a ready value or a supplier evaluated on first access.
pub enum Provision<V> {
	Value(V),
	Lazy(Supplier<V>),
}

impl<V> Provision<V> {
	pub fn value(value: V) -> Self {
		Self::Value(value)
	}

	pub fn lazy<F>(supplier: F) -> Self
	where
		F: Fn() -> Result<V, InvocationError> + Send + Sync + 'static,
	{
		Self::Lazy(Arc::new(supplier))
	}
}

impl<V> fmt::Debug for Provision<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Value(_) => f.write_str("Provision::Value"),
			Self::Lazy(_) => f.write_str("Provision::Lazy"),
		}
	}
}

/// Stored entry of the singleton and configuration stores.
///
/// A lazy slot runs its supplier at most once successfully, even under
/// concurrent first access. A failed evaluation leaves the slot empty so the
/// next access retries.
pub(crate) enum Slot<V> {
	Ready(V),
	Lazy {
		cell: OnceCell<V>,
		supplier: Supplier<V>,
	},
}

impl<V: Clone> Slot<V> {
	pub(crate) fn new(provision: Provision<V>) -> Self {
		match provision {
			Provision::Value(value) => Self::Ready(value),
			Provision::Lazy(supplier) => Self::Lazy {
				cell: OnceCell::new(),
				supplier,
			},
		}
	}

	/// Returns the memoized value, running `evaluate` on the supplier if needed.
	pub(crate) fn get_or_try_init<E, F>(&self, evaluate: F) -> Result<V, E>
	where
		F: FnOnce(&Supplier<V>) -> Result<V, E>,
	{
		match self {
			Self::Ready(value) => Ok(value.clone()),
			Self::Lazy { cell, supplier } => cell.get_or_try_init(|| evaluate(supplier)).cloned(),
		}
	}

	/// False only for a lazy slot that has not produced its value yet.
	pub(crate) fn is_evaluated(&self) -> bool {
		match self {
			Self::Ready(_) => true,
			Self::Lazy { cell, .. } => cell.get().is_some(),
		}
	}
}
