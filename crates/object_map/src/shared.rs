//! Adapter-owned lock around an [`ObjectMap`].

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::map::ObjectMap;

/// Cloneable handle serializing every access to one [`ObjectMap`].
///
/// The map has no internal locking and several of its operations touch more
/// than one table. Whoever shares a map across threads goes through this
/// handle, and holds [`Self::lock`] across multi-step sequences such as
/// lookup, incarnate, bind.
pub struct SharedObjectMap<S> {
	inner: Arc<Mutex<ObjectMap<S>>>,
}

impl<S> SharedObjectMap<S>
where
	S: Clone + Eq + Hash,
{
	pub fn new(map: ObjectMap<S>) -> Self {
		Self {
			inner: Arc::new(Mutex::new(map)),
		}
	}

	/// Acquires exclusive access for a sequence of map operations.
	pub fn lock(&self) -> MutexGuard<'_, ObjectMap<S>> {
		self.inner.lock()
	}

	/// Runs `f` with exclusive access.
	pub fn with<R>(&self, f: impl FnOnce(&mut ObjectMap<S>) -> R) -> R {
		f(&mut self.inner.lock())
	}
}

impl<S> Clone for SharedObjectMap<S> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<S> From<ObjectMap<S>> for SharedObjectMap<S>
where
	S: Clone + Eq + Hash,
{
	fn from(map: ObjectMap<S>) -> Self {
		Self::new(map)
	}
}
