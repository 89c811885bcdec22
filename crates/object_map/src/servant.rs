//! Identity handle for servants shared behind an [`Arc`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Shared servant compared by allocation rather than by value.
///
/// [`ObjectMap`](crate::ObjectMap) delegates servant identity to the servant
/// type's `Eq`/`Hash`. Wrapping servants in `ServantRef` makes two clones of the
/// same `Arc` the same servant, and two equal-valued servants distinct.
pub struct ServantRef<T: ?Sized>(Arc<T>);

impl<T> ServantRef<T> {
	pub fn new(servant: T) -> Self {
		Self(Arc::new(servant))
	}
}

impl<T: ?Sized> ServantRef<T> {
	pub fn as_arc(&self) -> &Arc<T> {
		&self.0
	}

	fn addr(&self) -> *const () {
		Arc::as_ptr(&self.0).cast()
	}
}

impl<T: ?Sized> From<Arc<T>> for ServantRef<T> {
	fn from(servant: Arc<T>) -> Self {
		Self(servant)
	}
}

impl<T: ?Sized> Clone for ServantRef<T> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<T: ?Sized> PartialEq for ServantRef<T> {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}

impl<T: ?Sized> Eq for ServantRef<T> {}

impl<T: ?Sized> Hash for ServantRef<T> {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.addr().hash(state);
	}
}

impl<T: ?Sized> Deref for ServantRef<T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.0
	}
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for ServantRef<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ServantRef").field(&&*self.0).finish()
	}
}
