//! Object identity keys.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Immutable byte-sequence identity of an object within one adapter.
///
/// Equality and hashing are structural over the bytes. The buffer is shared,
/// so clones are cheap; the map stores every key twice (forward and reverse).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(Arc<[u8]>);

impl ObjectKey {
	/// Creates a key taking ownership of `bytes`.
	pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
		Self(Arc::from(bytes.into()))
	}

	/// Returns the raw key bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Polynomial string hash over the bytes: `h = h * 31 + b`.
	///
	/// Bytes are folded as signed values with wrapping 32-bit arithmetic, so the
	/// result matches the classic string hash of peers sharing the key format.
	pub fn hash_code(&self) -> i32 {
		self.0
			.iter()
			.fold(0i32, |h, &b| h.wrapping_mul(31).wrapping_add(i32::from(b as i8)))
	}
}

impl From<Vec<u8>> for ObjectKey {
	fn from(bytes: Vec<u8>) -> Self {
		Self::new(bytes)
	}
}

impl From<&[u8]> for ObjectKey {
	fn from(bytes: &[u8]) -> Self {
		Self(Arc::from(bytes))
	}
}

impl<const N: usize> From<[u8; N]> for ObjectKey {
	fn from(bytes: [u8; N]) -> Self {
		Self::from(&bytes[..])
	}
}

impl Borrow<[u8]> for ObjectKey {
	fn borrow(&self) -> &[u8] {
		&self.0
	}
}

impl AsRef<[u8]> for ObjectKey {
	fn as_ref(&self) -> &[u8] {
		&self.0
	}
}

/// Colon-separated hex pairs without zero padding, e.g. `1a:2`.
impl fmt::Display for ObjectKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, byte) in self.0.iter().enumerate() {
			if i > 0 {
				f.write_str(":")?;
			}
			write!(f, "{byte:x}")?;
		}
		Ok(())
	}
}

impl fmt::Debug for ObjectKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ObjectKey({self})")
	}
}
