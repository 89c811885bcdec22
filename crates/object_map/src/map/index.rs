//! Reverse key bookkeeping, one variant per id-uniqueness policy.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::IdUniqueness;
use crate::entry::EntryId;
use crate::error::{Error, Result};
use crate::key::ObjectKey;

/// Entry to key(s) index kept as the inverse of the map's key table.
#[derive(Debug, Clone)]
pub(crate) enum KeyIndex {
	/// Exactly one key per entry.
	Single(FxHashMap<EntryId, ObjectKey>),
	/// A non-empty key set per entry; empty sets are dropped.
	Multiple(FxHashMap<EntryId, FxHashSet<ObjectKey>>),
}

impl KeyIndex {
	pub(crate) fn new(policy: IdUniqueness) -> Self {
		match policy {
			IdUniqueness::Unique => Self::Single(FxHashMap::default()),
			IdUniqueness::Multiple => Self::Multiple(FxHashMap::default()),
		}
	}

	pub(crate) fn policy(&self) -> IdUniqueness {
		match self {
			Self::Single(_) => IdUniqueness::Unique,
			Self::Multiple(_) => IdUniqueness::Multiple,
		}
	}

	/// Checks that `key` may be recorded for `entry` without breaking one key per entry.
	pub(crate) fn check_insert(&self, entry: EntryId, key: &ObjectKey) -> Result<()> {
		match self {
			Self::Single(keys) => match keys.get(&entry) {
				Some(existing) if existing != key => Err(Error::EntryAlreadyKeyed {
					entry,
					key: existing.clone(),
				}),
				_ => Ok(()),
			},
			Self::Multiple(_) => Ok(()),
		}
	}

	/// Records `key` for `entry`. Callers run [`Self::check_insert`] first.
	pub(crate) fn insert(&mut self, entry: EntryId, key: ObjectKey) {
		match self {
			Self::Single(keys) => {
				keys.insert(entry, key);
			}
			Self::Multiple(sets) => {
				sets.entry(entry).or_default().insert(key);
			}
		}
	}

	/// Drops `key` from `entry`, returning whether the entry still has keys.
	pub(crate) fn remove_key(&mut self, entry: EntryId, key: &ObjectKey) -> bool {
		match self {
			Self::Single(keys) => {
				keys.remove(&entry);
				false
			}
			Self::Multiple(sets) => {
				let Some(set) = sets.get_mut(&entry) else {
					return false;
				};
				set.remove(key);
				if set.is_empty() {
					sets.remove(&entry);
					false
				} else {
					true
				}
			}
		}
	}

	/// The entry's only key. Not answerable under the multiple-id policy.
	pub(crate) fn key_of(&self, entry: EntryId) -> Result<Option<&ObjectKey>> {
		match self {
			Self::Single(keys) => Ok(keys.get(&entry)),
			Self::Multiple(_) => Err(Error::WrongPolicy),
		}
	}

	pub(crate) fn keys_of(&self, entry: EntryId) -> impl Iterator<Item = &ObjectKey> {
		let (single, multiple) = match self {
			Self::Single(keys) => (keys.get(&entry), None),
			Self::Multiple(sets) => (None, sets.get(&entry)),
		};
		single.into_iter().chain(multiple.into_iter().flatten())
	}

	pub(crate) fn key_count(&self, entry: EntryId) -> usize {
		match self {
			Self::Single(keys) => usize::from(keys.contains_key(&entry)),
			Self::Multiple(sets) => sets.get(&entry).map_or(0, |set| set.len()),
		}
	}

	pub(crate) fn has_multiple_ids(&self, entry: EntryId) -> bool {
		match self {
			Self::Single(_) => false,
			Self::Multiple(sets) => sets.get(&entry).is_some_and(|set| set.len() > 1),
		}
	}

	/// Number of entries with at least one key.
	pub(crate) fn entry_count(&self) -> usize {
		match self {
			Self::Single(keys) => keys.len(),
			Self::Multiple(sets) => sets.len(),
		}
	}

	pub(crate) fn clear(&mut self) {
		match self {
			Self::Single(keys) => keys.clear(),
			Self::Multiple(sets) => sets.clear(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn key(byte: u8) -> ObjectKey {
		ObjectKey::from([byte])
	}

	#[test]
	fn single_ignores_key_on_removal() {
		let mut index = KeyIndex::new(IdUniqueness::Unique);
		let entry = EntryId::next();
		index.insert(entry, key(1));
		assert!(!index.remove_key(entry, &key(9)));
		assert_eq!(index.key_count(entry), 0);
	}

	#[test]
	fn single_rejects_second_key() {
		let mut index = KeyIndex::new(IdUniqueness::Unique);
		let entry = EntryId::next();
		index.insert(entry, key(1));
		assert!(index.check_insert(entry, &key(1)).is_ok());
		assert_eq!(
			index.check_insert(entry, &key(2)),
			Err(Error::EntryAlreadyKeyed { entry, key: key(1) })
		);
	}

	#[test]
	fn multiple_drops_empty_sets() {
		let mut index = KeyIndex::new(IdUniqueness::Multiple);
		let entry = EntryId::next();
		index.insert(entry, key(1));
		index.insert(entry, key(2));
		assert!(index.has_multiple_ids(entry));
		assert_eq!(index.key_of(entry), Err(Error::WrongPolicy));

		assert!(index.remove_key(entry, &key(1)));
		assert!(!index.has_multiple_ids(entry));
		assert_eq!(index.keys_of(entry).collect::<Vec<_>>(), vec![&key(2)]);

		assert!(!index.remove_key(entry, &key(2)));
		assert_eq!(index.entry_count(), 0);
	}
}
