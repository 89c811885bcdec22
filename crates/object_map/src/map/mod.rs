//! Active object map.
//!
//! Tracks which servant is bound to which object key for one object adapter.
//! Keys resolve to [`EntryId`] slots; slots bind to servants in both
//! directions; a per-policy key index keeps the reverse key bookkeeping.

use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::config::{IdUniqueness, MapConfig, ServantDetach};
use crate::entry::{EntryId, EntryRecord, EntryState, LifecycleEvent};
use crate::error::{Error, Result};
use crate::key::ObjectKey;

mod index;

use index::KeyIndex;

/// Outcome of [`ObjectMap::remove`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal<S> {
	/// Entry the key resolved to.
	pub entry: EntryId,
	/// Servant detached from the entry by this removal, if any.
	pub servant: Option<S>,
	/// Whether the entry lost its last key and its handle is now stale.
	pub retired: bool,
}

/// Bidirectional registry of object keys, entries and servants.
///
/// The map performs no synchronization of its own. Mutation takes `&mut self`,
/// so an adapter sharing one map across threads wraps it in
/// [`SharedObjectMap`](crate::SharedObjectMap) and holds the lock for each
/// compound operation.
///
/// Servant identity is the servant type's `Eq`/`Hash`; use
/// [`ServantRef`](crate::ServantRef) for identity by allocation.
#[derive(Debug)]
pub struct ObjectMap<S> {
	owner: Arc<str>,
	config: MapConfig,
	/// Key to entry. Lookup-or-create through [`Self::get_or_create`].
	key_entries: FxHashMap<ObjectKey, EntryId>,
	/// Every live entry, i.e. every entry referenced from `key_entries`.
	entries: FxHashMap<EntryId, EntryRecord>,
	entry_servants: FxHashMap<EntryId, S>,
	/// Inverse of `entry_servants`, updated in lock-step.
	servant_entries: FxHashMap<S, EntryId>,
	index: KeyIndex,
}

impl<S> ObjectMap<S>
where
	S: Clone + Eq + Hash,
{
	/// Creates the map for adapter `owner`, selecting the multiple-id variant when
	/// `multiple_ids_allowed` is set.
	pub fn create(owner: impl Into<Arc<str>>, multiple_ids_allowed: bool) -> Self {
		Self::with_config(owner, MapConfig::new(multiple_ids_allowed))
	}

	pub fn with_config(owner: impl Into<Arc<str>>, config: MapConfig) -> Self {
		let owner = owner.into();
		debug!(owner = %owner, policy = ?config.id_uniqueness, detach = ?config.servant_detach, "Creating object map");
		Self {
			owner,
			config,
			key_entries: FxHashMap::default(),
			entries: FxHashMap::default(),
			entry_servants: FxHashMap::default(),
			servant_entries: FxHashMap::default(),
			index: KeyIndex::new(config.id_uniqueness),
		}
	}

	/// Name of the adapter owning this map and every entry it issues.
	pub fn owner(&self) -> &str {
		&self.owner
	}

	pub fn config(&self) -> MapConfig {
		self.config
	}

	pub fn policy(&self) -> IdUniqueness {
		self.index.policy()
	}

	/// Returns true if `servant` is bound to an entry.
	pub fn contains(&self, servant: &S) -> bool {
		self.servant_entries.contains_key(servant)
	}

	pub fn contains_key(&self, key: &[u8]) -> bool {
		self.key_entries.contains_key(key)
	}

	/// Pure lookup of the entry for `key`.
	pub fn find(&self, key: &[u8]) -> Option<EntryId> {
		self.key_entries.get(key).copied()
	}

	/// Returns the entry for `key`, creating an unbound one if the key is new.
	///
	/// This is not a pure query: an unknown key is registered. Repeated calls
	/// with the same key return the same entry.
	pub fn get_or_create(&mut self, key: &ObjectKey) -> EntryId {
		if let Some(&entry) = self.key_entries.get(key) {
			return entry;
		}

		let entry = EntryId::next();
		self.entries.insert(entry, EntryRecord::default());
		self.key_entries.insert(key.clone(), entry);
		self.index.insert(entry, key.clone());
		trace!(owner = %self.owner, %key, %entry, "Created entry");
		entry
	}

	/// Servant bound to `entry`, if any.
	pub fn servant(&self, entry: EntryId) -> Option<&S> {
		self.entry_servants.get(&entry)
	}

	/// Entry `servant` is bound to, if any.
	pub fn entry_of(&self, servant: &S) -> Option<EntryId> {
		self.servant_entries.get(servant).copied()
	}

	/// The key of `entry`.
	///
	/// # Errors
	///
	/// [`Error::WrongPolicy`] under the multiple-id policy, whatever the entry's
	/// state; use [`Self::keys_of`] there.
	pub fn key_of(&self, entry: EntryId) -> Result<Option<&ObjectKey>> {
		self.index.key_of(entry)
	}

	/// The key of the entry `servant` is bound to.
	///
	/// # Errors
	///
	/// [`Error::WrongPolicy`] under the multiple-id policy.
	pub fn key_of_servant(&self, servant: &S) -> Result<Option<&ObjectKey>> {
		match self.servant_entries.get(servant) {
			Some(&entry) => self.index.key_of(entry),
			None => match self.policy() {
				IdUniqueness::Unique => Ok(None),
				IdUniqueness::Multiple => Err(Error::WrongPolicy),
			},
		}
	}

	/// All keys currently resolving to `entry`, under either policy.
	pub fn keys_of(&self, entry: EntryId) -> impl Iterator<Item = &ObjectKey> {
		self.index.keys_of(entry)
	}

	pub fn key_count(&self, entry: EntryId) -> usize {
		self.index.key_count(entry)
	}

	/// Returns true if more than one key resolves to `entry`. Always false under
	/// the unique-id policy.
	pub fn has_multiple_ids(&self, entry: EntryId) -> bool {
		self.index.has_multiple_ids(entry)
	}

	/// Binds `servant` to `entry` in both directions.
	///
	/// Rebinding is not an error: a servant previously bound to `entry`, and an
	/// entry previously holding `servant`, are unlinked so the binding stays
	/// one-to-one. An entry left without a servant returns to
	/// [`EntryState::Invalid`].
	///
	/// # Errors
	///
	/// [`Error::UnknownEntry`] if `entry` is retired or foreign to this map.
	pub fn put_servant(&mut self, servant: S, entry: EntryId) -> Result<()> {
		self.ensure_live(entry)?;

		if let Some(previous) = self.entry_servants.remove(&entry)
			&& previous != servant
		{
			self.servant_entries.remove(&previous);
			debug!(owner = %self.owner, %entry, "Replaced servant binding");
		}
		if let Some(previous) = self.servant_entries.insert(servant.clone(), entry)
			&& previous != entry
		{
			self.entry_servants.remove(&previous);
			self.reset_lifecycle(previous);
			debug!(owner = %self.owner, from = %previous, to = %entry, "Moved servant between entries");
		}
		self.entry_servants.insert(entry, servant);
		trace!(owner = %self.owner, %entry, "Bound servant");
		Ok(())
	}

	/// Records `key` as an additional key of `entry`.
	///
	/// Putting a key the entry already has is a no-op.
	///
	/// # Errors
	///
	/// - [`Error::UnknownEntry`] if `entry` is not live.
	/// - [`Error::KeyInUse`] if `key` resolves to another entry.
	/// - [`Error::EntryAlreadyKeyed`] under the unique-id policy when `entry`
	///   already has a different key.
	pub fn put_entry(&mut self, key: ObjectKey, entry: EntryId) -> Result<()> {
		self.ensure_live(entry)?;
		match self.key_entries.get(&key) {
			Some(&existing) if existing == entry => return Ok(()),
			Some(_) => return Err(Error::KeyInUse(key)),
			None => {}
		}
		self.index.check_insert(entry, &key)?;

		trace!(owner = %self.owner, %key, %entry, "Added key to entry");
		self.key_entries.insert(key.clone(), entry);
		self.index.insert(entry, key);
		Ok(())
	}

	/// Removes `key`.
	///
	/// The entry's servant is detached when the entry loses its last key, or on
	/// any removal with [`ServantDetach::AnyKey`]; a detached entry that keeps
	/// other keys returns to [`EntryState::Invalid`]. An entry without keys is
	/// retired. Removing an absent key changes nothing and returns `None`.
	pub fn remove(&mut self, key: &[u8]) -> Option<Removal<S>> {
		let (key, entry) = self.key_entries.remove_entry(key)?;
		let keyed = self.index.remove_key(entry, &key);

		let detach = !keyed || self.config.servant_detach == ServantDetach::AnyKey;
		let servant = if detach { self.unbind(entry) } else { None };
		if !keyed {
			self.entries.remove(&entry);
		}

		debug!(
			owner = %self.owner,
			%key,
			%entry,
			detached = servant.is_some(),
			retired = !keyed,
			"Removed key"
		);
		Some(Removal {
			entry,
			servant,
			retired: !keyed,
		})
	}

	/// Activates `servant` under `key` and marks the entry [`EntryState::Valid`].
	///
	/// Under the multiple-id policy a servant that is already active gains `key`
	/// as an alias of its existing entry.
	///
	/// # Errors
	///
	/// - [`Error::ObjectAlreadyActive`] if `key`'s entry already has a servant.
	/// - [`Error::ServantAlreadyActive`] under the unique-id policy when
	///   `servant` is bound elsewhere.
	/// - [`Error::KeyInUse`] when aliasing onto a key that resolves to another,
	///   unbound entry.
	/// - [`Error::IllegalTransition`] / [`Error::EntryBusy`] if the existing
	///   entry cannot be activated in its current state.
	pub fn activate_object(&mut self, key: ObjectKey, servant: S) -> Result<EntryId> {
		if let Some(entry) = self.find(key.as_bytes())
			&& self.entry_servants.contains_key(&entry)
		{
			return Err(Error::ObjectAlreadyActive(key));
		}

		if let Some(&bound) = self.servant_entries.get(&servant) {
			return match self.policy() {
				IdUniqueness::Unique => Err(Error::ServantAlreadyActive),
				IdUniqueness::Multiple => {
					self.put_entry(key, bound)?;
					Ok(bound)
				}
			};
		}

		let entry = self.get_or_create(&key);
		self.transition(entry, LifecycleEvent::Activate)?;
		self.put_servant(servant, entry)?;
		debug!(owner = %self.owner, %key, %entry, "Activated object");
		Ok(entry)
	}

	/// Lifecycle state of `entry`, `None` if it is not live.
	pub fn state(&self, entry: EntryId) -> Option<EntryState> {
		self.entries.get(&entry).map(|record| record.state)
	}

	/// Invocations admitted against `entry` that have not exited.
	pub fn active_invocations(&self, entry: EntryId) -> Option<u32> {
		self.entries.get(&entry).map(|record| record.active)
	}

	/// Feeds `event` to the lifecycle of `entry`.
	///
	/// # Errors
	///
	/// [`Error::UnknownEntry`], [`Error::EntryBusy`] or
	/// [`Error::IllegalTransition`]; the entry is unchanged on error.
	pub fn transition(&mut self, entry: EntryId, event: LifecycleEvent) -> Result<EntryState> {
		let record = self
			.entries
			.get_mut(&entry)
			.ok_or(Error::UnknownEntry(entry))?;
		let state = record.apply(entry, event)?;
		trace!(owner = %self.owner, %entry, %event, %state, "Entry transition");
		Ok(state)
	}

	/// Live view of every registered key.
	pub fn keys(&self) -> impl Iterator<Item = &ObjectKey> {
		self.key_entries.keys()
	}

	/// Every bound `(entry, servant)` pair.
	pub fn bindings(&self) -> impl Iterator<Item = (EntryId, &S)> {
		self.entry_servants
			.iter()
			.map(|(&entry, servant)| (entry, servant))
	}

	/// Number of registered keys.
	pub fn len(&self) -> usize {
		self.key_entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.key_entries.is_empty()
	}

	/// Number of live entries.
	pub fn entry_count(&self) -> usize {
		self.entries.len()
	}

	pub fn servant_count(&self) -> usize {
		self.entry_servants.len()
	}

	/// Resets the map: keys, reverse bookkeeping, servant bindings and entry
	/// records are all dropped. Every previously issued handle becomes stale.
	pub fn clear(&mut self) {
		debug!(
			owner = %self.owner,
			keys = self.key_entries.len(),
			entries = self.index.entry_count(),
			servants = self.entry_servants.len(),
			"Clearing object map"
		);
		self.key_entries.clear();
		self.index.clear();
		self.entry_servants.clear();
		self.servant_entries.clear();
		self.entries.clear();
	}

	fn ensure_live(&self, entry: EntryId) -> Result<()> {
		if self.entries.contains_key(&entry) {
			Ok(())
		} else {
			Err(Error::UnknownEntry(entry))
		}
	}

	fn unbind(&mut self, entry: EntryId) -> Option<S> {
		let servant = self.entry_servants.remove(&entry)?;
		self.servant_entries.remove(&servant);
		self.reset_lifecycle(entry);
		Some(servant)
	}

	/// Drops the lifecycle of an entry that lost its servant, so it can be
	/// activated or incarnated again. In-flight invocations are forgotten.
	fn reset_lifecycle(&mut self, entry: EntryId) {
		if let Some(record) = self.entries.get_mut(&entry) {
			if record.state != EntryState::Invalid {
				trace!(owner = %self.owner, %entry, from = %record.state, "Reset entry lifecycle");
			}
			*record = EntryRecord::default();
		}
	}
}
