use thiserror::Error;

use crate::entry::{EntryId, EntryState, LifecycleEvent};
use crate::key::ObjectKey;

/// Errors returned by [`ObjectMap`](crate::ObjectMap) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// The query has no single answer under the multiple-id policy.
	#[error("operation requires the unique-id policy")]
	WrongPolicy,
	/// The handle was never issued by this map, or its entry was retired.
	#[error("{0} is not registered in this map")]
	UnknownEntry(EntryId),
	/// The key already resolves to a different entry.
	#[error("key {0} is already bound to another entry")]
	KeyInUse(ObjectKey),
	/// Unique-id policy: the entry already has a key.
	#[error("{entry} is already keyed by {key}")]
	EntryAlreadyKeyed { entry: EntryId, key: ObjectKey },
	/// Unique-id policy: the servant is already bound under another key.
	#[error("servant is already active")]
	ServantAlreadyActive,
	/// The key's entry already has a servant.
	#[error("object {0} is already active")]
	ObjectAlreadyActive(ObjectKey),
	/// The entry is mid-incarnation or mid-etherealization.
	#[error("{entry} is busy ({state})")]
	EntryBusy { entry: EntryId, state: EntryState },
	#[error("{entry}: {event} is not valid in state {state}")]
	IllegalTransition {
		entry: EntryId,
		state: EntryState,
		event: LifecycleEvent,
	},
}

/// Result type for map operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from loading a [`MapConfig`](crate::MapConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to parse object map config: {0}")]
	Parse(#[from] toml::de::Error),
}
