//! Registration entries and their activation lifecycle.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};

static NEXT_ENTRY: AtomicU64 = AtomicU64::new(1);

/// Opaque handle to one registration slot of an [`ObjectMap`](crate::ObjectMap).
///
/// Handles are process-unique and never reused: a retired handle, or one
/// issued by a different map, never aliases a live entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
	pub(crate) fn next() -> Self {
		Self(NEXT_ENTRY.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for EntryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "entry#{}", self.0)
	}
}

/// Activation state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryState {
	/// No servant has been activated for the entry.
	#[default]
	Invalid,
	/// A servant manager is producing a servant.
	Incarnating,
	/// Servant active, invocations admitted.
	Valid,
	/// Deactivation requested, waiting for in-flight invocations to exit.
	EtherealizePending,
	/// Servant being released.
	Etherealizing,
	/// Servant released; the entry may be activated again.
	Destroyed,
}

impl EntryState {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Invalid => "invalid",
			Self::Incarnating => "incarnating",
			Self::Valid => "valid",
			Self::EtherealizePending => "etherealize_pending",
			Self::Etherealizing => "etherealizing",
			Self::Destroyed => "destroyed",
		}
	}
}

impl fmt::Display for EntryState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Inputs driving [`EntryState`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
	/// An invocation wants to run against the entry's servant.
	Enter,
	/// An admitted invocation finished.
	Exit,
	/// A servant was explicitly activated.
	Activate,
	IncarnateDone,
	IncarnateFailed,
	/// Deactivation requested.
	StartEtherealize,
	EtherealizeDone,
}

impl LifecycleEvent {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Enter => "enter",
			Self::Exit => "exit",
			Self::Activate => "activate",
			Self::IncarnateDone => "incarnate_done",
			Self::IncarnateFailed => "incarnate_failed",
			Self::StartEtherealize => "start_etherealize",
			Self::EtherealizeDone => "etherealize_done",
		}
	}
}

impl fmt::Display for LifecycleEvent {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Per-entry bookkeeping held by the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct EntryRecord {
	pub(crate) state: EntryState,
	/// Invocations admitted by `Enter` and not yet `Exit`ed.
	pub(crate) active: u32,
}

impl EntryRecord {
	/// Applies `event`, returning the new state.
	///
	/// The record is left untouched on error.
	pub(crate) fn apply(&mut self, id: EntryId, event: LifecycleEvent) -> Result<EntryState> {
		use EntryState as S;
		use LifecycleEvent as E;

		let (state, active) = match (self.state, event) {
			(S::Invalid | S::Destroyed, E::Enter) => (S::Incarnating, self.active),
			(S::Invalid | S::Destroyed, E::Activate) => (S::Valid, self.active),
			(S::Incarnating | S::EtherealizePending | S::Etherealizing, E::Enter) => {
				return Err(Error::EntryBusy {
					entry: id,
					state: self.state,
				});
			}
			(S::Incarnating, E::IncarnateDone) => (S::Valid, self.active),
			(S::Incarnating, E::IncarnateFailed) => (S::Invalid, self.active),
			(S::Valid, E::Enter) => match self.active.checked_add(1) {
				Some(active) => (S::Valid, active),
				None => {
					return Err(Error::IllegalTransition {
						entry: id,
						state: self.state,
						event,
					});
				}
			},
			(S::Valid, E::Exit) if self.active > 0 => (S::Valid, self.active - 1),
			(S::Valid, E::StartEtherealize) if self.active == 0 => (S::Etherealizing, 0),
			(S::Valid, E::StartEtherealize) => (S::EtherealizePending, self.active),
			(S::EtherealizePending, E::Exit) if self.active > 1 => {
				(S::EtherealizePending, self.active - 1)
			}
			(S::EtherealizePending, E::Exit) if self.active == 1 => (S::Etherealizing, 0),
			(S::Etherealizing, E::EtherealizeDone) => (S::Destroyed, 0),
			(state, event) => {
				return Err(Error::IllegalTransition {
					entry: id,
					state,
					event,
				});
			}
		};

		self.state = state;
		self.active = active;
		Ok(state)
	}
}
