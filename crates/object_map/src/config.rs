//! Map policy configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Whether one servant may be reachable under more than one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdUniqueness {
	/// One key per entry.
	#[default]
	Unique,
	/// Any number of keys may alias one entry.
	Multiple,
}

/// When removing a key detaches the servant bound to its entry.
///
/// Only observable under [`IdUniqueness::Multiple`]; a unique-id entry loses
/// its only key on every removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServantDetach {
	/// Detach once the entry's last key is gone.
	#[default]
	LastKey,
	/// Detach on the first removal of any of the entry's keys.
	AnyKey,
}

/// Policy an [`ObjectMap`](crate::ObjectMap) is constructed with.
///
/// ```toml
/// id_uniqueness = "multiple"
/// servant_detach = "last_key"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
	pub id_uniqueness: IdUniqueness,
	pub servant_detach: ServantDetach,
}

impl MapConfig {
	/// Config for the given id policy with default detach behavior.
	pub fn new(multiple_ids_allowed: bool) -> Self {
		Self {
			id_uniqueness: if multiple_ids_allowed {
				IdUniqueness::Multiple
			} else {
				IdUniqueness::Unique
			},
			..Self::default()
		}
	}

	pub fn with_servant_detach(mut self, detach: ServantDetach) -> Self {
		self.servant_detach = detach;
		self
	}

	pub fn multiple_ids_allowed(&self) -> bool {
		self.id_uniqueness == IdUniqueness::Multiple
	}

	/// Parses a config from TOML text. Missing fields take their defaults.
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}
}
