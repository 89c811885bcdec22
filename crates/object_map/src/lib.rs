//! Active object map for a portable object adapter.
//!
//! An adapter resolves incoming object keys to registration entries and
//! entries to servants. [`ObjectMap`] holds those associations in both
//! directions, under one of two id-uniqueness policies:
//!
//! - [`IdUniqueness::Unique`]: each entry has exactly one key, and the key of a
//!   servant can be asked for directly.
//! - [`IdUniqueness::Multiple`]: any number of keys may alias one entry; asking
//!   for "the" key fails with [`Error::WrongPolicy`].
//!
//! The map itself is unsynchronized. Share it through [`SharedObjectMap`].
//!
//! ```
//! use poa_object_map::{ObjectKey, ObjectMap};
//!
//! let mut map = ObjectMap::create("root-poa", false);
//! let key = ObjectKey::from([0x1a, 0x02]);
//!
//! let entry = map.get_or_create(&key);
//! map.put_servant("echo", entry)?;
//! assert_eq!(map.key_of_servant(&"echo")?, Some(&key));
//!
//! let removed = map.remove(key.as_bytes()).unwrap();
//! assert_eq!(removed.servant, Some("echo"));
//! assert!(!map.contains_key(key.as_bytes()));
//! # Ok::<(), poa_object_map::Error>(())
//! ```

pub mod config;
pub mod entry;
pub mod error;
pub mod key;
pub mod map;
pub mod servant;
pub mod shared;

pub use config::{IdUniqueness, MapConfig, ServantDetach};
pub use entry::{EntryId, EntryState, LifecycleEvent};
pub use error::{ConfigError, Error, Result};
pub use key::ObjectKey;
pub use map::{ObjectMap, Removal};
pub use servant::ServantRef;
pub use shared::SharedObjectMap;
