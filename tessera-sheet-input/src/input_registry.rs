//! # Input Registry
//!
//! Every sheet instance keeps the set of text inputs currently mounted inside
//! it. The set is consulted on blur to tell whether the input that now holds
//! native focus is a sibling living in the same sheet.
//!
//! ## Usage
//!
//! ```
//! use tessera_sheet_input::{InputId, InputRegistry};
//!
//! let registry = InputRegistry::new();
//! let sibling_view = registry.clone();
//!
//! registry.register(InputId::new(3));
//! registry.register(InputId::new(3)); // no-op
//! assert!(sibling_view.contains(InputId::new(3)));
//!
//! registry.unregister(InputId::new(3));
//! registry.unregister(InputId::new(3)); // no-op
//! assert!(sibling_view.is_empty());
//! ```

use std::{fmt, sync::Arc};

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Opaque platform handle of a mounted text input.
///
/// Unique among the inputs mounted at a given time; the platform may recycle
/// it once the input is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputId(u64);

impl InputId {
    /// Wraps a raw platform handle.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw platform handle.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for InputId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shared set of the inputs mounted inside one sheet.
///
/// Cloning the registry clones the handle, not the set: every clone observes
/// the same members. Insertion and removal are idempotent and never fail.
#[derive(Clone, Default)]
pub struct InputRegistry {
    nodes: Arc<RwLock<FxHashSet<InputId>>>,
}

impl InputRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` to the set.
    ///
    /// Returns `true` if the input was not registered before.
    pub fn register(&self, id: InputId) -> bool {
        let inserted = self.nodes.write().insert(id);
        if inserted {
            tracing::debug!(input = %id, "registered sheet text input");
        }
        inserted
    }

    /// Removes `id` from the set.
    ///
    /// Returns `true` if the input was registered.
    pub fn unregister(&self, id: InputId) -> bool {
        let removed = self.nodes.write().remove(&id);
        if removed {
            tracing::debug!(input = %id, "unregistered sheet text input");
        }
        removed
    }

    /// Whether `id` belongs to a text input mounted in this sheet.
    pub fn contains(&self, id: InputId) -> bool {
        self.nodes.read().contains(&id)
    }

    /// Number of registered inputs.
    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    /// Whether no input is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Sorted snapshot of the registered inputs.
    pub fn ids(&self) -> Vec<InputId> {
        let mut ids: Vec<InputId> = self.nodes.read().iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for InputRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ids()).finish()
    }
}
