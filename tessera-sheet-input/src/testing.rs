//! In-memory [`InputPlatform`] for tests and demos.
//!
//! ```
//! use tessera_sheet_input::{InputId, InputPlatform, testing::ScriptedPlatform};
//!
//! let platform = ScriptedPlatform::new();
//! let node = platform.create_node();
//! assert_eq!(platform.find_node_handle(&node), None);
//!
//! platform.attach(node, InputId::new(12));
//! platform.focus(node);
//! assert_eq!(platform.currently_focused_id(), Some(InputId::new(12)));
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{input_registry::InputId, platform::InputPlatform};

/// Element handle handed out by [`ScriptedPlatform`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeRef(u64);

#[derive(Default)]
struct PlatformState {
    attached: FxHashMap<NodeRef, InputId>,
    focused: Option<NodeRef>,
}

/// Platform whose view hierarchy and native focus are driven by the caller.
///
/// Clones share the same hierarchy.
#[derive(Clone, Default)]
pub struct ScriptedPlatform {
    state: Arc<Mutex<PlatformState>>,
    next_node: Arc<AtomicU64>,
}

impl ScriptedPlatform {
    /// Creates an empty hierarchy with nothing focused.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element.
    pub fn create_node(&self) -> NodeRef {
        NodeRef(self.next_node.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates an element already attached under `id`.
    pub fn attached_node(&self, id: InputId) -> NodeRef {
        let node = self.create_node();
        self.attach(node, id);
        node
    }

    /// Attaches `node` to the hierarchy under `id`.
    pub fn attach(&self, node: NodeRef, id: InputId) {
        self.state.lock().attached.insert(node, id);
    }

    /// Detaches `node`, dropping native focus if it held it.
    pub fn detach(&self, node: NodeRef) {
        let mut state = self.state.lock();
        state.attached.remove(&node);
        if state.focused == Some(node) {
            state.focused = None;
        }
    }

    /// Moves native focus to `node`.
    pub fn focus(&self, node: NodeRef) {
        self.state.lock().focused = Some(node);
    }

    /// Drops native focus entirely.
    pub fn clear_focus(&self) {
        self.state.lock().focused = None;
    }
}

impl InputPlatform for ScriptedPlatform {
    type Node = NodeRef;

    fn find_node_handle(&self, node: &NodeRef) -> Option<InputId> {
        self.state.lock().attached.get(node).copied()
    }

    fn currently_focused_input(&self) -> Option<NodeRef> {
        self.state.lock().focused
    }
}

#[cfg(test)]
mod tests {
    use super::ScriptedPlatform;
    use crate::{input_registry::InputId, platform::InputPlatform};

    #[test]
    fn nodes_resolve_only_while_attached() {
        let platform = ScriptedPlatform::new();
        let node = platform.create_node();
        assert_eq!(platform.find_node_handle(&node), None);

        platform.attach(node, InputId::new(12));
        assert_eq!(platform.find_node_handle(&node), Some(InputId::new(12)));

        platform.detach(node);
        assert_eq!(platform.find_node_handle(&node), None);
    }

    #[test]
    fn detaching_the_focused_node_drops_native_focus() {
        let platform = ScriptedPlatform::new();
        let first = platform.attached_node(InputId::new(1));
        let second = platform.attached_node(InputId::new(2));
        assert_ne!(first, second);

        platform.focus(first);
        assert_eq!(platform.currently_focused_id(), Some(InputId::new(1)));

        platform.detach(second);
        assert_eq!(platform.currently_focused_input(), Some(first));

        platform.detach(first);
        assert_eq!(platform.currently_focused_input(), None);

        platform.focus(second);
        assert_eq!(platform.currently_focused_input(), Some(second));
        assert_eq!(platform.currently_focused_id(), None);
        platform.clear_focus();
        assert_eq!(platform.currently_focused_input(), None);
    }
}
