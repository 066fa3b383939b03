//! Host platform services consumed by sheet text inputs.

use crate::input_registry::InputId;

/// Queries the host view hierarchy on behalf of sheet text inputs.
///
/// Both methods are called synchronously from focus, blur, mount and unmount
/// dispatches and must not block.
pub trait InputPlatform {
    /// Handle to a text input element as the host knows it.
    type Node;

    /// Resolves a text input element to its platform identifier.
    ///
    /// Returns `None` while the element is not attached to the view hierarchy
    /// (not yet mounted, or already detached).
    fn find_node_handle(&self, node: &Self::Node) -> Option<InputId>;

    /// The text input element that holds native focus right now, if any.
    ///
    /// This reflects the platform's own view of focus and can already point
    /// at a different input than the one whose blur is being dispatched.
    fn currently_focused_input(&self) -> Option<Self::Node>;

    /// Identifier of the input that holds native focus right now.
    fn currently_focused_id(&self) -> Option<InputId> {
        self.currently_focused_input()
            .and_then(|node| self.find_node_handle(&node))
    }
}

impl<P: InputPlatform + ?Sized> InputPlatform for std::sync::Arc<P> {
    type Node = P::Node;

    fn find_node_handle(&self, node: &Self::Node) -> Option<InputId> {
        (**self).find_node_handle(node)
    }

    fn currently_focused_input(&self) -> Option<Self::Node> {
        (**self).currently_focused_input()
    }
}

impl<P: InputPlatform + ?Sized> InputPlatform for &P {
    type Node = P::Node;

    fn find_node_handle(&self, node: &Self::Node) -> Option<InputId> {
        (**self).find_node_handle(node)
    }

    fn currently_focused_input(&self) -> Option<Self::Node> {
        (**self).currently_focused_input()
    }
}
