//! Callback handles used in text input args and state listeners.
//!
//! ## Usage
//!
//! Wrap user focus/blur handlers in [`EventCallback`] and pass them through
//! [`SheetTextInputArgs`](crate::SheetTextInputArgs).

use std::sync::Arc;

use crate::event::FocusEvent;

/// Stable, comparable handle for a shared callable trait object.
///
/// `Slot` compares by identity (`Arc::ptr_eq`), so two args carrying the same
/// handler compare equal without comparing closures.
pub struct Slot<F: ?Sized> {
    inner: Arc<F>,
}

impl<F: ?Sized> Slot<F> {
    /// Create a slot from a shared callable trait object.
    pub fn from_shared(handler: Arc<F>) -> Self {
        Self { inner: handler }
    }

    /// Borrow the callable.
    pub fn get(&self) -> &F {
        &self.inner
    }
}

impl<F: ?Sized> Clone for Slot<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: ?Sized> PartialEq for Slot<F> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<F: ?Sized> Eq for Slot<F> {}

/// User handler for focus and blur events.
///
/// The handler receives the event exactly as the host delivered it, after the
/// sheet has finished its own bookkeeping.
#[derive(Clone, PartialEq, Eq)]
pub struct EventCallback {
    slot: Slot<dyn Fn(&FocusEvent) + Send + Sync>,
}

impl EventCallback {
    /// Create a callback handle from a closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&FocusEvent) + Send + Sync + 'static,
    {
        Self {
            slot: Slot::from_shared(Arc::new(handler)),
        }
    }

    /// Invoke the callback.
    pub fn call(&self, event: &FocusEvent) {
        (self.slot.get())(event);
    }
}

impl<F> From<F> for EventCallback
where
    F: Fn(&FocusEvent) + Send + Sync + 'static,
{
    fn from(handler: F) -> Self {
        Self::new(handler)
    }
}

impl std::fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EventCallback(..)")
    }
}
