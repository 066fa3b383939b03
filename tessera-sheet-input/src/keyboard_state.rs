//! # Keyboard State
//!
//! Shared keyboard state of one sheet instance.
//!
//! The host keyboard listener writes visibility, height and animation
//! parameters; sheet text inputs write [`KeyboardState::target`], the input
//! that currently owns the keyboard. The sheet's layout engine subscribes to
//! the state and repositions its content around the target.
//!
//! ## Functional updates
//!
//! All writes go through [`AnimatedKeyboardState::write`], which hands the
//! previous snapshot to a pure updater and stores the returned value while
//! holding the write lock. Two writers can therefore never interleave a
//! read-modify-write, and fields an updater does not mention are preserved.
//!
//! ```
//! use tessera_sheet_input::{AnimatedKeyboardState, InputId, KeyboardStatus};
//!
//! let state = AnimatedKeyboardState::default();
//! state.write(|state| tessera_sheet_input::KeyboardState {
//!     status: KeyboardStatus::Shown,
//!     height: 320.0,
//!     ..state
//! });
//! state.write(|state| state.with_target(Some(InputId::new(4))));
//!
//! let snapshot = state.read();
//! assert_eq!(snapshot.status, KeyboardStatus::Shown);
//! assert_eq!(snapshot.target, Some(InputId::new(4)));
//! ```

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{input_registry::InputId, prop::Slot};

/// Visibility of the platform keyboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyboardStatus {
    /// No keyboard event has been observed yet.
    #[default]
    Unknown,
    /// The keyboard is on screen.
    Shown,
    /// The keyboard is hidden.
    Hidden,
}

/// Easing reported by the platform for its keyboard animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyboardEasing {
    /// Constant speed.
    Linear,
    /// Accelerating.
    EaseIn,
    /// Decelerating.
    EaseOut,
    /// Accelerating then decelerating.
    EaseInEaseOut,
    /// The platform's own keyboard curve.
    #[default]
    Keyboard,
}

/// Snapshot of a sheet's keyboard state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyboardState {
    /// Platform keyboard visibility.
    pub status: KeyboardStatus,
    /// Keyboard height in logical pixels.
    pub height: f32,
    /// Duration of the platform keyboard animation.
    pub animation_duration: Duration,
    /// Easing of the platform keyboard animation.
    pub easing: KeyboardEasing,
    /// The input that owns the keyboard, if any.
    pub target: Option<InputId>,
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self {
            status: KeyboardStatus::Unknown,
            height: 0.0,
            animation_duration: Duration::ZERO,
            easing: KeyboardEasing::Keyboard,
            target: None,
        }
    }
}

impl KeyboardState {
    /// Returns a copy of `self` with `target` replaced.
    pub fn with_target(self, target: Option<InputId>) -> Self {
        Self { target, ..self }
    }
}

/// Identifies a listener registered with [`AnimatedKeyboardState::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

type Listener = Slot<dyn Fn(&KeyboardState) + Send + Sync>;

/// Shared, functionally updated keyboard state of one sheet.
///
/// Cloning yields another handle to the same state.
#[derive(Clone, Default)]
pub struct AnimatedKeyboardState {
    inner: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
    state: RwLock<KeyboardState>,
    listeners: Mutex<SmallVec<[(SubscriptionId, Listener); 2]>>,
}

impl AnimatedKeyboardState {
    /// Creates a state holder seeded with `initial`.
    pub fn new(initial: KeyboardState) -> Self {
        Self {
            inner: Arc::new(Shared {
                state: RwLock::new(initial),
                listeners: Mutex::default(),
            }),
        }
    }

    /// Returns the current snapshot.
    pub fn read(&self) -> KeyboardState {
        *self.inner.state.read()
    }

    /// Returns the input that currently owns the keyboard.
    pub fn target(&self) -> Option<InputId> {
        self.inner.state.read().target
    }

    /// Replaces the state with `updater(previous)`.
    ///
    /// The updater runs under the write lock and must not touch this state
    /// handle itself. Listeners are notified after the lock is released and
    /// only if the state changed. Returns the new snapshot.
    pub fn write<F>(&self, updater: F) -> KeyboardState
    where
        F: FnOnce(KeyboardState) -> KeyboardState,
    {
        let (previous, next) = {
            let mut state = self.inner.state.write();
            let previous = *state;
            let next = updater(previous);
            *state = next;
            (previous, next)
        };

        if previous != next {
            if previous.target != next.target {
                tracing::debug!(
                    from = ?previous.target,
                    to = ?next.target,
                    "keyboard target changed"
                );
            }
            self.notify(&next);
        }
        next
    }

    /// Clears the target if it still points at `id`.
    ///
    /// The comparison and the clear happen in one functional update, so a
    /// target written by another input in between is never erased. Returns
    /// `true` if the target was cleared.
    pub fn release_target(&self, id: InputId) -> bool {
        let mut released = false;
        self.write(|state| {
            if state.target == Some(id) {
                released = true;
                state.with_target(None)
            } else {
                state
            }
        });
        released
    }

    /// Registers a listener invoked with every new snapshot.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&KeyboardState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed));
        let listener: Listener = Slot::from_shared(Arc::new(listener));
        self.inner.listeners.lock().push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    fn notify(&self, state: &KeyboardState) {
        // Listeners may subscribe or unsubscribe while being notified.
        let listeners: SmallVec<[Listener; 2]> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            (listener.get())(state);
        }
    }

    /// Whether two handles point at the same state.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for AnimatedKeyboardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnimatedKeyboardState")
            .field(&self.read())
            .finish()
    }
}
