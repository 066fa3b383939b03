//! Per-sheet state shared with the text inputs mounted inside a sheet.
//!
//! A sheet provides its [`SheetContext`] while its content is built; every
//! text input built in that scope picks it up with [`use_sheet_context`].
//!
//! ```
//! use tessera_sheet_input::{SheetContext, provide_sheet_context, use_sheet_context};
//!
//! let sheet = SheetContext::new();
//! provide_sheet_context(sheet.clone(), || {
//!     let inner = use_sheet_context().expect("inside a sheet");
//!     assert_eq!(inner.id(), sheet.id());
//! });
//! assert!(use_sheet_context().is_err());
//! ```

use std::{
    cell::RefCell,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use thiserror::Error;

use crate::{input_registry::InputRegistry, keyboard_state::AnimatedKeyboardState};

static NEXT_SHEET_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier of one sheet instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SheetId(u64);

impl Default for SheetId {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetId {
    /// Allocates a new sheet identifier.
    pub fn new() -> Self {
        Self(NEXT_SHEET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet-{}", self.0)
    }
}

/// State one sheet shares with its text inputs.
///
/// Cloning is cheap; clones refer to the same registry and keyboard state.
#[derive(Clone, Debug, Default)]
pub struct SheetContext {
    id: SheetId,
    text_input_nodes: InputRegistry,
    keyboard_state: AnimatedKeyboardState,
}

impl SheetContext {
    /// Creates the context of a new sheet: empty registry, default keyboard
    /// state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context around an existing keyboard state, e.g. one owned
    /// by the host's keyboard listener.
    pub fn with_keyboard_state(keyboard_state: AnimatedKeyboardState) -> Self {
        Self {
            id: SheetId::new(),
            text_input_nodes: InputRegistry::new(),
            keyboard_state,
        }
    }

    /// The sheet instance this context belongs to.
    pub fn id(&self) -> SheetId {
        self.id
    }

    /// Inputs currently mounted in the sheet.
    pub fn text_input_nodes(&self) -> &InputRegistry {
        &self.text_input_nodes
    }

    /// The sheet's keyboard state.
    pub fn keyboard_state(&self) -> &AnimatedKeyboardState {
        &self.keyboard_state
    }
}

/// Errors raised when looking up the enclosing sheet.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SheetContextError {
    /// The caller is not inside any [`provide_sheet_context`] scope.
    #[error("sheet text inputs must be built inside a sheet")]
    OutsideSheet,
}

thread_local! {
    static SHEET_STACK: RefCell<Vec<SheetContext>> = const { RefCell::new(Vec::new()) };
}

/// Provides `context` to everything built inside `f` on the current thread.
///
/// Nested scopes shadow outer ones; the previous context is restored when
/// `f` returns or unwinds.
pub fn provide_sheet_context<F, R>(context: SheetContext, f: F) -> R
where
    F: FnOnce() -> R,
{
    struct SheetScopeGuard;
    impl Drop for SheetScopeGuard {
        fn drop(&mut self) {
            SHEET_STACK.with(|stack| {
                let popped = stack.borrow_mut().pop();
                debug_assert!(popped.is_some(), "Sheet context stack underflow");
            });
        }
    }

    tracing::trace!(sheet = %context.id(), "providing sheet context");
    SHEET_STACK.with(|stack| stack.borrow_mut().push(context));
    let guard = SheetScopeGuard;
    let result = f();
    drop(guard);
    result
}

/// Returns the innermost sheet context of the current thread.
pub fn use_sheet_context() -> Result<SheetContext, SheetContextError> {
    SHEET_STACK.with(|stack| {
        stack
            .borrow()
            .last()
            .cloned()
            .ok_or(SheetContextError::OutsideSheet)
    })
}
