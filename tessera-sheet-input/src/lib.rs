//! Keyboard focus coordination for text inputs hosted inside sheets.
//!
//! A sheet needs to know which of its text inputs owns the on-screen keyboard
//! so it can move its content out of the keyboard's way. This crate keeps that
//! knowledge consistent while inputs mount, unmount, gain and lose focus in
//! whatever order the host delivers those events.
//!
//! # Pieces
//!
//! - [`SheetContext`] is created once per sheet and bundles the sheet's
//!   [`InputRegistry`] with its [`AnimatedKeyboardState`].
//! - [`SheetTextInput`] is created once per text input and drives the
//!   mount / focus / blur / unmount protocol against that context.
//! - [`normalize_focus_event`] accepts focus and blur events from both the
//!   gesture-aware and the native input layer.
//! - [`InputPlatform`] is implemented by the host to resolve element handles
//!   and report which element holds native focus.
//!
//! # Example
//!
//! ```
//! use tessera_sheet_input::{
//!     FocusEvent, InputId, InputPlatform, SheetContext, SheetTextInput, SheetTextInputArgs,
//!     provide_sheet_context,
//! };
//!
//! #[derive(Clone, Copy)]
//! struct Host {
//!     focused: Option<u64>,
//! }
//!
//! impl InputPlatform for Host {
//!     type Node = u64;
//!
//!     fn find_node_handle(&self, node: &u64) -> Option<InputId> {
//!         Some(InputId::new(*node))
//!     }
//!
//!     fn currently_focused_input(&self) -> Option<u64> {
//!         self.focused
//!     }
//! }
//!
//! let sheet = SheetContext::new();
//! let (mut first, mut second) = provide_sheet_context(sheet.clone(), || {
//!     let args = SheetTextInputArgs::new().on_blur(|event| println!("blur: {event:?}"));
//!     let first = SheetTextInput::within_sheet(Host { focused: Some(2) }, 1, args.clone());
//!     let second = SheetTextInput::within_sheet(Host { focused: Some(2) }, 2, args);
//!     first.and_then(|first| Ok((first, second?)))
//! })?;
//! first.mount();
//! second.mount();
//!
//! first.handle_focus(&FocusEvent::gesture(InputId::new(1)))?;
//! second.handle_focus(&FocusEvent::gesture(InputId::new(2)))?;
//! // The late blur of the first input does not erase the second's target.
//! first.handle_blur(&FocusEvent::gesture(InputId::new(1)))?;
//! assert_eq!(sheet.keyboard_state().target(), Some(InputId::new(2)));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(missing_docs, clippy::unwrap_used)]

pub mod context;
pub mod event;
pub mod input_registry;
pub mod keyboard_state;
pub mod platform;
pub mod prop;
pub mod text_input;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::{
    context::{SheetContext, SheetContextError, SheetId, provide_sheet_context, use_sheet_context},
    event::{FocusEvent, FocusEventError, NormalizedFocusEvent, normalize_focus_event},
    input_registry::{InputId, InputRegistry},
    keyboard_state::{
        AnimatedKeyboardState, KeyboardEasing, KeyboardState, KeyboardStatus, SubscriptionId,
    },
    platform::InputPlatform,
    prop::EventCallback,
    text_input::{InputLifecycle, SheetTextInput, SheetTextInputArgs},
};
