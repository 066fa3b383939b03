//! # Sheet Text Input
//!
//! Keeps a sheet's keyboard target in sync with the text inputs mounted
//! inside it.
//!
//! ## Protocol
//!
//! - **mount**: the input's identifier is added to the sheet's
//!   [`InputRegistry`](crate::InputRegistry) once the platform can resolve it.
//! - **focus**: the input becomes the keyboard target.
//! - **blur**: the target is cleared if it still points at this input, unless
//!   native focus has already moved to a sibling input of the same sheet.
//! - **unmount**: the target is released if this input owns it and the
//!   identifier leaves the registry. Dropping the controller unmounts it.
//!
//! Blur events are not ordered relative to the focus of the next input.
//! Tabbing from `A` to `B` can deliver `A.focus`, `B.focus`, `A.blur`; the
//! sibling check keeps `A.blur` from erasing the target `B` just wrote.
//!
//! ## Usage
//!
//! ```
//! use tessera_sheet_input::{
//!     FocusEvent, InputId, InputPlatform, SheetContext, SheetTextInput, SheetTextInputArgs,
//! };
//!
//! struct AlwaysAttached;
//!
//! impl InputPlatform for AlwaysAttached {
//!     type Node = u64;
//!
//!     fn find_node_handle(&self, node: &u64) -> Option<InputId> {
//!         Some(InputId::new(*node))
//!     }
//!
//!     fn currently_focused_input(&self) -> Option<u64> {
//!         None
//!     }
//! }
//!
//! let sheet = SheetContext::new();
//! let mut input = SheetTextInput::new(sheet.clone(), AlwaysAttached, 5, SheetTextInputArgs::default());
//! input.mount();
//!
//! input.handle_focus(&FocusEvent::gesture(InputId::new(5)))?;
//! assert_eq!(sheet.keyboard_state().target(), Some(InputId::new(5)));
//!
//! input.handle_blur(&FocusEvent::native(InputId::new(5)))?;
//! assert_eq!(sheet.keyboard_state().target(), None);
//! # Ok::<(), tessera_sheet_input::FocusEventError>(())
//! ```

use crate::{
    context::{SheetContext, SheetContextError, use_sheet_context},
    event::{FocusEvent, FocusEventError, NormalizedFocusEvent, normalize_focus_event},
    input_registry::InputId,
    platform::InputPlatform,
    prop::EventCallback,
};

/// Configuration arguments for a [`SheetTextInput`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetTextInputArgs {
    /// Invoked with the original event after the input became the keyboard
    /// target.
    pub on_focus: Option<EventCallback>,
    /// Invoked with the original event after blur bookkeeping, whether or
    /// not the target was cleared.
    pub on_blur: Option<EventCallback>,
}

impl SheetTextInputArgs {
    /// Creates args without user callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the focus callback.
    pub fn on_focus<F>(mut self, on_focus: F) -> Self
    where
        F: Fn(&FocusEvent) + Send + Sync + 'static,
    {
        self.on_focus = Some(EventCallback::new(on_focus));
        self
    }

    /// Sets the focus callback using a shared callback.
    pub fn on_focus_shared(mut self, on_focus: impl Into<EventCallback>) -> Self {
        self.on_focus = Some(on_focus.into());
        self
    }

    /// Sets the blur callback.
    pub fn on_blur<F>(mut self, on_blur: F) -> Self
    where
        F: Fn(&FocusEvent) + Send + Sync + 'static,
    {
        self.on_blur = Some(EventCallback::new(on_blur));
        self
    }

    /// Sets the blur callback using a shared callback.
    pub fn on_blur_shared(mut self, on_blur: impl Into<EventCallback>) -> Self {
        self.on_blur = Some(on_blur.into());
        self
    }
}

/// Where a [`SheetTextInput`] is in its mount/focus life cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputLifecycle {
    /// Built, but the platform could not resolve its identifier yet.
    Unregistered,
    /// Present in the sheet's registry.
    Registered(InputId),
    /// Registered and holding focus.
    Focused(InputId),
    /// Torn down; terminal.
    Unmounted,
}

/// Focus synchronization controller of one text input mounted in a sheet.
pub struct SheetTextInput<P: InputPlatform> {
    sheet: SheetContext,
    platform: P,
    node: P::Node,
    args: SheetTextInputArgs,
    registered: Option<InputId>,
    focused: bool,
    unmounted: bool,
}

impl<P: InputPlatform> SheetTextInput<P> {
    /// Creates the controller of `node` inside `sheet`.
    ///
    /// Nothing is registered until [`mount`](Self::mount) runs.
    pub fn new(sheet: SheetContext, platform: P, node: P::Node, args: SheetTextInputArgs) -> Self {
        Self {
            sheet,
            platform,
            node,
            args,
            registered: None,
            focused: false,
            unmounted: false,
        }
    }

    /// Creates the controller of `node` inside the sheet currently provided
    /// with [`provide_sheet_context`](crate::provide_sheet_context).
    pub fn within_sheet(
        platform: P,
        node: P::Node,
        args: SheetTextInputArgs,
    ) -> Result<Self, SheetContextError> {
        let sheet = use_sheet_context()?;
        Ok(Self::new(sheet, platform, node, args))
    }

    /// The platform element backing this input.
    pub fn node(&self) -> &P::Node {
        &self.node
    }

    /// The sheet this input lives in.
    pub fn sheet(&self) -> &SheetContext {
        &self.sheet
    }

    /// Current args.
    pub fn args(&self) -> &SheetTextInputArgs {
        &self.args
    }

    /// Replaces the args, e.g. when the input is rebuilt with new callbacks.
    pub fn set_args(&mut self, args: SheetTextInputArgs) {
        self.args = args;
    }

    /// The identifier this input is registered under.
    pub fn id(&self) -> Option<InputId> {
        self.registered
    }

    /// Whether this input received focus and has not been blurred since.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Current life cycle state.
    pub fn lifecycle(&self) -> InputLifecycle {
        match (self.unmounted, self.registered) {
            (true, _) => InputLifecycle::Unmounted,
            (false, None) => InputLifecycle::Unregistered,
            (false, Some(id)) if self.focused => InputLifecycle::Focused(id),
            (false, Some(id)) => InputLifecycle::Registered(id),
        }
    }

    /// Registers the input with its sheet.
    ///
    /// Call on every commit. While the platform cannot resolve the element
    /// this does nothing; once registered, further calls are no-ops.
    /// Returns the registered identifier.
    pub fn mount(&mut self) -> Option<InputId> {
        if self.unmounted {
            return None;
        }
        if self.registered.is_some() {
            return self.registered;
        }

        let Some(id) = self.platform.find_node_handle(&self.node) else {
            tracing::trace!(sheet = %self.sheet.id(), "text input not attached yet");
            return None;
        };
        self.sheet.text_input_nodes().register(id);
        self.registered = Some(id);
        Some(id)
    }

    /// Handles a focus event from either event layer.
    ///
    /// The reported input becomes the sheet's keyboard target, then the user
    /// focus callback receives `event` unchanged. An event of unknown shape
    /// is returned as an error before anything else happens.
    pub fn handle_focus(&mut self, event: &FocusEvent) -> Result<(), FocusEventError> {
        let NormalizedFocusEvent { target } = normalize_focus_event(event)?;
        if self.unmounted {
            tracing::trace!(input = %target, "focus after unmount ignored");
            return Ok(());
        }

        self.sheet
            .keyboard_state()
            .write(|state| state.with_target(Some(target)));
        self.focused = true;

        if let Some(on_focus) = &self.args.on_focus {
            on_focus.call(event);
        }
        Ok(())
    }

    /// Handles a blur event from either event layer.
    ///
    /// The keyboard target is cleared only if it still points at the
    /// reported input and native focus has not moved to another input of
    /// the same sheet. The user blur callback receives `event` unchanged
    /// either way.
    pub fn handle_blur(&mut self, event: &FocusEvent) -> Result<(), FocusEventError> {
        let NormalizedFocusEvent { target } = normalize_focus_event(event)?;
        if self.unmounted {
            tracing::trace!(input = %target, "blur after unmount ignored");
            return Ok(());
        }
        if self.registered.is_none_or(|id| id == target) {
            self.focused = false;
        }

        let keyboard_state = self.sheet.keyboard_state();
        let current_target = keyboard_state.target();
        let live_focused = self.platform.currently_focused_id();

        // Only remove the target if it belongs to this input and native focus
        // did not already land on a sibling of the same sheet.
        let should_remove_current_target = current_target == Some(target);
        let should_ignore_blur_event =
            live_focused.is_some_and(|id| self.sheet.text_input_nodes().contains(id));

        if should_remove_current_target && !should_ignore_blur_event {
            keyboard_state.release_target(target);
        } else if should_remove_current_target {
            tracing::trace!(
                input = %target,
                live_focused = ?live_focused,
                "blur ignored, focus moved to a sibling input"
            );
        }

        if let Some(on_blur) = &self.args.on_blur {
            on_blur.call(event);
        }
        Ok(())
    }

    /// Tears the input down: releases the keyboard target if this input owns
    /// it and removes it from the sheet's registry.
    ///
    /// Idempotent, and run automatically on drop. If the platform already
    /// detached the element nothing is touched: its identifier may already
    /// belong to another input.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        self.focused = false;

        self.registered = None;
        let Some(id) = self.platform.find_node_handle(&self.node) else {
            tracing::trace!(sheet = %self.sheet.id(), "unmounted text input is not attached");
            return;
        };

        self.sheet.keyboard_state().release_target(id);
        self.sheet.text_input_nodes().unregister(id);
    }
}

impl<P: InputPlatform> Drop for SheetTextInput<P> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<P: InputPlatform> std::fmt::Debug for SheetTextInput<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetTextInput")
            .field("sheet", &self.sheet.id())
            .field("lifecycle", &self.lifecycle())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;

    use super::{InputLifecycle, SheetTextInput, SheetTextInputArgs};
    use crate::{
        context::{SheetContext, SheetContextError, provide_sheet_context},
        event::{FocusEvent, FocusEventError},
        input_registry::InputId,
        keyboard_state::{AnimatedKeyboardState, KeyboardState, KeyboardStatus},
        testing::{NodeRef, ScriptedPlatform},
    };

    const A: InputId = InputId::new(1);
    const B: InputId = InputId::new(2);

    struct Harness {
        sheet: SheetContext,
        platform: ScriptedPlatform,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                sheet: SheetContext::new(),
                platform: ScriptedPlatform::new(),
            }
        }

        fn input(&self, id: InputId) -> SheetTextInput<ScriptedPlatform> {
            self.input_with(id, SheetTextInputArgs::default())
        }

        fn input_with(
            &self,
            id: InputId,
            args: SheetTextInputArgs,
        ) -> SheetTextInput<ScriptedPlatform> {
            let node = self.platform.attached_node(id);
            SheetTextInput::new(self.sheet.clone(), self.platform.clone(), node, args)
        }

        fn target(&self) -> Option<InputId> {
            self.sheet.keyboard_state().target()
        }

        fn registry(&self) -> Vec<InputId> {
            self.sheet.text_input_nodes().ids()
        }
    }

    fn recorder() -> (
        Arc<Mutex<Vec<FocusEvent>>>,
        impl Fn(&FocusEvent) + Clone + Send + Sync + 'static,
    ) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        (events, move |event: &FocusEvent| sink.lock().push(event.clone()))
    }

    #[test]
    fn mount_registers_and_unmount_unregisters() {
        let harness = Harness::new();
        let mut input = harness.input(A);
        assert_eq!(input.lifecycle(), InputLifecycle::Unregistered);

        assert_eq!(input.mount(), Some(A));
        assert_eq!(input.mount(), Some(A));
        assert_eq!(harness.registry(), vec![A]);
        assert_eq!(input.lifecycle(), InputLifecycle::Registered(A));

        input.unmount();
        input.unmount();
        assert!(harness.registry().is_empty());
        assert_eq!(input.lifecycle(), InputLifecycle::Unmounted);
        assert_eq!(input.mount(), None);
    }

    #[test]
    fn mount_retries_until_the_node_is_attached() {
        let harness = Harness::new();
        let node = harness.platform.create_node();
        let mut input = SheetTextInput::new(
            harness.sheet.clone(),
            harness.platform.clone(),
            node,
            SheetTextInputArgs::default(),
        );

        assert_eq!(input.mount(), None);
        assert!(harness.registry().is_empty());

        harness.platform.attach(node, A);
        assert_eq!(input.mount(), Some(A));
        assert_eq!(harness.registry(), vec![A]);
    }

    #[test]
    fn focus_sets_the_target() {
        let harness = Harness::new();
        let mut input = harness.input(A);
        input.mount();

        input.handle_focus(&FocusEvent::gesture(A)).unwrap();
        assert_eq!(harness.target(), Some(A));
        assert_eq!(input.lifecycle(), InputLifecycle::Focused(A));

        input.handle_focus(&FocusEvent::native(B)).unwrap();
        assert_eq!(harness.target(), Some(B));
    }

    #[test]
    fn blur_for_another_input_leaves_the_target() {
        let harness = Harness::new();
        let mut input = harness.input(A);
        input.mount();
        input.handle_focus(&FocusEvent::gesture(A)).unwrap();

        input.handle_blur(&FocusEvent::gesture(B)).unwrap();
        assert_eq!(harness.target(), Some(A));
        assert_eq!(input.lifecycle(), InputLifecycle::Focused(A));
    }

    #[test]
    fn blur_clears_the_matching_target() {
        let harness = Harness::new();
        let mut input = harness.input(A);
        input.mount();
        input.handle_focus(&FocusEvent::gesture(A)).unwrap();

        harness.platform.clear_focus();
        input.handle_blur(&FocusEvent::native(A)).unwrap();
        assert_eq!(harness.target(), None);
        assert_eq!(input.lifecycle(), InputLifecycle::Registered(A));
    }

    #[test]
    fn blur_is_ignored_when_focus_moved_to_a_sibling() {
        let harness = Harness::new();
        let mut first = harness.input(A);
        let mut second = harness.input(B);
        first.mount();
        second.mount();

        first.handle_focus(&FocusEvent::gesture(A)).unwrap();
        second.handle_focus(&FocusEvent::gesture(B)).unwrap();
        harness.platform.focus(*second.node());

        // Late blur for A after B already took over, with the stored target
        // still pointing at A (B's focus write raced behind the blur).
        harness
            .sheet
            .keyboard_state()
            .write(|state| state.with_target(Some(A)));
        first.handle_blur(&FocusEvent::gesture(A)).unwrap();
        assert_eq!(harness.target(), Some(A));

        harness
            .sheet
            .keyboard_state()
            .write(|state| state.with_target(Some(B)));
        first.handle_blur(&FocusEvent::gesture(A)).unwrap();
        assert_eq!(harness.target(), Some(B));
    }

    #[test]
    fn blur_clears_when_focus_moved_outside_the_sheet() {
        let harness = Harness::new();
        let mut input = harness.input(A);
        input.mount();
        input.handle_focus(&FocusEvent::gesture(A)).unwrap();

        let foreign = harness.platform.attached_node(InputId::new(99));
        harness.platform.focus(foreign);
        input.handle_blur(&FocusEvent::gesture(A)).unwrap();
        assert_eq!(harness.target(), None);
    }

    #[test]
    fn blur_clears_when_live_focus_cannot_be_resolved() {
        let harness = Harness::new();
        let mut input = harness.input(A);
        input.mount();
        input.handle_focus(&FocusEvent::gesture(A)).unwrap();

        let detached: NodeRef = harness.platform.create_node();
        harness.platform.focus(detached);
        input.handle_blur(&FocusEvent::gesture(A)).unwrap();
        assert_eq!(harness.target(), None);
    }

    #[test]
    fn unmount_releases_only_an_owned_target() {
        let harness = Harness::new();
        let mut first = harness.input(A);
        let mut second = harness.input(B);
        first.mount();
        second.mount();
        second.handle_focus(&FocusEvent::gesture(B)).unwrap();

        first.unmount();
        assert_eq!(harness.target(), Some(B));
        assert_eq!(harness.registry(), vec![B]);

        // Live focus is ignored on unmount.
        harness.platform.focus(*second.node());
        second.unmount();
        assert_eq!(harness.target(), None);
        assert!(harness.registry().is_empty());
    }

    #[test]
    fn drop_runs_unmount() {
        let harness = Harness::new();
        {
            let mut input = harness.input(A);
            input.mount();
            input.handle_focus(&FocusEvent::gesture(A)).unwrap();
            assert_eq!(harness.target(), Some(A));
        }
        assert_eq!(harness.target(), None);
        assert!(harness.registry().is_empty());
    }

    #[test]
    fn unmount_after_detach_leaves_a_recycled_id_alone() {
        let harness = Harness::new();
        let mut stale = harness.input(A);
        stale.mount();
        harness.platform.detach(*stale.node());

        // The platform hands the freed id to a new input.
        let mut recycled = harness.input(A);
        assert_eq!(recycled.mount(), Some(A));
        recycled.handle_focus(&FocusEvent::gesture(A)).unwrap();
        harness.platform.focus(*recycled.node());

        stale.unmount();
        assert_eq!(stale.lifecycle(), InputLifecycle::Unmounted);
        assert_eq!(harness.target(), Some(A));
        assert_eq!(harness.registry(), vec![A]);
        assert_eq!(recycled.lifecycle(), InputLifecycle::Focused(A));
    }

    #[test]
    fn events_after_unmount_are_ignored() {
        let harness = Harness::new();
        let (events, record) = recorder();
        let mut input = harness.input_with(A, SheetTextInputArgs::new().on_focus(record));
        input.mount();
        input.unmount();

        input.handle_focus(&FocusEvent::gesture(A)).unwrap();
        assert_eq!(harness.target(), None);
        assert!(events.lock().is_empty());
    }

    #[test]
    fn callbacks_receive_the_original_event() {
        let harness = Harness::new();
        let (focused, on_focus) = recorder();
        let (blurred, on_blur) = recorder();
        let mut input = harness.input_with(
            A,
            SheetTextInputArgs::new().on_focus(on_focus).on_blur(on_blur),
        );
        input.mount();

        let focus = FocusEvent::new(json!({ "nativeEvent": { "target": 1, "text": "" } }));
        input.handle_focus(&focus).unwrap();
        assert_eq!(*focused.lock(), vec![focus]);

        // Blur that leaves the target untouched still reaches the user.
        let blur = FocusEvent::new(json!({ "target": 2, "extra": true }));
        input.handle_blur(&blur).unwrap();
        assert_eq!(harness.target(), Some(A));
        assert_eq!(*blurred.lock(), vec![blur]);
    }

    #[test]
    fn replaced_args_take_effect_on_the_next_event() {
        let harness = Harness::new();
        let (stale, on_focus_stale) = recorder();
        let (fresh, on_focus_fresh) = recorder();
        let mut input = harness.input_with(A, SheetTextInputArgs::new().on_focus(on_focus_stale));
        input.mount();

        let args = SheetTextInputArgs::new().on_focus(on_focus_fresh);
        input.set_args(args.clone());
        assert_eq!(input.args(), &args);

        let focus = FocusEvent::gesture(A);
        input.handle_focus(&focus).unwrap();
        assert!(stale.lock().is_empty());
        assert_eq!(*fresh.lock(), vec![focus]);
    }

    #[test]
    fn unsupported_events_fail_without_side_effects() {
        let harness = Harness::new();
        let (events, record) = recorder();
        let mut input = harness.input_with(
            A,
            SheetTextInputArgs::new()
                .on_focus_shared(record.clone())
                .on_blur(record),
        );
        input.mount();
        input.handle_focus(&FocusEvent::gesture(A)).unwrap();
        events.lock().clear();

        let bogus = FocusEvent::new(json!({ "currentTarget": 1 }));
        assert!(matches!(
            input.handle_focus(&bogus),
            Err(FocusEventError::UnsupportedEventShape { .. })
        ));
        assert!(matches!(
            input.handle_blur(&bogus),
            Err(FocusEventError::UnsupportedEventShape { .. })
        ));
        assert_eq!(harness.target(), Some(A));
        assert!(input.is_focused());
        assert!(events.lock().is_empty());
    }

    #[test]
    fn target_writes_keep_the_host_keyboard_fields() {
        let keyboard_state = AnimatedKeyboardState::new(KeyboardState {
            status: KeyboardStatus::Shown,
            height: 280.0,
            ..KeyboardState::default()
        });
        let sheet = SheetContext::with_keyboard_state(keyboard_state.clone());
        let platform = ScriptedPlatform::new();
        let node = platform.attached_node(A);
        let mut input = SheetTextInput::new(sheet, platform, node, SheetTextInputArgs::new());
        input.mount();

        input.handle_focus(&FocusEvent::gesture(A)).unwrap();
        input.handle_blur(&FocusEvent::gesture(A)).unwrap();

        let snapshot = keyboard_state.read();
        assert_eq!(snapshot.status, KeyboardStatus::Shown);
        assert_eq!(snapshot.height, 280.0);
        assert_eq!(snapshot.target, None);
    }

    #[test]
    fn within_sheet_requires_a_provided_sheet() {
        let harness = Harness::new();
        let node = harness.platform.attached_node(A);

        let outside = SheetTextInput::within_sheet(
            harness.platform.clone(),
            node,
            SheetTextInputArgs::new(),
        );
        assert_eq!(outside.err(), Some(SheetContextError::OutsideSheet));

        let input = provide_sheet_context(harness.sheet.clone(), || {
            SheetTextInput::within_sheet(harness.platform.clone(), node, SheetTextInputArgs::new())
        });
        let mut input = input.unwrap();
        assert_eq!(input.sheet().id(), harness.sheet.id());
        input.mount();
        assert_eq!(harness.registry(), vec![A]);
    }

    #[test]
    fn tabbing_between_inputs_in_one_sheet() {
        let harness = Harness::new();
        assert!(harness.registry().is_empty());

        let mut a = harness.input(A);
        a.mount();
        assert_eq!(harness.registry(), vec![A]);

        harness.platform.focus(*a.node());
        a.handle_focus(&FocusEvent::gesture(A)).unwrap();
        assert_eq!(harness.target(), Some(A));

        let mut b = harness.input(B);
        b.mount();
        assert_eq!(harness.registry(), vec![A, B]);

        harness.platform.focus(*b.node());
        b.handle_focus(&FocusEvent::native(B)).unwrap();
        assert_eq!(harness.target(), Some(B));

        a.handle_blur(&FocusEvent::gesture(A)).unwrap();
        assert_eq!(harness.target(), Some(B));

        drop(b);
        assert_eq!(harness.target(), None);
        assert_eq!(harness.registry(), vec![A]);
    }
}
