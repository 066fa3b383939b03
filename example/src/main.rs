//! Walks a sheet with two text inputs through a typical keyboard session.
//!
//! Run with `RUST_LOG=tessera_sheet_input=trace` to see the bookkeeping.

use tessera_sheet_input::{
    AnimatedKeyboardState, FocusEvent, InputId, KeyboardState, KeyboardStatus, SheetContext,
    SheetTextInput, SheetTextInputArgs, provide_sheet_context, testing::ScriptedPlatform,
};

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new(
            "error,example=info,tessera_sheet_input=debug",
        ) {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    // The host keyboard listener owns the state and reports the keyboard.
    let keyboard_state = AnimatedKeyboardState::default();
    keyboard_state.write(|state| KeyboardState {
        status: KeyboardStatus::Shown,
        height: 291.0,
        ..state
    });

    // Stand-in for the sheet's layout engine.
    keyboard_state.subscribe(|state| match state.target {
        Some(owner) => tracing::info!(%owner, height = state.height, "sheet lifts above keyboard"),
        None => tracing::info!("sheet returns to its snap point"),
    });

    let sheet = SheetContext::with_keyboard_state(keyboard_state.clone());
    let platform = ScriptedPlatform::new();
    let email = platform.attached_node(InputId::new(1));
    let password = platform.attached_node(InputId::new(2));

    let args = SheetTextInputArgs::new()
        .on_focus(|event| tracing::info!(payload = %event.payload(), "user on_focus"))
        .on_blur(|event| tracing::info!(payload = %event.payload(), "user on_blur"));

    let (mut email_input, mut password_input) = provide_sheet_context(sheet.clone(), || {
        let email_input = SheetTextInput::within_sheet(platform.clone(), email, args.clone())?;
        let password_input =
            SheetTextInput::within_sheet(platform.clone(), password, args.clone())?;
        Ok::<_, tessera_sheet_input::SheetContextError>((email_input, password_input))
    })?;

    email_input.mount();
    platform.focus(email);
    email_input.handle_focus(&FocusEvent::gesture(InputId::new(1)))?;

    password_input.mount();
    tracing::info!(registry = ?sheet.text_input_nodes(), "both inputs mounted");

    // Tab to the password field; the email blur arrives late.
    platform.focus(password);
    password_input.handle_focus(&FocusEvent::new(serde_json::json!({
        "nativeEvent": { "target": 2, "eventCount": 1 }
    })))?;
    email_input.handle_blur(&FocusEvent::gesture(InputId::new(1)))?;
    tracing::info!(keyboard_target = ?keyboard_state.target(), "after late blur");

    drop(password_input);
    tracing::info!(
        keyboard_target = ?keyboard_state.target(),
        registry = ?sheet.text_input_nodes(),
        "password input unmounted"
    );

    if let Err(error) = email_input.handle_blur(&FocusEvent::new(serde_json::json!({
        "currentTarget": 1
    }))) {
        tracing::error!(%error, "event layer mismatch");
    }

    Ok(())
}
