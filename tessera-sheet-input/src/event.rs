//! # Focus Event Normalization
//!
//! Text inputs inside a sheet can be backed by two different event layers:
//!
//! - the gesture-aware input layer reports focus and blur as `{ "target": 12 }`
//! - the native input layer reports a synthetic event shaped as
//!   `{ "nativeEvent": { "target": 12, .. }, .. }`
//!
//! [`normalize_focus_event`] turns either shape into a [`NormalizedFocusEvent`]
//! so the rest of the crate never has to care which layer produced it.
//!
//! ## Usage
//!
//! ```
//! use tessera_sheet_input::{FocusEvent, InputId, normalize_focus_event};
//!
//! let gesture = FocusEvent::gesture(InputId::new(7));
//! let native = FocusEvent::native(InputId::new(7));
//!
//! assert_eq!(normalize_focus_event(&gesture)?.target, InputId::new(7));
//! assert_eq!(normalize_focus_event(&native)?.target, InputId::new(7));
//! # Ok::<(), tessera_sheet_input::FocusEventError>(())
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::input_registry::InputId;

const TARGET_KEY: &str = "target";
const NATIVE_EVENT_KEY: &str = "nativeEvent";

/// A focus or blur event exactly as the host delivered it.
///
/// The payload is kept untouched so it can be forwarded to user callbacks in
/// the shape they expect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FocusEvent {
    payload: Value,
}

impl FocusEvent {
    /// Wraps a raw payload of unknown shape.
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// Builds an event in the gesture-layer shape.
    pub fn gesture(target: InputId) -> Self {
        Self::new(json!({ "target": target.get() }))
    }

    /// Builds an event in the native-layer shape.
    pub fn native(target: InputId) -> Self {
        Self::new(json!({ "nativeEvent": { "target": target.get() } }))
    }

    /// The raw payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Consumes the event and returns its raw payload.
    pub fn into_payload(self) -> Value {
        self.payload
    }
}

impl From<Value> for FocusEvent {
    fn from(payload: Value) -> Self {
        Self::new(payload)
    }
}

/// Canonical focus record produced for every focus or blur dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedFocusEvent {
    /// The input the event was reported for.
    pub target: InputId,
}

/// Errors raised while normalizing focus events.
#[derive(Debug, Error)]
pub enum FocusEventError {
    /// The payload matched neither the gesture nor the native event shape.
    ///
    /// This is an integration bug between the sheet and the event-producing
    /// layer and should never be retried.
    #[error("unsupported focus/blur event format: {payload}")]
    UnsupportedEventShape {
        /// The offending payload.
        payload: Value,
    },
}

/// Normalizes a focus or blur event into a [`NormalizedFocusEvent`].
///
/// Shapes are tried in order and the first match wins:
///
/// 1. a numeric top-level `target` (gesture layer)
/// 2. a `nativeEvent` object carrying a `target` (native layer)
///
/// Anything else is reported as [`FocusEventError::UnsupportedEventShape`].
pub fn normalize_focus_event(event: &FocusEvent) -> Result<NormalizedFocusEvent, FocusEventError> {
    let payload = event.payload();

    if let Some(target) = payload.get(TARGET_KEY).and_then(as_input_id) {
        return Ok(NormalizedFocusEvent { target });
    }

    // A present but malformed nested target cannot name an input either.
    if let Some(target) = payload
        .get(NATIVE_EVENT_KEY)
        .and_then(|native| native.get(TARGET_KEY))
        .and_then(as_input_id)
    {
        return Ok(NormalizedFocusEvent { target });
    }

    Err(FocusEventError::UnsupportedEventShape {
        payload: payload.clone(),
    })
}

fn as_input_id(value: &Value) -> Option<InputId> {
    value.as_u64().map(InputId::new)
}
