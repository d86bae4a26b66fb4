use std::time::Duration;

use crate::{callback::CallbackPayload, domain::MessageId};

/// A single inline button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn for_payload(label: impl Into<String>, payload: &CallbackPayload) -> Self {
        Self {
            label: label.into(),
            callback_data: payload.encode(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendOptions {
    pub reply_to: Option<MessageId>,
    pub button: Option<InlineButton>,
    pub disable_link_preview: bool,
}

/// Reply to a button press.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackAnswer {
    pub text: Option<String>,
    pub show_alert: bool,
    /// How long clients may cache this answer.
    pub cache_time: Duration,
}

impl CallbackAnswer {
    /// Acknowledge without showing anything.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn alert(text: impl Into<String>, cache_time: Duration) -> Self {
        Self {
            text: Some(text.into()),
            show_alert: true,
            cache_time,
        }
    }
}
