//! Telegram update handlers.
//!
//! Handlers translate teloxide updates into `stash-core` values and hand them
//! to the archive service or the action router. They never fail the
//! dispatcher: every expected error is logged and answered in chat.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use stash_core::{
    domain::{ChatId, Recipient},
    messaging::types::SendOptions,
};

use crate::router::AppState;
mod callback;
mod media;

pub use media::inbound_message;

const USAGE: &str = "Send a photo, sticker, audio, voice, video or document. \
It will be stored and a link posted here.";

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    callback::handle_callback(q, state).await
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let chat_id = ChatId(msg.chat.id.0);

    if is_start_command(msg.text()) {
        if state.cfg.is_enabled_chat(chat_id) {
            let options = SendOptions {
                reply_to: Some(stash_core::domain::MessageId(msg.id.0)),
                ..SendOptions::default()
            };
            if let Err(e) = state
                .messenger
                .send_html(&Recipient::from(chat_id), USAGE, options)
                .await
            {
                state.log.error(format!("failed to send usage: {e}"));
            }
        }
        return Ok(());
    }

    state.archive.handle(&inbound_message(&msg)).await;
    Ok(())
}

/// `/start` or `/start@botname`, with or without arguments.
fn is_start_command(text: Option<&str>) -> bool {
    let Some(first) = text.and_then(|t| t.split_whitespace().next()) else {
        return false;
    };
    first == "/start" || first.starts_with("/start@")
}
