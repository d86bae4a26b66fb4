use std::sync::Arc;

use chrono::Utc;
use teloxide::{prelude::*, types::CallbackQuery};

use stash_core::{
    actions::{CallbackContext, Dispatch, PressedMessage},
    domain::{ChatId, MessageId, MessageRef},
    messaging::types::CallbackAnswer,
};

use crate::router::AppState;

pub async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(message) = q.message.as_ref() else {
        ignore(&q, &state).await;
        return Ok(());
    };

    let chat_id = ChatId(message.chat.id.0);
    if !state
        .cfg
        .admits_callback(chat_id, message.chat.username())
    {
        state
            .log
            .debug(format!("ignoring callback from chat {}", chat_id.0));
        ignore(&q, &state).await;
        return Ok(());
    }

    let ctx = CallbackContext {
        callback_id: q.id.clone(),
        data: q.data.clone().unwrap_or_default(),
        message: Some(PressedMessage {
            msg: MessageRef {
                chat_id,
                message_id: MessageId(message.id.0),
            },
            date: message.date,
        }),
    };

    if state.actions.dispatch(&ctx, Utc::now()).await == Dispatch::Ignored {
        ignore(&q, &state).await;
    }

    Ok(())
}

/// Stop the client-side spinner without telling the user anything.
async fn ignore(q: &CallbackQuery, state: &AppState) {
    if let Err(e) = state
        .messenger
        .answer_callback_query(&q.id, CallbackAnswer::empty())
        .await
    {
        state
            .log
            .warn(format!("failed to answer callback {}: {e}", q.id));
    }
}
