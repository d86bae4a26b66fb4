//! Button presses on stored-file notifications.
//!
//! `exist` answers whether the file is still on disk. `remove` deletes it (or
//! notices it is already gone) and then cleans up the audit message: messages
//! older than [`EDIT_INSTEAD_OF_DELETE_AFTER_HOURS`] are edited in place,
//! newer ones deleted. Existence is re-read from the disk on every press, so
//! concurrent presses for the same file race between probe and removal.

use std::{io::ErrorKind, path::PathBuf, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
    callback::{Action, CallbackPayload},
    domain::MessageRef,
    formatting::escape_html,
    logging::{Logger, ThreadLogger},
    messaging::{port::MessagingPort, types::CallbackAnswer},
    storage::{self, FileState},
};

pub const EDIT_INSTEAD_OF_DELETE_AFTER_HOURS: i64 = 48;
pub const EXIST_ANSWER_CACHE: Duration = Duration::ZERO;
pub const REMOVE_ANSWER_CACHE: Duration = Duration::from_secs(60 * 60);

pub const CHECK_FAILED: &str = "Fail to check file.";
pub const REMOVE_FAILED: &str = "Fail to remove file.";

/// The message a button was attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PressedMessage {
    pub msg: MessageRef,
    /// Timestamp the platform stamped on the message.
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackContext {
    pub callback_id: String,
    pub data: String,
    /// Absent for very old or inline messages.
    pub message: Option<PressedMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Payload did not parse; nothing was done.
    Ignored,
    Handled(Action),
}

pub struct ActionRouter {
    save_path: PathBuf,
    messenger: Arc<dyn MessagingPort>,
    log: Arc<Logger>,
}

impl ActionRouter {
    pub fn new(save_path: PathBuf, messenger: Arc<dyn MessagingPort>, log: Arc<Logger>) -> Self {
        Self {
            save_path,
            messenger,
            log,
        }
    }

    pub async fn dispatch(&self, ctx: &CallbackContext, now: DateTime<Utc>) -> Dispatch {
        let Some(payload) = CallbackPayload::parse(&ctx.data) else {
            self.log
                .debug(format!("ignoring callback payload {:?}", ctx.data));
            return Dispatch::Ignored;
        };

        match payload.action {
            Action::Exist => self.exist(ctx, &payload.file).await,
            Action::Remove => self.remove(ctx, &payload.file, now).await,
        }
        Dispatch::Handled(payload.action)
    }

    async fn exist(&self, ctx: &CallbackContext, file: &str) {
        let log = self.log.thread("exist");
        let path = storage::stored_path(&self.save_path, file);

        let text = match storage::probe_read(&path).await {
            Ok(FileState::Exists) => format!("File {file} is exist."),
            Ok(FileState::Missing) => format!("File {file} isn't exist."),
            Err(e) => {
                log.error(format!("failed to check {}: {e}", path.display()));
                CHECK_FAILED.to_string()
            }
        };
        log.info(&text);

        self.answer(ctx, CallbackAnswer::alert(text, EXIST_ANSWER_CACHE), &log)
            .await;
    }

    async fn remove(&self, ctx: &CallbackContext, file: &str, now: DateTime<Utc>) {
        let log = self.log.thread("remove");
        let path = storage::stored_path(&self.save_path, file);

        let removed = match storage::probe_read_write(&path).await {
            Ok(FileState::Missing) => false,
            Ok(FileState::Exists) => match storage::remove(&path).await {
                Ok(()) => true,
                Err(e) if e.kind() == ErrorKind::NotFound => false,
                Err(e) => {
                    log.error(format!("failed to remove {}: {e}", path.display()));
                    self.answer(ctx, CallbackAnswer::alert(REMOVE_FAILED, Duration::ZERO), &log)
                        .await;
                    return;
                }
            },
            Err(e) => {
                log.error(format!("failed to probe {}: {e}", path.display()));
                self.answer(ctx, CallbackAnswer::alert(REMOVE_FAILED, Duration::ZERO), &log)
                    .await;
                return;
            }
        };

        let text = if removed {
            format!("File {file} has been removed.")
        } else {
            format!("File {file} has already been removed.")
        };
        log.info(&text);

        let cleanup = async {
            if let Some(pressed) = ctx.message {
                self.retire_message(pressed, file, now, &log).await;
            }
        };
        let ack = self.answer(ctx, CallbackAnswer::alert(text, REMOVE_ANSWER_CACHE), &log);
        tokio::join!(cleanup, ack);
    }

    /// Old messages can no longer be deleted by bots, so they are edited.
    async fn retire_message(
        &self,
        pressed: PressedMessage,
        file: &str,
        now: DateTime<Utc>,
        log: &ThreadLogger,
    ) {
        if is_expired(pressed.date, now) {
            let html = format!("File {} has been removed.", escape_html(file));
            if let Err(e) = self.messenger.edit_html(pressed.msg, &html).await {
                log.error(format!("failed to edit message {}: {e}", pressed.msg.message_id.0));
            }
        } else if let Err(e) = self.messenger.delete_message(pressed.msg).await {
            log.error(format!("failed to delete message {}: {e}", pressed.msg.message_id.0));
        }
    }

    async fn answer(&self, ctx: &CallbackContext, answer: CallbackAnswer, log: &ThreadLogger) {
        if let Err(e) = self
            .messenger
            .answer_callback_query(&ctx.callback_id, answer)
            .await
        {
            log.error(format!("failed to answer callback {}: {e}", ctx.callback_id));
        }
    }
}

/// Strictly older than the edit threshold.
pub fn is_expired(sent: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(sent) > chrono::Duration::hours(EDIT_INSTEAD_OF_DELETE_AFTER_HOURS)
}
