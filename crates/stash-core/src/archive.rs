//! Inbound media → stored file → notifications.

use std::sync::Arc;

use crate::{
    attachment::{self, InboundMedia},
    config::Config,
    domain::{ChatId, MessageId, Recipient, UserId},
    download::DownloadPipeline,
    errors::Error,
    formatting::{compose_notification, NotificationInput},
    logging::{Logger, ThreadLogger},
    messaging::{port::MessagingPort, types::SendOptions},
};

pub const RESOLVE_FAILED: &str = "Fail to resolve file.";
pub const DOWNLOAD_FAILED: &str = "Fail to download file.";

/// Platform-neutral view of an inbound message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub from: Option<UserId>,
    pub media: InboundMedia,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Chat is not on the allow-list.
    Ignored,
    NoAttachment,
    /// Download failed; the uploader was told.
    Failed,
    Stored { name: String },
}

pub struct ArchiveService {
    cfg: Arc<Config>,
    pipeline: DownloadPipeline,
    messenger: Arc<dyn MessagingPort>,
    log: Arc<Logger>,
}

impl ArchiveService {
    pub fn new(
        cfg: Arc<Config>,
        pipeline: DownloadPipeline,
        messenger: Arc<dyn MessagingPort>,
        log: Arc<Logger>,
    ) -> Self {
        Self {
            cfg,
            pipeline,
            messenger,
            log,
        }
    }

    pub async fn handle(&self, msg: &InboundMessage) -> ArchiveOutcome {
        if !self.cfg.is_enabled_chat(msg.chat_id) {
            self.log
                .debug(format!("ignoring message from chat {}", msg.chat_id.0));
            return ArchiveOutcome::Ignored;
        }

        let Some(att) = attachment::resolve(&msg.media) else {
            self.log.debug(format!(
                "message {} in chat {} has no attachment",
                msg.message_id.0, msg.chat_id.0
            ));
            return ArchiveOutcome::NoAttachment;
        };

        let log = self.log.thread("archive");
        log.info(format!(
            "{} {} from chat {}",
            att.kind.as_str(),
            att.file_id,
            msg.chat_id.0
        ));

        let name = match self.pipeline.download(&att.file_id, &log).await {
            Ok(name) => name,
            Err(e) => {
                log.error(format!("failed to store {}: {e}", att.file_id));
                let text = match e {
                    Error::Platform(_) => RESOLVE_FAILED,
                    _ => DOWNLOAD_FAILED,
                };
                self.reply_plain(msg, text, &log).await;
                return ArchiveOutcome::Failed;
            }
        };

        let public_url = self.cfg.public_file_url(&name);
        let notification = match compose_notification(&NotificationInput {
            from: msg.from,
            chat_id: msg.chat_id,
            attachment: &att,
            public_url: &public_url,
            file_name: &name,
        }) {
            Ok(n) => n,
            Err(e) => {
                log.error(format!("failed to compose notification for {name}: {e}"));
                return ArchiveOutcome::Stored { name };
            }
        };

        let origin = Recipient::from(msg.chat_id);
        let reply = self.messenger.send_html(
            &origin,
            &notification.text,
            SendOptions {
                reply_to: Some(msg.message_id),
                button: Some(notification.reply_button),
                disable_link_preview: true,
            },
        );
        let audit = self.messenger.send_html(
            &self.cfg.info_channel,
            &notification.text,
            SendOptions {
                reply_to: None,
                button: Some(notification.audit_button),
                disable_link_preview: true,
            },
        );

        let (reply, audit) = tokio::join!(reply, audit);
        if let Err(e) = reply {
            log.error(format!("failed to reply in chat {}: {e}", msg.chat_id.0));
        }
        if let Err(e) = audit {
            log.error(format!(
                "failed to notify audit channel {}: {e}",
                self.cfg.info_channel
            ));
        }

        ArchiveOutcome::Stored { name }
    }

    async fn reply_plain(&self, msg: &InboundMessage, text: &str, log: &ThreadLogger) {
        let options = SendOptions {
            reply_to: Some(msg.message_id),
            ..SendOptions::default()
        };
        if let Err(e) = self
            .messenger
            .send_html(&Recipient::from(msg.chat_id), text, options)
            .await
        {
            log.error(format!("failed to report failure: {e}"));
        }
    }
}
