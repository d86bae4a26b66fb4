//! Telegram adapter (teloxide).
//!
//! This crate implements the `stash-core` ports over the Telegram Bot API and
//! hosts the webhook next to the static file directory.

use async_trait::async_trait;

use reqwest::Url;
use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, ParseMode},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use stash_core::{
    domain::{MessageId, MessageRef, Recipient},
    download::FileSource,
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{CallbackAnswer, SendOptions},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_recipient(to: &Recipient) -> teloxide::types::Recipient {
        match to {
            Recipient::Id(id) => teloxide::types::Recipient::Id(teloxide::types::ChatId(id.0)),
            Recipient::Username(name) => {
                teloxide::types::Recipient::ChannelUsername(name.clone())
            }
        }
    }

    fn tg_chat(msg: MessageRef) -> teloxide::types::ChatId {
        teloxide::types::ChatId(msg.chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Platform(format!("telegram error: {e}"))
    }

    /// Retries once on flood control; every other error is returned as is.
    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(
        &self,
        to: &Recipient,
        html: &str,
        options: SendOptions,
    ) -> Result<MessageRef> {
        let markup = options.button.map(|b| {
            InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
                b.label,
                b.callback_data,
            )]])
        });

        let msg = self
            .with_retry(|| {
                let mut req = self
                    .bot
                    .send_message(Self::tg_recipient(to), html.to_string())
                    .parse_mode(ParseMode::Html)
                    .disable_web_page_preview(options.disable_link_preview);
                if let Some(reply_to) = options.reply_to {
                    req = req.reply_to_message_id(Self::tg_msg_id(reply_to));
                }
                if let Some(m) = &markup {
                    req = req.reply_markup(m.clone());
                }
                req
            })
            .await?;

        Ok(MessageRef {
            chat_id: stash_core::domain::ChatId(msg.chat.id.0),
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .edit_message_text(
                    Self::tg_chat(msg),
                    Self::tg_msg_id(msg.message_id),
                    html.to_string(),
                )
                .parse_mode(ParseMode::Html)
        })
        .await?;
        Ok(())
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .delete_message(Self::tg_chat(msg), Self::tg_msg_id(msg.message_id))
        })
        .await?;
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        answer: CallbackAnswer,
    ) -> Result<()> {
        let cache_time = u32::try_from(answer.cache_time.as_secs()).unwrap_or(u32::MAX);
        self.with_retry(|| {
            let mut req = self
                .bot
                .answer_callback_query(callback_id.to_string())
                .show_alert(answer.show_alert)
                .cache_time(cache_time);
            if let Some(t) = &answer.text {
                req = req.text(t.clone());
            }
            req
        })
        .await?;
        Ok(())
    }
}

/// Resolves file ids through `getFile` into the bot's file download URL.
#[derive(Clone)]
pub struct TelegramFileSource {
    bot: Bot,
}

impl TelegramFileSource {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// `<api>/file/bot<token>/<path>`
pub fn file_download_url(api_url: &Url, token: &str, file_path: &str) -> Result<Url> {
    if api_url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(api_url.to_string()));
    }
    let mut url = api_url.clone();
    let base = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{base}/file/bot{token}/{file_path}"));
    Ok(url)
}

#[async_trait]
impl FileSource for TelegramFileSource {
    async fn resolve_download_url(&self, file_id: &str) -> Result<Url> {
        let file = self
            .bot
            .get_file(file_id.to_string())
            .await
            .map_err(TelegramMessenger::map_err)?;
        file_download_url(&self.bot.api_url(), self.bot.token(), &file.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_file_url_from_api_base() {
        let api: Url = "https://api.telegram.org".parse().unwrap();
        let url = file_download_url(&api, "123:abc", "photos/file_7.jpg").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.telegram.org/file/bot123:abc/photos/file_7.jpg"
        );
        assert_eq!(url.path(), "/file/bot123:abc/photos/file_7.jpg");
    }

    #[test]
    fn keeps_self_hosted_api_prefix() {
        let api: Url = "http://localhost:8081/tg/".parse().unwrap();
        let url = file_download_url(&api, "t", "documents/a.PDF").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8081/tg/file/bott/documents/a.PDF");
    }

    #[test]
    fn recipients_map_to_teloxide() {
        assert_eq!(
            TelegramMessenger::tg_recipient(&Recipient::Username("@audit".to_string())),
            teloxide::types::Recipient::ChannelUsername("@audit".to_string())
        );
        assert_eq!(
            TelegramMessenger::tg_recipient(&Recipient::Id(stash_core::domain::ChatId(-5))),
            teloxide::types::Recipient::Id(teloxide::types::ChatId(-5))
        );
    }
}
