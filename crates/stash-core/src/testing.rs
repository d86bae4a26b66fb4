//! In-memory port fakes for unit tests.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicI32, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use reqwest::Url;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{
    domain::{ChatId, MessageId, MessageRef, Recipient},
    download::{Fetcher, FileSource},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{CallbackAnswer, SendOptions},
    },
    Result,
};

pub fn tmp_dir(prefix: &str) -> PathBuf {
    let ts = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = PathBuf::from(format!("/tmp/{prefix}-{}-{ts}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[derive(Default)]
pub struct FakeFileSource {
    urls: HashMap<String, String>,
}

impl FakeFileSource {
    pub fn with(file_id: &str, url: &str) -> Self {
        let mut urls = HashMap::new();
        urls.insert(file_id.to_string(), url.to_string());
        Self { urls }
    }
}

#[async_trait]
impl FileSource for FakeFileSource {
    async fn resolve_download_url(&self, file_id: &str) -> Result<Url> {
        let raw = self
            .urls
            .get(file_id)
            .ok_or_else(|| Error::Platform(format!("Bad Request: invalid file_id {file_id}")))?;
        Url::parse(raw).map_err(|e| Error::InvalidUrl(e.to_string()))
    }
}

pub struct FakeFetcher {
    body: Vec<u8>,
    fail: bool,
    urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new(body: &[u8]) -> Self {
        Self {
            body: body.to_vec(),
            fail: false,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(b"")
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &Url, dst: &mut (dyn AsyncWrite + Unpin + Send)) -> Result<u64> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail {
            return Err(Error::Http("connection reset".to_string()));
        }
        dst.write_all(&self.body).await?;
        Ok(self.body.len() as u64)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Send {
        to: Recipient,
        html: String,
        options: SendOptions,
    },
    Edit {
        msg: MessageRef,
        html: String,
    },
    Delete(MessageRef),
    Answer {
        callback_id: String,
        answer: CallbackAnswer,
    },
}

/// Records every outbound call. Sends to `fail_to` return a platform error.
#[derive(Default)]
pub struct RecordingMessenger {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI32,
    pub fail_to: Option<Recipient>,
}

impl RecordingMessenger {
    pub fn failing_sends_to(to: Recipient) -> Self {
        Self {
            fail_to: Some(to),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sends(&self) -> Vec<(Recipient, String, SendOptions)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { to, html, options } => Some((to, html, options)),
                _ => None,
            })
            .collect()
    }

    pub fn answers(&self) -> Vec<CallbackAnswer> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Answer { answer, .. } => Some(answer),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_html(
        &self,
        to: &Recipient,
        html: &str,
        options: SendOptions,
    ) -> Result<MessageRef> {
        self.calls.lock().unwrap().push(Call::Send {
            to: to.clone(),
            html: html.to_string(),
            options,
        });
        if self.fail_to.as_ref() == Some(to) {
            return Err(Error::Platform("Forbidden: bot is not a member".to_string()));
        }
        let chat_id = match to {
            Recipient::Id(id) => *id,
            Recipient::Username(_) => ChatId(0),
        };
        Ok(MessageRef {
            chat_id,
            message_id: MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
        })
    }

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Edit {
            msg,
            html: html.to_string(),
        });
        Ok(())
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Delete(msg));
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        answer: CallbackAnswer,
    ) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Answer {
            callback_id: callback_id.to_string(),
            answer,
        });
        Ok(())
    }
}
