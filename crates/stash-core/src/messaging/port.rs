use async_trait::async_trait;

use crate::{
    domain::{MessageRef, Recipient},
    messaging::types::{CallbackAnswer, SendOptions},
    Result,
};

/// Outbound side of the chat platform.
///
/// Every text is HTML; implementations set the parse mode accordingly.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(
        &self,
        to: &Recipient,
        html: &str,
        options: SendOptions,
    ) -> Result<MessageRef>;

    async fn edit_html(&self, msg: MessageRef, html: &str) -> Result<()>;

    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, answer: CallbackAnswer)
        -> Result<()>;
}
