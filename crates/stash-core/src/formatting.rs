use crate::{
    attachment::Attachment,
    callback::{Action, CallbackPayload},
    domain::{ChatId, UserId},
    messaging::types::InlineButton,
    Result,
};

/// Escape text for Telegram HTML parse mode.
///
/// Only `&`, `<` and `>` are replaced; values never land inside attributes.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub const EXIST_BUTTON_LABEL: &str = "Check file";
pub const REMOVE_BUTTON_LABEL: &str = "Remove file";

/// What a notification is about.
#[derive(Clone, Debug)]
pub struct NotificationInput<'a> {
    pub from: Option<UserId>,
    pub chat_id: ChatId,
    pub attachment: &'a Attachment,
    pub public_url: &'a str,
    pub file_name: &'a str,
}

/// Text plus the two button variants: one for the uploader's chat, one for
/// the audit channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub reply_button: InlineButton,
    pub audit_button: InlineButton,
}

pub fn compose_notification(input: &NotificationInput<'_>) -> Result<Notification> {
    let from = input
        .from
        .map(|u| u.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let dump = serde_json::to_string_pretty(&input.attachment.raw)?;

    let text = [
        format!("<b>From:</b> <code>{}</code>", escape_html(&from)),
        format!(
            "<b>To:</b> <code>{}</code>",
            escape_html(&input.chat_id.0.to_string())
        ),
        format!(
            "<b>File:</b> <code>{}</code> / <code>{}</code>",
            escape_html(&input.attachment.file_id),
            escape_html(&input.attachment.file_unique_id)
        ),
        format!("<b>URL:</b> {}", escape_html(input.public_url)),
        format!("<pre>{}</pre>", escape_html(&dump)),
    ]
    .join("\n");

    Ok(Notification {
        text,
        reply_button: InlineButton::for_payload(
            EXIST_BUTTON_LABEL,
            &CallbackPayload::new(Action::Exist, input.file_name),
        ),
        audit_button: InlineButton::for_payload(
            REMOVE_BUTTON_LABEL,
            &CallbackPayload::new(Action::Remove, input.file_name),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::AttachmentKind;

    fn attachment(file_id: &str) -> Attachment {
        Attachment {
            kind: AttachmentKind::Document,
            file_id: file_id.to_string(),
            file_unique_id: "AQAD".to_string(),
            size: Some(12),
            raw: serde_json::json!({ "file_name": "<b>&\"q\".txt" }),
        }
    }

    #[test]
    fn escapes_exactly_three_entities() {
        assert_eq!(escape_html("<b>&"), "&lt;b&gt;&amp;");
        assert_eq!(escape_html("\"it's\""), "\"it's\"");
        assert_eq!(escape_html("&amp;"), "&amp;amp;");
    }

    #[test]
    fn notification_escapes_interpolated_values() {
        let att = attachment("<b>&");
        let n = compose_notification(&NotificationInput {
            from: Some(UserId(7)),
            chat_id: ChatId(-100),
            attachment: &att,
            public_url: "https://x.test/files/abc123def.txt?a=1&b=2",
            file_name: "abc123def.txt",
        })
        .unwrap();

        assert!(n.text.contains("<code>&lt;b&gt;&amp;</code> / <code>AQAD</code>"));
        assert!(n.text.contains("https://x.test/files/abc123def.txt?a=1&amp;b=2"));
        assert!(n.text.contains("&lt;b&gt;&amp;\\\"q\\\".txt"));
        assert!(n.text.starts_with("<b>From:</b> <code>7</code>\n<b>To:</b> <code>-100</code>"));
        assert_eq!(n.text.lines().filter(|l| l.starts_with("<b>")).count(), 4);
    }

    #[test]
    fn buttons_carry_action_and_file_name() {
        let att = attachment("id");
        let n = compose_notification(&NotificationInput {
            from: None,
            chat_id: ChatId(1),
            attachment: &att,
            public_url: "u",
            file_name: "0123456789.png",
        })
        .unwrap();

        assert!(n.text.starts_with("<b>From:</b> <code>unknown</code>"));
        assert_eq!(n.reply_button.callback_data, "exist:0123456789.png");
        assert_eq!(n.audit_button.callback_data, "remove:0123456789.png");
        assert_eq!(n.reply_button.label, EXIST_BUTTON_LABEL);
    }
}
