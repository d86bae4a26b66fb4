use serde_json::Value;
use teloxide::types::{FileMeta, Message};

use stash_core::{
    archive::InboundMessage,
    attachment::{InboundMedia, MediaFile},
    domain::{ChatId, MessageId, UserId},
};

fn media_file<T: serde::Serialize>(meta: &FileMeta, raw: &T) -> MediaFile {
    MediaFile {
        file_id: meta.id.clone(),
        file_unique_id: meta.unique_id.clone(),
        // teloxide reports an absent size as 0.
        size: Some(u64::from(meta.size)).filter(|s| *s > 0),
        raw: serde_json::to_value(raw).unwrap_or(Value::Null),
    }
}

pub fn inbound_message(msg: &Message) -> InboundMessage {
    let media = InboundMedia {
        photo: msg
            .photo()
            .unwrap_or_default()
            .iter()
            .map(|p| media_file(&p.file, p))
            .collect(),
        sticker: msg.sticker().map(|s| media_file(&s.file, s)),
        audio: msg.audio().map(|a| media_file(&a.file, a)),
        voice: msg.voice().map(|v| media_file(&v.file, v)),
        video: msg.video().map(|v| media_file(&v.file, v)),
        document: msg.document().map(|d| media_file(&d.file, d)),
    };

    InboundMessage {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
        from: msg.from().map(|u| UserId(u.id.0 as i64)),
        media,
    }
}
