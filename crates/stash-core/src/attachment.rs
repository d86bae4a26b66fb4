//! Picking the downloadable attachment out of an inbound message.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Photo,
    Sticker,
    Audio,
    Voice,
    Video,
    Document,
}

impl AttachmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Sticker => "sticker",
            Self::Audio => "audio",
            Self::Voice => "voice",
            Self::Video => "video",
            Self::Document => "document",
        }
    }
}

/// One media object as offered by the platform.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaFile {
    pub file_id: String,
    pub file_unique_id: String,
    pub size: Option<u64>,
    /// The platform's own JSON for this object, echoed in notifications.
    pub raw: serde_json::Value,
}

/// Media carried by an inbound message, one slot per kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InboundMedia {
    /// Every resolution variant of a photo, in platform order.
    pub photo: Vec<MediaFile>,
    pub sticker: Option<MediaFile>,
    pub audio: Option<MediaFile>,
    pub voice: Option<MediaFile>,
    pub video: Option<MediaFile>,
    pub document: Option<MediaFile>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub file_id: String,
    pub file_unique_id: String,
    pub size: Option<u64>,
    pub raw: serde_json::Value,
}

impl Attachment {
    fn from_media(kind: AttachmentKind, media: &MediaFile) -> Self {
        Self {
            kind,
            file_id: media.file_id.clone(),
            file_unique_id: media.file_unique_id.clone(),
            size: media.size,
            raw: media.raw.clone(),
        }
    }
}

/// Largest photo variant; on equal sizes the earlier one stays.
///
/// A variant only replaces the current pick when both sizes are known and
/// its own is strictly greater, so an unsized first variant is never
/// displaced.
pub fn largest_photo(variants: &[MediaFile]) -> Option<&MediaFile> {
    let mut best: Option<&MediaFile> = None;
    for v in variants {
        match best {
            None => best = Some(v),
            Some(b) if matches!((v.size, b.size), (Some(n), Some(m)) if n > m) => {
                best = Some(v)
            }
            Some(_) => {}
        }
    }
    best
}

/// First attachment in priority order: photo, sticker, audio, voice, video,
/// document.
pub fn resolve(media: &InboundMedia) -> Option<Attachment> {
    if let Some(photo) = largest_photo(&media.photo) {
        return Some(Attachment::from_media(AttachmentKind::Photo, photo));
    }

    let ordered = [
        (AttachmentKind::Sticker, &media.sticker),
        (AttachmentKind::Audio, &media.audio),
        (AttachmentKind::Voice, &media.voice),
        (AttachmentKind::Video, &media.video),
        (AttachmentKind::Document, &media.document),
    ];

    ordered.into_iter().find_map(|(kind, slot)| {
        slot.as_ref()
            .map(|media| Attachment::from_media(kind, media))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, size: Option<u64>) -> MediaFile {
        MediaFile {
            file_id: id.to_string(),
            file_unique_id: format!("u-{id}"),
            size,
            raw: serde_json::json!({ "file_id": id }),
        }
    }

    #[test]
    fn picks_largest_photo_variant() {
        let media = InboundMedia {
            photo: vec![
                file("s", Some(100)),
                file("l", Some(900)),
                file("m", Some(400)),
            ],
            ..Default::default()
        };
        let att = resolve(&media).unwrap();
        assert_eq!(att.kind, AttachmentKind::Photo);
        assert_eq!(att.file_id, "l");
        assert_eq!(att.file_unique_id, "u-l");
        assert_eq!(att.size, Some(900));
    }

    #[test]
    fn equal_sizes_keep_first_encountered() {
        let variants = vec![
            file("a", Some(500)),
            file("b", Some(500)),
            file("c", Some(20)),
        ];
        assert_eq!(largest_photo(&variants).unwrap().file_id, "a");

        let unsized_first = vec![file("x", None), file("y", None)];
        assert_eq!(largest_photo(&unsized_first).unwrap().file_id, "x");

        let sized_later = vec![file("x", None), file("y", Some(1))];
        assert_eq!(largest_photo(&sized_later).unwrap().file_id, "x");
    }

    #[test]
    fn unsized_variant_in_the_middle_is_skipped() {
        let variants = vec![
            file("a", Some(10)),
            file("b", None),
            file("c", Some(30)),
        ];
        assert_eq!(largest_photo(&variants).unwrap().file_id, "c");
    }

    #[test]
    fn priority_order_breaks_ties_between_kinds() {
        let mut media = InboundMedia {
            document: Some(file("doc", None)),
            video: Some(file("vid", None)),
            voice: Some(file("voice", None)),
            audio: Some(file("aud", None)),
            sticker: Some(file("stk", None)),
            ..Default::default()
        };
        assert_eq!(resolve(&media).unwrap().kind, AttachmentKind::Sticker);

        media.sticker = None;
        assert_eq!(resolve(&media).unwrap().kind, AttachmentKind::Audio);
        media.audio = None;
        assert_eq!(resolve(&media).unwrap().kind, AttachmentKind::Voice);
        media.voice = None;
        assert_eq!(resolve(&media).unwrap().kind, AttachmentKind::Video);
        media.video = None;
        let att = resolve(&media).unwrap();
        assert_eq!(att.kind, AttachmentKind::Document);
        assert_eq!(att.file_id, "doc");

        media.photo = vec![file("p", Some(1))];
        assert_eq!(resolve(&media).unwrap().kind, AttachmentKind::Photo);
    }

    #[test]
    fn no_media_is_none_and_input_untouched() {
        assert_eq!(resolve(&InboundMedia::default()), None);

        let media = InboundMedia {
            photo: vec![file("a", Some(1)), file("b", Some(2))],
            ..Default::default()
        };
        let before = media.clone();
        let _ = resolve(&media);
        assert_eq!(media, before);
    }
}
