//! Messages and the media they carry.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::markup::InlineKeyboardMarkup;
use crate::{Chat, ChatId, User};

/// A message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_chat: Option<Chat>,
    pub date: i64,
    pub chat: Chat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_group_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<MessageEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_entities: Option<Vec<MessageEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<Voice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dice: Option<Dice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_chat_members: Option<Vec<User>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_chat_member: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_message: Option<Box<MaybeInaccessibleMessage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl Message {
    /// Text of the message, falling back to the media caption.
    #[must_use]
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// The largest photo size, if the message carries a photo.
    #[must_use]
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo
            .as_ref()
            .and_then(|sizes| sizes.iter().max_by_key(|p| p.width.saturating_mul(p.height)))
    }
}

/// A message the bot can no longer access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InaccessibleMessage {
    pub chat: Chat,
    pub message_id: i64,
    /// Always 0 on the wire.
    pub date: i64,
}

/// Either a full [`Message`] or an [`InaccessibleMessage`].
///
/// The wire format carries no tag; `date == 0` marks the inaccessible case.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MaybeInaccessibleMessage {
    Message(Message),
    Inaccessible(InaccessibleMessage),
}

impl<'de> Deserialize<'de> for MaybeInaccessibleMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let value = Value::deserialize(deserializer)?;
        match value.get("date").and_then(Value::as_i64) {
            Some(0) => serde_json::from_value(value)
                .map(MaybeInaccessibleMessage::Inaccessible)
                .map_err(D::Error::custom),
            Some(_) => serde_json::from_value(value)
                .map(MaybeInaccessibleMessage::Message)
                .map_err(D::Error::custom),
            None => Err(D::Error::custom(
                "message has no integer `date`; cannot tell accessible from inaccessible",
            )),
        }
    }
}

/// Identifier of a sent message, returned by `copyMessage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageId {
    pub message_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageEntityKind {
    Mention,
    Hashtag,
    Cashtag,
    BotCommand,
    Url,
    Email,
    PhoneNumber,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Blockquote,
    ExpandableBlockquote,
    Code,
    Pre,
    TextLink,
    TextMention,
    CustomEmoji,
}

/// A special span in message text (hashtag, link, bold run, ...).
///
/// Offsets and lengths are in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    #[serde(rename = "type")]
    pub kind: MessageEntityKind,
    pub offset: i64,
    pub length: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_emoji_id: Option<String>,
}

impl MessageEntity {
    #[must_use]
    pub fn new(kind: MessageEntityKind, offset: i64, length: i64) -> Self {
        Self {
            kind,
            offset,
            length,
            url: None,
            user: None,
            language: None,
            custom_emoji_id: None,
        }
    }
}

/// Which message an outgoing message replies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyParameters {
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<ChatId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_sending_without_reply: Option<bool>,
}

impl ReplyParameters {
    #[must_use]
    pub fn to(message_id: i64) -> Self {
        Self {
            message_id,
            chat_id: None,
            allow_sending_without_reply: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: i64,
    pub height: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    pub file_unique_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audio {
    pub file_id: String,
    pub file_unique_id: String,
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub file_id: String,
    pub file_unique_id: String,
    pub width: i64,
    pub height: i64,
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PhotoSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub file_id: String,
    pub file_unique_id: String,
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(serialize_with = "finite::serialize")]
    pub latitude: f64,
    #[serde(serialize_with = "finite::serialize")]
    pub longitude: f64,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "finite::serialize_option"
    )]
    pub horizontal_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proximity_alert_radius: Option<i64>,
}

/// An animated emoji with a random value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    pub emoji: String,
    pub value: i64,
}

/// `serde_json` writes NaN and infinities as `null`; these refuse them instead.
pub(crate) mod finite {
    use serde::Serializer;
    use serde::ser::Error;

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub(crate) fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            Err(S::Error::custom(format!("non-finite float {value}")))
        }
    }

    #[allow(clippy::ref_option)]
    pub(crate) fn serialize_option<S: Serializer>(
        value: &Option<f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_message_json() -> Value {
        json!({
            "message_id": 1,
            "from": {"id": 1, "is_bot": true, "first_name": "test", "username": "test"},
            "date": 1,
            "chat": {"id": 1, "type": "private", "username": "test", "first_name": "test"},
            "text": "test"
        })
    }

    #[test]
    fn message_roundtrip_is_exact() {
        let source = sample_message_json();
        let message: Message = serde_json::from_value(source.clone()).unwrap();

        assert_eq!(
            message.from.as_ref().and_then(|u| u.username.as_deref()),
            Some("test")
        );
        assert_eq!(message.text_or_caption(), Some("test"));
        assert_eq!(serde_json::to_value(&message).unwrap(), source);
    }

    #[test]
    fn message_from_raw_text_roundtrip() {
        let raw = r#"{"message_id":1,"from":{"id":1,"is_bot":true,"first_name":"test","username":"test"},"date":1,"chat":{"id":1,"type":"private","username":"test","first_name":"test"},"text":"test"}"#;
        let message: Message = serde_json::from_str(raw).unwrap();
        let reparsed: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_value(&message).unwrap(), reparsed);
    }

    #[test]
    fn nested_reply_and_entities() {
        let mut source = sample_message_json();
        source["reply_to_message"] = sample_message_json();
        source["entities"] = json!([{"type": "bot_command", "offset": 0, "length": 4}]);

        let message: Message = serde_json::from_value(source.clone()).unwrap();
        let reply = message.reply_to_message.as_deref().unwrap();
        assert_eq!(reply.message_id, 1);
        assert_eq!(
            message.entities.as_ref().unwrap()[0].kind,
            MessageEntityKind::BotCommand
        );
        assert_eq!(serde_json::to_value(&message).unwrap(), source);
    }

    #[test]
    fn message_missing_chat_fails() {
        let mut source = sample_message_json();
        source.as_object_mut().unwrap().remove("chat");
        let err = serde_json::from_value::<Message>(source).unwrap_err();
        assert!(err.to_string().contains("chat"));
    }

    #[test]
    fn largest_photo_by_area() {
        let mut source = sample_message_json();
        source["photo"] = json!([
            {"file_id": "a", "file_unique_id": "ua", "width": 90, "height": 60},
            {"file_id": "b", "file_unique_id": "ub", "width": 1280, "height": 853},
            {"file_id": "c", "file_unique_id": "uc", "width": 320, "height": 213}
        ]);
        let message: Message = serde_json::from_value(source).unwrap();
        assert_eq!(message.largest_photo().unwrap().file_id, "b");
    }

    #[test]
    fn maybe_inaccessible_uses_date() {
        let inaccessible: MaybeInaccessibleMessage = serde_json::from_value(json!({
            "chat": {"id": 5, "type": "group", "title": "g"},
            "message_id": 9,
            "date": 0
        }))
        .unwrap();
        assert!(matches!(
            inaccessible,
            MaybeInaccessibleMessage::Inaccessible(InaccessibleMessage { message_id: 9, .. })
        ));

        let accessible: MaybeInaccessibleMessage =
            serde_json::from_value(sample_message_json()).unwrap();
        assert!(matches!(accessible, MaybeInaccessibleMessage::Message(_)));
        assert_eq!(
            serde_json::to_value(&accessible).unwrap(),
            sample_message_json()
        );
    }

    #[test]
    fn maybe_inaccessible_without_date_fails() {
        let result = serde_json::from_value::<MaybeInaccessibleMessage>(json!({
            "chat": {"id": 5, "type": "group"},
            "message_id": 9
        }));
        assert!(result.is_err());
    }

    #[test]
    fn largest_photo_with_huge_dimensions() {
        let mut source = sample_message_json();
        source["photo"] = json!([
            {"file_id": "small", "file_unique_id": "s", "width": 90, "height": 90},
            {"file_id": "huge", "file_unique_id": "h", "width": i64::MAX, "height": i64::MAX}
        ]);
        let message: Message = serde_json::from_value(source).unwrap();
        assert_eq!(message.largest_photo().unwrap().file_id, "huge");
    }

    #[test]
    fn location_refuses_non_finite_coordinates() {
        let mut location: Location =
            serde_json::from_value(json!({"latitude": 51.5, "longitude": -0.12})).unwrap();
        assert_eq!(
            serde_json::to_value(&location).unwrap(),
            json!({"latitude": 51.5, "longitude": -0.12})
        );

        location.horizontal_accuracy = Some(f64::INFINITY);
        assert!(serde_json::to_value(&location).is_err());

        location.horizontal_accuracy = None;
        location.latitude = f64::NAN;
        let err = serde_json::to_value(&location).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }
}
