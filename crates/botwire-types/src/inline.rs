//! Inline queries and the results a bot answers them with.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::markup::InlineKeyboardMarkup;
use crate::message::{Location, MessageEntity, finite};
use crate::{ParseMode, User};

/// An incoming inline query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    pub query: String,
    pub offset: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Text content sent when an inline result is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputTextMessageContent {
    pub message_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<MessageEntity>>,
}

impl InputTextMessageContent {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            message_text: text.into(),
            parse_mode: None,
            entities: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineQueryResultArticle {
    pub id: String,
    pub title: String,
    pub input_message_content: InputTextMessageContent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// A photo hosted at a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineQueryResultPhoto {
    pub id: String,
    pub photo_url: String,
    pub thumbnail_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_message_content: Option<InputTextMessageContent>,
}

/// A photo already stored on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineQueryResultCachedPhoto {
    pub id: String,
    pub photo_file_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_message_content: Option<InputTextMessageContent>,
}

/// A document hosted at a URL (PDF or ZIP only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineQueryResultDocument {
    pub id: String,
    pub title: String,
    pub document_url: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineQueryResultCachedDocument {
    pub id: String,
    pub title: String,
    pub document_file_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineQueryResultLocation {
    pub id: String,
    #[serde(serialize_with = "finite::serialize")]
    pub latitude: f64,
    #[serde(serialize_with = "finite::serialize")]
    pub longitude: f64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_period: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// Concrete variant of an [`InlineQueryResult`] object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineQueryResultKind {
    Article,
    Photo,
    CachedPhoto,
    Document,
    CachedDocument,
    Location,
}

impl InlineQueryResultKind {
    /// Value of the `type` key for this kind. Cached and hosted variants share it.
    #[must_use]
    pub fn type_tag(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Photo | Self::CachedPhoto => "photo",
            Self::Document | Self::CachedDocument => "document",
            Self::Location => "location",
        }
    }
}

/// One result of an inline query answer.
///
/// Cached and hosted variants share a `type` tag on the wire, so the tag
/// alone does not pick the variant; see [`InlineQueryResult::classify`].
#[derive(Debug, Clone, PartialEq)]
pub enum InlineQueryResult {
    Article(InlineQueryResultArticle),
    Photo(InlineQueryResultPhoto),
    CachedPhoto(InlineQueryResultCachedPhoto),
    Document(InlineQueryResultDocument),
    CachedDocument(InlineQueryResultCachedDocument),
    Location(InlineQueryResultLocation),
}

impl InlineQueryResult {
    /// Pick the variant for a wire object from its `type` and which of the
    /// `*_file_id` / `*_url` keys it carries.
    #[must_use]
    pub fn classify(object: &Map<String, Value>) -> Option<InlineQueryResultKind> {
        let has = |key: &str| object.contains_key(key);
        match object.get("type").and_then(Value::as_str)? {
            "article" => Some(InlineQueryResultKind::Article),
            "photo" if has("photo_file_id") => Some(InlineQueryResultKind::CachedPhoto),
            "photo" if has("photo_url") => Some(InlineQueryResultKind::Photo),
            "document" if has("document_file_id") => Some(InlineQueryResultKind::CachedDocument),
            "document" if has("document_url") => Some(InlineQueryResultKind::Document),
            "location" => Some(InlineQueryResultKind::Location),
            _ => None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> InlineQueryResultKind {
        match self {
            Self::Article(_) => InlineQueryResultKind::Article,
            Self::Photo(_) => InlineQueryResultKind::Photo,
            Self::CachedPhoto(_) => InlineQueryResultKind::CachedPhoto,
            Self::Document(_) => InlineQueryResultKind::Document,
            Self::CachedDocument(_) => InlineQueryResultKind::CachedDocument,
            Self::Location(_) => InlineQueryResultKind::Location,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Article(r) => &r.id,
            Self::Photo(r) => &r.id,
            Self::CachedPhoto(r) => &r.id,
            Self::Document(r) => &r.id,
            Self::CachedDocument(r) => &r.id,
            Self::Location(r) => &r.id,
        }
    }

    /// A text article that sends `text` when chosen.
    #[must_use]
    pub fn article(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Article(InlineQueryResultArticle {
            id: id.into(),
            title: title.into(),
            input_message_content: InputTextMessageContent::new(text),
            reply_markup: None,
            url: None,
            description: None,
            thumbnail_url: None,
        })
    }
}

impl Serialize for InlineQueryResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::Error;

        let body = match self {
            Self::Article(r) => serde_json::to_value(r),
            Self::Photo(r) => serde_json::to_value(r),
            Self::CachedPhoto(r) => serde_json::to_value(r),
            Self::Document(r) => serde_json::to_value(r),
            Self::CachedDocument(r) => serde_json::to_value(r),
            Self::Location(r) => serde_json::to_value(r),
        }
        .map_err(S::Error::custom)?;

        let Value::Object(mut object) = body else {
            return Err(S::Error::custom("inline query result did not serialize to an object"));
        };
        object.insert(
            "type".to_string(),
            Value::String(self.kind().type_tag().to_string()),
        );
        object.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InlineQueryResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let value = Value::deserialize(deserializer)?;
        let Some(object) = value.as_object() else {
            return Err(D::Error::custom("inline query result must be a JSON object"));
        };
        let Some(kind) = Self::classify(object) else {
            return Err(D::Error::custom(format!(
                "inline query result matches no known variant (type {:?})",
                object.get("type")
            )));
        };

        let result = match kind {
            InlineQueryResultKind::Article => serde_json::from_value(value).map(Self::Article),
            InlineQueryResultKind::Photo => serde_json::from_value(value).map(Self::Photo),
            InlineQueryResultKind::CachedPhoto => {
                serde_json::from_value(value).map(Self::CachedPhoto)
            }
            InlineQueryResultKind::Document => serde_json::from_value(value).map(Self::Document),
            InlineQueryResultKind::CachedDocument => {
                serde_json::from_value(value).map(Self::CachedDocument)
            }
            InlineQueryResultKind::Location => serde_json::from_value(value).map(Self::Location),
        };
        result.map_err(D::Error::custom)
    }
}
