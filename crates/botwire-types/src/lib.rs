//! Typed entities for the botwire Bot API client.
//!
//! Every entity is a plain serde struct. Required fields are non-`Option`
//! and make deserialization fail when absent; optional fields are `Option`
//! and are skipped on serialization when unset, so a value parsed from a
//! response serializes back to exactly the keys it was built from.
//!
//! Fields whose concrete type depends on the payload are closed enums with an
//! explicit discriminator:
//!
//! - [`ChatMember`]: the `status` key
//! - [`InlineQueryResult`]: the `type` key plus `*_file_id` / `*_url` presence
//! - [`InputMedia`]: the `type` key
//! - [`ReplyMarkup`]: which keyboard key is present
//! - [`MaybeInaccessibleMessage`]: `date == 0`

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;

mod chat;
mod inline;
mod markup;
mod media;
mod message;
mod update;

pub use chat::{
    Chat, ChatMember, ChatMemberAdministrator, ChatMemberBanned, ChatMemberLeft,
    ChatMemberMember, ChatMemberOwner, ChatMemberRestricted, ChatMemberUpdated, ChatType, User,
};
pub use inline::{
    InlineQuery, InlineQueryResult, InlineQueryResultArticle, InlineQueryResultCachedDocument,
    InlineQueryResultCachedPhoto, InlineQueryResultDocument, InlineQueryResultKind,
    InlineQueryResultLocation, InlineQueryResultPhoto, InputTextMessageContent,
};
pub use markup::{
    ForceReply, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup,
    ReplyKeyboardRemove, ReplyMarkup,
};
pub use media::{
    InputFile, InputMedia, InputMediaAudio, InputMediaDocument, InputMediaPhoto, InputMediaVideo,
    MediaSource,
};
pub use message::{
    Audio, Dice, Document, InaccessibleMessage, Location, MaybeInaccessibleMessage, Message,
    MessageEntity, MessageEntityKind, MessageId, PhotoSize, ReplyParameters, Video, Voice,
};
pub use update::{
    BotCommand, CallbackQuery, File, ResponseParameters, Update, UserProfilePhotos, WebhookInfo,
};

/// A typed value that can travel in a request or come back in a response.
///
/// `NAME` is the entity's name in the Bot API documentation and is used in
/// error messages and result-shape descriptions.
pub trait Entity: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static {
    const NAME: &'static str;
}

/// Invoke `$callback!` with the names of every entity type.
///
/// Downstream crates use this to derive per-entity trait impls without
/// repeating the catalogue; the names resolve under `botwire_types::`.
#[macro_export]
macro_rules! for_each_entity {
    ($callback:ident) => {
        $callback!(
            User,
            Chat,
            ChatMember,
            ChatMemberOwner,
            ChatMemberAdministrator,
            ChatMemberMember,
            ChatMemberRestricted,
            ChatMemberLeft,
            ChatMemberBanned,
            ChatMemberUpdated,
            Message,
            InaccessibleMessage,
            MaybeInaccessibleMessage,
            MessageId,
            MessageEntity,
            ReplyParameters,
            PhotoSize,
            Document,
            Audio,
            Video,
            Voice,
            Location,
            Dice,
            File,
            UserProfilePhotos,
            BotCommand,
            WebhookInfo,
            Update,
            CallbackQuery,
            InlineQuery,
            ResponseParameters,
            InlineKeyboardMarkup,
            InlineKeyboardButton,
            ReplyKeyboardMarkup,
            KeyboardButton,
            ReplyKeyboardRemove,
            ForceReply,
            ReplyMarkup,
            InputMedia,
            InputMediaPhoto,
            InputMediaVideo,
            InputMediaAudio,
            InputMediaDocument,
            InlineQueryResult,
            InlineQueryResultArticle,
            InlineQueryResultPhoto,
            InlineQueryResultCachedPhoto,
            InlineQueryResultDocument,
            InlineQueryResultCachedDocument,
            InlineQueryResultLocation,
            InputTextMessageContent
        );
    };
}

macro_rules! impl_entity {
    ($($name:ident),* $(,)?) => {
        $(
            impl Entity for $name {
                const NAME: &'static str = stringify!($name);
            }
        )*
    };
}

for_each_entity!(impl_entity);

/// Unique identifier for a target chat: a numeric id or a `@username`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{id}"),
            ChatId::Username(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        ChatId::Id(id)
    }
}

impl From<i32> for ChatId {
    fn from(id: i32) -> Self {
        ChatId::Id(i64::from(id))
    }
}

impl From<String> for ChatId {
    fn from(name: String) -> Self {
        ChatId::Username(name)
    }
}

impl From<&str> for ChatId {
    fn from(name: &str) -> Self {
        ChatId::Username(name.to_string())
    }
}

impl FromStr for ChatId {
    type Err = std::convert::Infallible;

    /// Numeric input becomes [`ChatId::Id`], anything else a username.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map_or_else(|_| ChatId::Username(s.to_string()), ChatId::Id))
    }
}

/// Text formatting mode for message text and captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub enum ParseMode {
    MarkdownV2,
    Markdown,
    #[serde(rename = "HTML")]
    Html,
}

impl ParseMode {
    /// Wire value of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::MarkdownV2 => "MarkdownV2",
            ParseMode::Markdown => "Markdown",
            ParseMode::Html => "HTML",
        }
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdownv2" => Ok(ParseMode::MarkdownV2),
            "markdown" => Ok(ParseMode::Markdown),
            "html" => Ok(ParseMode::Html),
            other => Err(format!("unknown parse mode: {other}")),
        }
    }
}

/// Chat action broadcast by `sendChatAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    RecordVideo,
    UploadVideo,
    RecordVoice,
    UploadVoice,
    UploadDocument,
    ChooseSticker,
    FindLocation,
}

impl ChatAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChatAction::Typing => "typing",
            ChatAction::UploadPhoto => "upload_photo",
            ChatAction::RecordVideo => "record_video",
            ChatAction::UploadVideo => "upload_video",
            ChatAction::RecordVoice => "record_voice",
            ChatAction::UploadVoice => "upload_voice",
            ChatAction::UploadDocument => "upload_document",
            ChatAction::ChooseSticker => "choose_sticker",
            ChatAction::FindLocation => "find_location",
        }
    }
}
