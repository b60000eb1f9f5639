//! Typed API operations.
//!
//! Each operation is a struct holding its parameters: required ones as plain
//! fields set by `new`, optional ones as `Option` fields with builder
//! setters. All of them are generated from the table at the bottom of this
//! file and implement [`Method`].

use serde::de::DeserializeOwned;

use botwire_types::{
    BotCommand, Chat, ChatAction, ChatId, ChatMember, File, InlineKeyboardMarkup,
    InlineQueryResult, InputFile, MediaSource, Message, MessageEntity, MessageId, ParseMode,
    ReplyMarkup, ReplyParameters, Update, User, UserProfilePhotos, WebhookInfo,
};

use crate::protocol::{ParamValue, ParameterBag, ResultShape, Returns};

/// An API operation with its wire name and declared result.
pub trait Method {
    const NAME: &'static str;

    /// Candidate result shapes. Operations that may answer with either an
    /// entity or `true` declare two and can only be called untyped.
    const SHAPES: &'static [ResultShape];

    type Output: DeserializeOwned;

    fn into_params(self) -> ParameterBag;
}

macro_rules! api_methods {
    (@output $output:ty) => { $output };
    (@output $output:ty | $alt:ty) => { serde_json::Value };

    ($(
        $(#[$meta:meta])*
        $name:ident($wire:literal) -> $output:ty $(| $alt:ty)? {
            required { $($req:ident: $req_ty:ty),* $(,)? }
            optional { $($opt:ident: $opt_ty:ty),* $(,)? }
        }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug)]
            pub struct $name {
                $(pub $req: $req_ty,)*
                $(pub $opt: Option<$opt_ty>,)*
            }

            impl $name {
                #[must_use]
                #[allow(clippy::new_without_default)]
                pub fn new($($req: impl Into<$req_ty>),*) -> Self {
                    Self {
                        $($req: $req.into(),)*
                        $($opt: None,)*
                    }
                }

                $(
                    #[must_use]
                    pub fn $opt(mut self, value: impl Into<$opt_ty>) -> Self {
                        self.$opt = Some(value.into());
                        self
                    }
                )*
            }

            impl Method for $name {
                const NAME: &'static str = $wire;
                const SHAPES: &'static [ResultShape] =
                    &[<$output as Returns>::SHAPE $(, <$alt as Returns>::SHAPE)?];

                type Output = api_methods!(@output $output $(| $alt)?);

                #[allow(unused_mut)]
                fn into_params(self) -> ParameterBag {
                    let mut bag = ParameterBag::new();
                    $(bag.insert(stringify!($req), self.$req);)*
                    $(bag.insert(stringify!($opt), self.$opt);)*
                    bag
                }
            }
        )*
    };
}

api_methods! {
    /// Basic information about the bot.
    GetMe("getMe") -> User {
        required {}
        optional {}
    }

    /// Log out from the cloud Bot API server.
    LogOut("logOut") -> bool {
        required {}
        optional {}
    }

    Close("close") -> bool {
        required {}
        optional {}
    }

    /// Long-poll for incoming updates.
    GetUpdates("getUpdates") -> Vec<Update> {
        required {}
        optional {
            offset: i64,
            limit: i64,
            timeout: i64,
            allowed_updates: Vec<String>,
        }
    }

    SetWebhook("setWebhook") -> bool {
        required { url: String }
        optional {
            certificate: InputFile,
            ip_address: String,
            max_connections: i64,
            allowed_updates: Vec<String>,
            drop_pending_updates: bool,
            secret_token: String,
        }
    }

    DeleteWebhook("deleteWebhook") -> bool {
        required {}
        optional { drop_pending_updates: bool }
    }

    GetWebhookInfo("getWebhookInfo") -> WebhookInfo {
        required {}
        optional {}
    }

    /// Send a text message.
    SendMessage("sendMessage") -> Message {
        required { chat_id: ChatId, text: String }
        optional {
            message_thread_id: i64,
            parse_mode: ParseMode,
            entities: Vec<MessageEntity>,
            disable_notification: bool,
            protect_content: bool,
            reply_parameters: ReplyParameters,
            reply_markup: ReplyMarkup,
        }
    }

    ForwardMessage("forwardMessage") -> Message {
        required { chat_id: ChatId, from_chat_id: ChatId, message_id: i64 }
        optional {
            message_thread_id: i64,
            disable_notification: bool,
            protect_content: bool,
        }
    }

    /// Copy a message without a link to the original.
    CopyMessage("copyMessage") -> MessageId {
        required { chat_id: ChatId, from_chat_id: ChatId, message_id: i64 }
        optional {
            message_thread_id: i64,
            caption: String,
            parse_mode: ParseMode,
            caption_entities: Vec<MessageEntity>,
            disable_notification: bool,
            protect_content: bool,
            reply_parameters: ReplyParameters,
            reply_markup: ReplyMarkup,
        }
    }

    SendPhoto("sendPhoto") -> Message {
        required { chat_id: ChatId, photo: MediaSource }
        optional {
            message_thread_id: i64,
            caption: String,
            parse_mode: ParseMode,
            caption_entities: Vec<MessageEntity>,
            has_spoiler: bool,
            disable_notification: bool,
            protect_content: bool,
            reply_parameters: ReplyParameters,
            reply_markup: ReplyMarkup,
        }
    }

    SendAudio("sendAudio") -> Message {
        required { chat_id: ChatId, audio: MediaSource }
        optional {
            caption: String,
            parse_mode: ParseMode,
            duration: i64,
            performer: String,
            title: String,
            thumbnail: MediaSource,
            disable_notification: bool,
            reply_parameters: ReplyParameters,
            reply_markup: ReplyMarkup,
        }
    }

    /// Send a general file.
    SendDocument("sendDocument") -> Message {
        required { chat_id: ChatId, document: MediaSource }
        optional {
            thumbnail: MediaSource,
            caption: String,
            parse_mode: ParseMode,
            disable_content_type_detection: bool,
            disable_notification: bool,
            reply_parameters: ReplyParameters,
            reply_markup: ReplyMarkup,
        }
    }

    SendVideo("sendVideo") -> Message {
        required { chat_id: ChatId, video: MediaSource }
        optional {
            duration: i64,
            width: i64,
            height: i64,
            thumbnail: MediaSource,
            caption: String,
            parse_mode: ParseMode,
            has_spoiler: bool,
            supports_streaming: bool,
            disable_notification: bool,
            reply_parameters: ReplyParameters,
            reply_markup: ReplyMarkup,
        }
    }

    SendVoice("sendVoice") -> Message {
        required { chat_id: ChatId, voice: MediaSource }
        optional {
            caption: String,
            parse_mode: ParseMode,
            duration: i64,
            disable_notification: bool,
            reply_parameters: ReplyParameters,
            reply_markup: ReplyMarkup,
        }
    }

    /// Send an album. Items are built with [`ParamValue::media`] or from
    /// `InputMedia` entities.
    SendMediaGroup("sendMediaGroup") -> Vec<Message> {
        required { chat_id: ChatId, media: Vec<ParamValue> }
        optional {
            message_thread_id: i64,
            disable_notification: bool,
            protect_content: bool,
            reply_parameters: ReplyParameters,
        }
    }

    SendLocation("sendLocation") -> Message {
        required { chat_id: ChatId, latitude: f64, longitude: f64 }
        optional {
            horizontal_accuracy: f64,
            live_period: i64,
            heading: i64,
            proximity_alert_radius: i64,
            disable_notification: bool,
            reply_parameters: ReplyParameters,
            reply_markup: ReplyMarkup,
        }
    }

    SendDice("sendDice") -> Message {
        required { chat_id: ChatId }
        optional {
            emoji: String,
            disable_notification: bool,
            reply_parameters: ReplyParameters,
            reply_markup: ReplyMarkup,
        }
    }

    SendChatAction("sendChatAction") -> bool {
        required { chat_id: ChatId, action: ChatAction }
        optional { message_thread_id: i64 }
    }

    GetUserProfilePhotos("getUserProfilePhotos") -> UserProfilePhotos {
        required { user_id: i64 }
        optional { offset: i64, limit: i64 }
    }

    /// Prepare a file for download.
    GetFile("getFile") -> File {
        required { file_id: String }
        optional {}
    }

    BanChatMember("banChatMember") -> bool {
        required { chat_id: ChatId, user_id: i64 }
        optional { until_date: i64, revoke_messages: bool }
    }

    UnbanChatMember("unbanChatMember") -> bool {
        required { chat_id: ChatId, user_id: i64 }
        optional { only_if_banned: bool }
    }

    GetChat("getChat") -> Chat {
        required { chat_id: ChatId }
        optional {}
    }

    LeaveChat("leaveChat") -> bool {
        required { chat_id: ChatId }
        optional {}
    }

    GetChatAdministrators("getChatAdministrators") -> Vec<ChatMember> {
        required { chat_id: ChatId }
        optional {}
    }

    GetChatMemberCount("getChatMemberCount") -> i64 {
        required { chat_id: ChatId }
        optional {}
    }

    GetChatMember("getChatMember") -> ChatMember {
        required { chat_id: ChatId, user_id: i64 }
        optional {}
    }

    PinChatMessage("pinChatMessage") -> bool {
        required { chat_id: ChatId, message_id: i64 }
        optional { disable_notification: bool }
    }

    UnpinChatMessage("unpinChatMessage") -> bool {
        required { chat_id: ChatId }
        optional { message_id: i64 }
    }

    AnswerCallbackQuery("answerCallbackQuery") -> bool {
        required { callback_query_id: String }
        optional {
            text: String,
            show_alert: bool,
            url: String,
            cache_time: i64,
        }
    }

    AnswerInlineQuery("answerInlineQuery") -> bool {
        required { inline_query_id: String, results: Vec<InlineQueryResult> }
        optional {
            cache_time: i64,
            is_personal: bool,
            next_offset: String,
        }
    }

    SetMyCommands("setMyCommands") -> bool {
        required { commands: Vec<BotCommand> }
        optional { language_code: String }
    }

    GetMyCommands("getMyCommands") -> Vec<BotCommand> {
        required {}
        optional { language_code: String }
    }

    /// Edit a message's text. Answers with the edited message, or `true` for
    /// inline messages.
    EditMessageText("editMessageText") -> Message | bool {
        required { text: String }
        optional {
            chat_id: ChatId,
            message_id: i64,
            inline_message_id: String,
            parse_mode: ParseMode,
            entities: Vec<MessageEntity>,
            reply_markup: InlineKeyboardMarkup,
        }
    }

    EditMessageReplyMarkup("editMessageReplyMarkup") -> Message | bool {
        required {}
        optional {
            chat_id: ChatId,
            message_id: i64,
            inline_message_id: String,
            reply_markup: InlineKeyboardMarkup,
        }
    }

    DeleteMessage("deleteMessage") -> bool {
        required { chat_id: ChatId, message_id: i64 }
        optional {}
    }
}
