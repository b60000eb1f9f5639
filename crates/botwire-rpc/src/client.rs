//! The typed client.
//!
//! [`Bot`] wraps a [`Dispatcher`] and exposes three ways to call the API:
//! [`Bot::call`] with a hand-built [`ParameterBag`], [`Bot::execute`] with any
//! generated [`Method`], and a handful of convenience methods.

use serde_json::Value;

use botwire_types::{ChatId, ChatMember, MediaSource, Message, Update, User};

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::methods::{
    EditMessageText, GetChatAdministrators, GetChatMember, GetMe, GetUpdates, Method,
    SendDocument, SendMessage,
};
use crate::protocol::{ParameterBag, Reply};
use crate::transport::{HttpTransport, Transport, TransportConfig};

/// Bot API client. Cheap to clone when its transport is.
#[derive(Debug, Clone)]
pub struct Bot<T = HttpTransport> {
    dispatcher: Dispatcher<T>,
}

impl Bot<HttpTransport> {
    /// Create a client talking HTTPS to the configured API server.
    ///
    /// # Errors
    ///
    /// Returns `Error::Transport` if the HTTP client cannot be constructed.
    pub fn new(config: TransportConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }
}

impl<T: Transport> Bot<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        self.dispatcher.transport()
    }

    /// Call any method by name and get its `result` JSON back.
    ///
    /// # Errors
    ///
    /// Returns any error from normalization, the transport, or the envelope.
    pub async fn call(&self, method: &str, params: ParameterBag) -> Result<Value> {
        self.dispatcher.call(method, params).await
    }

    /// Run a typed operation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MultipleShapes`] for operations that can answer in
    /// more than one shape (use [`Bot::call`] for those), otherwise any error
    /// from the dispatcher.
    pub async fn execute<M: Method>(&self, method: M) -> Result<M::Output> {
        let reply = self
            .dispatcher
            .call_shaped::<M::Output>(M::NAME, method.into_params(), M::SHAPES)
            .await?;
        match reply {
            Reply::Typed(output) => Ok(output),
            Reply::Raw(value) => serde_json::from_value(value).map_err(Error::from),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn get_me(&self) -> Result<User> {
        self.execute(GetMe::new()).await
    }

    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn send_message(
        &self,
        chat_id: impl Into<ChatId>,
        text: impl Into<String>,
    ) -> Result<Message> {
        self.execute(SendMessage::new(chat_id, text)).await
    }

    /// Send a file, by upload or by `file_id`/URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::Upload` if a local file cannot be opened, or any
    /// error from the call.
    pub async fn send_document(
        &self,
        chat_id: impl Into<ChatId>,
        document: impl Into<MediaSource>,
    ) -> Result<Message> {
        self.execute(SendDocument::new(chat_id, document)).await
    }

    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn get_updates(&self, offset: Option<i64>, limit: Option<i64>) -> Result<Vec<Update>> {
        let mut op = GetUpdates::new();
        op.offset = offset;
        op.limit = limit;
        self.execute(op).await
    }

    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn get_chat_member(
        &self,
        chat_id: impl Into<ChatId>,
        user_id: i64,
    ) -> Result<ChatMember> {
        self.execute(GetChatMember::new(chat_id, user_id)).await
    }

    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn get_chat_administrators(
        &self,
        chat_id: impl Into<ChatId>,
    ) -> Result<Vec<ChatMember>> {
        self.execute(GetChatAdministrators::new(chat_id)).await
    }

    /// Edit a chat message's text. The result is the edited message as raw
    /// JSON, or `true` for inline messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn edit_message_text(
        &self,
        chat_id: impl Into<ChatId>,
        message_id: i64,
        text: impl Into<String>,
    ) -> Result<Value> {
        let op = EditMessageText::new(text)
            .chat_id(chat_id)
            .message_id(message_id);
        self.call(EditMessageText::NAME, op.into_params()).await
    }
}
