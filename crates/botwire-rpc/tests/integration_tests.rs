//! Integration tests for the full call pipeline in botwire-rpc
//!
//! These tests drive `Bot` against a recording in-memory transport, checking
//! what reaches the wire and how responses are decoded, without any network.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use botwire_rpc::methods::{
    EditMessageText, GetChatMemberCount, GetUpdates, SendMediaGroup, SendMessage, SendPhoto,
    SetMyCommands,
};
use botwire_rpc::{
    Bot, Error, Method, ParamValue, ParameterBag, Transport, TransportError, TransportRequest,
};
use botwire_types::{BotCommand, ChatMember, InputFile, ParseMode};
use serde_json::{Map, Value, json};

/// One call as seen by the transport
#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    json: Map<String, Value>,
    /// (part name, file name, contents)
    files: Vec<(String, String, Vec<u8>)>,
}

/// Records every request and answers from a queue of canned bodies
#[derive(Clone, Default)]
struct MockTransport {
    responses: Arc<Mutex<VecDeque<String>>>,
    calls: Arc<Mutex<Vec<Recorded>>>,
}

impl MockTransport {
    fn replying(body: Value) -> Self {
        let mock = Self::default();
        mock.push(body);
        mock
    }

    fn push(&self, body: Value) {
        self.responses.lock().unwrap().push_back(body.to_string());
    }

    fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn call(
        &self,
        method: &str,
        request: TransportRequest,
    ) -> Result<String, TransportError> {
        let (json, parts) = request.into_parts();
        let mut files = Vec::new();
        for (key, part) in parts {
            let file_name = part.file_name().to_string();
            files.push((key, file_name, part.read_all().await?));
        }

        self.calls.lock().unwrap().push(Recorded {
            method: method.to_string(),
            json,
            files,
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Other("no response queued".to_string()))
    }
}

fn ok(result: Value) -> Value {
    json!({"ok": true, "result": result})
}

fn sample_message() -> Value {
    json!({
        "message_id": 1,
        "from": {"id": 1, "is_bot": true, "first_name": "test", "username": "test"},
        "date": 1,
        "chat": {"id": 1, "type": "private", "username": "test", "first_name": "test"},
        "text": "test"
    })
}

fn user(id: i64) -> Value {
    json!({"id": id, "is_bot": false, "first_name": format!("user{id}")})
}

#[tokio::test]
async fn test_send_message_sends_only_set_fields() {
    let mock = MockTransport::replying(ok(sample_message()));
    let bot = Bot::with_transport(mock.clone());

    let message = bot.send_message(1, "test").await.unwrap();

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "sendMessage");
    assert_eq!(Value::Object(calls[0].json.clone()), json!({"chat_id": 1, "text": "test"}));
    assert!(calls[0].files.is_empty());

    let from = message.from.as_ref().unwrap();
    assert_eq!(from.username.as_deref(), Some("test"));
    assert_eq!(serde_json::to_value(&message).unwrap(), sample_message());
}

#[tokio::test]
async fn test_falsy_values_are_sent() {
    let mock = MockTransport::replying(ok(sample_message()));
    let bot = Bot::with_transport(mock.clone());

    bot.execute(
        SendMessage::new("@channel", "")
            .disable_notification(false)
            .message_thread_id(0)
            .parse_mode(ParseMode::MarkdownV2),
    )
    .await
    .unwrap();

    assert_eq!(
        Value::Object(mock.calls()[0].json.clone()),
        json!({
            "chat_id": "@channel",
            "text": "",
            "disable_notification": false,
            "message_thread_id": 0,
            "parse_mode": "MarkdownV2"
        })
    );
}

#[tokio::test]
async fn test_generic_call_returns_raw_json() {
    let mock = MockTransport::replying(ok(json!({"anything": [1, 2, 3]})));
    let bot = Bot::with_transport(mock.clone());

    let params = ParameterBag::new()
        .with("chat_id", 5_i64)
        .with("unused", None::<String>);
    let value = bot.call("someFutureMethod", params).await.unwrap();

    assert_eq!(value, json!({"anything": [1, 2, 3]}));
    let calls = mock.calls();
    assert_eq!(calls[0].method, "someFutureMethod");
    assert_eq!(Value::Object(calls[0].json.clone()), json!({"chat_id": 5}));
}

#[tokio::test]
async fn test_array_result_has_one_entity_per_element() {
    let updates = json!([
        {"update_id": 10, "message": sample_message()},
        {"update_id": 11},
        {"update_id": 12, "callback_query": {
            "id": "q", "from": user(3), "chat_instance": "c", "data": "x"
        }}
    ]);
    let mock = MockTransport::replying(ok(updates));
    let bot = Bot::with_transport(mock.clone());

    let updates = bot.get_updates(Some(10), None).await.unwrap();

    assert_eq!(updates.len(), 3);
    assert_eq!(updates[0].kind(), Some("message"));
    assert_eq!(updates[1].kind(), None);
    assert_eq!(updates[2].kind(), Some("callback_query"));
    assert_eq!(Value::Object(mock.calls()[0].json.clone()), json!({"offset": 10}));
}

#[tokio::test]
async fn test_polymorphic_array_result() {
    let admins = json!([
        {"status": "creator", "user": user(1), "is_anonymous": false},
        {"status": "administrator", "user": user(2), "can_be_edited": false,
         "is_anonymous": false, "can_manage_chat": true, "can_delete_messages": true,
         "can_manage_video_chats": true, "can_restrict_members": true,
         "can_promote_members": false, "can_change_info": true, "can_invite_users": true}
    ]);
    let bot = Bot::with_transport(MockTransport::replying(ok(admins)));

    let admins = bot.get_chat_administrators(-100).await.unwrap();
    assert_eq!(admins.len(), 2);
    assert!(matches!(admins[0], ChatMember::Owner(_)));
    assert!(matches!(admins[1], ChatMember::Administrator(_)));
    assert_eq!(admins[1].user().id, 2);
}

#[tokio::test]
async fn test_scalar_result() {
    let bot = Bot::with_transport(MockTransport::replying(ok(json!(42))));
    let count = bot.execute(GetChatMemberCount::new(-100)).await.unwrap();
    assert_eq!(count, 42);
}

#[tokio::test]
async fn test_multiple_shapes_fail_before_transport() {
    let mock = MockTransport::replying(ok(json!(true)));
    let bot = Bot::with_transport(mock.clone());

    let err = bot
        .execute(EditMessageText::new("new text").chat_id(1).message_id(7))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MultipleShapes(2)));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_multi_shape_method_through_generic_call() {
    let mock = MockTransport::replying(ok(json!(true)));
    let bot = Bot::with_transport(mock.clone());

    let value = bot.edit_message_text(1, 7, "new text").await.unwrap();

    assert_eq!(value, json!(true));
    let calls = mock.calls();
    assert_eq!(calls[0].method, EditMessageText::NAME);
    assert_eq!(
        Value::Object(calls[0].json.clone()),
        json!({"chat_id": 1, "message_id": 7, "text": "new text"})
    );
}

#[tokio::test]
async fn test_entity_lists_are_expanded() {
    let mock = MockTransport::replying(ok(json!(true)));
    let bot = Bot::with_transport(mock.clone());

    let done = bot
        .execute(SetMyCommands::new(vec![
            BotCommand::new("start", "Start the bot"),
            BotCommand::new("help", "Show help"),
        ]))
        .await
        .unwrap();

    assert!(done);
    assert_eq!(
        Value::Object(mock.calls()[0].json.clone()),
        json!({"commands": [
            {"command": "start", "description": "Start the bot"},
            {"command": "help", "description": "Show help"}
        ]})
    );
}

#[tokio::test]
async fn test_path_upload_becomes_file_part() {
    let mut file = tempfile::Builder::new()
        .prefix("cat")
        .suffix(".jpg")
        .tempfile()
        .unwrap();
    file.write_all(b"\xff\xd8\xff fake jpeg").unwrap();

    let mock = MockTransport::replying(ok(sample_message()));
    let bot = Bot::with_transport(mock.clone());

    bot.execute(SendPhoto::new(1, InputFile::path(file.path())).caption("a cat"))
        .await
        .unwrap();

    let calls = mock.calls();
    assert_eq!(
        Value::Object(calls[0].json.clone()),
        json!({"chat_id": 1, "caption": "a cat"})
    );
    assert_eq!(calls[0].files.len(), 1);
    let (key, file_name, data) = &calls[0].files[0];
    assert_eq!(key, "photo");
    assert!(file_name.starts_with("cat") && file_name.ends_with(".jpg"));
    assert_eq!(data.as_slice(), b"\xff\xd8\xff fake jpeg");
}

#[tokio::test]
async fn test_missing_upload_path_fails_without_sending() {
    let dir = tempfile::tempdir().unwrap();
    let mock = MockTransport::replying(ok(sample_message()));
    let bot = Bot::with_transport(mock.clone());

    let err = bot
        .send_document(1, InputFile::path(dir.path().join("does-not-exist.pdf")))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Upload { .. }));
    assert!(err.message().contains("does-not-exist.pdf"));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_media_group_attachments() {
    let mock = MockTransport::replying(ok(json!([sample_message(), sample_message()])));
    let bot = Bot::with_transport(mock.clone());

    let sent = bot
        .execute(SendMediaGroup::new(
            1,
            vec![
                ParamValue::media("photo", InputFile::memory("one.jpg", b"1".to_vec())),
                ParamValue::media("photo", InputFile::memory("two.jpg", b"2".to_vec())),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(sent.len(), 2);
    let calls = mock.calls();
    assert_eq!(
        Value::Object(calls[0].json.clone()),
        json!({"chat_id": 1, "media": [
            {"type": "photo", "media": "attach://media_0"},
            {"type": "photo", "media": "attach://media_1"}
        ]})
    );
    let names: Vec<_> = calls[0]
        .files
        .iter()
        .map(|(key, file_name, _)| (key.as_str(), file_name.as_str()))
        .collect();
    assert_eq!(names, vec![("media_0", "one.jpg"), ("media_1", "two.jpg")]);
}

#[tokio::test]
async fn test_api_error_envelope() {
    let mock = MockTransport::replying(json!({
        "ok": false,
        "error_code": 400,
        "description": "Bad Request: chat not found"
    }));
    let bot = Bot::with_transport(mock);

    let err = bot.send_message(404, "hello").await.unwrap_err();
    assert_eq!(err.code(), Some(400));
    assert_eq!(err.message(), "API error 400: Bad Request: chat not found");
    assert_eq!(err.retry_after(), None);
}

#[tokio::test]
async fn test_flood_control_parameters() {
    let mock = MockTransport::replying(json!({
        "ok": false,
        "error_code": 429,
        "description": "Too Many Requests: retry after 7",
        "parameters": {"retry_after": 7}
    }));
    let bot = Bot::with_transport(mock);

    let err = bot.get_me().await.unwrap_err();
    assert_eq!(err.code(), Some(429));
    assert_eq!(err.retry_after(), Some(7));
}

#[tokio::test]
async fn test_transport_failure_is_wrapped() {
    let mock = MockTransport::default();
    let bot = Bot::with_transport(mock.clone());

    let err = bot.get_me().await.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Other(_))));
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn test_missing_required_field_fails_decoding() {
    let bot = Bot::with_transport(MockTransport::replying(ok(json!({"id": 1}))));
    let err = bot.get_me().await.unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[tokio::test]
async fn test_shared_transport_across_calls() {
    let mock = MockTransport::default();
    mock.push(ok(json!([])));
    mock.push(ok(json!([])));
    let bot = Bot::with_transport(Arc::new(mock.clone()));

    let first = bot.execute(GetUpdates::new().limit(1)).await.unwrap();
    let second = bot.execute(GetUpdates::new().timeout(30)).await.unwrap();

    assert!(first.is_empty() && second.is_empty());
    let calls = mock.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(Value::Object(calls[0].json.clone()), json!({"limit": 1}));
    assert_eq!(Value::Object(calls[1].json.clone()), json!({"timeout": 30}));
}
