//! One call, end to end: normalize, send once, unwrap the envelope, decode.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::protocol::{ApiResponse, ParameterBag, Reply, ResultShape};
use crate::transport::Transport;

/// Routes calls through a [`Transport`]. Holds no per-call state.
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Call `method` and return its `result` JSON as received.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::call_shaped`].
    pub async fn call(&self, method: &str, bag: ParameterBag) -> Result<Value> {
        match self.call_shaped::<Value>(method, bag, &[]).await? {
            Reply::Raw(value) | Reply::Typed(value) => Ok(value),
        }
    }

    /// Call `method` and decode its `result` into the single declared shape.
    ///
    /// With no shapes the result is returned raw. More than one shape is
    /// rejected before anything is sent.
    ///
    /// # Errors
    ///
    /// - [`Error::MultipleShapes`] if more than one shape is declared
    /// - [`Error::Upload`] / [`Error::Encode`] / [`Error::PartNameCollision`]
    ///   from normalization
    /// - [`Error::Transport`] if the transport fails
    /// - [`Error::Json`] for malformed responses or failed decoding
    /// - [`Error::Api`] when the platform reports `ok: false`
    /// - [`Error::MissingResult`] for `ok: true` without a result
    /// - [`Error::ShapeMismatch`] when the result has the wrong JSON kind
    pub async fn call_shaped<R: DeserializeOwned>(
        &self,
        method: &str,
        bag: ParameterBag,
        shapes: &[ResultShape],
    ) -> Result<Reply<R>> {
        if shapes.len() > 1 {
            return Err(Error::MultipleShapes(shapes.len()));
        }

        debug!(method, params = ?bag.keys().collect::<Vec<_>>(), "dispatching");

        let request = normalize(bag).await?;
        let raw = self.transport.call(method, request).await?;
        let result = unwrap_envelope(method, &raw)?;

        let Some(shape) = shapes.first() else {
            return Ok(Reply::Raw(result));
        };
        shape
            .check(&result)
            .map_err(|found| Error::ShapeMismatch {
                expected: *shape,
                found,
            })?;
        Ok(Reply::Typed(serde_json::from_value(result)?))
    }
}

/// Extract `result` from a response envelope.
///
/// # Errors
///
/// Returns [`Error::Json`] if `raw` is not an envelope, [`Error::Api`] for
/// `ok: false`, and [`Error::MissingResult`] for `ok: true` without a result.
pub fn unwrap_envelope(method: &str, raw: &str) -> Result<Value> {
    let response: ApiResponse = serde_json::from_str(raw)?;

    if !response.ok {
        let code = response.error_code.unwrap_or_default();
        let description = response.description.unwrap_or_default();
        warn!(method, code, %description, "API error");
        return Err(Error::Api {
            code,
            description,
            parameters: response.parameters,
        });
    }

    response.result.ok_or(Error::MissingResult)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::protocol::TransportRequest;
    use botwire_types::User;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replies with a fixed body and counts calls.
    struct FixedTransport {
        body: String,
        calls: Mutex<usize>,
    }

    impl FixedTransport {
        fn new(body: &str) -> Self {
            Self {
                body: body.to_string(),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl Transport for FixedTransport {
        async fn call(
            &self,
            _method: &str,
            _request: TransportRequest,
        ) -> std::result::Result<String, TransportError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.body.clone())
        }
    }

    const USER_SHAPE: [ResultShape; 1] = [ResultShape::Entity("User")];

    #[tokio::test]
    async fn test_raw_result() {
        let dispatcher = Dispatcher::new(FixedTransport::new(r#"{"ok":true,"result":[1,2]}"#));
        let value = dispatcher.call("getX", ParameterBag::new()).await.unwrap();
        assert_eq!(value, json!([1, 2]));
        assert_eq!(dispatcher.transport().calls(), 1);
    }

    #[tokio::test]
    async fn test_typed_result() {
        let dispatcher = Dispatcher::new(FixedTransport::new(
            r#"{"ok":true,"result":{"id":1,"is_bot":true,"first_name":"Bot","username":"test_bot"}}"#,
        ));
        let reply = dispatcher
            .call_shaped::<User>("getMe", ParameterBag::new(), &USER_SHAPE)
            .await
            .unwrap();
        let user = reply.typed().unwrap();
        assert_eq!(user.username.as_deref(), Some("test_bot"));
    }

    #[tokio::test]
    async fn test_multiple_shapes_rejected_before_sending() {
        let dispatcher = Dispatcher::new(FixedTransport::new(r#"{"ok":true,"result":true}"#));
        let shapes = [ResultShape::Entity("Message"), ResultShape::Scalar("Boolean")];
        let err = dispatcher
            .call_shaped::<Value>("editMessageText", ParameterBag::new(), &shapes)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MultipleShapes(2)));
        assert_eq!(dispatcher.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_shape_mismatch() {
        let dispatcher = Dispatcher::new(FixedTransport::new(r#"{"ok":true,"result":true}"#));
        let err = dispatcher
            .call_shaped::<User>("getMe", ParameterBag::new(), &USER_SHAPE)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                expected: ResultShape::Entity("User"),
                found: "boolean"
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_required_field_is_json_error() {
        let dispatcher =
            Dispatcher::new(FixedTransport::new(r#"{"ok":true,"result":{"id":1}}"#));
        let err = dispatcher
            .call_shaped::<User>("getMe", ParameterBag::new(), &USER_SHAPE)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_unwrap_envelope_api_error() {
        let err = unwrap_envelope(
            "sendMessage",
            r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#,
        )
        .unwrap_err();
        assert_eq!(err.code(), Some(400));
        assert!(err.message().contains("chat not found"));
    }

    #[test]
    fn test_unwrap_envelope_missing_result() {
        assert!(matches!(
            unwrap_envelope("getMe", r#"{"ok":true}"#),
            Err(Error::MissingResult)
        ));
    }

    #[test]
    fn test_unwrap_envelope_malformed() {
        assert!(matches!(
            unwrap_envelope("getMe", "<html>Bad Gateway</html>"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            unwrap_envelope("getMe", r#"{"result":true}"#),
            Err(Error::Json(_))
        ));
    }
}
