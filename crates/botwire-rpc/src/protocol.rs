//! Request and response shapes shared by the normalizer, the dispatcher and
//! transports.
//!
//! A call starts as a [`ParameterBag`] of loosely typed [`ParamValue`]s, is
//! normalized into a [`TransportRequest`] holding only JSON values and open
//! file parts, and comes back as an [`ApiResponse`] envelope whose `result`
//! is decoded according to a [`ResultShape`].

use std::collections::BTreeMap;
use std::fmt;
use std::pin::Pin;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt};

use botwire_types::{
    ChatAction, ChatId, Entity, InputFile, MediaSource, ParseMode, ResponseParameters,
};

/// A typed entity erased down to "can become plain JSON".
pub trait PlainData: fmt::Debug + Send + Sync {
    fn entity_name(&self) -> &'static str;

    /// Plain JSON with unset optional fields omitted.
    fn to_plain(&self) -> serde_json::Result<Value>;
}

impl<T: Entity> PlainData for T {
    fn entity_name(&self) -> &'static str {
        T::NAME
    }

    fn to_plain(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// One parameter value before normalization.
#[derive(Debug)]
pub enum ParamValue {
    /// Explicitly not provided; dropped by the normalizer.
    Unset,
    Json(Value),
    /// Checked for NaN and infinities during normalization.
    Float(f64),
    Entity(Box<dyn PlainData>),
    List(Vec<ParamValue>),
    Object(BTreeMap<String, ParamValue>),
    File(InputFile),
}

impl ParamValue {
    /// Build a nested object from key/value pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: IntoParam,
    {
        Self::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into_param()))
                .collect(),
        )
    }

    /// A media group item of the given `type`. Uploads are lifted into their
    /// own multipart part and referenced with `attach://`.
    pub fn media(kind: &str, source: impl Into<MediaSource>) -> Self {
        let source: MediaSource = source.into();
        Self::object([
            ("type", ParamValue::Json(Value::from(kind))),
            ("media", source.into_param()),
        ])
    }

    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset | Self::Json(Value::Null))
    }
}

/// Conversion into a [`ParamValue`].
///
/// Implemented for JSON scalars, every entity type, uploads, and
/// `Vec`/`Option` of those. `None` becomes [`ParamValue::Unset`].
pub trait IntoParam {
    fn into_param(self) -> ParamValue;
}

impl IntoParam for ParamValue {
    fn into_param(self) -> ParamValue {
        self
    }
}

impl IntoParam for Value {
    fn into_param(self) -> ParamValue {
        ParamValue::Json(self)
    }
}

macro_rules! impl_json_param {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoParam for $ty {
                fn into_param(self) -> ParamValue {
                    ParamValue::Json(Value::from(self))
                }
            }
        )*
    };
}

impl_json_param!(i64, i32, u32, u64, bool, String, &str);

impl IntoParam for f64 {
    fn into_param(self) -> ParamValue {
        ParamValue::Float(self)
    }
}

impl IntoParam for ChatId {
    fn into_param(self) -> ParamValue {
        match self {
            ChatId::Id(id) => ParamValue::Json(Value::from(id)),
            ChatId::Username(name) => ParamValue::Json(Value::from(name)),
        }
    }
}

impl IntoParam for ParseMode {
    fn into_param(self) -> ParamValue {
        ParamValue::Json(Value::from(self.as_str()))
    }
}

impl IntoParam for ChatAction {
    fn into_param(self) -> ParamValue {
        ParamValue::Json(Value::from(self.as_str()))
    }
}

impl IntoParam for InputFile {
    fn into_param(self) -> ParamValue {
        ParamValue::File(self)
    }
}

impl IntoParam for MediaSource {
    fn into_param(self) -> ParamValue {
        match self {
            MediaSource::Remote(id_or_url) => ParamValue::Json(Value::String(id_or_url)),
            MediaSource::Upload(file) => ParamValue::File(file),
        }
    }
}

impl<T: IntoParam> IntoParam for Vec<T> {
    fn into_param(self) -> ParamValue {
        ParamValue::List(self.into_iter().map(IntoParam::into_param).collect())
    }
}

impl<T: IntoParam> IntoParam for Option<T> {
    fn into_param(self) -> ParamValue {
        self.map_or(ParamValue::Unset, IntoParam::into_param)
    }
}

macro_rules! impl_entity_param {
    ($($name:ident),* $(,)?) => {
        $(
            impl IntoParam for botwire_types::$name {
                fn into_param(self) -> ParamValue {
                    ParamValue::Entity(Box::new(self))
                }
            }
        )*
    };
}

botwire_types::for_each_entity!(impl_entity_param);

/// Named arguments for one outgoing call. Inserting an existing key replaces it.
#[derive(Debug, Default)]
pub struct ParameterBag {
    params: BTreeMap<String, ParamValue>,
}

impl ParameterBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl IntoParam) -> Option<ParamValue> {
        self.params.insert(key.into(), value.into_param())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl IntoParam) -> Self {
        self.insert(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl IntoIterator for ParameterBag {
    type Item = (String, ParamValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}

impl<K: Into<String>, V: IntoParam> FromIterator<(K, V)> for ParameterBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (key, value) in iter {
            bag.insert(key, value);
        }
        bag
    }
}

/// An opened file ready to be streamed as a multipart part.
pub struct FilePart {
    file_name: String,
    reader: Pin<Box<dyn AsyncRead + Send>>,
}

impl FilePart {
    pub fn new<R>(file_name: impl Into<String>, reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::from_boxed(file_name.into(), Box::pin(reader))
    }

    pub(crate) fn from_boxed(file_name: String, reader: Pin<Box<dyn AsyncRead + Send>>) -> Self {
        Self { file_name, reader }
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Read the whole stream into memory.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the stream cannot be read.
    pub async fn read_all(mut self) -> std::io::Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data).await?;
        Ok(data)
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// A normalized parameter value.
#[derive(Debug)]
pub enum TransportValue {
    /// Never `null`.
    Json(Value),
    File(FilePart),
}

/// Transport-ready request: plain JSON values and open file parts only.
#[derive(Debug, Default)]
pub struct TransportRequest {
    fields: BTreeMap<String, TransportValue>,
}

impl TransportRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a JSON field, returning the value it replaced.
    pub fn insert_json(&mut self, key: impl Into<String>, value: Value) -> Option<TransportValue> {
        self.fields.insert(key.into(), TransportValue::Json(value))
    }

    /// Insert a file part, returning the value it replaced.
    pub fn insert_file(&mut self, key: impl Into<String>, part: FilePart) -> Option<TransportValue> {
        self.fields.insert(key.into(), TransportValue::File(part))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TransportValue> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn has_files(&self) -> bool {
        self.fields
            .values()
            .any(|value| matches!(value, TransportValue::File(_)))
    }

    /// The JSON fields as one object, ignoring file parts.
    #[must_use]
    pub fn json_fields(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|(key, value)| match value {
                TransportValue::Json(json) => Some((key.clone(), json.clone())),
                TransportValue::File(_) => None,
            })
            .collect()
    }

    /// Split into the JSON object and the file parts.
    #[must_use]
    pub fn into_parts(self) -> (Map<String, Value>, Vec<(String, FilePart)>) {
        let mut json = Map::new();
        let mut files = Vec::new();
        for (key, value) in self.fields {
            match value {
                TransportValue::Json(value) => {
                    json.insert(key, value);
                }
                TransportValue::File(part) => files.push((key, part)),
            }
        }
        (json, files)
    }
}

impl IntoIterator for TransportRequest {
    type Item = (String, TransportValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, TransportValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Declared shape of a call's `result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// A JSON scalar: `Boolean`, `Integer`, `String`.
    Scalar(&'static str),
    Entity(&'static str),
    ArrayOf(&'static str),
}

impl ResultShape {
    /// Check that `value` has the JSON kind this shape needs.
    ///
    /// # Errors
    ///
    /// Returns the kind actually found on mismatch.
    pub fn check(&self, value: &Value) -> std::result::Result<(), &'static str> {
        let found = json_kind(value);
        let matches = match self {
            Self::Scalar(_) => !matches!(value, Value::Array(_) | Value::Object(_)),
            Self::Entity(_) => value.is_object(),
            Self::ArrayOf(_) => value.is_array(),
        };
        if matches { Ok(()) } else { Err(found) }
    }
}

impl fmt::Display for ResultShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(name) | Self::Entity(name) => write!(f, "{name}"),
            Self::ArrayOf(name) => write!(f, "array of {name}"),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Types a call can decode its `result` into, with their declared shape.
pub trait Returns: DeserializeOwned {
    const SHAPE: ResultShape;
}

impl Returns for bool {
    const SHAPE: ResultShape = ResultShape::Scalar("Boolean");
}

impl Returns for i64 {
    const SHAPE: ResultShape = ResultShape::Scalar("Integer");
}

impl Returns for String {
    const SHAPE: ResultShape = ResultShape::Scalar("String");
}

macro_rules! impl_entity_returns {
    ($($name:ident),* $(,)?) => {
        $(
            impl Returns for botwire_types::$name {
                const SHAPE: ResultShape = ResultShape::Entity(stringify!($name));
            }

            impl Returns for Vec<botwire_types::$name> {
                const SHAPE: ResultShape = ResultShape::ArrayOf(stringify!($name));
            }
        )*
    };
}

botwire_types::for_each_entity!(impl_entity_returns);

/// The platform's response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

/// Outcome of a dispatched call.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<R> {
    /// No shape was declared; the `result` JSON as received.
    Raw(Value),
    Typed(R),
}

impl<R> Reply<R> {
    pub fn typed(self) -> Option<R> {
        match self {
            Self::Typed(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn raw(self) -> Option<Value> {
        match self {
            Self::Raw(value) => Some(value),
            Self::Typed(_) => None,
        }
    }
}
