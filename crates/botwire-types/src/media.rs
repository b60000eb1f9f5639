//! File uploads and input media.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::AsyncRead;

use crate::ParseMode;
use crate::message::MessageEntity;

/// A file to upload as part of a request.
///
/// Upload references never go through JSON serialization; the request
/// normalizer resolves them into an open byte stream sent as a multipart part.
pub enum InputFile {
    /// A local path, opened for reading when the request is built.
    Path(PathBuf),
    /// An already-open stream.
    Reader {
        file_name: String,
        reader: Pin<Box<dyn AsyncRead + Send>>,
    },
    /// An in-memory buffer.
    Memory { file_name: String, data: Bytes },
}

impl InputFile {
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    #[must_use]
    pub fn reader<R>(file_name: impl Into<String>, reader: R) -> Self
    where
        R: AsyncRead + Send + 'static,
    {
        Self::Reader {
            file_name: file_name.into(),
            reader: Box::pin(reader),
        }
    }

    #[must_use]
    pub fn memory(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::Memory {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// The name the file is uploaded under.
    ///
    /// For paths this is the final component, or `"file"` when there is none.
    #[must_use]
    pub fn file_name(&self) -> String {
        match self {
            Self::Path(path) => path_file_name(path),
            Self::Reader { file_name, .. } | Self::Memory { file_name, .. } => file_name.clone(),
        }
    }
}

pub(crate) fn path_file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || "file".to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Reader { file_name, .. } => f
                .debug_struct("Reader")
                .field("file_name", file_name)
                .finish_non_exhaustive(),
            Self::Memory { file_name, data } => f
                .debug_struct("Memory")
                .field("file_name", file_name)
                .field("len", &data.len())
                .finish(),
        }
    }
}

/// A file parameter: either something the platform already knows (a
/// `file_id` or an HTTP URL) or a new upload.
#[derive(Debug)]
pub enum MediaSource {
    Remote(String),
    Upload(InputFile),
}

impl From<InputFile> for MediaSource {
    fn from(file: InputFile) -> Self {
        Self::Upload(file)
    }
}

impl From<String> for MediaSource {
    fn from(id_or_url: String) -> Self {
        Self::Remote(id_or_url)
    }
}

impl From<&str> for MediaSource {
    fn from(id_or_url: &str) -> Self {
        Self::Remote(id_or_url.to_string())
    }
}

impl From<PathBuf> for MediaSource {
    fn from(path: PathBuf) -> Self {
        Self::Upload(InputFile::Path(path))
    }
}

impl From<&Path> for MediaSource {
    fn from(path: &Path) -> Self {
        Self::Upload(InputFile::Path(path.to_path_buf()))
    }
}

/// One item of a media group, discriminated by the `type` key.
///
/// `media` is a `file_id`, an HTTP URL, or `attach://<name>` referring to a
/// multipart part of the same request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputMedia {
    Photo(InputMediaPhoto),
    Video(InputMediaVideo),
    Audio(InputMediaAudio),
    Document(InputMediaDocument),
}

impl InputMedia {
    #[must_use]
    pub fn media(&self) -> &str {
        match self {
            Self::Photo(m) => &m.media,
            Self::Video(m) => &m.media,
            Self::Audio(m) => &m.media,
            Self::Document(m) => &m.media,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMediaPhoto {
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_entities: Option<Vec<MessageEntity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_spoiler: Option<bool>,
}

impl InputMediaPhoto {
    #[must_use]
    pub fn new(media: impl Into<String>) -> Self {
        Self {
            media: media.into(),
            caption: None,
            parse_mode: None,
            caption_entities: None,
            has_spoiler: None,
        }
    }

    #[must_use]
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMediaVideo {
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_streaming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_spoiler: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMediaAudio {
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMediaDocument {
    pub media: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_content_type_detection: Option<bool>,
}
