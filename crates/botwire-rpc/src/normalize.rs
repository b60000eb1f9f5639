//! Turns a [`ParameterBag`] into a [`TransportRequest`].
//!
//! Unset and `null` parameters are dropped, entities are expanded into plain
//! JSON, and file references are opened. A file nested inside a list or
//! object is lifted into its own part named `<param>_<index>` and replaced by
//! `attach://<param>_<index>`.

use std::io;
use std::path::Path;

use serde_json::{Map, Number, Value};
use tracing::trace;

use botwire_types::InputFile;

use crate::error::{Error, Result};
use crate::protocol::{FilePart, ParamValue, ParameterBag, TransportRequest};

/// Normalize `bag` into a transport-ready request.
///
/// # Errors
///
/// Returns [`Error::Upload`] when a file reference cannot be opened,
/// [`Error::Encode`] when a value cannot be expressed as JSON (including NaN
/// and infinite floats), and [`Error::PartNameCollision`] when a lifted file
/// part would take the name of another parameter.
pub async fn normalize(bag: ParameterBag) -> Result<TransportRequest> {
    let mut request = TransportRequest::new();

    for (key, value) in bag {
        if value.is_unset() {
            trace!(param = %key, "dropping unset parameter");
            continue;
        }

        if let ParamValue::File(file) = value {
            let part = resolve_file(file).await?;
            trace!(param = %key, file_name = part.file_name(), "file part");
            claim(&request, &key)?;
            request.insert_file(key, part);
            continue;
        }

        let mut lifted = Vec::new();
        let json = expand(&key, value, &mut lifted)?;
        for (name, file) in lifted {
            let part = resolve_file(file).await?;
            trace!(param = %name, file_name = part.file_name(), "lifted file part");
            claim(&request, &name)?;
            request.insert_file(name, part);
        }
        if !json.is_null() {
            claim(&request, &key)?;
            request.insert_json(key, json);
        }
    }

    trace!(keys = ?request.keys().collect::<Vec<_>>(), "normalized request");
    Ok(request)
}

/// Bag keys are unique, so a taken name means a lifted part collided.
fn claim(request: &TransportRequest, name: &str) -> Result<()> {
    if request.contains_key(name) {
        return Err(Error::PartNameCollision(name.to_string()));
    }
    Ok(())
}

fn expand(param: &str, value: ParamValue, lifted: &mut Vec<(String, InputFile)>) -> Result<Value> {
    match value {
        ParamValue::Unset => Ok(Value::Null),
        ParamValue::Json(json) => Ok(json),
        ParamValue::Float(number) => Number::from_f64(number)
            .map(Value::Number)
            .ok_or_else(|| Error::Encode {
                param: param.to_string(),
                source: <serde_json::Error as serde::ser::Error>::custom(format!("non-finite float {number}")),
            }),
        ParamValue::Entity(entity) => entity.to_plain().map_err(|source| Error::Encode {
            param: param.to_string(),
            source,
        }),
        ParamValue::List(items) => items
            .into_iter()
            .map(|item| expand(param, item, lifted))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        ParamValue::Object(entries) => {
            let mut object = Map::new();
            for (key, entry) in entries {
                // Only the top-level bag drops explicit nulls.
                if matches!(entry, ParamValue::Unset) {
                    continue;
                }
                object.insert(key, expand(param, entry, lifted)?);
            }
            Ok(Value::Object(object))
        }
        ParamValue::File(file) => {
            let name = format!("{param}_{}", lifted.len());
            let reference = format!("attach://{name}");
            lifted.push((name, file));
            Ok(Value::String(reference))
        }
    }
}

/// Open a file reference for upload.
///
/// # Errors
///
/// Returns [`Error::Upload`] when a path does not exist, is a directory, or
/// cannot be opened for reading.
pub async fn resolve_file(file: InputFile) -> Result<FilePart> {
    match file {
        InputFile::Path(path) => open_path(&path).await,
        InputFile::Reader { file_name, reader } => Ok(FilePart::from_boxed(file_name, reader)),
        InputFile::Memory { file_name, data } => Ok(FilePart::new(file_name, io::Cursor::new(data))),
    }
}

async fn open_path(path: &Path) -> Result<FilePart> {
    let upload_error = |source| Error::Upload {
        path: path.to_path_buf(),
        source,
    };

    let metadata = tokio::fs::metadata(path).await.map_err(upload_error)?;
    if metadata.is_dir() {
        return Err(upload_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "is a directory",
        )));
    }

    let handle = tokio::fs::File::open(path).await.map_err(upload_error)?;
    let file_name = InputFile::Path(path.to_path_buf()).file_name();
    Ok(FilePart::new(file_name, handle))
}
