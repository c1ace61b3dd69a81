//! Response stages: gzip decompression, JSON parsing, typed list filtering.

use std::io::Read;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::Response;
use crate::error::{Error, Result};

/// Inflate a gzip body. An empty body is already decoded.
pub fn decompress(body: &[u8]) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();
    if body.is_empty() {
        return Ok(decompressed);
    }

    GzDecoder::new(body)
        .read_to_end(&mut decompressed)
        .map_err(Error::Decompression)?;
    Ok(decompressed)
}

/// Parse a decompressed body. An empty body parses to `null`.
pub fn parse(bytes: &[u8]) -> Result<Value> {
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(Error::Parse)
}

/// Keep the items of `root` whose `kind` equals `kind`, converted to `T`.
///
/// Items of other kinds are skipped. A `null` root is an empty list.
pub fn typed_list<T: DeserializeOwned>(kind: &str, root: &Value) -> Result<Vec<T>> {
    let items = match root {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(Error::Decode {
                kind: kind.to_string(),
                reason: "expected an array of items".to_string(),
            });
        }
    };

    items
        .iter()
        .filter(|item| item.get("kind").and_then(Value::as_str) == Some(kind))
        .map(|item| {
            T::deserialize(item).map_err(|e| Error::Decode {
                kind: kind.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Turn a complete raw response into `decode`'s result.
///
/// Failure statuses carry the server's `error` message, or the first of its
/// `errors[].error_message` entries.
pub fn handle_response<T, F>(response: Response, decode: F) -> Result<T>
where
    F: FnOnce(&Value) -> Result<T>,
{
    let decompressed = decompress(&response.body)?;

    if !response.status.is_success() {
        let root = parse(&decompressed).unwrap_or(Value::Null);
        return Err(Error::Server {
            status: response.status.as_u16(),
            message: server_message(&root)
                .unwrap_or_else(|| format!("HTTP {}", response.status)),
        });
    }

    let root = parse(&decompressed)?;
    decode(&root)
}

fn server_message(root: &Value) -> Option<String> {
    root.get("error")
        .and_then(Value::as_str)
        .or_else(|| root.pointer("/errors/0/error_message").and_then(Value::as_str))
        .map(str::to_string)
}
