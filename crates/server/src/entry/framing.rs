#![forbid(unsafe_code)]

use crate::{INVALID_REQUEST, JsonRpcRequest, PARSE_ERROR, json_rpc_error};
use serde_json::Value;
use std::io::{BufRead, Write};

const MAX_CONTENT_LENGTH_BYTES: usize = 16 * 1024 * 1024;

/// Wire framing, chosen from the first non-blank line and kept for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Framing {
    NewlineJson,
    ContentLength,
}

impl Framing {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::NewlineJson => "newline_json",
            Self::ContentLength => "content_length",
        }
    }

    pub(crate) fn detect(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            return Some(Self::NewlineJson);
        }
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("content-length:") || lower.starts_with("content-type:") {
            return Some(Self::ContentLength);
        }
        None
    }

    pub(crate) fn write<W: Write>(
        self,
        writer: &mut W,
        message: &Value,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Self::NewlineJson => {
                writeln!(writer, "{}", serde_json::to_string(message)?)?;
            }
            Self::ContentLength => {
                let body = serde_json::to_vec(message)?;
                write!(writer, "Content-Length: {}\r\n\r\n", body.len())?;
                writer.write_all(&body)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

fn parse_content_length_header(line: &str) -> Option<usize> {
    let (key, value) = line.trim().split_once(':')?;
    if !key.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}

/// Reads the rest of a header block starting at `first_header`, then the body.
/// `Ok(None)` means the peer closed the stream mid-frame.
pub(crate) fn read_content_length_frame<R: BufRead>(
    reader: &mut R,
    first_header: String,
) -> std::io::Result<Option<Vec<u8>>> {
    let mut header = first_header;
    let mut content_length = parse_content_length_header(&header);

    while !header.trim_end().is_empty() {
        header.clear();
        if reader.read_line(&mut header)? == 0 {
            return Ok(None);
        }
        if content_length.is_none() {
            content_length = parse_content_length_header(&header);
        }
    }

    let Some(len) = content_length else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Missing Content-Length header",
        ));
    };
    if len > MAX_CONTENT_LENGTH_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "Content-Length exceeds max allowed size",
        ));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Decodes one message. The error side is the JSON-RPC error to send back.
pub(crate) fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, Value> {
    let data: Value = serde_json::from_slice(body)
        .map_err(|e| json_rpc_error(None, PARSE_ERROR, &format!("Parse error: {e}")))?;

    let (id, has_method) = match data.as_object() {
        Some(obj) => (obj.get("id").cloned(), obj.contains_key("method")),
        None => return Err(json_rpc_error(None, INVALID_REQUEST, "Invalid Request")),
    };
    if !has_method {
        return Err(json_rpc_error(id, INVALID_REQUEST, "Invalid Request"));
    }

    serde_json::from_value::<JsonRpcRequest>(data)
        .map_err(|e| json_rpc_error(id, INVALID_REQUEST, &format!("Invalid Request: {e}")))
}
