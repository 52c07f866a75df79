#![forbid(unsafe_code)]

use super::framing::{Framing, parse_request, read_content_length_frame};
use crate::{ExplorerServer, SessionLog};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};

/// Why the transport loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StopReason {
    Eof,
    Exit,
}

impl StopReason {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Eof => "eof",
            Self::Exit => "exit",
        }
    }
}

pub(crate) fn run_stdio(
    server: &mut ExplorerServer,
    session: &mut SessionLog,
) -> Result<StopReason, Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();
    serve(server, session, &mut reader, &mut stdout)
}

/// Reads requests until EOF or `exit`. Framing is fixed by the first meaningful line so
/// replies and notifications never mix styles on one transport.
pub(crate) fn serve<R: BufRead, W: Write>(
    server: &mut ExplorerServer,
    session: &mut SessionLog,
    reader: &mut R,
    writer: &mut W,
) -> Result<StopReason, Box<dyn std::error::Error>> {
    let mut framing: Option<Framing> = None;

    loop {
        if server.exit_requested() {
            return Ok(StopReason::Exit);
        }

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(StopReason::Eof);
        }

        let mode = match framing {
            Some(mode) => mode,
            None => {
                let Some(detected) = Framing::detect(&line) else {
                    continue;
                };
                tracing::info!(framing = detected.as_str(), "transport framing detected");
                session.note_framing(detected.as_str());
                framing = Some(detected);
                detected
            }
        };

        match mode {
            Framing::NewlineJson => {
                let raw = line.trim();
                if raw.is_empty() {
                    continue;
                }
                dispatch(server, session, writer, mode, raw.as_bytes())?;
            }
            Framing::ContentLength => {
                if line.trim().is_empty() {
                    continue;
                }
                let Some(body) = read_content_length_frame(reader, line)? else {
                    return Ok(StopReason::Eof);
                };
                dispatch(server, session, writer, mode, &body)?;
            }
        }
    }
}

fn dispatch<W: Write>(
    server: &mut ExplorerServer,
    session: &mut SessionLog,
    writer: &mut W,
    framing: Framing,
    body: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let reply = match parse_request(body) {
        Ok(request) => {
            session.note_method(&request.method);
            server.handle(request)
        }
        Err(error) => Some(error),
    };

    if let Some(reply) = reply {
        if let Some(message) = error_message(&reply) {
            session.note_error(message);
        }
        framing.write(writer, &reply)?;
    }
    for notification in server.take_notifications() {
        framing.write(writer, &notification)?;
    }
    Ok(())
}

fn error_message(reply: &Value) -> Option<&str> {
    reply.get("error")?.get("message")?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ServerConfig;
    use serde_json::json;
    use std::io::Cursor;

    fn harness(test_name: &str) -> (ExplorerServer, SessionLog, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("pm_stdio_{test_name}_{}", std::process::id()));
        let cfg = ServerConfig {
            log_dir: dir.clone(),
            ..ServerConfig::default()
        };
        (ExplorerServer::new(&cfg), SessionLog::new(&dir), dir)
    }

    fn lines(out: Vec<u8>) -> Vec<Value> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn newline_session_replies_in_order_and_skips_blank_lines() {
        let (mut server, mut session, dir) = harness("newline");
        let input = "\n\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n\n{not json}\n";
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let reason = serve(&mut server, &mut session, &mut reader, &mut out).unwrap();
        assert_eq!(reason, StopReason::Eof);
        let replies = lines(out);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0], json!({ "jsonrpc": "2.0", "id": 1, "result": {} }));
        assert_eq!(replies[1]["error"]["code"], crate::PARSE_ERROR);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn content_length_session_keeps_its_framing() {
        let (mut server, mut session, dir) = harness("content_length");
        let body = r#"{"jsonrpc":"2.0","id":7,"method":"ping"}"#;
        let input = format!("Content-Length: {}\r\n\r\n{body}", body.len());
        let mut reader = Cursor::new(input.into_bytes());
        let mut out = Vec::new();
        serve(&mut server, &mut session, &mut reader, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Content-Length: "));
        let (_, reply) = text.split_once("\r\n\r\n").unwrap();
        let reply: Value = serde_json::from_str(reply).unwrap();
        assert_eq!(reply["id"], 7);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn exit_stops_the_loop_before_reading_further() {
        let (mut server, mut session, dir) = harness("exit");
        let input = concat!(
            "{\"jsonrpc\":\"2.0\",\"method\":\"exit\"}\n",
            "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n",
        );
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let reason = serve(&mut server, &mut session, &mut reader, &mut out).unwrap();
        assert_eq!(reason, StopReason::Exit);
        assert!(out.is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }
}
