#![forbid(unsafe_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub(crate) const SESSION_FILE: &str = "proofmind_last_session.txt";

/// Bounded key=value record of the current session, rewritten on every note.
/// Request bodies never land here, only method names and error summaries.
#[derive(Clone, Debug)]
pub(crate) struct SessionLog {
    path: PathBuf,
    started: String,
    pid: u32,
    build: String,
    args: Vec<String>,
    framing: Option<String>,
    last_method: Option<String>,
    last_error: Option<String>,
    requests: u64,
    exit: Option<String>,
}

impl SessionLog {
    pub(crate) fn new(log_dir: &Path) -> Self {
        let this = Self {
            path: log_dir.join(SESSION_FILE),
            started: crate::now_rfc3339(),
            pid: std::process::id(),
            build: crate::build_fingerprint(),
            args: std::env::args().collect(),
            framing: None,
            last_method: None,
            last_error: None,
            requests: 0,
            exit: None,
        };
        this.flush();
        this
    }

    pub(crate) fn note_framing(&mut self, framing: &str) {
        self.framing = Some(framing.to_string());
        self.flush();
    }

    pub(crate) fn note_method(&mut self, method: &str) {
        let method = method.trim();
        if method.is_empty() {
            return;
        }
        self.requests += 1;
        self.last_method = Some(truncate(method, 96));
        self.flush();
    }

    pub(crate) fn note_error(&mut self, error: &str) {
        let error = error.trim();
        if error.is_empty() {
            return;
        }
        self.last_error = Some(truncate(error, 300));
        self.flush();
    }

    pub(crate) fn note_exit(&mut self, reason: &str) {
        self.exit = Some(truncate(reason.trim(), 120));
        self.flush();
    }

    fn render(&self) -> String {
        let mut out = String::new();
        push_kv(&mut out, "ts_start", &self.started);
        push_kv(&mut out, "pid", &self.pid.to_string());
        push_kv(&mut out, "build", &self.build);
        push_kv(&mut out, "args", &format!("{:?}", self.args));
        if let Some(framing) = &self.framing {
            push_kv(&mut out, "framing", framing);
        }
        push_kv(&mut out, "requests", &self.requests.to_string());
        if let Some(method) = &self.last_method {
            push_kv(&mut out, "last_method", method);
        }
        if let Some(err) = &self.last_error {
            push_kv(&mut out, "last_error", err);
        }
        if let Some(exit) = &self.exit {
            push_kv(&mut out, "exit", exit);
        }
        out
    }

    fn flush(&self) {
        if let Some(dir) = self.path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(err) = std::fs::write(&self.path, self.render()) {
            tracing::debug!(path = %self.path.display(), %err, "session record not written");
        }
    }
}

fn push_kv(out: &mut String, key: &str, value: &str) {
    let _ = writeln!(out, "{key}={value}");
}

fn truncate(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
