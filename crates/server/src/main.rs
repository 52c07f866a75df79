#![forbid(unsafe_code)]

mod entry;
mod server;
mod support;

pub(crate) use server::ExplorerServer;
pub(crate) use support::*;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const PROTOCOL_VERSION: &str = "proofmind/1";
const SERVER_NAME: &str = "proofmind";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const CRASH_FILE: &str = "proofmind_last_crash.txt";
const ENV_LOG: &str = "PROOFMIND_LOG";

fn write_last_crash(log_dir: &Path, kind: &str, detail: &str) {
    let _ = std::fs::create_dir_all(log_dir);

    let mut out = String::new();
    let _ = writeln!(out, "ts={}", now_rfc3339());
    let _ = writeln!(out, "pid={}", std::process::id());
    let _ = writeln!(out, "kind={kind}");
    let _ = writeln!(out, "build={}", build_fingerprint());
    let _ = writeln!(out, "args={:?}", std::env::args().collect::<Vec<_>>());
    let _ = writeln!(out, "detail={detail}");

    let _ = std::fs::write(log_dir.join(CRASH_FILE), out);
}

fn install_crash_reporter(log_dir: PathBuf) {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut detail = info.to_string();
        let backtrace = std::backtrace::Backtrace::force_capture();
        let _ = write!(&mut detail, "\nbacktrace:\n{backtrace}");
        write_last_crash(&log_dir, "panic", &detail);
        default_hook(info);
    }));
}

/// Logs go to stderr; stdout carries the protocol.
fn init_tracing(fallback: Option<&str>) {
    let filter = EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| EnvFilter::new(fallback.unwrap_or("warn")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

fn usage() -> &'static str {
    "pm_server - proof explorer state machine over JSON-RPC (stdio)\n\n\
USAGE:\n\
  pm_server [--config FILE] [--log-dir DIR] [--id-prefix PREFIX]\n\
            [--tree-notifications|--no-tree-notifications] [--strict-init]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version/build and exit\n\
\n\
ENVIRONMENT:\n\
  PROOFMIND_CONFIG              YAML config file (same keys as the flags, snake_case)\n\
  PROOFMIND_LOG_DIR             Directory for the session and crash records\n\
  PROOFMIND_TREE_NOTIFICATIONS  Emit explorer/didChangeTree (1/0)\n\
  PROOFMIND_LOG                 tracing filter for stderr logs (default: warn)\n"
}

fn version_line() -> String {
    format!("pm_server {SERVER_VERSION} build={}", build_fingerprint())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let cfg = match ServerConfig::resolve(&args, |key| std::env::var(key).ok())? {
        Invocation::Help => {
            print!("{}", usage());
            return Ok(());
        }
        Invocation::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        Invocation::Serve(cfg) => cfg,
    };

    init_tracing(cfg.log_filter.as_deref());
    install_crash_reporter(cfg.log_dir.clone());
    let mut session = SessionLog::new(&cfg.log_dir);
    tracing::info!(
        build = %build_fingerprint(),
        log_dir = %cfg.log_dir.display(),
        tree_notifications = cfg.tree_notifications,
        strict_init = cfg.strict_init,
        "starting"
    );

    let mut server = ExplorerServer::new(&cfg);
    match entry::run_stdio(&mut server, &mut session) {
        Ok(reason) => {
            session.note_exit(reason.as_str());
            Ok(())
        }
        Err(err) => {
            let detail = err.to_string();
            tracing::error!(error = %detail, "transport failed");
            session.note_error(&detail);
            session.note_exit("transport_error");
            write_last_crash(&cfg.log_dir, "transport_error", &detail);
            Err(err)
        }
    }
}
