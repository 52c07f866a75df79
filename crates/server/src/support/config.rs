#![forbid(unsafe_code)]

use serde::Deserialize;
use std::path::PathBuf;

pub(crate) const ENV_CONFIG: &str = "PROOFMIND_CONFIG";
pub(crate) const ENV_LOG_DIR: &str = "PROOFMIND_LOG_DIR";
pub(crate) const ENV_TREE_NOTIFICATIONS: &str = "PROOFMIND_TREE_NOTIFICATIONS";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{0} needs a value")]
    MissingValue(String),
    #[error("unknown flag {0} (see --help)")]
    UnknownFlag(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Server settings. Later layers win: defaults, YAML file, environment, flags.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ServerConfig {
    /// Directory for the session record and the last-crash file.
    pub(crate) log_dir: PathBuf,
    /// Emit `explorer/didChangeTree` after every tree mutation.
    pub(crate) tree_notifications: bool,
    /// Answer -32002 until the client completes the handshake.
    pub(crate) strict_init: bool,
    /// Prefix for ids minted for nodes the prover did not name.
    pub(crate) id_prefix: String,
    /// Fallback tracing filter when `PROOFMIND_LOG` is unset.
    pub(crate) log_filter: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir().join("proofmind"),
            tree_notifications: false,
            strict_init: false,
            id_prefix: "pm".to_string(),
            log_filter: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Invocation {
    Help,
    Version,
    Serve(ServerConfig),
}

impl ServerConfig {
    /// Resolves the invocation from process arguments (without argv[0]) and an
    /// environment lookup.
    pub(crate) fn resolve<F>(args: &[String], env: F) -> Result<Invocation, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if args.iter().any(|arg| matches!(arg.as_str(), "-h" | "--help")) {
            return Ok(Invocation::Help);
        }
        if args.iter().any(|arg| matches!(arg.as_str(), "-V" | "--version")) {
            return Ok(Invocation::Version);
        }

        let file = flag_value(args, "--config")?
            .or_else(|| env(ENV_CONFIG))
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        let mut cfg = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(dir) = env(ENV_LOG_DIR).filter(|dir| !dir.trim().is_empty()) {
            cfg.log_dir = PathBuf::from(dir);
        }
        if let Some(raw) = env(ENV_TREE_NOTIFICATIONS) {
            cfg.tree_notifications = parse_bool(ENV_TREE_NOTIFICATIONS, &raw)?;
        }

        cfg.apply_flags(args)?;
        if cfg.id_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "id_prefix".to_string(),
                value: cfg.id_prefix,
            });
        }
        Ok(Invocation::Serve(cfg))
    }

    fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    fn apply_flags(&mut self, args: &[String]) -> Result<(), ConfigError> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => {
                    // Already consumed.
                    iter.next();
                }
                "--log-dir" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    self.log_dir = PathBuf::from(value);
                }
                "--id-prefix" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| ConfigError::MissingValue(arg.clone()))?;
                    self.id_prefix = value.clone();
                }
                "--tree-notifications" => self.tree_notifications = true,
                "--no-tree-notifications" => self.tree_notifications = false,
                "--strict-init" => self.strict_init = true,
                other => return Err(ConfigError::UnknownFlag(other.to_string())),
            }
        }
        Ok(())
    }
}

fn flag_value(args: &[String], flag: &str) -> Result<Option<String>, ConfigError> {
    let Some(pos) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    args.get(pos + 1)
        .cloned()
        .map(Some)
        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
