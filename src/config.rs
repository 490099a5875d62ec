//! Run configuration: tape size, program path and end-of-input behaviour.
//!
//! Values come from command-line arguments first, then the environment, then
//! built-in defaults. Everything is validated here so that a bad setting is
//! reported before the program file is touched.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::num::{IntErrorKind, NonZeroUsize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::tape::Tape;

/// Cells on the tape when `-t` is not given.
pub const DEFAULT_TAPE_SIZE: usize = 30_000;

/// Largest tape `-t` accepts.
pub const MAX_TAPE_SIZE: usize = 60_000;

/// Resolved program paths are cut to one less than this many characters.
pub const MAX_PATH_LENGTH: usize = 1024;

pub(crate) const DEFAULT_TAPE: NonZeroUsize = NonZeroUsize::new(DEFAULT_TAPE_SIZE).unwrap();

/// Environment variable selecting the [`EofPolicy`].
pub const EOF_ENV: &str = "BF_EOF";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tape size expected, got nothing")]
    MissingTapeSize,

    #[error("could not understand tape size {value:?}; expected a decimal number of cells")]
    InvalidTapeSize { value: String },

    #[error("tape size can not be bigger than {max} (got {value})")]
    TapeSizeTooLarge { value: String, max: usize },

    #[error("tape size must be at least 1")]
    ZeroTapeSize,

    #[error("HOME environment variable not set; cannot expand {path:?}")]
    HomeNotSet { path: String },

    #[error("no program file given")]
    MissingProgram,

    #[error("unknown {EOF_ENV} value {value:?}; expected one of: zero, unchanged, max")]
    InvalidEofPolicy { value: String },
}

/// What `,` stores in the current cell when input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EofPolicy {
    /// Set the cell to 0.
    #[default]
    Zero,
    /// Leave the cell as it was.
    Unchanged,
    /// Set the cell to 255, the byte a C `getchar()` EOF truncates to.
    Max,
}

impl EofPolicy {
    pub(crate) fn apply(self, tape: &mut Tape) {
        match self {
            EofPolicy::Zero => tape.set(0),
            EofPolicy::Unchanged => {}
            EofPolicy::Max => tape.set(u8::MAX),
        }
    }
}

impl FromStr for EofPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "0" => Ok(EofPolicy::Zero),
            "unchanged" | "keep" => Ok(EofPolicy::Unchanged),
            "max" | "255" => Ok(EofPolicy::Max),
            _ => Err(ConfigError::InvalidEofPolicy { value: s.to_string() }),
        }
    }
}

impl fmt::Display for EofPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EofPolicy::Zero => write!(f, "zero"),
            EofPolicy::Unchanged => write!(f, "unchanged"),
            EofPolicy::Max => write!(f, "max"),
        }
    }
}

/// Fully validated settings for one interpreter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tape_size: NonZeroUsize,
    pub program_path: PathBuf,
    pub eof_policy: EofPolicy,
}

impl Config {
    /// Build a config from the raw `-t` value (if any), the positional
    /// arguments and an environment lookup.
    ///
    /// The tape size is checked first, then the path, then the environment.
    /// When several positionals are given the last one is used. Paths and
    /// environment values need not be UTF-8.
    pub fn resolve<F>(tape_size: Option<&str>, programs: &[PathBuf], env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let tape_size = match tape_size {
            Some(raw) => parse_tape_size(raw)?,
            None => DEFAULT_TAPE,
        };

        let raw_path = programs.last().ok_or(ConfigError::MissingProgram)?;
        let program_path = expand_path(raw_path, env("HOME").as_deref())?;

        let eof_policy = match env(EOF_ENV) {
            Some(value) => value
                .to_str()
                .ok_or_else(|| ConfigError::InvalidEofPolicy {
                    value: value.to_string_lossy().into_owned(),
                })?
                .parse()?,
            None => EofPolicy::default(),
        };

        Ok(Self {
            tape_size,
            program_path,
            eof_policy,
        })
    }

    /// [`Config::resolve`] against the process environment.
    pub fn from_env(tape_size: Option<&str>, programs: &[PathBuf]) -> Result<Self, ConfigError> {
        Self::resolve(tape_size, programs, |key| std::env::var_os(key))
    }
}

/// Parse the value of `-t` as a number of cells in `1..=MAX_TAPE_SIZE`.
pub fn parse_tape_size(raw: &str) -> Result<NonZeroUsize, ConfigError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingTapeSize);
    }

    let cells = match value.parse::<usize>() {
        Ok(n) => n,
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
            return Err(ConfigError::TapeSizeTooLarge {
                value: value.to_string(),
                max: MAX_TAPE_SIZE,
            });
        }
        Err(_) => {
            return Err(ConfigError::InvalidTapeSize {
                value: value.to_string(),
            });
        }
    };

    if cells > MAX_TAPE_SIZE {
        return Err(ConfigError::TapeSizeTooLarge {
            value: value.to_string(),
            max: MAX_TAPE_SIZE,
        });
    }

    NonZeroUsize::new(cells).ok_or(ConfigError::ZeroTapeSize)
}

/// Expand a leading `~/` to `home` and cap the result at
/// `MAX_PATH_LENGTH - 1` characters.
pub fn expand_path(raw: &Path, home: Option<&OsStr>) -> Result<PathBuf, ConfigError> {
    let expanded = if raw.as_os_str().as_encoded_bytes().starts_with(b"~/") {
        let home = home.ok_or_else(|| ConfigError::HomeNotSet {
            path: raw.display().to_string(),
        })?;
        let rest = raw.strip_prefix("~").unwrap_or(raw);
        let mut joined = home.to_os_string();
        joined.push("/");
        joined.push(rest);
        joined
    } else {
        raw.as_os_str().to_os_string()
    };

    Ok(PathBuf::from(truncate_path(expanded, MAX_PATH_LENGTH - 1)))
}

fn truncate_path(path: OsString, max_chars: usize) -> OsString {
    match path.into_string() {
        Ok(s) => truncate_chars(s, max_chars).into(),
        Err(raw) => truncate_bytes(raw, max_chars),
    }
}

fn truncate_chars(mut s: String, max_chars: usize) -> String {
    if let Some((byte_idx, _)) = s.char_indices().nth(max_chars) {
        tracing::debug!(len = s.chars().count(), max_chars, "truncating program path");
        s.truncate(byte_idx);
    }
    s
}

// Paths that are not UTF-8 have no characters to count; cut raw bytes.
#[cfg(unix)]
fn truncate_bytes(raw: OsString, max_bytes: usize) -> OsString {
    use std::os::unix::ffi::OsStringExt;

    let mut bytes = raw.into_vec();
    if bytes.len() > max_bytes {
        tracing::debug!(len = bytes.len(), max_bytes, "truncating program path");
        bytes.truncate(max_bytes);
    }
    OsString::from_vec(bytes)
}

#[cfg(not(unix))]
fn truncate_bytes(raw: OsString, _max_bytes: usize) -> OsString {
    raw
}
