use std::collections::HashMap;
use std::env as stdenv;
use std::path::{Path, PathBuf};

use crate::history::History;

/// Per-session state threaded through every dispatch call.
///
/// The session contains:
/// - `vars`: environment variables handed to external programs (and `PATH`
///   used to find them).
/// - `current_dir`: the directory every relative path is resolved against.
/// - `history`: the lines submitted in this session.
///
/// The process working directory is never changed; `cd` only moves the
/// session. Callers that share one session between threads have to guard it
/// themselves.
#[derive(Debug, Clone)]
pub struct Session {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
    /// Every non-empty line submitted so far.
    pub history: History,
}

impl Session {
    /// Capture the current process state into a new `Session`.
    ///
    /// Variables are copied from `std::env::vars()` and `current_dir` from
    /// `std::env::current_dir()`. History starts out empty.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_dir(current_dir)
    }

    /// Same as [`Session::new`] but starting in `dir`.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            vars: stdenv::vars().collect(),
            current_dir: dir.into(),
            history: History::new(),
        }
    }

    /// Get the value of an environment variable.
    ///
    /// Looks up the key in `self.vars` first, falling back to `std::env::var`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }

    /// Resolve a user supplied path against the session directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
