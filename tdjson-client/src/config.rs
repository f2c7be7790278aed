//! Library discovery configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an exact library path.
pub const LIBRARY_PATH_ENV: &str = "TDJSON_LIBRARY_PATH";

/// Default candidates, relative to the base directory.
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "td/build/libtdjson.dylib",
    "td/build/libtdjson.so",
    "td/build/libtdjson.a",
    "../td/build/libtdjson.dylib",
    "../td/build/libtdjson.so",
    "../td/build/libtdjson.a",
];

/// Default wait for `receive`.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(1);

/// Where to look for the native library and how to talk to it.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Directory the relative candidates are resolved against.
    pub base_dir: PathBuf,
    /// Ordered candidate paths.
    pub candidates: Vec<PathBuf>,
    /// Exact path that replaces the candidate search when set.
    pub override_path: Option<PathBuf>,
    /// Default wait for `receive`.
    pub receive_timeout: Duration,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            candidates: DEFAULT_CANDIDATES.iter().map(PathBuf::from).collect(),
            override_path: None,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
        }
    }
}

impl LibraryConfig {
    /// Default config, honoring `TDJSON_LIBRARY_PATH`.
    pub fn from_env() -> Self {
        Self::default().with_override_from(std::env::var_os(LIBRARY_PATH_ENV))
    }

    /// Resolve relative candidates against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Replace the candidate list.
    pub fn with_candidates<I, P>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    /// Use exactly this library path.
    pub fn with_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    /// Apply an override taken from the environment; empty values are ignored.
    pub fn with_override_from(self, value: Option<OsString>) -> Self {
        match value {
            Some(path) if !path.is_empty() => self.with_override(path),
            _ => self,
        }
    }

    /// Set the default receive timeout.
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Absolute paths to try, in order.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        if let Some(ref path) = self.override_path {
            return vec![absolute(path)];
        }
        self.candidates
            .iter()
            .map(|c| absolute(&self.base_dir.join(c)))
            .collect()
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
