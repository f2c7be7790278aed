//! Discovery and loading of the native library.

use std::path::{Path, PathBuf};

use libloading::Library;
use tdjson_core::{TdError, TdResult};

use crate::ffi;

/// A loaded native library and the path it came from.
#[derive(Debug)]
pub struct NativeLibrary {
    path: PathBuf,
    lib: Library,
}

impl NativeLibrary {
    /// Load the first candidate that exists.
    ///
    /// Candidates that do not exist are skipped without a load attempt. The
    /// first existing candidate is loaded and later ones are ignored, so a
    /// load failure there is final.
    pub fn resolve(candidates: &[PathBuf]) -> TdResult<Self> {
        let (path, lib) = resolve_with(candidates, ffi::open_library)?;
        tracing::info!("Loaded tdjson from {}", path.display());
        Ok(Self { path, lib })
    }

    /// Load a library from an exact path.
    pub fn load(path: impl AsRef<Path>) -> TdResult<Self> {
        Self::resolve(&[path.as_ref().to_path_buf()])
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn from_parts(path: PathBuf, lib: Library) -> Self {
        Self { path, lib }
    }

    pub(crate) fn raw(&self) -> &Library {
        &self.lib
    }
}

/// Walk `candidates` in order, loading the first one that exists.
pub(crate) fn resolve_with<L, F>(candidates: &[PathBuf], mut load: F) -> TdResult<(PathBuf, L)>
where
    F: FnMut(&Path) -> TdResult<L>,
{
    for candidate in candidates {
        if !candidate.exists() {
            tracing::debug!("No library at {}", candidate.display());
            continue;
        }
        let lib = load(candidate)?;
        return Ok((candidate.clone(), lib));
    }

    Err(TdError::LibraryNotFound {
        candidates: candidates.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn missing_candidates_never_load() {
        let dir = tempfile::tempdir().unwrap();
        let candidates = vec![
            dir.path().join("td/build/libtdjson.dylib"),
            dir.path().join("td/build/libtdjson.so"),
        ];

        let mut attempts = 0;
        let result = resolve_with(&candidates, |_| {
            attempts += 1;
            Ok(())
        });

        match result {
            Err(TdError::LibraryNotFound { candidates: tried }) => assert_eq!(tried, candidates),
            other => panic!("expected LibraryNotFound, got {:?}", other.map(|(p, _)| p)),
        }
        assert_eq!(attempts, 0);
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.so");
        let first = dir.path().join("first.so");
        let second = dir.path().join("second.so");
        fs::write(&first, b"").unwrap();
        fs::write(&second, b"").unwrap();

        let mut loaded = Vec::new();
        let (path, lib) = resolve_with(&[missing, first.clone(), second], |p| {
            loaded.push(p.to_path_buf());
            Ok(p.to_path_buf())
        })
        .unwrap();

        assert_eq!(path, first);
        assert_eq!(lib, first);
        assert_eq!(loaded, vec![first]);
    }

    #[test]
    fn load_failure_is_final() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.so");
        let good = dir.path().join("good.so");
        fs::write(&broken, b"").unwrap();
        fs::write(&good, b"").unwrap();

        let result = resolve_with(&[broken.clone(), good], |p| {
            Err::<(), _>(TdError::load(p, "wrong architecture"))
        });

        match result {
            Err(TdError::LibraryLoad { path, reason }) => {
                assert_eq!(path, broken);
                assert_eq!(reason, "wrong architecture");
            }
            other => panic!("expected LibraryLoad, got {:?}", other.map(|(p, _)| p)),
        }
    }

    #[test]
    fn garbage_file_is_rejected_by_the_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libtdjson.so");
        fs::write(&path, b"this is not a shared object").unwrap();

        match NativeLibrary::load(&path) {
            Err(TdError::LibraryLoad { path: failed, .. }) => assert_eq!(failed, path),
            Err(other) => panic!("expected LibraryLoad, got {}", other),
            Ok(_) => panic!("garbage file loaded"),
        }
    }
}
