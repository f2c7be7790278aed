//! Native entry points of the tdjson library.
//!
//! Owns every crossing of the native boundary. The function table is bound
//! once, never rebound, and keeps the library mapped for as long as it is
//! alive.
#![allow(unsafe_code)]

use std::ffi::{c_char, c_double, c_void, CStr};
use std::fmt;
use std::path::Path;
use std::ptr::NonNull;

use libloading::Library;
use tdjson_core::{symbols, TdError, TdResult};

use crate::library::NativeLibrary;

/// `void *td_json_client_create(void)`
pub type CreateFn = unsafe extern "C" fn() -> *mut c_void;
/// `void td_json_client_send(void *client, const char *request)`
pub type SendFn = unsafe extern "C" fn(*mut c_void, *const c_char);
/// `const char *td_json_client_receive(void *client, double timeout)`
pub type ReceiveFn = unsafe extern "C" fn(*mut c_void, c_double) -> *const c_char;
/// `const char *td_json_client_execute(void *client, const char *request)`
pub type ExecuteFn = unsafe extern "C" fn(*mut c_void, *const c_char) -> *const c_char;
/// `void td_json_client_destroy(void *client)`
pub type DestroyFn = unsafe extern "C" fn(*mut c_void);

/// The five entry points of the JSON client interface.
#[derive(Debug, Clone, Copy)]
pub struct EntryPoints {
    pub create: CreateFn,
    pub send: SendFn,
    pub receive: ReceiveFn,
    pub execute: ExecuteFn,
    pub destroy: DestroyFn,
}

/// Immutable table of bound entry points.
pub struct FunctionTable {
    entry: EntryPoints,
    // Keeps the entry points mapped. `None` for tables built from
    // in-process functions.
    library: Option<NativeLibrary>,
}

impl FunctionTable {
    /// Bind all entry points from a loaded library.
    ///
    /// Fails with `SignatureBinding` on the first missing symbol.
    pub fn bind(library: NativeLibrary) -> TdResult<Self> {
        let lib = library.raw();
        let entry = EntryPoints {
            create: lookup::<CreateFn>(lib, symbols::CREATE)?,
            send: lookup::<SendFn>(lib, symbols::SEND)?,
            receive: lookup::<ReceiveFn>(lib, symbols::RECEIVE)?,
            execute: lookup::<ExecuteFn>(lib, symbols::EXECUTE)?,
            destroy: lookup::<DestroyFn>(lib, symbols::DESTROY)?,
        };
        tracing::debug!("Bound tdjson entry points from {}", library.path().display());

        Ok(Self {
            entry,
            library: Some(library),
        })
    }

    /// Build a table from entry points that live in this process.
    ///
    /// # Safety
    ///
    /// The functions must follow the tdjson contract: create returns null or
    /// a handle accepted by the other four until it is passed to destroy;
    /// receive and execute return null or a NUL-terminated string that stays
    /// valid until the next call on the same thread.
    pub unsafe fn from_entry_points(entry: EntryPoints) -> Self {
        Self {
            entry,
            library: None,
        }
    }

    /// Path of the library the table was bound from.
    pub fn library_path(&self) -> Option<&Path> {
        self.library.as_ref().map(NativeLibrary::path)
    }

    pub(crate) fn create(&self) -> Option<NonNull<c_void>> {
        // SAFETY: create takes no arguments; the table contract guarantees
        // the signature.
        let raw = unsafe { (self.entry.create)() };
        NonNull::new(raw)
    }

    /// # Safety
    ///
    /// `handle` must come from `create` on this table and not be destroyed.
    pub(crate) unsafe fn send(&self, handle: NonNull<c_void>, request: &CStr) {
        // SAFETY: handle is live per the caller; request is NUL-terminated and
        // outlives the call.
        unsafe { (self.entry.send)(handle.as_ptr(), request.as_ptr()) }
    }

    /// # Safety
    ///
    /// `handle` must come from `create` on this table and not be destroyed.
    pub(crate) unsafe fn receive(
        &self,
        handle: NonNull<c_void>,
        timeout_secs: f64,
    ) -> TdResult<Option<String>> {
        // SAFETY: handle is live per the caller.
        let raw = unsafe { (self.entry.receive)(handle.as_ptr(), timeout_secs) };
        // SAFETY: receive returns null or a string valid until the next call.
        unsafe { copy_response(raw) }
    }

    /// # Safety
    ///
    /// `handle` must come from `create` on this table and not be destroyed.
    pub(crate) unsafe fn execute(
        &self,
        handle: NonNull<c_void>,
        request: &CStr,
    ) -> TdResult<Option<String>> {
        // SAFETY: handle is live per the caller; request is NUL-terminated and
        // outlives the call.
        let raw = unsafe { (self.entry.execute)(handle.as_ptr(), request.as_ptr()) };
        // SAFETY: execute returns null or a string valid until the next call.
        unsafe { copy_response(raw) }
    }

    /// # Safety
    ///
    /// `handle` must come from `create` on this table and must not be used
    /// again after this call.
    pub(crate) unsafe fn destroy(&self, handle: NonNull<c_void>) {
        // SAFETY: handle is live per the caller and released exactly once.
        unsafe { (self.entry.destroy)(handle.as_ptr()) }
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTable")
            .field("library", &self.library_path())
            .finish_non_exhaustive()
    }
}

/// Load a shared library with the OS loader.
pub(crate) fn open_library(path: &Path) -> TdResult<Library> {
    // SAFETY: loading runs the library's initializers. The path is chosen by
    // the operator as a tdjson build.
    unsafe { Library::new(path) }.map_err(|e| TdError::load(path, e))
}

fn lookup<T: Copy>(lib: &Library, name: &str) -> TdResult<T> {
    // SAFETY: T is one of the entry point types above, which match the
    // exported C declarations. The copied pointer stays valid while the
    // table owns the library.
    let symbol = unsafe { lib.get::<T>(name.as_bytes()) }.map_err(|e| {
        TdError::SignatureBinding {
            symbol: name.to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok(*symbol)
}

/// Copy a native response into an owned string.
///
/// # Safety
///
/// `raw` must be null or point to a NUL-terminated string that stays valid
/// for the duration of this call.
unsafe fn copy_response(raw: *const c_char) -> TdResult<Option<String>> {
    if raw.is_null() {
        return Ok(None);
    }
    // SAFETY: non-null and NUL-terminated per the caller.
    let bytes = unsafe { CStr::from_ptr(raw) };
    bytes
        .to_str()
        .map(|s| Some(s.to_owned()))
        .map_err(|e| TdError::RequestExecution(format!("response is not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::path::PathBuf;

    #[test]
    fn table_is_shareable() {
        fn shareable<T: Send + Sync>() {}
        shareable::<FunctionTable>();
    }

    #[cfg(unix)]
    #[test]
    fn library_without_entry_points_fails_to_bind() {
        // The test executable exports none of the tdjson symbols.
        let lib = Library::from(libloading::os::unix::Library::this());
        let library = NativeLibrary::from_parts(PathBuf::from("<self>"), lib);

        match FunctionTable::bind(library) {
            Err(TdError::SignatureBinding { symbol, reason }) => {
                assert_eq!(symbol, symbols::CREATE);
                assert!(!reason.is_empty());
            }
            other => panic!("expected a binding error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn copy_response_null_is_absent() {
        // SAFETY: null is accepted.
        let out = unsafe { copy_response(std::ptr::null()) }.unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn copy_response_rejects_invalid_utf8() {
        let raw = CString::new(vec![0xff, 0xfe]).unwrap();
        // SAFETY: raw is a live NUL-terminated string.
        let out = unsafe { copy_response(raw.as_ptr()) };
        assert!(matches!(out, Err(TdError::RequestExecution(_))));
    }

    #[test]
    fn copy_response_owns_the_text() {
        let raw = CString::new(r#"{"@type":"ok"}"#).unwrap();
        // SAFETY: raw is a live NUL-terminated string.
        let out = unsafe { copy_response(raw.as_ptr()) }.unwrap();
        drop(raw);
        assert_eq!(out.as_deref(), Some(r#"{"@type":"ok"}"#));
    }
}
