//! # tdjson-core
//!
//! Core types for binding TDLib's JSON client interface (`tdjson`).
//!
//! This crate provides the error taxonomy, the JSON request/response
//! payloads, and the lifecycle automaton of a native client handle. It
//! performs no native calls itself; see `tdjson-client` for the binding.

pub mod error;
pub mod message;
pub mod state;

pub use error::{NativeError, TdError, TdResult, EXIT_LIBRARY_UNAVAILABLE, EXIT_RUNTIME_FAILURE};
pub use message::{OptionValue, Request, Response};
pub use state::{ClientEvent, ClientState};

/// Entry point names exported by the native library.
pub mod symbols {
    pub const CREATE: &str = "td_json_client_create";
    pub const SEND: &str = "td_json_client_send";
    pub const RECEIVE: &str = "td_json_client_receive";
    pub const EXECUTE: &str = "td_json_client_execute";
    pub const DESTROY: &str = "td_json_client_destroy";
}
