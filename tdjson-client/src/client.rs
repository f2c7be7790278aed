//! Owned native client handle.
#![allow(unsafe_code)]

use std::ffi::{c_void, CString};
use std::ptr::NonNull;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tdjson_core::{ClientState, OptionValue, Request, Response, TdError, TdResult};

use crate::config::DEFAULT_RECEIVE_TIMEOUT;
use crate::ffi::FunctionTable;
use crate::state_machine::ClientStateMachine;

/// A native client handle with single-acquire/single-release semantics.
///
/// The handle is released by [`Client::destroy`] or [`Client::close`], or on
/// drop if neither was called. Holding a raw pointer, a client stays on the
/// thread that created it.
pub struct Client {
    table: Arc<FunctionTable>,
    handle: NonNull<c_void>,
    state_machine: ClientStateMachine,
    receive_timeout: Duration,
}

impl Client {
    /// Create a new native client.
    pub fn create(table: Arc<FunctionTable>) -> TdResult<Self> {
        let handle = table.create().ok_or(TdError::ClientCreation)?;

        let mut state_machine = ClientStateMachine::new();
        state_machine.on_created()?;
        tracing::debug!("Created tdjson client");

        Ok(Self {
            table,
            handle,
            state_machine,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
        })
    }

    /// Set the wait used by `receive_next` and `request_default`.
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Wait used by `receive_next` and `request_default`.
    pub fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }

    /// Get current state.
    pub fn state(&self) -> ClientState {
        self.state_machine.state()
    }

    /// Execute a raw JSON request synchronously.
    ///
    /// Blocks until the native call returns. `None` means the library
    /// produced no output.
    pub fn execute_raw(&mut self, request: &str) -> TdResult<Option<String>> {
        let request = to_c_string(request)?;
        self.state_machine.on_request()?;

        // SAFETY: the state machine is in `Created`, so the handle is live.
        let response = unsafe { self.table.execute(self.handle, &request) }?;
        tracing::debug!(
            "execute -> {}",
            if response.is_some() { "response" } else { "none" }
        );
        Ok(response)
    }

    /// Execute a request synchronously and parse the answer.
    ///
    /// Error objects become `TdError::Native`; no output becomes
    /// `TdError::MissingResponse`.
    pub fn execute(&mut self, request: &Request) -> TdResult<Response> {
        let json = request.to_json()?;
        let raw = self
            .execute_raw(&json)?
            .ok_or_else(|| TdError::MissingResponse {
                request: request.type_name.clone(),
            })?;
        Response::from_json(&raw)?.into_result()
    }

    /// Read a library option synchronously.
    pub fn get_option(&mut self, name: &str) -> TdResult<OptionValue> {
        OptionValue::try_from(self.execute(&Request::get_option(name))?)
    }

    /// Queue a request for asynchronous processing.
    pub fn send(&mut self, request: &Request) -> TdResult<()> {
        let request = to_c_string(&request.to_json()?)?;
        self.state_machine.on_request()?;

        // SAFETY: the state machine is in `Created`, so the handle is live.
        unsafe { self.table.send(self.handle, &request) };
        Ok(())
    }

    /// Wait up to `timeout` for the next response or update.
    pub fn receive(&mut self, timeout: Duration) -> TdResult<Option<Response>> {
        if self.state_machine.state() != ClientState::Created {
            return Err(TdError::ClientDestroyed);
        }

        // SAFETY: the handle is live in `Created`.
        let raw = unsafe { self.table.receive(self.handle, timeout.as_secs_f64()) }?;
        raw.as_deref().map(Response::from_json).transpose()
    }

    /// Wait the configured receive timeout for the next response or update.
    pub fn receive_next(&mut self) -> TdResult<Option<Response>> {
        self.receive(self.receive_timeout)
    }

    /// Send a request and wait for the response carrying the same `@extra`.
    ///
    /// Updates and unrelated responses received meanwhile are discarded. A
    /// timeout too large to form a deadline waits without one.
    pub fn request(&mut self, request: &Request, timeout: Duration) -> TdResult<Response> {
        let tag = uuid::Uuid::new_v4().to_string();
        self.send(&request.clone().with_extra(tag.clone()))?;

        let deadline = Instant::now().checked_add(timeout);
        loop {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            if remaining.is_zero() {
                return Err(TdError::Timeout);
            }

            match self.receive(remaining)? {
                Some(response) if extra_tag(&response) == Some(tag.as_str()) => {
                    return response.into_result();
                }
                Some(other) => {
                    tracing::debug!("Skipping `{}` while waiting for {}", other.type_name, tag);
                }
                None => {}
            }
        }
    }

    /// `request` with the configured receive timeout.
    pub fn request_default(&mut self, request: &Request) -> TdResult<Response> {
        self.request(request, self.receive_timeout)
    }

    /// Release the native handle and consume the client.
    pub fn destroy(mut self) -> TdResult<()> {
        self.close()
    }

    /// Release the native handle.
    ///
    /// Every later call fails with `TdError::ClientDestroyed` without
    /// reaching native code.
    pub fn close(&mut self) -> TdResult<()> {
        self.state_machine.on_destroy()?;

        // SAFETY: the transition to `Destroyed` succeeds once per handle, so
        // this is the only release and no call can follow it.
        unsafe { self.table.destroy(self.handle) };
        tracing::debug!(
            "Destroyed tdjson client after {} requests",
            self.state_machine.requests()
        );
        Ok(())
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if self.state_machine.state() == ClientState::Created {
            tracing::warn!("tdjson client dropped without destroy; releasing");
            let _ = self.close();
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state_machine.state())
            .field("requests", &self.state_machine.requests())
            .field("receive_timeout", &self.receive_timeout)
            .finish_non_exhaustive()
    }
}

fn extra_tag(response: &Response) -> Option<&str> {
    response.extra.as_ref().and_then(Value::as_str)
}

fn to_c_string(request: &str) -> TdResult<CString> {
    CString::new(request).map_err(|e| TdError::InvalidRequest(e.to_string()))
}
