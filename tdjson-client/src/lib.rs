//! Runtime binding for TDLib's JSON client interface.
//!
//! # Example
//!
//! ```no_run
//! use tdjson_client::{LibraryConfig, TdJson};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tdjson = TdJson::open(&LibraryConfig::from_env())?;
//!     let mut client = tdjson.create_client()?;
//!
//!     let version = client.get_option("version")?;
//!     println!("TDLib {}", version);
//!
//!     client.destroy()?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod ffi;
mod library;
mod state_machine;

pub use client::Client;
pub use config::{LibraryConfig, DEFAULT_CANDIDATES, DEFAULT_RECEIVE_TIMEOUT, LIBRARY_PATH_ENV};
pub use ffi::{CreateFn, DestroyFn, EntryPoints, ExecuteFn, FunctionTable, ReceiveFn, SendFn};
pub use library::NativeLibrary;
pub use state_machine::ClientStateMachine;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tdjson_core::TdResult;

/// A bound tdjson library from which clients are created.
#[derive(Debug, Clone)]
pub struct TdJson {
    table: Arc<FunctionTable>,
    receive_timeout: Duration,
}

impl TdJson {
    /// Find, load and bind the library described by `config`.
    pub fn open(config: &LibraryConfig) -> TdResult<Self> {
        let library = NativeLibrary::resolve(&config.search_paths())?;
        let table = FunctionTable::bind(library)?;

        Ok(Self {
            table: Arc::new(table),
            receive_timeout: config.receive_timeout,
        })
    }

    /// Wrap an already bound table.
    pub fn with_table(table: Arc<FunctionTable>) -> Self {
        Self {
            table,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
        }
    }

    /// Set the receive timeout handed to new clients.
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Path of the loaded library, if the table came from one.
    pub fn library_path(&self) -> Option<&Path> {
        self.table.library_path()
    }

    /// Shared function table.
    pub fn table(&self) -> &Arc<FunctionTable> {
        &self.table
    }

    /// Receive timeout handed to new clients.
    pub fn receive_timeout(&self) -> Duration {
        self.receive_timeout
    }

    /// Create a new native client using the configured receive timeout.
    pub fn create_client(&self) -> TdResult<Client> {
        Ok(Client::create(Arc::clone(&self.table))?.with_receive_timeout(self.receive_timeout))
    }
}
