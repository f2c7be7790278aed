//! tdjson probe - loads the TDLib JSON client, reads its version and commit
//! hash, and reports them.

mod config;
mod report;

use std::process::ExitCode;

use clap::Parser;
use tdjson_client::{Client, TdJson};
use tdjson_core::{TdError, TdResult};
use tracing_subscriber::EnvFilter;

use crate::config::ProbeArgs;

fn main() -> ExitCode {
    // Logs go to stderr so stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = ProbeArgs::parse();

    match run(&args) {
        Ok(()) => {
            println!("\nTDLib is working.\n");
            println!("{}", report::NEXT_STEPS);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!("run failed: {:?}", e);
            eprintln!("{}", report::failure(&e));
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: &ProbeArgs) -> TdResult<()> {
    let config = args.library_config();
    tracing::debug!("Search paths: {:?}", config.search_paths());

    let tdjson = TdJson::open(&config)?;
    println!("{}", report::loading(tdjson.library_path()));

    let mut client = tdjson.create_client()?;
    println!("TDLib client created");

    // Destroy runs whatever the queries return.
    let queried = report_options(&mut client, &args.options);
    if let Ok(ref lines) = queried {
        for line in lines {
            println!("{}", line);
        }
    }
    let destroyed = client.destroy();
    if destroyed.is_ok() {
        println!("TDLib client destroyed");
    }
    queried.and(destroyed)
}

/// One report line per option. An option the library answers with nothing
/// gets a warning line instead of failing the run.
fn report_options(client: &mut Client, names: &[String]) -> TdResult<Vec<String>> {
    let mut lines = Vec::with_capacity(names.len());
    for name in names {
        match client.get_option(name) {
            Ok(value) => {
                tracing::info!("{} = {}", name, value);
                lines.push(report::option_line(name, &value));
            }
            Err(TdError::MissingResponse { .. }) => {
                tracing::warn!("No response for option {}", name);
                lines.push(report::missing(name));
            }
            Err(e) => return Err(e),
        }
    }
    Ok(lines)
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::ffi::{c_char, c_void, CStr};
    use std::sync::Arc;

    use tdjson_client::{EntryPoints, FunctionTable};

    unsafe extern "C" fn silent_create() -> *mut c_void {
        Box::into_raw(Box::new(0u8)).cast()
    }

    unsafe extern "C" fn silent_send(_client: *mut c_void, _request: *const c_char) {}

    unsafe extern "C" fn silent_receive(_client: *mut c_void, _timeout: f64) -> *const c_char {
        std::ptr::null()
    }

    unsafe extern "C" fn silent_execute(
        _client: *mut c_void,
        _request: *const c_char,
    ) -> *const c_char {
        std::ptr::null()
    }

    unsafe extern "C" fn silent_destroy(client: *mut c_void) {
        // SAFETY: client came from silent_create and is released exactly once.
        drop(unsafe { Box::from_raw(client.cast::<u8>()) });
    }

    static VERSION_RESPONSE: &CStr = c"{\"@type\":\"optionValueString\",\"value\":\"1.8.29\"}";

    unsafe extern "C" fn version_only_execute(
        _client: *mut c_void,
        request: *const c_char,
    ) -> *const c_char {
        // SAFETY: the binding always passes a live NUL-terminated string.
        let request = unsafe { CStr::from_ptr(request) }.to_string_lossy();
        if request.contains("\"version\"") {
            VERSION_RESPONSE.as_ptr()
        } else {
            std::ptr::null()
        }
    }

    fn tdjson(execute: tdjson_client::ExecuteFn) -> TdJson {
        let entry = EntryPoints {
            create: silent_create,
            send: silent_send,
            receive: silent_receive,
            execute,
            destroy: silent_destroy,
        };
        // SAFETY: the functions above follow the tdjson contract.
        let table = unsafe { FunctionTable::from_entry_points(entry) };
        TdJson::with_table(Arc::new(table))
    }

    fn default_options() -> Vec<String> {
        vec!["version".to_string(), "commit_hash".to_string()]
    }

    #[test]
    fn absent_options_are_warned_not_fatal() {
        let mut client = tdjson(silent_execute).create_client().unwrap();

        let lines = report_options(&mut client, &default_options()).unwrap();
        assert_eq!(
            lines,
            vec![
                "Could not retrieve TDLib version".to_string(),
                "Could not retrieve TDLib commit_hash".to_string(),
            ]
        );
        client.destroy().unwrap();
    }

    #[test]
    fn present_and_absent_options_mix() {
        let mut client = tdjson(version_only_execute).create_client().unwrap();

        let lines = report_options(&mut client, &default_options()).unwrap();
        assert_eq!(lines[0], "TDLib version: 1.8.29");
        assert_eq!(lines[1], "Could not retrieve TDLib commit_hash");
        client.destroy().unwrap();
    }
}
