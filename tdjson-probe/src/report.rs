//! Console report lines.

use std::path::Path;

use tdjson_client::LIBRARY_PATH_ENV;
use tdjson_core::{OptionValue, TdError};

/// Commit hashes are shown abbreviated to this many characters.
pub const SHORT_HASH_LEN: usize = 12;

pub fn loading(path: Option<&Path>) -> String {
    match path {
        Some(path) => format!("Loading TDLib from: {}", path.display()),
        None => "Loading TDLib from: <in-process>".to_string(),
    }
}

/// One `name: value` line; `commit_hash` is abbreviated.
pub fn option_line(name: &str, value: &OptionValue) -> String {
    let text = value.to_string();
    if name == "commit_hash" && text.chars().count() > SHORT_HASH_LEN {
        let short: String = text.chars().take(SHORT_HASH_LEN).collect();
        return format!("TDLib {}: {}...", name, short);
    }
    if text.is_empty() {
        return format!("TDLib {}: (empty)", name);
    }
    format!("TDLib {}: {}", name, text)
}

/// Warning for an option the library returned nothing for.
pub fn missing(name: &str) -> String {
    format!("Could not retrieve TDLib {}", name)
}

/// Diagnostic for a failed run, with a next step where one exists.
pub fn failure(err: &TdError) -> String {
    let prefix = match err {
        TdError::LibraryNotFound { .. } => "TDLib library not found",
        TdError::LibraryLoad { .. } | TdError::SignatureBinding { .. } => {
            "TDLib library found but unusable"
        }
        _ => "TDLib test failed",
    };

    let mut out = format!("{}: {}", prefix, err);
    if let Some(hint) = hint(err) {
        out.push('\n');
        out.push_str(&hint);
    }
    out
}

fn hint(err: &TdError) -> Option<String> {
    match err {
        TdError::LibraryNotFound { .. } => Some(format!(
            "Build TDLib first (./install.sh), or point {} or --library at libtdjson.",
            LIBRARY_PATH_ENV
        )),
        TdError::LibraryLoad { .. } => Some(
            "Check that the library matches this platform and architecture.".to_string(),
        ),
        TdError::SignatureBinding { .. } => Some(
            "The library does not export the tdjson client interface; check its version."
                .to_string(),
        ),
        _ => None,
    }
}

pub const NEXT_STEPS: &str = "\
Next steps:
1. Check the TDLib documentation: https://core.telegram.org/tdlib
2. Explore more examples: https://github.com/tdlib/td/tree/master/example
3. Start building your Telegram application!";
