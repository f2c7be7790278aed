//! Command line configuration for the probe.

use std::path::PathBuf;

use clap::Parser;
use tdjson_client::{LibraryConfig, LIBRARY_PATH_ENV};

/// Load tdjson, read a few options and report them.
#[derive(Debug, Parser)]
#[command(name = "tdjson-probe", version)]
pub struct ProbeArgs {
    /// Exact path of the tdjson library; skips the candidate search.
    #[arg(long, env = LIBRARY_PATH_ENV)]
    pub library: Option<PathBuf>,

    /// Directory the default candidates are resolved against.
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    /// Option to read; may be repeated.
    #[arg(long = "option", value_name = "NAME", default_values_t = default_options())]
    pub options: Vec<String>,
}

impl ProbeArgs {
    /// Library configuration described by the arguments.
    pub fn library_config(&self) -> LibraryConfig {
        let config = LibraryConfig::default().with_base_dir(&self.base_dir);
        match self.library {
            Some(ref path) => config.with_override(path),
            None => config,
        }
    }
}

fn default_options() -> Vec<String> {
    vec!["version".to_string(), "commit_hash".to_string()]
}
