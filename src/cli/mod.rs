pub mod errors;
pub mod runner;
pub mod tracing_init;

pub use runner::Runner;

use crate::config::ConnectionOverrides;
use clap::{ArgAction, ArgMatches, Args, Command, FromArgMatches};
use std::path::PathBuf;

const ABOUT: &str = "Drove cluster command line client";

/// Options accepted before the command group.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Configuration file for drove client
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Drove endpoint URL
    #[arg(long, short = 'e', value_name = "URL")]
    pub endpoint: Option<String>,

    /// Authorization header value for the provided drove endpoint
    #[arg(long = "auth-header", short = 't', value_name = "VALUE")]
    pub auth_header: Option<String>,

    /// Do not verify the endpoint's TLS certificate
    #[arg(long, short = 'i')]
    pub insecure: bool,

    /// Drove cluster username (reserved)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Drove cluster password (reserved)
    #[arg(long, short = 'p')]
    pub password: Option<String>,

    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbosity: u8,
}

impl GlobalOptions {
    /// Reads the global options back from the root matches.
    ///
    /// # Errors
    /// Returns a clap error when the matches were not produced by [`root_command`].
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        Self::from_arg_matches(matches)
    }

    #[must_use]
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            config: self.config.clone(),
            endpoint: self.endpoint.clone(),
            auth_header: self.auth_header.clone(),
            insecure: self.insecure,
        }
    }
}

/// The `drove` root command carrying only the global options.
#[must_use]
pub fn root_command() -> Command {
    GlobalOptions::augment_args(
        Command::new("drove")
            .about(ABOUT)
            .version(env!("CARGO_PKG_VERSION")),
    )
}
