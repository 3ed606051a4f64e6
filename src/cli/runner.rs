//! Glue between the command line, configuration and the plugin registry.

use super::{root_command, GlobalOptions};
use crate::client::{ClientOptions, DroveClient};
use crate::config::{default_config_path, resolve_session};
use crate::error::Error;
use crate::plugin::{CommandRegistry, Invocation, Plugin};
use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use tracing::warn;

/// Parses a command line, connects, and dispatches to one plugin handler.
#[derive(Debug)]
pub struct Runner {
    registry: CommandRegistry,
    default_config: Option<PathBuf>,
    client_options: ClientOptions,
}

impl Runner {
    /// Builds the command grammar from `plugins`.
    ///
    /// # Errors
    /// Fails when two plugins claim the same group or leaf.
    pub fn new(plugins: &[Box<dyn Plugin>]) -> Result<Self, Error> {
        Ok(Self {
            registry: CommandRegistry::with_plugins(root_command(), plugins)?,
            default_config: default_config_path(),
            client_options: ClientOptions::default(),
        })
    }

    /// Overrides the config file consulted when neither `--endpoint` nor
    /// `--config` is given.
    #[must_use]
    pub fn with_default_config(mut self, path: Option<PathBuf>) -> Self {
        self.default_config = path;
        self
    }

    #[must_use]
    pub fn with_client_options(mut self, options: ClientOptions) -> Self {
        self.client_options = options;
        self
    }

    #[must_use]
    pub const fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// # Errors
    /// Returns `Usage` for anything the grammar rejects.
    pub fn parse<I, T>(&self, args: I) -> Result<Invocation, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.registry.parse_from(args)
    }

    /// Resolves the session, starts the client and runs the bound handler.
    ///
    /// # Errors
    /// Configuration errors, a failed liveness check, or the handler's error.
    pub async fn execute(&self, invocation: &Invocation) -> Result<(), Error> {
        let globals = GlobalOptions::from_matches(&invocation.matches)?;
        if globals.username.is_some() || globals.password.is_some() {
            warn!(
                target: "drove::cli",
                "username/password authentication is not supported; use --auth-header"
            );
        }

        let session = resolve_session(&globals.overrides(), self.default_config.as_deref())?;
        let client = DroveClient::start_with(session, self.client_options.clone()).await?;
        self.registry.dispatch(&client, invocation).await
    }

    /// [`Runner::parse`] followed by [`Runner::execute`].
    ///
    /// # Errors
    /// See both.
    pub async fn run<I, T>(&self, args: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let invocation = self.parse(args)?;
        self.execute(&invocation).await
    }

    /// Help text of the full command tree.
    #[must_use]
    pub fn usage(&self) -> String {
        self.registry.command().render_help().to_string()
    }
}

/// How a command raced against an interrupt ended.
#[derive(Debug)]
pub enum Outcome {
    Finished(Result<(), Error>),
    Interrupted,
}

/// Runs `command` until it finishes or `interrupt` fires.
///
/// An interrupt source that fails (e.g. no signal handler could be
/// installed) is ignored and the command runs to completion.
pub async fn race_interrupt<C, I>(command: C, interrupt: I) -> Outcome
where
    C: Future<Output = Result<(), Error>>,
    I: Future<Output = io::Result<()>>,
{
    tokio::select! {
        result = command => Outcome::Finished(result),
        Ok(()) = interrupt => Outcome::Interrupted,
    }
}
