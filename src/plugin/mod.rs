//! The contract every command group implements.
//!
//! A plugin owns one top-level group of the command line. During
//! [`Plugin::populate_options`] it adds that group to the shared
//! [`CommandRegistry`], declares each leaf subcommand with a
//! `#[derive(clap::Args)]` options struct, and binds each leaf to one
//! [`Handler`]. Handlers receive the started [`DroveClient`] by shared
//! reference and the parsed arguments of their leaf.

pub mod registry;

pub use registry::{CommandGroup, CommandRegistry, Invocation};

use crate::client::DroveClient;
use crate::error::Error;
use clap::{ArgMatches, FromArgMatches};
use std::future::Future;
use std::pin::Pin;

/// The future a handler returns; it borrows the client and the parsed arguments.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + 'a>>;

/// A leaf subcommand's entry point.
pub type Handler = for<'a> fn(&'a DroveClient, &'a ArgMatches) -> HandlerFuture<'a>;

pub trait Plugin {
    /// Name of the top-level group this plugin owns.
    fn name(&self) -> &'static str;

    /// Registers the plugin's group, its leaves and their handlers.
    ///
    /// # Errors
    /// Fails when the group or one of its leaves is already registered.
    fn populate_options(&self, registry: &mut CommandRegistry) -> Result<(), Error>;
}

/// Materializes a leaf's options struct from its matches.
///
/// # Errors
/// Returns `Usage` when the matches do not fit the struct.
pub fn parse_options<A: FromArgMatches>(matches: &ArgMatches) -> Result<A, Error> {
    A::from_arg_matches(matches).map_err(Error::from)
}
