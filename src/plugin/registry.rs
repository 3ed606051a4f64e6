use super::{Handler, Plugin};
use crate::client::DroveClient;
use crate::error::Error;
use clap::error::ErrorKind;
use clap::{ArgMatches, Args, Command};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use tracing::debug;

/// One plugin's top-level group and its bound leaves.
pub struct CommandGroup {
    name: &'static str,
    command: Command,
    handlers: BTreeMap<&'static str, Handler>,
}

impl fmt::Debug for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandGroup")
            .field("name", &self.name)
            .field("leaves", &self.handlers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl CommandGroup {
    fn new(name: &'static str, about: &'static str) -> Self {
        Self {
            name,
            command: Command::new(name).about(about),
            handlers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declares a leaf whose arguments are described by `A` and binds it to `handler`.
    ///
    /// # Errors
    /// Returns `DuplicateSubcommand` when the leaf name is already taken in this group.
    pub fn leaf<A: Args>(
        &mut self,
        name: &'static str,
        about: &'static str,
        handler: Handler,
    ) -> Result<&mut Self, Error> {
        if self.handlers.contains_key(name) {
            return Err(Error::DuplicateSubcommand {
                group: self.name.to_string(),
                name: name.to_string(),
            });
        }
        let leaf = A::augment_args(Command::new(name).about(about));
        self.command = std::mem::take(&mut self.command).subcommand(leaf);
        self.handlers.insert(name, handler);
        Ok(self)
    }

    pub fn leaf_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    fn command(&self) -> Command {
        self.command
            .clone()
            .subcommand_required(true)
            .arg_required_else_help(true)
    }
}

/// The parsed command line, resolved to exactly one leaf.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Matches of the root command, holding the global options.
    pub matches: ArgMatches,
    pub group: String,
    pub leaf: String,
    /// Matches of the resolved leaf only.
    pub leaf_matches: ArgMatches,
}

/// The shared command grammar that plugins populate.
#[derive(Debug)]
pub struct CommandRegistry {
    root: Command,
    groups: Vec<CommandGroup>,
}

impl CommandRegistry {
    /// Creates an empty registry below `root`, which carries the global options.
    #[must_use]
    pub const fn new(root: Command) -> Self {
        Self {
            root,
            groups: Vec::new(),
        }
    }

    /// Lets every plugin attach its group, in the order given.
    ///
    /// # Errors
    /// Fails on the first naming collision between plugins.
    pub fn with_plugins(root: Command, plugins: &[Box<dyn Plugin>]) -> Result<Self, Error> {
        let mut registry = Self::new(root);
        for plugin in plugins {
            debug!(target: "drove::plugin", plugin = plugin.name(), "registering plugin");
            plugin.populate_options(&mut registry)?;
        }
        Ok(registry)
    }

    /// Adds a new top-level group.
    ///
    /// # Errors
    /// Returns `DuplicateCommandGroup` when another plugin already owns `name`.
    pub fn add_group(
        &mut self,
        name: &'static str,
        about: &'static str,
    ) -> Result<&mut CommandGroup, Error> {
        if self.group(name).is_some() {
            return Err(Error::DuplicateCommandGroup {
                name: name.to_string(),
            });
        }
        self.groups.push(CommandGroup::new(name, about));
        let index = self.groups.len() - 1;
        Ok(&mut self.groups[index])
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&CommandGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.groups.iter().map(|group| group.name)
    }

    #[must_use]
    pub fn handler(&self, group: &str, leaf: &str) -> Option<Handler> {
        self.group(group)
            .and_then(|group| group.handlers.get(leaf))
            .copied()
    }

    /// The complete grammar: root options plus every registered group.
    #[must_use]
    pub fn command(&self) -> Command {
        self.root
            .clone()
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommands(self.groups.iter().map(CommandGroup::command))
    }

    /// Parses `args` (including the program name) down to a single leaf.
    ///
    /// # Errors
    /// Returns `Usage` for any input the grammar does not accept, including
    /// requests for help or version output.
    pub fn parse_from<I, T>(&self, args: I) -> Result<Invocation, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut command = self.command();
        let matches = command.try_get_matches_from_mut(args)?;

        let Some((group, group_matches)) = matches.subcommand() else {
            return Err(command
                .error(ErrorKind::MissingSubcommand, "a command group is required")
                .into());
        };
        let Some((leaf, leaf_matches)) = group_matches.subcommand() else {
            return Err(command
                .error(
                    ErrorKind::MissingSubcommand,
                    format!("a subcommand of '{group}' is required"),
                )
                .into());
        };

        Ok(Invocation {
            group: group.to_string(),
            leaf: leaf.to_string(),
            leaf_matches: leaf_matches.clone(),
            matches: matches.clone(),
        })
    }

    /// Runs the one handler bound to the invocation's leaf.
    ///
    /// # Errors
    /// Propagates the handler's error; `UnknownCommand` if nothing is bound.
    pub async fn dispatch(&self, client: &DroveClient, invocation: &Invocation) -> Result<(), Error> {
        let handler = self
            .handler(&invocation.group, &invocation.leaf)
            .ok_or_else(|| Error::UnknownCommand {
                group: invocation.group.clone(),
                name: invocation.leaf.clone(),
            })?;
        debug!(
            target: "drove::plugin",
            group = %invocation.group,
            leaf = %invocation.leaf,
            "dispatching"
        );
        handler(client, &invocation.leaf_matches).await
    }
}
