//! Collects option handlers, turns their definitions into a `clap::Command`
//! and dispatches the options selected on a command line.

use crate::error::{AppError, Result};
use crate::options::{OptionDefinition, OptionHandler};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, error, info};

/// The set of options a program understands.
pub struct OptionRegistry<Db: ?Sized + Sync> {
    name: String,
    about: Option<String>,
    version: Option<String>,
    handlers: Vec<Box<dyn OptionHandler<Db>>>,
}

impl<Db: ?Sized + Sync> OptionRegistry<Db> {
    /// Creates an empty registry for the program `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            version: None,
            handlers: Vec::new(),
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a handler.
    ///
    /// # Errors
    ///
    /// Returns `AppError::DuplicateOption` if its short or long name is already taken.
    pub fn register<H>(&mut self, handler: H) -> Result<()>
    where
        H: OptionHandler<Db> + 'static,
    {
        let new = handler.definition();
        for existing in self.definitions() {
            let short_clash = !new.short().is_empty() && new.short() == existing.short();
            let long_clash = !new.long().is_empty() && new.long() == existing.long();
            let id_clash = new.id() == existing.id();
            if short_clash || long_clash || id_clash {
                error!("Option {} collides with already registered {}", new, existing);
                return Err(AppError::DuplicateOption(format!(
                    "{} collides with {}",
                    new, existing
                )));
            }
        }
        debug!("Registered option {}", new);
        self.handlers.push(Box::new(handler));
        Ok(())
    }

    /// Definitions of all registered handlers, in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &OptionDefinition> + '_ {
        self.handlers.iter().map(|h| h.definition())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Builds the `clap` command describing every registered option.
    pub fn command(&self) -> Command {
        let mut command = build_command(&self.name, self.definitions());
        if let Some(about) = &self.about {
            command = command.about(about.clone());
        }
        if let Some(version) = &self.version {
            command = command.version(version.clone());
        }
        command
    }

    /// The values `clap` assigns to `def` when parsing `args`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Parse` if `clap` rejects the argument vector.
    pub fn values_of(&self, args: &[String], def: &OptionDefinition) -> Result<Vec<String>> {
        let matches = self.command().try_get_matches_from(args)?;
        Ok(values_of(&matches, def))
    }

    /// Parses `args` and runs the handler of every option found on the
    /// command line, once each, in order of first appearance.
    ///
    /// Returns the number of handlers that ran.
    ///
    /// # Errors
    ///
    /// - `AppError::Parse` if `clap` rejects the argument vector.
    /// - `AppError::Execution` for the first handler that fails; later ones do not run.
    pub async fn dispatch(&self, args: &[String], db: &Db) -> Result<usize> {
        let matches = self.command().try_get_matches_from(args).map_err(|e| {
            debug!("Argument parsing failed: {}", e);
            AppError::from(e)
        })?;

        let selected = self.selected(&matches);
        if selected.is_empty() {
            debug!("No options selected");
            return Ok(0);
        }

        for handler in &selected {
            let def = handler.definition();
            info!("Executing option {}", def);
            handler.execute(args, db).await.map_err(|e| {
                error!("Option {} failed: {:#}", def, e);
                AppError::Execution {
                    option: def.to_string(),
                    message: format!("{:#}", e),
                }
            })?;
        }

        Ok(selected.len())
    }

    /// Handlers whose option was given on the command line, sorted by position.
    fn selected(&self, matches: &ArgMatches) -> Vec<&dyn OptionHandler<Db>> {
        let mut selected: Vec<(usize, &dyn OptionHandler<Db>)> = self
            .handlers
            .iter()
            .filter(|h| {
                matches.value_source(h.definition().id()) == Some(ValueSource::CommandLine)
            })
            .map(|h| {
                let position = matches
                    .index_of(h.definition().id())
                    .unwrap_or(usize::MAX);
                (position, &**h)
            })
            .collect();
        selected.sort_by_key(|(position, _)| *position);
        selected.into_iter().map(|(_, h)| h).collect()
    }
}

/// Builds a `clap` command with one argument per definition.
///
/// `clap`'s own `--help`/`--version` flags are disabled so that options may
/// claim those names.
pub fn build_command<'a>(
    name: &str,
    definitions: impl IntoIterator<Item = &'a OptionDefinition>,
) -> Command {
    definitions.into_iter().fold(
        Command::new(name.to_string())
            .disable_help_flag(true)
            .disable_version_flag(true),
        |command, def| command.arg(to_arg(def)),
    )
}

/// Every value given to `def`, in command-line order. Empty for flags.
pub fn values_of(matches: &ArgMatches, def: &OptionDefinition) -> Vec<String> {
    if !def.has_arg() {
        return Vec::new();
    }
    matches
        .get_many::<String>(def.id())
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn to_arg(def: &OptionDefinition) -> Arg {
    let mut arg = Arg::new(def.id().to_string()).help(def.description().to_string());
    if let Some(short) = def.short_char() {
        arg = arg.short(short);
    }
    if !def.long().is_empty() {
        arg = arg.long(def.long().to_string());
    }
    if def.has_arg() {
        arg.action(ArgAction::Append).num_args(1)
    } else {
        arg.action(ArgAction::SetTrue)
    }
}
