//! Command structure and execution.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::error::CliError;
use crate::options::{OptionError, OptionSet};
use crate::output::Output;
use crate::usage;

/// Signature of a command's action.
pub type ActionFn = dyn Fn(&Context, &Command) -> anyhow::Result<()> + Send + Sync;

/// A named sub-command with its own options and action.
#[derive(Clone)]
pub struct Command {
    /// Name of the command, matched verbatim against the command token.
    name: String,

    /// One-line description.
    usage: String,

    /// Long description, printed verbatim in the command's usage.
    description: String,

    /// Whether `-h` is reported as an error instead of printing usage.
    hide_help_flag: bool,

    options: OptionSet,
    action: Option<Arc<ActionFn>>,

    /// Name of the owning application, for display only.
    app_name: Option<String>,
    output: Output,
}

impl Command {
    /// Create a new command.
    pub fn new(name: impl Into<String>, usage: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            options: OptionSet::new(name.clone()),
            name,
            usage: usage.into(),
            description: String::new(),
            hide_help_flag: false,
            action: None,
            app_name: None,
            output: Output::default(),
        }
    }

    /// The built-in `help` command.
    pub fn default_help() -> Self {
        Self::new("help", "Show help information")
            .with_description("Display help information for commands")
    }

    /// The built-in `version` command.
    pub fn default_version() -> Self {
        Self::new("version", "Show version information")
            .with_description("Display the version of this program")
    }

    /// Set the long description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Register options on this command's option set.
    pub fn with_options(mut self, register: impl FnOnce(&mut OptionSet)) -> Self {
        register(&mut self.options);
        self
    }

    /// Bind the action run after successful option parsing.
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Context, &Command) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Report `-h` as [`CliError::HelpRequested`] instead of printing usage.
    pub fn with_hidden_help_flag(mut self, hide: bool) -> Self {
        self.hide_help_flag = hide;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn hide_help_flag(&self) -> bool {
        self.hide_help_flag
    }

    pub fn set_hide_help_flag(&mut self, hide: bool) {
        self.hide_help_flag = hide;
    }

    /// Options and, after a run, their parsed values.
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut OptionSet {
        &mut self.options
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Name of the owning application, once bound by a program.
    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn set_app_name(&mut self, name: impl Into<String>) {
        self.app_name = Some(name.into());
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    /// Render this command's usage.
    pub fn render_usage(&self) -> String {
        usage::command_usage(self)
    }

    /// Print this command's usage to its output.
    pub fn print_usage(&self) -> io::Result<()> {
        self.output.write_str(&self.render_usage())
    }

    /// Print this command's usage to `writer`.
    pub fn print_usage_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        writer.write_all(self.render_usage().as_bytes())
    }

    /// Run the command with a background context.
    pub fn run<I, S>(&mut self, args: I) -> Result<(), CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_context(&Context::background(), args)
    }

    /// Parse `args` and invoke the action with `ctx`.
    ///
    /// A help request prints usage and succeeds, unless the help flag is
    /// hidden, in which case [`CliError::HelpRequested`] is returned and
    /// nothing is printed. Invalid options are reported on the output
    /// together with the usage, then returned. A command without an action
    /// succeeds after parsing.
    pub fn run_context<I, S>(&mut self, ctx: &Context, args: I) -> Result<(), CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.options.parse(args) {
            Ok(()) => {}
            Err(OptionError::HelpRequested) if !self.hide_help_flag => {
                debug!("Help requested for command '{}'", self.name);
                self.print_usage()?;
                return Ok(());
            }
            Err(OptionError::HelpRequested) => return Err(CliError::HelpRequested),
            Err(err) => {
                debug!("Invalid options for command '{}': {}", self.name, err);
                writeln!(self.output, "{}", err)?;
                self.print_usage()?;
                return Err(err.into());
            }
        }

        match &self.action {
            Some(action) => {
                debug!("Running action of command '{}'", self.name);
                action(ctx, self).map_err(CliError::Action)
            }
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("description", &self.description)
            .field("hide_help_flag", &self.hide_help_flag)
            .field("options", &self.options.names().collect::<Vec<_>>())
            .field("has_action", &self.action.is_some())
            .field("app_name", &self.app_name)
            .field("output", &self.output)
            .finish()
    }
}
