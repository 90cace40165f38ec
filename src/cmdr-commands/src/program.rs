//! The program: command registry and dispatcher.
//!
//! [`Program::run_context`] resolves an argument vector in this order, first
//! match wins:
//!
//! 1. No command token (no arguments, or the first one is a flag): the
//!    default command receives every argument, or the full usage is printed
//!    when no default command is configured.
//! 2. Global `-v`/`--version` and `-h`/`--help` anywhere in the command's
//!    arguments print the version line or the full usage.
//! 3. The reserved `version` command prints the version line.
//! 4. The reserved `help [command]` command prints the full usage or the
//!    usage of one command.
//! 5. Lookup by name, then delegation to [`Command::run_context`].
//!
//! Steps 3 and 4 only apply while no user command holds the reserved name
//! and the built-in is not hidden.

use std::io::{self, Write};
use std::ops::{Deref, DerefMut};

use tracing::{debug, trace};

use crate::command::Command;
use crate::config::ProgramConfig;
use crate::context::Context;
use crate::error::CliError;
use crate::output::Output;
use crate::registry::CommandRegistry;
use crate::usage;

/// Name of the reserved help command.
pub const HELP_COMMAND: &str = "help";

/// Name of the reserved version command.
pub const VERSION_COMMAND: &str = "version";

fn is_flag(arg: &str) -> bool {
    arg.starts_with('-')
}

/// Where a looked-up command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Registered with [`Program::register`].
    Registered,
    /// Installed with [`Program::set_help_command`] or [`Program::set_version_command`].
    Override,
    /// Built-in `help` or `version`, created for this lookup.
    Builtin,
}

#[derive(Debug)]
enum Slot<'a> {
    Borrowed(&'a mut Command),
    Owned(Box<Command>),
}

/// A command found by [`Program::lookup`].
#[derive(Debug)]
pub struct ResolvedCommand<'a> {
    slot: Slot<'a>,
    source: CommandSource,
}

impl<'a> ResolvedCommand<'a> {
    fn borrowed(command: &'a mut Command, source: CommandSource) -> Self {
        Self {
            slot: Slot::Borrowed(command),
            source,
        }
    }

    fn builtin(command: Command) -> Self {
        Self {
            slot: Slot::Owned(Box::new(command)),
            source: CommandSource::Builtin,
        }
    }

    pub fn source(&self) -> CommandSource {
        self.source
    }
}

impl Deref for ResolvedCommand<'_> {
    type Target = Command;

    fn deref(&self) -> &Command {
        match &self.slot {
            Slot::Borrowed(command) => command,
            Slot::Owned(command) => command,
        }
    }
}

impl DerefMut for ResolvedCommand<'_> {
    fn deref_mut(&mut self) -> &mut Command {
        match &mut self.slot {
            Slot::Borrowed(command) => command,
            Slot::Owned(command) => command,
        }
    }
}

/// A command name and its residual arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Invocation {
    name: String,
    args: Vec<String>,
    from_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlobalFlag {
    Help,
    Version,
}

/// A command-line program made of named sub-commands.
#[derive(Debug, Clone, Default)]
pub struct Program {
    config: ProgramConfig,
    commands: CommandRegistry,
    help_command: Option<Command>,
    version_command: Option<Command>,
    output: Output,
}

impl Program {
    /// Create a program with a name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::from_config(ProgramConfig::new(name, version))
    }

    /// Create a program from a configuration.
    pub fn from_config(config: ProgramConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Set the one-line application description.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.config.usage = Some(usage.into());
        self
    }

    /// Set the banner printed above the full usage.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.config.banner = Some(banner.into());
        self
    }

    /// Set the command run when no command name is given.
    pub fn with_default_command(mut self, name: impl Into<String>) -> Self {
        self.config.default_command = Some(name.into());
        self
    }

    /// Register a command.
    pub fn with_command(mut self, command: Command) -> Self {
        self.register(command);
        self
    }

    /// Set the output sink.
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ProgramConfig {
        &mut self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Register a command after the ones already registered.
    pub fn register(&mut self, command: Command) {
        debug!("Registered command '{}'", command.name());
        self.commands.register(command);
    }

    /// Registered user commands in registration order.
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut CommandRegistry {
        &mut self.commands
    }

    /// Replace the built-in `help` command used by lookups.
    pub fn set_help_command(&mut self, command: Command) {
        self.help_command = Some(command);
    }

    /// Replace the built-in `version` command used by lookups.
    pub fn set_version_command(&mut self, command: Command) {
        self.version_command = Some(command);
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    /// Find a command by name and bind it to this program's output and name.
    ///
    /// Registered commands are searched first, in registration order. For
    /// `help` and `version` the override or a fresh built-in follows, unless
    /// the built-in is hidden.
    pub fn lookup(&mut self, name: &str) -> Option<ResolvedCommand<'_>> {
        let output = self.output.clone();
        let app_name = self.config.name.clone();

        let mut resolved = self.find(name)?;
        resolved.set_output(output);
        if !app_name.is_empty() {
            resolved.set_app_name(app_name);
        }
        Some(resolved)
    }

    fn find(&mut self, name: &str) -> Option<ResolvedCommand<'_>> {
        if self.commands.contains(name) {
            return self
                .commands
                .get_mut(name)
                .map(|cmd| ResolvedCommand::borrowed(cmd, CommandSource::Registered));
        }

        let (hidden, slot) = match name {
            HELP_COMMAND => (self.config.hide_help_command, &mut self.help_command),
            VERSION_COMMAND => (self.config.hide_version_command, &mut self.version_command),
            _ => return None,
        };
        if hidden {
            return None;
        }

        let resolved = match slot {
            Some(cmd) => ResolvedCommand::borrowed(cmd, CommandSource::Override),
            None if name == HELP_COMMAND => ResolvedCommand::builtin(Command::default_help()),
            None => ResolvedCommand::builtin(Command::default_version()),
        };
        Some(resolved)
    }

    /// Whether a user-supplied command holds `name`.
    fn is_user_command(&self, name: &str) -> bool {
        self.commands.contains(name)
            || (name == HELP_COMMAND && self.help_command.is_some())
            || (name == VERSION_COMMAND && self.version_command.is_some())
    }

    /// Render the full usage.
    pub fn render_usage(&self) -> String {
        usage::program_usage(&self.config, &self.commands)
    }

    /// Print the full usage to the output.
    pub fn print_usage(&self) -> io::Result<()> {
        self.output.write_str(&self.render_usage())
    }

    /// Print the full usage to `writer`.
    pub fn print_usage_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        writer.write_all(self.render_usage().as_bytes())
    }

    /// Print `"<name> version <version>"` to the output.
    pub fn print_version(&self) -> io::Result<()> {
        self.output
            .write_str(&usage::version_line(&self.config.name, &self.config.version))
    }

    /// Run with the process arguments and a background context.
    pub fn run_env(&mut self) -> Result<(), CliError> {
        self.run(std::env::args())
    }

    /// Run with a background context.
    pub fn run<I, S>(&mut self, args: I) -> Result<(), CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_context(&Context::background(), args)
    }

    /// Resolve `args` to a command and run it with `ctx`.
    ///
    /// `args[0]` is the program path and is ignored.
    pub fn run_context<I, S>(&mut self, ctx: &Context, args: I) -> Result<(), CliError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let Some(invocation) = self.resolve(&args) else {
            debug!("No command given and no default command, printing usage");
            self.print_usage()?;
            return Ok(());
        };

        if let Some(flag) = self.global_flag(&invocation.args) {
            debug!("Global flag {:?} given to '{}'", flag, invocation.name);
            match flag {
                GlobalFlag::Version => self.print_version()?,
                GlobalFlag::Help => self.print_usage()?,
            }
            return Ok(());
        }

        if !self.is_user_command(&invocation.name) {
            if invocation.name == VERSION_COMMAND && !self.config.hide_version_command {
                self.print_version()?;
                return Ok(());
            }
            if invocation.name == HELP_COMMAND && !self.config.hide_help_command {
                return self.run_help(invocation.args.first().map(String::as_str));
            }
        }

        self.dispatch(ctx, invocation)
    }

    fn resolve(&self, args: &[String]) -> Option<Invocation> {
        match args.get(1) {
            Some(first) if !is_flag(first) => Some(Invocation {
                name: first.clone(),
                args: args[2..].to_vec(),
                from_default: false,
            }),
            _ => {
                let name = self.config.default_command()?;
                trace!("Using default command '{}'", name);
                Some(Invocation {
                    name: name.to_string(),
                    args: args.get(1..).unwrap_or_default().to_vec(),
                    from_default: true,
                })
            }
        }
    }

    fn global_flag(&self, args: &[String]) -> Option<GlobalFlag> {
        args.iter().find_map(|arg| match arg.as_str() {
            "-v" | "--version" if !self.config.hide_version_flag => Some(GlobalFlag::Version),
            "-h" | "--help" if !self.config.hide_help_flag => Some(GlobalFlag::Help),
            _ => None,
        })
    }

    fn run_help(&mut self, target: Option<&str>) -> Result<(), CliError> {
        let Some(target) = target else {
            self.print_usage()?;
            return Ok(());
        };

        let output = self.output.clone();
        match self.lookup(target) {
            Some(command) => {
                command.print_usage()?;
                Ok(())
            }
            None => {
                writeln!(output, "help: unknown command: {}", target)?;
                Err(CliError::CommandNotFound {
                    name: target.to_string(),
                })
            }
        }
    }

    fn dispatch(&mut self, ctx: &Context, invocation: Invocation) -> Result<(), CliError> {
        let Invocation {
            name,
            args,
            from_default,
        } = invocation;

        if let Some(mut command) = self.lookup(&name) {
            debug!(
                "Dispatching '{}' ({:?}) with {} argument(s)",
                name,
                command.source(),
                args.len()
            );
            return command.run_context(ctx, args);
        }

        debug!("No command named '{}'", name);
        let err = if from_default {
            write!(self.output, "Default command '{}' not found\n\n", name)?;
            CliError::DefaultCommandNotFound { name }
        } else {
            write!(self.output, "Unknown command: {}\n\n", name)?;
            CliError::CommandNotFound { name }
        };

        self.print_usage()?;
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn program() -> (Program, crate::output::Buffer) {
        let (output, buffer) = Output::buffer();
        let program = Program::new("testapp", "1.0.0").with_output(output);
        (program, buffer)
    }

    #[test]
    fn test_new_program() {
        let program = Program::new("testapp", "1.0.0");
        assert_eq!(program.name(), "testapp");
        assert_eq!(program.version(), "1.0.0");
        assert!(program.output().is_stderr());
        assert!(program.commands().is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = ProgramConfig {
            default_command: Some("serve".to_string()),
            hide_version_flag: true,
            ..ProgramConfig::new("app", "2.0")
        };
        let program = Program::from_config(config.clone());
        assert_eq!(program.config(), &config);
    }

    #[test]
    fn test_lookup_binds_output_and_app_name() {
        let (mut program, _buffer) = program();
        program.register(Command::new("test", "Test command"));
        let output = program.output().clone();

        let cmd = program.lookup("test").unwrap();
        assert_eq!(cmd.name(), "test");
        assert_eq!(cmd.source(), CommandSource::Registered);
        assert_eq!(cmd.app_name(), Some("testapp"));
        assert!(cmd.output().same_sink(&output));
    }

    #[test]
    fn test_lookup_unknown() {
        let (mut program, _buffer) = program();
        assert!(program.lookup("nonexistent").is_none());
    }

    #[test]
    fn test_lookup_builtins() {
        let (mut program, _buffer) = program();

        {
            let help = program.lookup("help").unwrap();
            assert_eq!(help.name(), "help");
            assert_eq!(help.source(), CommandSource::Builtin);
        }

        let version = program.lookup("version").unwrap();
        assert_eq!(version.name(), "version");
        assert_eq!(version.source(), CommandSource::Builtin);
    }

    #[test]
    fn test_lookup_hidden_builtins() {
        let (mut program, _buffer) = program();
        program.config_mut().hide_help_command = true;
        program.config_mut().hide_version_command = true;

        assert!(program.lookup("help").is_none());
        assert!(program.lookup("version").is_none());
    }

    #[test]
    fn test_lookup_overrides() {
        let (mut program, _buffer) = program();
        program.set_help_command(Command::new("help", "Custom help"));
        program.set_version_command(Command::new("version", "Custom version"));

        {
            let help = program.lookup("help").unwrap();
            assert_eq!(help.usage(), "Custom help");
            assert_eq!(help.source(), CommandSource::Override);
        }

        let version = program.lookup("version").unwrap();
        assert_eq!(version.usage(), "Custom version");
    }

    #[test]
    fn test_registered_reserved_name_wins() {
        let (mut program, _buffer) = program();
        program.set_help_command(Command::new("help", "Override help"));
        program.register(Command::new("help", "Registered help"));

        {
            let help = program.lookup("help").unwrap();
            assert_eq!(help.usage(), "Registered help");
            assert_eq!(help.source(), CommandSource::Registered);
        }

        program.config_mut().hide_help_command = true;
        let help = program.lookup("help").unwrap();
        assert_eq!(help.usage(), "Registered help");
    }

    #[test]
    fn test_resolve_explicit_command() {
        let (program, _buffer) = program();
        let args: Vec<String> = ["prog", "build", "-release"].map(String::from).to_vec();

        assert_eq!(
            program.resolve(&args),
            Some(Invocation {
                name: "build".to_string(),
                args: vec!["-release".to_string()],
                from_default: false,
            })
        );
    }

    #[test]
    fn test_resolve_default_command_keeps_flags() {
        let (program, _buffer) = program();
        let program = program.with_default_command("serve");
        let args: Vec<String> = ["prog", "--port", "3000"].map(String::from).to_vec();

        assert_eq!(
            program.resolve(&args),
            Some(Invocation {
                name: "serve".to_string(),
                args: vec!["--port".to_string(), "3000".to_string()],
                from_default: true,
            })
        );
    }

    #[test]
    fn test_resolve_without_default() {
        let (program, _buffer) = program();
        assert_eq!(program.resolve(&["prog".to_string()]), None);
        assert_eq!(program.resolve(&[]), None);
        assert_eq!(
            program.resolve(&["prog".to_string(), "-x".to_string()]),
            None
        );
    }

    #[test]
    fn test_global_flag_respects_toggles() {
        let (mut program, _buffer) = program();
        let args = vec!["-v".to_string(), "-h".to_string()];
        assert_eq!(program.global_flag(&args), Some(GlobalFlag::Version));

        program.config_mut().hide_version_flag = true;
        assert_eq!(program.global_flag(&args), Some(GlobalFlag::Help));

        program.config_mut().hide_help_flag = true;
        assert_eq!(program.global_flag(&args), None);
    }

    #[test]
    fn test_print_version() {
        let (program, buffer) = program();
        program.print_version().unwrap();
        assert_eq!(buffer.contents(), "testapp version 1.0.0\n");
    }

    #[test]
    fn test_print_usage_to() {
        let program = Program::new("testapp", "1.0.0")
            .with_usage("A test application")
            .with_command(Command::new("init", "Initialize project"));

        let mut out = Vec::new();
        program.print_usage_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("testapp version 1.0.0"));
        assert!(text.contains("A test application"));
        assert!(text.contains("init    Initialize project"));
    }
}
