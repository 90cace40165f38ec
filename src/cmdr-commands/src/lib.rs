//! Sub-command dispatch for command-line programs.
//!
//! A [`Program`] holds named [`Command`]s, each with its own option set and
//! action. Running the program with an argument vector picks the command
//! named by the first argument, parses the remaining arguments against its
//! options and invokes its action with a cancellable [`Context`].
//!
//! ```rust,ignore
//! use cmdr_commands::prelude::*;
//!
//! let mut program = Program::new("myapp", "1.0.0")
//!     .with_usage("Manage widgets")
//!     .with_default_command("serve")
//!     .with_command(
//!         Command::new("serve", "Start the server")
//!             .with_options(|o| {
//!                 o.int("port", 8080, "Port to listen on");
//!             })
//!             .with_action(|ctx, cmd| {
//!                 let port = cmd.options().get_int("port").unwrap_or(8080);
//!                 println!("listening on {port}");
//!                 ctx.wait();
//!                 Ok(())
//!             }),
//!     );
//!
//! program.run(["myapp", "serve", "-port", "3000"])?;
//! ```
//!
//! # Reserved commands and flags
//!
//! Unless hidden through [`ProgramConfig`], every program answers to:
//!
//! - `help [command]` - full usage, or the usage of one command
//! - `version` - `"<name> version <version>"`
//! - `-h`/`--help` and `-v`/`--version` anywhere after the command name
//!
//! A user command registered as `help` or `version` takes precedence over
//! the built-in one.
//!
//! # Output
//!
//! Usage, version and diagnostics go to an [`Output`] sink, standard error
//! by default. Tests capture it with [`Output::buffer`]:
//!
//! ```rust,ignore
//! let (output, buffer) = Output::buffer();
//! let mut program = Program::new("myapp", "1.0.0").with_output(output);
//! program.run(["myapp", "version"])?;
//! assert_eq!(buffer.contents(), "myapp version 1.0.0\n");
//! ```

mod command;
pub mod config;
mod context;
mod error;
pub mod options;
mod output;
mod program;
mod registry;
pub mod usage;

pub use command::{ActionFn, Command};
pub use config::{ConfigError, ProgramConfig};
pub use context::{Context, ContextError};
pub use error::CliError;
pub use options::{OptionError, OptionKind, OptionSet, format_duration, parse_duration};
pub use output::{Buffer, Output};
pub use program::{CommandSource, HELP_COMMAND, Program, ResolvedCommand, VERSION_COMMAND};
pub use registry::CommandRegistry;

/// Common imports for programs built on this crate.
pub mod prelude {
    pub use crate::{CliError, Command, Context, OptionSet, Output, Program, ProgramConfig};
}
