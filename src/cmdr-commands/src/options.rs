//! Typed option sets backed by clap's builder API.
//!
//! An [`OptionSet`] is the private flag parser of a single command. Options
//! are registered by name with a default and a help line, then parsed from
//! the command's residual arguments:
//!
//! ```rust,ignore
//! let mut options = OptionSet::new("serve");
//! options
//!     .int("port", 8080, "Port to listen on")
//!     .bool("verbose", false, "Verbose output");
//!
//! options.parse(["-port", "3000", "-verbose"])?;
//! assert_eq!(options.get_int("port"), Some(3000));
//! ```
//!
//! Both `-name` and `--name` spellings are accepted, with the value either
//! in the next argument or after `=`. Bool options take an optional
//! `=true`/`=false`. Parsing stops at the first positional argument or at
//! `--`; everything from there on is available through [`OptionSet::args`].

use std::time::Duration;

use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, ColorChoice};
use thiserror::Error;

/// Internal id of the help switch (`-h`, `-help`, `--help`).
const HELP_ID: &str = "__help";

/// Internal id collecting positional arguments.
const ARGS_ID: &str = "__args";

/// Errors produced while parsing an option set.
#[derive(Debug, Clone, Error)]
pub enum OptionError {
    /// `-h`, `-help` or `--help` was given.
    #[error("flag: help requested")]
    HelpRequested,

    /// Unknown option or malformed value.
    #[error("{message}")]
    Invalid {
        /// The clap error category.
        kind: ErrorKind,
        /// Human-readable description of the problem.
        message: String,
    },
}

impl OptionError {
    fn from_clap(err: &clap::Error) -> Self {
        if err.kind() == ErrorKind::DisplayHelp {
            return Self::HelpRequested;
        }

        // clap renders "error: <what>" followed by usage hints; keep the first line.
        let rendered = err.to_string();
        let message = rendered
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string();

        Self::Invalid {
            kind: err.kind(),
            message,
        }
    }
}

/// Value type of a registered option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Bool,
    Int,
    Uint,
    Float,
    Duration,
}

impl OptionKind {
    /// Placeholder shown next to the option in help output.
    pub fn value_hint(self) -> &'static str {
        match self {
            OptionKind::String => "string",
            OptionKind::Bool => "bool",
            OptionKind::Int => "int",
            OptionKind::Uint => "uint",
            OptionKind::Float => "float",
            OptionKind::Duration => "duration",
        }
    }

    fn takes_value(self) -> bool {
        self != OptionKind::Bool
    }
}

#[derive(Debug, Clone)]
struct OptionDef {
    name: String,
    kind: OptionKind,
}

/// A command's private set of named, typed options.
#[derive(Debug, Clone)]
pub struct OptionSet {
    parser: clap::Command,
    defs: Vec<OptionDef>,
    matches: Option<ArgMatches>,
}

impl OptionSet {
    /// Create an empty option set for the command `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let parser = clap::Command::new(name.into())
            .no_binary_name(true)
            .color(ColorChoice::Never)
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .args_override_self(true)
            .arg(
                Arg::new(HELP_ID)
                    .short('h')
                    .long("help")
                    .action(ArgAction::Help)
                    .hide(true),
            )
            .arg(
                Arg::new(ARGS_ID)
                    .action(ArgAction::Append)
                    .num_args(1..)
                    .trailing_var_arg(true)
                    .hide(true),
            );

        Self {
            parser,
            defs: Vec::new(),
            matches: None,
        }
    }

    /// Name of the command this set belongs to.
    pub fn name(&self) -> &str {
        self.parser.get_name()
    }

    /// Register a string option.
    pub fn string(&mut self, name: &str, default: &str, help: &str) -> &mut Self {
        self.register(name, OptionKind::String, default.to_string(), help)
    }

    /// Register a bool option. `-name` alone sets it to `true`.
    pub fn bool(&mut self, name: &str, default: bool, help: &str) -> &mut Self {
        self.register(name, OptionKind::Bool, default.to_string(), help)
    }

    /// Register a signed integer option.
    pub fn int(&mut self, name: &str, default: i64, help: &str) -> &mut Self {
        self.register(name, OptionKind::Int, default.to_string(), help)
    }

    /// Register an unsigned integer option.
    pub fn uint(&mut self, name: &str, default: u64, help: &str) -> &mut Self {
        self.register(name, OptionKind::Uint, default.to_string(), help)
    }

    /// Register a floating point option.
    pub fn float(&mut self, name: &str, default: f64, help: &str) -> &mut Self {
        self.register(name, OptionKind::Float, default.to_string(), help)
    }

    /// Register a duration option such as `500ms`, `30s`, `2m` or `1h`.
    pub fn duration(&mut self, name: &str, default: Duration, help: &str) -> &mut Self {
        self.register(name, OptionKind::Duration, format_duration(default), help)
    }

    fn register(&mut self, name: &str, kind: OptionKind, default: String, help: &str) -> &mut Self {
        if name.is_empty() || name == "help" || self.def(name).is_some() {
            tracing::warn!(
                "Option '{}' is reserved or already registered on '{}', ignoring",
                name,
                self.name()
            );
            return self;
        }

        let hide_default = default.is_empty() || (kind == OptionKind::Bool && default == "false");

        let arg = Arg::new(name.to_string())
            .long(name.to_string())
            .help(help.to_string())
            .value_name(kind.value_hint())
            .default_value(default)
            .hide_default_value(hide_default);

        let arg = match kind {
            OptionKind::String => arg.action(ArgAction::Set).allow_hyphen_values(true),
            OptionKind::Bool => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(clap::value_parser!(bool)),
            OptionKind::Int => arg
                .action(ArgAction::Set)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(i64)),
            OptionKind::Uint => arg
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(u64)),
            OptionKind::Float => arg
                .action(ArgAction::Set)
                .allow_negative_numbers(true)
                .value_parser(clap::value_parser!(f64)),
            OptionKind::Duration => arg.action(ArgAction::Set).value_parser(parse_duration),
        };

        self.parser = std::mem::take(&mut self.parser).arg(arg);
        self.defs.push(OptionDef {
            name: name.to_string(),
            kind,
        });
        self
    }

    fn def(&self, name: &str) -> Option<&OptionDef> {
        self.defs.iter().find(|def| def.name == name)
    }

    /// Kind of the option `name`, if registered.
    pub fn kind(&self, name: &str) -> Option<OptionKind> {
        self.def(name).map(|def| def.kind)
    }

    /// Registered option names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.iter().map(|def| def.name.as_str())
    }

    /// Whether at least one option is registered.
    pub fn has_options(&self) -> bool {
        !self.defs.is_empty()
    }

    /// Whether the last call to [`parse`](Self::parse) succeeded.
    pub fn is_parsed(&self) -> bool {
        self.matches.is_some()
    }

    /// Parse `args`, replacing any previously parsed values.
    ///
    /// On failure the set falls back to its defaults.
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), OptionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = self.normalize(args.into_iter().map(Into::into));
        self.matches = None;

        let matches = self
            .parser
            .try_get_matches_from_mut(args)
            .map_err(|err| OptionError::from_clap(&err))?;
        self.matches = Some(matches);
        Ok(())
    }

    /// Rewrite single-dash long options (`-port`) into clap's `--port` form.
    ///
    /// Only a lone short flag such as `-h` stays single-dash; anything longer
    /// is never read as a cluster of short flags.
    fn normalize(&self, args: impl Iterator<Item = String>) -> Vec<String> {
        let mut out = Vec::new();
        let mut args = args.peekable();

        while let Some(arg) = args.next() {
            if !arg.starts_with('-') || arg == "-" || arg == "--" {
                out.push(arg);
                break;
            }

            let double_dash = arg.starts_with("--");
            let flag = arg.trim_start_matches('-');
            let (name, inline_value) = match flag.split_once('=') {
                Some((name, _)) => (name, true),
                None => (flag, false),
            };

            let def = self.def(name);
            let takes_value = def.is_some_and(|def| def.kind.takes_value());

            if !double_dash && (def.is_some() || name.chars().count() > 1) {
                out.push(format!("-{arg}"));
            } else {
                out.push(arg.clone());
            }

            if takes_value
                && !inline_value
                && let Some(value) = args.next()
            {
                out.push(value);
            }
        }

        out.extend(args);
        out
    }

    fn value<T>(&self, name: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let lookup = |matches: &ArgMatches| matches.try_get_one::<T>(name).ok().flatten().cloned();

        match &self.matches {
            Some(matches) => lookup(matches),
            None => self
                .parser
                .clone()
                .try_get_matches_from(Vec::<String>::new())
                .ok()
                .as_ref()
                .and_then(lookup),
        }
    }

    /// Value of a string option.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.value::<String>(name)
    }

    /// Value of a bool option; unregistered names read as `false`.
    pub fn get_bool(&self, name: &str) -> bool {
        self.value::<bool>(name).unwrap_or(false)
    }

    /// Value of a signed integer option.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.value::<i64>(name)
    }

    /// Value of an unsigned integer option.
    pub fn get_uint(&self, name: &str) -> Option<u64> {
        self.value::<u64>(name)
    }

    /// Value of a floating point option.
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.value::<f64>(name)
    }

    /// Value of a duration option.
    pub fn get_duration(&self, name: &str) -> Option<Duration> {
        self.value::<Duration>(name)
    }

    /// Whether `name` was given explicitly on the command line.
    pub fn is_set(&self, name: &str) -> bool {
        self.def(name).is_some()
            && self
                .matches
                .as_ref()
                .and_then(|matches| matches.value_source(name))
                == Some(ValueSource::CommandLine)
    }

    /// Positional arguments remaining after the options.
    pub fn args(&self) -> Vec<String> {
        self.matches
            .as_ref()
            .and_then(|matches| matches.try_get_many::<String>(ARGS_ID).ok().flatten())
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    }

    /// Render the registered options with clap's default formatting.
    pub fn render_options(&self) -> String {
        self.parser
            .clone()
            .help_template("{options}")
            .render_help()
            .to_string()
    }
}

/// Parse a duration string.
///
/// Supported formats:
/// - `250ms` - milliseconds
/// - `30s` - seconds
/// - `5m` - minutes
/// - `2h` - hours
/// - `1d` - days
/// - `45` - seconds when no unit is given
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (num_str, unit) = s.split_at(split);

    let num: u64 = num_str
        .parse()
        .map_err(|_| format!("invalid duration: {}", s))?;

    let duration = match unit {
        "ms" => Duration::from_millis(num),
        "" | "s" => Duration::from_secs(num),
        "m" => secs_times(num, 60)?,
        "h" => secs_times(num, 60 * 60)?,
        "d" => secs_times(num, 24 * 60 * 60)?,
        other => return Err(format!("unknown duration unit: {}", other)),
    };

    Ok(duration)
}

fn secs_times(num: u64, unit: u64) -> Result<Duration, String> {
    num.checked_mul(unit)
        .map(Duration::from_secs)
        .ok_or_else(|| "duration out of range".to_string())
}

/// Format a duration in the largest unit that represents it exactly.
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis == 0 {
        return "0s".to_string();
    }
    if millis % 1000 != 0 {
        return format!("{}ms", millis);
    }

    let secs = d.as_secs();
    if secs % (24 * 60 * 60) == 0 {
        format!("{}d", secs / (24 * 60 * 60))
    } else if secs % (60 * 60) == 0 {
        format!("{}h", secs / (60 * 60))
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
