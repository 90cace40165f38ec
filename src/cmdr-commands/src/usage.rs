//! Usage text rendering shared by programs and commands.

use crate::command::Command;
use crate::config::ProgramConfig;

/// `"<name> version <version>\n"`.
pub fn version_line(name: &str, version: &str) -> String {
    format!("{} version {}\n", name, version)
}

/// Render a command's own usage.
pub fn command_usage(command: &Command) -> String {
    let header = match command.app_name() {
        Some(app) => format!("Usage: {} {} [options]", app, command.name()),
        None => format!("Usage: {} [options]", command.name()),
    };
    let mut out = format!("{}\n\n{}\n", header, command.usage());

    if !command.description().is_empty() {
        out.push_str(&format!("\n{}\n", command.description()));
    }

    if command.options().has_options() {
        out.push_str("\nOptions:\n");
        out.push_str(&command.options().render_options());
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}

/// Render the full program usage listing every registered command.
pub fn program_usage<'a>(
    config: &ProgramConfig,
    commands: impl IntoIterator<Item = &'a Command>,
) -> String {
    let commands: Vec<&Command> = commands.into_iter().collect();
    let mut out = String::new();

    if let Some(banner) = config.banner.as_deref().filter(|b| !b.is_empty()) {
        out.push_str(&format!("{}\n\n", banner));
    }

    out.push_str(&version_line(&config.name, &config.version));

    if let Some(usage) = config.usage.as_deref().filter(|u| !u.is_empty()) {
        out.push_str(&format!("{}\n", usage));
    }

    out.push_str(&format!(
        "\nUSAGE:\n    {} [command] [options]\n\nCOMMANDS:\n",
        config.name
    ));

    let width = commands
        .iter()
        .map(|cmd| cmd.name().len())
        .max()
        .unwrap_or(0);
    for cmd in &commands {
        out.push_str(&format!("    {:<width$}    {}\n", cmd.name(), cmd.usage()));
    }

    out.push_str(&format!(
        "\nRun '{} [command] -h' for more information on a command.\n",
        config.name
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_version_line() {
        assert_eq!(version_line("testapp", "1.0.0"), "testapp version 1.0.0\n");
    }

    #[test]
    fn test_program_usage_layout() {
        let config = ProgramConfig {
            usage: Some("A test application".to_string()),
            ..ProgramConfig::new("testapp", "1.0.0")
        };
        let commands = [
            Command::new("init", "Initialize project"),
            Command::new("build", "Build project"),
        ];

        let expected = "\
testapp version 1.0.0
A test application

USAGE:
    testapp [command] [options]

COMMANDS:
    init     Initialize project
    build    Build project

Run 'testapp [command] -h' for more information on a command.
";
        assert_eq!(program_usage(&config, &commands), expected);
    }

    #[test]
    fn test_program_usage_banner_first() {
        let config = ProgramConfig {
            banner: Some("TEST APP BANNER".to_string()),
            ..ProgramConfig::new("testapp", "1.0.0")
        };

        let usage = program_usage(&config, []);
        assert!(usage.starts_with("TEST APP BANNER\n\ntestapp version 1.0.0\n"));
        assert!(usage.contains("COMMANDS:\n\nRun 'testapp"));
    }

    #[test]
    fn test_command_usage_minimal() {
        let cmd = Command::new("test", "Test command");
        assert_eq!(command_usage(&cmd), "Usage: test [options]\n\nTest command\n");
    }

    #[test]
    fn test_command_usage_full() {
        let mut cmd = Command::new("test", "Test command")
            .with_description("This is a detailed description")
            .with_options(|o| {
                o.string("config", "", "Config file path");
            });
        cmd.set_app_name("myapp");

        let usage = command_usage(&cmd);
        assert!(usage.starts_with(
            "Usage: myapp test [options]\n\nTest command\n\nThis is a detailed description\n\nOptions:\n"
        ));
        assert!(usage.contains("--config"));
        assert!(usage.contains("Config file path"));
    }
}
