//! Commands of the `cmdr` program.

use std::time::Duration;

use anyhow::anyhow;
use cmdr_commands::{Command, ContextError, format_duration};
use tracing::debug;

/// Name of the command run when none is given.
pub const DEFAULT_COMMAND: &str = "serve";

/// All commands in listing order.
pub fn all() -> Vec<Command> {
    vec![serve(), greet(), sleep()]
}

/// `serve`: announce an address and wait until interrupted.
pub fn serve() -> Command {
    Command::new("serve", "Start the server and wait until interrupted")
        .with_description(
            "Prints the address it would listen on, then blocks until Ctrl+C\n\
             or until -duration has elapsed.",
        )
        .with_options(|o| {
            o.int("port", 8080, "Port to listen on")
                .string("host", "127.0.0.1", "Host to bind")
                .duration("duration", Duration::ZERO, "Stop after this long (0 waits forever)");
        })
        .with_action(|ctx, cmd| {
            let opts = cmd.options();
            let host = opts.get_string("host").unwrap_or_default();
            let port = opts.get_int("port").unwrap_or_default();
            let duration = opts.get_duration("duration").unwrap_or_default();

            println!("Serving on {}:{}", host, port);

            let reason = if duration.is_zero() {
                ctx.wait()
            } else {
                ctx.with_timeout(duration).wait()
            };
            debug!("Server stopped: {}", reason);

            if reason == ContextError::Cancelled {
                println!("Shutting down");
            }
            Ok(())
        })
}

/// `greet`: print a greeting for each name.
pub fn greet() -> Command {
    Command::new("greet", "Print a greeting")
        .with_description("Greets every positional argument, or -name when none is given.")
        .with_options(|o| {
            o.string("name", "world", "Who to greet")
                .bool("shout", false, "Greet in upper case");
        })
        .with_action(|_, cmd| {
            let opts = cmd.options();
            let mut names = opts.args();
            if names.is_empty() {
                names.push(opts.get_string("name").unwrap_or_default());
            }

            println!("{}", greeting(&names, opts.get_bool("shout")));
            Ok(())
        })
}

/// `sleep`: block for a while, giving up when interrupted.
pub fn sleep() -> Command {
    Command::new("sleep", "Sleep for a while")
        .with_options(|o| {
            o.duration("for", Duration::from_secs(1), "How long to sleep");
        })
        .with_action(|ctx, cmd| {
            let duration = cmd.options().get_duration("for").unwrap_or_default();
            debug!("Sleeping for {}", format_duration(duration));

            ctx.sleep(duration).map_err(|reason| {
                debug!("Sleep cut short: {}", reason);
                anyhow!("interrupted")
            })?;

            println!("Slept for {}", format_duration(duration));
            Ok(())
        })
}

/// `"Hello, <names>!"`, optionally in upper case.
pub fn greeting(names: &[String], shout: bool) -> String {
    let text = format!("Hello, {}!", names.join(", "));
    if shout { text.to_uppercase() } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdr_commands::{CliError, Context};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_greeting() {
        assert_eq!(greeting(&["world".to_string()], false), "Hello, world!");
        assert_eq!(
            greeting(&["bob".to_string(), "carol".to_string()], true),
            "HELLO, BOB, CAROL!"
        );
    }

    #[test]
    fn test_listing_order() {
        let names: Vec<String> = all().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["serve", "greet", "sleep"]);
    }

    #[test]
    fn test_serve_stops_after_duration() {
        let mut cmd = serve();
        cmd.run(["-port", "0", "-duration", "10ms"]).unwrap();
        assert_eq!(cmd.options().get_int("port"), Some(0));
    }

    #[test]
    fn test_serve_stops_when_cancelled() {
        let (ctx, token) = Context::background().with_cancel();
        token.cancel();

        serve().run_context(&ctx, Vec::<String>::new()).unwrap();
    }

    #[test]
    fn test_sleep_completes() {
        sleep().run(["-for", "5ms"]).unwrap();
    }

    #[test]
    fn test_sleep_interrupted() {
        let (ctx, token) = Context::background().with_cancel();
        token.cancel();

        let err = sleep().run_context(&ctx, ["-for", "10s"]).unwrap_err();
        assert!(matches!(err, CliError::Action(_)));
        assert_eq!(err.to_string(), "interrupted");
    }

    #[test]
    fn test_sleep_max_duration_interrupted() {
        let (ctx, token) = Context::background().with_cancel();
        token.cancel();

        let err = sleep()
            .run_context(&ctx, ["-for", "18446744073709551615s"])
            .unwrap_err();
        assert_eq!(err.to_string(), "interrupted");
    }

    #[test]
    fn test_serve_max_duration_stops_when_cancelled() {
        let (ctx, token) = Context::background().with_cancel();
        token.cancel();

        serve()
            .run_context(&ctx, ["-duration", "18446744073709551615s"])
            .unwrap();
    }

    #[test]
    fn test_sleep_rejects_bad_duration() {
        let err = sleep().run(["-for", "soon"]).unwrap_err();
        assert!(matches!(err, CliError::OptionParse(_)));
    }
}
