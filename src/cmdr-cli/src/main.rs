//! `cmdr` entry point.

use std::process::ExitCode;

use cmdr_commands::Context;

fn main() -> ExitCode {
    cmdr_cli::init_logging();

    let config = match cmdr_cli::load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::FAILURE;
        }
    };

    let ctx = Context::background();
    cmdr_cli::install_interrupt_handler(&ctx);

    let mut program = cmdr_cli::build_program(config);
    match program.run_context(&ctx, std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Not-found and option errors were already printed with the usage.
            if !err.is_reported() {
                eprintln!("error: {}", err);
            }
            ExitCode::from(err.exit_code())
        }
    }
}
