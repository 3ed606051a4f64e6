use drove_cli::cli::runner::{race_interrupt, Outcome};
use drove_cli::cli::{errors, tracing_init, GlobalOptions, Runner};
use drove_cli::constants;
use drove_cli::error::Error;
use drove_cli::plugins::builtin_plugins;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let runner = match Runner::new(&builtin_plugins()) {
        Ok(runner) => runner,
        Err(e) => {
            errors::print_error(&e);
            process::exit(constants::EXIT_FAILURE);
        }
    };

    let invocation = match runner.parse(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(Error::Usage(e)) => e.exit(),
        Err(e) => {
            errors::print_error(&e);
            process::exit(constants::EXIT_USAGE);
        }
    };

    let verbosity = GlobalOptions::from_matches(&invocation.matches).map_or(0, |g| g.verbosity);
    tracing_init::init_tracing(verbosity);

    let result = match race_interrupt(runner.execute(&invocation), tokio::signal::ctrl_c()).await {
        Outcome::Finished(result) => result,
        Outcome::Interrupted => process::exit(constants::EXIT_INTERRUPTED),
    };

    match result {
        Ok(()) => {}
        Err(e) if e.is_silent() => {}
        Err(Error::Usage(e)) => e.exit(),
        Err(e) => {
            errors::print_error(&e);
            eprintln!();
            eprintln!("{}", runner.usage());
            process::exit(constants::EXIT_FAILURE);
        }
    }
}
