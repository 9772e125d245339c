use clap::Parser;
use env_logger::Env;
use irscope_driver::cli::Cli;
use std::process;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = irscope_driver::run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
