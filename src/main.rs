use clap::Parser;
use scalptester::cli::{run, Cli};
use scalptester::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    run(cli)
}
