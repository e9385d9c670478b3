use clap::Parser;

use jobwatch::cli::{self, Cli};
use jobwatch::logging;

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Err(err) = cli::execute(cli) {
        eprintln!("Error: {err}.");
        std::process::exit(1);
    }
}
