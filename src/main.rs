//! Forgehand CLI entry point.

use forgehand::cli::{self, Cli};
use forgehand::logging;
use forgehand::ui::output::{self, Verbosity};

fn main() {
    let cli = Cli::parse_args();
    logging::init(Verbosity::from_flags(cli.quiet, cli.debug));

    if let Err(err) = cli::run(cli) {
        output::error(output::format_error_chain(&err));
        std::process::exit(1);
    }
}
