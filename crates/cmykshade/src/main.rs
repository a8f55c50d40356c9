mod cli;
mod report;
mod run;

use anyhow::Result;
use cli::Command;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Normalize(args)) => run::normalize(&args.config),
        Some(Command::Preview(args)) => run::preview(args),
        Some(Command::Types) => run::list_types(),
        None => run::run(cli.run),
    }
}
