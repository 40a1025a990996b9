use anyhow::Result;
use clap::Parser;

use configurator_cli::args::Cli;

fn main() -> Result<()> {
    configurator_observability::init();

    let cli = Cli::parse();
    let registry = configurator_catalog::default_registry()?;

    let stdout = std::io::stdout();
    configurator_cli::run(&cli, &registry, &mut stdout.lock())
}
