mod app;
mod cli;
mod effects;
mod logging;
mod ui;

pub use cli::Cli;

use cli::Commands;
use shortly_logging::shortly_error;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    logging::initialize(cli.log, cli.verbose);

    let result = dispatch(cli);
    if let Err(err) = &result {
        shortly_error!("{:#}", err);
    }
    result
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => app::run_interactive(&cli.config),
        Commands::Shorten { url, token, login } => {
            app::run_shorten(&cli.config, url, token, login)
        }
        Commands::Resolve { path } => {
            app::run_resolve(&cli.config, &path);
            Ok(())
        }
    }
}
