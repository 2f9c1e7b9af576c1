use clap::Parser;

use sharpline::adapter::inbound::cli::command::{Cli, ColorChoice, Commands, ConfigCommand};
use sharpline::adapter::inbound::cli::output::{self, OutputConfig};
use sharpline::adapter::inbound::cli::{config, odds, operator, run, scan};
use sharpline::error::Result;
use sharpline::infrastructure::operator::entry::Operator;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {}
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if operator::install(Box::new(Operator)).is_err() {
        output::error("operator already installed");
        std::process::exit(1);
    }

    if let Err(e) = dispatch(cli.command).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Scan(args) => scan::execute(&args).await,
        Commands::Run(args) => run::execute(&args).await,
        Commands::Odds(args) => odds::execute(args.american),
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args.config),
        Commands::Config(ConfigCommand::Validate(args)) => config::execute_validate(&args.config),
    }
}
