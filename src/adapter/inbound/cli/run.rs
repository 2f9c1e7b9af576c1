//! Handler for the `run` command.

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;
use crate::port::inbound::operator::runtime::{RunRequest, RunStartupSnapshot};

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config_toml = operator::read_config_toml(&args.config)?;
    let machine_output = output::is_json();
    let request = build_run_request(args, config_toml, machine_output);
    let service = operator::operator()?;

    if !output::is_quiet() || machine_output {
        let startup = service.prepare_run(&request)?;
        print_startup(&startup);
    }

    service.execute_run(request).await
}

fn build_run_request(args: &RunArgs, config_toml: String, force_json_logs: bool) -> RunRequest {
    RunRequest {
        config_toml,
        interval_secs: args.interval,
        json_logs: args.json_logs || force_json_logs,
    }
}

fn print_startup(snapshot: &RunStartupSnapshot) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Categories", snapshot.categories.join(", "));
    output::field("Interval", format!("{}s", snapshot.poll_interval_secs));
    output::field("Min edge", output::percent(snapshot.min_edge));
    output::note("Press Ctrl-C to stop");
}
