//! Handler for the `odds` command.

use rust_decimal::Decimal;
use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::application::normalize::implied_probability;
use crate::domain::RawPrice;
use crate::error::Result;

/// Print the implied probability of American odds.
pub fn execute(american: Decimal) -> Result<()> {
    let probability = implied_probability(RawPrice::American(american))?;
    let display = probability.round_dp(4);

    if output::is_json() {
        output::json_output(json!({
            "command": "odds",
            "american": american,
            "implied_probability": display,
        }));
        return Ok(());
    }

    if output::is_quiet() {
        println!("{display}");
        return Ok(());
    }

    output::field("American", american);
    output::field("Implied", output::highlight(display));
    output::field("Percent", output::percent(probability));
    Ok(())
}
