//! Handler for the `scan` command.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::ScanArgs;
use crate::adapter::inbound::cli::{operator, output};
use crate::domain::{Opportunity, ValueSignal};
use crate::error::Result;
use crate::port::inbound::operator::scan::{CategoryScan, ScanRequest};

#[derive(Tabled)]
struct OpportunityRow {
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Edge")]
    edge: String,
    #[tabled(rename = "ROI")]
    roi: String,
    #[tabled(rename = "Legs")]
    legs: String,
}

impl From<&Opportunity> for OpportunityRow {
    fn from(opportunity: &Opportunity) -> Self {
        let legs = opportunity
            .legs()
            .iter()
            .map(|leg| format!("{} @ {} {}", leg.label, leg.venue, leg.probability.round_dp(4)))
            .collect::<Vec<_>>()
            .join("; ");
        let edge = match opportunity.advantage() {
            Some(advantage) => format!("+{} vs book", output::percent(advantage)),
            None => output::percent(opportunity.edge()),
        };

        Self {
            event: opportunity.event_id().to_string(),
            kind: opportunity.kind().to_string(),
            total: opportunity.total_implied_probability().round_dp(4).to_string(),
            edge,
            roi: output::percent(opportunity.expected_roi()),
            legs,
        }
    }
}

#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "Outcome")]
    label: String,
    #[tabled(rename = "Venue")]
    venue: String,
    #[tabled(rename = "Price")]
    probability: String,
    #[tabled(rename = "Consensus")]
    consensus: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&ValueSignal> for ValueRow {
    fn from(signal: &ValueSignal) -> Self {
        Self {
            event: signal.event_id.to_string(),
            label: signal.label.clone(),
            venue: signal.venue.to_string(),
            probability: signal.probability.round_dp(4).to_string(),
            consensus: signal.consensus.round_dp(4).to_string(),
            value: output::percent(signal.value),
        }
    }
}

/// Execute the scan command.
pub async fn execute(args: &ScanArgs) -> Result<()> {
    let config_toml = operator::read_config_toml(&args.config)?;
    let request = ScanRequest {
        config_toml,
        category: args.category.clone(),
    };
    let scans = operator::operator()?.scan(request).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "scan",
            "categories": scans,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    for scan in &scans {
        print_category(scan, args.value);
    }

    let arbitrage: usize = scans.iter().map(CategoryScan::arbitrage_count).sum();
    output::section("Summary");
    if arbitrage == 0 {
        output::note("No arbitrage found");
    } else {
        output::success(&format!(
            "{} arbitrage opportunit{}",
            arbitrage,
            if arbitrage == 1 { "y" } else { "ies" }
        ));
    }
    Ok(())
}

fn print_category(scan: &CategoryScan, show_value: bool) {
    output::section(scan.category.as_str());

    let fetched = scan
        .status
        .fetched_at
        .map_or_else(|| "never".to_string(), |at| at.to_rfc3339());
    output::field("Fetched", fetched);
    output::field("Events", scan.status.events);
    if let Some(remaining) = scan.status.quota_remaining {
        output::field("Quota left", remaining);
    }
    if output::verbosity() > 0 {
        output::field("Stale", scan.status.stale);
    }

    if let Some(error) = &scan.error {
        if scan.status.fetched_at.is_some() {
            output::warning(&format!("Refresh failed, serving cached data: {error}"));
        } else {
            output::warning(&format!("Refresh failed: {error}"));
        }
    }

    if scan.opportunities.is_empty() {
        output::note(&output::muted("no opportunities"));
    } else {
        let rows: Vec<OpportunityRow> = scan.opportunities.iter().map(Into::into).collect();
        output::lines(&Table::new(rows).to_string());
    }

    if show_value && !scan.value_signals.is_empty() {
        let rows: Vec<ValueRow> = scan.value_signals.iter().map(Into::into).collect();
        output::lines(&Table::new(rows).to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OpportunityKind;
    use rust_decimal_macros::dec;

    #[test]
    fn arbitrage_row_shows_edge_and_legs() {
        let opportunity = Opportunity::builder()
            .event_id("E1".into())
            .category("nfl".into())
            .kind(OpportunityKind::CrossVenueArbitrage)
            .leg("x".into(), "Team A", dec!(0.55))
            .leg("y".into(), "Team B", dec!(0.40))
            .build()
            .unwrap();

        let row = OpportunityRow::from(&opportunity);

        assert_eq!(row.kind, "arbitrage");
        assert_eq!(row.edge, "5.00%");
        assert_eq!(row.total, "0.95");
        assert!(row.legs.contains("Team A @ x 0.55"));
        assert!(row.legs.contains("Team B @ y 0.40"));
    }

    #[test]
    fn skew_row_shows_advantage() {
        let opportunity = Opportunity::builder()
            .event_id("E2".into())
            .category("nfl".into())
            .kind(OpportunityKind::SingleVenueSkew)
            .leg("x".into(), "A", dec!(0.52))
            .leg("y".into(), "B", dec!(0.50))
            .advantage(dec!(0.03))
            .build()
            .unwrap();

        let row = OpportunityRow::from(&opportunity);

        assert_eq!(row.kind, "skew");
        assert_eq!(row.edge, "+3.00% vs book");
    }
}
