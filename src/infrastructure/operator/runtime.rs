//! Runtime operator implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::application::aggregator::Aggregator;
use crate::application::scheduler::{CycleReport, RefreshScheduler};
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::runtime::{RunRequest, RunStartupSnapshot, RuntimeOperator};

use super::entry::Operator;

/// Reports buffered between the scheduler and the logger task.
const REPORT_BUFFER: usize = 16;

#[async_trait]
impl RuntimeOperator for Operator {
    fn prepare_run(&self, request: &RunRequest) -> Result<RunStartupSnapshot> {
        let config = self.load_run_config(request)?;

        Ok(RunStartupSnapshot {
            categories: config.categories.iter().map(|c| c.name.clone()).collect(),
            poll_interval_secs: config.refresh.poll_interval_secs,
            min_edge: config.detector.min_edge,
        })
    }

    async fn execute_run(&self, request: RunRequest) -> Result<()> {
        let config = self.load_run_config(&request)?;
        config.init_logging();

        info!(
            categories = config.categories.len(),
            poll_interval_secs = config.refresh.poll_interval_secs,
            "sharpline starting"
        );

        let aggregator = Arc::new(bootstrap::build_aggregator(&config));
        let (report_tx, report_rx) = mpsc::channel(REPORT_BUFFER);
        let scheduler = RefreshScheduler::new(Arc::clone(&aggregator), config.refresh.poll_interval())
            .with_reports(report_tx);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => info!("Ctrl-C received"),
                Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
            }
            let _ = shutdown_tx.send(true);
        });

        let logger = tokio::spawn(log_reports(Arc::clone(&aggregator), report_rx));
        scheduler.run(shutdown_rx).await;
        drop(scheduler);
        let _ = logger.await;

        info!("sharpline stopped");
        Ok(())
    }
}

impl Operator {
    fn load_run_config(&self, request: &RunRequest) -> Result<Config> {
        let mut config = Config::parse_toml(&request.config_toml)?;
        if let Some(interval) = request.interval_secs {
            if interval == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "interval",
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
            config.refresh.poll_interval_secs = interval;
        }
        if request.json_logs {
            config.logging.format = "json".to_string();
        }
        Ok(config)
    }
}

/// Log every opportunity in the categories a cycle touched.
async fn log_reports(aggregator: Arc<Aggregator>, mut reports: mpsc::Receiver<CycleReport>) {
    while let Some(report) = reports.recv().await {
        for (category, reason) in &report.failed {
            error!(category = %category, error = %reason, "Category unavailable");
        }
        for category in report.refreshed.iter().chain(&report.stale) {
            for opportunity in aggregator.get_opportunities(category) {
                info!(
                    category = %category,
                    event_id = %opportunity.event_id(),
                    kind = %opportunity.kind(),
                    total = %opportunity.total_implied_probability().round_dp(4),
                    edge = %opportunity.edge().round_dp(4),
                    roi = %opportunity.expected_roi().round_dp(4),
                    "Opportunity"
                );
            }
        }
    }
}
