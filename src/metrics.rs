use anyhow::Result;
use rusqlite::Connection;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

use crate::db;
use crate::linker::PassReport;

pub struct PassTracker {
    run_id: String,
    metrics: Vec<PassReport>,
}

impl PassTracker {
    pub fn new(run_id: String) -> Self {
        PassTracker {
            run_id,
            metrics: Vec::new(),
        }
    }

    pub fn record(&mut self, report: &PassReport) {
        info!(
            run_id = self.run_id.as_str(),
            pass = report.name.as_str(),
            linked = report.linked,
            remaining = report.pool - report.linked,
            "pass recorded"
        );
        self.metrics.push(report.clone());
    }

    pub fn persist(&self, conn: &Connection) -> Result<()> {
        for metric in &self.metrics {
            db::insert_pass_metric(conn, &self.run_id, metric)?;
        }
        Ok(())
    }

    pub fn metrics(&self) -> &[PassReport] {
        &self.metrics
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

pub fn new_run_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("run-{}", now)
}
