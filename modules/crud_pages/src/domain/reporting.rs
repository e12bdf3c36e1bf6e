//! Best-effort error reporting
//!
//! Reports are persisted in a spawned task. A failing sink is logged and
//! otherwise ignored: reporting never fails or blocks the caller.

use crate::contract::ClientErrorReport;
use std::sync::Arc;

/// Destination for error reports
#[async_trait::async_trait]
pub trait ErrorSink: Send + Sync {
    /// Persist one report
    async fn record(&self, report: ClientErrorReport) -> anyhow::Result<()>;
}

/// Sink that drops every report
pub struct NoOpErrorSink;

#[async_trait::async_trait]
impl ErrorSink for NoOpErrorSink {
    async fn record(&self, _report: ClientErrorReport) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Hand a report to `sink` without waiting for it.
///
/// Outside a tokio runtime the report is logged and dropped.
pub fn report_in_background(sink: Arc<dyn ErrorSink>, report: ClientErrorReport) {
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            tracing::warn!(message = %report.message, "No runtime available, dropping error report");
            return;
        }
    };

    handle.spawn(async move {
        if let Err(e) = sink.record(report).await {
            tracing::warn!(error = %e, "Failed to persist error report");
        }
    });
}
