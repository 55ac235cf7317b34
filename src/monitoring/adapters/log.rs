//! Dispatcher that logs alerts.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::monitoring::{
    domain::{AlertRequest, AlertSeverity},
    ports::{DispatchResult, NotificationDispatcher},
};

/// Emits every alert as a `tracing` event, at `warn` for critical alerts and
/// `info` otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDispatcher;

impl TracingDispatcher {
    /// Creates the dispatcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for TracingDispatcher {
    async fn request_alert(&self, alert: &AlertRequest) -> DispatchResult<()> {
        if alert.severity == AlertSeverity::Critical {
            warn!(
                server_id = %alert.server_id,
                from = %alert.from,
                to = %alert.to,
                severity = %alert.severity,
                "{}",
                alert.message
            );
        } else {
            info!(
                server_id = %alert.server_id,
                from = %alert.from,
                to = %alert.to,
                severity = %alert.severity,
                "{}",
                alert.message
            );
        }
        Ok(())
    }
}
