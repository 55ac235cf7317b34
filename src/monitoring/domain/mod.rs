//! Domain model for alerts and pass summaries.

mod alert;
mod summary;
mod template;

pub use alert::{AlertRequest, AlertSeverity};
pub use summary::{OutcomeCounts, PassSummary};
pub use template::{AlertTemplate, AlertTemplateError, DEFAULT_ALERT_TEMPLATE};
