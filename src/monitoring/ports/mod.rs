//! Port contracts for alert delivery.

mod dispatcher;

pub use dispatcher::{DispatchError, DispatchResult, NotificationDispatcher};
