//! Acceptance notification.
//!
//! When the recipient accepts, the session hands an [`AcceptRecord`] to
//! its [`AcceptNotifier`]. The default writes a diagnostic line to the
//! log; anything else (a webhook, a desktop notification) plugs in here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptRecord {
    pub session_id: Uuid,
    pub recipient: String,
    /// Failed attempts before accepting.
    pub attempts: u32,
    pub at: DateTime<Utc>,
}

pub trait AcceptNotifier: Send + Sync {
    fn on_accept(&self, record: &AcceptRecord);
}

impl<F> AcceptNotifier for F
where
    F: Fn(&AcceptRecord) + Send + Sync,
{
    fn on_accept(&self, record: &AcceptRecord) {
        self(record)
    }
}

/// Logs the record under the `valentine::accept` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl AcceptNotifier for LogNotifier {
    fn on_accept(&self, record: &AcceptRecord) {
        info!(
            target: "valentine::accept",
            session_id = %record.session_id,
            attempts = record.attempts,
            at = %record.at.to_rfc3339(),
            "💖 {} clicked YES!",
            record.recipient
        );
    }
}
