//! Reaction clip preloading.
//!
//! The clip is fetched once per process when possible. [`PreloadFlag`]
//! records that it arrived; writes are idempotent so concurrent loaders
//! need no coordination. A failed load still resolves the celebration's
//! placeholder, it just leaves the flag unset.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_MEDIA_URL: &str = "https://media.giphy.com/media/l0MYt5jPR6QX5pnqM/giphy.gif";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaOutcome {
    Loaded,
    Failed,
}

#[derive(Debug, Default)]
pub struct PreloadFlag(AtomicBool);

static SHARED: OnceLock<Arc<PreloadFlag>> = OnceLock::new();

impl PreloadFlag {
    /// The process-wide flag.
    pub fn shared() -> Arc<PreloadFlag> {
        SHARED
            .get_or_init(|| Arc::new(PreloadFlag::default()))
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns `true` if this call flipped the flag.
    pub fn set(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    /// Fold a load outcome into the flag.
    pub fn record(&self, outcome: MediaOutcome) {
        if outcome == MediaOutcome::Loaded {
            self.set();
        }
    }
}

/// Fetch the clip body. Never errors: every failure maps to `Failed`.
pub async fn fetch(client: &reqwest::Client, url: &str) -> MediaOutcome {
    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(e) => {
            warn!(%url, error = %e, "media request failed");
            return MediaOutcome::Failed;
        }
    };
    if !response.status().is_success() {
        warn!(%url, status = %response.status(), "media request rejected");
        return MediaOutcome::Failed;
    }
    match response.bytes().await {
        Ok(body) => {
            debug!(%url, bytes = body.len(), "media loaded");
            MediaOutcome::Loaded
        }
        Err(e) => {
            warn!(%url, error = %e, "media body unreadable");
            MediaOutcome::Failed
        }
    }
}

/// Fetch unless already loaded, recording success on `flag`.
pub async fn preload(client: &reqwest::Client, url: &str, flag: &PreloadFlag) -> MediaOutcome {
    if flag.is_set() {
        return MediaOutcome::Loaded;
    }
    let outcome = fetch(client, url).await;
    flag.record(outcome);
    outcome
}
