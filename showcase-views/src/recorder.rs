//! View recorder
//!
//! Turns one qualifying event into a remote record-view call, and on a new
//! count fetches the authoritative number and publishes it.
//!
//! Failures are never retried: a transient error ends the attempt for this
//! session exactly like a duplicate does, only the log line differs.

use showcase_common::db::models::ViewRecordRequest;
use showcase_common::ViewCountUpdate;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::events::ViewCountBus;
use crate::store::{view_count_or_zero, ViewStore};

/// Result of one record attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The store newly incremented the counter; `view_count` is the refreshed total
    Counted { view_count: i64 },
    /// The store already had this `(video, session)` pair, or refused it
    Duplicate,
    /// The store call failed
    Failed,
    /// No session id, so nothing was sent
    Unidentified,
}

impl RecordOutcome {
    pub fn is_counted(&self) -> bool {
        matches!(self, RecordOutcome::Counted { .. })
    }
}

/// Records qualifying views against a [`ViewStore`]
#[derive(Clone)]
pub struct ViewRecorder {
    store: Arc<dyn ViewStore>,
    bus: ViewCountBus,
}

impl ViewRecorder {
    pub fn new(store: Arc<dyn ViewStore>, bus: ViewCountBus) -> Self {
        Self { store, bus }
    }

    pub fn store(&self) -> &Arc<dyn ViewStore> {
        &self.store
    }

    pub fn bus(&self) -> &ViewCountBus {
        &self.bus
    }

    /// Assert the view and, if newly counted, refresh and publish the count
    ///
    /// The request runs to completion even if `lifetime` is cancelled
    /// meanwhile; only the publication is skipped in that case.
    pub async fn record(
        &self,
        request: &ViewRecordRequest,
        lifetime: &CancellationToken,
    ) -> RecordOutcome {
        if request.session_id.is_empty() {
            warn!(
                "No session id for view of {}, cannot deduplicate; not recording",
                request.video_id
            );
            return RecordOutcome::Unidentified;
        }

        match self.store.record_view(request).await {
            Ok(true) => {
                let view_count = view_count_or_zero(self.store.as_ref(), &request.video_id).await;
                info!(
                    "View counted for {} after {}s (now {} views)",
                    request.video_id, request.watch_duration_seconds, view_count
                );
                if lifetime.is_cancelled() {
                    debug!("Player closed before count refresh; not publishing");
                } else {
                    self.bus
                        .publish(ViewCountUpdate::new(request.video_id.clone(), view_count));
                }
                RecordOutcome::Counted { view_count }
            }
            Ok(false) => {
                debug!(
                    "View of {} not counted (already recorded for this session)",
                    request.video_id
                );
                RecordOutcome::Duplicate
            }
            Err(e) => {
                error!("Error recording view for {}: {}", request.video_id, e);
                RecordOutcome::Failed
            }
        }
    }
}
