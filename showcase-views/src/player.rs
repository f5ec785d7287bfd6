//! Player session: one mounting of a video player, from open to close
//!
//! Wires a [`WatchTracker`] to a one-second [`TickTask`] and hands the
//! qualifying event to the [`ViewRecorder`]. Per-session view state:
//!
//! ```text
//! Uncounted --(watch time >= threshold)--> Pending --(newly counted)--> Counted
//!                                          Pending --(duplicate/error)--> NotCounted
//! ```
//!
//! `Counted` and `NotCounted` are terminal; nothing is retried.

use showcase_common::db::models::ViewRecordRequest;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::events::ViewCountBus;
use crate::recorder::{RecordOutcome, ViewRecorder};
use crate::schedule::TickTask;
use crate::session_id::{ClientSessionId, SessionIdProvider};
use crate::store::ViewStore;
use crate::tracker::{PlaybackSignal, QualifyingView, WatchTracker, MIN_WATCH_SECONDS};

/// View-counting state of one player session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Uncounted,
    Pending,
    Counted { view_count: i64 },
    NotCounted,
}

impl ViewState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ViewState::Counted { .. } | ViewState::NotCounted)
    }
}

/// Everything a player needs, shared by all players on a page
#[derive(Clone)]
pub struct PlayerContext {
    recorder: ViewRecorder,
    session_ids: SessionIdProvider,
    min_watch_seconds: u64,
    tick_period: Duration,
}

impl PlayerContext {
    pub fn new(store: Arc<dyn ViewStore>, bus: ViewCountBus, session_ids: SessionIdProvider) -> Self {
        Self {
            recorder: ViewRecorder::new(store, bus),
            session_ids,
            min_watch_seconds: MIN_WATCH_SECONDS,
            tick_period: Duration::from_secs(1),
        }
    }

    pub fn with_min_watch_seconds(mut self, seconds: u64) -> Self {
        self.min_watch_seconds = seconds;
        self
    }

    pub fn bus(&self) -> &ViewCountBus {
        self.recorder.bus()
    }
}

struct Shared {
    tracker: Mutex<WatchTracker>,
    state_tx: watch::Sender<ViewState>,
    recorder: ViewRecorder,
    session_id: ClientSessionId,
    lifetime: CancellationToken,
}

impl Shared {
    fn tracker(&self) -> MutexGuard<'_, WatchTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to `Pending` and record in the background
    fn on_qualified(self: &Arc<Self>, view: QualifyingView) {
        debug!(
            "{} qualified after {}s",
            view.video_id, view.watched_seconds
        );
        self.state_tx.send_replace(ViewState::Pending);

        let request = ViewRecordRequest {
            video_id: view.video_id,
            session_id: self.session_id.to_string(),
            watch_duration_seconds: view.watched_seconds,
        };
        let shared = Arc::clone(self);

        tokio::spawn(async move {
            let outcome = shared.recorder.record(&request, &shared.lifetime).await;
            if shared.lifetime.is_cancelled() {
                debug!("Player for {} closed; ignoring {:?}", request.video_id, outcome);
                return;
            }
            let next = match outcome {
                RecordOutcome::Counted { view_count } => ViewState::Counted { view_count },
                RecordOutcome::Duplicate | RecordOutcome::Failed | RecordOutcome::Unidentified => {
                    ViewState::NotCounted
                }
            };
            shared.state_tx.send_replace(next);
        });
    }
}

/// One mounted video player
///
/// Dropping the session (or calling [`PlayerSession::close`]) cancels the
/// watch clock; an in-flight record call finishes but its result is ignored.
pub struct PlayerSession {
    video_id: String,
    shared: Arc<Shared>,
    ticker: Option<TickTask>,
    tick_period: Duration,
}

impl PlayerSession {
    /// Mount a player for `video_id` with a fresh watch-time counter
    ///
    /// Must be called inside a tokio runtime.
    pub fn open(ctx: &PlayerContext, video_id: impl Into<String>) -> Self {
        Self::open_with_tracker(ctx, WatchTracker::new(video_id, ctx.min_watch_seconds))
    }

    /// Mount a player around an existing tracker
    ///
    /// If the tracker already meets the threshold the qualifying event fires
    /// immediately, and still only once.
    pub fn open_with_tracker(ctx: &PlayerContext, mut tracker: WatchTracker) -> Self {
        let video_id = tracker.video_id().to_string();
        let session_id = ctx.session_ids.session_id();
        let already_qualified = tracker.check_threshold();
        let (state_tx, _) = watch::channel(ViewState::Uncounted);

        let shared = Arc::new(Shared {
            tracker: Mutex::new(tracker),
            state_tx,
            recorder: ctx.recorder.clone(),
            session_id,
            lifetime: CancellationToken::new(),
        });

        info!("Player opened for {}", video_id);

        if let Some(view) = already_qualified {
            shared.on_qualified(view);
        }

        Self {
            video_id,
            shared,
            ticker: None,
            tick_period: ctx.tick_period,
        }
    }

    /// Feed a playback signal from the media element
    pub fn handle(&mut self, signal: PlaybackSignal) {
        if self.shared.lifetime.is_cancelled() {
            return;
        }

        let should_run = self.shared.tracker().apply(signal);

        if !should_run {
            // Dropping the task cancels the timer
            self.ticker = None;
            return;
        }

        if self.ticker.is_none() {
            let shared = Arc::clone(&self.shared);
            self.ticker = Some(TickTask::spawn(
                self.tick_period,
                &self.shared.lifetime,
                move || {
                    let qualified = shared.tracker().tick();
                    if let Some(view) = qualified {
                        shared.on_qualified(view);
                    }
                },
            ));
        }
    }

    pub fn play(&mut self) {
        self.handle(PlaybackSignal::Play);
    }

    pub fn pause(&mut self) {
        self.handle(PlaybackSignal::Pause);
    }

    pub fn ended(&mut self) {
        self.handle(PlaybackSignal::Ended);
    }

    /// Tear the player down
    pub fn close(self) {
        drop(self);
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn session_id(&self) -> &ClientSessionId {
        &self.shared.session_id
    }

    pub fn accumulated_seconds(&self) -> u64 {
        self.shared.tracker().accumulated_seconds()
    }

    /// Seconds still needed before the view counts ("Watch Ns more")
    pub fn remaining_seconds(&self) -> u64 {
        self.shared.tracker().remaining_seconds()
    }

    pub fn is_playing(&self) -> bool {
        self.shared.tracker().is_playing()
    }

    /// Whether the watch clock is currently running
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn view_state(&self) -> ViewState {
        *self.shared.state_tx.borrow()
    }

    /// Watch view state changes (e.g. to show "View counted!")
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.state_tx.subscribe()
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.shared.lifetime.cancel();
        self.ticker = None;
        debug!("Player closed for {}", self.video_id);
    }
}
