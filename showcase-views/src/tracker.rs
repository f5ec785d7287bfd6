//! Playback watch tracker
//!
//! Turns play/pause/ended signals from one video element into a watch-time
//! counter and a single "qualifies as view" event. The tracker is a plain
//! state machine; the one-second clock that calls [`WatchTracker::tick`]
//! lives in [`crate::player`].

use tracing::debug;

/// Minimum contiguous watch time before a session counts as a view
pub const MIN_WATCH_SECONDS: u64 = 3;

/// Playback signal from the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSignal {
    Play,
    Pause,
    Ended,
}

/// Emitted exactly once per session when the threshold is crossed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifyingView {
    pub video_id: String,
    pub watched_seconds: u64,
}

/// Watch-time state for one playback session
#[derive(Debug, Clone)]
pub struct WatchTracker {
    video_id: String,
    threshold: u64,
    accumulated_seconds: u64,
    playing: bool,
    has_counted: bool,
}

impl WatchTracker {
    /// Fresh tracker for a newly mounted player
    pub fn new(video_id: impl Into<String>, threshold: u64) -> Self {
        Self::resume(video_id, threshold, 0)
    }

    /// Tracker starting from previously accumulated watch time
    pub fn resume(video_id: impl Into<String>, threshold: u64, accumulated_seconds: u64) -> Self {
        Self {
            video_id: video_id.into(),
            threshold,
            accumulated_seconds,
            playing: false,
            has_counted: false,
        }
    }

    /// Apply a playback signal; returns whether the clock should be running
    ///
    /// `Pause`/`Ended` without a preceding `Play` are no-ops. Accumulated
    /// time is never reset here.
    pub fn apply(&mut self, signal: PlaybackSignal) -> bool {
        match signal {
            PlaybackSignal::Play => self.playing = true,
            PlaybackSignal::Pause | PlaybackSignal::Ended => {
                if !self.playing {
                    debug!("Ignoring {:?} for {} while not playing", signal, self.video_id);
                }
                self.playing = false;
            }
        }
        self.playing
    }

    /// Advance one second of wall-clock time
    ///
    /// Only counts while playing. Returns the qualifying event on the single
    /// tick that crosses the threshold.
    pub fn tick(&mut self) -> Option<QualifyingView> {
        if !self.playing {
            return None;
        }
        self.accumulated_seconds += 1;
        self.check_threshold()
    }

    /// Emit the qualifying event if the threshold is met and nothing was emitted yet
    ///
    /// Called on every tick and once at mount time. Checks and sets
    /// `has_counted` in one step, so repeated calls emit at most once.
    pub fn check_threshold(&mut self) -> Option<QualifyingView> {
        if self.has_counted || self.accumulated_seconds < self.threshold {
            return None;
        }
        self.has_counted = true;
        Some(QualifyingView {
            video_id: self.video_id.clone(),
            watched_seconds: self.accumulated_seconds,
        })
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn accumulated_seconds(&self) -> u64 {
        self.accumulated_seconds
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn has_counted(&self) -> bool {
        self.has_counted
    }

    /// Seconds still needed before the view qualifies (0 once reached)
    pub fn remaining_seconds(&self) -> u64 {
        self.threshold.saturating_sub(self.accumulated_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(video_id: &str) -> WatchTracker {
        let mut tracker = WatchTracker::new(video_id, MIN_WATCH_SECONDS);
        tracker.apply(PlaybackSignal::Play);
        tracker
    }

    #[test]
    fn test_qualifies_on_third_second() {
        let mut tracker = playing("v1");
        assert_eq!(tracker.tick(), None);
        assert_eq!(tracker.tick(), None);
        assert_eq!(
            tracker.tick(),
            Some(QualifyingView {
                video_id: "v1".to_string(),
                watched_seconds: 3
            })
        );
        assert!(tracker.has_counted());
    }

    #[test]
    fn test_fires_at_most_once() {
        let mut tracker = playing("v1");
        let fired = (0..120).filter_map(|_| tracker.tick()).count();
        assert_eq!(fired, 1);
        assert_eq!(tracker.accumulated_seconds(), 120);
    }

    #[test]
    fn test_pause_preserves_accumulated_time() {
        let mut tracker = playing("v1");
        tracker.tick();
        tracker.tick();
        assert!(!tracker.apply(PlaybackSignal::Pause));

        // Ticks while paused do not count
        assert_eq!(tracker.tick(), None);
        assert_eq!(tracker.accumulated_seconds(), 2);

        assert!(tracker.apply(PlaybackSignal::Play));
        assert!(tracker.tick().is_some());
    }

    #[test]
    fn test_pause_and_ended_without_play_are_noops() {
        let mut tracker = WatchTracker::new("v1", MIN_WATCH_SECONDS);
        assert!(!tracker.apply(PlaybackSignal::Pause));
        assert!(!tracker.apply(PlaybackSignal::Ended));
        assert_eq!(tracker.tick(), None);
        assert_eq!(tracker.accumulated_seconds(), 0);
    }

    #[test]
    fn test_ended_stops_counting() {
        let mut tracker = playing("v1");
        tracker.tick();
        tracker.apply(PlaybackSignal::Ended);
        tracker.tick();
        assert_eq!(tracker.accumulated_seconds(), 1);
        assert_eq!(tracker.remaining_seconds(), 2);
    }

    #[test]
    fn test_threshold_met_at_mount_fires_once() {
        let mut tracker = WatchTracker::resume("v1", MIN_WATCH_SECONDS, 5);
        assert!(tracker.check_threshold().is_some());
        assert!(tracker.check_threshold().is_none());

        tracker.apply(PlaybackSignal::Play);
        assert!(tracker.tick().is_none());
        assert_eq!(tracker.remaining_seconds(), 0);
    }
}
