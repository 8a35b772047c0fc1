//! Comparative playback scheduling.
//!
//! Lets the learner hear their own pronunciation of a single word
//! immediately followed by the reference pronunciation of the same word.
//! The two segments never overlap: the reference segment does not start
//! until the user segment has fully finished, preserving the "hear
//! yourself, then hear the model" contract.

pub mod device;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

pub use device::DeviceSegmentPlayer;

use crate::core::analysis::WordAlignment;
use crate::errors::{EngineError, EngineResult};

/// Fixed segment length assumed when explicit timestamps are missing.
pub const FALLBACK_SEGMENT_SECS: f64 = 0.8;

/// Pause between the user segment and the reference segment.
pub const INTER_SEGMENT_GAP: Duration = Duration::from_millis(300);

/// Which recording a segment is played from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    User,
    Reference,
}

/// Time bounds of one playable segment, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
}

/// Resolved bounds for one word in both recordings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBounds {
    pub user: Segment,
    pub reference: Segment,
}

/// Primitive that plays one bounded segment of a track: seek to `start`,
/// play, and return when the position reaches `end` or playback ends
/// naturally, whichever comes first. Implementations must not return
/// early and must not hang if `end` is never reached.
#[async_trait]
pub trait SegmentPlayer: Send + Sync {
    async fn play_segment(&self, track: Track, segment: Segment) -> EngineResult<()>;
}

/// Schedules word-level comparative playback over an [`AnalysisResult`]'s
/// word alignments and the two recordings' durations.
pub struct PlaybackScheduler {
    player: Arc<dyn SegmentPlayer>,
    words: Vec<WordAlignment>,
    user_duration: f64,
    ref_duration: f64,
}

impl PlaybackScheduler {
    pub fn new(
        player: Arc<dyn SegmentPlayer>,
        words: Vec<WordAlignment>,
        user_duration: f64,
        ref_duration: f64,
    ) -> Self {
        Self {
            player,
            words,
            user_duration,
            ref_duration,
        }
    }

    /// Resolves segment bounds for a word: explicit timestamps when all
    /// four are present, otherwise the proportional estimate with a fixed
    /// assumed segment length.
    pub fn resolve_bounds(&self, word_index: usize) -> EngineResult<SegmentBounds> {
        let alignment = self.words.get(word_index).ok_or_else(|| {
            EngineError::InvalidState(format!(
                "word index {} out of range ({} words)",
                word_index,
                self.words.len()
            ))
        })?;

        if alignment.has_explicit_bounds() {
            return Ok(SegmentBounds {
                user: Segment {
                    start: alignment.user_start.unwrap_or_default(),
                    end: alignment.user_end.unwrap_or_default(),
                },
                reference: Segment {
                    start: alignment.ref_start.unwrap_or_default(),
                    end: alignment.ref_end.unwrap_or_default(),
                },
            });
        }

        let ratio = word_index as f64 / self.words.len() as f64;
        let user_start = ratio * self.user_duration;
        let ref_start = ratio * self.ref_duration;
        debug!(
            word_index,
            ratio, "No explicit timestamps, using proportional estimate"
        );

        Ok(SegmentBounds {
            user: Segment {
                start: user_start,
                end: user_start + FALLBACK_SEGMENT_SECS,
            },
            reference: Segment {
                start: ref_start,
                end: ref_start + FALLBACK_SEGMENT_SECS,
            },
        })
    }

    /// Plays the user's rendition of the word, pauses briefly, then plays
    /// the reference rendition. Resolves only after the reference segment
    /// finishes.
    pub async fn play_word_comparison(&self, word_index: usize) -> EngineResult<()> {
        let bounds = self.resolve_bounds(word_index)?;
        debug!(word_index, ?bounds, "Playing word comparison");

        self.player.play_segment(Track::User, bounds.user).await?;
        tokio::time::sleep(INTER_SEGMENT_GAP).await;
        self.player
            .play_segment(Track::Reference, bounds.reference)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::WordStatus;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    fn word(word: &str) -> WordAlignment {
        WordAlignment {
            word: word.to_string(),
            status: WordStatus::Good,
            phonetic: None,
            issue: None,
            ref_start: None,
            ref_end: None,
            user_start: None,
            user_end: None,
        }
    }

    fn timed_word(word: &str, bounds: [f64; 4]) -> WordAlignment {
        WordAlignment {
            ref_start: Some(bounds[0]),
            ref_end: Some(bounds[1]),
            user_start: Some(bounds[2]),
            user_end: Some(bounds[3]),
            ..self::word(word)
        }
    }

    /// Records every play call with track, bounds, and timing.
    struct RecordingPlayer {
        calls: Mutex<Vec<(Track, Segment, Instant)>>,
    }

    impl RecordingPlayer {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SegmentPlayer for RecordingPlayer {
        async fn play_segment(&self, track: Track, segment: Segment) -> EngineResult<()> {
            self.calls.lock().push((track, segment, Instant::now()));
            // Simulate real playback taking the segment's length.
            let secs = (segment.end - segment.start).max(0.0);
            tokio::time::sleep(Duration::from_secs_f64(secs)).await;
            Ok(())
        }
    }

    fn scheduler_with_words(
        player: Arc<RecordingPlayer>,
        words: Vec<WordAlignment>,
    ) -> PlaybackScheduler {
        PlaybackScheduler::new(player, words, 10.0, 10.0)
    }

    #[test]
    fn test_proportional_fallback_bounds() {
        let player = RecordingPlayer::new();
        let words = vec![word("a"), word("b"), word("c"), word("d"), word("e")];
        let scheduler = scheduler_with_words(player, words);

        let bounds = scheduler.resolve_bounds(2).unwrap();
        assert!((bounds.user.start - 4.0).abs() < 1e-9);
        assert!((bounds.user.end - 4.8).abs() < 1e-9);
        assert!((bounds.reference.start - 4.0).abs() < 1e-9);
        assert!((bounds.reference.end - 4.8).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_timestamps_used_directly() {
        let player = RecordingPlayer::new();
        let words = vec![timed_word("a", [1.0, 1.5, 2.0, 2.6])];
        let scheduler = scheduler_with_words(player, words);

        let bounds = scheduler.resolve_bounds(0).unwrap();
        assert_eq!(bounds.reference, Segment { start: 1.0, end: 1.5 });
        assert_eq!(bounds.user, Segment { start: 2.0, end: 2.6 });
    }

    #[test]
    fn test_partial_timestamps_fall_back_to_proportional() {
        let player = RecordingPlayer::new();
        let mut partial = timed_word("a", [1.0, 1.5, 2.0, 2.6]);
        partial.user_end = None;
        let scheduler = scheduler_with_words(player, vec![partial, word("b")]);

        let bounds = scheduler.resolve_bounds(0).unwrap();
        assert_eq!(bounds.user.start, 0.0);
        assert!((bounds.user.end - FALLBACK_SEGMENT_SECS).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_index_is_error() {
        let player = RecordingPlayer::new();
        let scheduler = scheduler_with_words(player, vec![word("a")]);
        let err = scheduler.resolve_bounds(5).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_segment_fully_precedes_reference_segment() {
        let player = RecordingPlayer::new();
        let words = vec![timed_word("a", [0.0, 0.5, 0.0, 0.5])];
        let scheduler = scheduler_with_words(player.clone(), words);

        let started = Instant::now();
        scheduler.play_word_comparison(0).await.unwrap();

        let calls = player.calls.lock();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, Track::User);
        assert_eq!(calls[1].0, Track::Reference);

        // Reference must start only after the user segment (0.5 s) plus
        // the 300 ms gap have fully elapsed.
        let reference_started = calls[1].2 - started;
        assert!(reference_started >= Duration::from_millis(800));
    }
}
