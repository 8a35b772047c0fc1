//! cpal-backed segment player.
//!
//! Holds the two decoded recordings and plays a bounded sample range of
//! one of them on the default output device. The wait for completion is
//! bounded by the segment length plus a margin, so a stalled device can
//! never hang the scheduler indefinitely.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use tracing::{debug, warn};

use super::{Segment, SegmentPlayer, Track};
use crate::core::audio::WavAudio;
use crate::errors::{EngineError, EngineResult};

/// Extra wait beyond the segment's nominal length before giving up on
/// the playback-ended signal.
const COMPLETION_MARGIN: Duration = Duration::from_millis(500);

/// Plays bounded segments of the user and reference recordings.
pub struct DeviceSegmentPlayer {
    user: WavAudio,
    reference: WavAudio,
}

impl DeviceSegmentPlayer {
    pub fn new(user: WavAudio, reference: WavAudio) -> Self {
        Self { user, reference }
    }

    fn track_audio(&self, track: Track) -> &WavAudio {
        match track {
            Track::User => &self.user,
            Track::Reference => &self.reference,
        }
    }
}

#[async_trait]
impl SegmentPlayer for DeviceSegmentPlayer {
    async fn play_segment(&self, track: Track, segment: Segment) -> EngineResult<()> {
        let audio = self.track_audio(track).clone();
        // cpal streams are not Send; the whole play lives on one blocking
        // thread and the async side just awaits its completion.
        tokio::task::spawn_blocking(move || play_bounded_segment(&audio, segment))
            .await
            .map_err(|e| EngineError::InvalidState(format!("playback task failed: {e}")))?
    }
}

/// Seeks to `segment.start`, plays until `segment.end` or the natural end
/// of the recording, and returns when the output queue has drained.
fn play_bounded_segment(audio: &WavAudio, segment: Segment) -> EngineResult<()> {
    let total_secs = audio.duration_secs();
    let start = segment.start.clamp(0.0, total_secs);
    let end = segment.end.clamp(0.0, total_secs);
    if end <= start {
        debug!(?segment, "Segment empty after clamping to recording length");
        return Ok(());
    }

    // Sample range for 16-bit mono PCM.
    let start_sample = (start * audio.sample_rate as f64) as usize;
    let end_sample = (end * audio.sample_rate as f64) as usize;
    let samples: Vec<f32> = audio
        .pcm
        .chunks_exact(2)
        .skip(start_sample)
        .take(end_sample - start_sample)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / f32::from(i16::MAX))
        .collect();

    let host = cpal::default_host();
    let device = host.default_output_device().ok_or_else(|| {
        EngineError::DevicePermission("no audio output device available".to_string())
    })?;
    let default_config = device
        .default_output_config()
        .map_err(|e| EngineError::DevicePermission(e.to_string()))?;

    let channels = default_config.channels();
    let config = StreamConfig {
        channels,
        sample_rate: SampleRate(audio.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    let queue = Arc::new(Mutex::new(VecDeque::from(samples)));
    let queue_for_callback = Arc::clone(&queue);
    let (done_tx, done_rx) = mpsc::channel::<()>();
    let signalled = Arc::new(AtomicBool::new(false));
    let signalled_for_callback = Arc::clone(&signalled);
    let channel_count = channels as usize;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut queue = match queue_for_callback.lock() {
                    Ok(queue) => queue,
                    Err(_) => return,
                };
                for frame in data.chunks_mut(channel_count) {
                    let sample = queue.pop_front().unwrap_or(0.0);
                    for slot in frame.iter_mut() {
                        *slot = sample;
                    }
                }
                if queue.is_empty() && !signalled_for_callback.swap(true, Ordering::SeqCst) {
                    let _ = done_tx.send(());
                }
            },
            |err| warn!("Audio output stream error: {}", err),
            None,
        )
        .map_err(|e| EngineError::DevicePermission(e.to_string()))?;

    stream
        .play()
        .map_err(|e| EngineError::DevicePermission(e.to_string()))?;

    // Playback-ended signal, bounded as a safety net in case the device
    // never reaches the end of the queue.
    let deadline = Duration::from_secs_f64(end - start) + COMPLETION_MARGIN;
    if done_rx.recv_timeout(deadline).is_err() {
        warn!(?segment, "Segment playback did not signal completion in time");
    }

    drop(stream);
    Ok(())
}
