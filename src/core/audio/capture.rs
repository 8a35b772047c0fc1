//! Recording capture: turns a live audio input stream into one immutable,
//! analyzable blob.
//!
//! The capture device is abstracted behind [`AudioSource`] so the state
//! machine can be exercised without hardware. The shipped implementation,
//! [`MicrophoneSource`], uses cpal and flushes raw PCM chunks at a fixed
//! 100 ms time-slice. The slice is deliberately short: some platforms emit
//! zero data at longer intervals, and even a very short recording must
//! yield at least one non-empty chunk.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::{debug, info, warn};

use super::wav::encode_wav;
use crate::errors::{EngineError, EngineResult};

/// Chunk flush interval. Short enough that even sub-second recordings
/// produce at least one non-empty chunk.
pub const CAPTURE_TIME_SLICE: Duration = Duration::from_millis(100);

/// Input-processing options requested from the platform.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub sample_rate: u32,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            sample_rate: 24000,
        }
    }
}

/// A finalized recording: one immutable blob plus metadata.
#[derive(Debug, Clone)]
pub struct RecordingBlob {
    pub data: Bytes,
    pub mime: String,
    /// Best-effort duration. Derived from blob metadata after
    /// finalization; advisory only, never a hard dependency.
    pub duration_secs: Option<f64>,
}

/// Abstraction over an audio input device delivering encoded chunks.
pub trait AudioSource {
    /// Acquires the device and starts delivering chunks on the returned
    /// channel. Acquisition failure is a device-permission error.
    fn open(&mut self, options: &CaptureOptions) -> EngineResult<Receiver<Bytes>>;

    /// Releases the device. Chunks already queued remain readable.
    fn close(&mut self);

    /// Sample rate the source actually delivers at.
    fn sample_rate(&self) -> u32;

    /// MIME type of the finalized blob built from this source's chunks.
    fn mime_type(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Idle,
    Recording,
}

/// Capture state machine over an [`AudioSource`].
///
/// `start` is only valid when idle and `stop` only while recording;
/// calling either out of turn is a programming error and returns
/// [`EngineError::InvalidState`].
pub struct RecordingCapture<S: AudioSource> {
    source: S,
    options: CaptureOptions,
    state: CaptureState,
    receiver: Option<Receiver<Bytes>>,
}

impl<S: AudioSource> RecordingCapture<S> {
    pub fn new(source: S, options: CaptureOptions) -> Self {
        Self {
            source,
            options,
            state: CaptureState::Idle,
            receiver: None,
        }
    }

    /// Acquires the input device and begins buffering chunks.
    pub fn start(&mut self) -> EngineResult<()> {
        if self.state != CaptureState::Idle {
            return Err(EngineError::InvalidState(
                "start called while already recording".to_string(),
            ));
        }

        let receiver = self.source.open(&self.options)?;
        self.receiver = Some(receiver);
        self.state = CaptureState::Recording;
        info!("Recording capture started");
        Ok(())
    }

    /// Releases the device and finalizes buffered chunks into one blob.
    pub fn stop(&mut self) -> EngineResult<RecordingBlob> {
        if self.state != CaptureState::Recording {
            return Err(EngineError::InvalidState(
                "stop called while not recording".to_string(),
            ));
        }

        self.source.close();
        self.state = CaptureState::Idle;

        let receiver = self.receiver.take().ok_or_else(|| {
            EngineError::InvalidState("recording had no chunk channel".to_string())
        })?;

        let mut pcm: Vec<u8> = Vec::new();
        let mut chunk_count = 0usize;
        while let Ok(chunk) = receiver.try_recv() {
            pcm.extend_from_slice(&chunk);
            chunk_count += 1;
        }

        let sample_rate = self.source.sample_rate();
        let data = encode_wav(&pcm, sample_rate);
        // Duration read back from the finalized blob; a decode failure
        // leaves it unset rather than failing the recording.
        let duration_secs = super::wav::decode_wav(&data)
            .ok()
            .map(|wav| wav.duration_secs());

        info!(
            chunks = chunk_count,
            bytes = data.len(),
            ?duration_secs,
            "Recording finalized"
        );

        Ok(RecordingBlob {
            data,
            mime: self.source.mime_type().to_string(),
            duration_secs,
        })
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }
}

/// cpal-backed microphone source emitting raw 16-bit mono PCM chunks.
pub struct MicrophoneSource {
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
    actual_sample_rate: u32,
}

impl MicrophoneSource {
    pub fn new() -> Self {
        Self {
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
            actual_sample_rate: 0,
        }
    }
}

impl Default for MicrophoneSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSource for MicrophoneSource {
    fn open(&mut self, options: &CaptureOptions) -> EngineResult<Receiver<Bytes>> {
        let host = cpal::default_host();
        let device = host.default_input_device().ok_or_else(|| {
            EngineError::DevicePermission("no audio input device available".to_string())
        })?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        // cpal has no portable echo-cancellation/noise-suppression knobs;
        // the request is honored where the platform applies them at the
        // device level.
        info!(
            device = %device_name,
            echo_cancellation = options.echo_cancellation,
            noise_suppression = options.noise_suppression,
            "Acquiring audio input device"
        );

        let supported = device
            .supported_input_configs()
            .map_err(|e| EngineError::DevicePermission(e.to_string()))?;

        let target_rate = SampleRate(options.sample_rate);
        let mut best = None;
        for cfg in supported {
            if cfg.min_sample_rate() <= target_rate && target_rate <= cfg.max_sample_rate() {
                best = Some(cfg.with_sample_rate(target_rate));
                break;
            }
            if best.is_none() {
                best = Some(cfg.with_max_sample_rate());
            }
        }
        let supported_config = best.ok_or_else(|| {
            EngineError::DevicePermission("no suitable input configuration found".to_string())
        })?;

        self.actual_sample_rate = supported_config.sample_rate().0;
        let channels = supported_config.channels() as usize;
        debug!(
            sample_rate = self.actual_sample_rate,
            channels, "Input configuration negotiated"
        );

        let config = StreamConfig {
            channels: supported_config.channels(),
            sample_rate: supported_config.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let (sender, receiver): (Sender<Bytes>, Receiver<Bytes>) = bounded(256);
        let running = self.running.clone();
        let samples_per_slice =
            (self.actual_sample_rate as u64 * CAPTURE_TIME_SLICE.as_millis() as u64 / 1000)
                as usize;
        let mut pending: Vec<u8> = Vec::with_capacity(samples_per_slice * 2);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if !running.load(Ordering::Relaxed) {
                        return;
                    }

                    // Downmix to mono and quantize to 16-bit PCM.
                    for frame in data.chunks(channels) {
                        let sample = frame.iter().sum::<f32>() / channels as f32;
                        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                        pending.extend_from_slice(&quantized.to_le_bytes());
                    }

                    // Flush whole time-slices.
                    while pending.len() >= samples_per_slice * 2 {
                        let chunk: Vec<u8> = pending.drain(..samples_per_slice * 2).collect();
                        if sender.try_send(Bytes::from(chunk)).is_err() {
                            warn!("Capture buffer overflow - dropping chunk");
                        }
                    }
                },
                move |err| {
                    warn!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| EngineError::DevicePermission(e.to_string()))?;

        stream
            .play()
            .map_err(|e| EngineError::DevicePermission(e.to_string()))?;

        self.running.store(true, Ordering::Relaxed);
        self.stream = Some(stream);
        Ok(receiver)
    }

    fn close(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.stream = None;
    }

    fn sample_rate(&self) -> u32 {
        self.actual_sample_rate
    }

    fn mime_type(&self) -> &str {
        "audio/wav"
    }
}
