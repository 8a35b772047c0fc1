//! Audio handling: container framing, transport encoding, and capture.

pub mod capture;
pub mod transport;
pub mod wav;

pub use capture::{AudioSource, CaptureOptions, MicrophoneSource, RecordingBlob, RecordingCapture};
pub use transport::{from_transport_text, to_transport_text};
pub use wav::{WAV_HEADER_SIZE, WavAudio, decode_wav, encode_wav};
