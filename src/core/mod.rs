pub mod analysis;
pub mod audio;
pub mod cache;
pub mod content;
pub mod playback;
pub mod state;
pub mod types;

// Re-export commonly used types for convenience
pub use analysis::{AlignmentClient, AnalysisResult, WordAlignment, WordStatus};
pub use audio::{
    RecordingBlob, RecordingCapture, decode_wav, encode_wav, from_transport_text,
    to_transport_text,
};
pub use cache::{ChallengeCache, ChallengeLoader};
pub use content::{ChallengeService, ContentProvider, PassageDraft, SpeechSynthesizer};
pub use playback::{PlaybackScheduler, Segment, SegmentPlayer, Track};
pub use types::{Challenge, Level, Mode};

// Re-export EngineState for external use
pub use state::EngineState;
