// SMF Listener - synchronizes a parsed MIDI event timeline against a
// real-time playback clock and notifies subscribers of note and
// pitch-bend state transitions

pub mod engine;
pub mod messaging;
pub mod midi;
pub mod player;
pub mod timing;

// Re-export commonly used types for convenience
pub use engine::{EngineOptions, Listener};
pub use messaging::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticLevel};
pub use messaging::registry::{Channel, ListenerRegistry, Payload, PhaseChannel};
pub use midi::event::{RawEvent, TrackRecord};
pub use midi::extractor::{Score, ScoreData};
pub use midi::note::{Note, Phase, PitchEvent};
pub use player::clock::{ClockSource, ManualClock};
pub use player::transport::{Player, PlayerStatus, TIME_UNSET};
pub use timing::tempo_map::{TempoChange, TempoMap, TimingError};
