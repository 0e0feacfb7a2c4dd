// Timing module
// Tempo checkpoints and tick <-> millisecond conversion

pub mod tempo_map;

pub use tempo_map::{TempoChange, TempoMap, TimingError};
