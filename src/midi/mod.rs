// MIDI module
// Raw record model, time-stamped event stream, and note/pitch extraction

pub mod event;
pub mod extractor;
pub mod note;

pub use event::{RawEvent, TrackRecord};
pub use extractor::{Score, ScoreData};
pub use note::{Note, Phase, PitchEvent};
