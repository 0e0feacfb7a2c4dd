// Note and pitch-bend entities with their playback phase
// A note is a bounded interval in millisecond time; a pitch event is a point

/// Playback phase of an entity relative to the current time.
///
/// Stored as `Option<Phase>` on the entities: `None` means the dispatcher
/// has never evaluated the entity, so whatever phase is computed first
/// counts as a transition and fires its one-shot notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    Before,
    Sounding,
    After,
}

impl Phase {
    /// Phase of a bounded interval at time `now`.
    /// The on boundary is inclusive, the off boundary exclusive.
    pub fn of_span(now: f64, on_time: f64, off_time: f64) -> Self {
        if now < on_time {
            Phase::Before
        } else if now < off_time {
            Phase::Sounding
        } else {
            Phase::After
        }
    }

    /// Phase of a point event at time `now`. Never yields `Sounding`.
    pub fn of_instant(now: f64, at: f64) -> Self {
        if now < at {
            Phase::Before
        } else {
            Phase::After
        }
    }
}

/// A paired note: a Note On matched with its Note Off in the same track.
///
/// Time bounds derive from the tempo map at extraction and never change;
/// only `phase` is mutated afterwards, by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Note {
    /// Event id of the Note On this note was built from
    pub event_id: u64,
    pub track: usize,
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
    /// Absolute tick of the onset
    pub tick: u64,
    /// Duration in ticks between on and off events
    pub gate: u64,
    /// Gate in quarter-note units (gate / resolution)
    pub beat: f64,
    pub on_time: f64,
    pub off_time: f64,
    pub phase: Option<Phase>,
}

impl Note {
    /// Note name in scientific pitch notation (e.g. "C4", "A#5").
    pub fn name(&self) -> String {
        const NOTE_NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];

        let octave = (self.pitch / 12) as i32 - 1;
        let note_index = (self.pitch % 12) as usize;

        format!("{}{}", NOTE_NAMES[note_index], octave)
    }
}

/// A pitch-bend sample: signed wheel position at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PitchEvent {
    pub event_id: u64,
    pub track: usize,
    pub channel: u8,
    /// Signed wheel position, -8192..=8191, 0 = center
    pub bend: i16,
    pub tick: u64,
    pub ms_time: f64,
    pub phase: Option<Phase>,
}
