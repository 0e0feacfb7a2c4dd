// Raw MIDI record model
// Track records as supplied by the host's SMF parser, plus the
// time-stamped events the extractor derives from them

/// Note Off status class
pub const NOTE_OFF: u8 = 0x80;
/// Note On status class
pub const NOTE_ON: u8 = 0x90;
/// Pitch Bend status class
pub const PITCH_BEND: u8 = 0xE0;
/// Meta message marker
pub const META: u8 = 0xFF;
/// Meta subtype: set tempo (microseconds per quarter note)
pub const META_SET_TEMPO: u8 = 0x51;

/// One parsed track record, as handed over by the host's SMF parser.
///
/// `message` is the status class (high nibble of the status byte, or 0xFF
/// for meta messages), `subtype` the meta event type, `delta` the tick gap
/// to the previous record in the track, `value` the numeric payload (e.g.
/// microseconds per beat for set-tempo) and `data` the raw status byte
/// followed by the two data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TrackRecord {
    pub message: u8,
    pub subtype: u8,
    pub delta: u64,
    pub value: u32,
    pub data: [u8; 3],
}

impl TrackRecord {
    /// Note On record (velocity > 0 for an actual onset).
    pub fn note_on(delta: u64, channel: u8, pitch: u8, velocity: u8) -> Self {
        assert!(channel <= 15, "MIDI channel must be 0-15");
        assert!(pitch <= 127, "MIDI pitch must be 0-127");
        assert!(velocity <= 127, "MIDI velocity must be 0-127");
        Self {
            message: NOTE_ON,
            subtype: 0,
            delta,
            value: 0,
            data: [NOTE_ON | channel, pitch, velocity],
        }
    }

    /// Note Off record.
    pub fn note_off(delta: u64, channel: u8, pitch: u8) -> Self {
        assert!(channel <= 15, "MIDI channel must be 0-15");
        assert!(pitch <= 127, "MIDI pitch must be 0-127");
        Self {
            message: NOTE_OFF,
            subtype: 0,
            delta,
            value: 0,
            data: [NOTE_OFF | channel, pitch, 0],
        }
    }

    /// Pitch Bend record. `bend` is the signed wheel position in
    /// [-8192, 8191], 0 = center.
    pub fn pitch_bend(delta: u64, channel: u8, bend: i16) -> Self {
        assert!(channel <= 15, "MIDI channel must be 0-15");
        assert!(
            (-8192..=8191).contains(&bend),
            "pitch bend must be -8192..=8191"
        );
        let raw = (bend as i32 + 8192) as u32;
        Self {
            message: PITCH_BEND,
            subtype: 0,
            delta,
            value: raw,
            data: [PITCH_BEND | channel, (raw & 0x7F) as u8, (raw >> 7) as u8],
        }
    }

    /// Meta set-tempo record.
    pub fn set_tempo(delta: u64, us_per_beat: u32) -> Self {
        Self {
            message: META,
            subtype: META_SET_TEMPO,
            delta,
            value: us_per_beat,
            data: [0, 0, 0],
        }
    }
}

/// One time-stamped event of the flat extracted stream.
///
/// `event_id` is globally unique and strictly increasing across the whole
/// stream. `tick` is the absolute tick within the owning track and
/// `ms_time` its millisecond position via the tempo map. Immutable once
/// extracted; note pairing tracks consumption in a separate visited set.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RawEvent {
    pub event_id: u64,
    pub track: usize,
    pub index: usize,
    pub message: u8,
    pub subtype: u8,
    pub delta: u64,
    pub tick: u64,
    pub value: u32,
    pub data: [u8; 3],
    pub channel: u8,
    pub ms_time: f64,
}

impl RawEvent {
    /// MIDI channel derived from the raw status byte.
    pub fn channel_of(data: &[u8; 3]) -> u8 {
        data[0] & 0x0F
    }

    /// A real note onset: Note On with velocity above zero.
    pub fn is_note_on(&self) -> bool {
        self.message == NOTE_ON && self.data[2] > 0
    }

    /// Ends a note: explicit Note Off, or Note On with velocity zero.
    pub fn is_note_end(&self) -> bool {
        self.message == NOTE_OFF || (self.message == NOTE_ON && self.data[2] == 0)
    }

    pub fn is_pitch_bend(&self) -> bool {
        self.message == PITCH_BEND
    }

    pub fn pitch(&self) -> u8 {
        self.data[1]
    }

    pub fn velocity(&self) -> u8 {
        self.data[2]
    }

    /// Signed pitch-wheel position decoded from the two data bytes.
    pub fn bend(&self) -> i16 {
        (self.data[1] as i32 + self.data[2] as i32 * 128 - 8192) as i16
    }
}
