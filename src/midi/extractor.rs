// Event stream extractor
// Walks the parsed track records once, producing the flat time-stamped
// stream, then derives paired notes and pitch-bend samples from it

use std::collections::HashSet;

use crate::messaging::diagnostic::Diagnostic;
use crate::midi::event::{RawEvent, TrackRecord};
use crate::midi::note::{Note, PitchEvent};
use crate::timing::TempoMap;

/// Parsed file contents as supplied by the host: ordered tracks of ordered
/// records, plus the file's ticks-per-quarter-note resolution.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScoreData {
    pub tracks: Vec<Vec<TrackRecord>>,
    pub resolution: u32,
}

impl ScoreData {
    pub fn new(tracks: Vec<Vec<TrackRecord>>, resolution: u32) -> Self {
        assert!(resolution > 0, "resolution must be > 0");
        Self { tracks, resolution }
    }
}

/// Everything extracted from one loaded file: tempo map, flat event
/// stream, paired notes, pitch-bend samples, diagnostics, and the
/// timeline's end time (maximum note off time).
#[derive(Debug, Clone)]
pub struct Score {
    tempo_map: TempoMap,
    events: Vec<RawEvent>,
    notes: Vec<Note>,
    pitch_bends: Vec<PitchEvent>,
    diagnostics: Vec<Diagnostic>,
    end_time: f64,
}

impl Score {
    /// Run the full extraction pipeline over the parsed records.
    pub fn extract(data: &ScoreData) -> Self {
        let tempo_map = TempoMap::build(&data.tracks, data.resolution);
        let events = extract_events(&data.tracks, &tempo_map);
        let mut diagnostics = Vec::new();
        let (notes, end_time) =
            extract_notes(&events, data.resolution, &mut diagnostics);
        let pitch_bends = extract_pitch_bends(&events);

        Self {
            tempo_map,
            events,
            notes,
            pitch_bends,
            diagnostics,
            end_time,
        }
    }

    /// Score with no content, used before any file is loaded.
    pub fn empty(resolution: u32) -> Self {
        Self {
            tempo_map: TempoMap::build(&[], resolution),
            events: Vec::new(),
            notes: Vec::new(),
            pitch_bends: Vec::new(),
            diagnostics: Vec::new(),
            end_time: 0.0,
        }
    }

    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo_map
    }

    pub fn events(&self) -> &[RawEvent] {
        &self.events
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub(crate) fn notes_mut(&mut self) -> &mut [Note] {
        &mut self.notes
    }

    pub fn pitch_bends(&self) -> &[PitchEvent] {
        &self.pitch_bends
    }

    pub(crate) fn pitch_bends_mut(&mut self) -> &mut [PitchEvent] {
        &mut self.pitch_bends
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Maximum off time across all extracted notes, in milliseconds.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Latest pitch-bend value at or before `ms`, optionally restricted to
    /// one track and/or channel. Center (0) when no sample applies yet.
    pub fn bend_at(&self, ms: f64, track: Option<usize>, channel: Option<u8>) -> i16 {
        let mut latest_ms = f64::NEG_INFINITY;
        let mut latest = 0;
        for event in &self.pitch_bends {
            if track.is_some_and(|t| event.track != t) {
                continue;
            }
            if channel.is_some_and(|c| event.channel != c) {
                continue;
            }
            if event.ms_time <= ms && latest_ms <= event.ms_time {
                latest_ms = event.ms_time;
                latest = event.bend;
            }
        }
        latest
    }
}

/// One time-stamped `RawEvent` per record, in track order then position
/// order, with a strictly increasing global event id.
///
/// When the tempo map is empty (no set-tempo records at all) event times
/// stay at 0; time conversions are meaningless without tempo data.
fn extract_events(tracks: &[Vec<TrackRecord>], tempo_map: &TempoMap) -> Vec<RawEvent> {
    let mut events = Vec::with_capacity(tracks.iter().map(Vec::len).sum());
    let mut event_id = 0u64;

    for (track_index, track) in tracks.iter().enumerate() {
        let mut tick = 0u64;
        for (index, record) in track.iter().enumerate() {
            tick += record.delta;
            let ms_time = tempo_map.tick_to_ms(tick).unwrap_or(0.0);

            events.push(RawEvent {
                event_id,
                track: track_index,
                index,
                message: record.message,
                subtype: record.subtype,
                delta: record.delta,
                tick,
                value: record.value,
                data: record.data,
                channel: RawEvent::channel_of(&record.data),
                ms_time,
            });
            event_id += 1;
        }
    }

    events
}

/// Pair each Note On (velocity > 0) with the first unconsumed note end of
/// the same pitch further along the same track. Returns the notes and the
/// maximum off time seen.
///
/// A Note On with no match is dropped with a diagnostic; pairing then
/// continues with the next event. Consumption lives in a visited-id set,
/// never on the shared event records.
fn extract_notes(
    events: &[RawEvent],
    resolution: u32,
    diagnostics: &mut Vec<Diagnostic>,
) -> (Vec<Note>, f64) {
    let mut consumed: HashSet<u64> = HashSet::new();
    let mut notes = Vec::new();
    let mut end_time = 0.0f64;

    for (position, event) in events.iter().enumerate() {
        if !event.is_note_on() {
            continue;
        }

        let matched = events[position + 1..]
            .iter()
            .take_while(|candidate| candidate.track == event.track)
            .find(|candidate| {
                !consumed.contains(&candidate.event_id)
                    && candidate.is_note_end()
                    && candidate.pitch() == event.pitch()
            });

        let Some(off_event) = matched else {
            diagnostics.push(Diagnostic::unmatched_note_on(
                event.track,
                event.channel,
                event.pitch(),
                event.velocity(),
                event.ms_time,
            ));
            continue;
        };

        consumed.insert(off_event.event_id);
        let gate = off_event.tick - event.tick;

        notes.push(Note {
            event_id: event.event_id,
            track: event.track,
            channel: event.channel,
            pitch: event.pitch(),
            velocity: event.velocity(),
            tick: event.tick,
            gate,
            beat: gate as f64 / resolution as f64,
            on_time: event.ms_time,
            off_time: off_event.ms_time,
            phase: None,
        });

        if end_time < off_event.ms_time {
            end_time = off_event.ms_time;
        }
    }

    (notes, end_time)
}

/// One `PitchEvent` per pitch-bend record, in stream order.
fn extract_pitch_bends(events: &[RawEvent]) -> Vec<PitchEvent> {
    events
        .iter()
        .filter(|event| event.is_pitch_bend())
        .map(|event| PitchEvent {
            event_id: event.event_id,
            track: event.track,
            channel: event.channel,
            bend: event.bend(),
            tick: event.tick,
            ms_time: event.ms_time,
            phase: None,
        })
        .collect()
}
