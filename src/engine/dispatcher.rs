// Per-tick phase dispatch
// Re-derives each entity's phase from the current time and pairs a
// one-shot transition notification with a continuous in-phase one

use crate::messaging::registry::{Channel, Payload, PhaseChannel};
use crate::midi::note::{Note, Phase, PitchEvent};

pub(crate) fn entered_channel(phase: Phase) -> PhaseChannel {
    match phase {
        Phase::Before => PhaseChannel::EnteredBefore,
        Phase::Sounding => PhaseChannel::EnteredSounding,
        Phase::After => PhaseChannel::EnteredAfter,
    }
}

pub(crate) fn while_channel(phase: Phase) -> PhaseChannel {
    match phase {
        Phase::Before => PhaseChannel::WhileBefore,
        Phase::Sounding => PhaseChannel::WhileSounding,
        Phase::After => PhaseChannel::WhileAfter,
    }
}

/// Advance every note's three-state machine to time `now`.
///
/// Notes are visited in extraction order; dispatch order across
/// simultaneous notes is insertion order and carries no musical meaning.
/// A phase differing from the stored one fires the one-shot `entered`
/// channel exactly once; the `while` channel fires every call in-phase.
/// Because transitions are re-derived from the stored phase, a clock that
/// moves backward across a boundary fires the one-shots again.
pub(crate) fn advance_notes(notes: &mut [Note], now: f64, out: &mut Vec<(Channel, Payload)>) {
    for note in notes.iter_mut() {
        let phase = Phase::of_span(now, note.on_time, note.off_time);
        let crossed = note.phase != Some(phase);
        note.phase = Some(phase);

        let payload = Payload::Note {
            note: *note,
            current_time: now,
        };
        if crossed {
            out.push((Channel::Note(entered_channel(phase)), payload));
        }
        out.push((Channel::Note(while_channel(phase)), payload));
    }
}

/// Advance every pitch event's two-state machine (Before/After) to `now`.
pub(crate) fn advance_pitch_bends(
    pitch_bends: &mut [PitchEvent],
    now: f64,
    out: &mut Vec<(Channel, Payload)>,
) {
    for event in pitch_bends.iter_mut() {
        let phase = Phase::of_instant(now, event.ms_time);
        let crossed = event.phase != Some(phase);
        event.phase = Some(phase);

        let payload = Payload::PitchBend {
            event: *event,
            current_time: now,
        };
        if crossed {
            out.push((Channel::PitchBend(entered_channel(phase)), payload));
        }
        out.push((Channel::PitchBend(while_channel(phase)), payload));
    }
}
