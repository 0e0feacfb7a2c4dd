// Diagnostic records for non-fatal extraction problems
// Collected per extraction pass and queryable by the host; never fatal

use std::fmt;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DiagnosticLevel {
    Info,
    Warning,
}

/// What went wrong, with enough context to locate the record in the file
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DiagnosticKind {
    /// A Note On had no matching Note Off before its track ended.
    /// The candidate note was dropped; extraction continued.
    UnmatchedNoteOn {
        track: usize,
        channel: u8,
        pitch: u8,
        velocity: u8,
        on_time: f64,
    },
}

/// One diagnostic record
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn unmatched_note_on(
        track: usize,
        channel: u8,
        pitch: u8,
        velocity: u8,
        on_time: f64,
    ) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            kind: DiagnosticKind::UnmatchedNoteOn {
                track,
                channel,
                pitch,
                velocity,
                on_time,
            },
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::UnmatchedNoteOn {
                track,
                channel,
                pitch,
                velocity,
                on_time,
            } => write!(
                f,
                "no note off found: track {track}, channel {channel}, pitch {pitch}, \
                 velocity {velocity}, on at {on_time} ms"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmatched_note_on_diagnostic() {
        let diag = Diagnostic::unmatched_note_on(2, 9, 60, 100, 1500.0);

        assert_eq!(diag.level, DiagnosticLevel::Warning);
        match diag.kind {
            DiagnosticKind::UnmatchedNoteOn { track, pitch, .. } => {
                assert_eq!(track, 2);
                assert_eq!(pitch, 60);
            }
        }
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::unmatched_note_on(0, 1, 72, 64, 250.0);
        let text = diag.to_string();

        assert!(text.contains("no note off found"));
        assert!(text.contains("pitch 72"));
        assert!(text.contains("250 ms"));
    }
}
