// Tempo map - piecewise-linear time over sorted tempo checkpoints
// Converts between tick position and millisecond position

use thiserror::Error;

use crate::midi::event::{META, META_SET_TEMPO, TrackRecord};

/// Errors raised by tick/millisecond conversions
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimingError {
    #[error("no tempo data: the tempo map is empty")]
    NoTempoData,

    #[error("tick {tick} precedes the first tempo change at tick {first}")]
    TickBeforeFirstTempo { tick: u64, first: u64 },
}

/// One tempo checkpoint
///
/// `ms_time` is the absolute millisecond position of the checkpoint,
/// computed iteratively from the previous segment's rate.
/// `step` is the tick distance to the previous checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TempoChange {
    pub tick: u64,
    pub us_per_beat: f64,
    pub ms_time: f64,
    pub step: u64,
}

/// Sorted set of tempo checkpoints for one loaded file
///
/// Checkpoints are stable-sorted by tick; when several checkpoints share a
/// tick, the one inserted last is authoritative for lookups at that tick.
/// Lookup is a linear scan - tempo maps hold tens to low hundreds of entries.
#[derive(Debug, Clone)]
pub struct TempoMap {
    resolution: u32,
    changes: Vec<TempoChange>,
}

impl TempoMap {
    /// Scan all track records for meta set-tempo events and build the map.
    ///
    /// Records are visited in track order then position order, matching the
    /// order the checkpoints were written in the file.
    pub fn build(tracks: &[Vec<TrackRecord>], resolution: u32) -> Self {
        assert!(resolution > 0, "resolution must be > 0");

        let mut changes = Vec::new();
        for track in tracks {
            let mut tick = 0u64;
            for record in track {
                tick += record.delta;
                if record.message == META && record.subtype == META_SET_TEMPO {
                    changes.push(TempoChange {
                        tick,
                        us_per_beat: record.value as f64,
                        ms_time: 0.0,
                        step: 0,
                    });
                }
            }
        }

        // Stable sort keeps insertion order among equal ticks, which is what
        // makes the last-inserted checkpoint win lookups at that tick.
        changes.sort_by_key(|change| change.tick);

        let mut map = Self {
            resolution,
            changes,
        };
        map.recompute_ms_times();
        map
    }

    /// Map with a single checkpoint at tick 0.
    ///
    /// Hosts use this to supply the implicit default tempo when a file
    /// carries no set-tempo events at all.
    pub fn with_initial(resolution: u32, us_per_beat: f64) -> Self {
        assert!(resolution > 0, "resolution must be > 0");
        assert!(us_per_beat > 0.0, "tempo must be > 0 microseconds per beat");
        Self {
            resolution,
            changes: vec![TempoChange {
                tick: 0,
                us_per_beat,
                ms_time: 0.0,
                step: 0,
            }],
        }
    }

    fn recompute_ms_times(&mut self) {
        for i in 0..self.changes.len() {
            if i == 0 {
                self.changes[0].ms_time = 0.0;
                self.changes[0].step = 0;
            } else {
                let step = self.changes[i].tick - self.changes[i - 1].tick;
                self.changes[i].step = step;
                self.changes[i].ms_time = self.changes[i - 1].ms_time
                    + step as f64 * self.changes[i - 1].us_per_beat / self.resolution as f64
                        / 1000.0;
            }
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn changes(&self) -> &[TempoChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Last checkpoint whose tick is <= `tick`.
    /// Among checkpoints sharing that tick, the last inserted wins.
    fn change_at_tick(&self, tick: u64) -> Result<&TempoChange, TimingError> {
        if self.changes.is_empty() {
            return Err(TimingError::NoTempoData);
        }
        let mut found = None;
        for change in &self.changes {
            if change.tick <= tick {
                found = Some(change);
            } else {
                break;
            }
        }
        found.ok_or(TimingError::TickBeforeFirstTempo {
            tick,
            first: self.changes[0].tick,
        })
    }

    /// Last checkpoint whose ms_time is <= `ms` (`ms` already clamped >= 0).
    fn change_at_ms(&self, ms: f64) -> Result<&TempoChange, TimingError> {
        if self.changes.is_empty() {
            return Err(TimingError::NoTempoData);
        }
        let mut found = None;
        for change in &self.changes {
            if change.ms_time <= ms {
                found = Some(change);
            } else {
                break;
            }
        }
        // ms is clamped to 0 and the first checkpoint sits at ms_time 0,
        // so a miss here means the map itself is inconsistent.
        found.ok_or(TimingError::NoTempoData)
    }

    /// Millisecond position of a tick.
    pub fn tick_to_ms(&self, tick: u64) -> Result<f64, TimingError> {
        let change = self.change_at_tick(tick)?;
        Ok(change.ms_time
            + (tick - change.tick) as f64 * (change.us_per_beat / self.resolution as f64) / 1000.0)
    }

    /// Tick position of a millisecond time. Negative times clamp to 0.
    /// The result is fractional when `ms` falls between tick boundaries.
    pub fn ms_to_tick(&self, ms: f64) -> Result<f64, TimingError> {
        let ms = ms.max(0.0);
        let change = self.change_at_ms(ms)?;
        Ok(change.tick as f64
            + (ms - change.ms_time) / (change.us_per_beat / self.resolution as f64 / 1000.0))
    }

    /// Beats per minute, rounded to 3 decimals.
    pub fn bpm_from_us_per_beat(us_per_beat: f64) -> f64 {
        (60_000_000.0 / us_per_beat * 1000.0).round() / 1000.0
    }

    /// BPM in effect at a tick position.
    pub fn bpm_at_tick(&self, tick: u64) -> Result<f64, TimingError> {
        Ok(Self::bpm_from_us_per_beat(self.change_at_tick(tick)?.us_per_beat))
    }

    /// BPM in effect at a millisecond position.
    pub fn bpm_at_ms(&self, ms: f64) -> Result<f64, TimingError> {
        Ok(Self::bpm_from_us_per_beat(
            self.change_at_ms(ms.max(0.0))?.us_per_beat,
        ))
    }

    /// BPM of the first checkpoint.
    pub fn start_bpm(&self) -> Result<f64, TimingError> {
        let first_tick = self.changes.first().ok_or(TimingError::NoTempoData)?.tick;
        self.bpm_at_tick(first_tick)
    }
}
