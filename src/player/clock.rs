// Host clock abstraction
// The engine never owns a clock; the host supplies one (the audio
// subsystem's clock in audio-sync mode) or lets the frame timestamp rule

use std::cell::Cell;
use std::rc::Rc;

/// A monotonically increasing source of elapsed milliseconds.
///
/// Implemented for plain closures, so a host can pass
/// `|| audio_context_time_ms()` directly. The engine may be handed a new
/// source at any time, e.g. after an audio reload.
pub trait ClockSource {
    fn now_ms(&mut self) -> f64;
}

impl<F: FnMut() -> f64> ClockSource for F {
    fn now_ms(&mut self) -> f64 {
        self()
    }
}

/// A hand-driven clock, shared between a test (or host) and the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock to an absolute millisecond value.
    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    /// Advance the clock by `delta_ms`.
    pub fn advance(&self, delta_ms: f64) {
        self.now.set(self.now.get() + delta_ms);
    }

    pub fn get(&self) -> f64 {
        self.now.get()
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&mut self) -> f64 {
        self.now.get()
    }
}
