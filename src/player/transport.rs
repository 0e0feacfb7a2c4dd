// Player - playback status and position over a sampled external clock
// Controls play/pause/stop state and derives the current timeline position

/// Current time value before the first play (and after a stop).
pub const TIME_UNSET: f64 = -1.0;

/// Playback status (stopped/playing/paused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlayerStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayerStatus::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, PlayerStatus::Paused)
    }

    pub fn is_stopped(&self) -> bool {
        matches!(self, PlayerStatus::Stopped)
    }
}

/// The playback clock state machine.
///
/// The host samples an external clock into the player every tick; while
/// playing, the current timeline position is the sampled clock minus the
/// stamp taken when playback's zero point began, plus a constant render
/// shift. Legal transitions: Stopped -> Playing -> Paused -> Playing, and
/// any state -> Stopped.
#[derive(Debug, Clone)]
pub struct Player {
    status: PlayerStatus,
    current_time: f64,
    time_stamp: f64,
    start_time_stamp: f64,
    render_time_shift: f64,
}

impl Player {
    pub fn new(render_time_shift: f64) -> Self {
        Self {
            status: PlayerStatus::Stopped,
            current_time: TIME_UNSET,
            time_stamp: 0.0,
            start_time_stamp: 0.0,
            render_time_shift,
        }
    }

    /// Start playback at `start_ms` into the timeline.
    /// From Paused, the stored position wins over the supplied offset.
    pub fn play(&mut self, start_ms: f64) {
        let start = if self.status.is_paused() {
            self.current_time
        } else {
            start_ms
        };
        self.status = PlayerStatus::Playing;
        self.start_time_stamp = self.time_stamp - start;
    }

    /// Freeze the current position. Only legal from Playing; returns
    /// whether the transition happened.
    pub fn pause(&mut self) -> bool {
        if !self.status.is_playing() {
            return false;
        }
        self.current_time = self.time_stamp - self.start_time_stamp;
        self.status = PlayerStatus::Paused;
        true
    }

    /// Stop from any state and forget the position.
    pub fn stop(&mut self) {
        self.status = PlayerStatus::Stopped;
        self.start_time_stamp = 0.0;
        self.current_time = TIME_UNSET;
    }

    /// Store one external clock sample; while playing this also advances
    /// the current timeline position.
    pub fn sample(&mut self, clock_ms: f64) {
        self.time_stamp = clock_ms;
        if self.status.is_playing() {
            self.current_time = self.time_stamp - self.start_time_stamp + self.render_time_shift;
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    /// Position in the timeline, in ms. `TIME_UNSET` before the first play.
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Last sampled external clock value.
    pub fn time_stamp(&self) -> f64 {
        self.time_stamp
    }

    pub fn render_time_shift(&self) -> f64 {
        self.render_time_shift
    }

    pub fn set_render_time_shift(&mut self, shift_ms: f64) {
        self.render_time_shift = shift_ms;
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(0.0)
    }
}
