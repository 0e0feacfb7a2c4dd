// Player module
// Playback status state machine and the host clock abstraction

pub mod clock;
pub mod transport;

pub use clock::{ClockSource, ManualClock};
pub use transport::{Player, PlayerStatus, TIME_UNSET};
