// Engine root
// Owns the extracted score, the player, and the subscriber registry;
// one `tick` per host frame drives sampling, dispatch, and auto-stop

pub mod dispatcher;

use std::rc::Rc;

use crate::messaging::diagnostic::Diagnostic;
use crate::messaging::registry::{Channel, ListenerRegistry, Payload};
use crate::midi::extractor::{Score, ScoreData};
use crate::midi::note::{Note, PitchEvent};
use crate::player::clock::ClockSource;
use crate::player::transport::{Player, PlayerStatus};
use crate::timing::{TempoMap, TimingError};

/// Engine construction options.
///
/// `audio_sync` selects the host-supplied audio clock as the time source;
/// without one (or with `audio_sync` off, the degraded mode) the frame
/// timestamp passed to `tick` rules. `render_time_shift` is a constant
/// millisecond bias added to the playback position.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub audio_sync: bool,
    pub render_time_shift: f64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            audio_sync: true,
            render_time_shift: 0.0,
        }
    }
}

/// The SMF listener engine.
///
/// Single threaded and cooperative: the host calls `tick` once per frame;
/// everything a tick fires is delivered synchronously, in subscriber
/// registration order, before `tick` returns.
pub struct Listener {
    options: EngineOptions,
    score: Score,
    player: Player,
    registry: Rc<ListenerRegistry>,
    audio_clock: Option<Box<dyn ClockSource>>,
    audio_duration_ms: Option<f64>,
    ready_pending: bool,
    emissions: Vec<(Channel, Payload)>,
}

impl Listener {
    /// Build the engine from parsed file contents: tempo map, event
    /// stream, notes, and pitch bends are all extracted here.
    pub fn new(data: &ScoreData, options: EngineOptions) -> Self {
        Self {
            options,
            score: Score::extract(data),
            player: Player::new(options.render_time_shift),
            registry: Rc::new(ListenerRegistry::new()),
            audio_clock: None,
            audio_duration_ms: None,
            ready_pending: true,
            emissions: Vec::new(),
        }
    }

    /// Replace the loaded file. Playback stops first, so no notification
    /// can fire against stale entities; `ready` is re-armed and fires on
    /// the next tick.
    pub fn reload(&mut self, data: &ScoreData) {
        if !self.player.status().is_stopped() {
            self.stop();
        }
        self.score = Score::extract(data);
        self.ready_pending = true;
    }

    /// One scheduler tick. `frame_ts_ms` is the host's frame timestamp; it
    /// is handed to `render` subscribers verbatim and doubles as the time
    /// source when no audio clock applies.
    pub fn tick(&mut self, frame_ts_ms: f64) {
        let clock_ms = if self.options.audio_sync {
            match self.audio_clock.as_mut() {
                Some(clock) => clock.now_ms(),
                None => frame_ts_ms,
            }
        } else {
            frame_ts_ms
        };
        self.player.sample(clock_ms);

        if self.ready_pending {
            self.ready_pending = false;
            self.registry.dispatch(Channel::Ready, &Payload::None);
        }

        self.registry.dispatch(
            Channel::Render,
            &Payload::Render {
                time_stamp: frame_ts_ms,
            },
        );

        let now = self.player.current_time();
        let mut emissions = std::mem::take(&mut self.emissions);
        dispatcher::advance_notes(self.score.notes_mut(), now, &mut emissions);
        dispatcher::advance_pitch_bends(self.score.pitch_bends_mut(), now, &mut emissions);
        for (channel, payload) in emissions.drain(..) {
            self.registry.dispatch(channel, &payload);
        }
        self.emissions = emissions;

        if self.player.status().is_playing() && self.end_time() < self.player.current_time() {
            self.stop();
        }
    }

    /// Start playback `start_ms` into the timeline (resumes from the
    /// paused position when paused).
    pub fn play(&mut self, start_ms: f64) {
        self.player.play(start_ms);
        self.registry.dispatch(Channel::PlayerPlay, &Payload::None);
    }

    /// Pause playback. No-op unless currently playing.
    pub fn pause(&mut self) {
        if self.player.pause() {
            self.registry.dispatch(Channel::PlayerPause, &Payload::None);
        }
    }

    /// Stop playback from any state.
    pub fn stop(&mut self) {
        self.player.stop();
        self.registry.dispatch(Channel::PlayerStop, &Payload::None);
    }

    /// Register a callback; see `ListenerRegistry::subscribe`.
    pub fn subscribe(
        &self,
        channel: Channel,
        name: Option<&str>,
        callback: impl Fn(&Payload) + 'static,
    ) -> String {
        self.registry.subscribe(channel, name, callback)
    }

    /// Remove a callback by name; see `ListenerRegistry::unsubscribe`.
    pub fn unsubscribe(&self, channel: Channel, name: &str) -> bool {
        self.registry.unsubscribe(channel, name)
    }

    /// Shared handle to the registry, e.g. for callbacks that manage
    /// their own subscriptions.
    pub fn registry(&self) -> Rc<ListenerRegistry> {
        Rc::clone(&self.registry)
    }

    /// Hand over (or clear) the audio clock used in audio-sync mode.
    pub fn set_audio_clock(&mut self, clock: Option<Box<dyn ClockSource>>) {
        self.audio_clock = clock;
    }

    /// Toggle audio-sync mode; off means the frame timestamp is the time
    /// source (degraded mode after a failed audio load).
    pub fn set_audio_sync(&mut self, audio_sync: bool) {
        self.options.audio_sync = audio_sync;
    }

    /// Duration of the external audio asset, if the host decoded one.
    /// Extends `end_time` beyond the MIDI timeline when longer.
    pub fn set_audio_duration(&mut self, duration_ms: Option<f64>) {
        self.audio_duration_ms = duration_ms;
    }

    // ---- queries ------------------------------------------------------

    pub fn current_time(&self) -> f64 {
        self.player.current_time()
    }

    pub fn status(&self) -> PlayerStatus {
        self.player.status()
    }

    /// BPM in effect at the current playback position (position clamped
    /// to 0 before the first play).
    pub fn current_bpm(&self) -> Result<f64, TimingError> {
        self.score.tempo_map().bpm_at_ms(self.current_time().max(0.0))
    }

    /// End of the timeline: the latest note off time, or the external
    /// audio duration when that is longer.
    pub fn end_time(&self) -> f64 {
        self.score.end_time().max(self.audio_duration_ms.unwrap_or(0.0))
    }

    pub fn tick_to_ms(&self, tick: u64) -> Result<f64, TimingError> {
        self.score.tempo_map().tick_to_ms(tick)
    }

    pub fn ms_to_tick(&self, ms: f64) -> Result<f64, TimingError> {
        self.score.tempo_map().ms_to_tick(ms)
    }

    pub fn tempo_map(&self) -> &TempoMap {
        self.score.tempo_map()
    }

    pub fn notes(&self) -> &[Note] {
        self.score.notes()
    }

    pub fn pitch_bends(&self) -> &[PitchEvent] {
        self.score.pitch_bends()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.score.diagnostics()
    }

    pub fn score(&self) -> &Score {
        &self.score
    }
}
