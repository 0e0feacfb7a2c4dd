// Subscriber registry
// Named callbacks per notification channel, snapshot-on-dispatch so that
// callbacks may subscribe and unsubscribe re-entrantly

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::midi::note::{Note, PitchEvent};

/// Phase-transition channels, fired per entity kind.
/// `Entered*` is one-shot per boundary crossing, `While*` fires every tick
/// spent in the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseChannel {
    EnteredBefore,
    WhileBefore,
    EnteredSounding,
    WhileSounding,
    EnteredAfter,
    WhileAfter,
}

/// Every notification channel the engine can fire.
///
/// Lifecycle channels carry no entity payload; `Render` carries the raw
/// frame timestamp; note and pitch-bend channels carry the entity and the
/// player's current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Ready,
    PlayerPlay,
    PlayerPause,
    PlayerStop,
    Render,
    Note(PhaseChannel),
    PitchBend(PhaseChannel),
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn phase_name(phase: PhaseChannel) -> &'static str {
            match phase {
                PhaseChannel::EnteredBefore => "enteredBefore",
                PhaseChannel::WhileBefore => "whileBefore",
                PhaseChannel::EnteredSounding => "enteredSounding",
                PhaseChannel::WhileSounding => "whileSounding",
                PhaseChannel::EnteredAfter => "enteredAfter",
                PhaseChannel::WhileAfter => "whileAfter",
            }
        }

        match self {
            Channel::Ready => write!(f, "ready"),
            Channel::PlayerPlay => write!(f, "playerPlay"),
            Channel::PlayerPause => write!(f, "playerPause"),
            Channel::PlayerStop => write!(f, "playerStop"),
            Channel::Render => write!(f, "render"),
            Channel::Note(phase) => write!(f, "note.{}", phase_name(*phase)),
            Channel::PitchBend(phase) => write!(f, "pitchBend.{}", phase_name(*phase)),
        }
    }
}

/// What a firing notification hands to its subscribers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payload {
    /// Lifecycle channels (ready, playerPlay, playerPause, playerStop)
    None,
    /// The raw frame timestamp, every tick
    Render { time_stamp: f64 },
    Note { note: Note, current_time: f64 },
    PitchBend { event: PitchEvent, current_time: f64 },
}

type Callback = Rc<dyn Fn(&Payload)>;

struct Subscriber {
    name: String,
    callback: Callback,
}

/// Map from channel to an ordered subscriber list.
///
/// Dispatch snapshots the list before invoking anything, so a callback may
/// freely add or remove subscribers (even itself); changes take effect on
/// the next dispatch. Interior mutability keeps registration callable from
/// inside a firing callback; the engine is single threaded throughout.
#[derive(Default)]
pub struct ListenerRegistry {
    channels: RefCell<HashMap<Channel, Vec<Subscriber>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under `channel` and return its subscriber name.
    /// When `name` is `None` a unique one is generated.
    pub fn subscribe(
        &self,
        channel: Channel,
        name: Option<&str>,
        callback: impl Fn(&Payload) + 'static,
    ) -> String {
        let name = name
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.channels
            .borrow_mut()
            .entry(channel)
            .or_default()
            .push(Subscriber {
                name: name.clone(),
                callback: Rc::new(callback),
            });
        name
    }

    /// Remove the first subscriber registered under `name`.
    /// Returns whether anything was removed.
    pub fn unsubscribe(&self, channel: Channel, name: &str) -> bool {
        let mut channels = self.channels.borrow_mut();
        let Some(subscribers) = channels.get_mut(&channel) else {
            return false;
        };
        let Some(position) = subscribers.iter().position(|s| s.name == name) else {
            return false;
        };
        subscribers.remove(position);
        true
    }

    /// Drop every subscriber of a channel.
    pub fn clear(&self, channel: Channel) -> bool {
        self.channels.borrow_mut().remove(&channel).is_some()
    }

    /// Number of subscribers currently registered under a channel.
    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.channels
            .borrow()
            .get(&channel)
            .map_or(0, Vec::len)
    }

    /// Invoke every subscriber of `channel` in registration order.
    pub fn dispatch(&self, channel: Channel, payload: &Payload) {
        // Snapshot before calling out: callbacks may mutate the registry.
        let snapshot: Vec<Callback> = match self.channels.borrow().get(&channel) {
            Some(subscribers) => subscribers
                .iter()
                .map(|s| Rc::clone(&s.callback))
                .collect(),
            None => return,
        };
        for callback in snapshot {
            callback(payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<f64>>>) -> impl Fn(&Payload) + 'static {
        let log = Rc::clone(log);
        move |payload| {
            if let Payload::Render { time_stamp } = payload {
                log.borrow_mut().push(*time_stamp);
            }
        }
    }

    #[test]
    fn test_subscribe_and_dispatch() {
        let registry = ListenerRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        registry.subscribe(Channel::Render, Some("probe"), recorder(&log));

        registry.dispatch(Channel::Render, &Payload::Render { time_stamp: 16.6 });
        registry.dispatch(Channel::Render, &Payload::Render { time_stamp: 33.3 });

        assert_eq!(*log.borrow(), vec![16.6, 33.3]);
    }

    #[test]
    fn test_dispatch_order_is_registration_order() {
        let registry = ListenerRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in [1, 2, 3] {
            let log = Rc::clone(&log);
            registry.subscribe(Channel::Ready, None, move |_| {
                log.borrow_mut().push(tag);
            });
        }

        registry.dispatch(Channel::Ready, &Payload::None);
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_generated_names_are_unique() {
        let registry = ListenerRegistry::new();
        let a = registry.subscribe(Channel::Ready, None, |_| {});
        let b = registry.subscribe(Channel::Ready, None, |_| {});

        assert_ne!(a, b);
        assert_eq!(registry.subscriber_count(Channel::Ready), 2);
    }

    #[test]
    fn test_unsubscribe_by_name() {
        let registry = ListenerRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let name = registry.subscribe(Channel::Render, None, recorder(&log));

        assert!(registry.unsubscribe(Channel::Render, &name));
        assert!(!registry.unsubscribe(Channel::Render, &name));

        registry.dispatch(Channel::Render, &Payload::Render { time_stamp: 1.0 });
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_clear_channel() {
        let registry = ListenerRegistry::new();
        registry.subscribe(Channel::PlayerStop, None, |_| {});
        registry.subscribe(Channel::PlayerStop, None, |_| {});

        assert!(registry.clear(Channel::PlayerStop));
        assert!(!registry.clear(Channel::PlayerStop));
        assert_eq!(registry.subscriber_count(Channel::PlayerStop), 0);
    }

    #[test]
    fn test_unsubscribe_from_inside_a_callback() {
        let registry = Rc::new(ListenerRegistry::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        {
            let registry = Rc::clone(&registry);
            let log = Rc::clone(&log);
            registry.clone().subscribe(Channel::Ready, Some("once"), move |_| {
                log.borrow_mut().push("once");
                registry.unsubscribe(Channel::Ready, "once");
            });
        }
        {
            let log = Rc::clone(&log);
            registry.subscribe(Channel::Ready, Some("steady"), move |_| {
                log.borrow_mut().push("steady");
            });
        }

        // First dispatch runs both; the self-removal only affects the next.
        registry.dispatch(Channel::Ready, &Payload::None);
        registry.dispatch(Channel::Ready, &Payload::None);

        assert_eq!(*log.borrow(), vec!["once", "steady", "steady"]);
    }

    #[test]
    fn test_subscribe_from_inside_a_callback() {
        let registry = Rc::new(ListenerRegistry::new());
        let count = Rc::new(RefCell::new(0u32));

        {
            let registry = Rc::clone(&registry);
            let count = Rc::clone(&count);
            registry.clone().subscribe(Channel::Ready, None, move |_| {
                let count = Rc::clone(&count);
                registry.subscribe(Channel::Ready, None, move |_| {
                    *count.borrow_mut() += 1;
                });
            });
        }

        // The subscriber added mid-dispatch must not fire until next time.
        registry.dispatch(Channel::Ready, &Payload::None);
        assert_eq!(*count.borrow(), 0);

        registry.dispatch(Channel::Ready, &Payload::None);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::Ready.to_string(), "ready");
        assert_eq!(Channel::PlayerPlay.to_string(), "playerPlay");
        assert_eq!(
            Channel::Note(PhaseChannel::EnteredSounding).to_string(),
            "note.enteredSounding"
        );
        assert_eq!(
            Channel::PitchBend(PhaseChannel::WhileAfter).to_string(),
            "pitchBend.whileAfter"
        );
    }
}
