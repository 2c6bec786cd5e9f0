use std::time::{Duration, Instant};

use tracing::debug;

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenceState {
    #[default]
    Active,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    /// Any operator input: key, mouse, paste.
    Activity,
    StreamStarted,
    /// The in-flight stream finished, successfully or not.
    StreamSettled,
    /// Periodic clock signal; the only event that can make the monitor idle.
    Tick,
}

/// ACTIVE/IDLE detector driven entirely by explicit events and instants.
///
/// While a stream is in flight there is no deadline at all, so no amount of
/// elapsed time makes the monitor idle. The deadline restarts from the
/// instant the stream settles.
#[derive(Debug, Clone)]
pub struct IdlePresenceMonitor {
    state: PresenceState,
    quiet_interval: Duration,
    deadline: Option<Instant>,
    stream_in_flight: bool,
}

impl IdlePresenceMonitor {
    pub fn new(quiet_interval: Duration, now: Instant) -> Self {
        Self {
            state: PresenceState::Active,
            quiet_interval,
            deadline: Some(now + quiet_interval),
            stream_in_flight: false,
        }
    }

    pub fn state(&self) -> PresenceState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PresenceState::Idle
    }

    pub fn stream_in_flight(&self) -> bool {
        self.stream_in_flight
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet_interval
    }

    /// Applies `event` at `now`. Returns the new state when it changed.
    pub fn handle(&mut self, event: PresenceEvent, now: Instant) -> Option<PresenceState> {
        let previous = self.state;
        match event {
            PresenceEvent::Activity => {
                self.state = PresenceState::Active;
                self.deadline = self.fresh_deadline(now);
            }
            PresenceEvent::StreamStarted => {
                self.stream_in_flight = true;
                self.state = PresenceState::Active;
                self.deadline = None;
            }
            PresenceEvent::StreamSettled => {
                self.stream_in_flight = false;
                self.deadline = self.fresh_deadline(now);
            }
            PresenceEvent::Tick => {
                let expired = self.deadline.is_some_and(|deadline| now >= deadline);
                if self.state == PresenceState::Active && !self.stream_in_flight && expired {
                    self.state = PresenceState::Idle;
                    self.deadline = None;
                }
            }
        }

        if self.state != previous {
            debug!(from = ?previous, to = ?self.state, "presence changed");
            Some(self.state)
        } else {
            None
        }
    }

    pub fn on_activity(&mut self, now: Instant) -> Option<PresenceState> {
        self.handle(PresenceEvent::Activity, now)
    }

    fn fresh_deadline(&self, now: Instant) -> Option<Instant> {
        if self.stream_in_flight {
            None
        } else {
            Some(now + self.quiet_interval)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn becomes_idle_only_after_the_quiet_interval() {
        let start = Instant::now();
        let mut monitor = IdlePresenceMonitor::new(DEFAULT_IDLE_TIMEOUT, start);

        assert_eq!(monitor.handle(PresenceEvent::Tick, start + ms(4999)), None);
        assert!(!monitor.is_idle());

        assert_eq!(
            monitor.handle(PresenceEvent::Tick, start + ms(5000)),
            Some(PresenceState::Idle)
        );
        assert!(monitor.is_idle());
    }

    #[test]
    fn activity_resets_the_deadline() {
        let start = Instant::now();
        let mut monitor = IdlePresenceMonitor::new(DEFAULT_IDLE_TIMEOUT, start);

        monitor.on_activity(start + ms(4000));
        monitor.handle(PresenceEvent::Tick, start + ms(8000));
        assert!(!monitor.is_idle());
        monitor.handle(PresenceEvent::Tick, start + ms(8999));
        assert!(!monitor.is_idle());

        monitor.handle(PresenceEvent::Tick, start + ms(9000));
        assert!(monitor.is_idle());
    }

    #[test]
    fn never_idle_while_a_stream_is_in_flight() {
        let start = Instant::now();
        let mut monitor = IdlePresenceMonitor::new(DEFAULT_IDLE_TIMEOUT, start);

        monitor.handle(PresenceEvent::StreamStarted, start + ms(1000));
        for seconds in [10, 60, 3600] {
            monitor.handle(PresenceEvent::Tick, start + Duration::from_secs(seconds));
            assert!(!monitor.is_idle());
        }
    }

    #[test]
    fn settled_stream_restarts_the_countdown() {
        let start = Instant::now();
        let mut monitor = IdlePresenceMonitor::new(DEFAULT_IDLE_TIMEOUT, start);

        monitor.handle(PresenceEvent::StreamStarted, start);
        let settled = start + Duration::from_secs(30);
        monitor.handle(PresenceEvent::StreamSettled, settled);

        monitor.handle(PresenceEvent::Tick, settled + ms(4999));
        assert!(!monitor.is_idle());
        monitor.handle(PresenceEvent::Tick, settled + ms(5000));
        assert!(monitor.is_idle());
    }

    #[test]
    fn activity_wakes_an_idle_monitor_immediately() {
        let start = Instant::now();
        let mut monitor = IdlePresenceMonitor::new(ms(100), start);
        monitor.handle(PresenceEvent::Tick, start + ms(100));
        assert!(monitor.is_idle());

        assert_eq!(
            monitor.on_activity(start + ms(150)),
            Some(PresenceState::Active)
        );
        monitor.handle(PresenceEvent::Tick, start + ms(249));
        assert!(!monitor.is_idle());
        monitor.handle(PresenceEvent::Tick, start + ms(250));
        assert!(monitor.is_idle());
    }

    #[test]
    fn activity_during_stream_does_not_rearm_the_deadline() {
        let start = Instant::now();
        let mut monitor = IdlePresenceMonitor::new(ms(100), start);
        monitor.handle(PresenceEvent::StreamStarted, start);
        monitor.on_activity(start + ms(10));
        monitor.handle(PresenceEvent::Tick, start + ms(500));
        assert!(!monitor.is_idle());
        assert!(monitor.stream_in_flight());
    }
}
