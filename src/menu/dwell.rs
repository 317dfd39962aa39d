use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq)]
enum DwellState<T> {
    Idle,
    Hovering { target: T, since: Instant },
    /// Idle after firing for `T`; staying on it does not re-arm the timer.
    Spent(T),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DwellPoll<T> {
    Idle,
    Pending { target: T, fraction: f64 },
    Fire(T),
}

/// Turns sustained hover into a single activation. At most one dwell is ever
/// pending; any change of target restarts from zero.
#[derive(Debug, Clone)]
pub struct DwellScheduler<T> {
    duration: Duration,
    state: DwellState<T>,
}

impl<T: Copy + PartialEq> DwellScheduler<T> {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: DwellState::Idle,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Takes effect for the next hover; a running dwell keeps its start time.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    /// Reports the current hover target. Returns true when the timer was
    /// (re)started or cancelled.
    pub fn hover(&mut self, target: Option<T>, now: Instant) -> bool {
        match (target, self.state) {
            (None, DwellState::Idle) => false,
            (None, _) => {
                self.state = DwellState::Idle;
                true
            }
            (Some(t), DwellState::Hovering { target, .. } | DwellState::Spent(target))
                if target == t =>
            {
                false
            }
            (Some(t), _) => {
                self.state = DwellState::Hovering {
                    target: t,
                    since: now,
                };
                true
            }
        }
    }

    pub fn cancel(&mut self) {
        self.state = DwellState::Idle;
    }

    pub fn target(&self) -> Option<T> {
        match self.state {
            DwellState::Hovering { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DwellState::Hovering { since, .. } => Some(since + self.duration),
            _ => None,
        }
    }

    pub fn progress(&self, now: Instant) -> Option<(T, f64)> {
        match self.state {
            DwellState::Hovering { target, since } => Some((target, self.fraction(since, now))),
            _ => None,
        }
    }

    /// Advances the timer. `Fire` is returned exactly once per dwell.
    pub fn poll(&mut self, now: Instant) -> DwellPoll<T> {
        let DwellState::Hovering { target, since } = self.state else {
            return DwellPoll::Idle;
        };

        if now.saturating_duration_since(since) >= self.duration {
            self.state = DwellState::Spent(target);
            DwellPoll::Fire(target)
        } else {
            DwellPoll::Pending {
                target,
                fraction: self.fraction(since, now),
            }
        }
    }

    fn fraction(&self, since: Instant, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(since);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }
}
