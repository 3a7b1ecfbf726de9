//! Rate-limited outbound movement deltas

use crate::prediction::Step;
use log::debug;
use shared::ClientEvent;
use std::time::{Duration, Instant};

/// Turns predicted steps into `player_move` events, at most one per send interval
#[derive(Debug, Clone)]
pub struct DeltaEmitter {
    send_interval: Duration,
    last_sent: Option<Instant>,
}

impl DeltaEmitter {
    pub fn new(send_interval: Duration) -> Self {
        Self {
            send_interval,
            last_sent: None,
        }
    }

    pub fn send_interval(&self) -> Duration {
        self.send_interval
    }

    /// Returns the event to send for this tick, if any.
    ///
    /// Only the delta of this tick is carried. Steps that fall inside the
    /// throttle window are dropped rather than accumulated, and the next
    /// authoritative snapshot corrects the difference.
    pub fn offer(&mut self, step: &Step, now: Instant, timestamp: u64) -> Option<ClientEvent> {
        if step.is_stationary() {
            return None;
        }

        if let Some(last_sent) = self.last_sent {
            if now.saturating_duration_since(last_sent) < self.send_interval {
                return None;
            }
        }

        let (x, y) = step.delta();
        self.last_sent = Some(now);
        debug!("Sending move ({:.1}, {:.1}) at {}", x, y, timestamp);

        Some(ClientEvent::PlayerMove { x, y, timestamp })
    }
}
