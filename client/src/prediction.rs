//! Client-side prediction of the locally controlled player
//!
//! The predictor owns the only copy of the local player's position. Input
//! moves it every tick without waiting for the server, and every authoritative
//! snapshot re-anchors it, so whatever is displayed is the latest of the two
//! writes and never a mix.

use crate::input::PressedSet;
use shared::Position;

/// Position before and after one predicted tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub previous: Position,
    pub current: Position,
}

impl Step {
    pub fn delta(&self) -> (f32, f32) {
        self.current.delta_from(&self.previous)
    }

    pub fn is_stationary(&self) -> bool {
        let (dx, dy) = self.delta();
        dx == 0.0 && dy == 0.0
    }
}

#[derive(Debug, Clone)]
pub struct LocalPredictor {
    position: Option<Position>,
    speed: f32,
}

impl LocalPredictor {
    pub fn new(speed: f32) -> Self {
        Self {
            position: None,
            speed,
        }
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Overwrites the local position with the server's value, or forgets it
    /// when the snapshot no longer contains the local player
    pub fn reanchor(&mut self, position: Option<Position>) {
        self.position = position;
    }

    /// Moves the local player by `speed` along every held direction.
    ///
    /// Returns `None` without side effects while the position is unknown.
    /// The court boundary is not enforced here; the server decides where a
    /// player may stand.
    pub fn tick(&mut self, pressed: &PressedSet) -> Option<Step> {
        let previous = self.position?;
        let (dx, dy) = pressed.direction_vector();
        let current = previous.offset(dx * self.speed, dy * self.speed);

        self.position = Some(current);
        Some(Step { previous, current })
    }
}
