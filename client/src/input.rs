//! Directional input sampling from keyboard and touch

use macroquad::prelude::*;
use std::collections::HashMap;

/// The four logical directions a player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Maps browser-style key names (`ArrowUp`, ...) to a direction
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Direction::Up),
            KeyCode::Down => Some(Direction::Down),
            KeyCode::Left => Some(Direction::Left),
            KeyCode::Right => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn key_code(self) -> KeyCode {
        match self {
            Direction::Up => KeyCode::Up,
            Direction::Down => KeyCode::Down,
            Direction::Left => KeyCode::Left,
            Direction::Right => KeyCode::Right,
        }
    }

    /// Unit vector in court coordinates, where y grows downwards
    pub fn unit_vector(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

/// Which directions are held at the moment the set was sampled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PressedSet {
    held: [bool; 4],
}

impl PressedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, direction: Direction) -> Self {
        self.held[direction.index()] = true;
        self
    }

    pub fn is_pressed(&self, direction: Direction) -> bool {
        self.held[direction.index()]
    }

    pub fn is_empty(&self) -> bool {
        !self.held.iter().any(|held| *held)
    }

    /// Sum of the unit vectors of every held direction. Not normalized, so a
    /// diagonal has length √2.
    pub fn direction_vector(&self) -> (f32, f32) {
        Direction::ALL
            .iter()
            .filter(|direction| self.is_pressed(**direction))
            .map(|direction| direction.unit_vector())
            .fold((0.0, 0.0), |(x, y), (dx, dy)| (x + dx, y + dy))
    }
}

/// On-screen directional pad for touch devices
#[derive(Debug, Clone)]
pub struct TouchPad {
    buttons: [(Direction, Rect); 4],
}

impl TouchPad {
    /// Lays out a cross of four buttons in the bottom-right corner of the screen
    pub fn new(screen_width: f32, screen_height: f32) -> Self {
        let size = (screen_width.min(screen_height) / 7.0).max(32.0);
        let margin = size / 3.0;
        let center_x = screen_width - margin - size * 1.5;
        let center_y = screen_height - margin - size * 1.5;
        let at = |col: f32, row: f32| {
            Rect::new(
                center_x + col * size - size / 2.0,
                center_y + row * size - size / 2.0,
                size,
                size,
            )
        };

        Self {
            buttons: [
                (Direction::Up, at(0.0, -1.0)),
                (Direction::Down, at(0.0, 1.0)),
                (Direction::Left, at(-1.0, 0.0)),
                (Direction::Right, at(1.0, 0.0)),
            ],
        }
    }

    pub fn button_at(&self, point: Vec2) -> Option<Direction> {
        self.buttons
            .iter()
            .find(|(_, rect)| rect.contains(point))
            .map(|(direction, _)| *direction)
    }

    pub fn buttons(&self) -> &[(Direction, Rect)] {
        &self.buttons
    }
}

/// Collects key and touch state into the current pressed-set.
///
/// Keys and touches are tracked separately; a direction is held while either
/// source holds it.
#[derive(Debug, Default)]
pub struct InputSampler {
    keys: PressedSet,
    /// Active touches by id, with the button each one started on
    touches: HashMap<u64, Direction>,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pressed(&mut self, direction: Direction, pressed: bool) {
        self.keys.held[direction.index()] = pressed;
    }

    /// Key-down/key-up by name. Anything but the four arrow keys is ignored.
    pub fn set_key(&mut self, key_name: &str, pressed: bool) {
        if let Some(direction) = Direction::from_key_name(key_name) {
            self.set_pressed(direction, pressed);
        }
    }

    pub fn snapshot_pressed(&self) -> PressedSet {
        self.touches
            .values()
            .fold(self.keys, |pressed, direction| pressed.with(*direction))
    }

    pub fn clear(&mut self) {
        self.keys = PressedSet::default();
        self.touches.clear();
    }

    /// Samples the arrow keys and the touch pad for this frame
    pub fn poll_devices(&mut self, touch_pad: Option<&TouchPad>) {
        self.apply_key_levels(is_key_down);

        if let Some(pad) = touch_pad {
            self.apply_touches(pad, &touches());
        }
    }

    /// Sets every direction from whether its arrow key is down right now
    pub fn apply_key_levels(&mut self, is_down: impl Fn(KeyCode) -> bool) {
        for direction in Direction::ALL {
            self.set_pressed(direction, is_down(direction.key_code()));
        }
    }

    /// Applies one frame of touches.
    ///
    /// A touch holds the button it started on until it ends, wherever the
    /// finger has moved. Touches missing from the frame are released.
    pub fn apply_touches(&mut self, pad: &TouchPad, touches: &[Touch]) {
        for touch in touches {
            match touch.phase {
                TouchPhase::Started => {
                    if let Some(direction) = pad.button_at(touch.position) {
                        self.touches.insert(touch.id, direction);
                    }
                }
                TouchPhase::Ended | TouchPhase::Cancelled => {
                    self.touches.remove(&touch.id);
                }
                TouchPhase::Moved | TouchPhase::Stationary => {}
            }
        }

        self.touches
            .retain(|id, _| touches.iter().any(|touch| touch.id == *id));
    }
}
