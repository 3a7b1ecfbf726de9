use crate::input::TouchPad;
use crate::session::{ConnectionStatus, Scoreboard};
use macroquad::prelude::*;
use shared::{
    GameSnapshot, Position, BALL_RADIUS, GAME_HEIGHT, GAME_WIDTH, GOAL_DEPTH, PLAYER_RADIUS,
};

pub const BACKGROUND_COLOR: Color = Color::new(76.0 / 255.0, 175.0 / 255.0, 80.0 / 255.0, 1.0);
pub const BALL_COLOR: Color = WHITE;
pub const GOAL_COLOR: Color = WHITE;
pub const TEAM0_COLOR: Color = BLUE;
pub const TEAM1_COLOR: Color = RED;
pub const LOCAL_COLOR: Color = GREEN;
pub const REMOTE_COLOR: Color = Color::new(1.0, 68.0 / 255.0, 68.0 / 255.0, 1.0);
pub const LOCAL_OUTLINE_COLOR: Color = BLACK;
pub const LOCAL_OUTLINE_WIDTH: f32 = 2.0;

/// One drawing primitive in court coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Clear {
        color: Color,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: Color,
    },
    Outline {
        x: f32,
        y: f32,
        radius: f32,
        thickness: f32,
        color: Color,
    },
}

/// Ordered list of shapes for one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub shapes: Vec<Shape>,
}

impl Scene {
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn player_color(team: Option<u8>, is_local: bool) -> Color {
    match team {
        Some(0) => TEAM0_COLOR,
        Some(_) => TEAM1_COLOR,
        None if is_local => LOCAL_COLOR,
        None => REMOTE_COLOR,
    }
}

/// Builds the frame from the latest snapshot and the predicted local position.
///
/// Pure: nothing is drawn and no state is touched. The local player is drawn
/// at `local_position` (the predictor's value) and last, with an outline, so it
/// is never hidden by a remote player. Remote players are sorted by id so the
/// result does not depend on map iteration order.
pub fn compose(
    snapshot: Option<&GameSnapshot>,
    local_id: Option<&str>,
    local_position: Option<Position>,
) -> Scene {
    let mut shapes = vec![
        Shape::Clear {
            color: BACKGROUND_COLOR,
        },
        Shape::Rect {
            x: GAME_WIDTH / 4.0,
            y: 0.0,
            w: GAME_WIDTH / 2.0,
            h: GOAL_DEPTH,
            color: GOAL_COLOR,
        },
        Shape::Rect {
            x: GAME_WIDTH / 4.0,
            y: GAME_HEIGHT - GOAL_DEPTH,
            w: GAME_WIDTH / 2.0,
            h: GOAL_DEPTH,
            color: GOAL_COLOR,
        },
    ];

    let Some(snapshot) = snapshot else {
        return Scene { shapes };
    };

    if let Some(ball) = snapshot.ball {
        shapes.push(Shape::Circle {
            x: ball.x,
            y: ball.y,
            radius: BALL_RADIUS,
            color: BALL_COLOR,
        });
    }

    let mut remote: Vec<_> = snapshot
        .players
        .iter()
        .filter(|(id, _)| Some(id.as_str()) != local_id)
        .collect();
    remote.sort_by(|(a, _), (b, _)| a.cmp(b));

    for (_, player) in remote {
        shapes.push(Shape::Circle {
            x: player.x,
            y: player.y,
            radius: PLAYER_RADIUS,
            color: player_color(player.team, false),
        });
    }

    let local = local_id.and_then(|id| snapshot.player(id));
    if let (Some(player), Some(position)) = (local, local_position) {
        shapes.push(Shape::Circle {
            x: position.x,
            y: position.y,
            radius: PLAYER_RADIUS,
            color: player_color(player.team, true),
        });
        shapes.push(Shape::Outline {
            x: position.x,
            y: position.y,
            radius: PLAYER_RADIUS,
            thickness: LOCAL_OUTLINE_WIDTH,
            color: LOCAL_OUTLINE_COLOR,
        });
    }

    Scene { shapes }
}

/// Observable session fields shown over the court
#[derive(Debug, Clone)]
pub struct HudInfo<'a> {
    pub status: ConnectionStatus,
    pub local_id: Option<&'a str>,
    pub room_id: Option<u32>,
    pub position: Option<Position>,
    pub scoreboard: Option<&'a Scoreboard>,
    pub hint: &'a str,
}

/// Draws scenes with macroquad, scaling the court to fit the window
pub struct Renderer {
    scale: f32,
    offset: Vec2,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }

    fn fit_to_screen(&mut self) {
        let (width, height) = (screen_width(), screen_height());
        self.scale = (width / GAME_WIDTH).min(height / GAME_HEIGHT);
        self.offset = vec2(
            (width - GAME_WIDTH * self.scale) / 2.0,
            (height - GAME_HEIGHT * self.scale) / 2.0,
        );
    }

    fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.offset.x + x * self.scale,
            self.offset.y + y * self.scale,
        )
    }

    pub fn draw(&mut self, scene: &Scene) {
        self.fit_to_screen();

        for shape in &scene.shapes {
            match *shape {
                Shape::Clear { color } => {
                    clear_background(Color::from_rgba(26, 26, 26, 255));
                    let (x, y) = self.to_screen(0.0, 0.0);
                    draw_rectangle(
                        x,
                        y,
                        GAME_WIDTH * self.scale,
                        GAME_HEIGHT * self.scale,
                        color,
                    );
                }
                Shape::Rect { x, y, w, h, color } => {
                    let (sx, sy) = self.to_screen(x, y);
                    draw_rectangle(sx, sy, w * self.scale, h * self.scale, color);
                }
                Shape::Circle {
                    x,
                    y,
                    radius,
                    color,
                } => {
                    let (sx, sy) = self.to_screen(x, y);
                    draw_circle(sx, sy, radius * self.scale, color);
                }
                Shape::Outline {
                    x,
                    y,
                    radius,
                    thickness,
                    color,
                } => {
                    let (sx, sy) = self.to_screen(x, y);
                    draw_circle_lines(sx, sy, radius * self.scale, thickness, color);
                }
            }
        }
    }

    /// Lobby screen shown whenever the game loop is not running
    pub fn draw_lobby(&mut self, lines: &[String]) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
        for (i, line) in lines.iter().enumerate() {
            draw_text(line, 12.0, 40.0 + i as f32 * 22.0, 20.0, WHITE);
        }
    }

    pub fn draw_hud(&mut self, hud: &HudInfo) {
        let y_start = 10.0;

        let connection_color = match hud.status {
            ConnectionStatus::Disconnected => RED,
            ConnectionStatus::Connected | ConnectionStatus::Ended => YELLOW,
            ConnectionStatus::Joined | ConnectionStatus::Started => GREEN,
        };
        draw_rectangle(10.0, y_start, 8.0, 8.0, connection_color);
        draw_text(&hud.status.to_string(), 22.0, y_start + 8.0, 14.0, WHITE);

        if let Some(id) = hud.local_id {
            draw_text(&format!("id {}", id), 10.0, y_start + 24.0, 14.0, WHITE);
        }
        if let Some(room_id) = hud.room_id {
            draw_text(&format!("room {}", room_id), 10.0, y_start + 40.0, 14.0, WHITE);
        }
        if let Some(position) = hud.position {
            let text = format!("({:.0}, {:.0})", position.x, position.y);
            draw_text(&text, 10.0, y_start + 56.0, 14.0, WHITE);
        }

        if let Some(scoreboard) = hud.scoreboard {
            let text = format!("{} - {}", scoreboard.score(0), scoreboard.score(1));
            let size = measure_text(&text, None, 24, 1.0);
            draw_text(
                &text,
                screen_width() - size.width - 12.0,
                y_start + 20.0,
                24.0,
                WHITE,
            );
        }

        if !hud.hint.is_empty() {
            draw_text(hud.hint, 10.0, screen_height() - 10.0, 14.0, LIGHTGRAY);
        }
    }

    pub fn draw_touch_pad(&mut self, pad: &TouchPad) {
        for (_, rect) in pad.buttons() {
            draw_rectangle(
                rect.x,
                rect.y,
                rect.w,
                rect.h,
                Color::from_rgba(255, 255, 255, 60),
            );
            draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, WHITE);
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
