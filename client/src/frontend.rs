use crate::game_loop::Frontend;
use crate::input::TouchPad;
use crate::lobby::{LobbyControls, LobbyKey};
use crate::rendering::{HudInfo, Renderer, Scene};
use crate::sync::SyncClient;
use macroquad::prelude::*;
use shared::ClientEvent;

const HINT: &str = "Arrows: move  L: leave";

/// Macroquad window: keyboard/touch in, court and lobby out
pub struct WindowFrontend {
    renderer: Renderer,
    lobby: LobbyControls,
    touch_pad: Option<TouchPad>,
}

impl WindowFrontend {
    pub fn new(join_room: Option<u32>, touch_controls: bool) -> Self {
        Self {
            renderer: Renderer::new(),
            lobby: LobbyControls::new(join_room),
            touch_pad: touch_controls.then(|| TouchPad::new(screen_width(), screen_height())),
        }
    }

    fn lobby_keys() -> Vec<LobbyKey> {
        const DIGITS: [KeyCode; 10] = [
            KeyCode::Key0,
            KeyCode::Key1,
            KeyCode::Key2,
            KeyCode::Key3,
            KeyCode::Key4,
            KeyCode::Key5,
            KeyCode::Key6,
            KeyCode::Key7,
            KeyCode::Key8,
            KeyCode::Key9,
        ];

        let commands = [
            (KeyCode::C, LobbyKey::Create),
            (KeyCode::J, LobbyKey::Join),
            (KeyCode::S, LobbyKey::Start),
            (KeyCode::L, LobbyKey::Leave),
            (KeyCode::Backspace, LobbyKey::Backspace),
        ];
        let digits = DIGITS
            .into_iter()
            .zip(0u8..)
            .map(|(code, digit)| (code, LobbyKey::Digit(digit)));

        commands
            .into_iter()
            .chain(digits)
            .filter(|(code, _)| is_key_pressed(*code))
            .map(|(_, key)| key)
            .collect()
    }
}

impl Frontend for WindowFrontend {
    fn poll(&mut self, client: &mut SyncClient) -> Vec<ClientEvent> {
        if let Some(input) = client.input_mut() {
            input.poll_devices(self.touch_pad.as_ref());
        }
        self.lobby.update(client.status(), &Self::lobby_keys())
    }

    fn present(&mut self, client: &SyncClient, scene: Option<&Scene>) {
        let Some(scene) = scene else {
            let lines = self.lobby.lines(client);
            self.renderer.draw_lobby(&lines);
            return;
        };

        self.renderer.draw(scene);
        if let Some(pad) = &self.touch_pad {
            self.renderer.draw_touch_pad(pad);
        }
        self.renderer.draw_hud(&HudInfo {
            status: client.status(),
            local_id: client.local_entity_id(),
            room_id: client.room_id(),
            position: client.position(),
            scoreboard: client.scoreboard(),
            hint: HINT,
        });
    }
}
