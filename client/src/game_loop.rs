//! Cooperative per-frame loop
//!
//! Each frame runs to completion before the next one is requested: inbound
//! network events are applied first, then input is sampled, the local player
//! predicted, a delta possibly emitted, and the scene composed. Nothing here
//! runs in parallel with a frame, so the core state needs no locking.

use crate::network::Transport;
use crate::rendering::{self, Scene};
use crate::session::Session;
use crate::sync::SyncClient;
use log::debug;
use shared::ClientEvent;
use std::future::Future;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of frame ticks. Yields the frame time, or `None` when no more
/// frames will come.
pub trait TickSource {
    fn next_tick(&mut self) -> impl Future<Output = Option<Instant>>;
}

/// Display-rate ticks from the macroquad window
pub struct FrameTicks {
    started: bool,
}

impl FrameTicks {
    pub fn new() -> Self {
        macroquad::input::prevent_quit();
        Self { started: false }
    }
}

impl Default for FrameTicks {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for FrameTicks {
    async fn next_tick(&mut self) -> Option<Instant> {
        if self.started {
            macroquad::window::next_frame().await;
        }
        self.started = true;

        if macroquad::input::is_quit_requested() {
            None
        } else {
            Some(Instant::now())
        }
    }
}

/// Input devices and display around the core loop
pub trait Frontend {
    /// Feeds device input into the client and returns lobby commands issued this frame
    fn poll(&mut self, client: &mut SyncClient) -> Vec<ClientEvent>;

    /// Shows the frame. `scene` is `None` while the game loop is stopped.
    fn present(&mut self, client: &SyncClient, scene: Option<&Scene>);
}

/// Result of one loop iteration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub outbound: Option<ClientEvent>,
    pub scene: Option<Scene>,
}

/// Sample -> predict -> emit -> render, only while started
#[derive(Debug, Default)]
pub struct LoopDriver {
    running: bool,
    frames: u64,
}

impl LoopDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn tick(&mut self, session: &mut Session, now: Instant, timestamp: u64) -> Frame {
        if !self.running {
            return Frame::default();
        }
        self.frames += 1;

        let pressed = session.input.snapshot_pressed();
        let outbound = session
            .predictor
            .tick(&pressed)
            .and_then(|step| session.emitter.offer(&step, now, timestamp));

        let scene = rendering::compose(
            session.snapshot(),
            Some(session.local_entity_id()),
            session.position(),
        );

        Frame {
            outbound,
            scene: Some(scene),
        }
    }
}

/// Send-time clock for outbound moves.
///
/// Reads the wall clock once, then advances with the monotonic clock, so
/// timestamps are Unix-epoch milliseconds that never go backwards.
#[derive(Debug, Clone, Copy)]
pub struct SendClock {
    epoch_ms: u64,
    anchor: Instant,
}

impl SendClock {
    pub fn start() -> Self {
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_millis() as u64;
        Self::anchored(epoch_ms, Instant::now())
    }

    pub fn anchored(epoch_ms: u64, anchor: Instant) -> Self {
        Self { epoch_ms, anchor }
    }

    /// Milliseconds since the Unix epoch at `now`; instants before the anchor
    /// read as the anchor
    pub fn timestamp_at(&self, now: Instant) -> u64 {
        self.epoch_ms + now.saturating_duration_since(self.anchor).as_millis() as u64
    }
}

/// Runs frames until the tick source is exhausted
pub async fn drive<S, T, F>(client: &mut SyncClient, ticks: &mut S, transport: &mut T, frontend: &mut F)
where
    S: TickSource,
    T: Transport,
    F: Frontend,
{
    let clock = SendClock::start();

    while let Some(now) = ticks.next_tick().await {
        while let Some(inbound) = transport.poll_inbound() {
            client.handle_inbound(inbound);
        }

        for command in frontend.poll(client) {
            debug!("Lobby command: {}", command.name());
            transport.send(command);
        }

        let frame = client.frame(now, clock.timestamp_at(now));
        if let Some(event) = frame.outbound {
            transport.send(event);
        }

        frontend.present(client, frame.scene.as_ref());
    }
}
