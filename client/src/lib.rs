//! # Arena Game Client Library
//!
//! Client-side implementation of the real-time arena game: it joins a room on
//! an authoritative server, keeps a local view of the shared game state, and
//! draws it at display rate.
//!
//! ## Architecture Overview
//!
//! The heart of the crate is the state-synchronization loop. Once per display
//! frame it samples input, predicts the local player's movement, emits a
//! throttled movement delta to the server, and composes the scene to draw.
//! Authoritative snapshots arrive asynchronously and overwrite the predicted
//! position.
//!
//! ### Client-Side Prediction
//! Held directions move the local player immediately, without waiting for the
//! server. Diagonal movement is the plain sum of both directions.
//!
//! ### Server Reconciliation
//! Every `game_state` snapshot replaces the previous one entirely and snaps
//! the local player to the server's position. There is no smoothing and no
//! input replay: the last snapshot wins.
//!
//! ### Delta Emission
//! Outbound `player_move` messages carry the change in position plus a send
//! timestamp, at most one per send interval and never for a zero change.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! - Arrow keys sampled each frame and touch buttons folded into a pressed-set
//! - Unknown keys are ignored
//!
//! ### Prediction, Emitter and Snapshot Modules
//! - `prediction`: the local player's position and per-tick movement
//! - `emitter`: rate limiting of outbound deltas
//! - `snapshot`: latest authoritative state and re-anchoring
//!
//! ### Session and Sync Modules
//! - `session`: per-connection context and the status state machine
//! - `sync`: [`sync::SyncClient`], the entry points the lobby and transport call
//!
//! ### Game Loop Module (`game_loop`)
//! The cooperative frame loop, driven by a [`game_loop::TickSource`] so tests
//! can feed synthetic ticks instead of display refreshes.
//!
//! ### Network Module (`network`)
//! Socket.IO client (Engine.IO v4 over WebSocket) on a background tokio
//! thread, exchanging decoded events with the frame loop over channels.
//!
//! ### Rendering, Lobby and Frontend Modules
//! - `rendering`: pure scene composition plus the macroquad renderer
//! - `lobby`: create/join/start/leave key bindings and room id entry
//! - `frontend`: the macroquad window tying input and display together
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::frontend::WindowFrontend;
//! use client::game_loop::{self, FrameTicks};
//! use client::network::NetworkHandle;
//! use client::sync::{ClientConfig, SyncClient};
//!
//! async fn play() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut transport = NetworkHandle::spawn("http://127.0.0.1:5001")?;
//!     let mut client = SyncClient::new(ClientConfig::default());
//!     let mut frontend = WindowFrontend::new(None, false);
//!     let mut ticks = FrameTicks::new();
//!
//!     game_loop::drive(&mut client, &mut ticks, &mut transport, &mut frontend).await;
//!     transport.close();
//!     Ok(())
//! }
//! ```

pub mod emitter;
pub mod frontend;
pub mod game_loop;
pub mod input;
pub mod lobby;
pub mod network;
pub mod prediction;
pub mod rendering;
pub mod session;
pub mod snapshot;
pub mod sync;
