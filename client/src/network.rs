//! Socket.IO transport between the frame loop and the server
//!
//! Socket I/O runs on its own tokio runtime thread. The frame loop only sees
//! two channels: decoded [`ServerEvent`]s coming in and [`ClientEvent`]s going
//! out. The connection speaks Engine.IO v4 over a plain WebSocket, answering
//! the server's pings itself. Sends are fire-and-forget; a failed connection
//! is reported once as [`Inbound::Disconnected`] and never retried here.

use futures::{SinkExt, Stream, StreamExt};
use log::{debug, error, info, warn};
use shared::socketio::{self, Handshake, Packet};
use shared::{ClientEvent, ServerEvent};
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// What the transport hands to the frame loop
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Event(ServerEvent),
    Disconnected { reason: String },
}

/// Message-passing boundary between the core and the wire
pub trait Transport {
    /// Next pending inbound message, without blocking
    fn poll_inbound(&mut self) -> Option<Inbound>;

    fn send(&mut self, event: ClientEvent);
}

/// Handle to a connection running on a background thread
pub struct NetworkHandle {
    inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    outbound_tx: Option<mpsc::UnboundedSender<ClientEvent>>,
    thread: Option<JoinHandle<()>>,
}

impl NetworkHandle {
    pub fn spawn(server: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let server = server.to_string();

        let thread = thread::Builder::new()
            .name("network".to_string())
            .spawn(move || {
                runtime.block_on(connection_task(server, inbound_tx, outbound_rx));
            })?;

        Ok(Self {
            inbound_rx,
            outbound_tx: Some(outbound_tx),
            thread: Some(thread),
        })
    }

    /// Closes the socket and waits for the network thread to finish
    pub fn close(mut self) {
        self.outbound_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Network thread panicked");
            }
        }
    }
}

impl Transport for NetworkHandle {
    fn poll_inbound(&mut self) -> Option<Inbound> {
        self.inbound_rx.try_recv().ok()
    }

    fn send(&mut self, event: ClientEvent) {
        let Some(outbound_tx) = &self.outbound_tx else {
            return;
        };
        if outbound_tx.send(event).is_err() {
            debug!("Dropping outbound event, connection is closed");
        }
    }
}

/// Runs one connection to completion and always reports the disconnect.
///
/// `server` is the server address, e.g. `http://127.0.0.1:5001`.
pub async fn connection_task(
    server: String,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    outbound_rx: mpsc::UnboundedReceiver<ClientEvent>,
) {
    let reason = match run_connection(&server, &inbound_tx, outbound_rx).await {
        Ok(reason) => reason,
        Err(e) => {
            error!("Connection to {} failed: {}", server, e);
            e.to_string()
        }
    };

    info!("Disconnected from {}: {}", server, reason);
    let _ = inbound_tx.send(Inbound::Disconnected { reason });
}

/// Pumps packets both ways until either side closes. Returns the close reason.
pub async fn run_connection(
    server: &str,
    inbound_tx: &mpsc::UnboundedSender<Inbound>,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientEvent>,
) -> Result<String, TransportError> {
    let url = socketio::websocket_url(server)?;
    info!("Connecting to {}", url);
    let (socket, _) = connect_async(url.as_str()).await?;
    let (mut sink, mut stream) = socket.split();

    let handshake = read_handshake(&mut stream).await?;
    info!(
        "Engine.IO session {} open, ping interval {} ms",
        handshake.sid, handshake.ping_interval
    );
    sink.send(text_frame(&Packet::Connect { sid: None })?).await?;

    // The server pings every `ping_interval`; silence past the window means it is gone
    let window = handshake.liveness_window();
    let liveness = sleep(window);
    tokio::pin!(liveness);

    loop {
        tokio::select! {
            incoming = stream.next() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(frame))) => {
                        let reason = frame
                            .map(|frame| frame.reason.to_string())
                            .filter(|reason| !reason.is_empty())
                            .unwrap_or_else(|| "closed by server".to_string());
                        return Ok(reason);
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.into()),
                    None => return Ok("connection lost".to_string()),
                };
                liveness.as_mut().reset(Instant::now() + window);

                let packet = match Packet::decode(&text) {
                    Ok(packet) => packet,
                    Err(e) => {
                        warn!("Dropping message: {}", e);
                        continue;
                    }
                };

                match packet {
                    Packet::Ping => sink.send(text_frame(&Packet::Pong)?).await?,
                    Packet::Event { name, data } => match ServerEvent::from_parts(&name, data) {
                        Ok(event) => {
                            debug!("Received {}", event.name());
                            if inbound_tx.send(Inbound::Event(event)).is_err() {
                                return Ok("client shut down".to_string());
                            }
                        }
                        Err(e) => warn!("Dropping event: {}", e),
                    },
                    Packet::Connect { sid } => info!("Socket.IO connected as {:?}", sid),
                    Packet::ConnectError { message } => {
                        return Err(format!("server refused connection: {}", message).into());
                    }
                    Packet::Close | Packet::Disconnect => return Ok("closed by server".to_string()),
                    Packet::Open(_) | Packet::Pong | Packet::Noop => {}
                }
            },

            outgoing = outbound_rx.recv() => match outgoing {
                Some(event) => {
                    debug!("Sending {}", event.name());
                    sink.send(text_frame(&event.to_packet()?)?).await?;
                }
                None => {
                    if let Err(e) = sink.send(text_frame(&Packet::Disconnect)?).await {
                        debug!("Disconnect packet not sent: {}", e);
                    }
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        debug!("Close frame not sent: {}", e);
                    }
                    return Ok("closed by client".to_string());
                }
            },

            () = &mut liveness => return Ok("ping timeout".to_string()),
        }
    }
}

fn text_frame(packet: &Packet) -> Result<Message, TransportError> {
    Ok(Message::Text(packet.encode()?.into()))
}

/// Waits for the Engine.IO open packet that starts every connection
async fn read_handshake<S>(stream: &mut S) -> Result<Handshake, TransportError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(message) = stream.next().await {
        match message? {
            Message::Text(text) => {
                return match Packet::decode(&text)? {
                    Packet::Open(handshake) => Ok(handshake),
                    other => Err(format!("expected open packet, got {:?}", other).into()),
                };
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
    Err("connection closed before handshake".into())
}
