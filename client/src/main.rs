use clap::Parser;
use client::frontend::WindowFrontend;
use client::game_loop::{self, FrameTicks};
use client::network::NetworkHandle;
use client::sync::{ClientConfig, SyncClient};
use log::{error, info};
use macroquad::window::Conf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address of the Socket.IO game server
    #[arg(short = 's', long, default_value = "http://127.0.0.1:5001")]
    server: String,

    /// Court units moved per frame per held direction
    #[arg(long, default_value_t = shared::PLAYER_SPEED)]
    speed: f32,

    /// Minimum milliseconds between two movement messages
    #[arg(short = 'i', long, default_value_t = shared::SEND_INTERVAL_MS)]
    send_interval_ms: u64,

    /// Room to join as soon as the server accepts the connection
    #[arg(short = 'r', long)]
    room: Option<u32>,

    /// Show on-screen direction buttons
    #[arg(short = 't', long)]
    touch: bool,

    /// Window width
    #[arg(short = 'w', long, default_value = "300")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "450")]
    height: i32,
}

fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let conf = Conf {
        window_title: "Arena".to_string(),
        window_width: args.width,
        window_height: args.height,
        ..Default::default()
    };

    macroquad::Window::from_config(conf, async move {
        if let Err(e) = run(args).await {
            error!("Client error: {}", e);
        }
    });
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    info!("Controls: arrow keys to move; C/J/S/L to create/join/start/leave");

    let config = ClientConfig {
        speed: args.speed,
        send_interval: Duration::from_millis(args.send_interval_ms),
    };

    let mut transport = NetworkHandle::spawn(&args.server)?;
    let mut client = SyncClient::new(config);
    let mut frontend = WindowFrontend::new(args.room, args.touch);
    let mut ticks = FrameTicks::new();

    game_loop::drive(&mut client, &mut ticks, &mut transport, &mut frontend).await;

    info!("Window closed, shutting down");
    transport.close();

    Ok(())
}
