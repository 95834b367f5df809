use clap::Parser;
use client::bot::choose_direction;
use client::network::GameClient;
use log::{info, warn};
use shared::{Direction, DEFAULT_PORT};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless bot client for the item-collection server")]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("ws://127.0.0.1:{}", DEFAULT_PORT))]
    server: String,

    /// Milliseconds between frames
    #[arg(short = 'f', long, default_value = "16")]
    frame_ms: u64,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    frames: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    info!("Connecting to: {}", args.server);
    let mut client = GameClient::connect(&args.server).await?;
    info!("Playing on {} as {}", client.server_addr(), client.local_id());

    let mut frame_interval = interval(Duration::from_millis(args.frame_ms.max(1)));
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut direction = Direction::Still;
    let mut score = 0;
    let mut frame = 0u64;

    loop {
        frame_interval.tick().await;
        if args.frames.is_some_and(|limit| frame >= limit) {
            break;
        }
        frame += 1;

        client.send_direction(direction).await?;
        let Some(snapshot) = client.latest_snapshot(Duration::from_secs(1)).await? else {
            warn!(
                "No snapshot within 1s of frame {} ({} replies outstanding)",
                frame,
                client.in_flight()
            );
            continue;
        };

        let Some(me) = snapshot.player(client.local_id()) else {
            warn!("Server snapshot does not list us as {}", client.local_id());
            continue;
        };

        if me.score != score {
            score = me.score;
            info!("Score: {} ({} items left)", score, snapshot.items.len());
        }
        if snapshot.items.is_empty() {
            info!("Field cleared, final score {}", score);
            break;
        }
        direction = choose_direction(me, &snapshot.items);
    }

    client.close().await?;
    Ok(())
}
