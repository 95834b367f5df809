use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use server::game::{GameConfig, World};
use server::network::{Server, WsTransport};
use shared::{
    DEFAULT_PORT, FIELD_HEIGHT, FIELD_WIDTH, ITEM_COUNT, ITEM_WIDTH, MAX_PLAYERS, PLAYER_WIDTH,
    TRAVEL_SPEED,
};
use std::time::Duration;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Authoritative item-collection game server")]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Maximum number of simultaneously connected peers
    #[arg(short, long, default_value_t = MAX_PLAYERS)]
    max_players: usize,

    /// Play-field width
    #[arg(long, default_value_t = FIELD_WIDTH, value_parser = clap::value_parser!(i32).range(1..))]
    width: i32,

    /// Play-field height (no short flag to avoid conflict with --help)
    #[arg(long, default_value_t = FIELD_HEIGHT, value_parser = clap::value_parser!(i32).range(1..))]
    height: i32,

    /// Side length of a player's square footprint
    #[arg(long, default_value_t = PLAYER_WIDTH, value_parser = clap::value_parser!(i32).range(1..))]
    player_size: i32,

    /// Side length of an item's square footprint
    #[arg(long, default_value_t = ITEM_WIDTH, value_parser = clap::value_parser!(i32).range(1..))]
    item_size: i32,

    /// Distance moved per input step
    #[arg(short, long, default_value_t = TRAVEL_SPEED, value_parser = clap::value_parser!(i32).range(1..))]
    speed: i32,

    /// Number of items placed at startup
    #[arg(short, long, default_value_t = ITEM_COUNT)]
    items: usize,

    /// Upper bound on each transport poll, in milliseconds
    #[arg(long, default_value_t = 1000)]
    poll_timeout_ms: u64,

    /// Seed for spawn positions (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            field_width: self.width,
            field_height: self.height,
            player_width: self.player_size,
            player_height: self.player_size,
            item_width: self.item_size,
            item_height: self.item_size,
            travel_speed: self.speed,
            item_count: self.items,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.game_config();

    let address = format!("{}:{}", args.host, args.port);
    let transport = match WsTransport::bind(&address, args.max_players).await {
        Ok(transport) => transport,
        Err(e) => {
            error!("Couldn't create host on {}: {}", address, e);
            return Err(e.into());
        }
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let world = World::new(config, &mut rng);
    let mut server = Server::new(
        transport,
        world,
        rng,
        Duration::from_millis(args.poll_timeout_ms),
    );

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
