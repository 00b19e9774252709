use clap::Parser;
use server::config::ServerConfig;
use server::network::Server;
use std::time::Duration;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Server port to listen on
    #[clap(short, long, default_value = "5555")]
    port: u16,
    /// Maximum number of concurrent players
    #[clap(short, long, default_value = "5")]
    max_players: usize,
    /// Milliseconds between simulation ticks
    #[clap(short, long, default_value = "30")]
    tick_ms: u64,
    /// Length of a match in seconds
    #[clap(long, default_value = "300")]
    session_secs: u64,
    /// Player count that starts the match clock
    #[clap(long, default_value = "4")]
    start_threshold: usize,
    /// Seconds before a dead player respawns; omit for permanent death
    #[clap(long)]
    respawn_secs: Option<u64>,
    /// Live bullets kept in the arena at once
    #[clap(long, default_value = "2048")]
    max_bullets: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig {
            host: self.host,
            port: self.port,
            max_players: self.max_players,
            tick_period: Duration::from_millis(self.tick_ms),
            ..ServerConfig::default()
        };
        config.rules.session_duration = Duration::from_secs(self.session_secs);
        config.rules.session_start_threshold = self.start_threshold;
        config.rules.respawn_delay = self.respawn_secs.map(Duration::from_secs);
        config.rules.max_bullets = self.max_bullets;
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Args::parse().into_config();
    let server = Server::bind(config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            log::info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
