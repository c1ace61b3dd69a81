use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use soundcloud_rs::config::ACCESS_TOKEN_ENV;
use soundcloud_rs::{log_api_result, logging, Client, Config, SearchKey, Track};

/// Search SoundCloud tracks from the command line
#[derive(Debug, Parser)]
#[command(name = "soundcloud-rs", version)]
struct Cli {
    /// Free-text search
    query: String,

    /// Maximum number of tracks to return
    #[arg(short, long, default_value_t = 30)]
    limit: u32,

    /// Restrict results to a genre
    #[arg(short, long)]
    genre: Option<String>,

    /// Ignore any access token and search with the public client id
    #[arg(long, env = "SOUNDCLOUD_ANONYMOUS")]
    anonymous: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== SoundCloud-RS Starting ===");

    let mut config = Config::from_env();
    if cli.anonymous && config.authenticated {
        tracing::debug!("Ignoring {} for anonymous search", ACCESS_TOKEN_ENV);
        config.authenticated = false;
    }

    let client = Arc::new(Client::new(Arc::new(config))?);

    // Ctrl-C cancels the client from another task; the search aborts at its next checkpoint
    let canceller = Arc::clone(&client);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });

    let mut parameters = vec![
        (SearchKey::Query, cli.query.clone()),
        (SearchKey::Limit, cli.limit.to_string()),
    ];
    if let Some(genre) = cli.genre {
        parameters.push((SearchKey::Genre, genre));
    }

    let result = client.search_tracks(parameters).await;
    log_api_result!("search_tracks", result);

    let tracks = result?;
    if tracks.is_empty() {
        println!("No tracks found for \"{}\"", cli.query);
    }
    for track in &tracks {
        print_track(track, &client.config());
    }

    tracing::info!("SoundCloud-RS shutting down");
    Ok(())
}

fn print_track(track: &Track, config: &Config) {
    let length = track.duration().as_secs();
    println!(
        "{} - {} [{}:{:02}]",
        track.user.username,
        track.title,
        length / 60,
        length % 60
    );
    println!("    {}", track.permalink_url);
    if let Some(stream) = track.stream_url_for(config) {
        println!("    stream: {}", stream);
    }
}
