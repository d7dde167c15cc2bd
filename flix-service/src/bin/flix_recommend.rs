use clap::Parser;
use flix_core::{FilterSelection, LlmConfig, Recommender, RigProvider, MAX_ATTEMPTS};
use flix_service::models::RecommendationResponse;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;

/// Ask the LLM for movie recommendations from the command line
#[derive(Parser, Debug)]
#[command(name = "flix-recommend", version)]
struct Args {
    /// Comma-separated genre ids, e.g. action,comedy
    #[arg(short, long, value_delimiter = ',', required = true)]
    genres: Vec<String>,

    /// Language code: id, en, es, fr, hi, ja or ko
    #[arg(short, long)]
    language: String,

    /// Print the raw JSON response instead of movie cards
    #[arg(long)]
    json: bool,

    /// Total generation attempts before falling back
    #[arg(long, default_value_t = MAX_ATTEMPTS)]
    attempts: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();
    let selection = FilterSelection::parse(args.genres.as_slice(), &args.language)?;

    let provider = Arc::new(RigProvider::new(LlmConfig::from_env()?));
    let recommender = Recommender::new(provider).with_max_attempts(args.attempts);

    let outcome = recommender.recommend(&selection).await;
    let succeeded = outcome.is_success();

    if args.json {
        let response = RecommendationResponse::from(outcome);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        if let Some(error) = outcome.error() {
            eprintln!("{}\n", error);
        }
        for movie in outcome.movies() {
            println!("{}\n", movie);
        }
    }

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
