use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use idmatch::{
    build_http_client, build_identity_extractor, build_rag_pipeline, config::Config, models::ClaimedName,
    models::UploadResponse, routes::create_router, utils::upload::is_allowed_image,
    utils::upload::INVALID_FORMAT_MESSAGE, AppState,
};

#[derive(Parser)]
#[command(name = "idmatch")]
#[command(about = "Identity document name matching and contract question answering")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Index the reference document and serve the HTTP API (default)
    Serve,
    /// Match a claimed name against a single document image
    Extract {
        image: PathBuf,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Answer one question about the reference document
    Ask { question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Extract {
            image,
            first_name,
            last_name,
        } => extract(config, image, first_name, last_name).await,
        Command::Ask { question } => ask(config, question).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    let address = config.server_address.clone();
    let state = Arc::new(AppState::from_config(config).await?);
    info!("✅ Indexed {} passages", state.rag.passage_count());

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("🚀 Listening on {}", address);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn extract(config: Config, image: PathBuf, first_name: String, last_name: String) -> Result<()> {
    let file_name = image.to_string_lossy();
    if !is_allowed_image(&file_name) {
        anyhow::bail!(INVALID_FORMAT_MESSAGE);
    }
    let bytes = tokio::fs::read(&image)
        .await
        .with_context(|| format!("Failed to read {}", image.display()))?;

    let client = build_http_client(&config)?;
    let extractor = build_identity_extractor(&config, client)?;
    let result = extractor.extract(&bytes, &ClaimedName::new(first_name, last_name)).await?;

    println!("{}", serde_json::to_string_pretty(&UploadResponse::from(result))?);
    Ok(())
}

async fn ask(config: Config, question: String) -> Result<()> {
    let client = build_http_client(&config)?;
    let pipeline = build_rag_pipeline(&config, client).await?;
    let answer = pipeline.answer(&question).await?;

    println!("{}", answer);
    Ok(())
}
