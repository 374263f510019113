use anyhow::Result;
use clap::Parser;
use engine::{Corpus, Engine, MatchConfig};
use server::build_app;
use server::generate::GenerateClient;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Nutrition dataset CSV path
    #[arg(long, default_value = "./foods.csv")]
    dataset: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let corpus = Corpus::load_or_seed(&args.dataset);
    let engine = Arc::new(Engine::new(corpus, MatchConfig::default()));

    let generate = GenerateClient::from_env().map(Arc::new);
    if generate.is_none() {
        tracing::warn!("GENERATE_API_KEY not set, chat and meal-plan routes will answer 503");
    }

    let app = build_app(engine, generate);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
