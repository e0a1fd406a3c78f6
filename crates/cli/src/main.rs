use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use datalens_charts::ChartRenderer;
use datalens_core::{AskResponse, GatewayConfig, Reply};
use datalens_engine::{seed_demo, Warehouse};
use datalens_http::{create_router, AppState};
use datalens_llm::ChatClient;
use datalens_service::ChatService;
use datalens_store::{MemoryResponseCache, MemorySessionStore, PatternLearner, ResponseCache, SessionStore};
use datalens_vector::{EmbeddingClient, SemanticIndex, VectorStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datalens")]
#[command(about = "Conversational analytics gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP gateway.
    Serve {
        #[arg(short, long, default_value = "8100")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Populate the warehouse with randomized demo data.
    Seed {
        #[arg(long, default_value = "30")]
        days: u32,
        #[arg(long, default_value = "500")]
        orders: usize,
        #[arg(long, default_value = "200")]
        devices: usize,
    },
    /// Ask a running gateway one question.
    Ask {
        message: String,
        #[arg(short, long, default_value = "auto")]
        source: String,
        #[arg(short, long, default_value = "auto")]
        mode: String,
        #[arg(long, default_value = "http://127.0.0.1:8100")]
        url: String,
    },
    /// Print a running gateway's statistics.
    Stats {
        #[arg(long, default_value = "http://127.0.0.1:8100")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = GatewayConfig::from_env();

    match cli.command {
        Commands::Serve { port, host } => serve(&config, &host, port).await,
        Commands::Seed { days, orders, devices } => seed(&config, days, orders, devices),
        Commands::Ask { message, source, mode, url } => ask(&url, &message, &source, &mode).await,
        Commands::Stats { url } => stats(&url).await,
    }
}

async fn serve(config: &GatewayConfig, host: &str, port: u16) -> Result<()> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let warehouse = Warehouse::open(&config.db_path)?;

    let llm = Arc::new(ChatClient::new(config.llm_url.clone(), config.llm_model.clone())?);
    let index = Arc::new(SemanticIndex::new(
        EmbeddingClient::new(config.embeddings_url.clone(), config.embeddings_model.clone())?,
        VectorStore::new(config.qdrant_url.clone())?,
    ));

    // best effort: the gateway still serves with static schema context
    if let Err(e) = index.ingest_schema_docs().await {
        tracing::warn!("schema ingestion failed, continuing with static docs: {e}");
    }

    let sessions: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
    let cache: Arc<dyn ResponseCache> =
        Arc::new(MemoryResponseCache::new(config.cache_ttl_secs, config.cache_capacity));
    let chat = Arc::new(ChatService::new(
        sessions,
        cache,
        Arc::new(PatternLearner::new()),
        llm,
        index,
        warehouse,
        ChartRenderer::new(config.charts_dir.clone()),
    ));

    let state = Arc::new(AppState { chat });
    let router = create_router(state, config.charts_dir.clone());
    let addr = format!("{host}:{port}");
    tracing::info!("starting gateway on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

fn seed(config: &GatewayConfig, days: u32, orders: usize, devices: usize) -> Result<()> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let warehouse = Warehouse::open(&config.db_path)?;
    let report = seed_demo(&warehouse, days, orders, devices)?;
    println!(
        "seeded {} orders and {} device metrics into {}",
        report.orders,
        report.metrics,
        config.db_path.display()
    );
    Ok(())
}

async fn ask(url: &str, message: &str, source: &str, mode: &str) -> Result<()> {
    let body = serde_json::json!({
        "message": message,
        "source": source,
        "mode": mode,
    });
    let response = reqwest::Client::new()
        .post(format!("{}/chat/ask", url.trim_end_matches('/')))
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        anyhow::bail!("gateway returned {status}: {text}");
    }

    let parsed: AskResponse = serde_json::from_str(&text)?;
    match &parsed.reply {
        Reply::Text { text } => println!("{text}"),
        Reply::Table { table } => println!("{}", ChatService::render_result_text(table)),
        Reply::Chart { chart_ref } => println!("chart: /charts/{chart_ref}"),
    }
    if let Some(sql) = &parsed.sql {
        println!("\nsql: {sql}");
    }
    Ok(())
}

async fn stats(url: &str) -> Result<()> {
    let body: serde_json::Value = reqwest::Client::new()
        .get(format!("{}/chat/stats", url.trim_end_matches('/')))
        .send()
        .await?
        .json()
        .await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
