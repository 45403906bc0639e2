use std::path::PathBuf;

use clap::Parser;
use followup_core::engine::Engine;
use followup_core::index::TantivyIndex;
use followup_core::llm::{LlmConfig, OpenAiClient};
use followup_core::store::CommitmentStore;

#[derive(Parser)]
#[command(
    name = "followup-server",
    about = "Cross-meeting commitment risk and health intelligence API",
    version
)]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Directory holding the SQLite database and the similarity index
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Chat-completions model used for extraction and answering
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, default_value = "https://api.openai.com/v1")]
    api_base: String,

    /// API key for the chat-completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    std::fs::create_dir_all(&args.data_dir)?;
    let store = CommitmentStore::open(&args.data_dir.join("commitments.db"))?;
    let index = TantivyIndex::open(&args.data_dir.join("index"))?;
    let llm = OpenAiClient::new(LlmConfig {
        api_base: args.api_base,
        api_key: args.api_key,
        model: args.model,
        ..LlmConfig::default()
    })?;
    let engine = Engine::new(
        store,
        Box::new(index),
        Box::new(llm.clone()),
        Box::new(llm),
    );

    followup_server::serve(engine, args.port).await
}
